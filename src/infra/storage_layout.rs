use std::{fs, path::PathBuf};

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "sweep-inbox";
const LOG_FILE_NAME: &str = "sweep-inbox.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub config_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl StorageLayout {
    pub fn resolve() -> Result<Self, AppError> {
        let config_base = dirs::config_dir().ok_or_else(|| AppError::StoragePathResolution {
            details: "unable to resolve config base directory".into(),
        })?;

        let state_base = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or_else(|| AppError::StoragePathResolution {
                details: "unable to resolve state base directory".into(),
            })?;

        Ok(Self {
            config_dir: config_base.join(APP_DIR_NAME),
            state_dir: state_base.join(APP_DIR_NAME),
        })
    }

    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [&self.config_dir, &self.state_dir] {
            fs::create_dir_all(dir).map_err(|source| AppError::StorageDirCreate {
                path: dir.clone(),
                source,
            })?;
        }

        Ok(())
    }

    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join(LOG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_in_state_dir() {
        let layout = StorageLayout {
            config_dir: PathBuf::from("/tmp/config/sweep-inbox"),
            state_dir: PathBuf::from("/tmp/state/sweep-inbox"),
        };

        assert_eq!(
            layout.log_file(),
            PathBuf::from("/tmp/state/sweep-inbox/sweep-inbox.log")
        );
    }

    #[test]
    fn ensure_dirs_creates_missing_directories() {
        let root = tempfile::tempdir().expect("temp dir");
        let layout = StorageLayout {
            config_dir: root.path().join("config"),
            state_dir: root.path().join("state").join("nested"),
        };

        layout.ensure_dirs().expect("dirs must be created");

        assert!(layout.config_dir.is_dir());
        assert!(layout.state_dir.is_dir());
    }
}
