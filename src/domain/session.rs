use std::fmt;

/// Identity and bearer token of the signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    auth_token: String,
}

impl Credentials {
    /// Returns `None` when either part is missing or blank; network
    /// operations treat that as "nothing to do".
    pub fn from_parts(user_id: Option<&str>, auth_token: Option<&str>) -> Option<Self> {
        let user_id = user_id.map(str::trim).filter(|v| !v.is_empty())?;
        let auth_token = auth_token.map(str::trim).filter(|v| !v.is_empty())?;

        Some(Self {
            user_id: user_id.to_owned(),
            auth_token: auth_token.to_owned(),
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}
