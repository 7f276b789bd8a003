use std::{
    sync::{mpsc, Arc},
    time::Duration,
};

use anyhow::{anyhow, Result};
use tokio::runtime::Runtime;

use crate::{
    backend::{self, HttpBackend, TokioDispatcher},
    cli::{Cli, Command},
    domain::{self, inbox_state::InboxState, selection::Viewport, thread::Thread},
    infra::{self, contracts::SystemOpener},
    ui,
    usecases::{
        self,
        bootstrap::{self, LogSink},
        context::AppContext,
        create_thread::{create_thread, CreateThreadCommand, CreateThreadError},
        inbox::{DefaultInboxOrchestrator, InboxSettings},
        list_threads::{list_threads, ListThreadsError},
    },
};

pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command_or_default();
    let sink = if launches_tui(&command) {
        LogSink::File
    } else {
        LogSink::Stderr
    };

    // Holds `log_guard` until the end of the run.
    let bootstrapped = bootstrap::bootstrap(cli.config.as_deref(), sink)?;
    let context = &bootstrapped.context;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        backend = backend::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match command {
        Command::Run { open } => run_inbox(context, &runtime, open)?,
        Command::Threads => print_threads(context, &runtime)?,
        Command::CreateThread {
            participant,
            task,
            open,
        } => {
            let thread_id = create(context, &runtime, participant, task)?;
            if open {
                run_inbox(context, &runtime, Some(thread_id))?;
            } else {
                println!("{thread_id}");
            }
        }
    }

    Ok(())
}

fn launches_tui(command: &Command) -> bool {
    match command {
        Command::Run { .. } => true,
        Command::Threads => false,
        Command::CreateThread { open, .. } => *open,
    }
}

fn run_inbox(context: &AppContext, runtime: &Runtime, open: Option<String>) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(&context.config.backend)?);
    let (events_tx, events_rx) = mpsc::channel();
    let dispatcher = TokioDispatcher::new(runtime, backend, events_tx);

    let breakpoint = context.config.layout.narrow_breakpoint;
    let state = InboxState::new(Viewport::new(breakpoint, 24, breakpoint));

    let mut orchestrator = DefaultInboxOrchestrator::new(
        state,
        dispatcher,
        SystemOpener,
        context.credentials.clone(),
        inbox_settings(context, open),
    );
    orchestrator.refresh_threads();

    let mut event_source = ui::CrosstermEventSource::new(events_rx);
    ui::shell::start(context, &mut event_source, &mut orchestrator)
}

fn inbox_settings(context: &AppContext, open: Option<String>) -> InboxSettings {
    let refresh_ms = context.config.backend.thread_refresh_interval_ms;

    InboxSettings {
        sender_type: context.config.session.sender_type.clone(),
        refresh_interval: (refresh_ms > 0).then(|| Duration::from_millis(refresh_ms)),
        open_thread_id: open,
    }
}

fn print_threads(context: &AppContext, runtime: &Runtime) -> Result<()> {
    let backend = HttpBackend::new(&context.config.backend)?;
    let credentials = context.credentials.as_ref();

    let threads = runtime
        .block_on(list_threads(&backend, credentials))
        .map_err(list_failure)?
        .ok_or_else(missing_session)?;

    let user_id = credentials.map(|c| c.user_id()).unwrap_or_default();
    for thread in &threads {
        println!("{}", thread_summary_line(thread, user_id));
    }

    tracing::info!(count = threads.len(), "threads listed");
    Ok(())
}

fn create(
    context: &AppContext,
    runtime: &Runtime,
    participant_id: String,
    task_id: Option<String>,
) -> Result<String> {
    let backend = HttpBackend::new(&context.config.backend)?;
    let command = CreateThreadCommand {
        participant_id,
        task_id,
    };

    runtime
        .block_on(create_thread(&backend, context.credentials.as_ref(), command))
        .map_err(create_failure)
}

fn thread_summary_line(thread: &Thread, user_id: &str) -> String {
    let task = thread
        .task_id
        .as_deref()
        .map(|task| format!("\t#{task}"))
        .unwrap_or_default();

    format!(
        "{}\t{}\t{} unread{}",
        thread.id,
        thread.title_for(user_id),
        thread.unread_count,
        task
    )
}

fn missing_session() -> anyhow::Error {
    anyhow!(
        "no session configured: set session.user_id and {} (or session.auth_token)",
        infra::config::AUTH_TOKEN_ENV
    )
}

fn list_failure(error: ListThreadsError) -> anyhow::Error {
    match error {
        ListThreadsError::Unauthorized => anyhow!("backend rejected the auth token"),
        ListThreadsError::TemporarilyUnavailable => anyhow!("backend is unavailable, try again"),
        ListThreadsError::DataContractViolation => anyhow!("backend returned malformed threads"),
    }
}

fn create_failure(error: CreateThreadError) -> anyhow::Error {
    match error {
        CreateThreadError::MissingCredentials => missing_session(),
        CreateThreadError::InvalidParticipant => {
            anyhow!("participant must be another user's id")
        }
        CreateThreadError::Unauthorized => anyhow!("backend rejected the auth token"),
        CreateThreadError::ParticipantNotFound => anyhow!("participant not found"),
        CreateThreadError::TemporarilyUnavailable => anyhow!("backend is unavailable, try again"),
        CreateThreadError::DataContractViolation => {
            anyhow!("backend returned no thread id")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{domain::thread::ParticipantInfo, infra::config::AppConfig};

    fn thread(task_id: Option<&str>) -> Thread {
        let mut participant_info = HashMap::new();
        participant_info.insert(
            "U2".to_owned(),
            ParticipantInfo {
                display_name: "Sparkle Cleaners".to_owned(),
                avatar_url: None,
            },
        );

        Thread {
            id: "T1".to_owned(),
            participant_ids: vec!["U1".to_owned(), "U2".to_owned()],
            participant_info,
            messages: Vec::new(),
            unread_count: 4,
            task_id: task_id.map(str::to_owned),
        }
    }

    #[test]
    fn summary_line_shows_counterpart_and_unread() {
        assert_eq!(
            thread_summary_line(&thread(None), "U1"),
            "T1\tSparkle Cleaners\t4 unread"
        );
        assert_eq!(
            thread_summary_line(&thread(Some("booking-9")), "U1"),
            "T1\tSparkle Cleaners\t4 unread\t#booking-9"
        );
    }

    #[test]
    fn only_tui_commands_log_to_file() {
        assert!(launches_tui(&Command::Run { open: None }));
        assert!(!launches_tui(&Command::Threads));
        assert!(launches_tui(&Command::CreateThread {
            participant: "U2".to_owned(),
            task: None,
            open: true,
        }));
        assert!(!launches_tui(&Command::CreateThread {
            participant: "U2".to_owned(),
            task: None,
            open: false,
        }));
    }

    #[test]
    fn zero_refresh_interval_disables_polling() {
        let mut config = AppConfig::default();
        config.backend.thread_refresh_interval_ms = 0;
        let context = AppContext::new(config);

        let settings = inbox_settings(&context, Some("T9".to_owned()));

        assert_eq!(settings.refresh_interval, None);
        assert_eq!(settings.open_thread_id.as_deref(), Some("T9"));
        assert_eq!(settings.sender_type, "manager");
    }

    #[test]
    fn default_refresh_interval_is_thirty_seconds() {
        let context = AppContext::new(AppConfig::default());

        let settings = inbox_settings(&context, None);

        assert_eq!(settings.refresh_interval, Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_credentials_explain_how_to_sign_in() {
        let message = create_failure(CreateThreadError::MissingCredentials).to_string();

        assert!(message.contains("session.user_id"));
        assert!(message.contains(infra::config::AUTH_TOKEN_ENV));
    }
}
