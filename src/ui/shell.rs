use anyhow::Result;

use crate::{
    domain::events::AppEvent,
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, InboxOrchestrator},
    },
};

use super::{terminal::TerminalSession, view};

pub fn start(
    context: &AppContext,
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn InboxOrchestrator,
) -> Result<()> {
    tracing::info!(
        base_url = %context.config.backend.base_url,
        narrow_breakpoint = context.config.layout.narrow_breakpoint,
        signed_in = context.credentials.is_some(),
        "starting inbox TUI"
    );

    let mut terminal = TerminalSession::new()?;
    let (width, height) = terminal.size()?;
    orchestrator.handle_event(AppEvent::ViewportResized { width, height })?;

    run_loop(event_source, orchestrator, |orchestrator| {
        terminal.draw(|frame| view::render(frame, orchestrator.state(), orchestrator.user_id()))
    })
}

/// Draws, then feeds one event to the orchestrator, until it stops running.
fn run_loop<F>(
    event_source: &mut dyn AppEventSource,
    orchestrator: &mut dyn InboxOrchestrator,
    mut draw: F,
) -> Result<()>
where
    F: FnMut(&dyn InboxOrchestrator) -> Result<()>,
{
    while orchestrator.state().is_running() {
        draw(orchestrator)?;

        if let Some(event) = event_source.next_event()? {
            orchestrator.handle_event(event)?;
        }
    }

    Ok(())
}
