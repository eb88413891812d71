//! Terminal event loop.
//!
//! One `select!` multiplexes three wake sources: crossterm key events,
//! a frame ticker that keeps the countdown moving, and the controller's
//! change channel so pushed state (trial expiry, agent failure) renders
//! without waiting for the next frame.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};

use heartline_app::AppController;
use heartline_core::suggestion::FlowStep;
use heartline_core::view::View;

use crate::ui;

/// Redraw cadence when nothing else fires.
const FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// Text being edited on the active screen plus the latest inline error.
#[derive(Debug, Default)]
pub struct InputState {
    pub email: String,
    pub suggestion: String,
    pub error: Option<String>,
    quit: bool,
}

/// Runs the UI until the user quits or the terminal goes away.
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: Arc<AppController>,
) -> Result<()> {
    let mut input = InputState::default();
    let mut events = EventStream::new();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut changes = controller.subscribe_changes();
    let mut last_view = None;

    loop {
        let view = controller.view().await;
        if last_view != Some(view) {
            tracing::debug!("[Ui] Showing the {} view", view);
            last_view = Some(view);
        }
        let snapshot = ui::Snapshot::collect(&controller, view).await;
        terminal.draw(|frame| ui::render(frame, &snapshot, &input))?;

        tokio::select! {
            _ = frames.tick() => {}
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        handle_key(&controller, &mut input, view, key).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }

        if input.quit {
            break;
        }
    }

    Ok(())
}

/// Routes a key press to the handler for the view it was pressed on.
///
/// The view is the one that was just rendered, so keys always act on
/// what the user saw.
async fn handle_key(
    controller: &AppController,
    input: &mut InputState,
    view: View,
    key: KeyEvent,
) {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        input.quit = true;
        return;
    }

    match view {
        View::Auth => handle_auth_key(controller, input, key).await,
        View::Welcome => handle_welcome_key(controller, input, key).await,
        View::Session => handle_session_key(controller, input, key).await,
        View::TrialEnded => handle_trial_ended_key(controller, input, key).await,
    }
}

async fn handle_auth_key(controller: &AppController, input: &mut InputState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let email = input.email.clone();
            match controller.submit_email(&email).await {
                Ok(_) => {
                    input.email.clear();
                    input.error = None;
                }
                Err(e) => input.error = Some(e.to_string()),
            }
        }
        KeyCode::Backspace => {
            input.email.pop();
        }
        KeyCode::Esc => input.quit = true,
        KeyCode::Char(c) => {
            input.email.push(c);
            input.error = None;
        }
        _ => {}
    }
}

async fn handle_welcome_key(controller: &AppController, input: &mut InputState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => match controller.start_call().await {
            Ok(()) => input.error = None,
            Err(e) => input.error = Some(e.to_string()),
        },
        KeyCode::Char('q') | KeyCode::Esc => input.quit = true,
        _ => {}
    }
}

async fn handle_session_key(controller: &AppController, input: &mut InputState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('l') => controller.end_call().await,
        KeyCode::Char('q') => {
            controller.end_call().await;
            input.quit = true;
        }
        _ => {}
    }
}

/// The trial-ended screen walks offer, suggestion entry, thanks.
async fn handle_trial_ended_key(controller: &AppController, input: &mut InputState, key: KeyEvent) {
    match controller.flow_step().await {
        FlowStep::Offer => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => controller.proceed_to_suggest().await,
            KeyCode::Char('n') | KeyCode::Esc => controller.dismiss_offer().await,
            KeyCode::Char('q') => input.quit = true,
            _ => {}
        },
        FlowStep::Suggest => match key.code {
            KeyCode::Enter => {
                let text = input.suggestion.clone();
                match controller.submit_suggestion(&text).await {
                    Ok(()) => {
                        input.suggestion.clear();
                        input.error = None;
                    }
                    Err(e) => input.error = Some(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                input.suggestion.pop();
            }
            KeyCode::Esc => {
                input.suggestion.clear();
                input.error = None;
                controller.dismiss_offer().await;
            }
            KeyCode::Char(c) => {
                input.suggestion.push(c);
                input.error = None;
            }
            _ => {}
        },
        FlowStep::Thanks => match key.code {
            KeyCode::Enter | KeyCode::Esc => controller.acknowledge_thanks().await,
            KeyCode::Char('q') => input.quit = true,
            _ => {}
        },
    }
}
