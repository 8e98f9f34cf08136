//! A terminal form renderer for server-described JSON views.
//!
//! Type a URL (or pass one on the command line); the document behind it is
//! fetched after a short quiet period and rendered as a vertical stack of
//! text, image and choice widgets.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::app::{
    event::{bind_controller, spawn_event_reader, AppEvent, ViewChange},
    handler,
    net_runtime::{spawn_document_fetch, spawn_image_load, NetUpdate},
    state::{AppState, Focus},
};
use crate::core::fetch::FetchController;
use crate::ui::{
    form_widget::FormWidget,
    layout::AppLayout,
    popup::InfoPopup,
    spinner::FetchIndicator,
    theme::Theme,
    url_field::UrlFieldWidget,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Render a JSON-described form in the terminal")]
struct Cli {
    /// Document URL (defaults to the config file, then the sample document).
    url: Option<String>,

    /// Quiet period in milliseconds between the last URL edit and the fetch.
    #[arg(long = "debounce-ms")]
    debounce_ms: Option<u64>,
}

// ───────────────────────────────────────── drawing ───────────

/// Draw one frame.  Returns `true` when the form's content width changed
/// and the stack has to be laid out again.
fn draw(frame: &mut Frame, state: &mut AppState) -> bool {
    let area = frame.area();
    let layout = AppLayout::from_area(area);
    let content = layout.form_content();

    state.terminal_area = area;
    state.form_height = content.height;
    let relayout = state.form_width != content.width;
    state.form_width = content.width;

    let url_widget = UrlFieldWidget {
        field: &state.url_field,
        status: state.controller.status(),
        focused: state.focus == Focus::UrlField,
    };
    let cursor = url_widget.cursor_position(layout.url_area);
    frame.render_widget(url_widget, layout.url_area);
    if state.focus == Focus::UrlField && state.popup.is_none() {
        frame.set_cursor_position(cursor);
    }

    let form_focused = state.focus == Focus::Form;
    let block = Block::default()
        .title(Line::from(Span::styled(" Form ", Theme::title_style())))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_style(form_focused));
    frame.render_widget(
        FormWidget {
            block,
            stack: &state.stack,
            state: &state.form_state,
            images: &state.image_cache,
            has_focus: form_focused,
        },
        layout.form_area,
    );
    frame.render_widget(
        FetchIndicator {
            phase: state.controller.phase(),
            tick: state.tick,
        },
        layout.form_area,
    );

    let hint = state.config.status_bar_hint();
    frame.render_widget(
        Paragraph::new(hint).style(Theme::status_bar_style()),
        layout.status_area,
    );

    if let Some(message) = state.popup.as_deref() {
        frame.render_widget(
            InfoPopup {
                message: Some(message),
            },
            area,
        );
    }

    relayout
}

/// Lay the current document out again, e.g. after the width changed.
fn relayout(state: &mut AppState) {
    let doc = state.controller.document().clone();
    state.rebuild(&doc);
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    let mut user_config = config::AppConfig::load();
    if let Some(ms) = cli.debounce_ms {
        user_config.debounce = config::debounce_from_millis(ms);
    }
    let initial_url = cli.url.unwrap_or_else(|| user_config.default_url.clone());

    let mut controller = FetchController::new(user_config.debounce);
    let (binding, mut changes) = bind_controller(&mut controller);
    controller.set_url(initial_url, Instant::now());
    let mut state = AppState::new(controller, user_config);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(
        stderr_handle,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── async channels ────────────────────────────────────────
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let (net_tx, mut net_rx) = mpsc::unbounded_channel::<NetUpdate>();
    let client = reqwest::Client::new();

    // ── event loop ────────────────────────────────────────────
    loop {
        let mut needs_relayout = false;
        terminal.draw(|frame| needs_relayout = draw(frame, &mut state))?;
        if needs_relayout {
            relayout(&mut state);
        }

        for url in state.take_images_to_load() {
            tracing::debug!(%url, "image: loading");
            spawn_image_load(net_tx.clone(), client.clone(), url);
        }

        let deadline = state.controller.next_deadline();
        let wake = tokio::time::Instant::from_std(deadline.unwrap_or_else(Instant::now));

        tokio::select! {
            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k, Instant::now()),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Paste(text) => handler::handle_paste(&mut state, &text, Instant::now()),
                    // The next draw picks up the new width.
                    AppEvent::Resize => {}
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(change) = changes.recv() => {
                match change {
                    ViewChange::Document(doc) => state.rebuild(&doc),
                    // Drawn straight from the controller.
                    ViewChange::Status(status) => tracing::debug!(%status, "status changed"),
                }
            }

            Some(update) = net_rx.recv() => {
                match update {
                    NetUpdate::Document { generation, result } => {
                        if let Some(outcome) = state.controller.complete(generation, result) {
                            tracing::info!(?outcome, "fetch: settled");
                        }
                    }
                    NetUpdate::Image { url, result } => match result {
                        Ok(image) => state.image_arrived(url, image),
                        Err(e) => {
                            tracing::warn!(%url, "image: {e}");
                            state.image_failed(url);
                        }
                    },
                }
            }

            _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                if let Some(request) = state.controller.poll(Instant::now()) {
                    tracing::info!(url = %request.url, generation = request.generation, "fetch: start");
                    spawn_document_fetch(net_tx.clone(), client.clone(), request);
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    binding.release(&mut state.controller);
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    Ok(())
}
