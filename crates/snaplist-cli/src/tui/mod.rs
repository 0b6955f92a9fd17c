//! snaplist TUI
//!
//! Terminal user interface for the todo list.
//!
//! ## Layout
//!
//! - Top: the list, with the item under edit highlighted
//! - Middle: input line for adding or editing
//! - Bottom: status bar
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Move selection up/down
//! - a / i: Add item (Enter commits, Esc cancels)
//! - e / Enter: Edit selected item
//! - d: Delete selected item
//! - s: Save list to server
//! - r: Reload list from server
//! - X X: Clear server list
//! - ?: Help
//! - q: Quit
//!
//! Server calls run as background tasks; their results come back over a
//! channel and are applied in the event loop, so the UI never blocks on the
//! network.

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use snaplist_core::{Config, SyncClient, TodoSession};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use app::{App, Completion, InputMode, Request};

/// Run the TUI application
pub async fn run(config: &Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if SNAPLIST_LOG is set)
    init_tui_logging(config);

    let client = SyncClient::from_config(config)?;
    let mut app = App::new(TodoSession::new(client.clone()));
    let (tx, rx) = mpsc::channel(16);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Initial load
    let request = app.request_load();
    spawn_request(&client, request, &tx);

    let result = run_app(&mut terminal, &mut app, &client, tx, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &SyncClient,
    tx: mpsc::Sender<Completion>,
    mut rx: mpsc::Receiver<Completion>,
) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            // Finished server calls
            Some(completion) = rx.recv() => {
                app.apply(completion);
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if !event::poll(Duration::from_millis(0))? {
                    continue;
                }
                let Event::Key(key) = event::read()? else {
                    continue;
                };

                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // If a notice is showing, any key dismisses it
                if app.has_notice() {
                    app.dismiss_notice();
                    continue;
                }

                // If help is showing, any key dismisses it
                if app.show_help {
                    app.show_help = false;
                    continue;
                }

                let request = match app.input_mode {
                    InputMode::Normal => handle_normal_mode(app, key.code, key.modifiers),
                    InputMode::Insert => {
                        handle_insert_mode(app, key.code);
                        None
                    }
                };

                if let Some(request) = request {
                    spawn_request(client, request, &tx);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
///
/// Returns a server call to start, if the key asked for one.
fn handle_normal_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Request> {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Up | KeyCode::Down
    ) {
        app.status_message = None;
    }

    if code != KeyCode::Char('X') {
        app.pending_clear = None;
    }

    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),

        KeyCode::Char('a') | KeyCode::Char('i') => app.start_insert(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
        KeyCode::Char('d') => app.remove_selected(),

        KeyCode::Char('s') => return Some(app.request_save()),
        KeyCode::Char('r') => return Some(app.request_load()),
        KeyCode::Char('X') => return app.request_clear(),

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }

    None
}

/// Handle key events while typing
fn handle_insert_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.submit(),
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Run a server call in the background and send its result to the loop
fn spawn_request(client: &SyncClient, request: Request, tx: &mpsc::Sender<Completion>) {
    let client = client.clone();
    let tx = tx.clone();

    tokio::spawn(async move {
        let completion = match request {
            Request::Load(ticket) => Completion::Load(ticket, client.load().await),
            Request::Save(ticket, items) => Completion::Save(ticket, client.save(&items).await),
            Request::Clear(ticket) => Completion::Clear(ticket, client.clear().await),
        };

        if tx.send(completion).await.is_err() {
            debug!("Event loop gone; dropping server response");
        }
    });
}

/// Initialize file-based logging for TUI
fn init_tui_logging(config: &Config) {
    // Only log if SNAPLIST_LOG is set
    let Ok(log_level) = std::env::var("SNAPLIST_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "snaplist_core={},snaplist_cli={}",
        log_level, log_level
    ));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
