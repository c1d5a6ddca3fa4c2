pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{self, ApiClient};
use crate::fetch;
use app::{FetchOutcome, FetchRequest, InputMode, Stage};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App, client: ApiClient) -> anyhow::Result<()> {
    // Hold warnings while the terminal is in raw mode; background fetches
    // would otherwise write into the display
    crate::log::hold();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250); // 250ms tick

    // At most one load in flight; a newer request supersedes it
    let mut pending_fetch: Option<tokio::task::JoinHandle<(u64, FetchOutcome)>> = None;

    loop {
        // Spawn the queued request, aborting any load it supersedes. The
        // generation tag makes a late result from the aborted task inert
        // even if it slips through.
        if let Some(request) = app.pending_request.take() {
            if let Some(stale) = pending_fetch.take() {
                stale.abort();
            }
            let generation = app.begin_fetch();
            let client = client.clone();
            let max_concurrent = app.config.max_concurrent_fetches;
            let verbose = app.verbose;
            pending_fetch = Some(tokio::spawn(async move {
                let outcome = run_request(&client, request, max_concurrent, verbose).await;
                (generation, outcome)
            }));
        }

        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Collect a finished load
        if let Some(handle) = &mut pending_fetch {
            if handle.is_finished() {
                let handle = pending_fetch.take().unwrap();
                match handle.await {
                    Ok((generation, outcome)) => app.apply_outcome(generation, outcome),
                    Err(e) if e.is_cancelled() => {} // superseded
                    Err(e) => app.show_flash(format!("Error: fetch task panicked: {}", e)),
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal, then flush warnings held during the session
    ratatui::restore();
    for msg in crate::log::release() {
        eprintln!("{}", msg);
    }

    Ok(())
}

async fn run_request(
    client: &ApiClient,
    request: FetchRequest,
    max_concurrent: usize,
    verbose: bool,
) -> FetchOutcome {
    match request {
        FetchRequest::Faculties => FetchOutcome::Faculties(api::faculties(client).await),
        FetchRequest::Specialities { faculty_id } => {
            FetchOutcome::Specialities(api::specialities(client, faculty_id).await)
        }
        FetchRequest::Courses {
            faculty_id,
            speciality_id,
        } => FetchOutcome::Courses(api::courses(client, faculty_id, speciality_id).await),
        FetchRequest::Roster {
            speciality_id,
            course,
        } => FetchOutcome::Roster(
            fetch::fetch_roster_data(client, speciality_id, course, max_concurrent, verbose).await,
        ),
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

                // Cascade
                KeyCode::Enter => app.select_current(),
                KeyCode::Esc | KeyCode::Backspace => app.go_back(),

                // Ranking controls (results view only)
                KeyCode::Tab if app.stage == Stage::Results => app.cycle_subject(true),
                KeyCode::BackTab if app.stage == Stage::Results => app.cycle_subject(false),
                KeyCode::Char('t') if app.stage == Stage::Results => app.cycle_lesson_type(),
                KeyCode::Char('m') if app.stage == Stage::Results => app.toggle_mode(),
                KeyCode::Char('h') if app.stage == Stage::Results => app.start_highlight_input(),
                KeyCode::Char('c') if app.stage == Stage::Results => app.clear_highlight(),

                // Refresh
                KeyCode::Char('r') => app.refresh(),

                // Help
                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        InputMode::HighlightInput => {
            match key.code {
                KeyCode::Enter => app.confirm_highlight_input(),
                KeyCode::Esc => app.cancel_highlight_input(),
                KeyCode::Backspace => {
                    app.highlight_input.pop();
                }

                // Digits, decimal point, spaces
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ' ' => {
                    app.highlight_input.push(c);
                }

                // Ignore all other keys (don't propagate to Normal mode)
                _ => {}
            }
        }
        InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
