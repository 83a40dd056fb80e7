pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use crate::error::BoardResult;
use crate::storage::TaskStore;
use crate::summary::GeminiSummarizer;
use app::{App, InputField, InputMode, ViewMode};
use ui::ui;

/// Elapsed-time labels refresh at this rate even without input.
const TICK: Duration = Duration::from_secs(1);

pub fn run_tui(store: TaskStore, config: &Config) -> BoardResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let summarizer = GeminiSummarizer::new(config.api_key.clone(), config.model.clone());
    let mut app = App::new(store, Box::new(summarizer), runtime);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if app.generating {
            // The "generating" banner is on screen; now wait for the service.
            app.finish_summary();
            continue;
        }

        if !event::poll(TICK)? {
            app.tick();
            continue;
        }
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => {
                app.message = None;
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Tab => app.toggle_view(),
                    _ if app.view_mode == ViewMode::Report => match key.code {
                        KeyCode::Char('s') => {
                            app.begin_summary();
                        }
                        KeyCode::Char('f') => app.start_edit(InputField::RangeFrom),
                        KeyCode::Char('t') => app.start_edit(InputField::RangeTo),
                        _ => {}
                    },
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Left | KeyCode::Char('h') => app.focus_left(),
                    KeyCode::Right | KeyCode::Char('l') => app.focus_right(),
                    KeyCode::Char(']') | KeyCode::Char(' ') => app.advance_selected(),
                    KeyCode::Char('[') | KeyCode::Backspace => app.retreat_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
                    KeyCode::Char('a') => app.start_add(),
                    KeyCode::Char('e') => app.start_edit(InputField::Title),
                    KeyCode::Char('c') => app.start_edit(InputField::Category),
                    KeyCode::Char('n') => app.start_edit(InputField::Quantity),
                    KeyCode::Char('o') => app.start_edit(InputField::Description),
                    _ => {}
                }
            }
            InputMode::Confirming => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
                _ => app.cancel_input(),
            },
            InputMode::Editing | InputMode::Adding => match key.code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            },
        }
    }
}
