mod action;
mod app;
mod chat_list;
mod command;
mod config;
mod error;
mod export;
mod message;
mod platform;
mod reply;
mod scheduler;
mod sheet;
mod theme;
mod ui;
mod ui_state;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
        EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, layout::Position, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use action::Action;
use app::App;
use config::{Config, ReplyDelay};
use sheet::SheetId;
use ui::draw;
use ui_state::Focus;

/// Terminal chat demo with simulated replies.
#[derive(Parser, Debug)]
#[command(name = "threadsim", version, about)]
struct Args {
    /// Seed for reply selection and delays
    #[arg(long)]
    seed: Option<u64>,

    /// Use a fixed reply delay in milliseconds
    #[arg(long, value_name = "MS")]
    fixed_reply_delay: Option<u64>,

    /// Directory for settings and exports
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Log file (defaults to threadsim.log in the data dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Never show the notification prompt
    #[arg(long)]
    no_notify_prompt: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let mut config = Config::default();
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(ms) = self.fixed_reply_delay {
            config.reply_delay = ReplyDelay::Fixed(ms);
        }
        config.seed = self.seed;
        config.notify_prompt = !self.no_notify_prompt;
        config
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_file = args.log_file.clone();
    let config = args.into_config();
    let log_path = log_file.unwrap_or_else(|| config.data_dir.join("threadsim.log"));
    init_logging(&log_path)?;
    info!("threadsim starting, data dir {}", config.data_dir.display());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    app.ui.viewport_columns = terminal.size()?.width;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("Event loop failed: {}", e);
    }
    info!("threadsim exiting");
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut frames = tokio::time::interval(Duration::from_millis(app.config.tick_rate_ms));
    let start = Instant::now();

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        tokio::select! {
            _ = frames.tick() => {
                app.tick_to(start.elapsed().as_millis() as u64);
            }
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => {
                    let size = terminal.size()?;
                    handle_event(app, event, size.width, size.height);
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_event(app: &mut App, event: Event, width: u16, height: u16) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Paste(text) => {
            // Single-line composer
            let filtered: String = text
                .chars()
                .filter(|c| *c != '\r')
                .map(|c| if c == '\n' { ' ' } else { c })
                .collect();
            app.ui.input.push_str(&filtered);
            app.reset_command_selection();
        }
        Event::Mouse(mouse) => handle_mouse(app, mouse, width, height),
        Event::Resize(columns, _) => app.ui.viewport_columns = columns,
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Modal dialogs swallow everything
    if app.confirm.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.resolve_confirm(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.resolve_confirm(false),
            _ => {}
        }
        return;
    }
    if app.ui.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.ui.show_help = false;
        }
        return;
    }
    if app.notify_prompt_visible {
        match key.code {
            KeyCode::F(9) => {
                app.allow_notifications();
                return;
            }
            KeyCode::F(10) => {
                app.deny_notifications();
                return;
            }
            _ => {}
        }
    }

    if app.sheets.open().is_some() {
        match key.code {
            KeyCode::Esc => {
                app.sheets.close_all();
            }
            KeyCode::Left | KeyCode::Up => app.sheets.move_focus(-1),
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => app.sheets.move_focus(1),
            KeyCode::Enter => app.pick_sheet_item(),
            KeyCode::Char('e') if ctrl => app.dispatch(Action::ToggleSheet(SheetId::Emoji)),
            KeyCode::Char('a') if ctrl => app.dispatch(Action::ToggleSheet(SheetId::Attach)),
            _ => {}
        }
        return;
    }

    if ctrl {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.dispatch(Action::Quit),
            KeyCode::Char('k') => app.ui.focus = Focus::Search,
            KeyCode::Char('n') => app.dispatch(Action::NewChat),
            KeyCode::Char('b') => app.dispatch(Action::ToggleSidebar),
            KeyCode::Char('e') => app.dispatch(Action::ToggleSheet(SheetId::Emoji)),
            KeyCode::Char('a') => app.dispatch(Action::ToggleSheet(SheetId::Attach)),
            KeyCode::Char('t') => app.dispatch(Action::Theme { theme: None }),
            KeyCode::Char('r') => app.dispatch(Action::ToggleVoice),
            _ => {}
        }
        return;
    }

    if key.code == KeyCode::Tab {
        if app.showing_command_popup() && app.ui.command_selection.is_some() {
            app.apply_command_selection();
        } else {
            app.cycle_focus();
        }
        return;
    }

    match app.ui.focus {
        Focus::Search => handle_search_key(app, key),
        Focus::ChatList => handle_list_key(app, key),
        Focus::Thread => handle_thread_key(app, key),
        Focus::Input => handle_input_key(app, key),
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if app.ui.search.is_empty() {
                app.ui.focus = Focus::Input;
            } else {
                app.search("");
            }
        }
        KeyCode::Enter | KeyCode::Down => {
            app.ui.focus = Focus::ChatList;
            app.list_step(true);
        }
        KeyCode::Backspace => {
            let mut query = app.ui.search.clone();
            query.pop();
            app.search(&query);
        }
        KeyCode::Char(c) => {
            let query = format!("{}{}", app.ui.search, c);
            app.search(&query);
        }
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.list_step(false),
        KeyCode::Down | KeyCode::Char('j') => app.list_step(true),
        KeyCode::Enter => {
            app.list_activate();
            app.ui.focus = Focus::Input;
        }
        KeyCode::Delete | KeyCode::Char('d') => {
            if let Some(id) = app.ui.list_cursor {
                app.request_delete(id);
            }
        }
        KeyCode::Esc => app.ui.focus = Focus::Input,
        _ => {}
    }
}

fn handle_thread_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Char('c') => app.copy_message(None),
        KeyCode::Char('+') => app.react(None, message::Reaction::Liked),
        KeyCode::Char('-') => app.react(None, message::Reaction::Disliked),
        KeyCode::Esc => app.ui.focus = Focus::Input,
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if app.showing_command_popup() && app.ui.command_selection.is_some() {
                app.reset_command_selection();
            } else if app.notify_prompt_visible {
                app.deny_notifications();
            } else if !app.ui.input.is_empty() {
                app.ui.input.clear();
            } else {
                app.should_quit = true;
            }
        }
        KeyCode::Enter => {
            if app.showing_command_popup() && app.ui.command_selection.is_some() {
                app.apply_command_selection();
            } else {
                app.submit_message();
            }
        }
        KeyCode::Backspace => {
            app.ui.input.pop();
            app.reset_command_selection();
        }
        KeyCode::Char(c) => {
            app.ui.input.push(c);
            app.reset_command_selection();
        }
        KeyCode::Up => {
            if app.showing_command_popup() {
                app.command_select_up();
            } else {
                app.scroll_up();
            }
        }
        KeyCode::Down => {
            if app.showing_command_popup() {
                app.command_select_down();
            } else {
                app.scroll_down();
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, width: u16, height: u16) {
    let areas = ui::layout(ratatui::layout::Rect::new(0, 0, width, height), app);
    let at = Position::new(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let inside = areas.sheet.is_some_and(|r| r.contains(at));
            if app.sheets.pointer_down(inside) {
                return;
            }
            if app.confirm.is_some() || app.ui.show_help {
                return;
            }
            if let Some(id) = ui::chat_at(app, &areas, mouse.column, mouse.row) {
                app.select_chat(id);
                app.ui.focus = Focus::ChatList;
            } else if areas.search.is_some_and(|r| r.contains(at)) {
                app.ui.focus = Focus::Search;
            } else if areas.input.contains(at) {
                app.ui.focus = Focus::Input;
            } else if areas.messages.contains(at) {
                app.ui.focus = Focus::Thread;
            } else if areas.header.contains(at) {
                app.dispatch(Action::ToggleSidebar);
            }
        }
        MouseEventKind::ScrollUp if areas.messages.contains(at) => app.scroll_up(),
        MouseEventKind::ScrollDown if areas.messages.contains(at) => app.scroll_down(),
        MouseEventKind::ScrollUp => app.list_step(false),
        MouseEventKind::ScrollDown => app.list_step(true),
        _ => {}
    }
}
