use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use edge_terminal::board_fetch::{self, SourceConfig};
use edge_terminal::state::{apply_delta, AppState, Delta, ProviderCommand};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.date_edit.is_some() {
            match key.code {
                KeyCode::Enter => {
                    if self.state.commit_date_edit() {
                        self.request_board();
                    }
                }
                KeyCode::Esc => self.state.cancel_date_edit(),
                KeyCode::Backspace => self.state.date_edit_backspace(),
                KeyCode::Char(c) => self.state.date_edit_push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.state.cycle_league_mode();
                self.request_board();
            }
            KeyCode::Char('d') | KeyCode::Char('D') => self.state.start_date_edit(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_board(),
            KeyCode::Char('j') | KeyCode::Down => {
                let max = self.state.board_lines().len().saturating_sub(1);
                self.state.scroll_down(max);
            }
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_board(&mut self) {
        let generation = self.state.begin_load();
        let cmd = ProviderCommand::LoadBoard {
            mode: self.state.league_mode,
            date: self.state.date.clone(),
            generation,
        };
        if self.cmd_tx.send(cmd).is_err() {
            self.state.loading = false;
            self.state.push_log("[WARN] Board request failed");
        } else {
            self.state.push_log(format!(
                "[INFO] Loading {} board for {}",
                self.state.league_mode.label(),
                self.state.date
            ));
        }
    }
}

fn spawn_provider(tx: mpsc::Sender<Delta>, cmd_rx: mpsc::Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let cfg = SourceConfig::from_env();
        while let Ok(cmd) = cmd_rx.recv() {
            let ProviderCommand::LoadBoard {
                mode,
                date,
                generation,
            } = cmd;
            let delta = match board_fetch::load_daily_board(&cfg, mode, &date) {
                Ok(board) => Delta::BoardLoaded { generation, board },
                Err(err) => Delta::BoardFailed {
                    generation,
                    message: format!("{err:#}"),
                },
            };
            if tx.send(delta).is_err() {
                break;
            }
        }
    });
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    app.request_board();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_board(frame, chunks[1], &app.state);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let date = match &state.date_edit {
        Some(buf) => format!("{buf}_"),
        None => state.date.clone(),
    };
    let loading = if state.loading { " | loading..." } else { "" };
    format!(
        "EDGE BOARD | {} | {date}{loading}",
        state.league_mode.label()
    )
}

fn footer_text(state: &AppState) -> String {
    if state.date_edit.is_some() {
        return "Type date (YYYY-MM-DD) | Enter Load | Esc Cancel".to_string();
    }
    let keys = "l League | d Date | r Reload | j/k/\u{2191}/\u{2193} Scroll | ? Help | q Quit";
    match state.logs.back() {
        Some(last) => format!("{keys}\n{last}"),
        None => keys.to_string(),
    }
}

fn render_board(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.loading {
        let msg = Paragraph::new("Loading board...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, area);
        return;
    }

    if !state.status.is_empty() {
        let msg =
            Paragraph::new(state.status.as_str()).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, area);
        return;
    }

    let lines = state.board_lines();
    if lines.is_empty() {
        let msg = Paragraph::new("No board loaded. Press r to load, d to pick a date.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, area);
        return;
    }

    let styled: Vec<Line> = lines
        .iter()
        .map(|line| {
            // Box title lines are flush left; detail rows are indented.
            if !line.is_empty() && !line.starts_with(' ') {
                Line::styled(
                    line.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Line::raw(line.clone())
            }
        })
        .collect();

    let max_scroll = lines.len().saturating_sub(area.height as usize);
    let offset = state.scroll.min(max_scroll) as u16;
    let board = Paragraph::new(styled).scroll((offset, 0));
    frame.render_widget(board, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.min(52);
    let height = area.height.min(12);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let text = "EDGE BOARD KEYS\n\n\
        l  cycle league (NHL / NBA / NCAAB / Soccer)\n\
        d  edit the board date\n\
        r  reload the current board\n\
        j/k  scroll the game boxes\n\
        ?  toggle this help\n\
        q  quit";

    frame.render_widget(Clear, popup);
    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(help, popup);
}
