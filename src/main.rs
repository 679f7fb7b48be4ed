use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{execute, terminal};
use futures_util::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use activity_board::board::{
    ActivityBoard, BannerKind, BoardEvent, ListArea, LOAD_FAILURE_TEXT, NO_PARTICIPANTS_TEXT,
    PLACEHOLDER_OPTION,
};
use activity_board::client::ActivityClient;
use activity_board::config::Config;

#[derive(Parser)]
#[command(
    name = "activity-board",
    about = "Terminal client for an activity sign-up service"
)]
struct Cli {
    /// Base URL of the Activity Service (overrides BOARD_SERVICE_URL)
    #[arg(long)]
    url: Option<String>,
    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Email,
    Select,
    Participants,
}

struct UiState {
    focus: Focus,
    participant_cursor: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Email,
            participant_cursor: 0,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    activity_board::load_env();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.url {
        config.service.url = url;
    }
    if let Some(ms) = cli.timeout_ms {
        config.service.timeout_ms = ms;
    }
    config.validate()?;
    init_tracing(&config)?;
    info!(url = %config.service.url, "starting activity board");

    let client = Arc::new(ActivityClient::new(&config)?);
    let (mut board, mut events) = ActivityBoard::new(client);
    board.load_and_render();

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut board, &mut events, &config).await;

    terminal::disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    result
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.ui.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match &config.ui.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            // the alternate screen owns the terminal
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}

async fn run(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>,
    board: &mut ActivityBoard,
    events: &mut UnboundedReceiver<BoardEvent>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut ui = UiState::default();
    let mut term_events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(config.ui.tick_ms));

    loop {
        terminal.draw(|f| draw(f, board, &ui, config))?;

        tokio::select! {
            maybe = term_events.next() => {
                match maybe {
                    Some(Ok(Event::Key(key))) => {
                        if handle_key(key, board, &mut ui) {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            Some(event) = events.recv() => {
                board.apply(event);
            }
            _ = ticker.tick() => {
                board.tick(Instant::now());
            }
        }

        ui.participant_cursor = ui
            .participant_cursor
            .min(participant_count(board).saturating_sub(1));
    }

    Ok(())
}

/// Returns true when the app should quit.
fn handle_key(key: KeyEvent, board: &mut ActivityBoard, ui: &mut UiState) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Tab => {
            ui.focus = match ui.focus {
                Focus::Email => Focus::Select,
                Focus::Select => Focus::Participants,
                Focus::Participants => Focus::Email,
            };
            return false;
        }
        _ => {}
    }

    match ui.focus {
        Focus::Email => match key.code {
            KeyCode::Char(c) => board.form.email.push(c),
            KeyCode::Backspace => {
                board.form.email.pop();
            }
            KeyCode::Enter => board.submit_signup(),
            _ => {}
        },
        Focus::Select => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => board.load_and_render(),
            KeyCode::Up => {
                board.form.selected = match board.form.selected {
                    None | Some(0) => None,
                    Some(i) => Some(i - 1),
                };
            }
            KeyCode::Down => {
                if !board.options.is_empty() {
                    board.form.selected = Some(match board.form.selected {
                        None => 0,
                        Some(i) => (i + 1).min(board.options.len() - 1),
                    });
                }
            }
            KeyCode::Enter => board.submit_signup(),
            _ => {}
        },
        Focus::Participants => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => board.load_and_render(),
            KeyCode::Up => ui.participant_cursor = ui.participant_cursor.saturating_sub(1),
            KeyCode::Down => {
                let last = participant_count(board).saturating_sub(1);
                ui.participant_cursor = (ui.participant_cursor + 1).min(last);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some((activity, email)) = participant_at(board, ui.participant_cursor) {
                    board.remove_participant(&activity, &email);
                }
            }
            _ => {}
        },
    }
    false
}

fn participant_count(board: &ActivityBoard) -> usize {
    match &board.list {
        ListArea::Cards(cards) => cards.iter().map(|c| c.participants.len()).sum(),
        _ => 0,
    }
}

fn participant_at(board: &ActivityBoard, cursor: usize) -> Option<(String, String)> {
    let ListArea::Cards(cards) = &board.list else {
        return None;
    };
    let mut row = 0usize;
    for card in cards {
        for email in &card.participants {
            if row == cursor {
                return Some((card.name.clone(), email.clone()));
            }
            row += 1;
        }
    }
    None
}

fn draw(f: &mut Frame, board: &ActivityBoard, ui: &UiState, config: &Config) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.size());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Activity Board",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(format!("Service: {}", config.service.url)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Overview"));
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    draw_activities(f, body[0], board, ui);
    draw_form(f, body[1], board, ui);
    draw_banner(f, chunks[2], board);

    let help = Paragraph::new(Line::raw(
        "Keys: Tab focus • type/Backspace edit email • ↑/↓ move • Enter sign up • d remove participant • r reload • q/Esc quit",
    ))
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[3]);
}

fn draw_activities(f: &mut Frame, area: Rect, board: &ActivityBoard, ui: &UiState) {
    let lines: Vec<Line> = match &board.list {
        ListArea::Loading => vec![Line::raw("Loading activities...")],
        ListArea::Failed => vec![Line::raw(LOAD_FAILURE_TEXT)],
        ListArea::Cards(cards) => {
            let mut lines = Vec::new();
            let mut row = 0usize;
            for card in cards {
                lines.push(Line::from(Span::styled(
                    card.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::raw(card.description.clone()));
                lines.push(Line::raw(format!("Schedule: {}", card.schedule)));
                lines.push(Line::raw(format!(
                    "Availability: {} spots left",
                    card.spots_left
                )));
                lines.push(Line::raw("Participants:"));
                if card.participants.is_empty() {
                    lines.push(Line::raw(format!("  {NO_PARTICIPANTS_TEXT}")));
                } else {
                    for email in &card.participants {
                        let pending = board.is_removal_pending(&card.name, email);
                        let mut style = Style::default();
                        if pending {
                            style = style.add_modifier(Modifier::DIM);
                        }
                        if ui.focus == Focus::Participants && row == ui.participant_cursor {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        let marker = if pending { "…" } else { "✕" };
                        lines.push(Line::from(Span::styled(
                            format!("  {marker} {email}"),
                            style,
                        )));
                        row += 1;
                    }
                }
                lines.push(Line::raw(""));
            }
            lines
        }
    };

    let list = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Activities"))
        .wrap(Wrap { trim: true });
    f.render_widget(list, area);
}

fn draw_form(f: &mut Frame, area: Rect, board: &ActivityBoard, ui: &UiState) {
    let mut lines = Vec::new();

    let email_style = if ui.focus == Focus::Email {
        Style::default().add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default()
    };
    let cursor = if ui.focus == Focus::Email { "_" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("Email: "),
        Span::styled(format!("{}{cursor}", board.form.email), email_style),
    ]));
    lines.push(Line::raw(""));
    lines.push(Line::raw("Activity:"));

    let hover = |is_selected: bool| {
        let mut style = Style::default();
        if is_selected {
            style = style.add_modifier(Modifier::BOLD);
            if ui.focus == Focus::Select {
                style = style.add_modifier(Modifier::REVERSED);
            }
        }
        style
    };
    let marker = |is_selected: bool| if is_selected { "> " } else { "  " };

    let placeholder = board.form.selected.is_none();
    lines.push(Line::from(Span::styled(
        format!("{}{PLACEHOLDER_OPTION}", marker(placeholder)),
        hover(placeholder).add_modifier(Modifier::DIM),
    )));
    for (i, name) in board.options.iter().enumerate() {
        let selected = board.form.selected == Some(i);
        lines.push(Line::from(Span::styled(
            format!("{}{name}", marker(selected)),
            hover(selected),
        )));
    }

    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Sign up for an activity"),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(form, area);
}

fn draw_banner(f: &mut Frame, area: Rect, board: &ActivityBoard) {
    let banner = match &board.banner {
        Some(banner) => {
            let style = match banner.kind {
                BannerKind::Success => Style::default().fg(Color::Green),
                BannerKind::Error => Style::default().fg(Color::Red),
            };
            Paragraph::new(Line::raw(banner.text.clone()))
                .style(style)
                .block(Block::default().borders(Borders::ALL).title("Message"))
        }
        None => Paragraph::new(Line::raw(""))
            .block(Block::default().borders(Borders::ALL).title("Message")),
    };
    f.render_widget(banner, area);
}
