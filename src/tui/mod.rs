mod help;
mod state;

use crate::cli::{build_config, Cli};
use crate::model::{Algorithm, RunState, SortEvent};
use crate::orchestrator::{self, ControlCommand, SPEED_MAX, SPEED_MIN};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Bars added or removed per `[`/`]` press.
const SIZE_STEP: usize = 5;

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    // Unbounded channels avoid backpressure and task switching in the hot path.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SortEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ControlCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(event_rx, cmd_tx));

    let res = orchestrator::run_controller(&cfg, args.start_on_launch, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    mut event_rx: UnboundedReceiver<SortEvent>,
    cmd_tx: UnboundedSender<ControlCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::default();

    let tick_rate = Duration::from_millis(33);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(ControlCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % 2;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = 1;
                    }
                    (_, code) => {
                        if let Some(cmd) = command_for_key(&state, code) {
                            let _ = cmd_tx.send(cmd);
                        }
                    }
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Map a key to a controller command. The controller enforces locking and bounds.
fn command_for_key(state: &UiState, code: KeyCode) -> Option<ControlCommand> {
    let cmd = match code {
        KeyCode::Char(' ') | KeyCode::Char('s') => ControlCommand::Start,
        KeyCode::Char('p') => ControlCommand::PauseToggle,
        KeyCode::Char('r') => ControlCommand::Reset,
        KeyCode::Char('g') => ControlCommand::Generate,
        KeyCode::Left => ControlCommand::SetAlgorithm(state.algorithm.prev()),
        KeyCode::Right => ControlCommand::SetAlgorithm(state.algorithm.next()),
        KeyCode::Char(c @ '1'..='8') => {
            let idx = c.to_digit(10)? as usize - 1;
            ControlCommand::SetAlgorithm(*Algorithm::ALL.get(idx)?)
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            ControlCommand::SetSpeed((state.speed + 1).min(SPEED_MAX))
        }
        KeyCode::Char('-') => ControlCommand::SetSpeed(state.speed.saturating_sub(1).max(SPEED_MIN)),
        KeyCode::Char('[') => ControlCommand::SetSize(state.bars.len().saturating_sub(SIZE_STEP)),
        KeyCode::Char(']') => ControlCommand::SetSize(state.bars.len() + SIZE_STEP),
        _ => return None,
    };
    Some(cmd)
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Visualizer"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("sortviz"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_visualizer(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_visualizer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(42)].as_ref())
        .split(main[0]);

    draw_bars(row[0], f, state);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)].as_ref())
        .split(row[1]);
    draw_stats(side[0], f, state);
    draw_descriptor(side[1], f, state);
    draw_status(main[1], f, state);
}

fn draw_bars(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let n = state.bars.len();
    let max = state.max_value().max(1);
    let title = format!("{} ({} bars)", state.algorithm.descriptor().name, n);

    // Fit every bar inside the borders; drop the gap first when space is tight.
    let inner = area.width.saturating_sub(2) as usize;
    let (bar_width, bar_gap) = match n {
        0 => (1, 0),
        _ if inner / n >= 3 => ((inner + 1) / n - 1, 1),
        _ => ((inner / n).max(1), 0),
    };

    let bars: Vec<Bar> = state
        .bars
        .iter()
        .enumerate()
        .map(|(i, v)| {
            Bar::default()
                .value(u64::from(*v))
                .text_value(String::new())
                .style(Style::default().fg(state.bar_color(i)))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width as u16)
        .bar_gap(bar_gap)
        .max(u64::from(max));
    f.render_widget(chart, area);
}

fn draw_stats(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let label = |s: &str| Span::styled(format!("{s:<13}"), Style::default().fg(Color::Gray));
    let (state_text, state_color) = match state.run_state {
        RunState::Idle => ("Idle", Color::Gray),
        RunState::Running => ("Running", Color::Yellow),
        RunState::Paused => ("Paused", Color::Magenta),
        RunState::Completed => ("Completed", Color::Green),
    };
    let lines = vec![
        Line::from(vec![
            label("State:"),
            Span::styled(state_text, Style::default().fg(state_color)),
        ]),
        Line::from(vec![
            label("Comparisons:"),
            Span::raw(state.stats.comparisons.to_string()),
        ]),
        Line::from(vec![
            label("Swaps:"),
            Span::raw(state.stats.swaps.to_string()),
        ]),
        Line::from(vec![
            label("Time:"),
            Span::raw(format!("{} ms", state.stats.elapsed_ms)),
        ]),
        Line::from(vec![
            label("Speed:"),
            Span::raw(format!("{}x (max {SPEED_MAX}x)", state.speed)),
        ]),
        Line::from(vec![label("Size:"), Span::raw(state.bars.len().to_string())]),
    ];
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Statistics"));
    f.render_widget(p, area);
}

fn draw_descriptor(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let d = state.algorithm.descriptor();
    let complexity = |label: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{label:<9}"), Style::default().fg(Color::Gray)),
            Span::styled(value.to_string(), Style::default().fg(Color::Cyan)),
        ])
    };
    let lines = vec![
        Line::from(Span::styled(
            d.name,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(d.description),
        Line::from(""),
        complexity("Best:", d.best),
        complexity("Average:", d.average),
        complexity("Worst:", d.worst),
        complexity("Space:", d.space),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Algorithm"));
    f.render_widget(p, area);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let hint = "space start | p pause | r reset | g new | ←/→ algo | +/- speed | [/] size | ? help";
    let text = if state.info.is_empty() {
        hint.to_string()
    } else {
        format!("{}  |  {hint}", state.info)
    };
    let p = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}
