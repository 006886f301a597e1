//! Screen layout and drawing.

use ratatui::{prelude::*, widgets::*};
use tokio::time::Instant;

use crate::session::{format_clock, Session};
use crate::types::{Mode, TaskFilter};

use super::app::{App, Focus};

const BASE_BG: (u8, u8, u8) = (17, 24, 39);
const MUTED: Color = Color::Rgb(156, 163, 175);
const BAR_WIDTH: usize = 10;

/// Fill color of a mode.
fn mode_rgb(mode: Mode) -> (u8, u8, u8) {
    match mode {
        Mode::Focus => (239, 68, 68),
        Mode::ShortBreak => (59, 130, 246),
        Mode::LongBreak => (34, 197, 94),
    }
}

/// Lighter accent used for text and the ring.
fn accent(mode: Mode) -> Color {
    match mode {
        Mode::Focus => Color::Rgb(248, 113, 113),
        Mode::ShortBreak => Color::Rgb(96, 165, 250),
        Mode::LongBreak => Color::Rgb(74, 222, 128),
    }
}

/// Mixes `over` onto `base` with opacity `alpha`.
pub fn blend(base: (u8, u8, u8), over: (u8, u8, u8), alpha: f32) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, o: u8| (f32::from(b) + (f32::from(o) - f32::from(b)) * alpha).round() as u8;
    Color::Rgb(mix(base.0, over.0), mix(base.1, over.1), mix(base.2, over.2))
}

/// Text progress bar of `width` cells.
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Draws the whole screen.
pub fn render(f: &mut Frame, app: &App, session: &Session, now: Instant) {
    let background = match app.tint_at(now) {
        Some((mode, strength)) => blend(BASE_BG, mode_rgb(mode), strength),
        None => Color::Rgb(BASE_BG.0, BASE_BG.1, BASE_BG.2),
    };
    f.render_widget(Block::default().style(Style::default().bg(background)), f.size());

    let settings_height = if app.show_settings { 5 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // Mode selector
            Constraint::Length(6),               // Timer
            Constraint::Length(2),               // Completed count
            Constraint::Min(7),                  // Tasks
            Constraint::Length(settings_height), // Settings
            Constraint::Length(1),               // Help
        ])
        .split(f.size());

    render_modes(f, session, chunks[0]);
    render_timer(f, session, chunks[1]);
    render_count(f, session, chunks[2]);
    render_tasks(f, app, session, chunks[3]);
    if app.show_settings {
        render_settings(f, session, chunks[4]);
    }
    render_help(f, app, chunks[5]);
}

fn render_modes(f: &mut Frame, session: &Session, area: Rect) {
    let current = session.timer().mode;
    let titles: Vec<Line> = Mode::ALL
        .iter()
        .enumerate()
        .map(|(i, mode)| Line::from(format!("{} {}", i + 1, mode.label())))
        .collect();
    let selected = Mode::ALL.iter().position(|m| *m == current).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
        .select(selected)
        .style(Style::default().fg(MUTED))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(blend(BASE_BG, mode_rgb(current), 0.6))
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn render_timer(f: &mut Frame, session: &Session, area: Rect) {
    let timer = session.timer();
    let color = accent(timer.mode);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1), // Clock
            Constraint::Length(1), // Status
            Constraint::Length(3), // Ring
        ])
        .split(area);

    let clock = Paragraph::new(format_clock(timer.remaining_seconds))
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(clock, rows[1]);

    let status = if timer.is_running {
        "Running"
    } else if timer.is_paused() {
        "Paused"
    } else {
        "Ready"
    };
    let status = Paragraph::new(status)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    f.render_widget(status, rows[2]);

    let ring = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
        .gauge_style(Style::default().fg(color).bg(Color::Rgb(55, 65, 81)))
        .ratio(timer.progress().clamp(0.0, 1.0))
        .label("");
    f.render_widget(ring, rows[3]);
}

fn render_count(f: &mut Frame, session: &Session, area: Rect) {
    let timer = session.timer();
    let lines = vec![
        Line::from(vec![
            Span::styled("Completed Pomodoros: ", Style::default().fg(MUTED)),
            Span::styled(
                timer.completed_focus_count.to_string(),
                Style::default().fg(accent(Mode::Focus)).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "Finish {} sessions for a long break.",
                session.settings().long_break_interval
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_tasks(f: &mut Frame, app: &App, session: &Session, area: Rect) {
    let store = session.tasks();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Tasks ")
        .title_bottom(format!(
            " {} total · {} active · {} completed ",
            store.len(),
            store.active_count(),
            store.len() - store.active_count()
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Form
            Constraint::Length(1), // Filter and sort
            Constraint::Min(1),    // List
        ])
        .split(inner);

    f.render_widget(Paragraph::new(form_line(app)), rows[0]);

    let filters: Vec<Span> = [TaskFilter::All, TaskFilter::Active, TaskFilter::Completed]
        .iter()
        .map(|filter| {
            let style = if *filter == session.filter() {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(MUTED)
            };
            Span::styled(format!(" {} ", filter.as_str()), style)
        })
        .chain(std::iter::once(Span::styled(
            format!("   {}", session.sort().label()),
            Style::default().fg(MUTED),
        )))
        .collect();
    f.render_widget(Paragraph::new(Line::from(filters)), rows[1]);

    let visible = session.visible_tasks();
    if visible.is_empty() {
        let message = Paragraph::new(store.empty_message())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(message, rows[2]);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| {
            let mut spans = vec![
                Span::raw(if task.completed { "[x] " } else { "[ ] " }),
                Span::styled(
                    task.text.clone(),
                    if task.completed {
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                    } else {
                        Style::default().fg(Color::White)
                    },
                ),
            ];
            if let Some(minutes) = task.estimated_time {
                spans.push(Span::styled(format!("  {}m", minutes), Style::default().fg(MUTED)));
            }
            if let Some(ratio) = session.task_progress(task) {
                spans.push(Span::styled(
                    format!("  {}", progress_bar(ratio, BAR_WIDTH)),
                    Style::default().fg(accent(Mode::Focus)),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).highlight_symbol("› ").highlight_style(
        Style::default().add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    if !app.focus.is_form() {
        state.select(Some(app.selected.min(visible.len() - 1)));
    }
    f.render_stateful_widget(list, rows[2], &mut state);
}

fn form_line(app: &App) -> Line<'static> {
    let field = |value: &str, placeholder: &str, focused: bool| {
        let cursor = if focused { "▏" } else { "" };
        if value.is_empty() {
            Span::styled(
                format!("{}{}", cursor, placeholder),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            let style = if focused {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(MUTED)
            };
            Span::styled(format!("{}{}", value, cursor), style)
        }
    };

    Line::from(vec![
        Span::styled("+ ", Style::default().fg(accent(Mode::Focus))),
        field(&app.form_text, "Add a new task...", app.focus == Focus::FormText),
        Span::raw("  "),
        field(&app.form_minutes, "Mins", app.focus == Focus::FormMinutes),
    ])
}

fn render_settings(f: &mut Frame, session: &Session, area: Rect) {
    let volume = session.volume();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Alarm Sound  ", Style::default().fg(MUTED)),
            Span::raw(format!("‹ {} ›", session.sound().name)),
        ]),
        Line::from(vec![
            Span::styled("Volume       ", Style::default().fg(MUTED)),
            Span::raw(format!(
                "{} {:>3}%",
                progress_bar(f64::from(volume), BAR_WIDTH),
                (volume * 100.0).round() as u32
            )),
        ]),
    ];
    if !session.has_sound() {
        lines.push(Line::from(Span::styled(
            "Sound is unavailable",
            Style::default().fg(Color::Yellow),
        )));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(" Settings "),
    );
    f.render_widget(panel, area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = if app.focus.is_form() {
        &[("Enter", "add"), ("Tab", "field"), ("Esc", "back")]
    } else {
        &[
            ("Space", "start/pause"),
            ("r", "reset"),
            ("1-3", "mode"),
            ("a", "add"),
            ("x", "done"),
            ("d", "delete"),
            ("f/o", "filter/sort"),
            ("s", "settings"),
            ("q", "quit"),
        ]
    };

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, what)| {
            [
                Span::styled(*key, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {}  ", what), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}
