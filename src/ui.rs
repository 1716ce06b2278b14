use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use picklock::session::{LockUnit, Session, SessionStatus};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 4;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.status() {
            SessionStatus::Idle => render_splash(area, buf),
            SessionStatus::Active => render_game(self, area, buf),
            SessionStatus::Won => render_outcome(
                "UNLOCKED!",
                "every barrel clicked into place",
                Color::Green,
                area,
                buf,
            ),
            SessionStatus::Lost => render_outcome(
                "OUT OF PICKS",
                "the lock wins this time",
                Color::Red,
                area,
                buf,
            ),
        }
    }
}

fn render_splash(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            "picklock",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("w to run the pick, enter to set it"),
        Line::from(Span::styled(
            "press any key to begin",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    centered(lines, area, buf);
}

fn render_outcome(title: &str, detail: &str, color: Color, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(detail.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "(r)etry / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    centered(lines, area, buf);
}

fn centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(4), // barrels
            Constraint::Length(3), // track
            Constraint::Length(1), // message
            Constraint::Min(0),
            Constraint::Length(1), // help
        ])
        .split(area);

    render_header(&app.session, chunks[0], buf);
    render_barrels(&app.session, chunks[1], buf);
    render_track(&app.session, chunks[2], buf);

    if let Some(msg) = &app.message {
        Paragraph::new(Span::styled(
            msg.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled(
        "w: run pick   enter: set   r: restart   esc: quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);
}

fn render_header(session: &Session, area: Rect, buf: &mut Buffer) {
    let header = Line::from(vec![
        Span::styled(
            format!("barrel {}/{}", session.current_unit(), session.units().len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            format!("picks {}", session.picks()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(
            session.status().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_barrels(session: &Session, area: Rect, buf: &mut Buffer) {
    let count = session.units().len().max(1);
    let constraints = vec![Constraint::Ratio(1, count as u32); count];
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (unit, cell) in session.units().iter().zip(cells.iter()) {
        render_barrel(session, unit, *cell, buf);
    }
}

fn render_barrel(session: &Session, unit: &LockUnit, area: Rect, buf: &mut Buffer) {
    let is_current = session.is_active() && unit.id == session.current_unit();

    let (label, color) = if unit.is_unlocked {
        ("UNLOCKED", Color::Green)
    } else if is_current && session.is_engaged() {
        ("IN PROGRESS", Color::Magenta)
    } else if is_current && session.last_run_overran() {
        // The pick ran off the end; this barrel is waiting for another try.
        ("READY", Color::Yellow)
    } else {
        ("LOCKED", Color::DarkGray)
    };

    let border_style = if is_current {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", unit.id));

    let inner = block.inner(area);
    block.render(area, buf);

    Paragraph::new(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(inner, buf);
}

/// One row of cells spanning 0..100% of travel: the target window in green,
/// the indicator on top of it, and everything past the auto-stop point dimmed.
fn render_track(session: &Session, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::DIM));
    let inner = block.inner(area);
    block.render(area, buf);

    let width = inner.width as usize;
    if width == 0 {
        return;
    }

    let to_col = |pct: f64| -> usize {
        let col = (pct / 100.0 * (width.saturating_sub(1)) as f64).round();
        (col.max(0.0) as usize).min(width - 1)
    };

    let bounds = session.target_bounds(session.current_unit());
    let indicator_col = to_col(session.indicator_position());
    let overrun_col = to_col(session.track_length());

    let spans: Vec<Span> = (0..width)
        .map(|col| {
            let in_window = bounds
                .map(|(lo, hi)| col >= to_col(lo) && col <= to_col(hi))
                .unwrap_or(false);

            if col == indicator_col && session.is_engaged() {
                Span::styled(
                    "┃",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )
            } else if in_window {
                Span::styled("█", Style::default().fg(Color::Green))
            } else if col > overrun_col {
                Span::styled("·", Style::default().add_modifier(Modifier::DIM))
            } else {
                Span::styled("─", Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    Paragraph::new(Line::from(spans)).render(inner, buf);
}
