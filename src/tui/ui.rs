//! TUI layout and rendering with ratatui.
//!
//! # Overview
//!
//! The review screen has four rows:
//! - Header with the position of the pair in the session
//! - Source and destination panels side by side
//! - A notice line for skipped pairs
//! - Footer with the decision keys
//!
//! # Example
//!
//! ```no_run
//! use dupereview::tui::app::App;
//! use dupereview::tui::ui::render;
//! use ratatui::Frame;
//!
//! fn draw(frame: &mut Frame, app: &App) {
//!     render(frame, app);
//! }
//! ```

use std::time::{Duration, SystemTime};

use bytesize::ByteSize;
use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use super::app::{App, AppMode, Panel, PairView};
use crate::scanner::MediaKind;

/// ASCII border set for accessible mode.
const ASCII_BORDER_SET: border::Set = border::Set {
    top_left: "+",
    top_right: "+",
    bottom_left: "+",
    bottom_right: "+",
    vertical_left: "|",
    vertical_right: "|",
    horizontal_top: "-",
    horizontal_bottom: "-",
};

/// Decision keys shown in the footer.
const FOOTER_COMMANDS: [(&str, &str); 3] = [
    ("r", "Remove source"),
    ("c/Enter", "Continue"),
    ("q/Esc", "Abort"),
];

fn border_set(accessible: bool) -> border::Set {
    if accessible {
        ASCII_BORDER_SET
    } else {
        border::ROUNDED
    }
}

fn create_block(accessible: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(border_set(accessible))
}

fn create_block_with_title<'a>(accessible: bool, title: impl Into<Line<'a>>) -> Block<'a> {
    create_block(accessible).title(title)
}

/// Render the review screen for the current application state.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Panels
            Constraint::Length(1), // Notice
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    match (app.mode(), app.pair()) {
        (AppMode::Reviewing, Some(pair)) => render_pair(frame, app, pair, chunks[1]),
        _ => render_waiting(frame, app, chunks[1]),
    }
    render_notice(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

/// Header text for the current state.
#[must_use]
pub fn header_text(app: &App) -> String {
    let context = app.context();
    if app.pair().is_none() || context.group_number == 0 {
        return "dupereview - waiting for the next pair".to_string();
    }
    format!(
        "dupereview - group {}, match {} of {}, {} marked for removal",
        context.group_number, context.match_number, context.match_count, context.removals
    )
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let header = Paragraph::new(header_text(app))
        .style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(create_block(app.is_accessible()).border_style(Style::default().fg(theme.primary)));
    frame.render_widget(header, area);
}

fn render_waiting(frame: &mut Frame, app: &App, area: Rect) {
    let message = Paragraph::new("Nothing to review yet")
        .style(Style::default().fg(app.theme().dim))
        .alignment(Alignment::Center)
        .block(create_block(app.is_accessible()));
    frame.render_widget(message, area);
}

fn render_pair(frame: &mut Frame, app: &App, pair: &PairView, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let theme = app.theme();
    render_panel(frame, app, pair, &pair.source, " Source ", theme.secondary, columns[0]);
    render_panel(frame, app, pair, &pair.dest, " Destination ", theme.success, columns[1]);
}

fn render_panel(
    frame: &mut Frame,
    app: &App,
    pair: &PairView,
    panel: &Panel,
    title: &'static str,
    accent: Color,
    area: Rect,
) {
    let block = create_block_with_title(
        app.is_accessible(),
        Span::styled(title, Style::default().fg(accent).add_modifier(Modifier::BOLD)),
    )
    .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let playback = match pair.kind {
        MediaKind::Video => app.playback(),
        _ => None,
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if playback.is_some() { 1 } else { 0 }),
        ])
        .split(inner);

    let path_width = usize::from(inner.width.saturating_sub(10)).max(8);
    let lines = panel_lines(app, pair, panel, path_width);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[0]);

    if let Some(view) = playback {
        let label = match view.duration {
            Some(d) => format!("{} / {}", format_duration(view.position), format_duration(d)),
            None => format_duration(view.position),
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(app.theme().success))
            .ratio(view.ratio())
            .label(label);
        frame.render_widget(gauge, rows[1]);
    }
}

fn panel_lines(app: &App, pair: &PairView, panel: &Panel, path_width: usize) -> Vec<Line<'static>> {
    let theme = app.theme();
    let label = |name: &'static str| Span::styled(format!("{name:<10}"), Style::default().fg(theme.dim));
    let value = |text: String| Span::styled(text, Style::default().fg(theme.normal));

    let (other_size, other_dims) = if std::ptr::eq(panel, &pair.source) {
        (pair.dest.info.size, pair.dest.info.dimensions)
    } else {
        (pair.source.info.size, pair.source.info.dimensions)
    };
    let differs = |same: bool, text: String| {
        if same {
            value(text)
        } else if app.is_accessible() {
            value(format!("{text} (differs)"))
        } else {
            Span::styled(text, Style::default().fg(theme.danger).add_modifier(Modifier::BOLD))
        }
    };

    let info = &panel.info;
    let mut lines = vec![
        Line::from(vec![label("Name"), value(panel.entry.display_name().into_owned())]),
        Line::from(vec![
            label("Path"),
            value(truncate_path(&panel.entry.path.display().to_string(), path_width)),
        ]),
        Line::from(vec![label("Format"), value(info.container.clone())]),
        Line::from(vec![
            label("Size"),
            differs(info.size == other_size, format_size(info.size)),
        ]),
        Line::from(vec![
            label("Pixels"),
            differs(
                info.dimensions == other_dims,
                info.dimensions
                    .map_or_else(|| "unknown".to_string(), |(w, h)| format!("{w} x {h}")),
            ),
        ]),
        Line::from(vec![label("Modified"), value(format_modified(panel.entry.modified))]),
    ];
    if pair.kind == MediaKind::Video {
        lines.push(Line::from(vec![
            label("Length"),
            value(info.duration.map_or_else(|| "unknown".to_string(), format_duration)),
        ]));
    }
    lines
}

fn render_notice(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = app.notice() {
        let text = truncate_string(notice, usize::from(area.width));
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(app.theme().danger))
                .alignment(Alignment::Center),
            area,
        );
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let spans: Vec<Span> = FOOTER_COMMANDS
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    format!("[{key}]"),
                    Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {desc}  "), Style::default().fg(theme.normal)),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(create_block(app.is_accessible()).border_style(Style::default().fg(theme.dim)));
    frame.render_widget(footer, area);
}

/// Format a byte count in human-readable form.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

/// Format a duration as `m:ss`, or `h:mm:ss` past an hour.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

fn format_modified(modified: SystemTime) -> String {
    DateTime::<Local>::from(modified)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Truncate a string to `max_len` characters, ending in `...`.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// Truncate a path to `max_len` characters, keeping the file name when it fits.
#[must_use]
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        return path.to_string();
    }
    if max_len <= 6 {
        return truncate_string(path, max_len);
    }

    if let Some(filename) = path.rsplit(['/', '\\']).next() {
        let name_len = filename.chars().count();
        if name_len + 4 <= max_len {
            let head: String = path.chars().take(max_len - name_len - 4).collect();
            return format!("{head}.../{filename}");
        }
    }
    truncate_string(path, max_len)
}
