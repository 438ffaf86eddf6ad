//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::{assess, HealthLevel};
use crate::fetch::DeviceStatus;

/// Render the header bar with fleet and stream overview.
///
/// Displays: online/offline counts, the streamed device, its connection
/// state, and the current health badge.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let online = app.devices.iter().filter(|d| d.status == DeviceStatus::Online).count();
    let offline = app.devices.len() - online;

    let mut spans = vec![
        Span::styled(" FLEETWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", online), Style::default().fg(app.theme.good)),
        Span::raw(" online "),
        if offline > 0 {
            Span::styled(format!("{}", offline), Style::default().fg(app.theme.warning))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" offline │ "),
    ];

    match app.stream.as_ref() {
        Some(stream) => {
            spans.push(Span::styled(
                format!("{} ", stream.device_id()),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!("[{}]", stream.status().label()),
                app.theme.connection_style(stream.status()),
            ));

            if let Some(latest) = stream.latest() {
                let health = assess(latest);
                spans.push(Span::raw(" │ health "));
                spans.push(Span::styled(
                    format!("{} {}", health.score, health.level.symbol()),
                    app.theme.health_style(health.level),
                ));
            }
        }
        None => {
            spans.push(Span::styled(
                "no device streaming",
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Fleet "), Line::from(" 2:Telemetry ")];

    let selected = match app.current_view {
        View::Fleet => 0,
        View::Telemetry => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: backend address, available controls, and any temporary status
/// message or inventory error.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.device_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        let controls = match app.current_view {
            View::Fleet => {
                if app.filter_active {
                    "Type to search | Enter:apply Esc:cancel"
                } else {
                    "/:search Enter:stream Tab:switch r:refresh ?:help q:quit"
                }
            }
            View::Telemetry => "Esc:fleet x:stop Tab:switch ?:help q:quit",
        };

        format!(" {} | {}", app.settings.base_url, controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate fleet"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Stream selected device"),
        Line::from("  Esc         Back to fleet"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Fleet",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  r         Re-fetch device list"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Telemetry",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  x         Stop streaming"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Badge text for a health level.
pub fn health_badge(level: HealthLevel) -> &'static str {
    match level {
        HealthLevel::Good => "● GOOD",
        HealthLevel::Warning => "● WARNING",
        HealthLevel::Critical => "● CRITICAL",
    }
}
