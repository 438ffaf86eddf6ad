//! Live telemetry view rendering.
//!
//! Shows the latest sample, battery/temperature trends over the rolling
//! window, and the event log for the streamed device.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Sparkline},
    Frame,
};

use crate::app::App;
use crate::data::{assess, unix_now, TelemetrySample};
use crate::stream::StreamManager;
use crate::ui::common::health_badge;

/// Render the Telemetry view for the active subscription.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref stream) = app.stream else {
        let paragraph = Paragraph::new("No device streaming. Select one in the Fleet view.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(
                Block::default()
                    .title(" Telemetry ")
                    .borders(Borders::ALL)
                    .border_type(app.theme.border_type)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        frame.render_widget(paragraph, area);
        return;
    };

    let columns = Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).split(area);
    let charts = Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).split(columns[0]);
    let panels =
        Layout::vertical([Constraint::Length(8), Constraint::Fill(1)]).split(columns[1]);

    render_battery_chart(frame, app, stream, charts[0]);
    render_temp_chart(frame, app, stream, charts[1]);
    render_latest_panel(frame, app, stream, panels[0]);
    render_event_log(frame, app, stream, panels[1]);
}

fn render_battery_chart(frame: &mut Frame, app: &App, stream: &StreamManager, area: Rect) {
    let data: Vec<u64> = stream.history().map(|s| s.battery.clamp(0.0, 100.0) as u64).collect();

    let title = format!(" Battery ({} samples) ", data.len());
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .data(&data)
        .max(100)
        .style(Style::default().fg(app.theme.good));

    frame.render_widget(sparkline, area);
}

fn render_temp_chart(frame: &mut Frame, app: &App, stream: &StreamManager, area: Rect) {
    // Offset by the window minimum so small fluctuations stay visible
    let temps: Vec<f64> = stream.history().map(|s| s.temp_c).filter(|t| t.is_finite()).collect();
    let floor = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let data: Vec<u64> = if floor.is_finite() {
        temps.iter().map(|t| ((t - floor) * 10.0).max(0.0) as u64).collect()
    } else {
        Vec::new()
    };

    let title = match stream.latest() {
        Some(latest) => format!(" Temperature ({:.1} °C) ", latest.temp_c),
        None => " Temperature ".to_string(),
    };

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .data(&data)
        .style(Style::default().fg(app.theme.highlight));

    frame.render_widget(sparkline, area);
}

fn render_latest_panel(frame: &mut Frame, app: &App, stream: &StreamManager, area: Rect) {
    let mut lines = vec![Line::from(vec![
        Span::raw(" status  "),
        Span::styled(stream.status().label(), app.theme.connection_style(stream.status())),
    ])];

    match stream.latest() {
        Some(latest) => {
            let health = assess(latest);
            lines.push(Line::from(vec![
                Span::raw(" health  "),
                Span::styled(
                    format!("{} ({})", health_badge(health.level), health.score),
                    app.theme.health_style(health.level),
                ),
            ]));
            lines.push(Line::from(format!(" battery {:>5.1} %", latest.battery)));
            lines.push(Line::from(format!(" temp    {:>5.1} °C", latest.temp_c)));
            lines.push(Line::from(format!(" speed   {:>5.2} m/s", latest.speed)));
            lines.push(Line::from(Span::styled(
                format!(" updated {:.1}s ago", (unix_now() - latest.ts).max(0.0)),
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                " waiting for samples...",
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }

    let title = format!(" {} ", stream.device_id());
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(paragraph, area);
}

fn render_event_log(frame: &mut Frame, app: &App, stream: &StreamManager, area: Rect) {
    let items: Vec<ListItem> = stream
        .events()
        .map(|sample| ListItem::new(format_event(sample)))
        .collect();

    let count = items.len();
    let list = List::new(items).block(
        Block::default()
            .title(format!(" Events ({}) ", count))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(list, area);
}

fn format_event(sample: &TelemetrySample) -> String {
    let age = (unix_now() - sample.ts).max(0.0);
    format!("{:>6.1}s  {}", age, sample.event_tag().unwrap_or("?"))
}
