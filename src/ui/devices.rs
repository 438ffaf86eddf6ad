//! Fleet view rendering.
//!
//! Displays a table of all devices with inventory status and selection.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::fetch::DeviceStatus;

/// Render the Fleet view showing all devices in a selectable table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let visible = app.visible_devices();

    if app.devices.is_empty() {
        let hint = if app.device_error.is_some() {
            "Inventory unavailable. r:retry"
        } else {
            "No devices. r:refresh"
        };
        let paragraph = Paragraph::new(hint)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(
                Block::default()
                    .title(" Devices ")
                    .borders(Borders::ALL)
                    .border_type(app.theme.border_type)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Device"),
        Cell::from("Id"),
        Cell::from("Inventory"),
        Cell::from("Stream"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = visible
        .iter()
        .map(|(_, device)| {
            let status_style = match device.status {
                DeviceStatus::Online => Style::default().fg(app.theme.good),
                DeviceStatus::Offline => Style::default().add_modifier(Modifier::DIM),
            };

            let streaming = app
                .stream
                .as_ref()
                .filter(|s| s.device_id() == device.id)
                .map(|s| s.status().label())
                .unwrap_or("-");

            Row::new(vec![
                Cell::from(device.name.clone()),
                Cell::from(device.id.clone()),
                Cell::from(device.status.label()).style(status_style),
                Cell::from(streaming),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Min(10),
        Constraint::Min(12),
    ];

    let selected_visual_index = app.selected_device_index.min(visible.len().saturating_sub(1));

    // Build title with filter info
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !visible.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, visible.len())
    } else {
        String::new()
    };

    let title = format!(
        " Devices ({}/{}){}{} ",
        visible.len(),
        app.devices.len(),
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}
