use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Sparkline, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::models::SENSOR_TYPES;
use crate::ui::styles;
use crate::utils::format::format_datetime;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_alert_list(frame, app, chunks[0]);
    render_alert_detail(frame, app, chunks[1]);
}

fn render_alert_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Robot"),
        Cell::from("Sensor"),
        Cell::from("Reading"),
        Cell::from("Status"),
        Cell::from("When"),
    ])
    .style(styles::title_style())
    .height(1);

    let alerts = app.filtered_alerts();

    let rows: Vec<Row> = alerts
        .iter()
        .map(|event| {
            let when = event
                .timestamp
                .as_deref()
                .map(format_datetime)
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(event.robot.code.as_str()),
                Cell::from(event.sensor_type.as_str()),
                Cell::from(event.reading_display()),
                Cell::from(Span::styled(
                    event.status.label(),
                    styles::sensor_status_style(event.status),
                )),
                Cell::from(when),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Fill(1),
    ];

    let filter_label = match app.sensor_type_filter {
        Some(i) => SENSOR_TYPES[i],
        None => "all",
    };
    let title = format!(
        " Sensor alerts ({}) - filter: {} - [f]ilter [Enter] readings ",
        alerts.len(),
        filter_label
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.sensor_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_alert_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let Some(event) = app.selected_alert() else {
        let block = Block::default()
            .title(" Detail ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused));
        frame.render_widget(
            Paragraph::new(Span::styled("No alert selected", styles::muted_style()))
                .block(block),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(9), Constraint::Length(6)])
        .split(area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(&event.sensor_type, styles::title_style()),
            Span::raw("  "),
            Span::styled(
                event.status.label(),
                styles::sensor_status_style(event.status),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Robot:    ", styles::muted_style()),
            Span::raw(event.robot.code.clone()),
        ]),
        Line::from(vec![
            Span::styled("Reading:  ", styles::muted_style()),
            Span::raw(event.reading_display()),
        ]),
    ];

    if let Some(ref timestamp) = event.timestamp {
        lines.push(Line::from(vec![
            Span::styled("When:     ", styles::muted_style()),
            Span::raw(format_datetime(timestamp)),
        ]));
    }
    if let Some(ref location) = event.location {
        lines.push(Line::from(vec![
            Span::styled("Location: ", styles::muted_style()),
            Span::raw(location.clone()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Enter] ", styles::help_key_style()),
        Span::styled("Load recent readings", styles::help_desc_style()),
    ]));

    let block = Block::default()
        .title(" Detail ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    render_readings_sparkline(frame, app, event.robot.id, chunks[1]);
}

/// Recent readings for the alert's robot as a sparkline, when loaded.
fn render_readings_sparkline(frame: &mut Frame, app: &App, robot_id: Option<i64>, area: Rect) {
    let readings: Vec<u64> = robot_id
        .and_then(|id| app.recent_readings.get(&id))
        .map(|events| {
            // Oldest first so the sparkline reads left to right
            events
                .iter()
                .rev()
                .filter_map(|e| e.reading)
                .map(|r| r.max(0.0).round() as u64)
                .collect()
        })
        .unwrap_or_default();

    let block = Block::default()
        .title(" Recent readings ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    if readings.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Press Enter to load",
                styles::muted_style(),
            ))
            .block(block),
            area,
        );
    } else {
        let sparkline = Sparkline::default()
            .block(block)
            .data(&readings)
            .style(styles::highlight_style());
        frame.render_widget(sparkline, area);
    }
}
