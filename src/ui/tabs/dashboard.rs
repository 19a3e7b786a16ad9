use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Fleet stat cards
            Constraint::Length(5), // Alerts / deliveries summary
            Constraint::Min(3),    // Hints
        ])
        .split(area);

    render_fleet_stats(frame, app, chunks[0]);
    render_activity_summary(frame, app, chunks[1]);
    render_hints(frame, app, chunks[2]);
}

fn render_fleet_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.robot_stats();

    let cards = [
        ("Total", stats.total, styles::title_style()),
        ("Active", stats.active, styles::success_style()),
        ("Inactive", stats.inactive, styles::muted_style()),
        (
            "Maintenance",
            stats.maintenance,
            ratatui::style::Style::default().fg(styles::WARNING),
        ),
        (
            "In operation",
            stats.in_operation,
            ratatui::style::Style::default().fg(styles::PRIMARY),
        ),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    for ((label, value, style), column) in cards.iter().zip(columns.iter()) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(format!("{:^12}", value), *style)),
            Line::from(Span::styled(
                format!("{:^12}", label),
                styles::muted_style(),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        frame.render_widget(Paragraph::new(lines).block(block), *column);
    }
}

fn render_activity_summary(frame: &mut Frame, app: &App, area: Rect) {
    let critical = app.critical_alert_count();
    let open = app.open_delivery_count();

    let critical_style = if critical > 0 {
        styles::error_style()
    } else {
        styles::success_style()
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("  Critical alerts:  ", styles::muted_style()),
            Span::styled(critical.to_string(), critical_style),
        ]),
        Line::from(vec![
            Span::styled("  Open deliveries:  ", styles::muted_style()),
            Span::raw(open.to_string()),
        ]),
        Line::from(vec![
            Span::styled("  Known alerts:     ", styles::muted_style()),
            Span::raw(app.alerts.len().to_string()),
        ]),
    ];

    let block = Block::default()
        .title(" Activity ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  [2] ", styles::help_key_style()),
            Span::styled("Robots    ", styles::help_desc_style()),
            Span::styled("[3] ", styles::help_key_style()),
            Span::styled("Sensors    ", styles::help_desc_style()),
            Span::styled("[4] ", styles::help_key_style()),
            Span::styled("Deliveries", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  [u] ", styles::help_key_style()),
            Span::styled("Refresh all data from the backend", styles::help_desc_style()),
        ]),
    ];

    if app.is_admin() {
        lines.push(Line::from(vec![
            Span::styled("  [5] ", styles::help_key_style()),
            Span::styled("User management", styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .title(" Quick actions ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
