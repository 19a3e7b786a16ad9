use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::format::{format_datetime, format_km};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_delivery_list(frame, app, chunks[0]);
    render_delivery_detail(frame, app, chunks[1]);
}

fn render_delivery_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Order"),
        Cell::from("Robot"),
        Cell::from("Status"),
        Cell::from("Route"),
    ])
    .style(styles::title_style())
    .height(1);

    let deliveries = app.filtered_deliveries();

    let rows: Vec<Row> = deliveries
        .iter()
        .map(|delivery| {
            Row::new(vec![
                Cell::from(delivery.order_code.as_str()),
                Cell::from(delivery.robot.code.as_str()),
                Cell::from(Span::styled(
                    delivery.status.label(),
                    styles::delivery_status_style(delivery.status),
                )),
                Cell::from(delivery.route_display()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];

    let filter_label = match app.delivery_status_filter {
        Some(status) => status.label(),
        None => "all",
    };
    let title = format!(
        " Deliveries ({}) - filter: {} - [f]ilter [s] advance ",
        deliveries.len(),
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
    state.select(Some(app.delivery_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_delivery_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_delivery() {
        Some(delivery) => {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("Order {}", delivery.order_code),
                        styles::title_style(),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        delivery.status.label(),
                        styles::delivery_status_style(delivery.status),
                    ),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Robot:    ", styles::muted_style()),
                    Span::raw(delivery.robot.code.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Origin:   ", styles::muted_style()),
                    Span::raw(delivery.origin.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Dest:     ", styles::muted_style()),
                    Span::raw(delivery.destination.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Distance: ", styles::muted_style()),
                    Span::raw(format_km(delivery.distance_km)),
                ]),
            ];

            if let Some(ref started) = delivery.started_at {
                lines.push(Line::from(vec![
                    Span::styled("Started:  ", styles::muted_style()),
                    Span::raw(format_datetime(started)),
                ]));
            }
            if let Some(ref finished) = delivery.finished_at {
                lines.push(Line::from(vec![
                    Span::styled("Finished: ", styles::muted_style()),
                    Span::raw(format_datetime(finished)),
                ]));
            }
            if let Some(ref notes) = delivery.notes {
                if !notes.is_empty() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled("Notes", styles::highlight_style())));
                    lines.push(Line::from(notes.clone()));
                }
            }

            if let Some(action) = delivery.status.advance_label() {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("[s] ", styles::help_key_style()),
                    Span::styled(
                        format!("{} this delivery", capitalize(action)),
                        styles::help_desc_style(),
                    ),
                ]));
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "No delivery selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Detail ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
