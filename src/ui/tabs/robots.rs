use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::format::truncate_string;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_robot_list(frame, app, chunks[0]);
    render_robot_detail(frame, app, chunks[1]);
}

fn render_robot_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Code"),
        Cell::from("Model"),
        Cell::from("Status"),
        Cell::from("Battery"),
        Cell::from("Location"),
    ])
    .style(styles::title_style())
    .height(1);

    let robots = app.filtered_robots();

    let rows: Vec<Row> = robots
        .iter()
        .map(|robot| {
            Row::new(vec![
                Cell::from(robot.code.as_str()),
                Cell::from(robot.model.as_str()),
                Cell::from(Span::styled(
                    robot.status.label(),
                    styles::robot_status_style(robot.status),
                )),
                Cell::from(Span::styled(
                    robot.battery_display(),
                    styles::battery_style(robot.battery_level),
                )),
                Cell::from(truncate_string(robot.location_display(), 28)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(13),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let filter_label = match app.robot_status_filter {
        Some(status) => status.label(),
        None => "all",
    };
    let title = format!(
        " Robots ({}) - filter: {} - [f]ilter [a]ctivate/deactivate [l]ocation ",
        robots.len(),
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
    state.select(Some(app.robot_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_robot_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_robot() {
        Some(robot) => {
            let mut lines = vec![
                Line::from(Span::styled(&robot.code, styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Model:    ", styles::muted_style()),
                    Span::raw(robot.model.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Status:   ", styles::muted_style()),
                    Span::styled(
                        robot.status.label(),
                        styles::robot_status_style(robot.status),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Battery:  ", styles::muted_style()),
                    Span::styled(
                        robot.battery_display(),
                        styles::battery_style(robot.battery_level),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("Location: ", styles::muted_style()),
                    Span::raw(robot.location_display().to_string()),
                ]),
                Line::from(""),
            ];

            if let Some(action) = robot.status.toggled() {
                lines.push(Line::from(vec![
                    Span::styled("[a] ", styles::help_key_style()),
                    Span::styled(
                        format!("Set {}", action.label().to_lowercase()),
                        styles::help_desc_style(),
                    ),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled("[l] ", styles::help_key_style()),
                Span::styled("Update location", styles::help_desc_style()),
            ]));

            lines
        }
        None => vec![Line::from(Span::styled(
            "No robot selected",
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
