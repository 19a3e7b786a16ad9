use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::format::format_phone;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_user_list(frame, app, chunks[0]);
    render_user_detail(frame, app, chunks[1]);
}

fn render_user_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Username"),
        Cell::from("Role"),
        Cell::from("Email"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .users
        .iter()
        .map(|user| {
            let role_style = if user.is_admin() {
                styles::highlight_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(user.display_name().to_string()),
                Cell::from(user.username.as_str()),
                Cell::from(Span::styled(user.role.label(), role_style)),
                Cell::from(user.email.as_deref().unwrap_or("-")),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(32),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Fill(1),
    ];

    let title = format!(
        " Users ({}) - [n]ew [e]dit [d]elete ",
        app.users.len()
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
    state.select(Some(app.user_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_user_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let content = match app.selected_user() {
        Some(user) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    user.display_name().to_string(),
                    styles::title_style(),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Username: ", styles::muted_style()),
                    Span::raw(user.username.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Role:     ", styles::muted_style()),
                    Span::raw(user.role.label()),
                ]),
            ];

            if let Some(ref email) = user.email {
                lines.push(Line::from(vec![
                    Span::styled("Email:    ", styles::muted_style()),
                    Span::raw(email.clone()),
                ]));
            }
            if let Some(ref phone) = user.phone {
                lines.push(Line::from(vec![
                    Span::styled("Phone:    ", styles::muted_style()),
                    Span::raw(format_phone(phone)),
                ]));
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "No user selected",
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
