use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::format::format_phone;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.gate.current_user() {
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

            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Backend:  ", styles::muted_style()),
                Span::raw(app.config.api_base_url()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Version:  ", styles::muted_style()),
                Span::raw(env!("CARGO_PKG_VERSION")),
            ]));

            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("[o] ", styles::help_key_style()),
                Span::styled("Sign out", styles::help_desc_style()),
            ]));

            lines
        }
        None => vec![Line::from(Span::styled(
            "Not signed in",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
