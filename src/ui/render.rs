use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab, UserFormFocus};

use super::router::{select_tree, ScreenTree};
use super::styles;
use super::tabs::{dashboard, deliveries, profile, robots, sensors, users};

const LOGO: [&str; 3] = [
    "╔═╗╦  ╔═╗╔═╗╔╦╗╦ ╦╔═╗╔╦╗╔═╗╦ ╦",
    "╠╣ ║  ║╣ ║╣  ║ ║║║╠═╣ ║ ║  ╠═╣",
    "╚  ╩═╝╚═╝╚═╝ ╩ ╚╩╝╩ ╩ ╩ ╚═╝╩ ╩",
];

pub fn render(frame: &mut Frame, app: &App) {
    // One of two disjoint trees, picked fresh every frame from the gate
    match select_tree(app.gate.phase()) {
        ScreenTree::Blank => {
            // Boot check pending: draw nothing
        }
        ScreenTree::Login => render_login_screen(frame, app),
        ScreenTree::Main => render_main_tree(frame, app),
    }
}

// ============================================================================
// Login tree
// ============================================================================

fn render_login_screen(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(46, height, frame.area());

    let mut lines = vec![];

    for row in LOGO {
        lines.push(Line::from(Span::styled(
            format!("      {}", row),
            styles::title_style(),
        )));
    }
    lines.push(Line::from(""));

    // Username field
    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let username_display = format!("{:<16}", app.login_username);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(format!("{}{}", username_display, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Password field
    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.len().min(16));
    let password_display = format!("{:<16}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Login button
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    let button_label = if button_focused {
        " ▶ Login ◀ "
    } else {
        "   Login   "
    };
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(button_label, button_style),
        Span::raw("]"),
    ]));

    // Error message (server-provided text shown verbatim)
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Main tree
// ============================================================================

fn render_main_tree(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::EditingUser => render_user_form_overlay(frame, app),
        AppState::EditingLocation => render_location_overlay(frame, app),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Fleetwatch";
    let user_hint = match app.gate.current_user() {
        Some(user) => format!("{} ({})  [?] Help", user.username, user.role.label()),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.len() + user_hint.len() + 4),
        )),
        Span::styled(user_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut tabs = vec![
        ('1', Tab::Dashboard),
        ('2', Tab::Robots),
        ('3', Tab::Sensors),
        ('4', Tab::Deliveries),
    ];
    if app.is_admin() {
        tabs.push(('5', Tab::Users));
    }
    tabs.push(('6', Tab::Profile));

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, tab)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", key, tab.title());
        if app.current_tab == *tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Robots => robots::render(frame, app, area),
        Tab::Sensors => sensors::render(frame, app, area),
        Tab::Deliveries => deliveries::render(frame, app, area),
        Tab::Users => users::render(frame, app, area),
        Tab::Profile => profile::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if matches!(app.state, AppState::Searching) {
        format!(" Search: {}▌ ", app.search_query)
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" Updated {} ", app.cache_ages.last_updated())
    };

    let right_text = " [/] search | [u]pdate | [q]uit ";

    let padding = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let left_style = if matches!(app.state, AppState::Searching) {
        styles::highlight_style()
    } else {
        styles::muted_style()
    };

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

// ============================================================================
// Overlays
// ============================================================================

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = vec![];
    for row in LOGO {
        help_text.push(Line::from(Span::styled(
            format!("         {}", row),
            styles::title_style(),
        )));
    }
    help_text.push(Line::from(Span::styled(
        format!("              version {}", version),
        styles::muted_style(),
    )));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Navigation", styles::highlight_style())));
    help_text.push(Line::from(vec![
        Span::styled("  1-6       ", styles::help_key_style()),
        Span::styled("Switch tabs", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(vec![
        Span::styled("  ←/→       ", styles::help_key_style()),
        Span::styled("Prev/next tab", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(vec![
        Span::styled("  Tab       ", styles::help_key_style()),
        Span::styled("Switch focus (list ↔ detail)", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(vec![
        Span::styled("  ↑/↓       ", styles::help_key_style()),
        Span::styled("Navigate list", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Actions", styles::highlight_style())));
    help_text.push(Line::from(vec![
        Span::styled("  /         ", styles::help_key_style()),
        Span::styled("Search", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(vec![
        Span::styled("  f         ", styles::help_key_style()),
        Span::styled("Cycle status/type filter", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(vec![
        Span::styled("  u         ", styles::help_key_style()),
        Span::styled("Refresh data from the backend", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(vec![
        Span::styled("  a / l     ", styles::help_key_style()),
        Span::styled("Robots: toggle active / set location", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(vec![
        Span::styled("  s         ", styles::help_key_style()),
        Span::styled("Deliveries: advance status", styles::help_desc_style()),
    ]));
    if app.is_admin() {
        help_text.push(Line::from(vec![
            Span::styled("  n / e / d ", styles::help_key_style()),
            Span::styled("Users: new / edit / delete", styles::help_desc_style()),
        ]));
    }
    help_text.push(Line::from(vec![
        Span::styled("  q         ", styles::help_key_style()),
        Span::styled("Quit", styles::help_desc_style()),
    ]));
    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![
        Span::styled("       Press ", styles::muted_style()),
        Span::styled("?", styles::help_key_style()),
        Span::styled(" or ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" to close", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![];
    for row in LOGO {
        lines.push(Line::from(Span::styled(
            format!("      {}", row),
            styles::title_style(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "   Are you sure you want to quit?",
        styles::highlight_style(),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("[Y]", styles::help_key_style()),
        Span::styled(" to quit, ", styles::muted_style()),
        Span::styled("[N]", styles::help_key_style()),
        Span::styled(" to cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 8, frame.area());
    frame.render_widget(Clear, area);

    let username = app
        .selected_user()
        .map(|u| u.username.clone())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   Remove user \"{}\"?", username),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to remove, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_location_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let code = app
        .selected_robot()
        .map(|r| r.code.clone())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Location: [", styles::muted_style()),
            Span::styled(
                format!("{:<30}▌", app.location_input),
                styles::selected_style(),
            ),
            Span::styled("]", styles::muted_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [Enter]", styles::help_key_style()),
            Span::styled(" save   ", styles::muted_style()),
            Span::styled("[Esc]", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(format!(" Update location - {} ", code))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_user_form_overlay(frame: &mut Frame, app: &App) {
    let form = &app.user_form;
    let height = if form.error.is_some() { 19 } else { 17 };
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let field = |label: &str, value: &str, focus: UserFormFocus, masked: bool| {
        let focused = form.focus == focus;
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let shown: String = if masked {
            "*".repeat(value.len().min(24))
        } else {
            value.chars().take(24).collect()
        };
        let cursor = if focused { "▌" } else { "" };
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<10}[", label), styles::muted_style()),
            Span::styled(format!("{:<24}{}", shown, cursor), style),
            Span::styled("]", styles::muted_style()),
        ])
    };

    let mut lines = vec![Line::from("")];
    lines.push(field("Name:", &form.full_name, UserFormFocus::FullName, false));
    lines.push(field("Username:", &form.username, UserFormFocus::Username, false));
    lines.push(field("Email:", &form.email, UserFormFocus::Email, false));
    lines.push(field("Phone:", &form.phone, UserFormFocus::Phone, false));

    // Role selector
    let role_focused = form.focus == UserFormFocus::Role;
    let role_style = if role_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<10}", "Role:"), styles::muted_style()),
        Span::styled(format!("◀ {:^10} ▶", form.role.label()), role_style),
    ]));

    lines.push(field("Password:", &form.password, UserFormFocus::Password, true));
    lines.push(field(
        "Confirm:",
        &form.confirm_password,
        UserFormFocus::ConfirmPassword,
        true,
    ));

    // Submit button
    let submit_focused = form.focus == UserFormFocus::Submit;
    let submit_style = if submit_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let submit_label = if form.is_edit() { "Save" } else { "Create" };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(
            if submit_focused {
                format!(" ▶ {} ◀ ", submit_label)
            } else {
                format!("   {}   ", submit_label)
            },
            submit_style,
        ),
        Span::raw("]"),
    ]));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [Tab]", styles::help_key_style()),
        Span::styled(" next field   ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let title = if form.is_edit() {
        " Edit user "
    } else {
        " New user "
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
