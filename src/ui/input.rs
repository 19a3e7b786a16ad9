//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Dispatch is state-first: the login tree,
//! overlays, and search mode each consume keys before the global keys
//! apply.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_field_char, can_add_password_char, can_add_username_char, App, AppState, Focus,
    LoginFocus, Tab, UserFormFocus, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // The unauthenticated tree only has the login form
    if !app.gate.is_authenticated() {
        return handle_login_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle user delete confirmation
    if matches!(app.state, AppState::ConfirmingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Normal;
                app.delete_selected_user().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::EditingUser) {
        handle_user_form_input(app, key).await;
        return Ok(false);
    }

    if matches!(app.state, AppState::EditingLocation) {
        handle_location_input(app, key).await;
        return Ok(false);
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('u') => {
            app.refresh_all_background();
        }
        KeyCode::Char('1') => switch_tab(app, Tab::Dashboard),
        KeyCode::Char('2') => switch_tab(app, Tab::Robots),
        KeyCode::Char('3') => switch_tab(app, Tab::Sensors),
        KeyCode::Char('4') => switch_tab(app, Tab::Deliveries),
        KeyCode::Char('5') => {
            if app.is_admin() {
                switch_tab(app, Tab::Users);
            }
        }
        KeyCode::Char('6') => switch_tab(app, Tab::Profile),
        KeyCode::Left => {
            let tab = app.current_tab.prev(app.is_admin());
            switch_tab(app, tab);
        }
        KeyCode::Right => {
            let tab = app.current_tab.next(app.is_admin());
            switch_tab(app, tab);
        }
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Up => app.move_selection(-1),
        KeyCode::Down => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::End => app.move_selection(isize::MAX / 2),
        _ => {
            handle_tab_keys(app, key).await;
        }
    }

    Ok(false)
}

fn switch_tab(app: &mut App, tab: Tab) {
    app.current_tab = tab;
    app.focus = Focus::List;
}

/// Keys that only apply on a specific tab.
async fn handle_tab_keys(app: &mut App, key: KeyEvent) {
    match app.current_tab {
        Tab::Robots => match key.code {
            KeyCode::Char('f') => app.cycle_robot_status_filter(),
            KeyCode::Char('a') => app.toggle_selected_robot().await,
            KeyCode::Char('l') => app.open_location_editor(),
            _ => {}
        },
        Tab::Sensors => match key.code {
            KeyCode::Char('f') => app.cycle_sensor_type_filter(),
            KeyCode::Enter => {
                if let Some(robot_id) = app.selected_alert().and_then(|e| e.robot.id) {
                    app.fetch_recent_readings(robot_id);
                }
            }
            _ => {}
        },
        Tab::Deliveries => match key.code {
            KeyCode::Char('f') => app.cycle_delivery_status_filter(),
            KeyCode::Char('s') => app.advance_selected_delivery().await,
            _ => {}
        },
        Tab::Users => match key.code {
            KeyCode::Char('n') => app.open_new_user_form(),
            KeyCode::Char('e') => app.open_edit_user_form(),
            KeyCode::Char('d') => {
                if app.selected_user().is_some() {
                    app.state = AppState::ConfirmingDelete;
                }
            }
            _ => {}
        },
        Tab::Profile => {
            if key.code == KeyCode::Char('o') {
                app.sign_out().await;
            }
        }
        Tab::Dashboard => {}
    }
}

// ============================================================================
// Login form
// ============================================================================

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // The entry screen is the whole tree; Esc leaves the app
            return Ok(true);
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.len(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }

    Ok(false)
}

// ============================================================================
// Search
// ============================================================================

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.state = AppState::Normal;
            app.clamp_selections();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.clamp_selections();
        }
        KeyCode::Char(c) => {
            if can_add_field_char(app.search_query.len(), c) {
                app.search_query.push(c);
                app.clamp_selections();
            }
        }
        _ => {}
    }
}

// ============================================================================
// User form overlay
// ============================================================================

async fn handle_user_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.user_form.focus = app.user_form.focus.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.user_form.focus = app.user_form.focus.prev();
        }
        KeyCode::Enter => {
            if app.user_form.focus == UserFormFocus::Submit {
                app.submit_user_form().await;
            } else {
                app.user_form.focus = app.user_form.focus.next();
            }
        }
        KeyCode::Left | KeyCode::Right => {
            if app.user_form.focus == UserFormFocus::Role {
                app.user_form.toggle_role();
            }
        }
        KeyCode::Char(' ') if app.user_form.focus == UserFormFocus::Role => {
            app.user_form.toggle_role();
        }
        KeyCode::Backspace => {
            if let Some(field) = app.user_form.field_mut() {
                field.pop();
            }
        }
        KeyCode::Char(c) => {
            let is_password = matches!(
                app.user_form.focus,
                UserFormFocus::Password | UserFormFocus::ConfirmPassword
            );
            if let Some(field) = app.user_form.field_mut() {
                let allowed = if is_password {
                    can_add_password_char(field.len(), c)
                } else {
                    can_add_field_char(field.len(), c)
                };
                if allowed {
                    field.push(c);
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// Location editor overlay
// ============================================================================

async fn handle_location_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.submit_location_update().await;
        }
        KeyCode::Backspace => {
            app.location_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_field_char(app.location_input.len(), c) {
                app.location_input.push(c);
            }
        }
        _ => {}
    }
}
