// Allow dead code: Style functions defined for consistent UI
#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

use crate::models::{DeliveryStatus, RobotStatus, SensorStatus};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SUCCESS: Color = Color::Rgb(76, 175, 80);
pub const WARNING: Color = Color::Rgb(255, 193, 7);
pub const ERROR: Color = Color::Rgb(244, 67, 54);
pub const LATE: Color = Color::Rgb(255, 87, 34);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SUCCESS)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

// Status colors follow the backend's semantics: green for healthy/done,
// amber for attention, red for broken/cancelled, grey for idle.

pub fn robot_status_style(status: RobotStatus) -> Style {
    let color = match status {
        RobotStatus::Active => SUCCESS,
        RobotStatus::Inactive => MUTED,
        RobotStatus::Maintenance => WARNING,
        RobotStatus::InOperation => PRIMARY,
    };
    Style::default().fg(color)
}

pub fn sensor_status_style(status: SensorStatus) -> Style {
    let color = match status {
        SensorStatus::Normal => SUCCESS,
        SensorStatus::Alert => WARNING,
        SensorStatus::Critical => ERROR,
    };
    Style::default().fg(color)
}

pub fn delivery_status_style(status: DeliveryStatus) -> Style {
    let color = match status {
        DeliveryStatus::Pending => MUTED,
        DeliveryStatus::InProgress => PRIMARY,
        DeliveryStatus::Completed => SUCCESS,
        DeliveryStatus::Cancelled => ERROR,
        DeliveryStatus::Late => LATE,
    };
    Style::default().fg(color)
}

/// Battery gauge color: healthy above 70%, warning above 30%, critical below.
pub fn battery_style(level: Option<i32>) -> Style {
    let color = match level {
        Some(level) if level > 70 => SUCCESS,
        Some(level) if level > 30 => WARNING,
        Some(_) => ERROR,
        None => MUTED,
    };
    Style::default().fg(color)
}
