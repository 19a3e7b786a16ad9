//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `router`: phase-based selection of the active screen tree
//! - `render`: frame rendering and layout
//! - `input`: keyboard event handling
//! - `styles`: color schemes and text styling
//! - `tabs`: tab-specific content rendering (robots, sensors, ...)

pub mod input;
pub mod render;
pub mod router;
pub mod styles;
pub mod tabs;
