//! Data models for fleet entities.
//!
//! This module contains all the data structures used to represent
//! backend data including:
//!
//! - `Robot`: fleet robots with status, location, and battery level
//! - `SensorEvent`: sensor readings and alerts reported by robots
//! - `Delivery`: delivery orders carried out by robots
//! - `User`, `Role`: operator accounts and the admin/operator split
//!
//! Wire field names follow the backend contract (Portuguese, camelCase);
//! the Rust structs use idiomatic names with serde renames.

pub mod delivery;
pub mod robot;
pub mod sensor;
pub mod user;

pub use delivery::{Delivery, DeliveryStatus};
pub use robot::{Robot, RobotRef, RobotStatus};
pub use sensor::{SensorEvent, SensorStatus, SENSOR_TYPES};
pub use user::{Role, User, UserPayload};
