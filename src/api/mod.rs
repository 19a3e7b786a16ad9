//! HTTP client for the fleet backend REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests for robot, sensor event, delivery, and user data, and the
//! typed `ApiError` taxonomy every call surfaces.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
