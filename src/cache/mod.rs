//! Local JSON cache of the last fetched fleet data.
//!
//! Lets the UI show something immediately at startup and drives the
//! "Updated Xm ago" display in the status bar.

pub mod manager;

pub use manager::{CacheAges, CacheManager, CachedData};
