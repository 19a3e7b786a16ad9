use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{Delivery, Robot, SensorEvent};

/// Consider cache stale after 10 minutes. Fleet state moves faster than
/// roster-style data, so the refresh horizon is short.
const CACHE_STALE_MINUTES: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew (negative) too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<CachedData<T>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to read cache file");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(cached) => Some(cached),
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to parse cache file");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) {
        let cached = CachedData::new(data);
        match serde_json::to_string_pretty(&cached) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(self.cache_path(name), contents) {
                    debug!(cache = name, error = %e, "Failed to write cache file");
                }
            }
            Err(e) => debug!(cache = name, error = %e, "Failed to serialize cache"),
        }
    }

    // ===== Robots =====

    pub fn load_robots(&self) -> Option<CachedData<Vec<Robot>>> {
        self.load("robots")
    }

    pub fn save_robots(&self, robots: &[Robot]) {
        self.save("robots", &robots)
    }

    // ===== Sensor alerts =====

    pub fn load_alerts(&self) -> Option<CachedData<Vec<SensorEvent>>> {
        self.load("alerts")
    }

    pub fn save_alerts(&self, alerts: &[SensorEvent]) {
        self.save("alerts", &alerts)
    }

    // ===== Deliveries =====

    pub fn load_deliveries(&self) -> Option<CachedData<Vec<Delivery>>> {
        self.load("deliveries")
    }

    pub fn save_deliveries(&self, deliveries: &[Delivery]) {
        self.save("deliveries", &deliveries)
    }

    // ===== Age information =====

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            robots: self.load_robots().map(|c| c.age_display()),
            alerts: self.load_alerts().map(|c| c.age_display()),
            deliveries: self.load_deliveries().map(|c| c.age_display()),
        }
    }

    /// Whether any of the cached collections is stale or missing.
    pub fn any_stale(&self) -> bool {
        let robots_stale = self.load_robots().map(|c| c.is_stale()).unwrap_or(true);
        let alerts_stale = self.load_alerts().map(|c| c.is_stale()).unwrap_or(true);
        let deliveries_stale = self
            .load_deliveries()
            .map(|c| c.is_stale())
            .unwrap_or(true);
        robots_stale || alerts_stale || deliveries_stale
    }
}

#[derive(Debug, Default)]
pub struct CacheAges {
    pub robots: Option<String>,
    pub alerts: Option<String>,
    pub deliveries: Option<String>,
}

impl CacheAges {
    /// The freshest age across all collections, for the status bar.
    pub fn last_updated(&self) -> String {
        [&self.robots, &self.alerts, &self.deliveries]
            .into_iter()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
