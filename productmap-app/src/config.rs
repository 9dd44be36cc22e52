use crate::domain::UpvotePolicy;
use crate::infrastructure::events::DEFAULT_EVENT_CAPACITY;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 10;

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// No URL selects the in-memory store.
    pub firebase_database_url: Option<String>,
    pub firebase_auth_token: Option<String>,
    pub geocoder_url: String,
    pub geocode_timeout: Duration,
    pub upvote_policy: UpvotePolicy,
    pub event_bus_capacity: usize,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            firebase_database_url: None,
            firebase_auth_token: None,
            geocoder_url: DEFAULT_GEOCODER_BASE_URL.to_string(),
            geocode_timeout: Duration::from_secs(DEFAULT_GEOCODE_TIMEOUT_SECS),
            upvote_policy: UpvotePolicy::default(),
            event_bus_capacity: DEFAULT_EVENT_CAPACITY,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout_secs = parse_or(
            "GEOCODE_TIMEOUT_SECS",
            var("GEOCODE_TIMEOUT_SECS"),
            DEFAULT_GEOCODE_TIMEOUT_SECS,
        );
        let upvote_policy = match var("UPVOTE_ROLLBACK").as_deref().map(str::to_ascii_lowercase) {
            Some(v) if v == "true" || v == "1" => UpvotePolicy::RollBack,
            Some(v) if v == "false" || v == "0" => UpvotePolicy::KeepOptimistic,
            Some(other) => {
                tracing::warn!("Invalid UPVOTE_ROLLBACK={}, keeping optimistic counts", other);
                UpvotePolicy::KeepOptimistic
            }
            None => defaults.upvote_policy,
        };

        Self {
            firebase_database_url: var("FIREBASE_DATABASE_URL"),
            firebase_auth_token: var("FIREBASE_AUTH_TOKEN"),
            geocoder_url: var("GEOCODER_URL").unwrap_or(defaults.geocoder_url),
            geocode_timeout: Duration::from_secs(timeout_secs.max(1)),
            upvote_policy,
            event_bus_capacity: parse_or(
                "EVENT_BUS_CAPACITY",
                var("EVENT_BUS_CAPACITY"),
                defaults.event_bus_capacity,
            ),
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={}, using default {}", key, raw, default);
            default
        }),
    }
}
