//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the station definition caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDefinitionConfig {
    /// How far back from now the operational window starts (None = unbounded)
    pub operational_period_start: Option<Duration>,
    /// How far back from now the operational window ends (None = unbounded)
    pub operational_period_end: Option<Duration>,
    /// Maximum number of request descriptors held by the request cache
    pub request_cache_capacity: usize,
}

impl Default for StationDefinitionConfig {
    fn default() -> Self {
        Self {
            operational_period_start: None,
            operational_period_end: None,
            request_cache_capacity: 10_000,
        }
    }
}

impl StationDefinitionConfig {
    /// Validate the configuration.
    ///
    /// Validates:
    /// - request_cache_capacity > 0
    /// - operational_period_start >= operational_period_end when both are set
    pub fn validate(&self) -> StadefResult<()> {
        if self.request_cache_capacity == 0 {
            return Err(StadefError::Config(ConfigError::InvalidValue {
                field: "request_cache_capacity".to_string(),
                value: self.request_cache_capacity.to_string(),
                reason: "request_cache_capacity must be greater than 0".to_string(),
            }));
        }

        if let (Some(start), Some(end)) = (self.operational_period_start, self.operational_period_end) {
            if start < end {
                return Err(StadefError::Config(ConfigError::InvalidValue {
                    field: "operational_period_start".to_string(),
                    value: format!("{:?}", start),
                    reason: format!(
                        "operational_period_start must reach back at least as far as operational_period_end ({:?})",
                        end
                    ),
                }));
            }
        }

        Ok(())
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `STADEF_OPERATIONAL_PERIOD_START_SECS`: Lookback of the window start (default: unbounded)
    /// - `STADEF_OPERATIONAL_PERIOD_END_SECS`: Lookback of the window end (default: unbounded)
    /// - `STADEF_REQUEST_CACHE_CAPACITY`: Request cache capacity (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            operational_period_start: std::env::var("STADEF_OPERATIONAL_PERIOD_START_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .or(defaults.operational_period_start),
            operational_period_end: std::env::var("STADEF_OPERATIONAL_PERIOD_END_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .or(defaults.operational_period_end),
            request_cache_capacity: std::env::var("STADEF_REQUEST_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_cache_capacity),
        }
    }

    /// Resolve the configured lookbacks against `now`.
    pub fn operational_window(&self, now: Timestamp) -> StadefResult<OperationalWindow> {
        let lookback = |field: &str, period: Option<Duration>| -> StadefResult<Option<Timestamp>> {
            period
                .map(|period| {
                    chrono::Duration::from_std(period)
                        .ok()
                        .and_then(|period| now.checked_sub_signed(period))
                        .ok_or_else(|| {
                            StadefError::Config(ConfigError::InvalidValue {
                                field: field.to_string(),
                                value: format!("{:?}", period),
                                reason: "lookback is out of range".to_string(),
                            })
                        })
                })
                .transpose()
        };

        Ok(OperationalWindow {
            start: lookback("operational_period_start", self.operational_period_start)?,
            end: lookback("operational_period_end", self.operational_period_end)?,
        })
    }
}

/// Closed time window inside which versions are worth caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationalWindow {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl OperationalWindow {
    /// Window with no bounds on either side.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// True if `time` lies inside the window.
    pub fn contains(&self, time: Timestamp) -> bool {
        self.start.map_or(true, |start| start <= time) && self.end.map_or(true, |end| time <= end)
    }

    /// True if the half-open validity `[start, end)` touches the window.
    pub fn is_connected(&self, start: Timestamp, end: Option<Timestamp>) -> bool {
        let starts_in_time = self.end.map_or(true, |window_end| start <= window_end);
        let ends_in_time = match (end, self.start) {
            (Some(end), Some(window_start)) => end >= window_start,
            _ => true,
        };
        starts_in_time && ends_in_time
    }
}

// =============================================================================
// TESTS
// =============================================================================
