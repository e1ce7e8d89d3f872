// src/location/request.rs
//! Update request parameters shared by every provider

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval between delivered updates, in seconds
pub const DEFAULT_UPDATE_INTERVAL: u64 = 30;
/// Interval used when high accuracy is requested, in seconds
pub const FAST_UPDATE_INTERVAL: u64 = 5;

/// Provider hint trading power use against positional precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    HighAccuracy,
    BalancedPower,
}

impl Priority {
    pub fn from_high_accuracy(high_accuracy: bool) -> Self {
        if high_accuracy {
            Priority::HighAccuracy
        } else {
            Priority::BalancedPower
        }
    }

    pub fn is_high_accuracy(&self) -> bool {
        matches!(self, Priority::HighAccuracy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
    pub priority: Priority,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000 * DEFAULT_UPDATE_INTERVAL,
            fastest_interval_ms: 1000 * FAST_UPDATE_INTERVAL,
            priority: Priority::BalancedPower,
        }
    }
}

impl UpdateConfig {
    pub fn new(interval_ms: u64, fastest_interval_ms: u64, priority: Priority) -> Self {
        Self {
            interval_ms,
            // fastest can never be slower than the regular interval
            fastest_interval_ms: fastest_interval_ms.min(interval_ms),
            priority,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn fastest_interval(&self) -> Duration {
        Duration::from_millis(self.fastest_interval_ms)
    }

    /// Minimum spacing between two samples handed to one subscriber
    pub fn delivery_interval(&self) -> Duration {
        match self.priority {
            Priority::HighAccuracy => self.fastest_interval(),
            Priority::BalancedPower => self.interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UpdateConfig::default();
        assert_eq!(config.interval_ms, 30_000);
        assert_eq!(config.fastest_interval_ms, 5_000);
        assert_eq!(config.priority, Priority::BalancedPower);
    }

    #[test]
    fn test_delivery_interval_follows_priority() {
        let mut config = UpdateConfig::default();
        assert_eq!(config.delivery_interval(), Duration::from_secs(30));

        config.priority = Priority::HighAccuracy;
        assert_eq!(config.delivery_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_fastest_clamped_to_interval() {
        let config = UpdateConfig::new(1_000, 5_000, Priority::HighAccuracy);
        assert_eq!(config.fastest_interval_ms, 1_000);
    }
}
