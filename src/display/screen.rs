// src/display/screen.rs
//! View model for the location screen: eight text fields and two switches

use super::strings;
use crate::location::Priority;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// How long a transient notice stays visible
pub const NOTICE_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub shown_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionPrompt {
    pub rationale: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub latitude: String,
    pub longitude: String,
    pub altitude: String,
    pub accuracy: String,
    pub speed: String,
    pub sensor: String,
    pub updates: String,
    pub address: String,
    pub high_accuracy: bool,
    pub updates_enabled: bool,
    pub notice: Option<Notice>,
    pub prompt: Option<PermissionPrompt>,
    pub last_fix: Option<DateTime<Utc>>,
    pub provider: Option<String>,
}

impl Screen {
    pub fn new(priority: Priority) -> Self {
        let mut screen = Self {
            latitude: String::new(),
            longitude: String::new(),
            altitude: String::new(),
            accuracy: String::new(),
            speed: String::new(),
            sensor: String::new(),
            updates: String::new(),
            address: String::new(),
            high_accuracy: false,
            updates_enabled: false,
            notice: None,
            prompt: None,
            last_fix: None,
            provider: None,
        };
        screen.set_priority(priority);
        screen.reset_tracking_fields();
        screen
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.high_accuracy = priority.is_high_accuracy();
        self.sensor = match priority {
            Priority::HighAccuracy => strings::SENSOR_HIGH_ACCURACY,
            Priority::BalancedPower => strings::SENSOR_BALANCED_POWER,
        }
        .to_string();
    }

    /// Put the updates label and every sample field back to the disabled text
    pub fn reset_tracking_fields(&mut self) {
        let disabled = strings::TRACKING_DISABLED;
        self.updates = disabled.to_string();
        self.latitude = disabled.to_string();
        self.longitude = disabled.to_string();
        self.accuracy = disabled.to_string();
        self.altitude = disabled.to_string();
        self.speed = disabled.to_string();
        self.address = disabled.to_string();
    }

    pub fn show_notice(&mut self, message: &str) {
        self.notice = Some(Notice {
            message: message.to_string(),
            shown_at: Instant::now(),
        });
    }

    pub fn visible_notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < NOTICE_DURATION)
            .map(|n| n.message.as_str())
    }

    /// Label/value pairs in display order
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("Latitude", self.latitude.as_str()),
            ("Longitude", self.longitude.as_str()),
            ("Altitude", self.altitude.as_str()),
            ("Accuracy", self.accuracy.as_str()),
            ("Speed", self.speed.as_str()),
            ("Sensor", self.sensor.as_str()),
            ("Updates", self.updates.as_str()),
            ("Address", self.address.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_screen_starts_disabled() {
        let screen = Screen::new(Priority::BalancedPower);
        assert_eq!(screen.latitude, strings::TRACKING_DISABLED);
        assert_eq!(screen.address, strings::TRACKING_DISABLED);
        assert_eq!(screen.sensor, strings::SENSOR_BALANCED_POWER);
        assert!(!screen.high_accuracy);
        assert!(!screen.updates_enabled);
    }

    #[test]
    fn test_notice_expires() {
        let mut screen = Screen::new(Priority::HighAccuracy);
        screen.show_notice("hello");
        let shown_at = screen.notice.as_ref().unwrap().shown_at;

        assert_eq!(screen.visible_notice(shown_at), Some("hello"));
        assert_eq!(screen.visible_notice(shown_at + NOTICE_DURATION), None);
    }

    #[test]
    fn test_fields_order() {
        let screen = Screen::new(Priority::HighAccuracy);
        let labels: Vec<&str> = screen.fields().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Latitude", "Longitude", "Altitude", "Accuracy", "Speed", "Sensor", "Updates", "Address"]
        );
        assert_eq!(screen.fields()[5].1, strings::SENSOR_HIGH_ACCURACY);
    }
}
