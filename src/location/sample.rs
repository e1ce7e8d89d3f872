// src/location/sample.rs
//! A single position report handed from a provider to the screen

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>, // meters
    pub accuracy: f64,         // meters, horizontal
    pub speed: Option<f64>,    // m/s
    pub time: DateTime<Utc>,
    pub provider: String,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy,
            speed: None,
            time: Utc::now(),
            provider: String::new(),
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    pub fn has_altitude(&self) -> bool {
        self.altitude.is_some()
    }

    pub fn has_speed(&self) -> bool {
        self.speed.is_some()
    }
}

impl fmt::Display for LocationSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location[{} {:.6},{:.6} hAcc={:.1}",
            self.provider, self.latitude, self.longitude, self.accuracy
        )?;
        if let Some(alt) = self.altitude {
            write!(f, " alt={:.1}", alt)?;
        }
        if let Some(speed) = self.speed {
            write!(f, " vel={:.2}", speed)?;
        }
        write!(f, " {}]", self.time.format("%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default_to_absent() {
        let sample = LocationSample::new(48.117, 11.517, 5.0);
        assert!(!sample.has_altitude());
        assert!(!sample.has_speed());

        let sample = sample.with_altitude(545.4).with_speed(1.2);
        assert!(sample.has_altitude());
        assert!(sample.has_speed());
    }

    #[test]
    fn test_display_mentions_provider_and_position() {
        let sample = LocationSample::new(48.117, 11.517, 5.0).with_provider("gpsd");
        let text = sample.to_string();
        assert!(text.starts_with("Location[gpsd 48.117000,11.517000 hAcc=5.0"));
        assert!(!text.contains("alt="));
    }
}
