// src/gps/data.rs
//! GPS fix accumulator shared by the NMEA and gpsd decoders

use crate::location::LocationSample;
use chrono::{DateTime, Utc};

/// User equivalent range error used to turn HDOP into meters
pub const UERE_METERS: f64 = 5.0;

/// Accuracy reported when a source gives neither an error estimate nor HDOP
pub const DEFAULT_ACCURACY_METERS: f64 = 50.0;

#[derive(Debug, Clone, Default)]
pub struct GpsData {
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,      // m/s
    pub satellites: Option<u8>,
    pub fix_quality: Option<u8>,
    pub hdop: Option<f64>,
    pub mode: Option<u8>,
    pub accuracy: Option<f64>,   // meters
    pub source: Option<String>,
}

impl GpsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the GPS data represents a valid position fix
    pub fn has_fix(&self) -> bool {
        if matches!(self.fix_quality, Some(0)) || matches!(self.mode, Some(0) | Some(1)) {
            return false;
        }
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Update the timestamp to now
    pub fn update_timestamp(&mut self) {
        self.timestamp = Some(Utc::now());
    }

    /// Set the data source
    pub fn set_source(&mut self, source: &str) {
        self.source = Some(source.to_string());
    }

    /// Horizontal accuracy in meters, falling back to HDOP when the source
    /// gives no direct estimate
    pub fn estimated_accuracy(&self) -> f64 {
        match (self.accuracy, self.hdop) {
            (Some(acc), _) => acc,
            (None, Some(hdop)) => hdop * UERE_METERS,
            (None, None) => DEFAULT_ACCURACY_METERS,
        }
    }

    /// Snapshot the accumulated fix as a sample, if there is a position
    pub fn to_sample(&self) -> Option<LocationSample> {
        if !self.has_fix() {
            return None;
        }
        let (latitude, longitude) = (self.latitude?, self.longitude?);

        Some(LocationSample {
            latitude,
            longitude,
            altitude: self.altitude,
            accuracy: self.estimated_accuracy(),
            speed: self.speed,
            time: self.timestamp.unwrap_or_else(Utc::now),
            provider: self.source.clone().unwrap_or_default(),
        })
    }
}
