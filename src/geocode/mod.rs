// src/geocode/mod.rs
//! Reverse geocoding: coordinates to human-readable addresses

mod nominatim;

pub use nominatim::NominatimGeocoder;

use crate::error::{LocationError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub lines: Vec<String>,
    pub locality: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl Address {
    pub fn address_line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }
}

pub trait ReverseGeocoder: Send {
    /// Up to `max_results` candidates, best match first
    fn from_location(&self, latitude: f64, longitude: f64, max_results: usize) -> Result<Vec<Address>>;
}

/// Used when geocoding is switched off; every lookup fails
#[derive(Debug, Default)]
pub struct DisabledGeocoder;

impl ReverseGeocoder for DisabledGeocoder {
    fn from_location(&self, _latitude: f64, _longitude: f64, _max_results: usize) -> Result<Vec<Address>> {
        Err(LocationError::Geocode("reverse geocoding is disabled".to_string()))
    }
}
