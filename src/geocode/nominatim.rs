// src/geocode/nominatim.rs
//! OpenStreetMap Nominatim reverse geocoding client

use super::{Address, ReverseGeocoder};
use crate::config::GeocoderConfig;
use crate::error::{LocationError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<AddressDetails>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressDetails {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

/// Blocking client; lookups run on the caller's thread.
///
/// Must be built and used outside a tokio runtime context, since
/// `reqwest::blocking` owns a runtime of its own.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LocationError::Geocode(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn from_location(&self, latitude: f64, longitude: f64, max_results: usize) -> Result<Vec<Address>> {
        let url = format!("{}/reverse", self.base_url);
        debug!(%url, latitude, longitude, "Reverse geocoding");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(LocationError::Geocode(format!("HTTP error: {}", response.status())));
        }

        let body = response.text()?;
        let mut addresses = parse_reverse_response(&body)?;
        addresses.truncate(max_results);
        Ok(addresses)
    }
}

/// Parse a `/reverse?format=jsonv2` body
fn parse_reverse_response(body: &str) -> Result<Vec<Address>> {
    let response: ReverseResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        return Err(LocationError::Geocode(error));
    }

    let Some(display_name) = response.display_name.filter(|name| !name.is_empty()) else {
        return Ok(Vec::new());
    };

    let details = response.address;
    let address = Address {
        lines: vec![display_name],
        locality: details
            .as_ref()
            .and_then(|d| d.city.clone().or_else(|| d.town.clone()).or_else(|| d.village.clone())),
        postcode: details.as_ref().and_then(|d| d.postcode.clone()),
        country: details.and_then(|d| d.country),
    };

    Ok(vec![address])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let body = r#"{"place_id":123,"lat":"48.1173","lon":"11.5167","display_name":"Marienplatz 1, Altstadt, München, 80331, Deutschland","address":{"house_number":"1","road":"Marienplatz","town":"München","postcode":"80331","country":"Deutschland","country_code":"de"}}"#;

        let addresses = parse_reverse_response(body).unwrap();

        assert_eq!(addresses.len(), 1);
        assert_eq!(
            addresses[0].address_line(0),
            Some("Marienplatz 1, Altstadt, München, 80331, Deutschland")
        );
        assert_eq!(addresses[0].locality.as_deref(), Some("München"));
        assert_eq!(addresses[0].postcode.as_deref(), Some("80331"));
        assert_eq!(addresses[0].address_line(1), None);
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"error":"Unable to geocode"}"#;

        let result = parse_reverse_response(body);
        assert!(matches!(result, Err(LocationError::Geocode(msg)) if msg == "Unable to geocode"));
    }

    #[test]
    fn test_parse_without_display_name_is_empty() {
        let addresses = parse_reverse_response(r#"{"place_id":1}"#).unwrap();
        assert!(addresses.is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_reverse_response("<html>"), Err(LocationError::Json(_))));
    }
}
