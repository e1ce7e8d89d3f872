// src/error.rs
//! Error types for the location display

use std::fmt;

pub type Result<T> = std::result::Result<T, LocationError>;

#[derive(Debug)]
pub enum LocationError {
    Io(std::io::Error),
    Serial(tokio_serial::Error),
    Json(serde_json::Error),
    Http(reqwest::Error),
    Connection(String),
    Parse(String),
    Geocode(String),
    Permission(String),
    Config(String),
    #[cfg(windows)]
    Windows(windows::core::Error),
    Other(String),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::Io(e) => write!(f, "IO error: {}", e),
            LocationError::Serial(e) => write!(f, "Serial error: {}", e),
            LocationError::Json(e) => write!(f, "JSON error: {}", e),
            LocationError::Http(e) => write!(f, "HTTP error: {}", e),
            LocationError::Connection(msg) => write!(f, "Connection error: {}", msg),
            LocationError::Parse(msg) => write!(f, "Parse error: {}", msg),
            LocationError::Geocode(msg) => write!(f, "Geocode error: {}", msg),
            LocationError::Permission(msg) => write!(f, "Permission error: {}", msg),
            LocationError::Config(msg) => write!(f, "Config error: {}", msg),
            #[cfg(windows)]
            LocationError::Windows(e) => write!(f, "Windows error: {}", e),
            LocationError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for LocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocationError::Io(e) => Some(e),
            LocationError::Serial(e) => Some(e),
            LocationError::Json(e) => Some(e),
            LocationError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LocationError {
    fn from(error: std::io::Error) -> Self {
        LocationError::Io(error)
    }
}

impl From<tokio_serial::Error> for LocationError {
    fn from(error: tokio_serial::Error) -> Self {
        LocationError::Serial(error)
    }
}

impl From<serde_json::Error> for LocationError {
    fn from(error: serde_json::Error) -> Self {
        LocationError::Json(error)
    }
}

impl From<reqwest::Error> for LocationError {
    fn from(error: reqwest::Error) -> Self {
        LocationError::Http(error)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for LocationError {
    fn from(error: windows::core::Error) -> Self {
        LocationError::Windows(error)
    }
}

impl From<anyhow::Error> for LocationError {
    fn from(error: anyhow::Error) -> Self {
        LocationError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = LocationError::Geocode("no result".to_string());
        assert_eq!(err.to_string(), "Geocode error: no result");

        let err = LocationError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Connection error: refused");
    }

    #[test]
    fn test_io_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LocationError = io.into();
        assert!(matches!(err, LocationError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_serial_conversion() {
        let serial = tokio_serial::Error::new(tokio_serial::ErrorKind::NoDevice, "port vanished");
        let err: LocationError = serial.into();
        assert!(matches!(err, LocationError::Serial(_)));
        assert_eq!(err.to_string(), "Serial error: port vanished");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: LocationError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "Error: boom");
    }
}
