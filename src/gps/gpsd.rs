// src/gps/gpsd.rs
//! GPSD client implementation

use super::data::GpsData;
use crate::error::{LocationError, Result};
use crate::location::LocationSample;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::{
    io::{AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tracing::info;

#[derive(Debug, Deserialize)]
struct GpsdMessage {
    class: String,
    #[serde(flatten)]
    data: HashMap<String, serde_json::Value>,
}

/// Connect to a gpsd daemon and return a stream reader
pub async fn connect_gpsd(host: &str, port: u16) -> Result<BufReader<TcpStream>> {
    let mut stream = TcpStream::connect(format!("{}:{}", host, port))
        .await
        .map_err(|e| LocationError::Connection(format!("Failed to connect to gpsd at {}:{}: {}", host, port, e)))?;

    // Send WATCH command to start receiving JSON data
    let watch_cmd = "?WATCH={\"enable\":true,\"json\":true}\n";
    stream
        .write_all(watch_cmd.as_bytes())
        .await
        .map_err(|e| LocationError::Connection(format!("Failed to send WATCH command: {}", e)))?;

    Ok(BufReader::new(stream))
}

/// Parse a single line of gpsd JSON data.
///
/// Returns a sample for every TPV report that carries a position.
pub fn parse_gpsd_json(data: &mut GpsData, line: &str) -> Result<Option<LocationSample>> {
    let msg: GpsdMessage = serde_json::from_str(line)
        .map_err(|e| LocationError::Parse(format!("Failed to parse gpsd JSON: {}", e)))?;

    let sample = match msg.class.as_str() {
        "TPV" => {
            parse_tpv_message(data, &msg.data);
            data.to_sample()
        }
        "SKY" => {
            parse_sky_message(data, &msg.data);
            None
        }
        "VERSION" => {
            parse_version_message(&msg.data);
            None
        }
        "DEVICES" => {
            parse_devices_message(&msg.data);
            None
        }
        // Ignore unknown message types
        _ => None,
    };

    Ok(sample)
}

fn get_f64(msg_data: &HashMap<String, serde_json::Value>, key: &str) -> Option<f64> {
    msg_data.get(key).and_then(|v| v.as_f64())
}

/// Parse TPV (Time Position Velocity) message
fn parse_tpv_message(data: &mut GpsData, msg_data: &HashMap<String, serde_json::Value>) {
    data.mode = msg_data.get("mode").and_then(|v| v.as_u64()).map(|m| m as u8);

    data.latitude = get_f64(msg_data, "lat");
    data.longitude = get_f64(msg_data, "lon");

    // gpsd 3.20+ splits altitude into altHAE/altMSL and keeps alt as a legacy alias
    data.altitude = get_f64(msg_data, "altMSL")
        .or_else(|| get_f64(msg_data, "alt"))
        .or_else(|| get_f64(msg_data, "altHAE"));

    // gpsd reports speed in m/s already
    data.speed = get_f64(msg_data, "speed");

    data.accuracy = get_f64(msg_data, "eph").or_else(|| {
        match (get_f64(msg_data, "epx"), get_f64(msg_data, "epy")) {
            (Some(epx), Some(epy)) => Some(epx.max(epy)),
            (Some(e), None) | (None, Some(e)) => Some(e),
            (None, None) => None,
        }
    });
}

/// Parse SKY (satellite data) message
fn parse_sky_message(data: &mut GpsData, msg_data: &HashMap<String, serde_json::Value>) {
    if let Some(satellites) = msg_data.get("satellites").and_then(|v| v.as_array()) {
        let used = satellites
            .iter()
            .filter(|sat| sat.get("used").and_then(|v| v.as_bool()).unwrap_or(false))
            .count();
        data.satellites = Some(used.min(u8::MAX as usize) as u8);
    }

    if let Some(hdop) = get_f64(msg_data, "hdop") {
        data.hdop = Some(hdop);
    }
}

/// Parse VERSION message (informational)
fn parse_version_message(msg_data: &HashMap<String, serde_json::Value>) {
    if let Some(version) = msg_data.get("release").and_then(|v| v.as_str()) {
        info!("Connected to gpsd version: {}", version);
    }
}

/// Parse DEVICES message (informational)
fn parse_devices_message(msg_data: &HashMap<String, serde_json::Value>) {
    if let Some(devices) = msg_data.get("devices").and_then(|v| v.as_array()) {
        info!("gpsd managing {} device(s)", devices.len());
        for device in devices {
            if let Some(path) = device.get("path").and_then(|v| v.as_str()) {
                info!("  Device: {}", path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tpv_parsing() {
        let mut data = GpsData::new();
        let json = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":3,"time":"2023-01-01T12:00:00.000Z","ept":0.005,"lat":48.117,"lon":11.517,"alt":545.4,"epx":15.319,"epy":17.054,"epv":124.484,"track":10.3797,"speed":0.091,"climb":10.7,"eps":34.11,"epc":248.97}"#;

        let sample = parse_gpsd_json(&mut data, json).unwrap().unwrap();

        assert_eq!(sample.latitude, 48.117);
        assert_eq!(sample.longitude, 11.517);
        assert_eq!(sample.altitude, Some(545.4));
        assert_eq!(sample.speed, Some(0.091));
        assert_eq!(sample.accuracy, 17.054);
        assert_eq!(data.mode, Some(3));
    }

    #[test]
    fn test_tpv_without_fix() {
        let mut data = GpsData::new();
        let json = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":1}"#;

        assert!(parse_gpsd_json(&mut data, json).unwrap().is_none());
    }

    #[test]
    fn test_tpv_2d_fix_has_no_altitude() {
        let mut data = GpsData::new();
        data.altitude = Some(12.0);
        let json = r#"{"class":"TPV","mode":2,"lat":-33.7,"lon":151.2,"eph":8.5}"#;

        let sample = parse_gpsd_json(&mut data, json).unwrap().unwrap();
        assert_eq!(sample.altitude, None);
        assert_eq!(sample.speed, None);
        assert_eq!(sample.accuracy, 8.5);
    }

    #[test]
    fn test_sky_parsing() {
        let mut data = GpsData::new();
        let json = r#"{"class":"SKY","device":"/dev/ttyUSB0","time":"2023-01-01T12:00:00.000Z","hdop":1.2,"satellites":[{"PRN":1,"ss":42,"used":true},{"PRN":2,"ss":38,"used":false}]}"#;

        assert!(parse_gpsd_json(&mut data, json).unwrap().is_none());

        assert_eq!(data.satellites, Some(1));
        assert_eq!(data.hdop, Some(1.2));
    }

    #[test]
    fn test_invalid_json() {
        let mut data = GpsData::new();
        let invalid_json = r#"{"invalid": json"#;

        let result = parse_gpsd_json(&mut data, invalid_json);
        assert!(matches!(result, Err(LocationError::Parse(_))));
    }
}
