// src/gps/nmea.rs
//! NMEA sentence parsing

use super::data::GpsData;
use crate::location::LocationSample;
use tracing::{debug, trace};

const KNOTS_TO_MPS: f64 = 0.514444;

/// Parse a single NMEA sentence and update GPS data.
///
/// Returns a sample when the sentence completes a position fix (GGA).
/// Sentences with a bad checksum are dropped without touching `data`.
pub fn parse_nmea_sentence(data: &mut GpsData, line: &str) -> Option<LocationSample> {
    if !checksum_ok(line) {
        debug!("Dropping NMEA sentence with bad checksum: {}", line);
        return None;
    }

    let body = line.split('*').next().unwrap_or(line);
    let parts: Vec<&str> = body.split(',').collect();

    if line.starts_with("$GPGGA") || line.starts_with("$GNGGA") {
        parse_gga(data, &parts);
        trace!(satellites = ?data.satellites, hdop = ?data.hdop, "GGA");
        data.to_sample()
    } else if line.starts_with("$GPRMC") || line.starts_with("$GNRMC") {
        parse_rmc(data, &parts);
        None
    } else {
        None
    }
}

/// Verify the `*hh` checksum. Sentences without one are accepted.
pub fn checksum_ok(line: &str) -> bool {
    let Some(body) = line.strip_prefix('$') else {
        return false;
    };
    let Some((payload, checksum)) = body.split_once('*') else {
        return true;
    };
    let expected = match u8::from_str_radix(checksum.trim(), 16) {
        Ok(value) => value,
        Err(_) => return false,
    };
    payload.bytes().fold(0u8, |acc, b| acc ^ b) == expected
}

/// Convert `ddmm.mmmm` plus hemisphere into signed decimal degrees
fn parse_coordinate(value: &str, hemisphere: &str, negative: &str) -> Option<f64> {
    if value.is_empty() || hemisphere.is_empty() {
        return None;
    }
    let raw = value.parse::<f64>().ok()?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;
    Some(if hemisphere == negative { -decimal } else { decimal })
}

/// Parse GGA (Global Positioning System Fix Data) sentence
fn parse_gga(data: &mut GpsData, parts: &[&str]) {
    if parts.len() < 15 {
        return;
    }

    data.latitude = parse_coordinate(parts[2], parts[3], "S");
    data.longitude = parse_coordinate(parts[4], parts[5], "W");
    data.fix_quality = parts[6].parse::<u8>().ok();
    data.satellites = parts[7].parse::<u8>().ok();
    data.hdop = parts[8].parse::<f64>().ok();
    // An empty altitude field means the receiver has none for this fix
    data.altitude = parts[9].parse::<f64>().ok();
}

/// Parse RMC (Recommended Minimum Course) sentence
fn parse_rmc(data: &mut GpsData, parts: &[&str]) {
    if parts.len() < 10 {
        return;
    }

    if parts[2] != "A" {
        data.speed = None;
        return;
    }

    data.speed = parts[7].parse::<f64>().ok().map(|knots| knots * KNOTS_TO_MPS);
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    #[test]
    fn test_gga_parsing() {
        let mut data = GpsData::new();

        let sample = parse_nmea_sentence(&mut data, GGA).unwrap();

        assert!((sample.latitude - 48.1173).abs() < 1e-4);
        assert!((sample.longitude - 11.516_666).abs() < 1e-4);
        assert_eq!(sample.altitude, Some(545.4));
        assert!((sample.accuracy - 4.5).abs() < 1e-9); // HDOP 0.9 * 5 m
        assert_eq!(data.satellites, Some(8));
        assert_eq!(data.fix_quality, Some(1));
    }

    #[test]
    fn test_rmc_sets_speed_for_next_fix() {
        let mut data = GpsData::new();

        assert!(parse_nmea_sentence(&mut data, RMC).is_none());
        let sample = parse_nmea_sentence(&mut data, GGA).unwrap();

        // 22.4 knots
        assert!((sample.speed.unwrap() - 11.5235).abs() < 0.001);
    }

    #[test]
    fn test_void_rmc_clears_speed() {
        let mut data = GpsData::new();
        parse_nmea_sentence(&mut data, RMC);
        parse_nmea_sentence(
            &mut data,
            "$GPRMC,123519,V,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*7D",
        );
        assert!(data.speed.is_none());
    }

    #[test]
    fn test_southern_western_hemisphere_without_altitude() {
        let mut data = GpsData::new();
        data.altitude = Some(10.0);

        let sample =
            parse_nmea_sentence(&mut data, "$GNGGA,123521,3342.6618,S,15111.2345,W,1,05,1.5,,M,,M,,*6E")
                .unwrap();

        assert!(sample.latitude < 0.0);
        assert!(sample.longitude < 0.0);
        assert_eq!(sample.altitude, None);
    }

    #[test]
    fn test_no_fix_yields_no_sample() {
        let mut data = GpsData::new();
        assert!(parse_nmea_sentence(&mut data, "$GPGGA,123520,,,,,0,00,,,M,,M,,*61").is_none());
    }

    #[test]
    fn test_bad_checksum_is_dropped() {
        let mut data = GpsData::new();
        let corrupted = GGA.replace("*47", "*48");

        assert!(parse_nmea_sentence(&mut data, &corrupted).is_none());
        assert!(data.latitude.is_none());
    }

    #[test]
    fn test_invalid_sentence() {
        let mut data = GpsData::new();
        let invalid = "$INVALID,123,456";

        assert!(parse_nmea_sentence(&mut data, invalid).is_none());
        assert!(data.latitude.is_none());
        assert!(data.longitude.is_none());
    }
}
