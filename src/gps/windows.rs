// src/gps/windows.rs
//! Windows Location Services integration

use crate::error::{LocationError, Result};
use crate::location::{stream::Publisher, LocationSample};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;
use tracing::{error, info};
use windows::{Devices::Geolocation::*, Foundation::*};

const SOURCE_LABEL: &str = "Windows Location";

/// Ask the OS for location access
pub async fn request_location_access() -> Result<()> {
    let access_status = Geolocator::RequestAccessAsync()?.await?;

    match access_status {
        GeolocationAccessStatus::Allowed => {
            info!("Windows location access granted");
            Ok(())
        }
        GeolocationAccessStatus::Denied => {
            Err(LocationError::Permission("Location access denied in Windows settings".to_string()))
        }
        GeolocationAccessStatus::Unspecified => {
            Err(LocationError::Permission("Location access unspecified".to_string()))
        }
        _ => Err(LocationError::Permission("Unknown location access status".to_string())),
    }
}

/// Create and configure a Windows Geolocator
pub fn create_geolocator(accuracy: u32) -> Result<Geolocator> {
    let geolocator = Geolocator::new()?;

    let desired_accuracy = match accuracy {
        0..=100 => PositionAccuracy::High,
        _ => PositionAccuracy::Default,
    };
    geolocator.SetDesiredAccuracy(desired_accuracy)?;
    geolocator.SetMovementThreshold(1.0)?;

    Ok(geolocator)
}

/// Get current position from Windows Location Services
async fn get_position(geolocator: &Geolocator) -> Result<Geoposition> {
    // 10 seconds in 100ns units
    let timeout = TimeSpan {
        Duration: 10_000_000 * 10,
    };

    let position = geolocator
        .GetGeopositionAsyncWithAgeAndTimeout(timeout, timeout)?
        .await?;

    Ok(position)
}

/// Convert a Windows Geoposition into a sample
fn to_sample(position: &Geoposition) -> Result<LocationSample> {
    let coordinate = position.Coordinate()?;
    let point = coordinate.Point()?.Position()?;

    let mut sample = LocationSample::new(point.Latitude, point.Longitude, coordinate.Accuracy()?)
        .with_provider(SOURCE_LABEL);

    // Altitude of exactly zero means the platform did not supply one
    if point.Altitude != 0.0 {
        sample.altitude = Some(point.Altitude);
    }

    if let Ok(speed) = coordinate.Speed().and_then(|s| s.Value()) {
        if speed.is_finite() {
            sample.speed = Some(speed);
        }
    }

    Ok(sample)
}

/// Poll Windows Location Services until shut down
pub async fn run_location_monitoring(
    geolocator: Geolocator,
    publisher: Publisher,
    running: Arc<AtomicBool>,
    interval: u64,
) {
    while running.load(Ordering::Relaxed) {
        match get_position(&geolocator).await.and_then(|p| to_sample(&p)) {
            Ok(sample) => publisher.publish(sample),
            Err(e) => error!("Error getting Windows location: {}", e),
        }

        sleep(Duration::from_secs(interval.max(1))).await;
    }
}
