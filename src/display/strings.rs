// src/display/strings.rs
//! User-facing text shown on the location screen

pub const NOT_AVAILABLE: &str = "Not Available";

pub const TRACKING_ENABLED: &str = "Location is being tracked";
pub const TRACKING_DISABLED: &str = "Location is NOT being tracked";

pub const SENSOR_HIGH_ACCURACY: &str = "Using GPS sensors";
pub const SENSOR_BALANCED_POWER: &str = "Using balanced power sources";

pub const PERMISSION_ALREADY_GRANTED: &str = "Location permission already granted";
pub const PERMISSION_RATIONALE: &str = "Location access is needed to show where you are";
pub const PERMISSION_PROMPT: &str = "Allow this app to access your location?";
pub const FEATURE_UNAVAILABLE: &str =
    "Location display is unavailable because location permission was denied";
pub const UPDATES_FAILED: &str = "Unable to start location updates";
