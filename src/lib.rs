// src/lib.rs
//! Location Display Library
//!
//! A single-screen location display: last known and live positions from a
//! GPS source, two accuracy modes, and reverse-geocoded addresses.

pub mod app;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod geocode;
pub mod gps;
pub mod location;
pub mod logging;
pub mod permission;

// Re-export main types for convenience
pub use controller::{LocationDisplayController, SubscriptionState};
pub use error::{LocationError, Result};
pub use location::{GpsSource, LocationProvider, LocationSample, Priority, StreamProvider, UpdateConfig};
