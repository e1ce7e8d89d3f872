// src/location/mod.rs
//! Location samples, update requests and providers

pub mod provider;
pub mod request;
pub mod sample;
pub mod stream;

pub use provider::{LocationCallback, LocationProvider, SubscriptionId};
pub use request::{Priority, UpdateConfig};
pub use sample::LocationSample;
pub use stream::{GpsSource, StreamProvider};
