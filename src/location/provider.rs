// src/location/provider.rs
//! Location provider abstraction

use super::{request::UpdateConfig, sample::LocationSample};
use crate::error::Result;
use std::sync::Arc;

pub type SubscriptionId = u64;

/// Invoked once per delivered sample, from the provider's own task
pub type LocationCallback = Arc<dyn Fn(LocationSample) + Send + Sync>;

/// A source of device positions: a one-shot last known fix plus a
/// subscription stream that runs until removed.
pub trait LocationProvider: Send {
    /// Most recent sample the provider has seen, if any
    fn last_location(&mut self) -> Result<Option<LocationSample>>;

    /// Register a callback for continuous updates using `config`
    fn request_location_updates(
        &mut self,
        config: &UpdateConfig,
        callback: LocationCallback,
    ) -> Result<SubscriptionId>;

    /// Stop delivering to the given subscription. Unknown ids are ignored.
    fn remove_location_updates(&mut self, id: SubscriptionId);

    /// Number of live subscriptions
    fn active_subscriptions(&self) -> usize;
}
