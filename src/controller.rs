// src/controller.rs
//! Location display controller: permission flow, update subscription and rendering

use crate::{
    display::{screen::PermissionPrompt, strings, Screen, UiEvent},
    geocode::ReverseGeocoder,
    location::{LocationCallback, LocationProvider, LocationSample, Priority, SubscriptionId, UpdateConfig},
    permission::{PermissionGate, PermissionRequest, PermissionStatus},
};
use std::sync::{mpsc::Sender, Arc};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Stopped,
    Active(SubscriptionId),
}

/// Owns all screen state. Driven from the UI thread only; provider callbacks
/// reach it as [`UiEvent`]s posted to the UI queue.
pub struct LocationDisplayController {
    provider: Box<dyn LocationProvider>,
    geocoder: Box<dyn ReverseGeocoder>,
    permissions: Box<dyn PermissionGate>,
    events: Sender<UiEvent>,
    config: UpdateConfig,
    state: SubscriptionState,
    // Bumped on every start; queued samples from older sessions are stale
    session: u64,
    screen: Screen,
}

impl LocationDisplayController {
    pub fn new(
        provider: Box<dyn LocationProvider>,
        geocoder: Box<dyn ReverseGeocoder>,
        permissions: Box<dyn PermissionGate>,
        config: UpdateConfig,
        events: Sender<UiEvent>,
    ) -> Self {
        Self {
            provider,
            geocoder,
            permissions,
            events,
            config,
            state: SubscriptionState::Stopped,
            session: 0,
            screen: Screen::new(config.priority),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn update_config(&self) -> &UpdateConfig {
        &self.config
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Show the last known location if permitted, otherwise ask for permission
    pub fn request_location_access(&mut self) {
        match self.permissions.status() {
            PermissionStatus::Granted => self.on_access_granted(),
            _ if self.permissions.should_show_rationale() => {
                self.screen.show_notice(strings::PERMISSION_RATIONALE);
                self.launch_permission_request(true);
            }
            _ => self.launch_permission_request(false),
        }
    }

    /// The user answered the permission prompt
    pub fn on_permission_result(&mut self, granted: bool) {
        self.screen.prompt = None;
        if let Err(e) = self.permissions.record(granted) {
            warn!("Failed to store permission answer: {}", e);
        }
        self.apply_permission_result(granted);
    }

    fn launch_permission_request(&mut self, rationale: bool) {
        match self.permissions.request() {
            PermissionRequest::Pending => {
                debug!(rationale, "Prompting for location permission");
                self.screen.prompt = Some(PermissionPrompt { rationale });
            }
            PermissionRequest::Completed(granted) => self.apply_permission_result(granted),
        }
    }

    fn apply_permission_result(&mut self, granted: bool) {
        if granted {
            self.on_access_granted();
        } else {
            info!("Location permission denied");
            self.screen.show_notice(strings::FEATURE_UNAVAILABLE);
        }
    }

    fn on_access_granted(&mut self) {
        self.screen.show_notice(strings::PERMISSION_ALREADY_GRANTED);
        match self.provider.last_location() {
            Ok(Some(sample)) => {
                debug!("Last location: {}", sample);
                self.render(&sample);
            }
            Ok(None) => debug!("No last known location yet"),
            Err(e) => warn!("Failed to read last known location: {}", e),
        }
    }

    /// Subscribe to continuous updates with the current [`UpdateConfig`].
    /// Does nothing while a subscription is already active.
    pub fn start_updates(&mut self) {
        if let SubscriptionState::Active(id) = self.state {
            debug!(subscription = id, "Location updates already active");
            return;
        }

        if self.permissions.status() != PermissionStatus::Granted {
            self.screen.updates_enabled = false;
            self.screen.show_notice(strings::FEATURE_UNAVAILABLE);
            return;
        }

        self.session += 1;
        let session = self.session;
        let events = self.events.clone();
        let callback: LocationCallback = Arc::new(move |sample: LocationSample| {
            // The receiver is gone once the screen closes
            let _ = events.send(UiEvent::Location { session, sample });
        });

        match self.provider.request_location_updates(&self.config, callback) {
            Ok(id) => {
                info!(subscription = id, priority = ?self.config.priority, "Location updates started");
                self.state = SubscriptionState::Active(id);
                self.screen.updates_enabled = true;
                self.screen.updates = strings::TRACKING_ENABLED.to_string();
            }
            Err(e) => {
                error!("Failed to start location updates: {}", e);
                self.screen.updates_enabled = false;
                self.screen.show_notice(&format!("{}: {}", strings::UPDATES_FAILED, e));
            }
        }
    }

    /// Unsubscribe and reset every tracking field to the disabled text
    pub fn stop_updates(&mut self) {
        if let SubscriptionState::Active(id) = self.state {
            self.provider.remove_location_updates(id);
            info!(subscription = id, "Location updates stopped");
        }
        self.state = SubscriptionState::Stopped;
        self.screen.updates_enabled = false;
        self.screen.reset_tracking_fields();
    }

    /// Applies from the next [`Self::start_updates`] on
    pub fn set_accuracy_mode(&mut self, priority: Priority) {
        self.config.priority = priority;
        self.screen.set_priority(priority);
    }

    pub fn toggle_accuracy(&mut self) {
        let next = Priority::from_high_accuracy(!self.config.priority.is_high_accuracy());
        self.set_accuracy_mode(next);
    }

    pub fn toggle_updates(&mut self) {
        match self.state {
            SubscriptionState::Stopped => self.start_updates(),
            SubscriptionState::Active(_) => self.stop_updates(),
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Location { session, sample } => self.on_location(session, sample),
        }
    }

    fn on_location(&mut self, session: u64, sample: LocationSample) {
        if self.state == SubscriptionState::Stopped || session != self.session {
            // Delivered before the unsubscribe, still sitting in the queue
            debug!(session, current = self.session, "Dropping stale update: {}", sample);
            return;
        }
        debug!("On location result: {}", sample);
        self.render(&sample);
    }

    /// Write `sample` into the text fields and look up its address.
    ///
    /// The lookup is synchronous. On failure the previous address stays.
    pub fn render(&mut self, sample: &LocationSample) {
        self.screen.latitude = format!("{:.6}", sample.latitude);
        self.screen.longitude = format!("{:.6}", sample.longitude);
        self.screen.accuracy = format!("{:.1} m", sample.accuracy);
        self.screen.altitude = match sample.altitude {
            Some(alt) => format!("{:.1} m", alt),
            None => strings::NOT_AVAILABLE.to_string(),
        };
        self.screen.speed = match sample.speed {
            Some(speed) => format!("{:.1} m/s", speed),
            None => strings::NOT_AVAILABLE.to_string(),
        };
        self.screen.last_fix = Some(sample.time);
        self.screen.provider = Some(sample.provider.clone());

        match self.geocoder.from_location(sample.latitude, sample.longitude, 1) {
            Ok(addresses) => match addresses.first().and_then(|a| a.address_line(0)) {
                Some(line) => self.screen.address = line.to_string(),
                None => warn!("No address found for {}", sample),
            },
            Err(e) => warn!("Reverse geocoding failed for {}: {}", sample, e),
        }
    }

    /// Release the provider subscription when the screen goes away
    pub fn shutdown(&mut self) {
        if let SubscriptionState::Active(id) = self.state {
            self.provider.remove_location_updates(id);
            self.state = SubscriptionState::Stopped;
        }
    }
}
