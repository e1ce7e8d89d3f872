// src/display/mod.rs
//! Display modules for different interfaces

pub mod screen;
pub mod strings;
pub mod terminal;

#[cfg(feature = "gui")]
pub mod gui;

pub use screen::Screen;

use crate::{controller::LocationDisplayController, error::Result, location::LocationSample};
use std::sync::mpsc::Receiver;

/// Messages posted to the UI thread's queue
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A sample delivered to the update session numbered `session`
    Location { session: u64, sample: LocationSample },
}

/// User input, independent of the view that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleAccuracy,
    ToggleUpdates,
    AnswerPermission(bool),
    RequestAccess,
    Quit,
}

/// Apply `action` to the controller. Returns false once the view should close.
pub fn apply_action(controller: &mut LocationDisplayController, action: Action) -> bool {
    match action {
        Action::ToggleAccuracy => controller.toggle_accuracy(),
        Action::ToggleUpdates => controller.toggle_updates(),
        Action::AnswerPermission(granted) => controller.on_permission_result(granted),
        Action::RequestAccess => controller.request_location_access(),
        Action::Quit => return false,
    }
    true
}

/// Drain every queued event into the controller
pub fn drain_events(controller: &mut LocationDisplayController, events: &Receiver<UiEvent>) {
    while let Ok(event) = events.try_recv() {
        controller.handle_event(event);
    }
}

/// Trait for different display implementations
pub trait LocationView {
    /// Run the screen on the calling thread until the user quits
    fn run(self, controller: LocationDisplayController, events: Receiver<UiEvent>) -> Result<()>;
}
