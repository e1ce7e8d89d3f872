// src/app.rs
//! Wires a provider, geocoder and permission gate into the controller and runs a view

use crate::{
    config::AppConfig,
    controller::LocationDisplayController,
    display::{terminal::TerminalDisplay, LocationView},
    error::Result,
    geocode::{DisabledGeocoder, NominatimGeocoder, ReverseGeocoder},
    location::StreamProvider,
    permission::ConsentStore,
};
use std::{path::PathBuf, sync::mpsc};
use tracing::info;

const PERMISSION_FILE: &str = "permission.json";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub gui: bool,
    pub reset_permission: bool,
    /// Where the permission file lives
    pub data_dir: PathBuf,
}

/// Build the geocoder the configuration asks for
pub fn build_geocoder(config: &AppConfig) -> Result<Box<dyn ReverseGeocoder>> {
    if config.geocoder.enabled {
        info!("Reverse geocoding via {}", config.geocoder.base_url);
        Ok(Box::new(NominatimGeocoder::new(&config.geocoder)?))
    } else {
        info!("Reverse geocoding disabled");
        Ok(Box::new(DisabledGeocoder))
    }
}

/// Connect to the configured source and run the screen until the user quits.
///
/// Blocks the calling thread, which becomes the UI thread.
pub fn run(config: AppConfig, options: RunOptions) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    let source = config.to_source()?;
    let provider = runtime.block_on(StreamProvider::connect(source))?;
    info!("Using {} source", provider.label());

    // The blocking HTTP client must be created outside the runtime
    let geocoder = build_geocoder(&config)?;

    let mut permissions = ConsentStore::open(&options.data_dir.join(PERMISSION_FILE));
    if options.reset_permission {
        permissions.reset()?;
    }

    let (tx, rx) = mpsc::channel();
    let mut controller = LocationDisplayController::new(
        Box::new(provider),
        geocoder,
        Box::new(permissions),
        config.update_config(),
        tx,
    );
    controller.request_location_access();

    let result = if options.gui {
        run_gui(controller, rx)
    } else {
        TerminalDisplay::new().run(controller, rx)
    };

    runtime.shutdown_background();
    result
}

#[cfg(feature = "gui")]
fn run_gui(controller: LocationDisplayController, rx: mpsc::Receiver<crate::display::UiEvent>) -> Result<()> {
    crate::display::gui::GuiDisplay::new().run(controller, rx)
}

#[cfg(not(feature = "gui"))]
fn run_gui(_controller: LocationDisplayController, _rx: mpsc::Receiver<crate::display::UiEvent>) -> Result<()> {
    Err(crate::error::LocationError::Other(
        "GUI support not compiled in; build with --features gui".to_string(),
    ))
}
