// src/main.rs
//! Location Display - single-screen position display for GPS sources

use anyhow::Context;
use clap::Parser;
use location_display::{
    app::{self, RunOptions},
    config::AppConfig,
    location::stream::list_serial_ports,
    logging,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "location-display", version, about = "Show the current position from a GPS source")]
struct Args {
    /// Read configuration from this file instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Position source
    #[arg(long, value_parser = ["gpsd", "serial", "replay", "windows"])]
    source: Option<String>,

    /// gpsd host
    #[arg(long)]
    host: Option<String>,

    /// gpsd port
    #[arg(long)]
    port: Option<u16>,

    /// Serial device of an NMEA receiver
    #[arg(long)]
    serial_port: Option<String>,

    #[arg(long)]
    baudrate: Option<u32>,

    /// NMEA log to play back
    #[arg(long)]
    replay_file: Option<PathBuf>,

    /// Delay between replayed fixes
    #[arg(long)]
    replay_interval_ms: Option<u64>,

    /// Start in high accuracy mode
    #[arg(long)]
    high_accuracy: bool,

    /// Skip reverse geocoding
    #[arg(long)]
    no_geocoder: bool,

    /// Open an egui window instead of the terminal screen
    #[arg(long)]
    gui: bool,

    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Forget the stored location permission answer
    #[arg(long)]
    reset_permission: bool,

    /// Write the effective configuration back before starting
    #[arg(long)]
    save: bool,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if self.host.is_some() || self.port.is_some() {
            let host = self
                .host
                .clone()
                .or_else(|| config.gpsd_host.clone())
                .unwrap_or_else(|| "localhost".to_string());
            let port = self.port.or(config.gpsd_port).unwrap_or(2947);
            config.update_gpsd(host, port);
        }
        if let Some(serial_port) = &self.serial_port {
            let baudrate = self.baudrate.or(config.serial_baudrate).unwrap_or(9600);
            config.update_serial(serial_port.clone(), baudrate);
        } else if let Some(baudrate) = self.baudrate {
            config.serial_baudrate = Some(baudrate);
        }
        if let Some(path) = &self.replay_file {
            let interval = self.replay_interval_ms.or(config.replay_interval_ms).unwrap_or(1000);
            config.update_replay(path.clone(), interval);
        } else if let Some(interval) = self.replay_interval_ms {
            config.replay_interval_ms = Some(interval);
        }
        // An explicit source wins over the one implied by connection flags
        if let Some(source) = &self.source {
            config.update_source(source);
        }
        if self.high_accuracy {
            config.high_accuracy = true;
        }
        if self.no_geocoder {
            config.geocoder.enabled = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list_ports {
        let ports = list_serial_ports()?;
        if ports.is_empty() {
            println!("No serial ports found.");
        } else {
            println!("Available serial ports:");
            for port in ports {
                println!("  {}", port);
            }
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;
    args.apply(&mut config);

    if args.save {
        match &args.config {
            Some(path) => config.save_to(path),
            None => config.save(),
        }
        .context("Failed to save configuration")?;
    }

    let data_dir = AppConfig::data_dir(args.config.as_deref()).context("Failed to resolve data directory")?;
    let log_path = logging::init(&config, &data_dir)?;
    tracing::info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Starting location display using {} source (log: {})", config.source_type, log_path.display());

    app::run(
        config,
        RunOptions {
            gui: args.gui,
            reset_permission: args.reset_permission,
            data_dir,
        },
    )
    .context("Location display stopped with an error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_override() {
        let args = Args::try_parse_from([
            "location-display",
            "--replay-file",
            "/tmp/drive.nmea",
            "--replay-interval-ms",
            "250",
            "--no-geocoder",
        ])
        .unwrap();

        let mut config = AppConfig::platform_default();
        args.apply(&mut config);

        assert_eq!(config.source_type, "replay");
        assert_eq!(config.replay_file, Some(PathBuf::from("/tmp/drive.nmea")));
        assert_eq!(config.replay_interval_ms, Some(250));
        assert!(!config.geocoder.enabled);
    }

    #[test]
    fn test_serial_override_keeps_configured_baudrate() {
        let args = Args::try_parse_from(["location-display", "--serial-port", "/dev/ttyACM0", "--high-accuracy"]).unwrap();

        let mut config = AppConfig::platform_default();
        config.serial_baudrate = Some(38400);
        args.apply(&mut config);

        assert_eq!(config.source_type, "serial");
        assert_eq!(config.serial_port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.serial_baudrate, Some(38400));
        assert!(config.high_accuracy);
    }

    #[test]
    fn test_gpsd_port_override_selects_gpsd() {
        let args = Args::try_parse_from(["location-display", "--port", "3000"]).unwrap();

        let mut config = AppConfig::platform_default();
        config.update_source("replay");
        config.gpsd_host = Some("gps.local".to_string());
        args.apply(&mut config);

        assert_eq!(config.source_type, "gpsd");
        assert_eq!(config.gpsd_host.as_deref(), Some("gps.local"));
        assert_eq!(config.gpsd_port, Some(3000));
    }

    #[test]
    fn test_explicit_source_wins() {
        let args = Args::try_parse_from(["location-display", "--host", "gps.local", "--source", "serial"]).unwrap();

        let mut config = AppConfig::platform_default();
        args.apply(&mut config);

        assert_eq!(config.source_type, "serial");
        assert_eq!(config.gpsd_host.as_deref(), Some("gps.local"));
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!(Args::try_parse_from(["location-display", "--source", "pigeon"]).is_err());
    }
}
