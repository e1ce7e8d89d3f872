// src/location/stream.rs
//! Provider backed by a streaming position source (serial NMEA, gpsd, replay file)

use super::{
    provider::{LocationCallback, LocationProvider, SubscriptionId},
    request::UpdateConfig,
    sample::LocationSample,
};
use crate::{
    error::{LocationError, Result},
    gps::{data::GpsData, gpsd, nmea},
};
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinHandle,
};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, error, info, warn};

#[cfg(windows)]
use crate::gps::windows;

/// GPS data source configuration
#[derive(Debug, Clone)]
pub enum GpsSource {
    Serial { port: String, baudrate: u32 },
    Gpsd { host: String, port: u16 },
    Replay { path: PathBuf, interval: Duration },
    #[cfg(windows)]
    Windows { accuracy: u32, interval: u64 },
}

impl GpsSource {
    pub fn label(&self) -> &'static str {
        match self {
            GpsSource::Serial { .. } => "Serial GPS",
            GpsSource::Gpsd { .. } => "gpsd",
            GpsSource::Replay { .. } => "NMEA replay",
            #[cfg(windows)]
            GpsSource::Windows { .. } => "Windows Location",
        }
    }
}

struct Subscription {
    config: UpdateConfig,
    callback: LocationCallback,
    last_delivery: Option<Instant>,
}

impl Subscription {
    fn is_due(&self, now: Instant) -> bool {
        match self.last_delivery {
            Some(last) => now.duration_since(last) >= self.config.delivery_interval(),
            None => true,
        }
    }
}

/// Last known sample plus the registered subscriptions
#[derive(Default)]
struct Hub {
    last: Option<LocationSample>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    next_id: SubscriptionId,
}

impl Hub {
    fn subscribe(&mut self, config: UpdateConfig, callback: LocationCallback) -> SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;
        self.subscriptions.insert(
            id,
            Subscription {
                config,
                callback,
                last_delivery: None,
            },
        );
        id
    }

    fn publish(&mut self, sample: LocationSample, now: Instant) {
        for (id, subscription) in self.subscriptions.iter_mut() {
            if subscription.is_due(now) {
                debug!(subscription = id, "Delivering {}", sample);
                (subscription.callback)(sample.clone());
                subscription.last_delivery = Some(now);
            }
        }
        self.last = Some(sample);
    }
}

/// Handle used by reader tasks to push decoded samples
#[derive(Clone)]
pub struct Publisher {
    hub: Arc<Mutex<Hub>>,
}

impl Publisher {
    pub fn publish(&self, sample: LocationSample) {
        self.publish_at(sample, Instant::now());
    }

    fn publish_at(&self, sample: LocationSample, now: Instant) {
        lock(&self.hub).publish(sample, now);
    }
}

fn lock(hub: &Mutex<Hub>) -> MutexGuard<'_, Hub> {
    // A panicking callback must not take the provider down with it
    hub.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// How a line-oriented source is decoded
#[derive(Debug, Clone, Copy)]
enum Decoder {
    Nmea,
    Gpsd,
}

impl Decoder {
    fn decode(&self, data: &mut GpsData, line: &str) -> Option<LocationSample> {
        match self {
            Decoder::Nmea => nmea::parse_nmea_sentence(data, line),
            Decoder::Gpsd => match gpsd::parse_gpsd_json(data, line) {
                Ok(sample) => sample,
                Err(e) => {
                    warn!("Error parsing gpsd JSON: {}", e);
                    None
                }
            },
        }
    }
}

/// Location provider fed by a background reader task
pub struct StreamProvider {
    hub: Arc<Mutex<Hub>>,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    label: &'static str,
}

impl StreamProvider {
    /// Open `source` and start reading from it on the current tokio runtime
    pub async fn connect(source: GpsSource) -> Result<Self> {
        let mut provider = Self::detached(source.label());
        let publisher = provider.publisher();
        let running = Arc::clone(&provider.running);
        let label = source.label();

        let task = match source {
            GpsSource::Serial { port, baudrate } => {
                info!("Connecting to GPS on {} at {} baud...", port, baudrate);
                let serial = tokio_serial::new(port.as_str(), baudrate)
                    .timeout(Duration::from_millis(1000))
                    .open_native_async()
                    .map_err(|e| LocationError::Connection(format!("Failed to open serial port {}: {}", port, e)))?;
                info!("Connected to {}", port);

                tokio::spawn(read_lines(BufReader::new(serial), Decoder::Nmea, label, publisher, running, None))
            }
            GpsSource::Gpsd { host, port } => {
                info!("Connecting to gpsd at {}:{}...", host, port);
                let reader = gpsd::connect_gpsd(&host, port).await?;
                info!("Connected to gpsd");

                tokio::spawn(read_lines(reader, Decoder::Gpsd, label, publisher, running, None))
            }
            GpsSource::Replay { path, interval } => {
                info!("Replaying NMEA log {}", path.display());
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|e| LocationError::Connection(format!("Failed to open replay file {}: {}", path.display(), e)))?;

                tokio::spawn(read_lines(BufReader::new(file), Decoder::Nmea, label, publisher, running, Some(interval)))
            }
            #[cfg(windows)]
            GpsSource::Windows { accuracy, interval } => {
                info!("Connecting to Windows Location Service...");
                windows::request_location_access().await?;
                let geolocator = windows::create_geolocator(accuracy)?;
                info!("Windows Location Service initialized");

                tokio::spawn(windows::run_location_monitoring(geolocator, publisher, running, interval))
            }
        };

        provider.task = Some(task);
        Ok(provider)
    }

    /// Provider with no reader attached; samples arrive through [`Self::publisher`]
    pub fn detached(label: &'static str) -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub::default())),
            running: Arc::new(AtomicBool::new(true)),
            task: None,
            label,
        }
    }

    pub fn publisher(&self) -> Publisher {
        Publisher {
            hub: Arc::clone(&self.hub),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Check if the reader task is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed) && self.task.as_ref().map_or(true, |t| !t.is_finished())
    }

    /// Stop the reader task and drop every subscription
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        lock(&self.hub).subscriptions.clear();
    }
}

impl Drop for StreamProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl LocationProvider for StreamProvider {
    fn last_location(&mut self) -> Result<Option<LocationSample>> {
        Ok(lock(&self.hub).last.clone())
    }

    fn request_location_updates(
        &mut self,
        config: &UpdateConfig,
        callback: LocationCallback,
    ) -> Result<SubscriptionId> {
        if !self.is_running() {
            return Err(LocationError::Connection(format!("{} source is no longer running", self.label)));
        }
        let id = lock(&self.hub).subscribe(*config, callback);
        info!(subscription = id, ?config, "Location updates requested");
        Ok(id)
    }

    fn remove_location_updates(&mut self, id: SubscriptionId) {
        if lock(&self.hub).subscriptions.remove(&id).is_some() {
            info!(subscription = id, "Location updates removed");
        }
    }

    fn active_subscriptions(&self) -> usize {
        lock(&self.hub).subscriptions.len()
    }
}

/// Read a line-oriented source until EOF, an I/O error, or shutdown.
/// With `pace` set, sleep that long after every produced sample.
async fn read_lines<R>(
    mut reader: R,
    decoder: Decoder,
    label: &'static str,
    publisher: Publisher,
    running: Arc<AtomicBool>,
    pace: Option<Duration>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut data = GpsData::new();
    data.set_source(label);
    let mut buf = Vec::new();

    while running.load(Ordering::Relaxed) {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                info!("{} source reached end of stream", label);
                break;
            }
            Ok(_) => {
                // Line noise and wrong-baud bytes are skipped, not fatal
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                if text.contains(char::REPLACEMENT_CHARACTER) {
                    debug!("Skipping non-UTF-8 line from {}", label);
                    continue;
                }
                data.update_timestamp();
                if let Some(sample) = decoder.decode(&mut data, line) {
                    publisher.publish(sample);
                    if let Some(pace) = pace {
                        tokio::time::sleep(pace).await;
                    }
                }
            }
            Err(e) => {
                error!("Error reading from {}: {}", label, e);
                break;
            }
        }
    }

    running.store(false, Ordering::Relaxed);
}

/// List available serial ports
pub fn list_serial_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()?;

    Ok(ports
        .into_iter()
        .map(|port| format!("{} - {:?}", port.port_name, port.port_type))
        .collect())
}
