// src/permission.rs
//! Location permission gate and the on-disk consent store backing it

use crate::error::{LocationError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Denials after which the user is no longer asked
const MAX_PROMPTS_DENIED: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NotDetermined,
}

/// Outcome of asking for permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRequest {
    /// A prompt is on screen; the answer arrives later
    Pending,
    /// Answered without user interaction
    Completed(bool),
}

pub trait PermissionGate: Send {
    fn status(&self) -> PermissionStatus;

    /// Whether the user should be told why the permission is needed before
    /// being asked again
    fn should_show_rationale(&self) -> bool;

    fn request(&mut self) -> PermissionRequest;

    /// Store the user's answer to a prompt
    fn record(&mut self, granted: bool) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Consent {
    status: PermissionStatus,
    denials: u32,
}

impl Default for Consent {
    fn default() -> Self {
        Self {
            status: PermissionStatus::NotDetermined,
            denials: 0,
        }
    }
}

/// Permission decisions persisted as JSON next to the config file
#[derive(Debug)]
pub struct ConsentStore {
    path: Option<PathBuf>,
    consent: Consent,
}

impl ConsentStore {
    /// Open the store at `path`, starting undetermined if the file is missing
    /// or unreadable
    pub fn open(path: &Path) -> Self {
        let consent = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring unreadable permission file {}: {}", path.display(), e);
                Consent::default()
            }),
            Err(_) => Consent::default(),
        };

        Self {
            path: Some(path.to_path_buf()),
            consent,
        }
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            consent: Consent::default(),
        }
    }

    /// Forget any earlier decision
    pub fn reset(&mut self) -> Result<()> {
        self.consent = Consent::default();
        match &self.path {
            Some(path) if path.exists() => std::fs::remove_file(path).map_err(|e| {
                LocationError::Permission(format!("Failed to remove {}: {}", path.display(), e))
            }),
            _ => Ok(()),
        }
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.consent)?)
            .map_err(|e| LocationError::Permission(format!("Failed to save {}: {}", path.display(), e)))
    }
}

impl PermissionGate for ConsentStore {
    fn status(&self) -> PermissionStatus {
        self.consent.status
    }

    fn should_show_rationale(&self) -> bool {
        self.consent.status == PermissionStatus::Denied && self.consent.denials < MAX_PROMPTS_DENIED
    }

    fn request(&mut self) -> PermissionRequest {
        match self.consent.status {
            PermissionStatus::Granted => PermissionRequest::Completed(true),
            PermissionStatus::Denied if self.consent.denials >= MAX_PROMPTS_DENIED => {
                info!("Location permission permanently denied; not prompting");
                PermissionRequest::Completed(false)
            }
            _ => PermissionRequest::Pending,
        }
    }

    fn record(&mut self, granted: bool) -> Result<()> {
        if granted {
            self.consent.status = PermissionStatus::Granted;
        } else {
            self.consent.status = PermissionStatus::Denied;
            self.consent.denials += 1;
        }
        info!(granted, denials = self.consent.denials, "Location permission answered");
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("location-display-permission-{}-{}.json", std::process::id(), name))
    }

    #[test]
    fn test_first_request_prompts() {
        let mut store = ConsentStore::in_memory();
        assert_eq!(store.status(), PermissionStatus::NotDetermined);
        assert!(!store.should_show_rationale());
        assert_eq!(store.request(), PermissionRequest::Pending);
    }

    #[test]
    fn test_rationale_after_single_denial() {
        let mut store = ConsentStore::in_memory();
        store.record(false).unwrap();

        assert_eq!(store.status(), PermissionStatus::Denied);
        assert!(store.should_show_rationale());
        assert_eq!(store.request(), PermissionRequest::Pending);
    }

    #[test]
    fn test_second_denial_is_permanent() {
        let mut store = ConsentStore::in_memory();
        store.record(false).unwrap();
        store.record(false).unwrap();

        assert!(!store.should_show_rationale());
        assert_eq!(store.request(), PermissionRequest::Completed(false));
    }

    #[test]
    fn test_grant_persists_across_reopen() {
        let path = temp_file("grant");
        let mut store = ConsentStore::open(&path);
        store.record(true).unwrap();

        let reopened = ConsentStore::open(&path);
        assert_eq!(reopened.status(), PermissionStatus::Granted);

        let mut reopened = reopened;
        reopened.reset().unwrap();
        assert_eq!(reopened.status(), PermissionStatus::NotDetermined);
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_starts_undetermined() {
        let path = temp_file("corrupt");
        std::fs::write(&path, "not json").unwrap();

        let store = ConsentStore::open(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(store.status(), PermissionStatus::NotDetermined);
    }
}
