// Install/update lifecycle handling for the background service worker
// Seeds default settings on first install, ignores everything else

use std::cell::Cell;

use serde::Deserialize;

use crate::error::StorageError;
use crate::services::KeyValueStore;
use crate::settings::Settings;

/// `chrome.runtime.OnInstalledReason`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    ChromeUpdate,
    SharedModuleUpdate,
    Unknown(String),
}

impl InstallReason {
    pub fn parse(reason: &str) -> Self {
        match reason {
            "install" => InstallReason::Install,
            "update" => InstallReason::Update,
            "chrome_update" => InstallReason::ChromeUpdate,
            "shared_module_update" => InstallReason::SharedModuleUpdate,
            other => InstallReason::Unknown(other.to_string()),
        }
    }
}

/// Payload of `chrome.runtime.onInstalled`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledDetails {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub previous_version: Option<String>,
}

impl InstalledDetails {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn reason(&self) -> InstallReason {
        InstallReason::parse(self.reason.as_deref().unwrap_or_default())
    }
}

#[derive(Debug)]
pub enum LifecycleOutcome {
    /// Default settings were written
    Seeded,
    /// First install, but the default settings could not be written.
    /// Surfaces fall back to the same default, so nothing else changes.
    SeedFailed(StorageError),
    /// Nothing to do for this reason
    Ignored(InstallReason),
}

impl LifecycleOutcome {
    pub fn wrote_defaults(&self) -> bool {
        matches!(self, LifecycleOutcome::Seeded)
    }
}

/// Reacts to `onInstalled` events.
///
/// Holds no state of its own: the worker may be torn down and respawned at
/// any time, so everything durable lives in the store.
pub struct LifecycleHandler<S> {
    store: S,
}

impl<S: KeyValueStore> LifecycleHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Handle one lifecycle event. Never fails: storage errors are logged
    /// and returned in the outcome.
    pub async fn handle_installed(&self, details: &InstalledDetails) -> LifecycleOutcome {
        match details.reason() {
            InstallReason::Install => {
                log::info!("Extension installed, seeding default settings");
                self.seed_defaults().await
            }
            InstallReason::Update => {
                match &details.previous_version {
                    Some(previous) => log::info!("Extension updated from {}", previous),
                    None => log::info!("Extension updated"),
                }
                LifecycleOutcome::Ignored(InstallReason::Update)
            }
            other => {
                log::debug!("Ignoring install event with reason {:?}", other);
                LifecycleOutcome::Ignored(other)
            }
        }
    }

    async fn seed_defaults(&self) -> LifecycleOutcome {
        let items = match Settings::seeded().to_items() {
            Ok(items) => items,
            Err(e) => return self.seed_failed(e.into()),
        };

        match self.store.set(items).await {
            Ok(()) => {
                log::info!("Default settings written to {}", self.store.description());
                LifecycleOutcome::Seeded
            }
            Err(e) => self.seed_failed(e),
        }
    }

    fn seed_failed(&self, error: StorageError) -> LifecycleOutcome {
        log::error!(
            "Failed to write default settings to {}: {}",
            self.store.description(),
            error
        );
        LifecycleOutcome::SeedFailed(error)
    }
}

thread_local! {
    static LISTENERS_REGISTERED: Cell<bool> = const { Cell::new(false) };
}

/// Run `register` at most once per JS context.
///
/// A respawned worker is a fresh context and registers again; repeated
/// calls inside one context do nothing. Returns whether `register` ran.
pub fn register_once(register: impl FnOnce()) -> bool {
    let first = LISTENERS_REGISTERED.with(|flag| !flag.replace(true));
    if first {
        register();
    } else {
        log::debug!("Listeners already registered in this context");
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStorage;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_parse_reasons() {
        assert_eq!(InstallReason::parse("install"), InstallReason::Install);
        assert_eq!(InstallReason::parse("update"), InstallReason::Update);
        assert_eq!(InstallReason::parse("chrome_update"), InstallReason::ChromeUpdate);
        assert_eq!(
            InstallReason::parse("shared_module_update"),
            InstallReason::SharedModuleUpdate
        );
        assert_eq!(
            InstallReason::parse("sideload"),
            InstallReason::Unknown("sideload".to_string())
        );
    }

    #[test]
    fn test_missing_reason_is_unknown() {
        let details: InstalledDetails = serde_json::from_value(json!({})).unwrap();
        assert_eq!(details.reason(), InstallReason::Unknown(String::new()));
    }

    #[test]
    fn test_details_from_event_payload() {
        let details: InstalledDetails =
            serde_json::from_value(json!({ "reason": "update", "previousVersion": "0.0.9" }))
                .unwrap();
        assert_eq!(details.reason(), InstallReason::Update);
        assert_eq!(details.previous_version.as_deref(), Some("0.0.9"));
    }

    #[test]
    fn test_install_seeds_once_and_update_writes_nothing() {
        let storage = InMemoryStorage::new();
        let handler = LifecycleHandler::new(storage.clone());

        let outcome = block_on(handler.handle_installed(&InstalledDetails::new("install")));
        assert!(outcome.wrote_defaults());
        assert_eq!(storage.write_count(), 1);
        assert_eq!(
            serde_json::Value::Object(storage.write_calls()[0].clone()),
            json!({ "enableFeature": true })
        );

        let outcome = block_on(handler.handle_installed(&InstalledDetails::new("update")));
        assert!(matches!(outcome, LifecycleOutcome::Ignored(InstallReason::Update)));
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_other_reasons_are_no_ops() {
        let storage = InMemoryStorage::new();
        let handler = LifecycleHandler::new(storage.clone());

        for reason in ["chrome_update", "shared_module_update", "", "something_new"] {
            let outcome = block_on(handler.handle_installed(&InstalledDetails::new(reason)));
            assert!(matches!(outcome, LifecycleOutcome::Ignored(_)), "reason: {}", reason);
        }
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_seed_failure_is_reported_not_raised() {
        let storage = InMemoryStorage::new();
        storage.fail_writes("QUOTA_BYTES quota exceeded");
        let handler = LifecycleHandler::new(storage.clone());

        let outcome = block_on(handler.handle_installed(&InstalledDetails::new("install")));
        match outcome {
            LifecycleOutcome::SeedFailed(StorageError::Backend(msg)) => {
                assert!(msg.contains("quota"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(storage.entries().is_empty());
    }

    #[test]
    fn test_each_handler_instance_writes_once_per_event() {
        let storage = InMemoryStorage::new();
        // Simulates the worker being respawned: each respawn builds a new handler
        let first = LifecycleHandler::new(storage.clone());
        let second = LifecycleHandler::new(storage.clone());

        block_on(second.handle_installed(&InstalledDetails::new("install")));
        assert_eq!(storage.write_count(), 1);

        block_on(first.handle_installed(&InstalledDetails::new("update")));
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn test_register_once_per_context() {
        let mut calls = 0;
        assert!(register_once(|| calls += 1));
        assert!(!register_once(|| calls += 1));
        assert!(!register_once(|| calls += 1));
        assert_eq!(calls, 1);

        // A respawned worker is a fresh context
        let respawned = std::thread::spawn(|| register_once(|| {})).join().unwrap();
        assert!(respawned);
    }
}
