// Settings accessor for the options page
// Load on every activation, write on every toggle, UI state is optimistic

use crate::error::StorageError;
use crate::services::KeyValueStore;
use crate::settings::Settings;

/// Where the displayed value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    /// Key absent, default applied locally (not written back)
    Unset,
    /// Read failed, default applied locally
    ReadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedSettings {
    pub enable_feature: bool,
    pub source: LoadSource,
}

pub struct SettingsAccessor<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsAccessor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Raw typed read; `enable_feature` is `None` when the key is absent
    pub async fn read(&self) -> Result<Settings, StorageError> {
        let items = self.store.get(Some(Settings::keys())).await?;
        Ok(Settings::from_items(&items))
    }

    /// Value to display when the surface opens. Never fails and never writes.
    pub async fn load(&self) -> LoadedSettings {
        match self.read().await {
            Ok(settings) => {
                let source = if settings.enable_feature.is_some() {
                    LoadSource::Stored
                } else {
                    log::warn!("No stored settings yet, showing default");
                    LoadSource::Unset
                };
                log::debug!("Loaded settings: {:?}", settings);
                LoadedSettings {
                    enable_feature: settings.enable_feature_or_default(),
                    source,
                }
            }
            Err(e) => {
                log::error!(
                    "Failed to read settings from {}: {}",
                    self.store.description(),
                    e
                );
                LoadedSettings {
                    enable_feature: Settings::default().enable_feature_or_default(),
                    source: LoadSource::ReadFailed,
                }
            }
        }
    }

    /// Persist one toggle. The error is logged here and returned so the page can show it.
    pub async fn save(&self, enable_feature: bool) -> Result<(), StorageError> {
        let items = Settings::with_enable_feature(enable_feature).to_items()?;

        match self.store.set(items).await {
            Ok(()) => {
                log::debug!("Saved enableFeature = {}", enable_feature);
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Failed to save enableFeature = {} to {}: {}",
                    enable_feature,
                    self.store.description(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Apply a toggle to `state` the same way the options page does:
    /// update the control first, then write, then record the result.
    pub async fn toggle(&self, state: &mut ToggleState, checked: bool) {
        let generation = state.begin_toggle(checked);
        let result = self.save(checked).await;
        state.finish_save(generation, &result);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Failed(String),
}

/// Page-lifetime copy of the checkbox and its save status.
///
/// A failed write leaves `checked` as the user set it (no rollback); the
/// failure is shown in the status line instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleState {
    pub checked: bool,
    pub status: SaveStatus,
    generation: u64,
}

impl ToggleState {
    pub fn new(checked: bool) -> Self {
        Self {
            checked,
            status: SaveStatus::Idle,
            generation: 0,
        }
    }

    pub fn loaded(loaded: &LoadedSettings) -> Self {
        Self::new(loaded.enable_feature)
    }

    /// Optimistically apply the user's choice; returns a token for `finish_save`
    pub fn begin_toggle(&mut self, checked: bool) -> u64 {
        self.checked = checked;
        self.status = SaveStatus::Saving;
        self.generation += 1;
        self.generation
    }

    /// Record a write result. Results of writes that were superseded by a
    /// later toggle are dropped; storage applies writes in order, so only
    /// the latest one decides what is persisted.
    pub fn finish_save(&mut self, generation: u64, result: &Result<(), StorageError>) {
        if generation != self.generation {
            return;
        }
        self.status = match result {
            Ok(()) => SaveStatus::Saved,
            Err(e) => SaveStatus::Failed(e.to_string()),
        };
    }

    /// Hide a "Saved" notice; a failure stays visible until the next toggle
    pub fn clear_saved(&mut self, generation: u64) {
        if generation == self.generation && self.status == SaveStatus::Saved {
            self.status = SaveStatus::Idle;
        }
    }

    pub fn status_text(&self) -> Option<String> {
        match &self.status {
            SaveStatus::Idle => None,
            SaveStatus::Saving => Some(String::from("Saving…")),
            SaveStatus::Saved => Some(String::from("Saved")),
            SaveStatus::Failed(e) => Some(format!("Could not save: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStorage;
    use futures::executor::block_on;
    use serde_json::{json, Value};

    fn storage_with(value: Value) -> InMemoryStorage {
        InMemoryStorage::with_entries(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_round_trip() {
        for v in [true, false] {
            let storage = InMemoryStorage::new();
            block_on(SettingsAccessor::new(storage.clone()).save(v)).unwrap();

            // Fresh activation
            let loaded = block_on(SettingsAccessor::new(storage.clone()).load());
            assert_eq!(loaded.enable_feature, v);
            assert_eq!(loaded.source, LoadSource::Stored);
        }
    }

    #[test]
    fn test_absent_key_defaults_without_writing() {
        let storage = InMemoryStorage::new();
        let loaded = block_on(SettingsAccessor::new(storage.clone()).load());

        assert!(loaded.enable_feature);
        assert_eq!(loaded.source, LoadSource::Unset);
        assert_eq!(storage.write_count(), 0);
        assert!(storage.entries().is_empty());
    }

    #[test]
    fn test_each_activation_reads_storage_once() {
        let storage = storage_with(json!({ "enableFeature": false }));

        for activation in 1..=3 {
            let loaded = block_on(SettingsAccessor::new(storage.clone()).load());
            assert!(!loaded.enable_feature);
            assert_eq!(storage.read_count(), activation);
        }
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_read_failure_defaults() {
        let storage = storage_with(json!({ "enableFeature": false }));
        storage.fail_reads("storage disabled");

        let loaded = block_on(SettingsAccessor::new(storage.clone()).load());
        assert!(loaded.enable_feature);
        assert_eq!(loaded.source, LoadSource::ReadFailed);
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_read_asks_only_for_its_key() {
        let storage = storage_with(json!({ "enableFeature": false, "other": 1 }));
        let settings = block_on(SettingsAccessor::new(storage).read()).unwrap();
        assert_eq!(settings, Settings::with_enable_feature(false));
    }

    #[test]
    fn test_each_toggle_writes_once() {
        let storage = InMemoryStorage::new();
        let accessor = SettingsAccessor::new(storage.clone());
        let mut state = ToggleState::new(false);

        block_on(accessor.toggle(&mut state, true));
        block_on(accessor.toggle(&mut state, false));

        let writes: Vec<Value> = storage.write_calls().into_iter().map(Value::Object).collect();
        assert_eq!(
            writes,
            vec![json!({ "enableFeature": true }), json!({ "enableFeature": false })]
        );
        assert!(!state.checked);
        assert_eq!(state.status, SaveStatus::Saved);
    }

    #[test]
    fn test_failed_save_keeps_user_choice_visible() {
        let storage = storage_with(json!({ "enableFeature": true }));
        storage.fail_writes("QUOTA_BYTES_PER_ITEM quota exceeded");
        let accessor = SettingsAccessor::new(storage.clone());
        let mut state = ToggleState::new(true);

        block_on(accessor.toggle(&mut state, false));

        assert!(!state.checked);
        assert!(matches!(state.status, SaveStatus::Failed(_)));
        assert!(state.status_text().unwrap().starts_with("Could not save"));
        assert_eq!(storage.entries().get("enableFeature"), Some(&json!(true)));
    }

    #[test]
    fn test_stale_save_results_are_dropped() {
        let mut state = ToggleState::new(false);
        let first = state.begin_toggle(true);
        let second = state.begin_toggle(false);

        state.finish_save(first, &Err(StorageError::backend("late failure")));
        assert_eq!(state.status, SaveStatus::Saving);

        state.finish_save(second, &Ok(()));
        assert_eq!(state.status, SaveStatus::Saved);
        assert!(!state.checked);
    }

    #[test]
    fn test_clear_saved_only_clears_current_success() {
        let mut state = ToggleState::new(true);
        let generation = state.begin_toggle(false);
        state.finish_save(generation, &Ok(()));

        state.clear_saved(generation - 1);
        assert_eq!(state.status, SaveStatus::Saved);
        state.clear_saved(generation);
        assert_eq!(state.status, SaveStatus::Idle);
        assert_eq!(state.status_text(), None);

        let generation = state.begin_toggle(true);
        state.finish_save(generation, &Err(StorageError::Unavailable));
        state.clear_saved(generation);
        assert!(matches!(state.status, SaveStatus::Failed(_)));
    }
}
