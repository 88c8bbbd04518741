// Key-value storage capability
// chrome.storage.{sync,local} in the browser, an in-memory map everywhere else

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StorageError;

/// Asynchronous string-keyed storage.
///
/// Mirrors the shape of `chrome.storage.StorageArea`: `get` resolves to an
/// object holding whichever requested keys exist, `set` merges the given
/// items. Both may fail. Futures are not `Send` because the browser
/// implementation holds JS promises.
#[async_trait(?Send)]
pub trait KeyValueStore {
    /// Read `keys`, or every stored key when `keys` is `None`
    async fn get(&self, keys: Option<&[&str]>) -> Result<Map<String, Value>, StorageError>;

    /// Merge `items` into storage (last write wins per key)
    async fn set(&self, items: Map<String, Value>) -> Result<(), StorageError>;

    /// Get a human-readable description of this store
    fn description(&self) -> String;
}

/// Storage held in memory.
///
/// Clones share the same map, so a handle kept by a test (or a second
/// surface) observes every write. Every `set` call is recorded, including
/// ones that were made to fail.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    entries: Map<String, Value>,
    write_calls: Vec<Map<String, Value>>,
    read_calls: usize,
    read_failure: Option<String>,
    write_failure: Option<String>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Map<String, Value>) -> Self {
        let storage = Self::new();
        storage.inner.borrow_mut().entries = entries;
        storage
    }

    /// Make every following `get` fail with `message`
    pub fn fail_reads(&self, message: &str) {
        self.inner.borrow_mut().read_failure = Some(message.to_string());
    }

    /// Make every following `set` fail with `message`
    pub fn fail_writes(&self, message: &str) {
        self.inner.borrow_mut().write_failure = Some(message.to_string());
    }

    /// Clear injected failures
    pub fn recover(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.read_failure = None;
        inner.write_failure = None;
    }

    /// Current durable contents
    pub fn entries(&self) -> Map<String, Value> {
        self.inner.borrow().entries.clone()
    }

    /// Items passed to each `set` call, in call order
    pub fn write_calls(&self) -> Vec<Map<String, Value>> {
        self.inner.borrow().write_calls.clone()
    }

    pub fn write_count(&self) -> usize {
        self.inner.borrow().write_calls.len()
    }

    pub fn read_count(&self) -> usize {
        self.inner.borrow().read_calls
    }
}

#[async_trait(?Send)]
impl KeyValueStore for InMemoryStorage {
    async fn get(&self, keys: Option<&[&str]>) -> Result<Map<String, Value>, StorageError> {
        let mut inner = self.inner.borrow_mut();
        inner.read_calls += 1;

        if let Some(message) = &inner.read_failure {
            return Err(StorageError::backend(message.clone()));
        }

        let result = match keys {
            None => inner.entries.clone(),
            Some(keys) => keys
                .iter()
                .filter_map(|key| {
                    inner
                        .entries
                        .get(*key)
                        .map(|value| (key.to_string(), value.clone()))
                })
                .collect(),
        };

        Ok(result)
    }

    async fn set(&self, items: Map<String, Value>) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        inner.write_calls.push(items.clone());

        if let Some(message) = &inner.write_failure {
            return Err(StorageError::backend(message.clone()));
        }

        inner.entries.extend(items);
        Ok(())
    }

    fn description(&self) -> String {
        String::from("in-memory storage")
    }
}

#[cfg(target_arch = "wasm32")]
pub use chrome_storage::ChromeStorage;

#[cfg(target_arch = "wasm32")]
mod chrome_storage {
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;

    use super::KeyValueStore;
    use crate::chrome;
    use crate::config::StorageArea;
    use crate::error::StorageError;

    /// `chrome.storage.sync` or `chrome.storage.local`
    #[derive(Clone, Copy, Debug)]
    pub struct ChromeStorage {
        area: StorageArea,
    }

    impl ChromeStorage {
        pub fn new(area: StorageArea) -> Self {
            Self { area }
        }

        fn ensure_available(&self) -> Result<(), StorageError> {
            if chrome::storage_available(self.area) {
                Ok(())
            } else {
                Err(StorageError::Unavailable)
            }
        }
    }

    #[async_trait(?Send)]
    impl KeyValueStore for ChromeStorage {
        async fn get(&self, keys: Option<&[&str]>) -> Result<Map<String, Value>, StorageError> {
            self.ensure_available()?;

            let keys = match keys {
                Some(keys) => {
                    let array = js_sys::Array::new();
                    for key in keys {
                        array.push(&JsValue::from_str(key));
                    }
                    array.into()
                }
                None => JsValue::NULL,
            };

            let promise = chrome::storage_get(self.area, keys)?;
            let result = JsFuture::from(promise).await?;

            let json = js_sys::JSON::stringify(&result)?
                .as_string()
                .unwrap_or_else(|| String::from("{}"));
            Ok(serde_json::from_str(&json)?)
        }

        async fn set(&self, items: Map<String, Value>) -> Result<(), StorageError> {
            self.ensure_available()?;

            let json = serde_json::to_string(&items)?;
            let object = js_sys::JSON::parse(&json)?;

            let promise = chrome::storage_set(self.area, object)?;
            JsFuture::from(promise).await?;
            Ok(())
        }

        fn description(&self) -> String {
            format!("chrome.storage.{}", self.area.as_str())
        }
    }
}
