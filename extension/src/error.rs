// Storage error taxonomy
// Every chrome.storage failure is mapped into one of these before it reaches the core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// No `chrome.storage` in this JS context (plain web page, test harness)
    #[error("chrome.storage is not available in this context")]
    Unavailable,

    /// The host rejected the call (quota exceeded, storage disabled, ...)
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("value could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StorageError {
    pub fn backend(msg: impl Into<String>) -> Self {
        StorageError::Backend(msg.into())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for StorageError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        // chrome.runtime.lastError arrives as an Error object with a `message` field
        let message = js_sys::Reflect::get(&value, &"message".into())
            .ok()
            .and_then(|m| m.as_string())
            .or_else(|| value.as_string())
            .unwrap_or_else(|| format!("{:?}", value));
        StorageError::Backend(message)
    }
}
