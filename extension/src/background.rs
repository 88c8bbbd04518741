// Background service worker for the MV3 starter
// Minimal dependencies - no Dioxus, built with --no-default-features --target no-modules
// The generated loader registers chrome.runtime listeners synchronously at worker start
// and forwards each event here; all decisions are made in Rust

// Dummy main for binary target
fn main() {}

#[cfg(target_arch = "wasm32")]
mod worker {
    use mv3_starter::chrome;
    use mv3_starter::config::ExtensionConfig;
    use mv3_starter::lifecycle::{register_once, InstalledDetails, LifecycleHandler};
    use mv3_starter::messaging;
    use mv3_starter::services::ChromeStorage;
    use wasm_bindgen::prelude::*;

    /// Initialize background service worker.
    /// Called by the loader after instantiation; repeat calls are no-ops.
    #[wasm_bindgen]
    pub fn init_background() {
        register_once(|| {
            wasm_logger::init(wasm_logger::Config::default());
            log::info!("MV3 Starter background service initialized (Rust core)");
        });
    }

    /// Handle `chrome.runtime.onInstalled`.
    /// The returned promise resolves once the lifecycle work (and its logging) is done;
    /// it never rejects.
    #[wasm_bindgen]
    pub fn handle_installed(details: JsValue) -> js_sys::Promise {
        let details: InstalledDetails = chrome::to_json(&details)
            .and_then(|json| serde_json::from_value(json).ok())
            .unwrap_or_default();
        let area = ExtensionConfig::embedded_or_default().storage.area;

        wasm_bindgen_futures::future_to_promise(async move {
            let handler = LifecycleHandler::new(ChromeStorage::new(area));
            let outcome = handler.handle_installed(&details).await;
            log::debug!("onInstalled handled: {:?}", outcome);
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Handle `chrome.runtime.onMessage`; the result is passed to `sendResponse`
    #[wasm_bindgen]
    pub fn handle_message(message: JsValue) -> JsValue {
        let message = chrome::to_json(&message).unwrap_or_default();
        let ack = messaging::acknowledge(&message);

        chrome::from_json(&ack).unwrap_or_else(|e| {
            log::error!("Failed to encode acknowledgement: {:?}", e);
            JsValue::UNDEFINED
        })
    }
}
