// Chrome extension API bindings
// Thin wasm-bindgen externs; everything that decides anything lives in the core modules

use wasm_bindgen::prelude::*;

use crate::config::StorageArea;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = get, catch)]
    fn sync_get(keys: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "sync"], js_name = set, catch)]
    fn sync_set(items: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = get, catch)]
    fn local_get(keys: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], js_name = set, catch)]
    fn local_set(items: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    fn runtime_get_url(path: &str) -> String;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = create, catch)]
    fn tabs_create(properties: JsValue) -> Result<js_sys::Promise, JsValue>;
}

pub fn storage_get(area: StorageArea, keys: JsValue) -> Result<js_sys::Promise, JsValue> {
    match area {
        StorageArea::Sync => sync_get(keys),
        StorageArea::Local => local_get(keys),
    }
}

pub fn storage_set(area: StorageArea, items: JsValue) -> Result<js_sys::Promise, JsValue> {
    match area {
        StorageArea::Sync => sync_set(items),
        StorageArea::Local => local_set(items),
    }
}

/// Walk `globalThis.chrome.storage.<area>` without throwing
pub fn storage_available(area: StorageArea) -> bool {
    ["chrome", "storage", area.as_str()]
        .iter()
        .try_fold(JsValue::from(js_sys::global()), |object, key| {
            js_sys::Reflect::get(&object, &JsValue::from_str(key))
                .ok()
                .filter(|value| !value.is_undefined() && !value.is_null())
        })
        .is_some()
}

/// Open an extension page (e.g. `options.html`) in a new tab
pub async fn open_extension_page(path: &str) -> Result<(), JsValue> {
    let properties = js_sys::Object::new();
    js_sys::Reflect::set(
        &properties,
        &"url".into(),
        &runtime_get_url(path).into(),
    )?;

    wasm_bindgen_futures::JsFuture::from(tabs_create(properties.into())?).await?;
    Ok(())
}

/// Convert a JS value to JSON through `JSON.stringify`
pub fn to_json(value: &JsValue) -> Option<serde_json::Value> {
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
}

pub fn from_json<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}
