// Files written next to the wasm output: manifest, page shells and JS loaders
// MV3 forbids inline scripts, so every page loads an external module

use mv3_starter::config::ExtensionConfig;
use serde_json::{json, Value};

pub const SERVICE_WORKER: &str = "service-worker.js";
pub const APP_LOADER: &str = "app.js";

/// wasm-bindgen output names
pub const APP_BUNDLE: &str = "app";
pub const BACKGROUND_BUNDLE: &str = "background";

pub fn manifest(config: &ExtensionConfig) -> Value {
    json!({
        "manifest_version": 3,
        "name": config.extension.name,
        "version": config.extension.version,
        "description": config.extension.description,
        "action": {
            "default_popup": config.pages.popup,
        },
        "options_page": config.pages.options,
        "background": {
            "service_worker": SERVICE_WORKER,
        },
        "permissions": ["storage"],
        "content_security_policy": {
            "extension_pages": "script-src 'self' 'wasm-unsafe-eval'; object-src 'self'",
        },
    })
}

pub fn page_html(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
  </head>
  <body>
    <div id="main"></div>
    <script type="module" src="{loader}"></script>
  </body>
</html>
"#,
        title = title,
        loader = APP_LOADER
    )
}

pub fn app_loader() -> String {
    format!(
        r#"import init from './pkg/{bundle}.js';

init();
"#,
        bundle = APP_BUNDLE
    )
}

/// Listeners must be attached during the worker's first synchronous run,
/// before the wasm module has finished instantiating. Events are queued on
/// the `ready` promise and forwarded to the Rust exports. A failed load is
/// logged once; each listener chain still handles the rejection, and
/// messages get an error response so the channel does not stay open.
pub fn service_worker() -> String {
    format!(
        r#"importScripts('{bundle}.js');

const ready = wasm_bindgen('{bundle}_bg.wasm')
  .then(() => wasm_bindgen.init_background())
  .catch((e) => {{
    console.error('background wasm failed to load', e);
    throw e;
  }});

chrome.runtime.onInstalled.addListener((details) => {{
  ready
    .then(() => wasm_bindgen.handle_installed(details))
    .catch((e) => console.error('onInstalled not handled', e));
}});

chrome.runtime.onMessage.addListener((message, sender, sendResponse) => {{
  ready
    .then(() => sendResponse(wasm_bindgen.handle_message(message)))
    .catch((e) => {{
      console.error('onMessage not handled', e);
      sendResponse({{ status: 'error' }});
    }});
  return true;
}});
"#,
        bundle = BACKGROUND_BUNDLE
    )
}
