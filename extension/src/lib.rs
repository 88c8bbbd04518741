// MV3 starter extension
// Core (settings, storage, lifecycle) builds natively; browser glue and UI are wasm32-only

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod messaging;
pub mod options;
pub mod services;
pub mod settings;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod chrome;

#[cfg(all(target_arch = "wasm32", feature = "ui"))]
mod components;

#[cfg(all(target_arch = "wasm32", feature = "ui"))]
pub use app::run;

#[cfg(all(target_arch = "wasm32", feature = "ui"))]
mod app {
    use dioxus::prelude::*;

    use crate::components::{OptionsPage, Popup};
    use crate::config::{ExtensionConfig, PagesConfig};
    use crate::surface::Surface;

    /// dioxus-web mounts into this element
    const MOUNT_ID: &str = "main";

    fn current_surface(pages: &PagesConfig) -> Surface {
        let path = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default();
        Surface::from_path(&path, pages)
    }

    fn mount_point_present() -> bool {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(MOUNT_ID))
            .is_some()
    }

    #[component]
    fn App() -> Element {
        let config = use_hook(ExtensionConfig::embedded_or_default);
        let surface = use_hook(|| current_surface(&config.pages));

        match surface {
            Surface::Popup => rsx! { Popup { options_page: config.pages.options.clone() } },
            Surface::Options => rsx! { OptionsPage { storage_area: config.storage.area } },
        }
    }

    #[wasm_bindgen::prelude::wasm_bindgen(start)]
    pub fn run() {
        wasm_logger::init(wasm_logger::Config::default());

        if !mount_point_present() {
            log::warn!("No #{} element on this page, UI not started", MOUNT_ID);
            return;
        }

        log::info!("MV3 Starter surface starting...");
        dioxus::launch(App);
    }
}
