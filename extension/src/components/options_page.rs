use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::config::StorageArea;
use crate::options::{SaveStatus, SettingsAccessor, ToggleState};
use crate::services::ChromeStorage;
use crate::settings::DEFAULT_ENABLE_FEATURE;

/// How long the "Saved" notice stays up
const SAVED_NOTICE_MS: u32 = 1500;

#[component]
pub fn OptionsPage(storage_area: StorageArea) -> Element {
    let mut state = use_signal(|| ToggleState::new(DEFAULT_ENABLE_FEATURE));
    let mut loaded = use_signal(|| false);

    // Re-read storage on every activation, nothing is cached between page loads
    use_effect(move || {
        spawn(async move {
            let accessor = SettingsAccessor::new(ChromeStorage::new(storage_area));
            let settings = accessor.load().await;
            log::info!("Options loaded: {:?}", settings);
            state.set(ToggleState::loaded(&settings));
            loaded.set(true);
        });
    });

    let current = state.read().clone();
    let failed = matches!(current.status, SaveStatus::Failed(_));
    let status_text = current.status_text().unwrap_or_default();

    rsx! {
        div { class: "max-w-md mx-auto mt-10 p-6 bg-white rounded-lg shadow-lg",
            h1 { class: "text-2xl font-bold text-gray-900 mb-6", "Options" }

            label { class: "flex items-center space-x-3",
                input {
                    id: "enableFeature",
                    r#type: "checkbox",
                    checked: current.checked,
                    disabled: !loaded(),
                    onchange: move |e: Event<FormData>| {
                        let checked = e.value() == "true";
                        // Optimistic: the control keeps this value whatever the write does
                        let generation = state.write().begin_toggle(checked);
                        spawn(async move {
                            let accessor = SettingsAccessor::new(ChromeStorage::new(storage_area));
                            let result = accessor.save(checked).await;
                            state.write().finish_save(generation, &result);

                            if result.is_ok() {
                                TimeoutFuture::new(SAVED_NOTICE_MS).await;
                                state.write().clear_saved(generation);
                            }
                        });
                    }
                }
                span { class: "text-gray-700", "Enable feature" }
            }

            p {
                class: if failed { "mt-4 text-sm text-red-600" } else { "mt-4 text-sm text-gray-500" },
                "{status_text}"
            }
        }
    }
}
