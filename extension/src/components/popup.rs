use dioxus::prelude::*;

use crate::chrome;

#[component]
pub fn Popup(options_page: String) -> Element {
    rsx! {
        div { class: "w-64 p-4 bg-white",
            h1 { class: "text-lg font-bold text-gray-900 mb-4", "MV3 Starter" }

            button {
                class: "w-full bg-blue-600 text-white py-2 px-4 rounded-lg hover:bg-blue-700 transition",
                onclick: move |_| {
                    let page = options_page.clone();
                    spawn(async move {
                        if let Err(e) = chrome::open_extension_page(&page).await {
                            log::error!("Failed to open {}: {:?}", page, e);
                        }
                    });
                },
                "Open options"
            }
        }
    }
}
