pub mod storage;

pub use storage::{InMemoryStorage, KeyValueStore};

#[cfg(target_arch = "wasm32")]
pub use storage::ChromeStorage;
