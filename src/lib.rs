mod app;
pub mod autosave;
mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod models;
pub mod notifications;
pub mod session;
mod state;
pub mod storage;
pub mod store;
mod util;
pub mod workspace;

pub use app::App;
pub use autosave::{AutoSaveScheduler, SaveStatus, Wakeup, WakeupKind};
pub use config::AppConfig;
pub use error::{NoteError, NoteErrorKind, NoteResult};
pub use models::{Category, Draft, Note, NoteBody, NotePatch, ViewMode};
pub use storage::{BrowserStorage, KeyValueStore, MemoryStorage, PersistenceGateway};
pub use store::NoteStore;
pub use workspace::{SaveOutcome, Workspace};

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;


// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
