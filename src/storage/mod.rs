use crate::error::{NoteError, NoteResult};
use crate::models::ViewMode;
use leptos::logging::warn;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) const NOTES_KEY: &str = "notes";
pub(crate) const NOTIFICATIONS_KEY: &str = "notifications";
pub(crate) const VIEW_KEY: &str = "view";
pub(crate) const DARK_THEME_KEY: &str = "darkTheme";

/// Durable string key-value store.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> NoteResult<()>;
}

/// `window.localStorage`.
#[derive(Clone, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl KeyValueStore for BrowserStorage {
    fn load(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) -> NoteResult<()> {
        let storage =
            Self::storage().ok_or_else(|| NoteError::persistence(key, "localStorage unavailable"))?;
        storage
            .set_item(key, value)
            .map_err(|e| NoteError::persistence(key, format!("{e:?}")))
    }
}

/// In-process store; writes can be made to fail for exercising failure paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl KeyValueStore for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> NoteResult<()> {
        if self.fail_writes.get() {
            return Err(NoteError::persistence(key, "write rejected"));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON view over a [`KeyValueStore`], shared by the note store, the
/// notification log and the preferences.
#[derive(Clone)]
pub struct PersistenceGateway {
    backend: Rc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub(crate) fn load_raw(&self, key: &str) -> Option<String> {
        self.backend.load(key)
    }

    pub(crate) fn load_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let json = self.backend.load(key)?;
        match serde_json::from_str(&json) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("ignoring unreadable `{key}` record: {e}");
                None
            }
        }
    }

    pub(crate) fn save_json<T: Serialize>(&self, key: &str, value: &T) -> NoteResult<()> {
        let json = serde_json::to_string(value).map_err(|e| NoteError::persistence(key, e))?;
        self.backend.save(key, &json)
    }

    pub fn load_view_mode(&self) -> ViewMode {
        self.backend
            .load(VIEW_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn save_view_mode(&self, mode: ViewMode) -> NoteResult<()> {
        self.backend.save(VIEW_KEY, mode.as_ref())
    }

    pub fn load_dark_theme(&self) -> bool {
        self.backend
            .load(DARK_THEME_KEY)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }

    pub fn save_dark_theme(&self, dark: bool) -> NoteResult<()> {
        self.backend
            .save(DARK_THEME_KEY, if dark { "true" } else { "false" })
    }
}
