mod timers;

use crate::autosave::Wakeup;
use crate::config::AppConfig;
use crate::models::{Category, ViewMode};
use crate::storage::BrowserStorage;
use crate::workspace::Workspace;
use leptos::logging::warn;
use leptos::prelude::*;
use std::rc::Rc;

pub(crate) use timers::schedule;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    /// Single owner of all note data. Not `Send`, so it lives in local storage.
    pub workspace: StoredValue<Workspace, LocalStorage>,

    /// Bumped after every workspace mutation; views read through [`AppState::read`].
    pub revision: RwSignal<u64>,

    pub category: RwSignal<Category>,
    pub search_query: RwSignal<String>,
    pub view_mode: RwSignal<ViewMode>,
    pub dark_theme: RwSignal<bool>,
    pub notifications_open: RwSignal<bool>,

    /// Editor body as typed. Kept apart from the draft so the textarea is not
    /// normalized under the cursor; refreshed when the draft is replaced.
    pub body_text: RwSignal<String>,

    /// Last user-facing error (failed manual save, unknown note, ...).
    pub last_error: RwSignal<Option<String>>,
}

impl AppState {
    pub fn new() -> Self {
        let workspace = Workspace::open(AppConfig::new(), Rc::new(BrowserStorage::new()));
        let view_mode = workspace.gateway().load_view_mode();
        let dark_theme = workspace.gateway().load_dark_theme();

        Self {
            workspace: StoredValue::new_local(workspace),
            revision: RwSignal::new(0),
            category: RwSignal::new(Category::default()),
            search_query: RwSignal::new(String::new()),
            view_mode: RwSignal::new(view_mode),
            dark_theme: RwSignal::new(dark_theme),
            notifications_open: RwSignal::new(false),
            body_text: RwSignal::new(String::new()),
            last_error: RwSignal::new(None),
        }
    }

    /// Tracked read of the workspace.
    pub fn read<T>(&self, f: impl FnOnce(&Workspace) -> T) -> T {
        self.revision.track();
        self.workspace.with_value(f)
    }

    /// Mutates the workspace and notifies readers. `None` once the owner is disposed.
    pub fn update<T>(&self, f: impl FnOnce(&mut Workspace) -> T) -> Option<T> {
        let out = self.workspace.try_update_value(f);
        self.revision.update(|r| *r += 1);
        out
    }

    /// Runs an edit and arranges the timer it asks for.
    pub fn dispatch(&self, f: impl FnOnce(&mut Workspace) -> Option<Wakeup>) {
        if let Some(wakeup) = self.update(f).flatten() {
            schedule(*self, wakeup);
        }
    }

    /// Reloads the editor body after the draft was swapped wholesale
    /// (open, undo/redo, save, discard).
    pub fn sync_body_text(&self) {
        let text = self
            .workspace
            .with_value(|ws| ws.draft().map(|d| d.body.to_markup()).unwrap_or_default());
        self.body_text.set(text);
    }

    pub fn report(&self, e: impl std::fmt::Display) {
        warn!("{e}");
        self.last_error.set(Some(e.to_string()));
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.view_mode.set(mode);
        if let Err(e) = self.workspace.with_value(|ws| ws.gateway().save_view_mode(mode)) {
            warn!("could not store view preference: {e}");
        }
    }

    pub fn toggle_dark_theme(&self) {
        let dark = !self.dark_theme.get_untracked();
        self.dark_theme.set(dark);
        if let Err(e) = self.workspace.with_value(|ws| ws.gateway().save_dark_theme(dark)) {
            warn!("could not store theme preference: {e}");
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
