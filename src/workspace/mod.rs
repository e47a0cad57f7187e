use crate::autosave::{AutoSaveScheduler, SaveStatus, Wakeup, WakeupKind};
use crate::config::AppConfig;
use crate::error::{NoteError, NoteErrorKind, NoteResult};
use crate::history::HistoryManager;
use crate::models::{Category, Draft, Note, NoteBody, NotificationKind, NEW_CHECKLIST_ITEM};
use crate::notifications::NotificationLog;
use crate::session::EditSession;
use crate::storage::{KeyValueStore, PersistenceGateway};
use crate::store::NoteStore;
use leptos::logging::{log, warn};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Committed; the host should deliver `indicator` to end the "saved" display.
    Saved { note: Note, indicator: Wakeup },
    /// Title and body were empty; nothing was written.
    NothingToSave,
}

/// The editing workflow: one note store, at most one edit session, its
/// history and the auto-save debounce.
///
/// Operations that need a timer return a [`Wakeup`]; the host delivers it
/// back through [`Workspace::on_wakeup`] after `delay_ms`.
pub struct Workspace {
    config: AppConfig,
    gateway: PersistenceGateway,
    store: NoteStore,
    session: Option<EditSession>,
    history: HistoryManager,
    autosave: AutoSaveScheduler,
    notifications: NotificationLog,
}

impl Workspace {
    pub fn open(config: AppConfig, backend: Rc<dyn KeyValueStore>) -> Self {
        let gateway = PersistenceGateway::new(backend);
        let store = NoteStore::load(gateway.clone(), &config.share_base_url);
        let notifications = NotificationLog::load(gateway.clone());
        let autosave = AutoSaveScheduler::new(config.autosave_delay_ms, config.saved_indicator_ms);

        Self {
            config,
            gateway,
            store,
            session: None,
            history: HistoryManager::new(),
            autosave,
            notifications,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationLog {
        &mut self.notifications
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.store.get(id)
    }

    pub fn query(&self, category: Category, search_term: Option<&str>) -> Vec<Note> {
        self.store.query(category, search_term)
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.session.as_ref().map(|s| s.draft())
    }

    pub fn status(&self) -> &SaveStatus {
        self.autosave.status()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn notify(&mut self, title: &str, message: &str, kind: NotificationKind, now_ms: i64) {
        if let Err(e) = self.notifications.add(title, message, kind, now_ms) {
            warn!("could not record notification: {e}");
        }
    }

    /// Swaps the session, dropping any unsaved draft, its history and a
    /// pending auto-save.
    fn replace_session(&mut self, session: Option<EditSession>) {
        self.autosave.cancel();
        self.autosave.mark_idle();
        self.history.clear();
        self.session = session;
    }

    pub fn start_new_note(&mut self) {
        let session = EditSession::open(None, &self.config.default_color);
        self.replace_session(Some(session));
    }

    pub fn edit_note(&mut self, id: &str) -> NoteResult<()> {
        let note = self.store.get(id).ok_or_else(|| NoteError::not_found(id))?;
        let session = EditSession::open(Some(note), &self.config.default_color);
        self.replace_session(Some(session));
        Ok(())
    }

    pub fn discard(&mut self) {
        self.replace_session(None);
    }

    fn close_session_if_editing(&mut self, id: &str) {
        let editing = self
            .session
            .as_ref()
            .and_then(|s| s.target_id())
            .is_some_and(|t| t == id);
        if editing {
            self.discard();
        }
    }

    /// Replaces the draft. Typing with no open session begins a new note.
    ///
    /// Unchanged drafts are ignored. Otherwise the prior draft is recorded
    /// for undo and the auto-save debounce restarts.
    pub fn update_draft(&mut self, draft: Draft) -> Option<Wakeup> {
        if self.session.is_none() {
            self.start_new_note();
        }
        let session = self.session.as_mut()?;
        if session.draft() == &draft {
            return None;
        }

        self.history.record_if_changed(session.draft());
        session.set_draft(draft);
        Some(self.autosave.arm())
    }

    fn edit_with(&mut self, f: impl FnOnce(&mut Draft)) -> Option<Wakeup> {
        let mut draft = self
            .draft()
            .cloned()
            .unwrap_or_else(|| Draft::blank(&self.config.default_color));
        f(&mut draft);
        self.update_draft(draft)
    }

    pub fn set_title(&mut self, title: &str) -> Option<Wakeup> {
        self.edit_with(|d| d.title = title.to_string())
    }

    pub fn set_body(&mut self, body: NoteBody) -> Option<Wakeup> {
        self.edit_with(|d| d.body = body)
    }

    pub fn set_color(&mut self, color: &str) -> Option<Wakeup> {
        self.edit_with(|d| d.color = color.to_string())
    }

    pub fn add_checklist_item(&mut self) -> Option<Wakeup> {
        self.edit_with(|d| d.body.push_checklist_item(NEW_CHECKLIST_ITEM))
    }

    /// Restores the previous draft. The restored draft is saved like any edit.
    pub fn undo(&mut self) -> Option<Wakeup> {
        let session = self.session.as_mut()?;
        let restored = self.history.undo(session.draft())?;
        session.set_draft(restored);
        Some(self.autosave.arm())
    }

    pub fn redo(&mut self) -> Option<Wakeup> {
        let session = self.session.as_mut()?;
        let restored = self.history.redo(session.draft())?;
        session.set_draft(restored);
        Some(self.autosave.arm())
    }

    /// Manual save: cancels any pending auto-save, commits, then closes the
    /// session and clears its history.
    ///
    /// An empty draft is not an error. If the write to storage fails the
    /// session stays open (now pointing at the committed note) so the user
    /// can retry.
    pub fn save(&mut self, now_ms: i64) -> NoteResult<SaveOutcome> {
        self.autosave.cancel();

        let Some(session) = self.session.as_mut() else {
            self.autosave.mark_idle();
            return Ok(SaveOutcome::NothingToSave);
        };

        let note = match session.commit(&mut self.store, now_ms) {
            Ok(note) => note,
            Err(e) if e.kind == NoteErrorKind::EmptyDraft => {
                self.autosave.mark_idle();
                return Ok(SaveOutcome::NothingToSave);
            }
            Err(e) => {
                self.autosave.mark_failed(&e.message);
                return Err(e);
            }
        };

        if let Some(e) = self.store.persist_error().cloned() {
            self.autosave.mark_failed(&e.message);
            self.notify("Save failed", &e.message, NotificationKind::Error, now_ms);
            return Err(e);
        }

        self.history.clear();
        self.session = None;
        let indicator = self.autosave.mark_saved(now_ms);
        Ok(SaveOutcome::Saved { note, indicator })
    }

    /// Delivers a timer. Stale wakeups are ignored. May return a follow-up
    /// wakeup (the end of the "saved" display).
    pub fn on_wakeup(&mut self, wakeup: Wakeup, now_ms: i64) -> Option<Wakeup> {
        match wakeup.kind {
            WakeupKind::AutoSave => self.run_autosave(wakeup, now_ms),
            WakeupKind::ResetIndicator => {
                self.autosave.reset_indicator(wakeup.ticket);
                None
            }
        }
    }

    fn run_autosave(&mut self, wakeup: Wakeup, now_ms: i64) -> Option<Wakeup> {
        if !self.autosave.take_autosave(wakeup.ticket) {
            return None;
        }

        let Some(session) = self.session.as_mut() else {
            self.autosave.mark_idle();
            return None;
        };
        if session.draft().is_empty() {
            log!("auto-save skipped: empty draft");
            self.autosave.mark_idle();
            return None;
        }

        match session.commit(&mut self.store, now_ms) {
            Ok(note) => {
                if let Some(e) = self.store.persist_error() {
                    let message = e.message.clone();
                    self.autosave.mark_failed(&message);
                    return None;
                }
                log!("auto-saved note {}", note.id);
                Some(self.autosave.mark_saved(now_ms))
            }
            Err(e) => {
                warn!("auto-save failed: {e}");
                self.autosave.mark_failed(&e.message);
                None
            }
        }
    }

    /// Delete as requested from `view` (purge in Trash, trash elsewhere).
    /// Deleting the note under edit closes the editor.
    pub fn delete(&mut self, id: &str, view: Category) -> NoteResult<()> {
        self.store.soft_delete(id, view)?;
        self.close_session_if_editing(id);
        Ok(())
    }

    pub fn toggle_pin(&mut self, id: &str) -> NoteResult<Note> {
        self.store.toggle_pin(id)
    }

    /// Shares the note, generating its link on first use.
    pub fn share(&mut self, id: &str, now_ms: i64) -> NoteResult<Note> {
        let had_link = self
            .store
            .get(id)
            .ok_or_else(|| NoteError::not_found(id))?
            .share_link
            .is_some();

        self.store.generate_share_link(id, now_ms)?;
        let note = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| NoteError::not_found(id))?;

        if !had_link {
            let title = if note.title.is_empty() { "Untitled" } else { note.title.as_str() };
            let message = format!("\"{title}\" now has a share link");
            self.notify("Note shared", &message, NotificationKind::Success, now_ms);
        }
        Ok(note)
    }

    /// Flips `shared`. A link is generated the first time a note is shared
    /// and kept when it is unshared.
    pub fn toggle_shared(&mut self, id: &str, now_ms: i64) -> NoteResult<Note> {
        self.store.toggle_shared(id, now_ms)
    }

    /// Permanently deletes all trashed notes. Callers confirm with the user first.
    pub fn empty_trash(&mut self, now_ms: i64) -> usize {
        if let Some(id) = self.session.as_ref().and_then(|s| s.target_id()) {
            if self.store.get(id).is_some_and(|n| n.trashed) {
                self.discard();
            }
        }

        let removed = self.store.empty_trash();
        log!("emptied trash: {removed} notes removed");
        if removed > 0 {
            let message = format!("{removed} notes permanently deleted");
            self.notify("Trash emptied", &message, NotificationKind::Info, now_ms);
        }
        removed
    }

    pub fn recover_all(&mut self, now_ms: i64) -> usize {
        let recovered = self.store.recover_all();
        log!("recovered {recovered} notes from trash");
        if recovered > 0 {
            let message = format!("{recovered} notes restored from trash");
            self.notify("Notes recovered", &message, NotificationKind::Success, now_ms);
        }
        recovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn workspace() -> (Rc<MemoryStorage>, Workspace) {
        let mem = Rc::new(MemoryStorage::new());
        let ws = Workspace::open(AppConfig::defaults(), mem.clone());
        (mem, ws)
    }

    fn draft(title: &str, markup: &str) -> Draft {
        Draft {
            title: title.to_string(),
            body: NoteBody::parse_markup(markup),
            color: "#ffffff".to_string(),
        }
    }

    fn expect_saved(outcome: SaveOutcome) -> (Note, Wakeup) {
        match outcome {
            SaveOutcome::Saved { note, indicator } => (note, indicator),
            SaveOutcome::NothingToSave => panic!("expected a save"),
        }
    }

    #[test]
    fn test_autosave_commits_after_debounce_and_keeps_history() {
        let (_, mut ws) = workspace();
        ws.start_new_note();
        ws.set_title("Hello");
        let w = ws.set_body(NoteBody::text("world")).expect("armed");
        assert_eq!(w.delay_ms, 2000);
        assert_eq!(ws.status(), &SaveStatus::Saving);

        let indicator = ws.on_wakeup(w, 5_000).expect("indicator");
        assert_eq!(ws.status(), &SaveStatus::Saved { at_ms: 5_000 });
        assert_eq!(ws.store().notes().len(), 1);
        assert!(ws.can_undo());
        assert!(ws.session().is_some());

        assert_eq!(indicator.kind, WakeupKind::ResetIndicator);
        assert_eq!(indicator.delay_ms, 3000);
        assert_eq!(ws.on_wakeup(indicator, 8_000), None);
        assert_eq!(ws.status(), &SaveStatus::Idle);
    }

    #[test]
    fn test_autosave_never_creates_empty_note() {
        let (_, mut ws) = workspace();
        ws.start_new_note();
        let w = ws.set_title("x").expect("armed");
        let w2 = ws.set_title("").expect("re-armed");

        assert_eq!(ws.on_wakeup(w, 10_000), None);
        assert_eq!(ws.on_wakeup(w2, 10_000), None);
        assert!(ws.store().notes().is_empty());
        assert_eq!(ws.status(), &SaveStatus::Idle);
    }

    #[test]
    fn test_superseded_autosave_does_not_commit() {
        let (_, mut ws) = workspace();
        let stale = ws.set_title("a").expect("armed");
        let current = ws.set_title("ab").expect("re-armed");

        assert_eq!(ws.on_wakeup(stale, 1), None);
        assert!(ws.store().notes().is_empty());

        ws.on_wakeup(current, 2).expect("saved");
        assert_eq!(ws.store().notes()[0].title, "ab");
    }

    #[test]
    fn test_new_note_autosaves_once_then_updates() {
        let (_, mut ws) = workspace();
        let w = ws.set_title("one").expect("armed");
        ws.on_wakeup(w, 1);
        let w = ws.set_title("two").expect("armed");
        ws.on_wakeup(w, 2);

        assert_eq!(ws.store().notes().len(), 1);
        assert_eq!(ws.store().notes()[0].title, "two");
    }

    #[test]
    fn test_manual_save_cancels_pending_autosave() {
        let (_, mut ws) = workspace();
        ws.start_new_note();
        let pending = ws.set_title("draft").expect("armed");

        let (note, _) = expect_saved(ws.save(10).expect("save"));
        assert!(ws.session().is_none());
        assert!(!ws.can_undo() && !ws.can_redo());

        // Late delivery of the cancelled timer must not write anything.
        assert_eq!(ws.on_wakeup(pending, 20), None);
        assert_eq!(ws.store().notes().len(), 1);
        assert_eq!(ws.store().notes()[0], note);
    }

    #[test]
    fn test_manual_save_of_empty_draft_is_noop() {
        let (mem, mut ws) = workspace();
        ws.start_new_note();
        assert_eq!(ws.save(1).expect("no error"), SaveOutcome::NothingToSave);
        assert!(ws.store().notes().is_empty());
        assert!(crate::storage::KeyValueStore::load(mem.as_ref(), "notes").is_none());
    }

    #[test]
    fn test_undo_redo_restore_drafts_and_rearm() {
        let (_, mut ws) = workspace();
        ws.start_new_note();
        ws.update_draft(draft("1", ""));
        ws.update_draft(draft("2", ""));

        let w = ws.undo().expect("undo re-arms");
        assert_eq!(w.kind, WakeupKind::AutoSave);
        assert_eq!(ws.draft(), Some(&draft("1", "")));
        ws.redo().expect("redo re-arms");
        assert_eq!(ws.draft(), Some(&draft("2", "")));

        ws.undo();
        ws.undo();
        ws.redo();
        ws.redo();
        assert_eq!(ws.draft(), Some(&draft("2", "")));
    }

    #[test]
    fn test_undo_result_is_autosaved() {
        let (_, mut ws) = workspace();
        let w = ws.set_title("first").expect("armed");
        ws.on_wakeup(w, 1);
        ws.set_title("second");
        let w = ws.undo().expect("undo");
        ws.on_wakeup(w, 2).expect("saved");
        assert_eq!(ws.store().notes()[0].title, "first");
    }

    #[test]
    fn test_edit_after_undo_clears_redo() {
        let (_, mut ws) = workspace();
        ws.start_new_note();
        ws.update_draft(draft("1", ""));
        ws.undo();
        assert!(ws.can_redo());
        ws.update_draft(draft("2", ""));
        assert!(!ws.can_redo());
        assert_eq!(ws.redo(), None);
    }

    #[test]
    fn test_identical_draft_does_not_rearm() {
        let (_, mut ws) = workspace();
        ws.set_title("same");
        assert_eq!(ws.set_title("same"), None);
    }

    #[test]
    fn test_opening_another_note_discards_session_state() {
        let (_, mut ws) = workspace();
        let a = {
            let w = ws.set_title("a").expect("armed");
            ws.on_wakeup(w, 1);
            ws.session().and_then(|s| s.target_id()).expect("target").to_string()
        };
        ws.save(2).expect("save");
        ws.start_new_note();
        let pending = ws.set_title("unsaved").expect("armed");

        ws.edit_note(&a).expect("open");
        assert!(!ws.can_undo());
        assert_eq!(ws.draft().map(|d| d.title.as_str()), Some("a"));
        assert_eq!(ws.on_wakeup(pending, 3), None);
        assert_eq!(ws.store().notes().len(), 1);
        assert_eq!(ws.status(), &SaveStatus::Idle);
    }

    #[test]
    fn test_edit_unknown_note_is_not_found() {
        let (_, mut ws) = workspace();
        let err = ws.edit_note("nope").expect_err("missing");
        assert_eq!(err.kind, NoteErrorKind::NotFound);
    }

    #[test]
    fn test_autosave_persistence_failure_marks_failed_without_retry() {
        let (mem, mut ws) = workspace();
        mem.set_fail_writes(true);
        let w = ws.set_title("doomed").expect("armed");

        assert_eq!(ws.on_wakeup(w, 1), None);
        assert!(matches!(ws.status(), SaveStatus::Failed { .. }));
        // In memory the note is still authoritative.
        assert_eq!(ws.query(Category::Notes, None).len(), 1);

        mem.set_fail_writes(false);
        let w = ws.set_title("doomed?").expect("next edit re-arms");
        ws.on_wakeup(w, 2).expect("saved");
        assert!(matches!(ws.status(), SaveStatus::Saved { .. }));
        assert_eq!(ws.store().notes().len(), 1);
    }

    #[test]
    fn test_manual_save_failure_is_reported_and_keeps_session() {
        let (mem, mut ws) = workspace();
        ws.set_title("important");
        mem.set_fail_writes(true);

        let err = ws.save(1).expect_err("write fails");
        assert_eq!(err.kind, NoteErrorKind::Persistence);
        assert!(ws.session().is_some());
        assert!(matches!(ws.status(), SaveStatus::Failed { .. }));
        assert_eq!(ws.notifications().items()[0].title, "Save failed");

        mem.set_fail_writes(false);
        expect_saved(ws.save(2).expect("retry"));
        assert_eq!(ws.store().notes().len(), 1);
    }

    #[test]
    fn test_checklist_scenario_through_workspace() {
        let (_, mut ws) = workspace();
        ws.set_title("Groceries");
        ws.add_checklist_item();
        let (n, _) = expect_saved(ws.save(1).expect("save"));
        assert!(n.is_reminder);
        assert_eq!(ws.query(Category::Reminders, None), vec![n.clone()]);
        assert!(ws.query(Category::Notes, None).is_empty());

        ws.edit_note(&n.id).expect("open");
        ws.set_body(NoteBody::text("milk"));
        let (n, _) = expect_saved(ws.save(2).expect("save"));
        assert!(!n.is_reminder);
        assert_eq!(ws.query(Category::Notes, None), vec![n]);
    }

    #[test]
    fn test_delete_of_edited_note_closes_session() {
        let (_, mut ws) = workspace();
        ws.set_title("bye");
        let (n, _) = expect_saved(ws.save(1).expect("save"));
        ws.edit_note(&n.id).expect("open");

        ws.delete(&n.id, Category::Notes).expect("trash");
        assert!(ws.session().is_none());
        assert!(ws.note(&n.id).expect("in trash").trashed);

        ws.delete(&n.id, Category::Trash).expect("purge");
        assert!(ws.note(&n.id).is_none());
    }

    #[test]
    fn test_share_notifies_only_on_first_link() {
        let (_, mut ws) = workspace();
        ws.set_title("s");
        let (n, _) = expect_saved(ws.save(1).expect("save"));

        let first = ws.share(&n.id, 2).expect("share");
        let second = ws.share(&n.id, 3).expect("share");
        assert_eq!(first.share_link, second.share_link);
        assert_eq!(ws.notifications().items().len(), 1);
        assert_eq!(ws.query(Category::Shared, None).len(), 1);
    }

    #[test]
    fn test_empty_trash_and_recover_all_report_counts() {
        let (_, mut ws) = workspace();
        let mut ids = Vec::new();
        for i in 0..4 {
            ws.set_title(&format!("n{i}"));
            let (n, _) = expect_saved(ws.save(i).expect("save"));
            ids.push(n.id);
        }
        ws.delete(&ids[0], Category::Notes).expect("trash");
        ws.delete(&ids[1], Category::Notes).expect("trash");

        assert_eq!(ws.recover_all(10), 2);
        assert_eq!(ws.query(Category::Trash, None).len(), 0);

        ws.delete(&ids[2], Category::Notes).expect("trash");
        assert_eq!(ws.empty_trash(11), 1);
        assert_eq!(ws.store().notes().len(), 3);
        assert_eq!(ws.notifications().items().len(), 2);
        assert_eq!(ws.recover_all(12), 0);
    }

    #[test]
    fn test_reopen_reads_persisted_state() {
        let (mem, mut ws) = workspace();
        ws.set_title("persisted");
        ws.save(1).expect("save");

        let ws2 = Workspace::open(AppConfig::defaults(), mem);
        assert_eq!(ws2.query(Category::Notes, None)[0].title, "persisted");
    }
}
