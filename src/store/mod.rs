mod migrate;
pub mod query;

use crate::error::{NoteError, NoteResult};
use crate::models::{Category, Note, NoteBody, NotePatch};
use crate::storage::{PersistenceGateway, NOTES_KEY};
use crate::util::{new_id, new_share_token};
use leptos::logging::{error, log, warn};
use serde_json::Value;

/// Authoritative note collection.
///
/// Every mutation is applied in memory first and then written through the
/// gateway. A failed write keeps the in-memory change and is reported via
/// [`NoteStore::persist_error`] until the next successful write.
///
/// Stored records that cannot be read as notes are kept verbatim and
/// written back after the notes on every persist.
pub struct NoteStore {
    notes: Vec<Note>,
    unreadable: Vec<Value>,
    gateway: PersistenceGateway,
    share_base_url: String,
    persist_error: Option<NoteError>,
}

impl NoteStore {
    pub fn new(gateway: PersistenceGateway, share_base_url: &str) -> Self {
        Self {
            notes: Vec::new(),
            unreadable: Vec::new(),
            gateway,
            share_base_url: share_base_url.to_string(),
            persist_error: None,
        }
    }

    /// Loads `notes`, applying the legacy `archived` migration once.
    ///
    /// Nothing stored is ever discarded: a record that does not parse (or a
    /// duplicate id) is set aside, and a `notes` value that is not a JSON
    /// array is kept whole as a single set-aside record.
    pub fn load(gateway: PersistenceGateway, share_base_url: &str) -> Self {
        let mut store = Self::new(gateway, share_base_url);

        let mut records = match store.gateway.load_raw(NOTES_KEY) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(items)) => items,
                Ok(other) => {
                    warn!("`{NOTES_KEY}` is not a list; keeping it aside");
                    store.unreadable.push(other);
                    Vec::new()
                }
                Err(e) => {
                    warn!("`{NOTES_KEY}` is not valid JSON ({e}); keeping it aside");
                    store.unreadable.push(Value::String(raw));
                    Vec::new()
                }
            },
        };
        let migrated = migrate::migrate_archived_to_shared(&mut records);

        for record in records {
            match serde_json::from_value::<Note>(record.clone()) {
                Ok(note) if store.contains(&note.id) => {
                    warn!("duplicate note id {}; keeping the record aside", note.id);
                    store.unreadable.push(record);
                }
                Ok(note) => store.notes.push(note),
                Err(e) => {
                    warn!("unreadable note record ({e}); keeping it aside");
                    store.unreadable.push(record);
                }
            }
        }

        log!(
            "loaded {} notes ({} set aside)",
            store.notes.len(),
            store.unreadable.len()
        );

        if migrated {
            log!("migrated legacy archived flags to shared");
            store.persist();
        }

        store
    }

    fn records(&self) -> NoteResult<Vec<Value>> {
        let mut out = self
            .notes
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NoteError::persistence(NOTES_KEY, e))?;
        out.extend(self.unreadable.iter().cloned());
        Ok(out)
    }

    fn persist(&mut self) {
        let result = self
            .records()
            .and_then(|records| self.gateway.save_json(NOTES_KEY, &records));
        match result {
            Ok(()) => self.persist_error = None,
            Err(e) => {
                error!("failed to persist notes: {e}");
                self.persist_error = Some(e);
            }
        }
    }

    /// Stored records that could not be read and are carried along untouched.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    /// The last write failure, cleared by the next successful write.
    pub fn persist_error(&self) -> Option<&NoteError> {
        self.persist_error.as_ref()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: &str) -> NoteResult<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| NoteError::not_found(id))
    }

    fn fresh_id(&self, now_ms: i64) -> String {
        loop {
            let id = new_id(now_ms);
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// New notes go to the front of the collection.
    pub fn create(&mut self, title: &str, body: NoteBody, color: &str, now_ms: i64) -> Note {
        let note = Note {
            id: self.fresh_id(now_ms),
            title: title.to_string(),
            is_reminder: body.has_checklist(),
            body,
            color: color.to_string(),
            pinned: false,
            shared: false,
            share_link: None,
            trashed: false,
            last_modified: now_ms,
            timestamp: now_ms,
        };

        self.notes.insert(0, note.clone());
        self.persist();
        note
    }

    /// Merges `patch` into the stored note, re-deriving `is_reminder` and
    /// refreshing both timestamps.
    pub fn update(&mut self, id: &str, patch: NotePatch, now_ms: i64) -> NoteResult<Note> {
        let idx = self.position(id)?;

        let mut note = self.notes[idx].clone();
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(body) = patch.body {
            note.body = body;
        }
        if let Some(color) = patch.color {
            note.color = color;
        }
        note.is_reminder = note.body.has_checklist();
        note.last_modified = now_ms;
        note.timestamp = now_ms;

        self.notes[idx] = note.clone();
        self.persist();
        Ok(note)
    }

    fn modify(&mut self, id: &str, f: impl FnOnce(&mut Note)) -> NoteResult<Note> {
        let idx = self.position(id)?;
        f(&mut self.notes[idx]);
        let note = self.notes[idx].clone();
        self.persist();
        Ok(note)
    }

    /// Soft delete.
    pub fn trash(&mut self, id: &str) -> NoteResult<Note> {
        self.modify(id, |n| n.trashed = true)
    }

    /// Permanent removal of a single note.
    pub fn purge(&mut self, id: &str) -> NoteResult<Note> {
        let idx = self.position(id)?;
        let note = self.notes.remove(idx);
        self.persist();
        Ok(note)
    }

    /// Delete as requested from a category view: purges from Trash, trashes elsewhere.
    pub fn soft_delete(&mut self, id: &str, view: Category) -> NoteResult<()> {
        if view == Category::Trash {
            self.purge(id).map(|_| ())
        } else {
            self.trash(id).map(|_| ())
        }
    }

    pub fn toggle_pin(&mut self, id: &str) -> NoteResult<Note> {
        self.modify(id, |n| n.pinned = !n.pinned)
    }

    /// Marks the note shared. The link is generated once and then reused.
    pub fn generate_share_link(&mut self, id: &str, now_ms: i64) -> NoteResult<String> {
        let idx = self.position(id)?;

        if let Some(link) = self.notes[idx].share_link.clone() {
            if !self.notes[idx].shared {
                self.notes[idx].shared = true;
                self.persist();
            }
            return Ok(link);
        }

        let link = format!(
            "{}?note={}&share={}",
            self.share_base_url,
            urlencoding::encode(id),
            new_share_token(now_ms)
        );
        let note = &mut self.notes[idx];
        note.share_link = Some(link.clone());
        note.shared = true;
        self.persist();
        Ok(link)
    }

    /// Flips `shared`; the share link is kept so re-sharing reuses it.
    pub fn toggle_shared(&mut self, id: &str, now_ms: i64) -> NoteResult<Note> {
        let idx = self.position(id)?;
        if self.notes[idx].shared {
            self.modify(id, |n| n.shared = false)
        } else {
            self.generate_share_link(id, now_ms)?;
            Ok(self.notes[idx].clone())
        }
    }

    /// Permanently removes every trashed note. Returns how many were removed.
    pub fn empty_trash(&mut self) -> usize {
        let before = self.notes.len();
        self.notes.retain(|n| !n.trashed);
        let removed = before - self.notes.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Un-trashes every trashed note. Returns how many were recovered.
    pub fn recover_all(&mut self) -> usize {
        let mut recovered = 0;
        for n in self.notes.iter_mut().filter(|n| n.trashed) {
            n.trashed = false;
            recovered += 1;
        }
        if recovered > 0 {
            self.persist();
        }
        recovered
    }

    pub fn query(&self, category: Category, search_term: Option<&str>) -> Vec<Note> {
        query::query(&self.notes, category, search_term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStorage};
    use std::collections::HashSet;
    use std::rc::Rc;

    fn store_with(mem: MemoryStorage) -> (Rc<MemoryStorage>, NoteStore) {
        let mem = Rc::new(mem);
        let store = NoteStore::load(PersistenceGateway::new(mem.clone()), "natepad://local/");
        (mem, store)
    }

    fn empty_store() -> (Rc<MemoryStorage>, NoteStore) {
        store_with(MemoryStorage::new())
    }

    fn persisted(mem: &MemoryStorage) -> Vec<Note> {
        serde_json::from_str(&mem.load(NOTES_KEY).expect("notes should be persisted"))
            .expect("persisted notes should parse")
    }

    #[test]
    fn test_create_sets_defaults_and_persists() {
        let (mem, mut store) = empty_store();
        let n = store.create("Title", NoteBody::text("hello"), "#ffffff", 100);

        assert!(!n.pinned && !n.shared && !n.trashed && !n.is_reminder);
        assert_eq!(n.share_link, None);
        assert_eq!(n.timestamp, 100);
        assert_eq!(n.last_modified, 100);
        assert_eq!(persisted(&mem), vec![n]);
    }

    #[test]
    fn test_create_with_checklist_is_reminder() {
        let (_, mut store) = empty_store();
        let n = store.create("Groceries", NoteBody::parse_markup("- [ ] milk"), "#fff", 1);
        assert!(n.is_reminder);
    }

    #[test]
    fn test_update_merges_and_rederives_reminder() {
        let (mem, mut store) = empty_store();
        let n = store.create("t", NoteBody::parse_markup("- [ ] a"), "#fff", 1);
        store.toggle_pin(&n.id).expect("pin");

        let updated = store
            .update(
                &n.id,
                NotePatch {
                    body: Some(NoteBody::text("plain")),
                    ..Default::default()
                },
                50,
            )
            .expect("update");

        assert_eq!(updated.title, "t");
        assert_eq!(updated.color, "#fff");
        assert!(updated.pinned);
        assert!(!updated.is_reminder);
        assert_eq!(updated.last_modified, 50);
        assert_eq!(updated.timestamp, 50);
        assert_eq!(persisted(&mem)[0], updated);
    }

    #[test]
    fn test_update_unknown_id_is_not_found_and_changes_nothing() {
        let (mem, mut store) = empty_store();
        store.create("a", NoteBody::default(), "#fff", 1);
        let before = persisted(&mem);

        let err = store
            .update("missing", NotePatch::default(), 2)
            .expect_err("should fail");
        assert_eq!(err.kind, crate::error::NoteErrorKind::NotFound);
        assert_eq!(store.notes(), before.as_slice());
        assert_eq!(persisted(&mem), before);
    }

    #[test]
    fn test_ids_stay_unique_across_mutations() {
        let (_, mut store) = empty_store();
        let mut ids = Vec::new();
        for i in 0..50 {
            let n = store.create(&format!("n{i}"), NoteBody::default(), "#fff", 7);
            ids.push(n.id);
        }
        store.trash(&ids[3]).expect("trash");
        store.purge(&ids[4]).expect("purge");
        store
            .update(&ids[5], NotePatch::default(), 8)
            .expect("update");
        store.create("late", NoteBody::default(), "#fff", 7);

        let unique: HashSet<&str> = store.notes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(unique.len(), store.notes().len());
        assert_eq!(store.notes().len(), 50);
    }

    #[test]
    fn test_soft_delete_depends_on_view() {
        let (_, mut store) = empty_store();
        let n = store.create("a", NoteBody::default(), "#fff", 1);

        store.soft_delete(&n.id, Category::Notes).expect("trash");
        assert!(store.get(&n.id).expect("still there").trashed);

        store.soft_delete(&n.id, Category::Trash).expect("purge");
        assert!(store.get(&n.id).is_none());

        let err = store
            .soft_delete(&n.id, Category::Trash)
            .expect_err("already gone");
        assert_eq!(err.kind, crate::error::NoteErrorKind::NotFound);
    }

    #[test]
    fn test_share_link_is_generated_once() {
        let (_, mut store) = empty_store();
        let n = store.create("a", NoteBody::default(), "#fff", 1);

        let first = store.generate_share_link(&n.id, 10).expect("share");
        let second = store.generate_share_link(&n.id, 20).expect("share again");
        assert_eq!(first, second);
        assert!(first.starts_with(&format!("natepad://local/?note={}&share=", n.id)));
        assert!(store.get(&n.id).expect("note").shared);
    }

    #[test]
    fn test_toggle_shared_keeps_link() {
        let (_, mut store) = empty_store();
        let n = store.create("a", NoteBody::default(), "#fff", 1);

        let on = store.toggle_shared(&n.id, 5).expect("on");
        let link = on.share_link.clone().expect("link");
        let off = store.toggle_shared(&n.id, 6).expect("off");
        assert!(!off.shared);
        assert_eq!(off.share_link.as_deref(), Some(link.as_str()));
        let again = store.toggle_shared(&n.id, 7).expect("on again");
        assert!(again.shared);
        assert_eq!(again.share_link, Some(link));
    }

    #[test]
    fn test_empty_trash_keeps_active_notes() {
        let (mem, mut store) = empty_store();
        let mut active = Vec::new();
        for i in 0..5 {
            let n = store.create(&format!("n{i}"), NoteBody::default(), "#fff", i);
            if i < 3 {
                store.trash(&n.id).expect("trash");
            } else {
                active.push(n.id);
            }
        }

        assert_eq!(store.empty_trash(), 3);
        let mut left: Vec<String> = store.notes().iter().map(|n| n.id.clone()).collect();
        left.sort();
        active.sort();
        assert_eq!(left, active);
        assert_eq!(persisted(&mem).len(), 2);
    }

    #[test]
    fn test_recover_all_only_touches_trashed_flag() {
        let (_, mut store) = empty_store();
        for i in 0..3 {
            let n = store.create(&format!("n{i}"), NoteBody::parse_markup("- [ ] x"), "#abc", i);
            store.toggle_pin(&n.id).expect("pin");
            store.generate_share_link(&n.id, 9).expect("share");
            store.trash(&n.id).expect("trash");
        }
        let before: Vec<Note> = store.notes().to_vec();

        assert_eq!(store.recover_all(), 3);
        for (old, new) in before.iter().zip(store.notes()) {
            let mut expected = old.clone();
            expected.trashed = false;
            assert_eq!(new, &expected);
        }
        assert_eq!(store.recover_all(), 0);
    }

    #[test]
    fn test_load_migrates_archived_and_persists() {
        let legacy = r##"[
            {"id": "1", "title": "old", "body": [], "color": "#fff", "archived": true},
            {"id": "2", "title": "other", "body": [], "color": "#fff", "archived": false},
            {"title": "no id"}
        ]"##;
        let (mem, store) = store_with(MemoryStorage::new().with_item(NOTES_KEY, legacy));

        assert_eq!(store.notes().len(), 2);
        assert!(store.get("1").expect("note 1").shared);
        assert!(!store.get("2").expect("note 2").shared);
        assert!(!mem.load(NOTES_KEY).expect("persisted").contains("archived"));
    }

    #[test]
    fn test_load_keeps_unreadable_records_through_migration() {
        let stored = r##"[
            {"id": "old", "title": "Keep me", "body": [], "timestamp": {"when": "later"}, "archived": false},
            {"id": "2", "title": "other", "body": [], "color": "#fff", "archived": true}
        ]"##;
        let (mem, mut store) = store_with(MemoryStorage::new().with_item(NOTES_KEY, stored));

        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.unreadable_count(), 1);
        let raw = mem.load(NOTES_KEY).expect("persisted");
        assert!(raw.contains("Keep me"));
        assert!(!raw.contains("archived"));

        store.create("new", NoteBody::text("x"), "#fff", 1);
        let v: Vec<Value> = serde_json::from_str(&mem.load(NOTES_KEY).expect("persisted"))
            .expect("json");
        assert_eq!(v.len(), 3);
        assert_eq!(v[2]["title"], "Keep me");
    }

    #[test]
    fn test_load_converts_notes_from_older_versions() {
        let stored = r##"[{
            "id": 1760799600000,
            "title": "From before",
            "content": "<div>hello</div>",
            "timestamp": "10/18/2026, 3:00:00 PM",
            "archived": true
        }]"##;
        let (_, store) = store_with(MemoryStorage::new().with_item(NOTES_KEY, stored));

        let n = store.get("1760799600000").expect("converted");
        assert!(n.shared);
        assert_eq!(n.body.plain_text(), "hello");
        assert_eq!(n.color, "#ffffff");
        assert_eq!(store.unreadable_count(), 0);
    }

    #[test]
    fn test_load_keeps_a_corrupt_notes_value() {
        let (mem, mut store) = store_with(MemoryStorage::new().with_item(NOTES_KEY, "{not json"));
        assert!(store.notes().is_empty());

        store.create("fresh", NoteBody::text("x"), "#fff", 1);
        let v: Vec<Value> = serde_json::from_str(&mem.load(NOTES_KEY).expect("persisted"))
            .expect("json");
        assert_eq!(v.len(), 2);
        assert_eq!(v[1], Value::String("{not json".to_string()));

        let (_, reloaded) = store_with(
            MemoryStorage::new().with_item(NOTES_KEY, &mem.load(NOTES_KEY).expect("persisted")),
        );
        assert_eq!(reloaded.notes().len(), 1);
        assert_eq!(reloaded.unreadable_count(), 1);
    }

    #[test]
    fn test_persist_failure_keeps_memory_and_clears_on_success() {
        let (mem, mut store) = empty_store();
        mem.set_fail_writes(true);
        let n = store.create("kept", NoteBody::default(), "#fff", 1);
        assert!(store.get(&n.id).is_some());
        assert!(store.persist_error().expect("error recorded").is_persistence());

        mem.set_fail_writes(false);
        store.toggle_pin(&n.id).expect("pin");
        assert!(store.persist_error().is_none());
        assert_eq!(persisted(&mem).len(), 1);
    }
}
