use crate::error::{NoteError, NoteResult};
use crate::models::{Draft, Note, NotePatch};
use crate::store::NoteStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionTarget {
    New,
    Existing(String),
}

/// The note currently open in the editor.
///
/// The draft never reaches the store except through [`EditSession::commit`].
#[derive(Clone, Debug)]
pub struct EditSession {
    target: SessionTarget,
    draft: Draft,
}

impl EditSession {
    /// Opens `note` for editing, or a blank draft when `None`.
    pub fn open(note: Option<&Note>, default_color: &str) -> Self {
        match note {
            Some(n) => Self {
                target: SessionTarget::Existing(n.id.clone()),
                draft: n.draft(),
            },
            None => Self {
                target: SessionTarget::New,
                draft: Draft::blank(default_color),
            },
        }
    }

    pub fn target(&self) -> &SessionTarget {
        &self.target
    }

    pub fn target_id(&self) -> Option<&str> {
        match &self.target {
            SessionTarget::Existing(id) => Some(id),
            SessionTarget::New => None,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: Draft) {
        self.draft = draft;
    }

    /// Writes the draft into the store, creating the note on first commit of
    /// a new session. Afterwards the session targets the committed note.
    ///
    /// The title is stored trimmed. `pinned`, `shared`, `trashed` and
    /// `share_link` are whatever the store currently holds.
    pub fn commit(&mut self, store: &mut NoteStore, now_ms: i64) -> NoteResult<Note> {
        if self.draft.is_empty() {
            return Err(NoteError::empty_draft());
        }

        let mut draft = self.draft.clone();
        draft.title = draft.title.trim().to_string();

        let note = match &self.target {
            SessionTarget::Existing(id) => store.update(id, NotePatch::from(draft), now_ms)?,
            SessionTarget::New => store.create(&draft.title, draft.body, &draft.color, now_ms),
        };

        self.target = SessionTarget::Existing(note.id.clone());
        Ok(note)
    }
}
