#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoteErrorKind {
    /// The referenced note id is not in the store.
    NotFound,
    /// Commit attempted with an empty title and an empty body.
    EmptyDraft,
    /// The key-value store refused the write.
    Persistence,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteError {
    pub kind: NoteErrorKind,
    pub message: String,
}

impl std::fmt::Display for NoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NoteError {}

impl NoteError {
    pub fn not_found(id: &str) -> Self {
        Self {
            kind: NoteErrorKind::NotFound,
            message: format!("Note not found: {id}"),
        }
    }

    pub fn empty_draft() -> Self {
        Self {
            kind: NoteErrorKind::EmptyDraft,
            message: "Nothing to save: title and body are empty".to_string(),
        }
    }

    pub fn persistence(ctx: &str, e: impl std::fmt::Display) -> Self {
        Self {
            kind: NoteErrorKind::Persistence,
            message: format!("{ctx}: {e}"),
        }
    }

    pub fn is_persistence(&self) -> bool {
        self.kind == NoteErrorKind::Persistence
    }
}

pub type NoteResult<T> = Result<T, NoteError>;
