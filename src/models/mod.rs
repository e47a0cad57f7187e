mod body;
mod legacy;

pub use body::{Block, ChecklistItem, NoteBody};
pub(crate) use body::NEW_CHECKLIST_ITEM;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(deserialize_with = "legacy::id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "content", deserialize_with = "legacy::body")]
    pub body: NoteBody,
    #[serde(default = "legacy::default_color")]
    pub color: String,
    #[serde(default)]
    pub pinned: bool,
    /// Derived from `body` on every committed save.
    #[serde(default)]
    pub is_reminder: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub share_link: Option<String>,
    #[serde(default)]
    pub trashed: bool,
    /// Last committed save (manual or auto), epoch ms.
    #[serde(default, deserialize_with = "legacy::millis")]
    pub last_modified: i64,
    /// Display timestamp and secondary sort key, epoch ms.
    #[serde(default, deserialize_with = "legacy::millis")]
    pub timestamp: i64,
}

impl Note {
    pub fn draft(&self) -> Draft {
        Draft {
            title: self.title.clone(),
            body: self.body.clone(),
            color: self.color.clone(),
        }
    }
}

/// Fields replaced by `NoteStore::update`; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<NoteBody>,
    pub color: Option<String>,
}

impl From<Draft> for NotePatch {
    fn from(d: Draft) -> Self {
        Self {
            title: Some(d.title),
            body: Some(d.body),
            color: Some(d.color),
        }
    }
}

/// Working copy of title/body/color; also the unit stored by undo/redo.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub body: NoteBody,
    pub color: String,
}

impl Draft {
    pub fn blank(color: &str) -> Self {
        Self {
            title: String::new(),
            body: NoteBody::default(),
            color: color.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.body.is_empty()
    }
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    #[default]
    Notes,
    Reminders,
    Shared,
    Trash,
}

impl Category {
    /// Unknown names fall back to `Notes`.
    pub fn parse_or_default(s: &str) -> Self {
        s.trim().parse().unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Notes => "Notes",
            Category::Reminders => "Reminders",
            Category::Shared => "Shared",
            Category::Trash => "Trash",
        }
    }

    /// Membership rule for the category views.
    ///
    /// Reminders and Shared overlap for notes carrying both flags.
    pub fn matches(self, note: &Note) -> bool {
        match self {
            Category::Notes => !note.is_reminder && !note.trashed && !note.shared,
            Category::Reminders => note.is_reminder && !note.trashed,
            Category::Shared => note.shared && !note.trashed,
            Category::Trash => note.trashed,
        }
    }

    /// The single category a note is filed under: Trash, then Shared, then Reminders.
    pub fn of(note: &Note) -> Self {
        if note.trashed {
            Category::Trash
        } else if note.shared {
            Category::Shared
        } else if note.is_reminder {
            Category::Reminders
        } else {
            Category::Notes
        }
    }
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    #[serde(deserialize_with = "legacy::id")]
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default, deserialize_with = "legacy::millis")]
    pub timestamp: i64,
    #[serde(default)]
    pub read: bool,
}
