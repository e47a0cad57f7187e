use crate::models::{Category, Note};

/// Notes listed under `category`: pinned first, then newest first.
/// Ties keep collection order.
pub fn filter_by_category(notes: &[Note], category: Category) -> Vec<Note> {
    let mut out: Vec<Note> = notes
        .iter()
        .filter(|n| category.matches(n))
        .cloned()
        .collect();

    // `sort_by` is stable.
    out.sort_by(|a, b| b.pinned.cmp(&a.pinned).then(b.timestamp.cmp(&a.timestamp)));
    out
}

/// Case-insensitive substring match on the title or the plain-text body.
pub fn matches_search(note: &Note, needle_lower: &str) -> bool {
    note.title.to_lowercase().contains(needle_lower)
        || note.body.plain_text().to_lowercase().contains(needle_lower)
}

/// Search across every category. Trashed notes only show up when searching
/// from the Trash view, and then nothing else does. Results keep collection order.
pub fn search(notes: &[Note], category: Category, term: &str) -> Vec<Note> {
    let needle = term.trim().to_lowercase();
    let in_trash = category == Category::Trash;

    notes
        .iter()
        .filter(|n| n.trashed == in_trash)
        .filter(|n| matches_search(n, &needle))
        .cloned()
        .collect()
}

/// A blank term means "no search".
pub fn query(notes: &[Note], category: Category, search_term: Option<&str>) -> Vec<Note> {
    match search_term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => search(notes, category, term),
        None => filter_by_category(notes, category),
    }
}
