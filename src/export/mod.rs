//! Adapters that turn a committed note into something outside the app.

use crate::models::Note;
use crate::util::format_timestamp;

const APP_NAME: &str = "NatePad";

pub fn plain_text(note: &Note) -> String {
    format!(
        "{}\n\n{}\n\nCreated: {}",
        note.title,
        note.body.plain_text(),
        format_timestamp(note.timestamp)
    )
}

/// Title with every non-alphanumeric ASCII character replaced by `_`.
pub fn file_name(note: &Note) -> String {
    let stem: String = note
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.txt")
}

pub fn data_url(text: &str) -> String {
    format!("data:text/plain;charset=utf-8,{}", urlencoding::encode(text))
}

pub fn mailto_url(note: &Note) -> String {
    let subject = format!("Note: {}", note.title);
    let body = format!(
        "{}\n\n{}\n\nShared from {APP_NAME}",
        note.title,
        note.body.plain_text()
    );
    format!(
        "mailto:?subject={}&body={}",
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    )
}
