//! Lenient field readers for records written by older versions of the app:
//! numeric ids, HTML `content` instead of `body`, and display-string
//! timestamps.

use super::NoteBody;
use crate::config::DEFAULT_COLOR;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BodyRepr {
    Blocks(NoteBody),
    Html(String),
}

pub(crate) fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Ids were once `Date.now()` numbers.
pub(crate) fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(d)? {
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(f) => format!("{f}"),
        Scalar::Text(s) => s,
    })
}

/// Epoch milliseconds, a numeric string, or RFC 3339. Anything else
/// (locale-formatted dates, null) reads as 0.
pub(crate) fn millis<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        None => 0,
        Some(Scalar::Int(n)) => n,
        Some(Scalar::Float(f)) if f.is_finite() => f as i64,
        Some(Scalar::Float(_)) => 0,
        Some(Scalar::Text(s)) => parse_millis_text(&s),
    })
}

fn parse_millis_text(s: &str) -> i64 {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return n;
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|d| d.timestamp_millis())
        .unwrap_or(0)
}

/// Block list, or the HTML string older versions stored.
pub(crate) fn body<'de, D: Deserializer<'de>>(d: D) -> Result<NoteBody, D::Error> {
    Ok(match Option::<BodyRepr>::deserialize(d)? {
        None => NoteBody::default(),
        Some(BodyRepr::Blocks(body)) => body,
        Some(BodyRepr::Html(html)) => NoteBody::from_legacy_html(&html),
    })
}
