use chrono::{DateTime, Local};

#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn random_u64() -> u64 {
    let mut buf = [0u8; 8];
    // getrandom only fails when the platform has no entropy source at all;
    // fall back to a time-derived value so ids still differ.
    if getrandom::getrandom(&mut buf).is_err() {
        return (now_ms() as u64).rotate_left(17) ^ 0x9e37_79b9_7f4a_7c15;
    }
    u64::from_le_bytes(buf)
}

/// Opaque note/notification id: creation time plus random bits.
pub(crate) fn new_id(now_ms: i64) -> String {
    format!("{:x}-{:016x}", now_ms.max(0), random_u64())
}

pub(crate) fn new_share_token(now_ms: i64) -> String {
    format!("{}{:08x}", now_ms.max(0), random_u64() as u32)
}

fn local_datetime(ms: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(ms).map(|d| d.with_timezone(&Local))
}

/// Display form of a note timestamp.
pub(crate) fn format_timestamp(ms: i64) -> String {
    local_datetime(ms)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// "just now", "1 minute ago", "N minutes ago", else the local clock time.
pub(crate) fn format_relative(then_ms: i64, now_ms: i64) -> String {
    let diff_min = (now_ms - then_ms).max(0) / 60_000;

    match diff_min {
        0 => "just now".to_string(),
        1 => "1 minute ago".to_string(),
        m if m < 60 => format!("{m} minutes ago"),
        _ => local_datetime(then_ms)
            .map(|d| d.format("%H:%M").to_string())
            .unwrap_or_default(),
    }
}
