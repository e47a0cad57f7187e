use serde_json::Value;

const LEGACY_ARCHIVED: &str = "archived";

/// Rewrites the retired `archived` flag into `shared` and drops it.
///
/// Returns true if any record changed.
pub(crate) fn migrate_archived_to_shared(records: &mut [Value]) -> bool {
    let mut changed = false;

    for record in records.iter_mut() {
        let Some(obj) = record.as_object_mut() else {
            continue;
        };
        let Some(archived) = obj.remove(LEGACY_ARCHIVED) else {
            continue;
        };

        if archived.as_bool().unwrap_or(false) {
            obj.insert("shared".to_string(), Value::Bool(true));
        }
        changed = true;
    }

    changed
}
