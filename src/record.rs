use std::path::{Component, Path};

use serde_json::Value;

/// Category used when a record has no usable `system.category`.
pub const UNCATEGORIZED: &str = "_other";

/// Reads `system.category`; missing, empty or non-string values map to
/// [`UNCATEGORIZED`].
pub fn category_of(doc: &Value) -> &str {
    doc.get("system")
        .and_then(|system| system.get("category"))
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNCATEGORIZED)
}

/// Key of a record inside its combined document: `_id` when present,
/// otherwise the file it came from.
pub fn record_key(doc: &Value, filename: &str) -> String {
    match doc.get("_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => filename.to_string(),
    }
}

/// A category becomes a folder name, so it must be exactly one plain path
/// component.
pub fn is_safe_folder_name(category: &str) -> bool {
    let mut components = Path::new(category).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == category
    )
}
