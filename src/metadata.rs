//! Filtering of the glTF JSON document down to its inspection-relevant
//! descriptors.

use serde_json::{Map, Value};

/// Top-level keys kept by default: format metadata, the scene hierarchy
/// roots, transform nodes and camera projections.
pub const RETAINED_KEYS: [&str; 4] = ["asset", "scenes", "nodes", "cameras"];

/// Keep only the entries of `document` whose key appears in `keys`.
///
/// Source order is preserved; keys absent from the document are simply
/// absent from the result.
pub fn filter_document<S: AsRef<str>>(document: Map<String, Value>, keys: &[S]) -> Map<String, Value> {
    document
        .into_iter()
        .filter(|(k, _)| keys.iter().any(|wanted| <S as AsRef<str>>::as_ref(wanted) == k.as_str()))
        .collect()
}

/// 2-space indented JSON text.
pub fn render_pretty(metadata: &Map<String, Value>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(metadata)
}
