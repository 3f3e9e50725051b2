//! Equality-AND selectors over current-state fields.
//!
//! A [`Selector`] is the only query shape the core issues. It renders to a
//! CouchDB-style document (`{"selector":{...}}`) for stores that accept a
//! query language, and can also be evaluated directly against a JSON value.

use std::collections::BTreeMap;

/// Conjunction of `field == value` predicates over top-level string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    fields: BTreeMap<String, String>,
}

impl Selector {
    /// An empty selector (matches every JSON object).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality predicate. A repeated field replaces the earlier value.
    #[must_use]
    pub fn field_eq(mut self, field: &str, value: &str) -> Self {
        self.fields.insert(field.to_string(), value.to_string());
        self
    }

    /// The predicates, in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether `doc` is an object whose fields satisfy every predicate.
    #[must_use]
    pub fn matches(&self, doc: &serde_json::Value) -> bool {
        let Some(obj) = doc.as_object() else {
            return false;
        };
        self.fields
            .iter()
            .all(|(field, want)| obj.get(field).and_then(serde_json::Value::as_str) == Some(want.as_str()))
    }

    /// Whether raw stored bytes parse as JSON and satisfy every predicate.
    #[must_use]
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        serde_json::from_slice::<serde_json::Value>(bytes).is_ok_and(|doc| self.matches(&doc))
    }

    /// Render as a `{"selector":{...}}` query document with sorted keys.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let selector: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        let mut doc = serde_json::Map::new();
        doc.insert("selector".into(), serde_json::Value::Object(selector));
        serde_json::Value::Object(doc).to_string()
    }
}
