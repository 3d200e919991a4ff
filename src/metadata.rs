//! Stored-metadata lookup: the fallback source for focal points.
//!
//! When a smart-size request carries no explicit `poi`, the validator
//! asks the metadata store whether one was recorded earlier for the
//! image. Stored POIs come in two shapes:
//!
//! - a center point: `{"poi": [{"cx": 500, "cy": 300}]}`
//! - a bounding region: `{"poi": [{"x": 400, "y": 200, "width": 200,
//!   "height": 200}]}` — the POI is the region's center
//!
//! The `poi` field is an array so multiple POIs can be recorded later;
//! only the first entry is consulted today.
//!
//! Lookup happens at most once per chain stage and the result is never
//! cached across requests.

use crate::imaging::Poi;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("metadata lookup failed: {0}")]
    Lookup(String),
}

/// Read access to per-image metadata previously recorded by the hosting
/// application. Implementations must give read-consistent answers for
/// the duration of one chain execution.
pub trait MetadataStore {
    fn get_metadata(&self, user: &str, image_id: &str) -> Result<Option<Value>, MetadataError>;
}

/// Extract a focal point from a stored metadata mapping, if any.
pub fn poi_from_metadata(metadata: &Value) -> Option<Poi> {
    let entry = metadata.get("poi")?.get(0)?;

    if let (Some(cx), Some(cy)) = (field(entry, "cx"), field(entry, "cy")) {
        return Some(Poi::new(cx, cy));
    }

    let x = field(entry, "x")?;
    let y = field(entry, "y")?;
    let width = field(entry, "width")?;
    let height = field(entry, "height")?;
    Some(Poi::new(x + width / 2.0, y + height / 2.0))
}

fn field(value: &Value, key: &str) -> Option<f64> {
    value.get(key)?.as_f64()
}

/// A store with no entries, for callers outside any metadata context.
pub struct NoMetadata;

impl MetadataStore for NoMetadata {
    fn get_metadata(&self, _user: &str, _image_id: &str) -> Result<Option<Value>, MetadataError> {
        Ok(None)
    }
}

/// Simple in-memory store keyed by `(user, image_id)`.
#[derive(Default)]
pub struct InMemoryMetadata {
    entries: HashMap<(String, String), Value>,
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: &str, image_id: &str, metadata: Value) {
        self.entries
            .insert((user.to_string(), image_id.to_string()), metadata);
    }
}

impl MetadataStore for InMemoryMetadata {
    fn get_metadata(&self, user: &str, image_id: &str) -> Result<Option<Value>, MetadataError> {
        Ok(self
            .entries
            .get(&(user.to_string(), image_id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn center_point_poi() {
        let metadata = json!({"poi": [{"cx": 500, "cy": 300}]});
        assert_eq!(poi_from_metadata(&metadata), Some(Poi::new(500.0, 300.0)));
    }

    #[test]
    fn bounding_region_uses_center() {
        let metadata = json!({"poi": [{"x": 400, "y": 200, "width": 200, "height": 100}]});
        assert_eq!(poi_from_metadata(&metadata), Some(Poi::new(500.0, 250.0)));
    }

    #[test]
    fn first_poi_entry_wins() {
        let metadata = json!({"poi": [{"cx": 10, "cy": 20}, {"cx": 999, "cy": 999}]});
        assert_eq!(poi_from_metadata(&metadata), Some(Poi::new(10.0, 20.0)));
    }

    #[test]
    fn empty_poi_array_yields_none() {
        assert_eq!(poi_from_metadata(&json!({"poi": []})), None);
    }

    #[test]
    fn missing_poi_field_yields_none() {
        assert_eq!(poi_from_metadata(&json!({"other": 1})), None);
    }

    #[test]
    fn partial_region_yields_none() {
        let metadata = json!({"poi": [{"x": 400, "y": 200, "width": 200}]});
        assert_eq!(poi_from_metadata(&metadata), None);
    }

    #[test]
    fn in_memory_store_round_trip() {
        let mut store = InMemoryMetadata::new();
        store.insert("user", "img", json!({"poi": [{"cx": 1, "cy": 2}]}));

        let found = store.get_metadata("user", "img").unwrap().unwrap();
        assert_eq!(poi_from_metadata(&found), Some(Poi::new(1.0, 2.0)));
        assert!(store.get_metadata("user", "other").unwrap().is_none());
    }
}
