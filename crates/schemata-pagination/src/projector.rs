//! Record projection into transport-friendly maps.

use serde_json::Value as JsonValue;

use schemata_core::{defaults, ContentType, Error, RecordMap, Result};

/// Project one content type into its generic map, without `fields`.
pub fn project_one(content_type: &ContentType) -> Result<RecordMap> {
    match serde_json::to_value(content_type)? {
        JsonValue::Object(mut map) => {
            map.remove(defaults::FIELDS_KEY);
            Ok(map)
        }
        other => Err(Error::Serialization(format!(
            "Content type '{}' did not serialize to an object: {}",
            content_type.variable, other
        ))),
    }
}

/// Project a page of content types, preserving order one-to-one.
pub fn project(content_types: &[ContentType]) -> Result<Vec<RecordMap>> {
    content_types.iter().map(project_one).collect()
}
