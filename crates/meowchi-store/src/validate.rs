//! Structural checks applied to a stored document before it is trusted.
//!
//! A document must be a JSON object carrying every section in
//! [`REQUIRED_SECTIONS`], a handful of fields must have the right primitive
//! type, and the whole must then decode into a [`SaveDocument`].

use meowchi_types::{REQUIRED_SECTIONS, SaveDocument};
use serde_json::Value;

use crate::error::ValidationError;

/// Kind of JSON value a spot-checked field must hold.
#[derive(Debug, Clone, Copy)]
enum Primitive {
    Number,
    String,
}

impl Primitive {
    const fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
        }
    }
}

/// Fields whose type is checked, as (section, key, dotted name, type).
const TYPED_FIELDS: [(&str, &str, &str, Primitive); 4] = [
    ("petState", "hunger", "petState.hunger", Primitive::Number),
    ("stats", "totalKeyPresses", "stats.totalKeyPresses", Primitive::Number),
    ("inventory", "equippedItem", "inventory.equippedItem", Primitive::String),
    ("evolution", "currentForm", "evolution.currentForm", Primitive::String),
];

/// Parse and validate raw document bytes.
pub fn parse_document(bytes: &[u8]) -> Result<SaveDocument, ValidationError> {
    let value: Value = serde_json::from_slice(bytes).map_err(ValidationError::Malformed)?;
    validate_value(&value)?;
    serde_json::from_value(value).map_err(ValidationError::Schema)
}

/// Check required sections and primitive field types of a JSON value.
pub fn validate_value(value: &Value) -> Result<(), ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(missing) = REQUIRED_SECTIONS.iter().find(|key| !object.contains_key(**key)) {
        return Err(ValidationError::MissingSection(*missing));
    }

    for (section, key, field, expected) in TYPED_FIELDS {
        let ok = object
            .get(section)
            .and_then(|s| s.get(key))
            .is_some_and(|v| expected.matches(v));
        if !ok {
            return Err(ValidationError::WrongType {
                field,
                expected: expected.name(),
            });
        }
    }
    Ok(())
}
