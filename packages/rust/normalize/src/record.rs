//! Shape-aware read access to one raw CMS record.
//!
//! Strapi answers in two shapes:
//! - wrapped (v4): `{ "id": 7, "attributes": { "title": ..., "modules": { "data": [...] } } }`
//! - flat (v5): `{ "id": 7, "title": ..., "modules": [...] }`
//!
//! [`RawRecord`] detects the shape once and every field reader goes through it,
//! trying the wrapped path first and the flat path second.

use lessonmap_shared::EntityId;
use serde_json::{Map, Value};

/// Key of the nested sub-object in the wrapped shape.
pub const ATTRIBUTES_KEY: &str = "attributes";

/// Key under which relations (and list responses) wrap their records.
pub const DATA_KEY: &str = "data";

/// Identity fields, in lookup order.
const ID_KEYS: [&str; 2] = ["id", "documentId"];

/// Which wire shape a record arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Wrapped,
    Flat,
}

/// Borrowed view over one raw record.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    record: &'a Map<String, Value>,
    attributes: Option<&'a Map<String, Value>>,
}

impl<'a> RawRecord<'a> {
    /// View `value` as a record. Anything but a JSON object yields `None`.
    pub fn new(value: &'a Value) -> Option<Self> {
        let record = value.as_object()?;
        let attributes = record.get(ATTRIBUTES_KEY).and_then(Value::as_object);
        Some(Self { record, attributes })
    }

    pub fn shape(&self) -> Shape {
        if self.attributes.is_some() {
            Shape::Wrapped
        } else {
            Shape::Flat
        }
    }

    /// Raw field value: wrapped sub-object first, then the record itself.
    /// JSON `null` counts as absent on both paths.
    pub fn field(&self, key: &str) -> Option<&'a Value> {
        self.attributes
            .and_then(|attrs| attrs.get(key))
            .filter(|v| !v.is_null())
            .or_else(|| self.record.get(key).filter(|v| !v.is_null()))
    }

    /// Resolved identity: `id`, then `documentId`, coerced to a number.
    pub fn id(&self) -> Option<EntityId> {
        ID_KEYS
            .iter()
            .find_map(|&key| self.record.get(key).and_then(coerce_id))
    }

    /// Any string value, including an empty one.
    pub fn string(&self, key: &str) -> Option<&'a str> {
        self.field(key).and_then(Value::as_str)
    }

    /// A string value with visible content. Blank strings count as missing.
    pub fn text(&self, key: &str) -> Option<&'a str> {
        self.string(key).filter(|s| !s.trim().is_empty())
    }

    /// A to-many relation as a slice of raw child records.
    ///
    /// Accepts a direct array or an object wrapping one under `data`;
    /// everything else is an empty relation.
    pub fn relation(&self, key: &str) -> &'a [Value] {
        match self.field(key) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Object(wrapper)) => match wrapper.get(DATA_KEY) {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[],
            },
            _ => &[],
        }
    }

    /// A to-one relation: `{ "data": {...} }` (wrapped) or a bare object (flat).
    /// `{ "data": null }` and absent relations yield `None`.
    pub fn related(&self, key: &str) -> Option<RawRecord<'a>> {
        let value = self.field(key)?;
        match value.as_object()?.get(DATA_KEY) {
            Some(inner) => RawRecord::new(inner),
            None => RawRecord::new(value),
        }
    }
}

/// Coerce a raw identifier into an [`EntityId`].
///
/// Non-negative integral numbers and strings holding one are accepted.
/// Blank strings, fractions, negatives and non-numeric document ids are not.
pub fn coerce_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(integral_f64))
            .map(EntityId),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<EntityId>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(integral_f64)
                    .map(EntityId)
            })
        }
        _ => None,
    }
}

fn integral_f64(f: f64) -> Option<u64> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}
