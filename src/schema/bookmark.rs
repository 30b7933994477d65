use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored bookmark.
///
/// Only `id` is interpreted. Every other attribute is an opaque scalar that is
/// carried through storage and serialization untouched, flattened next to `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: i64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Bookmark {
    pub fn new(id: i64, attributes: Map<String, Value>) -> Self {
        Self { id, attributes }
    }

    /// Look up a single attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// A bookmark about to be inserted. The store assigns `id` when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewBookmark {
    #[garde(range(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[garde(custom(validate_scalar_attributes))]
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl NewBookmark {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self { id: None, attributes }
    }

    /// Pin the identifier instead of letting the store assign one (fixtures)
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Build the stored form once the store has settled on an identifier
    pub fn into_bookmark(self, id: i64) -> Bookmark {
        Bookmark::new(id, self.attributes)
    }
}

impl From<Bookmark> for NewBookmark {
    fn from(bookmark: Bookmark) -> Self {
        Self {
            id: Some(bookmark.id),
            attributes: bookmark.attributes,
        }
    }
}

fn validate_scalar_attributes(value: &Map<String, Value>, _: &()) -> garde::Result {
    match value.iter().find(|(_, v)| v.is_object() || v.is_array()) {
        Some((name, _)) => Err(garde::Error::new(format!(
            "attribute '{}' must be a scalar",
            name
        ))),
        None => Ok(()),
    }
}
