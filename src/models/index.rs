use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use super::sort::SortDirection;

pub const INDEX_NAME_PREFIX: &str = "idx_";

/// Desired index on a collection.
///
/// Keys keep the order they were added in, which is the order of the compound
/// index sent to the server. The derived name ignores that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOption {
    pub name: Option<String>,
    pub keys: Vec<(String, SortDirection)>,
    pub unique: bool,
}

impl IndexOption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index on a single field
    pub fn single(field: impl Into<String>, direction: SortDirection) -> Self {
        Self::new().key(field, direction)
    }

    /// Compound index over `fields`, in the given order
    pub fn compound<S: AsRef<str>>(fields: &[(S, SortDirection)]) -> Self {
        fields
            .iter()
            .fold(Self::new(), |option, (field, direction)| {
                option.key(field.as_ref(), *direction)
            })
    }

    /// Adds a key. Adding a field that is already present replaces its
    /// direction in place.
    pub fn key(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        match self.keys.iter_mut().find(|(existing, _)| *existing == field) {
            Some(entry) => entry.1 = direction,
            None => self.keys.push((field, direction)),
        }
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Explicit name when set and non-empty, otherwise `idx_` followed by the
    /// field names sorted ascending and joined with `_`.
    pub fn index_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let mut fields: Vec<&str> = self.keys.iter().map(|(field, _)| field.as_str()).collect();
                fields.sort_unstable();
                format!("{}{}", INDEX_NAME_PREFIX, fields.join("_"))
            }
        }
    }

    pub fn keys_document(&self) -> Document {
        self.keys
            .iter()
            .map(|(field, direction)| (field.clone(), Bson::from(*direction)))
            .collect()
    }
}

/// Index as reported by the server's index metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub keys: Document,
    pub unique: bool,
}

impl IndexDescriptor {
    /// Reads one entry of `listIndexes` output. Only `name`, `key` and
    /// `unique` are looked at; `unique` counts when it is truthy.
    pub fn from_metadata(entry: &Document) -> Self {
        Self {
            name: entry.get_str("name").unwrap_or_default().to_string(),
            keys: entry.get_document("key").cloned().unwrap_or_default(),
            unique: entry.get("unique").map(is_truthy).unwrap_or(false),
        }
    }
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(flag) => *flag,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}
