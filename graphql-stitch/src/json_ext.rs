//! JSON data manipulation: response paths and object maps.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Value;

/// A JSON object.
pub type Object = serde_json_bytes::Map<ByteString, Value>;

/// One segment of a [`Path`] into response data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// A list index.
    Index(usize),
    /// An object key.
    Key(String),
}

/// A path into GraphQL response data, as found in an error's `path` field.
///
/// Serializes to the wire representation mandated by the GraphQL spec: a JSON
/// array mixing field names and list indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }

    /// The path with its first segment removed, e.g. to reposition an error
    /// relative to an aliased selection.
    pub fn strip_first(&self) -> Path {
        Path(self.0.iter().skip(1).cloned().collect())
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl From<&str> for Path {
    /// Parses a `/`-separated path; purely numeric segments become indices.
    fn from(value: &str) -> Self {
        value
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) => PathElement::Index(index),
                Err(_) => PathElement::Key(segment.to_string()),
            })
            .collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.0 {
            match element {
                PathElement::Index(index) => write!(f, "/{index}")?,
                PathElement::Key(key) => write!(f, "/{key}")?,
            }
        }
        Ok(())
    }
}
