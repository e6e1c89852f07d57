//! Types related to GraphQL requests, responses and errors.

mod request;
mod response;

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

pub use self::request::Request;
pub use self::response::Response;
use crate::json_ext::Object;
use crate::json_ext::Path;

/// The location of an error in the originating GraphQL document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The line number.
    pub line: u32,
    /// The column number.
    pub column: u32,
}

/// A [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors)
/// as may be found in the `errors` field of a GraphQL [`Response`].
///
/// Deserialization is lenient, because backends routinely omit fields: a
/// missing `message` becomes `"Unknown error"`, and everything else defaults
/// to empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Error {
    /// The error message.
    pub message: String,

    /// The locations of the error in the GraphQL document of the originating
    /// request.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// If this is a field error, the JSON path to that field in
    /// [`Response::data`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional GraphQL extensions for this error.
    #[serde(skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

impl Default for Error {
    fn default() -> Self {
        Self {
            message: String::from("Unknown error"),
            locations: Vec::new(),
            path: None,
            extensions: Object::new(),
        }
    }
}

impl Error {
    /// An error with the given message and no further detail.
    pub fn for_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Displays (only) the error message.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn error_deserializes_leniently() {
        let error: Error = serde_json_bytes::from_value(json!({})).expect("empty error map");
        assert_eq!(error.message, "Unknown error");
        assert_eq!(error.path, None);

        let error: Error = serde_json_bytes::from_value(json!({
            "message": "boom",
            "path": ["foo100", "title"],
            "locations": [{"line": 1, "column": 2}],
        }))
        .expect("full error map");
        assert_eq!(error.message, "boom");
        assert_eq!(error.path, Some(Path::from("foo100/title")));
        assert_eq!(error.locations, vec![Location { line: 1, column: 2 }]);
    }

    #[test]
    fn error_serialization_skips_empty_fields() {
        let value = serde_json_bytes::to_value(Error::for_message("boom")).expect("serializes");
        assert_eq!(value, json!({"message": "boom"}));
    }
}
