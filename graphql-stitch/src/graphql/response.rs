use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value;

use super::Error;
use crate::json_ext::Object;

/// A GraphQL response, either as returned by a backend for a whole composite
/// query or as produced by the engine for one original request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Response {
    /// The response data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// The errors attached to this response.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Error>,

    /// The optional GraphQL extensions for this response.
    #[serde(skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

impl Response {
    /// A response carrying only data.
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }
}
