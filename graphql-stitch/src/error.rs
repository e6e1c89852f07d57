//! Batch executor errors.

use displaydoc::Display;
use thiserror::Error;

/// A boxed, sendable error, used at the [`QueryFunction`] seam.
///
/// [`QueryFunction`]: crate::source::QueryFunction
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal errors aborting a whole batch.
///
/// Every variant here is a configuration or schema-setup bug, or a failure of
/// the backend call as a whole: none of them can be recovered per request, so
/// the entire group fails atomically. Errors *returned by* a backend inside an
/// otherwise successful response are not represented here; those stay
/// [`graphql::Error`] values attached to the originating request.
///
/// [`graphql::Error`]: crate::graphql::Error
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BatchError {
    /// batched requests must share the same session
    MixedSessions,

    /// batched requests must resolve the same operation kind
    MixedOperationKinds,

    /// batched requests must share the same field type
    MixedFieldTypes,

    /// could not find definition for field '{field}' on type '{parent}'
    FieldLookup {
        /// The selected field that has no definition.
        field: String,
        /// The parent type it was looked up on.
        parent: String,
    },

    /// unknown type '{name}' in fragment type condition
    UnknownTypeCondition { name: String },

    /// fragment '{name}' is not defined by the originating operation
    UnknownFragment { name: String },

    /// variable '${name}' is not declared by the originating operation
    UndeclaredVariable { name: String },

    /// target schema has no query field '{field}'
    LinkTargetField { field: String },

    /// link target query field '{field}' has no argument '{argument}'
    LinkArgument { field: String, argument: String },

    /// field '{field}' is not a list but resolved to {count} fetches
    MultipleFetchesForNonList { field: String, count: usize },

    /// invalid GraphQL name '{name}'
    InvalidName { name: String },

    /// fetch failed: {reason}
    FetchFailed { reason: String },
}

impl BatchError {
    pub(crate) fn invalid_name(name: impl Into<String>) -> Self {
        BatchError::InvalidName { name: name.into() }
    }
}
