//! A query federation and batching engine for stitched GraphQL schemas.
//!
//! Given many concurrent "fetch this field for this object" requests destined
//! for the same backend, the engine merges them into one composite query
//! document, resolves cross-schema link arguments, trims selections to what
//! the backend actually supports, executes a single call, and splits the
//! result (including per-item errors) back to each original request.
//!
//! The engine owns no scheduling and no transport: an external batching
//! scheduler delivers request groups to [`QueryExecutor::load`], and the one
//! network hop goes through the caller-provided [`QueryFunction`].

#![warn(missing_debug_implementations)]

pub mod batch;
pub mod error;
pub mod graphql;
pub mod json_ext;
pub mod link;
pub mod source;

pub use crate::batch::OperationKind;
pub use crate::batch::QueryExecutor;
pub use crate::batch::ResolveContext;
pub use crate::error::BatchError;
pub use crate::error::BoxError;
pub use crate::link::Link;
pub use crate::source::DocumentMapper;
pub use crate::source::MappedDocument;
pub use crate::source::NoopMapper;
pub use crate::source::QueryFunction;
pub use crate::source::SchemaNamespace;
pub use crate::source::SchemaSource;
