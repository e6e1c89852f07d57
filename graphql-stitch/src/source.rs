//! Backend schema sources and their collaborator seams.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::validation::Valid;
use async_trait::async_trait;
use serde_json_bytes::Value;

use crate::error::BoxError;
use crate::graphql;
use crate::json_ext::Object;
use crate::link::Link;

/// The name of one backend schema being stitched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaNamespace(String);

impl SchemaNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        SchemaNamespace(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Issues one composite query against a backend.
///
/// This is the engine's single suspend point. Implementations own transport,
/// timeouts and cancellation; a returned error fails the whole batch
/// atomically.
#[async_trait]
pub trait QueryFunction: Send + Sync {
    /// Executes the request under the given session value and returns exactly
    /// one response.
    async fn query(
        &self,
        request: graphql::Request,
        session: &Value,
    ) -> Result<graphql::Response, BoxError>;
}

/// The result of adapting a composite document to a backend's private schema
/// shape: the adapted document plus the inverse transform for its result.
pub struct MappedDocument {
    /// The document to actually send.
    pub document: ast::Document,
    /// Maps the raw result data back into the shape of the original document.
    pub result_mapper: Box<dyn FnOnce(Object) -> Object + Send>,
}

impl fmt::Debug for MappedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedDocument")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

/// Adapts a composite query document to a backend's private schema, applied
/// once per batch before execution.
pub trait DocumentMapper: Send + Sync {
    fn map(&self, document: ast::Document) -> MappedDocument;
}

/// The identity [`DocumentMapper`]: the backend serves the stitched shape
/// directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMapper;

impl DocumentMapper for NoopMapper {
    fn map(&self, document: ast::Document) -> MappedDocument {
        MappedDocument {
            document,
            result_mapper: Box::new(|data| data),
        }
    }
}

/// One upstream backend being stitched: its namespace, the links declared
/// against it, its private schema, and its document mapper.
#[derive(Clone)]
pub struct SchemaSource {
    namespace: SchemaNamespace,
    links: Vec<Link>,
    private_schema: Arc<Valid<Schema>>,
    document_mapper: Arc<dyn DocumentMapper>,
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaSource")
            .field("namespace", &self.namespace)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

impl SchemaSource {
    pub fn new(
        namespace: SchemaNamespace,
        links: Vec<Link>,
        private_schema: Arc<Valid<Schema>>,
    ) -> Self {
        SchemaSource {
            namespace,
            links,
            private_schema,
            document_mapper: Arc::new(NoopMapper),
        }
    }

    /// Replaces the default identity document mapper.
    pub fn with_document_mapper(mut self, document_mapper: Arc<dyn DocumentMapper>) -> Self {
        self.document_mapper = document_mapper;
        self
    }

    pub fn namespace(&self) -> &SchemaNamespace {
        &self.namespace
    }

    /// The links registered against this source.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The backend's own schema, used to resolve link argument types.
    pub fn private_schema(&self) -> &Valid<Schema> {
        &self.private_schema
    }

    pub fn document_mapper(&self) -> &dyn DocumentMapper {
        self.document_mapper.as_ref()
    }
}
