//! Per-request resolution environment.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::validation::Valid;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value;

use crate::json_ext::Object;

/// GraphQL operation type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    #[default]
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_type_name())
    }
}

impl OperationKind {
    pub const fn default_type_name(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

impl From<OperationKind> for ast::OperationType {
    fn from(value: OperationKind) -> Self {
        match value {
            OperationKind::Query => ast::OperationType::Query,
            OperationKind::Mutation => ast::OperationType::Mutation,
            OperationKind::Subscription => ast::OperationType::Subscription,
        }
    }
}

impl From<ast::OperationType> for OperationKind {
    fn from(value: ast::OperationType) -> Self {
        match value {
            ast::OperationType::Query => OperationKind::Query,
            ast::OperationType::Mutation => OperationKind::Mutation,
            ast::OperationType::Subscription => OperationKind::Subscription,
        }
    }
}

/// Everything the engine needs to know about one "fetch this field for this
/// object" request.
///
/// Built by the calling execution layer, once per field resolution. Requests
/// are grouped into batches by the caller; [`session`](Self::session) is the
/// explicit grouping key and two contexts with different session values must
/// never land in the same batch.
#[derive(Clone)]
pub struct ResolveContext {
    /// The composed schema the original operation executes against.
    pub schema: Arc<Valid<Schema>>,

    /// The original operation, for variable declarations.
    pub operation: Node<ast::OperationDefinition>,

    /// The fragment definitions of the original document, by name.
    pub fragments: HashMap<Name, Node<ast::FragmentDefinition>>,

    /// The original operation's variable values.
    pub variables: Object,

    /// The field node being resolved, with its sub-selections.
    pub field: Node<ast::Field>,

    /// The field's statically declared output type.
    pub field_type: ast::Type,

    /// The name of the type the field is selected on.
    pub parent_type: Name,

    /// The parent object value, when one has already been resolved.
    pub source: Option<Value>,

    /// Shared execution-session value grouping requests into one batch.
    pub session: Value,
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("field", &self.field.name)
            .field("field_type", &self.field_type)
            .field("parent_type", &self.parent_type)
            .finish_non_exhaustive()
    }
}

impl ResolveContext {
    /// The operation kind this request resolves under, judged by whether its
    /// parent type is one of the composed schema's root operation types.
    /// Fields nested below the root resolve to `None`.
    pub(crate) fn operation_kind(&self) -> Option<OperationKind> {
        [
            ast::OperationType::Query,
            ast::OperationType::Mutation,
            ast::OperationType::Subscription,
        ]
        .into_iter()
        .find(|operation_type| {
            self.schema.root_operation(*operation_type) == Some(&self.parent_type)
        })
        .map(OperationKind::from)
    }

    /// Whether the field's static output type is a list (possibly non-null).
    pub(crate) fn is_list_field(&self) -> bool {
        matches!(
            self.field_type,
            ast::Type::List(_) | ast::Type::NonNullList(_)
        )
    }
}
