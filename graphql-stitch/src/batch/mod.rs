//! Composite query building and batch execution.
//!
//! Many concurrent "fetch this field" requests sharing a batch key arrive as
//! one group; [`QueryExecutor::load`] merges them into a single aliased
//! composite operation, runs it through the backend's document mapper and
//! query function, and splits the response back into one result per request.
//!
//! The engine performs no scheduling of its own: grouping requests into
//! batches is the calling layer's job, and the only suspend point is the
//! backend call itself. Everything else is a pure transform, so concurrent
//! batches never share mutable state.

mod context;
mod demux;
mod trim;
mod variables;

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::schema::ExtendedType;
use indexmap::IndexMap;
use serde_json_bytes::Value;
use tracing::debug;

pub use self::context::OperationKind;
pub use self::context::ResolveContext;
use self::demux::split_batch_response;
use self::trim::new_name;
use self::trim::trim_field;
use self::trim::trim_fragment_definition;
use self::variables::namespace_field_variables;
use self::variables::namespace_fragment_variables;
use crate::error::BatchError;
use crate::graphql;
use crate::json_ext::Object;
use crate::link::Link;
use crate::source::MappedDocument;
use crate::source::QueryFunction;
use crate::source::SchemaSource;

/// The alias under which one cloned field's result comes back, joining a
/// composite-query entry to the request it came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FieldKey(String);

impl FieldKey {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        FieldKey(value.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-batch alias and variable-namespace counter.
///
/// Starts high enough that the namespacer's suffix test cannot mistake a
/// legitimately supplied variable name for an already-namespaced one.
struct Counter(u32);

impl Counter {
    fn new() -> Self {
        Counter(99)
    }

    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

/// One aliased, trimmed clone of a requested field, tagged with the counter
/// that namespaces everything it drags into the composite query.
struct FieldRequest {
    field: ast::Field,
    counter: u32,
    key: FieldKey,
}

/// The pure output of composite query building, before any network call.
#[derive(Debug)]
pub(crate) struct BatchQuery {
    pub(crate) document: ast::Document,
    pub(crate) operation_name: Name,
    pub(crate) variables: Object,
    /// Ordered aliases per original request.
    pub(crate) field_keys: Vec<Vec<FieldKey>>,
    /// Results already known without a network call.
    pub(crate) short_circuited: IndexMap<FieldKey, Value>,
    /// Whether the composite selection set ended up empty.
    pub(crate) is_empty: bool,
}

/// Batches groups of field requests against one backend.
///
/// Holds the backend's [`SchemaSource`] and the [`QueryFunction`] that talks
/// to it; each [`load`](QueryExecutor::load) call is independent.
pub struct QueryExecutor<Q> {
    schema_source: Arc<SchemaSource>,
    query_function: Q,
}

impl<Q> fmt::Debug for QueryExecutor<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("schema_source", &self.schema_source)
            .finish_non_exhaustive()
    }
}

impl<Q: QueryFunction> QueryExecutor<Q> {
    pub fn new(schema_source: Arc<SchemaSource>, query_function: Q) -> Self {
        QueryExecutor {
            schema_source,
            query_function,
        }
    }

    /// Resolves one batch group end to end.
    ///
    /// All requests must share the same session value, resolve under the same
    /// operation kind and declare the same static field type; a mixed group
    /// is a caller bug and fails as a whole. The group's order is preserved:
    /// the `n`-th response answers the `n`-th request. When every request is
    /// answered by short-circuiting, no network call is issued at all.
    #[tracing::instrument(skip_all, level = "debug", fields(requests = requests.len()))]
    pub async fn load(
        &self,
        requests: &[ResolveContext],
        link: Option<&Link>,
    ) -> Result<Vec<graphql::Response>, BatchError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let session = check_session(requests)?;
        let batch = build_batch_query(&self.schema_source, requests, link)?;
        debug!(
            operation = %batch.operation_name,
            short_circuited = batch.short_circuited.len(),
            "built composite query"
        );

        let BatchQuery {
            document,
            operation_name,
            variables,
            field_keys,
            short_circuited,
            is_empty,
        } = batch;

        let MappedDocument {
            document,
            result_mapper,
        } = self.schema_source.document_mapper().map(document);

        let response = if is_empty {
            graphql::Response::default()
        } else {
            let request = graphql::Request {
                query: document.to_string(),
                operation_name: Some(operation_name.to_string()),
                variables,
                extensions: Object::new(),
            };
            self.query_function
                .query(request, session)
                .await
                .map_err(|error| BatchError::FetchFailed {
                    reason: error.to_string(),
                })?
        };

        // short-circuited values win over whatever the backend returned
        let mut data = match response.data {
            Some(Value::Object(map)) => map,
            _ => Object::new(),
        };
        for (key, value) in short_circuited {
            data.insert(key.as_str().to_string(), value);
        }
        let data = result_mapper(data);

        split_batch_response(requests, &field_keys, &data, &response.errors)
    }
}

/// Builds the composite operation for one group. The group must be non-empty;
/// [`QueryExecutor::load`] guards that.
pub(crate) fn build_batch_query(
    source: &SchemaSource,
    requests: &[ResolveContext],
    link: Option<&Link>,
) -> Result<BatchQuery, BatchError> {
    debug_assert!(!requests.is_empty());
    let operation_kind = check_operation_kind(requests)?;
    let field_type = check_field_type(requests)?;
    let operation_name = new_name(&format!("Bulk_{}", field_type.inner_named_type()))?;

    let mut operation = ast::OperationDefinition {
        operation_type: operation_kind.into(),
        name: Some(operation_name.clone()),
        variables: Vec::new(),
        directives: ast::DirectiveList::default(),
        selection_set: Vec::new(),
    };
    let mut variables = Object::new();
    let mut fragments: IndexMap<Name, ast::FragmentDefinition> = IndexMap::new();
    let mut short_circuited = IndexMap::new();
    let mut field_keys = Vec::with_capacity(requests.len());
    let mut counter = Counter::new();

    for ctx in requests {
        let mut keys = Vec::new();
        match link {
            Some(link) => {
                // computed on the incoming field: when the only thing
                // selected is the variable-fed field itself, the answer is
                // already in our hands
                let echoes_join_key = selects_only_variable_field(&ctx.field, link);
                for join_key in join_key_values(ctx, link) {
                    let request = clone_field(source, ctx, &mut counter)?;
                    if join_key.is_null() && !link.nullable() {
                        short_circuited.insert(request.key.clone(), Value::Null);
                    } else if echoes_join_key {
                        let mut echo = Object::new();
                        echo.insert(link.target_variable_query_field().to_string(), join_key);
                        short_circuited.insert(request.key.clone(), Value::Object(echo));
                    } else {
                        let field = bind_link_variable(
                            source,
                            link,
                            request.field,
                            request.counter,
                            &mut operation,
                            &mut variables,
                            join_key,
                        )?;
                        append_field(
                            source,
                            ctx,
                            field,
                            request.counter,
                            &mut operation,
                            &mut variables,
                            &mut fragments,
                        )?;
                    }
                    keys.push(request.key);
                }
            }
            None => {
                let request = clone_field(source, ctx, &mut counter)?;
                append_field(
                    source,
                    ctx,
                    request.field,
                    request.counter,
                    &mut operation,
                    &mut variables,
                    &mut fragments,
                )?;
                keys.push(request.key);
            }
        }
        field_keys.push(keys);
    }

    let is_empty = operation.selection_set.is_empty();
    let mut document = ast::Document::new();
    document
        .definitions
        .push(ast::Definition::OperationDefinition(Node::new(operation)));
    for (_, definition) in fragments {
        document
            .definitions
            .push(ast::Definition::FragmentDefinition(Node::new(definition)));
    }

    Ok(BatchQuery {
        document,
        operation_name,
        variables,
        field_keys,
        short_circuited,
        is_empty,
    })
}

/// Clones the request's field with a fresh `<name><counter>` alias and trims
/// it down to what the backend can serve.
fn clone_field(
    source: &SchemaSource,
    ctx: &ResolveContext,
    counter: &mut Counter,
) -> Result<FieldRequest, BatchError> {
    let count = counter.next();
    let alias = new_name(&format!("{}{}", ctx.field.name, count))?;
    let key = FieldKey::new(alias.as_str());
    let mut field = ctx.field.as_ref().clone();
    field.alias = Some(alias);
    let field = trim_field(source, ctx, &field)?;
    Ok(FieldRequest {
        field,
        counter: count,
        key,
    })
}

/// Rewrites a clone into the link's target query shape: renamed to the target
/// query field, its arguments replaced by the single namespaced join-key
/// argument, with a matching variable definition and binding.
fn bind_link_variable(
    source: &SchemaSource,
    link: &Link,
    mut field: ast::Field,
    counter: u32,
    operation: &mut ast::OperationDefinition,
    variables: &mut Object,
    join_key: Value,
) -> Result<ast::Field, BatchError> {
    let variable_name = new_name(&format!("{}{}", link.argument_name(), counter))?;

    field.name = new_name(link.target_query_field())?;
    field.arguments = vec![Node::new(ast::Argument {
        name: new_name(link.argument_name())?,
        value: Node::new(ast::Value::Variable(variable_name.clone())),
    })];

    operation.variables.push(Node::new(ast::VariableDefinition {
        name: variable_name.clone(),
        ty: link_argument_type(source, link)?,
        default_value: None,
        directives: ast::DirectiveList::default(),
    }));
    variables.insert(variable_name.to_string(), join_key);
    Ok(field)
}

/// The declared type of the link's argument on the target backend's query
/// field, looked up on the backend's private schema.
fn link_argument_type(
    source: &SchemaSource,
    link: &Link,
) -> Result<Node<ast::Type>, BatchError> {
    let schema = source.private_schema();
    let fields = schema
        .root_operation(ast::OperationType::Query)
        .and_then(|root| match schema.types.get(root.as_str()) {
            Some(ExtendedType::Object(object)) => Some(&object.fields),
            _ => None,
        })
        .ok_or_else(|| BatchError::LinkTargetField {
            field: link.target_query_field().to_string(),
        })?;
    let definition =
        fields
            .get(link.target_query_field())
            .ok_or_else(|| BatchError::LinkTargetField {
                field: link.target_query_field().to_string(),
            })?;
    let argument = definition
        .arguments
        .iter()
        .find(|argument| argument.name.as_str() == link.argument_name())
        .ok_or_else(|| BatchError::LinkArgument {
            field: link.target_query_field().to_string(),
            argument: link.argument_name().to_string(),
        })?;
    Ok(argument.ty.clone())
}

/// Namespaces a clone's variables and appends it to the composite selection
/// set, copying any fragment definitions it references (transitively) into
/// the document.
fn append_field(
    source: &SchemaSource,
    ctx: &ResolveContext,
    field: ast::Field,
    counter: u32,
    operation: &mut ast::OperationDefinition,
    variables: &mut Object,
    fragments: &mut IndexMap<Name, ast::FragmentDefinition>,
) -> Result<(), BatchError> {
    for (name, definition) in collect_fragment_definitions(source, ctx, &field)? {
        // one definition per document; the first clone referencing it wins
        if !fragments.contains_key(&name) {
            let definition =
                namespace_fragment_variables(&definition, counter, ctx, operation, variables)?;
            fragments.insert(name, definition);
        }
    }
    let field = namespace_field_variables(&field, counter, ctx, operation, variables)?;
    operation
        .selection_set
        .push(ast::Selection::Field(Node::new(field)));
    Ok(())
}

/// The trimmed definitions of every fragment the field spreads, following
/// spreads inside fragment bodies until none are left.
fn collect_fragment_definitions(
    source: &SchemaSource,
    ctx: &ResolveContext,
    field: &ast::Field,
) -> Result<IndexMap<Name, ast::FragmentDefinition>, BatchError> {
    let mut definitions = IndexMap::new();
    let mut pending = Vec::new();
    collect_spread_names(&field.selection_set, &mut pending);
    while let Some(name) = pending.pop() {
        if definitions.contains_key(&name) {
            continue;
        }
        let definition = ctx
            .fragments
            .get(&name)
            .ok_or_else(|| BatchError::UnknownFragment {
                name: name.to_string(),
            })?;
        let definition = trim_fragment_definition(source, ctx, definition)?;
        collect_spread_names(&definition.selection_set, &mut pending);
        definitions.insert(name, definition);
    }
    Ok(definitions)
}

fn collect_spread_names(selections: &[ast::Selection], pending: &mut Vec<Name>) {
    for selection in selections {
        match selection {
            ast::Selection::Field(field) => collect_spread_names(&field.selection_set, pending),
            ast::Selection::FragmentSpread(spread) => pending.push(spread.fragment_name.clone()),
            ast::Selection::InlineFragment(inline) => {
                collect_spread_names(&inline.selection_set, pending)
            }
        }
    }
}

/// The join-key values this request feeds into the link: the source object's
/// from-field value, fanned out when it is a list. A missing source or field
/// behaves as a single null key.
fn join_key_values(ctx: &ResolveContext, link: &Link) -> Vec<Value> {
    match ctx
        .source
        .as_ref()
        .and_then(|source| source.as_object())
        .and_then(|source| source.get(link.source_from_field()))
    {
        Some(Value::Array(values)) => values.clone(),
        Some(value) => vec![value.clone()],
        None => vec![Value::Null],
    }
}

/// Whether the field's entire sub-selection consists of plain fields named
/// after the link's target-variable-query-field; any fragment disqualifies.
fn selects_only_variable_field(field: &ast::Field, link: &Link) -> bool {
    !field.selection_set.is_empty()
        && field.selection_set.iter().all(|selection| {
            matches!(
                selection,
                ast::Selection::Field(child)
                    if child.name.as_str() == link.target_variable_query_field()
            )
        })
}

fn check_session(requests: &[ResolveContext]) -> Result<&Value, BatchError> {
    let session = &requests[0].session;
    if requests.iter().any(|ctx| ctx.session != *session) {
        return Err(BatchError::MixedSessions);
    }
    Ok(session)
}

fn check_operation_kind(requests: &[ResolveContext]) -> Result<OperationKind, BatchError> {
    let mut resolved = None;
    for ctx in requests {
        if let Some(kind) = ctx.operation_kind() {
            match resolved {
                Some(previous) if previous != kind => {
                    return Err(BatchError::MixedOperationKinds);
                }
                _ => resolved = Some(kind),
            }
        }
    }
    Ok(resolved.unwrap_or_default())
}

fn check_field_type(requests: &[ResolveContext]) -> Result<&ast::Type, BatchError> {
    let field_type = &requests[0].field_type;
    if requests.iter().any(|ctx| ctx.field_type != *field_type) {
        return Err(BatchError::MixedFieldTypes);
    }
    Ok(field_type)
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use apollo_compiler::ast;
    use async_trait::async_trait;
    use serde_json_bytes::json;

    use super::test_fixtures::*;
    use super::*;
    use crate::error::BoxError;
    use crate::json_ext::Path;
    use crate::source::QueryFunction;

    #[derive(Default)]
    struct MockQueryFunction {
        response: graphql::Response,
        recorded: Arc<Mutex<Vec<graphql::Request>>>,
    }

    impl MockQueryFunction {
        fn returning(data: Value) -> Self {
            MockQueryFunction {
                response: graphql::Response::from_data(data),
                recorded: Arc::default(),
            }
        }

        fn recorded(&self) -> Vec<graphql::Request> {
            self.recorded.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl QueryFunction for MockQueryFunction {
        async fn query(
            &self,
            request: graphql::Request,
            _session: &Value,
        ) -> Result<graphql::Response, BoxError> {
            self.recorded.lock().expect("lock").push(request);
            Ok(self.response.clone())
        }
    }

    struct FailingQueryFunction;

    #[async_trait]
    impl QueryFunction for FailingQueryFunction {
        async fn query(
            &self,
            _request: graphql::Request,
            _session: &Value,
        ) -> Result<graphql::Response, BoxError> {
            Err("connection reset".into())
        }
    }

    fn executor<Q: QueryFunction>(
        links: Vec<Link>,
        query_function: Q,
    ) -> QueryExecutor<Q> {
        QueryExecutor::new(Arc::new(source_with_links(links)), query_function)
    }

    fn parse_operation(request: &graphql::Request) -> Node<ast::OperationDefinition> {
        ast::Document::parse(request.query.clone(), "recorded.graphql")
            .expect("recorded query parses")
            .definitions
            .iter()
            .find_map(|definition| match definition {
                ast::Definition::OperationDefinition(operation) => Some(operation.clone()),
                _ => None,
            })
            .expect("an operation")
    }

    fn top_level_aliases(operation: &ast::OperationDefinition) -> Vec<String> {
        operation
            .selection_set
            .iter()
            .filter_map(|selection| match selection {
                ast::Selection::Field(field) => {
                    Some(field.alias.as_ref().expect("aliased").to_string())
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn batch_without_link_merges_and_splits_in_order() {
        let mut first = resolve_context(r#"query Q($x: ID!) { foo(id: $x) { name } }"#);
        first.variables.insert("x", json!("a"));
        let mut second = first.clone();
        second.variables.insert("x", json!("b"));

        let query_function = MockQueryFunction::returning(json!({
            "foo100": {"name": "first"},
            "foo101": {"name": "second"},
        }));
        let executor = executor(Vec::new(), query_function);

        let responses = executor
            .load(&[first, second], None)
            .await
            .expect("batch resolves");

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].data, Some(json!({"name": "first"})));
        assert_eq!(responses[1].data, Some(json!({"name": "second"})));

        let recorded = executor.query_function.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].operation_name.as_deref(), Some("Bulk_Foo"));
        assert_eq!(
            recorded[0].variables.get("x100"),
            Some(&json!("a")),
        );
        assert_eq!(
            recorded[0].variables.get("x101"),
            Some(&json!("b")),
        );

        let operation = parse_operation(&recorded[0]);
        assert_eq!(top_level_aliases(&operation), ["foo100", "foo101"]);
        assert_eq!(operation.variables.len(), 2);
    }

    #[tokio::test]
    async fn backend_errors_attach_to_their_request_with_relative_paths() {
        let ctx = resolve_context(r#"{ foo(id: "1") { name } }"#);
        let query_function = MockQueryFunction {
            response: graphql::Response {
                data: Some(json!({
                    "foo100": {"name": "first"},
                    "foo101": null,
                })),
                errors: vec![graphql::Error {
                    message: "title unavailable".to_string(),
                    path: Some(Path::from("foo101/title")),
                    ..Default::default()
                }],
                extensions: Object::new(),
            },
            recorded: Arc::default(),
        };
        let executor = executor(Vec::new(), query_function);

        let responses = executor
            .load(&[ctx.clone(), ctx], None)
            .await
            .expect("batch resolves");

        assert!(responses[0].errors.is_empty());
        assert_eq!(responses[1].errors.len(), 1);
        assert_eq!(responses[1].errors[0].path, Some(Path::from("title")));
    }

    #[tokio::test]
    async fn null_join_key_short_circuits_without_network() {
        let mut ctx = resolve_context_on("Foo", r#"{ bar { title } }"#);
        ctx.source = Some(json!({"barId": null}));

        let query_function = MockQueryFunction::default();
        let executor = executor(vec![bar_link()], query_function);

        let responses = executor
            .load(&[ctx], Some(&bar_link()))
            .await
            .expect("batch resolves");

        assert_eq!(responses[0].data, Some(Value::Null));
        assert!(executor.query_function.recorded().is_empty());
    }

    #[tokio::test]
    async fn join_key_only_selection_echoes_without_network() {
        // the only selected field is fed by the query variable itself
        let mut ctx = resolve_context_on("Foo", r#"{ bar { id } }"#);
        ctx.source = Some(json!({"barId": "b1"}));

        let query_function = MockQueryFunction::default();
        let executor = executor(vec![bar_link()], query_function);

        let responses = executor
            .load(&[ctx], Some(&bar_link()))
            .await
            .expect("batch resolves");

        assert_eq!(responses[0].data, Some(json!({"id": "b1"})));
        assert!(executor.query_function.recorded().is_empty());
    }

    #[tokio::test]
    async fn link_fans_a_list_field_out_and_folds_it_back() {
        let link = Link::from(SchemaNamespace::new("foo"), "Foo", "bars")
            .from_field("barIds")
            .to(SchemaNamespace::new("bar"), "Bar")
            .query_field("topbar")
            .build();
        let mut ctx = resolve_context_on("Foo", r#"{ bars { title } }"#);
        ctx.source = Some(json!({"barIds": ["b1", "b2"]}));

        let query_function = MockQueryFunction::returning(json!({
            "bars100": {"title": "first"},
            "bars101": {"title": "second"},
        }));
        let executor = executor(vec![link.clone()], query_function);

        let responses = executor
            .load(&[ctx], Some(&link))
            .await
            .expect("batch resolves");

        assert_eq!(
            responses[0].data,
            Some(json!([{"title": "first"}, {"title": "second"}]))
        );

        let recorded = executor.query_function.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].operation_name.as_deref(), Some("Bulk_Bar"));
        assert_eq!(recorded[0].variables.get("id100"), Some(&json!("b1")));
        assert_eq!(recorded[0].variables.get("id101"), Some(&json!("b2")));

        let operation = parse_operation(&recorded[0]);
        assert_eq!(top_level_aliases(&operation), ["bars100", "bars101"]);
        // the clones were renamed to the link's target query field
        for selection in &operation.selection_set {
            match selection {
                ast::Selection::Field(field) => assert_eq!(field.name.as_str(), "topbar"),
                other => panic!("expected field, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn fragments_are_copied_trimmed_and_namespaced() {
        let mut ctx = resolve_context(
            r#"
            query Q($x: ID!) { foo(id: $x) { ...details } }
            fragment details on Foo { name bar { title } }
            "#,
        );
        ctx.variables.insert("x", json!("a"));

        let query_function = MockQueryFunction::returning(json!({
            "foo100": {"name": "first", "barId": "b1"},
        }));
        let executor = executor(vec![bar_link()], query_function);

        let responses = executor
            .load(std::slice::from_ref(&ctx), None)
            .await
            .expect("batch resolves");
        assert_eq!(
            responses[0].data,
            Some(json!({"name": "first", "barId": "b1"}))
        );

        let recorded = executor.query_function.recorded();
        let document = ast::Document::parse(recorded[0].query.clone(), "recorded.graphql")
            .expect("recorded query parses");
        let fragment = document
            .definitions
            .iter()
            .find_map(|definition| match definition {
                ast::Definition::FragmentDefinition(fragment) => Some(fragment.clone()),
                _ => None,
            })
            .expect("fragment definition copied into the document");
        let names: Vec<&str> = fragment
            .selection_set
            .iter()
            .filter_map(|selection| match selection {
                ast::Selection::Field(field) => Some(field.name.as_str()),
                _ => None,
            })
            .collect();
        // `bar` is served through the link, so the fragment fetches the join
        // key instead
        assert_eq!(names, ["name", "barId"]);
    }

    #[tokio::test]
    async fn failing_backend_fails_the_whole_group() {
        let ctx = resolve_context(r#"{ foo(id: "1") { name } }"#);
        let executor = executor(Vec::new(), FailingQueryFunction);

        let error = executor
            .load(&[ctx], None)
            .await
            .expect_err("group fails atomically");

        assert_eq!(
            error,
            BatchError::FetchFailed {
                reason: "connection reset".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn mixed_sessions_are_rejected() {
        let mut first = resolve_context(r#"{ foo(id: "1") { name } }"#);
        first.session = json!("session-a");
        let mut second = first.clone();
        second.session = json!("session-b");

        let executor = executor(Vec::new(), MockQueryFunction::default());
        let error = executor
            .load(&[first, second], None)
            .await
            .expect_err("mixed sessions");

        assert_eq!(error, BatchError::MixedSessions);
    }

    #[test]
    fn mixed_operation_kinds_are_rejected() {
        let query_ctx = resolve_context(r#"{ foo(id: "1") { name } }"#);
        let mutation_ctx =
            resolve_context(r#"mutation M { renameFoo(id: "1", name: "renamed") { name } }"#);
        let source = source_with_links(Vec::new());

        let error =
            build_batch_query(&source, &[query_ctx, mutation_ctx], None).expect_err("mixed kinds");

        assert_eq!(error, BatchError::MixedOperationKinds);
    }

    #[tokio::test]
    async fn empty_group_resolves_to_no_responses() {
        let executor = executor(Vec::new(), MockQueryFunction::default());
        let responses = executor.load(&[], None).await.expect("empty group");
        assert!(responses.is_empty());
        assert!(executor.query_function.recorded().is_empty());
    }

    #[test]
    fn composite_query_has_one_uniquely_aliased_selection_per_request() {
        let ctx = resolve_context(r#"{ foo(id: "1") { name } }"#);
        let requests = vec![ctx.clone(), ctx.clone(), ctx];
        let source = source_with_links(Vec::new());

        let batch = build_batch_query(&source, &requests, None).expect("builds");

        assert!(!batch.is_empty);
        assert_eq!(batch.field_keys.len(), 3);
        let mut aliases: Vec<&str> = batch
            .field_keys
            .iter()
            .flatten()
            .map(FieldKey::as_str)
            .collect();
        assert_eq!(aliases, ["foo100", "foo101", "foo102"]);
        aliases.dedup();
        assert_eq!(aliases.len(), 3);
    }

    #[test]
    fn whole_batch_of_null_join_keys_is_empty() {
        let mut ctx = resolve_context_on("Foo", r#"{ bar { title } }"#);
        ctx.source = Some(json!({"barId": null}));
        let source = source_with_links(vec![bar_link()]);

        let batch =
            build_batch_query(&source, &[ctx.clone(), ctx], Some(&bar_link())).expect("builds");

        assert!(batch.is_empty);
        assert!(batch.variables.is_empty());
        assert_eq!(batch.short_circuited.len(), 2);
    }
}
