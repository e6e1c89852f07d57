//! Variable namespacing.
//!
//! Each cloned field dragged into a composite query carries the variable
//! references of the operation it came from. Several clones of the same field
//! would collide on those names, so every reference is rewritten to
//! `<name><counter>` with the clone's batch counter, and the original value
//! and declaration are copied into the batch operation under the new name.
//!
//! A reference that already ends in the counter's digits is left untouched.
//! That guard is what keeps freshly minted link variables (born namespaced)
//! stable, and it makes the rewrite idempotent. It is a suffix heuristic, not
//! a collision proof: a caller-supplied variable that legitimately ends in
//! the active counter digits will be left alone.

use apollo_compiler::Node;
use apollo_compiler::ast;

use super::context::ResolveContext;
use super::trim::new_name;
use crate::error::BatchError;
use crate::json_ext::Object;

/// Borrowed state for one clone's namespacing pass.
struct Namespacer<'a> {
    /// Digits appended to every rewritten reference.
    suffix: String,
    /// The request the clone came from: original declarations and values.
    ctx: &'a ResolveContext,
    /// The composite operation being built.
    operation: &'a mut ast::OperationDefinition,
    /// The composite query's variable values.
    variables: &'a mut Object,
}

/// Rewrites every variable reference under `field` for the given clone
/// counter, collecting values and declarations into the batch operation.
pub(crate) fn namespace_field_variables(
    field: &ast::Field,
    counter: u32,
    ctx: &ResolveContext,
    operation: &mut ast::OperationDefinition,
    variables: &mut Object,
) -> Result<ast::Field, BatchError> {
    let mut namespacer = Namespacer {
        suffix: counter.to_string(),
        ctx,
        operation,
        variables,
    };
    namespace_field(field, &mut namespacer)
}

/// [`namespace_field_variables`] for a fragment definition copied into the
/// composite document.
pub(crate) fn namespace_fragment_variables(
    definition: &ast::FragmentDefinition,
    counter: u32,
    ctx: &ResolveContext,
    operation: &mut ast::OperationDefinition,
    variables: &mut Object,
) -> Result<ast::FragmentDefinition, BatchError> {
    let mut namespacer = Namespacer {
        suffix: counter.to_string(),
        ctx,
        operation,
        variables,
    };
    Ok(ast::FragmentDefinition {
        name: definition.name.clone(),
        type_condition: definition.type_condition.clone(),
        directives: definition.directives.clone(),
        selection_set: namespace_selection_set(&definition.selection_set, &mut namespacer)?,
    })
}

fn namespace_field(
    field: &ast::Field,
    namespacer: &mut Namespacer<'_>,
) -> Result<ast::Field, BatchError> {
    Ok(ast::Field {
        alias: field.alias.clone(),
        name: field.name.clone(),
        arguments: namespace_arguments(&field.arguments, namespacer)?,
        directives: namespace_directives(&field.directives, namespacer)?,
        selection_set: namespace_selection_set(&field.selection_set, namespacer)?,
    })
}

fn namespace_selection_set(
    selections: &[ast::Selection],
    namespacer: &mut Namespacer<'_>,
) -> Result<Vec<ast::Selection>, BatchError> {
    selections
        .iter()
        .map(|selection| {
            Ok(match selection {
                ast::Selection::Field(field) => {
                    ast::Selection::Field(Node::new(namespace_field(field, namespacer)?))
                }
                ast::Selection::FragmentSpread(spread) => {
                    ast::Selection::FragmentSpread(spread.clone())
                }
                ast::Selection::InlineFragment(inline) => {
                    ast::Selection::InlineFragment(Node::new(ast::InlineFragment {
                        type_condition: inline.type_condition.clone(),
                        directives: inline.directives.clone(),
                        selection_set: namespace_selection_set(&inline.selection_set, namespacer)?,
                    }))
                }
            })
        })
        .collect()
}

fn namespace_arguments(
    arguments: &[Node<ast::Argument>],
    namespacer: &mut Namespacer<'_>,
) -> Result<Vec<Node<ast::Argument>>, BatchError> {
    arguments
        .iter()
        .map(|argument| {
            Ok(Node::new(ast::Argument {
                name: argument.name.clone(),
                value: Node::new(namespace_value(&argument.value, namespacer)?),
            }))
        })
        .collect()
}

fn namespace_directives(
    directives: &ast::DirectiveList,
    namespacer: &mut Namespacer<'_>,
) -> Result<ast::DirectiveList, BatchError> {
    Ok(ast::DirectiveList(
        directives
            .0
            .iter()
            .map(|directive| {
                Ok(Node::new(ast::Directive {
                    name: directive.name.clone(),
                    arguments: namespace_arguments(&directive.arguments, namespacer)?,
                }))
            })
            .collect::<Result<_, BatchError>>()?,
    ))
}

fn namespace_value(
    value: &ast::Value,
    namespacer: &mut Namespacer<'_>,
) -> Result<ast::Value, BatchError> {
    Ok(match value {
        ast::Value::Variable(name) => ast::Value::Variable(namespace_reference(name, namespacer)?),
        ast::Value::List(items) => ast::Value::List(
            items
                .iter()
                .map(|item| Ok(Node::new(namespace_value(item, namespacer)?)))
                .collect::<Result<_, BatchError>>()?,
        ),
        ast::Value::Object(fields) => ast::Value::Object(
            fields
                .iter()
                .map(|(key, item)| Ok((key.clone(), Node::new(namespace_value(item, namespacer)?))))
                .collect::<Result<_, BatchError>>()?,
        ),
        other => other.clone(),
    })
}

fn namespace_reference(
    name: &apollo_compiler::Name,
    namespacer: &mut Namespacer<'_>,
) -> Result<apollo_compiler::Name, BatchError> {
    if name.as_str().ends_with(&namespacer.suffix) {
        return Ok(name.clone());
    }
    let namespaced = new_name(&format!("{}{}", name.as_str(), namespacer.suffix))?;

    let ty = namespacer
        .ctx
        .operation
        .variables
        .iter()
        .find(|definition| definition.name == *name)
        .map(|definition| definition.ty.clone())
        .ok_or_else(|| BatchError::UndeclaredVariable {
            name: name.to_string(),
        })?;

    let value = namespacer
        .ctx
        .variables
        .get(name.as_str())
        .cloned()
        .unwrap_or(serde_json_bytes::Value::Null);
    namespacer
        .variables
        .insert(namespaced.to_string(), value);

    // two uses of the same variable under one counter share one declaration
    if !namespacer
        .operation
        .variables
        .iter()
        .any(|definition| definition.name == namespaced)
    {
        namespacer
            .operation
            .variables
            .push(Node::new(ast::VariableDefinition {
                name: namespaced.clone(),
                ty,
                default_value: None,
                directives: ast::DirectiveList::default(),
            }));
    }
    Ok(namespaced)
}
