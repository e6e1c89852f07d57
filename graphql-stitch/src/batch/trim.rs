//! Field selection trimming.
//!
//! Before a cloned field joins a composite query, its sub-selection is
//! rewritten so the backend only sees what it can serve: fields resolved
//! through a [`Link`] are swapped for the join-key field that feeds them, and
//! join-key fields never keep sub-selections of their own. The rewrite is a
//! single top-down pass threading the active parent type through each level;
//! a visited field's unwrapped output type becomes its children's parent type.

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::name;
use apollo_compiler::schema::ExtendedType;

use super::context::ResolveContext;
use crate::error::BatchError;
use crate::link::Link;
use crate::source::SchemaSource;

const TYPENAME_FIELD: &str = "__typename";

/// Trims the root field of one request.
///
/// When the root field itself is the source of a link whose join key lives in
/// a different field, and no parent object value exists yet, the field is
/// renamed to the join-key field and stripped to a leaf: the only thing worth
/// fetching is the key.
pub(crate) fn trim_field(
    source: &SchemaSource,
    ctx: &ResolveContext,
    field: &ast::Field,
) -> Result<ast::Field, BatchError> {
    if ctx.source.is_none() {
        if let Some(link) = link_with_different_from_field(
            source.links(),
            ctx.parent_type.as_str(),
            field.name.as_str(),
        ) {
            return Ok(ast::Field {
                alias: field.alias.clone(),
                name: new_name(link.source_from_field())?,
                arguments: field.arguments.clone(),
                directives: field.directives.clone(),
                selection_set: Vec::new(),
            });
        }
    }

    let parent = ctx.field_type.inner_named_type().clone();
    Ok(ast::Field {
        alias: field.alias.clone(),
        name: field.name.clone(),
        arguments: field.arguments.clone(),
        directives: field.directives.clone(),
        selection_set: trim_selection_set(source, ctx, &parent, &field.selection_set)?,
    })
}

/// Trims a fragment definition at its definition site, under its type
/// condition. Spreads of the fragment are left alone wherever they appear.
pub(crate) fn trim_fragment_definition(
    source: &SchemaSource,
    ctx: &ResolveContext,
    definition: &ast::FragmentDefinition,
) -> Result<ast::FragmentDefinition, BatchError> {
    let condition = resolve_type_condition(ctx, &definition.type_condition)?;
    Ok(ast::FragmentDefinition {
        name: definition.name.clone(),
        type_condition: definition.type_condition.clone(),
        directives: definition.directives.clone(),
        selection_set: trim_selection_set(source, ctx, &condition, &definition.selection_set)?,
    })
}

fn trim_selection_set(
    source: &SchemaSource,
    ctx: &ResolveContext,
    parent: &Name,
    selections: &[ast::Selection],
) -> Result<Vec<ast::Selection>, BatchError> {
    let mut trimmed = Vec::with_capacity(selections.len());
    // join-key fields to append in place of removed link source fields
    let mut appended: Vec<Name> = Vec::new();

    for selection in selections {
        match selection {
            ast::Selection::Field(field) => {
                if let Some(link) = link_with_different_from_field(
                    source.links(),
                    parent.as_str(),
                    field.name.as_str(),
                ) {
                    // the logical field is resolved through the link; fetch
                    // its join key instead
                    let from_field = new_name(link.source_from_field())?;
                    if !selects_field(selections, &from_field) && !appended.contains(&from_field) {
                        appended.push(from_field);
                    }
                    continue;
                }
                trimmed.push(ast::Selection::Field(Node::new(trim_child_field(
                    source, ctx, parent, field,
                )?)));
            }
            ast::Selection::FragmentSpread(spread) => {
                trimmed.push(ast::Selection::FragmentSpread(spread.clone()));
            }
            ast::Selection::InlineFragment(inline) => {
                let condition = match &inline.type_condition {
                    Some(condition) => resolve_type_condition(ctx, condition)?,
                    // a condition-less inline fragment selects on the
                    // enclosing type
                    None => parent.clone(),
                };
                trimmed.push(ast::Selection::InlineFragment(Node::new(
                    ast::InlineFragment {
                        type_condition: inline.type_condition.clone(),
                        directives: inline.directives.clone(),
                        selection_set: trim_selection_set(
                            source,
                            ctx,
                            &condition,
                            &inline.selection_set,
                        )?,
                    },
                )));
            }
        }
    }

    for name in appended {
        trimmed.push(ast::Selection::Field(Node::new(ast::Field {
            alias: None,
            name,
            arguments: Vec::new(),
            directives: ast::DirectiveList::default(),
            selection_set: Vec::new(),
        })));
    }
    Ok(trimmed)
}

fn trim_child_field(
    source: &SchemaSource,
    ctx: &ResolveContext,
    parent: &Name,
    field: &ast::Field,
) -> Result<ast::Field, BatchError> {
    // a field holding a link's join key never keeps children of its own:
    // whatever was selected below it is fetched through the link instead
    let is_join_key =
        link_for_from_field(source.links(), parent.as_str(), field.name.as_str()).is_some();

    let child_parent = if field.name.as_str() == TYPENAME_FIELD {
        name!("String")
    } else {
        field_output_type(&ctx.schema, parent, field.name.as_str())
            .ok_or_else(|| BatchError::FieldLookup {
                field: field.name.to_string(),
                parent: parent.to_string(),
            })?
            .inner_named_type()
            .clone()
    };

    let selection_set = if is_join_key {
        Vec::new()
    } else {
        trim_selection_set(source, ctx, &child_parent, &field.selection_set)?
    };

    Ok(ast::Field {
        alias: field.alias.clone(),
        name: field.name.clone(),
        arguments: field.arguments.clone(),
        directives: field.directives.clone(),
        selection_set,
    })
}

/// The declared output type of `parent.field`, when `parent` is a type that
/// has fields at all.
pub(crate) fn field_output_type<'a>(
    schema: &'a Schema,
    parent: &Name,
    field: &str,
) -> Option<&'a ast::Type> {
    match schema.types.get(parent.as_str())? {
        ExtendedType::Object(object) => object.fields.get(field).map(|def| &def.ty),
        ExtendedType::Interface(interface) => interface.fields.get(field).map(|def| &def.ty),
        _ => None,
    }
}

fn resolve_type_condition(ctx: &ResolveContext, condition: &Name) -> Result<Name, BatchError> {
    if ctx.schema.types.contains_key(condition.as_str()) {
        Ok(condition.clone())
    } else {
        Err(BatchError::UnknownTypeCondition {
            name: condition.to_string(),
        })
    }
}

fn selects_field(selections: &[ast::Selection], name: &Name) -> bool {
    selections.iter().any(|selection| {
        matches!(selection, ast::Selection::Field(field) if field.name == *name)
    })
}

/// The link resolving `type_name.field_name` through a join key held in a
/// *different* field.
pub(crate) fn link_with_different_from_field<'a>(
    links: &'a [Link],
    type_name: &str,
    field_name: &str,
) -> Option<&'a Link> {
    links.iter().find(|link| {
        link.source_type() == type_name
            && link.source_field() == field_name
            && link.source_from_field() != field_name
    })
}

/// The link whose join key is held in `type_name.field_name`.
pub(crate) fn link_for_from_field<'a>(
    links: &'a [Link],
    type_name: &str,
    field_name: &str,
) -> Option<&'a Link> {
    links
        .iter()
        .find(|link| link.source_type() == type_name && link.source_from_field() == field_name)
}

pub(crate) fn new_name(value: &str) -> Result<Name, BatchError> {
    Name::new(value).map_err(|_| BatchError::invalid_name(value))
}
