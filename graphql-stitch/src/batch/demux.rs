//! Result demultiplexing.
//!
//! One composite response comes back; each original request gets its slice,
//! looked up by the aliases recorded while the composite query was built.
//! Backend errors travel with the slice they belong to, repositioned as if
//! the field had been fetched directly.

use serde_json_bytes::Value;

use super::FieldKey;
use super::context::ResolveContext;
use crate::error::BatchError;
use crate::graphql;
use crate::json_ext::Object;
use crate::json_ext::PathElement;

/// Splits the merged composite data map back into one response per request,
/// preserving input order.
pub(crate) fn split_batch_response(
    requests: &[ResolveContext],
    field_keys: &[Vec<FieldKey>],
    data: &Object,
    errors: &[graphql::Error],
) -> Result<Vec<graphql::Response>, BatchError> {
    requests
        .iter()
        .zip(field_keys)
        .map(|(ctx, keys)| split_single_response(ctx, keys, data, errors))
        .collect()
}

fn split_single_response(
    ctx: &ResolveContext,
    keys: &[FieldKey],
    data: &Object,
    errors: &[graphql::Error],
) -> Result<graphql::Response, BatchError> {
    let value = match keys.split_first() {
        Some((first, rest)) => {
            let first_value = value_for(data, first);
            if ctx.is_list_field() && !first_value.is_array() {
                // a link fanned one logical list field out into several
                // fetches; fold them back in alias order
                Value::Array(keys.iter().map(|key| value_for(data, key)).collect())
            } else if rest.is_empty() {
                first_value
            } else {
                return Err(BatchError::MultipleFetchesForNonList {
                    field: ctx.field.name.to_string(),
                    count: keys.len(),
                });
            }
        }
        // nothing was fetched for this request; a list-valued source field
        // collapses to an empty list, anything else to null
        None => match source_field_value(ctx) {
            Some(Value::Array(_)) => Value::Array(Vec::new()),
            _ => Value::Null,
        },
    };

    Ok(graphql::Response {
        data: Some(value),
        errors: errors
            .iter()
            .filter_map(|error| associate_error(error, keys))
            .collect(),
        extensions: Object::new(),
    })
}

fn value_for(data: &Object, key: &FieldKey) -> Value {
    data.get(key.as_str()).cloned().unwrap_or(Value::Null)
}

fn source_field_value(ctx: &ResolveContext) -> Option<&Value> {
    ctx.source
        .as_ref()
        .and_then(|source| source.as_object())
        .and_then(|source| source.get(ctx.field.name.as_str()))
}

/// Decides whether `error` belongs to the request owning `keys`, and if so
/// returns it repositioned relative to that request.
///
/// An error without a path is global and attaches to every request unchanged.
/// A pathed error attaches when its first segment names one of the request's
/// aliases; the shared alias prefix is stripped so callers see the path as if
/// the field had been fetched directly.
fn associate_error(error: &graphql::Error, keys: &[FieldKey]) -> Option<graphql::Error> {
    let path = match error.path.as_ref().filter(|path| !path.is_empty()) {
        None => return Some(error.clone()),
        Some(path) => path,
    };
    match &path.0[0] {
        PathElement::Key(key) if keys.iter().any(|alias| alias.as_str() == key) => {
            let mut relative = error.clone();
            relative.path = Some(path.strip_first());
            Some(relative)
        }
        _ => None,
    }
}
