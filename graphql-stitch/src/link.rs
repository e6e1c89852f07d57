//! Cross-schema link declarations.

use std::hash::Hash;
use std::hash::Hasher;

use crate::source::SchemaNamespace;

/// Links a field on one backend's type to a query against another backend.
///
/// A link declares that the value of `source_type.source_field` is not served
/// by the source backend itself: instead, the value found under
/// [`source_from_field`](Link::source_from_field) is extracted as a join key
/// and passed as the [`argument_name`](Link::argument_name) argument of the
/// target backend's [`target_query_field`](Link::target_query_field) query.
///
/// Built through [`Link::from`], which requires the target to be declared
/// before [`build`](LinkBuilder::build) becomes available:
///
/// ```
/// use graphql_stitch::Link;
/// use graphql_stitch::SchemaNamespace;
///
/// let link = Link::from(SchemaNamespace::new("foo"), "Foo", "bar")
///     .from_field("barId")
///     .to(SchemaNamespace::new("bar"), "Bar")
///     .argument("id")
///     .build();
/// assert_eq!(link.target_query_field(), "bar");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    source: LinkSource,
    target: LinkTarget,
    argument: String,
    replace_from_field: bool,
    nullable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LinkSource {
    namespace: SchemaNamespace,
    type_name: String,
    field: String,
    from_field: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LinkTarget {
    namespace: SchemaNamespace,
    type_name: String,
    // None falls back to the source field name
    query_field: Option<String>,
    // None falls back to the argument name
    variable_query_field: Option<String>,
}

// Hashing covers the identifying (source, target, argument) triple only,
// while equality also covers `replace_from_field` and `nullable`: links
// differing only in policy flags share a bucket but compare unequal.
impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.target.hash(state);
        self.argument.hash(state);
    }
}

impl Link {
    /// Starts building a link from the given field.
    ///
    /// The join key is read from the same field; use
    /// [`from_field`](LinkSourceBuilder::from_field) when the key lives in a
    /// sibling field.
    pub fn from(
        namespace: SchemaNamespace,
        type_name: impl Into<String>,
        field: impl Into<String>,
    ) -> LinkSourceBuilder {
        let field = field.into();
        LinkSourceBuilder {
            source: LinkSource {
                namespace,
                type_name: type_name.into(),
                from_field: field.clone(),
                field,
            },
        }
    }

    /// The namespace of the schema the link originates from.
    pub fn source_namespace(&self) -> &SchemaNamespace {
        &self.source.namespace
    }

    /// The type of the source field from which the link exists.
    pub fn source_type(&self) -> &str {
        &self.source.type_name
    }

    /// The field name within the [source type](Link::source_type) that the
    /// link creates.
    pub fn source_field(&self) -> &str {
        &self.source.field
    }

    /// The field name within the [source type](Link::source_type) that holds
    /// the join key used to query the linked object.
    pub fn source_from_field(&self) -> &str {
        &self.source.from_field
    }

    /// Whether the [from field](Link::source_from_field) should no longer
    /// appear as a separate, standalone field within the source type.
    pub fn replace_from_field(&self) -> bool {
        self.replace_from_field
    }

    /// The namespace of the schema where the target object is queried.
    pub fn target_namespace(&self) -> &SchemaNamespace {
        &self.target.namespace
    }

    /// The type of the target field to which the link exists.
    pub fn target_type(&self) -> &str {
        &self.target.type_name
    }

    /// The name of the query field used to retrieve the linked object.
    /// Defaults to the [source field](Link::source_field) name.
    pub fn target_query_field(&self) -> &str {
        self.target
            .query_field
            .as_deref()
            .unwrap_or(&self.source.field)
    }

    /// The name of the field in the target object that corresponds to the
    /// field used in the query variables. Defaults to the
    /// [argument name](Link::argument_name).
    ///
    /// When the target selection asks for nothing else, the engine can echo
    /// the join key back under this name without a network call.
    pub fn target_variable_query_field(&self) -> &str {
        self.target
            .variable_query_field
            .as_deref()
            .unwrap_or(&self.argument)
    }

    /// The name of the query argument used to retrieve the linked object,
    /// given the value of the [from field](Link::source_from_field).
    pub fn argument_name(&self) -> &str {
        &self.argument
    }

    /// Whether a null join key should still prompt a remote link call.
    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// A [`Link`] builder that only knows its source; [`to`](Self::to) supplies
/// the target and unlocks the remaining options.
#[derive(Clone, Debug)]
pub struct LinkSourceBuilder {
    source: LinkSource,
}

impl LinkSourceBuilder {
    /// Reads the join key from the given sibling field instead of the source
    /// field itself.
    pub fn from_field(mut self, from_field: impl Into<String>) -> Self {
        self.source.from_field = from_field.into();
        self
    }

    /// Declares the target schema and type the link resolves against.
    pub fn to(self, namespace: SchemaNamespace, type_name: impl Into<String>) -> LinkBuilder {
        LinkBuilder {
            source: self.source,
            target: LinkTarget {
                namespace,
                type_name: type_name.into(),
                query_field: None,
                variable_query_field: None,
            },
            argument: String::from("id"),
            replace_from_field: false,
            nullable: false,
        }
    }
}

/// A [`Link`] builder with both endpoints declared.
#[derive(Clone, Debug)]
pub struct LinkBuilder {
    source: LinkSource,
    target: LinkTarget,
    argument: String,
    replace_from_field: bool,
    nullable: bool,
}

impl LinkBuilder {
    /// Overrides the target query field name.
    pub fn query_field(mut self, query_field: impl Into<String>) -> Self {
        self.target.query_field = Some(query_field.into());
        self
    }

    /// Overrides the name of the target field fed by the query variable.
    pub fn variable_query_field(mut self, variable_query_field: impl Into<String>) -> Self {
        self.target.variable_query_field = Some(variable_query_field.into());
        self
    }

    /// Overrides the target query argument name (default `"id"`).
    pub fn argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    /// Removes the from field from the stitched schema surface.
    pub fn replace_from_field(mut self) -> Self {
        self.replace_from_field = true;
        self
    }

    /// Sets whether a null join key still prompts a remote call.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn build(self) -> Link {
        Link {
            source: self.source,
            target: self.target,
            argument: self.argument,
            replace_from_field: self.replace_from_field,
            nullable: self.nullable,
        }
    }
}
