//! The executable-document AST consumed by validation and execution.
//!
//! Parsing lives outside this crate; whatever produces a [`Document`] is
//! expected to fill in source positions so errors can point back at the
//! query text. Every node is wrapped in [`Positioned`].

use std::fmt::{self, Display, Formatter};

use engine_value::{ConstValue, Name, Value};
use serde::{Deserialize, Serialize};

/// A source position: 1-based line and column, `0:0` when unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Pos { line, column }
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An AST node together with the position it starts at.
///
/// Equality and hashing ignore the position, so nodes compare structurally.
#[derive(Clone, Copy, Debug, Default)]
pub struct Positioned<T> {
    pub pos: Pos,
    pub node: T,
}

impl<T> Positioned<T> {
    pub fn new(node: T, pos: Pos) -> Self {
        Positioned { pos, node }
    }

    pub fn into_inner(self) -> T {
        self.node
    }
}

impl<T: PartialEq> PartialEq for Positioned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T: Eq> Eq for Positioned<T> {}

impl<T: std::hash::Hash> std::hash::Hash for Positioned<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<T: Display> Display for Positioned<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}

/// A complete document: operations, fragments and any type-system
/// definitions that happened to share the file.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

impl Document {
    /// The executable operations, in document order.
    pub fn operations(&self) -> impl Iterator<Item = &Positioned<OperationDefinition>> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Operation(operation) => Some(operation),
            _ => None,
        })
    }

    /// The fragment definitions, in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &Positioned<FragmentDefinition>> {
        self.definitions.iter().filter_map(|definition| match definition {
            Definition::Fragment(fragment) => Some(fragment),
            _ => None,
        })
    }
}

/// A top-level definition.
#[derive(Clone, Debug)]
pub enum Definition {
    Operation(Positioned<OperationDefinition>),
    Fragment(Positioned<FragmentDefinition>),
    TypeSystem(TypeSystemDefinition),
}

/// A type-system definition or extension.
///
/// Execution ignores these entirely; validation needs just enough shape to
/// name them in diagnostics.
#[derive(Clone, Debug)]
pub enum TypeSystemDefinition {
    /// A `schema { ... }` definition or extension.
    Schema(Pos),
    /// A named type definition or extension.
    Type(Positioned<Name>),
    /// A `directive @name` definition.
    Directive(Positioned<Name>),
}

impl TypeSystemDefinition {
    pub fn pos(&self) -> Pos {
        match self {
            TypeSystemDefinition::Schema(pos) => *pos,
            TypeSystemDefinition::Type(name) | TypeSystemDefinition::Directive(name) => name.pos,
        }
    }
}

/// The kind of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        })
    }
}

/// A query, mutation or subscription operation.
#[derive(Clone, Debug)]
pub struct OperationDefinition {
    pub ty: OperationType,
    pub name: Option<Positioned<Name>>,
    pub variable_definitions: Vec<Positioned<VariableDefinition>>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

/// A declared operation variable: `$devicePicture: Picture = "framed"`.
#[derive(Clone, Debug)]
pub struct VariableDefinition {
    pub name: Positioned<Name>,
    pub var_type: Positioned<Type>,
    pub default_value: Option<Positioned<ConstValue>>,
}

impl VariableDefinition {
    pub fn default_value(&self) -> Option<&ConstValue> {
        self.default_value.as_ref().map(|value| &value.node)
    }
}

/// A type reference, e.g. `String`, `[String!]!`.
///
/// Encoding non-null as a `nullable` flag on the wrapped base makes a
/// non-null directly inside a non-null unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Type {
    pub base: BaseType,
    pub nullable: bool,
}

/// The base of a type reference: a name or a list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseType {
    Named(Name),
    List(Box<Type>),
}

impl Type {
    /// Parse a type reference from its GraphQL source form.
    pub fn new(ty: &str) -> Option<Self> {
        let (nullable, ty) = match ty.strip_suffix('!') {
            Some(inner) => (false, inner),
            None => (true, ty),
        };
        let base = match ty.strip_prefix('[') {
            Some(rest) => BaseType::List(Box::new(Type::new(rest.strip_suffix(']')?)?)),
            None if ty.is_empty() || ty.ends_with(']') => return None,
            None => BaseType::Named(Name::new(ty)),
        };
        Some(Type { base, nullable })
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseType::Named(name) => write!(f, "{name}")?,
            BaseType::List(item) => write!(f, "[{item}]")?,
        }
        if !self.nullable {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// A braced group of selections.
#[derive(Clone, Debug, Default)]
pub struct SelectionSet {
    pub items: Vec<Positioned<Selection>>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single selection.
#[derive(Clone, Debug)]
pub enum Selection {
    Field(Positioned<Field>),
    FragmentSpread(Positioned<FragmentSpread>),
    InlineFragment(Positioned<InlineFragment>),
}

impl Selection {
    /// The directives attached to the selection, whichever kind it is.
    pub fn directives(&self) -> &[Positioned<Directive>] {
        match self {
            Selection::Field(field) => &field.node.directives,
            Selection::FragmentSpread(spread) => &spread.node.directives,
            Selection::InlineFragment(fragment) => &fragment.node.directives,
        }
    }
}

/// A field selection.
#[derive(Clone, Debug)]
pub struct Field {
    pub alias: Option<Positioned<Name>>,
    pub name: Positioned<Name>,
    pub arguments: Vec<(Positioned<Name>, Positioned<Value>)>,
    pub directives: Vec<Positioned<Directive>>,
    /// Empty when the field has no sub-selection.
    pub selection_set: Positioned<SelectionSet>,
}

impl Field {
    /// The key this field's value appears under in the response: the alias
    /// when present, the field name otherwise.
    pub fn response_key(&self) -> &Positioned<Name> {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    /// The value of the argument with the given name, if provided.
    pub fn get_argument(&self, name: &str) -> Option<&Positioned<Value>> {
        self.arguments
            .iter()
            .find(|(arg_name, _)| arg_name.node == name)
            .map(|(_, value)| value)
    }
}

/// A named fragment spread: `...FragmentName`.
#[derive(Clone, Debug)]
pub struct FragmentSpread {
    pub fragment_name: Positioned<Name>,
    pub directives: Vec<Positioned<Directive>>,
}

/// An inline fragment: `... on Type { ... }`.
#[derive(Clone, Debug)]
pub struct InlineFragment {
    pub type_condition: Option<Positioned<TypeCondition>>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

/// A fragment definition.
#[derive(Clone, Debug)]
pub struct FragmentDefinition {
    pub name: Positioned<Name>,
    pub type_condition: Positioned<TypeCondition>,
    pub directives: Vec<Positioned<Directive>>,
    pub selection_set: Positioned<SelectionSet>,
}

/// A fragment's type condition: `on Type`.
#[derive(Clone, Debug)]
pub struct TypeCondition {
    pub on: Positioned<Name>,
}

/// A directive application: `@skip(if: $foo)`.
#[derive(Clone, Debug)]
pub struct Directive {
    pub name: Positioned<Name>,
    pub arguments: Vec<(Positioned<Name>, Positioned<Value>)>,
}

impl Directive {
    pub fn get_argument(&self, name: &str) -> Option<&Positioned<Value>> {
        self.arguments
            .iter()
            .find(|(arg_name, _)| arg_name.node == name)
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_parsing_round_trips() {
        for source in ["String", "String!", "[String]", "[String!]!", "[[Int]!]"] {
            assert_eq!(Type::new(source).unwrap().to_string(), source);
        }
    }

    #[test]
    fn malformed_types_are_rejected() {
        assert_eq!(Type::new(""), None);
        assert_eq!(Type::new("[String"), None);
        assert_eq!(Type::new("String]"), None);
    }

    #[test]
    fn response_key_prefers_alias() {
        let field = Field {
            alias: Some(Positioned::new(Name::new("b"), Pos::default())),
            name: Positioned::new(Name::new("a"), Pos::default()),
            arguments: Vec::new(),
            directives: Vec::new(),
            selection_set: Positioned::new(SelectionSet::default(), Pos::default()),
        };
        assert_eq!(field.response_key().node, "b");
    }
}
