//! The schema view consumed by validation and execution.
//!
//! A [`Registry`] is the built, immutable form of a schema: a name-keyed
//! map of [`MetaType`]s, the declared directives, the root types and the
//! precomputed abstract-to-concrete relation. It is constructed through
//! [`Registry::builder`]; how the types got there (SDL, code-first,
//! introspection) is not this crate's concern.

mod resolvers;
pub mod scalars;
mod type_names;

use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use engine_value::ConstValue;
use indexmap::{IndexMap, IndexSet};

pub use resolvers::{FieldFuture, IsTypeOfFn, ResolveTypeFn, ResolverFn, SubscribeFn};
pub use type_names::{MetaFieldType, MetaTypeName};

use crate::{ast::OperationType, error::Result};

/// A scalar coercion hook: `parse_value`, `parse_literal`.
pub type ScalarCoerceFn = Arc<dyn Fn(ConstValue) -> Result<ConstValue> + Send + Sync>;

/// A scalar serialization hook.
pub type ScalarSerializeFn = Arc<dyn Fn(ConstValue) -> Result<ConstValue> + Send + Sync>;

/// A scalar type. Hooks left unset make the scalar pass values through
/// unchanged in that direction.
#[derive(Clone, Default)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    parse_value: Option<ScalarCoerceFn>,
    parse_literal: Option<ScalarCoerceFn>,
    serialize: Option<ScalarSerializeFn>,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        ScalarType {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_parse_value(
        mut self,
        f: impl Fn(ConstValue) -> Result<ConstValue> + Send + Sync + 'static,
    ) -> Self {
        self.parse_value = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn with_parse_literal(
        mut self,
        f: impl Fn(ConstValue) -> Result<ConstValue> + Send + Sync + 'static,
    ) -> Self {
        self.parse_literal = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn with_serialize(
        mut self,
        f: impl Fn(ConstValue) -> Result<ConstValue> + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Arc::new(f));
        self
    }

    /// Coerce a runtime input value.
    pub fn parse_value(&self, value: ConstValue) -> Result<ConstValue> {
        match &self.parse_value {
            Some(parse) => parse(value),
            None => Ok(value),
        }
    }

    /// Coerce a literal value. Falls back to `parse_value` when no
    /// dedicated literal hook is installed.
    pub fn parse_literal(&self, value: ConstValue) -> Result<ConstValue> {
        match &self.parse_literal {
            Some(parse) => parse(value),
            None => self.parse_value(value),
        }
    }

    /// Serialize a resolved value for the response.
    pub fn serialize(&self, value: ConstValue) -> Result<ConstValue> {
        match &self.serialize {
            Some(serialize) => serialize(value),
            None => Ok(value),
        }
    }
}

/// A declared enum value.
#[derive(Clone, Debug)]
pub struct MetaEnumValue {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<String>,
    /// The internal representation resolvers trade in, when it differs
    /// from the name itself.
    pub value: Option<ConstValue>,
}

impl MetaEnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        MetaEnumValue {
            name: name.into(),
            description: None,
            deprecation: None,
            value: None,
        }
    }

    #[must_use]
    pub fn mapped_to(mut self, value: ConstValue) -> Self {
        self.value = Some(value);
        self
    }
}

/// An enum type.
#[derive(Clone, Debug, Default)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub enum_values: IndexMap<String, MetaEnumValue>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        EnumType {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn value(self, name: impl Into<String>) -> Self {
        self.value_def(MetaEnumValue::new(name))
    }

    #[must_use]
    pub fn value_def(mut self, value: MetaEnumValue) -> Self {
        self.enum_values.insert(value.name.clone(), value);
        self
    }

    /// Look up a declared value by name.
    pub fn enum_value(&self, name: &str) -> Option<&MetaEnumValue> {
        self.enum_values.get(name)
    }

    /// The internal value a name coerces to: its mapping when one is
    /// declared, the name itself otherwise.
    pub fn coerce_name(&self, name: &str) -> Option<ConstValue> {
        let value = self.enum_values.get(name)?;
        Some(
            value
                .value
                .clone()
                .unwrap_or_else(|| ConstValue::Enum(value.name.as_str().into())),
        )
    }

    /// The declared name a resolved value serializes back to.
    pub fn name_for_value(&self, value: &ConstValue) -> Option<&str> {
        let as_name = match value {
            ConstValue::Enum(name) => Some(name.as_str()),
            ConstValue::String(name) => Some(name.as_str()),
            _ => None,
        };
        if let Some(name) = as_name {
            if let Some(declared) = self.enum_values.get(name) {
                if declared.value.is_none() {
                    return Some(&declared.name);
                }
            }
        }
        self.enum_values
            .values()
            .find(|declared| declared.value.as_ref() == Some(value))
            .map(|declared| declared.name.as_str())
    }
}

/// A field on an object or interface type.
#[derive(Clone)]
pub struct MetaField {
    pub name: String,
    pub description: Option<String>,
    pub args: IndexMap<String, MetaInputValue>,
    pub ty: MetaFieldType,
    pub deprecation: Option<String>,
    pub resolver: Option<ResolverFn>,
    pub subscribe: Option<SubscribeFn>,
}

impl MetaField {
    pub fn new(name: impl Into<String>, ty: impl Into<MetaFieldType>) -> Self {
        MetaField {
            name: name.into(),
            description: None,
            args: IndexMap::new(),
            ty: ty.into(),
            deprecation: None,
            resolver: None,
            subscribe: None,
        }
    }

    #[must_use]
    pub fn argument(mut self, argument: MetaInputValue) -> Self {
        self.args.insert(argument.name.clone(), argument);
        self
    }

    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation = Some(reason.into());
        self
    }

    #[must_use]
    pub fn resolver(
        mut self,
        f: impl for<'a> Fn(crate::context::ResolverContext<'a>) -> FieldFuture<'a>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn subscribe(
        mut self,
        f: impl for<'a> Fn(
                crate::context::ResolverContext<'a>,
            ) -> Result<futures_util::stream::BoxStream<'a, Result<ConstValue>>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.subscribe = Some(Arc::new(f));
        self
    }
}

impl Debug for MetaField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaField")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// An argument or input-object field.
#[derive(Clone, Debug)]
pub struct MetaInputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: MetaFieldType,
    pub default_value: Option<ConstValue>,
}

impl MetaInputValue {
    pub fn new(name: impl Into<String>, ty: impl Into<MetaFieldType>) -> Self {
        MetaInputValue {
            name: name.into(),
            description: None,
            ty: ty.into(),
            default_value: None,
        }
    }

    #[must_use]
    pub fn default_value(mut self, value: ConstValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// An object type.
#[derive(Clone, Default)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, MetaField>,
    pub implements: IndexSet<String>,
    pub is_type_of: Option<IsTypeOfFn>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectType {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn field(mut self, field: MetaField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn implement(mut self, interface: impl Into<String>) -> Self {
        self.implements.insert(interface.into());
        self
    }

    #[must_use]
    pub fn is_type_of(mut self, f: impl Fn(&ConstValue) -> bool + Send + Sync + 'static) -> Self {
        self.is_type_of = Some(Arc::new(f));
        self
    }
}

/// An interface type.
#[derive(Clone, Default)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, MetaField>,
    pub resolve_type: Option<ResolveTypeFn>,
}

impl InterfaceType {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceType {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn field(mut self, field: MetaField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&ConstValue) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

/// A union type.
#[derive(Clone, Default)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub members: IndexSet<String>,
    pub resolve_type: Option<ResolveTypeFn>,
}

impl UnionType {
    pub fn new(name: impl Into<String>) -> Self {
        UnionType {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn member(mut self, member: impl Into<String>) -> Self {
        self.members.insert(member.into());
        self
    }

    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&ConstValue) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

/// An input object type.
#[derive(Clone, Debug, Default)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub input_fields: IndexMap<String, MetaInputValue>,
}

impl InputObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        InputObjectType {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn input_field(mut self, field: MetaInputValue) -> Self {
        self.input_fields.insert(field.name.clone(), field);
        self
    }
}

/// A type in the registry.
#[derive(Clone)]
pub enum MetaType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl MetaType {
    pub fn name(&self) -> &str {
        match self {
            MetaType::Scalar(ty) => &ty.name,
            MetaType::Object(ty) => &ty.name,
            MetaType::Interface(ty) => &ty.name,
            MetaType::Union(ty) => &ty.name,
            MetaType::Enum(ty) => &ty.name,
            MetaType::InputObject(ty) => &ty.name,
        }
    }

    /// The field map, for object and interface types.
    pub fn fields(&self) -> Option<&IndexMap<String, MetaField>> {
        match self {
            MetaType::Object(ty) => Some(&ty.fields),
            MetaType::Interface(ty) => Some(&ty.fields),
            _ => None,
        }
    }

    /// Look up a field by name on an object or interface type.
    pub fn field(&self, name: &str) -> Option<&MetaField> {
        self.fields().and_then(|fields| fields.get(name))
    }

    /// The input field map, for input object types.
    pub fn input_fields(&self) -> Option<&IndexMap<String, MetaInputValue>> {
        match self {
            MetaType::InputObject(ty) => Some(&ty.input_fields),
            _ => None,
        }
    }

    /// Object, interface or union.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            MetaType::Object(_) | MetaType::Interface(_) | MetaType::Union(_)
        )
    }

    /// Interface or union.
    pub fn is_abstract(&self) -> bool {
        matches!(self, MetaType::Interface(_) | MetaType::Union(_))
    }

    /// Scalar or enum.
    pub fn is_leaf(&self) -> bool {
        matches!(self, MetaType::Scalar(_) | MetaType::Enum(_))
    }

    /// Scalar, enum or input object: usable as an input type.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::InputObject(_)
        )
    }
}

impl Debug for MetaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = match self {
            MetaType::Scalar(_) => "Scalar",
            MetaType::Object(_) => "Object",
            MetaType::Interface(_) => "Interface",
            MetaType::Union(_) => "Union",
            MetaType::Enum(_) => "Enum",
            MetaType::InputObject(_) => "InputObject",
        };
        write!(f, "{kind}({})", self.name())
    }
}

macro_rules! impl_from_meta_type {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(impl From<$ty> for MetaType {
            fn from(ty: $ty) -> MetaType {
                MetaType::$variant(ty)
            }
        })+
    };
}

impl_from_meta_type! {
    Scalar => ScalarType,
    Object => ObjectType,
    Interface => InterfaceType,
    Union => UnionType,
    Enum => EnumType,
    InputObject => InputObjectType,
}

/// Where a directive may be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    FieldDefinition,
    EnumValue,
    InputFieldDefinition,
    ArgumentDefinition,
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
            DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
            DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
        })
    }
}

/// A declared directive.
#[derive(Clone, Debug)]
pub struct MetaDirective {
    pub name: String,
    pub description: Option<String>,
    pub locations: Vec<DirectiveLocation>,
    pub args: IndexMap<String, MetaInputValue>,
    pub is_repeatable: bool,
}

impl MetaDirective {
    pub fn new(name: impl Into<String>) -> Self {
        MetaDirective {
            name: name.into(),
            description: None,
            locations: Vec::new(),
            args: IndexMap::new(),
            is_repeatable: false,
        }
    }

    #[must_use]
    pub fn location(mut self, location: DirectiveLocation) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: MetaInputValue) -> Self {
        self.args.insert(argument.name.clone(), argument);
        self
    }

    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.is_repeatable = true;
        self
    }
}

/// An error raised while building a [`Registry`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("type `{0}` is registered more than once")]
    DuplicateType(String),
    #[error("root type `{0}` is not registered")]
    UnknownRootType(String),
    #[error("root type `{0}` must be an object type")]
    RootNotObject(String),
    #[error("`{container}.{member}` references unknown type `{target}`")]
    UnknownMemberType {
        container: String,
        member: String,
        target: String,
    },
    #[error("union `{union}` member `{member}` must be an object type")]
    UnionMemberNotObject { union: String, member: String },
    #[error("`{object}` implements `{interface}`, which is not an interface type")]
    NotAnInterface { object: String, interface: String },
}

/// The built, immutable schema.
pub struct Registry {
    pub types: IndexMap<String, MetaType>,
    pub directives: IndexMap<String, MetaDirective>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    /// Abstract type name to concrete object type names, in declaration
    /// order.
    possible_types: HashMap<String, IndexSet<String>>,
    typename_field: MetaField,
    schema_field: MetaField,
    type_field: MetaField,
}

impl Registry {
    pub fn builder(query_type: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder {
            types: Vec::new(),
            directives: Vec::new(),
            query_type: query_type.into(),
            mutation_type: None,
            subscription_type: None,
        }
    }

    /// Look up a named type.
    pub fn lookup_type(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    /// Resolve a wrapped type to its innermost named type.
    pub fn lookup(&self, ty: &MetaFieldType) -> Option<&MetaType> {
        self.lookup_type(ty.named_type())
    }

    /// The root type for an operation kind.
    pub fn root_type(&self, operation_type: OperationType) -> Option<&MetaType> {
        self.root_type_name(operation_type)
            .and_then(|name| self.types.get(name))
    }

    pub fn root_type_name(&self, operation_type: OperationType) -> Option<&str> {
        match operation_type {
            OperationType::Query => Some(&self.query_type),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }
    }

    /// The query root. Guaranteed present by [`RegistryBuilder::build`].
    pub fn query_type(&self) -> &MetaType {
        &self.types[self.query_type.as_str()]
    }

    pub fn query_type_name(&self) -> &str {
        &self.query_type
    }

    /// Look up a declared directive.
    pub fn directive(&self, name: &str) -> Option<&MetaDirective> {
        self.directives.get(name)
    }

    /// The concrete object types an abstract type can resolve to.
    pub fn possible_types(&self, abstract_type: &str) -> Option<&IndexSet<String>> {
        self.possible_types.get(abstract_type)
    }

    /// Whether `ty` is a concrete member of `abstract_type`.
    pub fn is_sub_type(&self, abstract_type: &str, ty: &str) -> bool {
        self.possible_types
            .get(abstract_type)
            .is_some_and(|possible| possible.contains(ty))
    }

    /// Whether two composite types can both apply to some object: used to
    /// decide fragment spread compatibility.
    pub fn types_overlap(&self, a: &MetaType, b: &MetaType) -> bool {
        if a.name() == b.name() {
            return true;
        }
        let concrete = |ty: &MetaType| -> IndexSet<String> {
            if ty.is_abstract() {
                self.possible_types(ty.name()).cloned().unwrap_or_default()
            } else {
                IndexSet::from([ty.name().to_string()])
            }
        };
        let a = concrete(a);
        concrete(b).iter().any(|name| a.contains(name))
    }

    /// The `__typename` meta field, available on any composite type.
    pub fn typename_field(&self) -> &MetaField {
        &self.typename_field
    }

    /// The `__schema` meta field, available on the query root.
    pub fn schema_field(&self) -> &MetaField {
        &self.schema_field
    }

    /// The `__type` meta field, available on the query root.
    pub fn type_field(&self) -> &MetaField {
        &self.type_field
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("query_type", &self.query_type)
            .field("mutation_type", &self.mutation_type)
            .field("subscription_type", &self.subscription_type)
            .finish_non_exhaustive()
    }
}

/// Fluent construction of a [`Registry`].
pub struct RegistryBuilder {
    types: Vec<MetaType>,
    directives: Vec<MetaDirective>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn register(mut self, ty: impl Into<MetaType>) -> Self {
        self.types.push(ty.into());
        self
    }

    #[must_use]
    pub fn register_directive(mut self, directive: MetaDirective) -> Self {
        self.directives.push(directive);
        self
    }

    #[must_use]
    pub fn mutation_type(mut self, name: impl Into<String>) -> Self {
        self.mutation_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn subscription_type(mut self, name: impl Into<String>) -> Self {
        self.subscription_type = Some(name.into());
        self
    }

    pub fn build(self) -> Result<Registry, SchemaError> {
        let mut types: IndexMap<String, MetaType> = IndexMap::new();
        for ty in self.types {
            if types.contains_key(ty.name()) {
                return Err(SchemaError::DuplicateType(ty.name().to_string()));
            }
            types.insert(ty.name().to_string(), ty);
        }
        for scalar in scalars::builtin_scalars() {
            if !types.contains_key(&scalar.name) {
                types.insert(scalar.name.clone(), MetaType::Scalar(scalar));
            }
        }

        let mut directives: IndexMap<String, MetaDirective> = IndexMap::new();
        for directive in self.directives {
            directives.insert(directive.name.clone(), directive);
        }
        for directive in builtin_directives() {
            if !directives.contains_key(&directive.name) {
                directives.insert(directive.name.clone(), directive);
            }
        }

        for root in [Some(&self.query_type), self.mutation_type.as_ref(), self.subscription_type.as_ref()]
            .into_iter()
            .flatten()
        {
            match types.get(root.as_str()) {
                None => return Err(SchemaError::UnknownRootType(root.clone())),
                Some(MetaType::Object(_)) => {}
                Some(_) => return Err(SchemaError::RootNotObject(root.clone())),
            }
        }

        check_references(&types, &directives)?;

        let mut possible_types: HashMap<String, IndexSet<String>> = HashMap::new();
        for ty in types.values() {
            match ty {
                MetaType::Object(object) => {
                    for interface in &object.implements {
                        match types.get(interface.as_str()) {
                            Some(MetaType::Interface(_)) => {}
                            _ => {
                                return Err(SchemaError::NotAnInterface {
                                    object: object.name.clone(),
                                    interface: interface.clone(),
                                });
                            }
                        }
                        possible_types
                            .entry(interface.clone())
                            .or_default()
                            .insert(object.name.clone());
                    }
                }
                MetaType::Union(union) => {
                    for member in &union.members {
                        match types.get(member.as_str()) {
                            Some(MetaType::Object(_)) => {}
                            _ => {
                                return Err(SchemaError::UnionMemberNotObject {
                                    union: union.name.clone(),
                                    member: member.clone(),
                                });
                            }
                        }
                        possible_types
                            .entry(union.name.clone())
                            .or_default()
                            .insert(member.clone());
                    }
                }
                _ => {}
            }
        }
        // Interfaces and unions nobody implements still answer possible-type
        // queries with an empty set.
        for ty in types.values() {
            if ty.is_abstract() {
                possible_types.entry(ty.name().to_string()).or_default();
            }
        }

        Ok(Registry {
            types,
            directives,
            query_type: self.query_type,
            mutation_type: self.mutation_type,
            subscription_type: self.subscription_type,
            possible_types,
            typename_field: MetaField::new("__typename", "String!"),
            schema_field: MetaField::new("__schema", "__Schema!"),
            type_field: MetaField::new("__type", "__Type")
                .argument(MetaInputValue::new("name", "String!")),
        })
    }
}

fn check_references(
    types: &IndexMap<String, MetaType>,
    directives: &IndexMap<String, MetaDirective>,
) -> Result<(), SchemaError> {
    let check = |container: &str, member: &str, ty: &MetaFieldType| {
        // The introspection meta types are external collaborators; fields
        // referencing them are declared but never resolved here.
        let target = ty.named_type();
        if types.contains_key(target) || target.starts_with("__") {
            Ok(())
        } else {
            Err(SchemaError::UnknownMemberType {
                container: container.to_string(),
                member: member.to_string(),
                target: target.to_string(),
            })
        }
    };

    for ty in types.values() {
        if let Some(fields) = ty.fields() {
            for field in fields.values() {
                check(ty.name(), &field.name, &field.ty)?;
                for argument in field.args.values() {
                    check(ty.name(), &argument.name, &argument.ty)?;
                }
            }
        }
        if let Some(input_fields) = ty.input_fields() {
            for field in input_fields.values() {
                check(ty.name(), &field.name, &field.ty)?;
            }
        }
    }
    for directive in directives.values() {
        for argument in directive.args.values() {
            check(&directive.name, &argument.name, &argument.ty)?;
        }
    }
    Ok(())
}

fn builtin_directives() -> Vec<MetaDirective> {
    vec![
        MetaDirective::new("skip")
            .location(DirectiveLocation::Field)
            .location(DirectiveLocation::FragmentSpread)
            .location(DirectiveLocation::InlineFragment)
            .argument(MetaInputValue::new("if", "Boolean!")),
        MetaDirective::new("include")
            .location(DirectiveLocation::Field)
            .location(DirectiveLocation::FragmentSpread)
            .location(DirectiveLocation::InlineFragment)
            .argument(MetaInputValue::new("if", "Boolean!")),
        MetaDirective::new("deprecated")
            .location(DirectiveLocation::FieldDefinition)
            .location(DirectiveLocation::ArgumentDefinition)
            .location(DirectiveLocation::InputFieldDefinition)
            .location(DirectiveLocation::EnumValue)
            .argument(
                MetaInputValue::new("reason", "String")
                    .default_value(ConstValue::String("No longer supported".into())),
            ),
    ]
}
