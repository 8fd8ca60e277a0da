//! Fixtures for rule tests: the pet-shop registry every rule test runs
//! against, and a converter from `graphql-parser` output into this
//! crate's AST so tests can be written as query strings.

use engine_value::{ConstValue, Name, Number, Value};
use graphql_parser::query as q;

use crate::{
    ast::{
        BaseType, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
        InlineFragment, OperationDefinition, OperationType, Pos, Positioned, Selection,
        SelectionSet, Type, TypeCondition, VariableDefinition,
    },
    error::ServerError,
    registry::{
        EnumType, InputObjectType, InterfaceType, MetaField, MetaInputValue, ObjectType, Registry,
        UnionType,
    },
    validation::{visit, Visitor, VisitorContext, DEFAULT_MAX_ERRORS},
};

/// Run a single rule against the test registry and expect no errors.
macro_rules! expect_passes_rule {
    ($rule:expr, $query:expr $(,)?) => {{
        let registry = crate::validation::test_harness::test_registry();
        let document = crate::validation::test_harness::parse($query);
        let errors =
            crate::validation::test_harness::validate_with(&registry, &document, $rule);
        assert!(
            errors.is_empty(),
            "expected the rule to pass, but it reported:\n{errors:#?}"
        );
    }};
}

/// Run a single rule against the test registry and hand back the errors
/// it reported.
macro_rules! expect_fails_rule {
    ($rule:expr, $query:expr $(,)?) => {{
        let registry = crate::validation::test_harness::test_registry();
        let document = crate::validation::test_harness::parse($query);
        let errors =
            crate::validation::test_harness::validate_with(&registry, &document, $rule);
        assert!(!errors.is_empty(), "expected the rule to fail, but it passed");
        errors
    }};
}

pub(crate) fn validate_with<'a, V: Visitor<'a>>(
    registry: &'a Registry,
    document: &'a Document,
    mut rule: V,
) -> Vec<ServerError> {
    let mut ctx = VisitorContext::new(Some(registry), document, DEFAULT_MAX_ERRORS);
    visit(&mut rule, &mut ctx, document);
    ctx.errors
}

/// The validation-suite schema: pets, humans, aliens and a type that
/// exists to exercise argument coercion.
pub(crate) fn test_registry() -> Registry {
    let named_field = || {
        MetaField::new("name", "String").argument(MetaInputValue::new("surname", "Boolean"))
    };

    Registry::builder("Query")
        .mutation_type("Mutation")
        .subscription_type("Subscription")
        .register(InterfaceType::new("Being").field(named_field()))
        .register(InterfaceType::new("Pet").field(named_field()))
        .register(
            EnumType::new("DogCommand")
                .value("SIT")
                .value("DOWN")
                .value("HEEL"),
        )
        .register(
            EnumType::new("FurColor")
                .value("BROWN")
                .value("BLACK")
                .value("TAN")
                .value("SPOTTED"),
        )
        .register(
            ObjectType::new("Dog")
                .implement("Being")
                .implement("Pet")
                .field(named_field())
                .field(MetaField::new("nickname", "String"))
                .field(MetaField::new("barkVolume", "Int"))
                .field(MetaField::new("barks", "Boolean"))
                .field(
                    MetaField::new("doesKnowCommand", "Boolean")
                        .argument(MetaInputValue::new("dogCommand", "DogCommand")),
                )
                .field(
                    MetaField::new("isHousetrained", "Boolean").argument(
                        MetaInputValue::new("atOtherHomes", "Boolean")
                            .default_value(ConstValue::Boolean(true)),
                    ),
                )
                .field(
                    MetaField::new("isAtLocation", "Boolean")
                        .argument(MetaInputValue::new("x", "Int"))
                        .argument(MetaInputValue::new("y", "Int")),
                ),
        )
        .register(
            ObjectType::new("Cat")
                .implement("Being")
                .implement("Pet")
                .field(named_field())
                .field(MetaField::new("nickname", "String"))
                .field(MetaField::new("meows", "Boolean"))
                .field(MetaField::new("meowVolume", "Int"))
                .field(MetaField::new("furColor", "FurColor")),
        )
        .register(UnionType::new("CatOrDog").member("Dog").member("Cat"))
        .register(
            ObjectType::new("Human")
                .implement("Being")
                .field(named_field())
                .field(MetaField::new("pets", "[Pet]"))
                .field(MetaField::new("relatives", "[Human]"))
                .field(MetaField::new("iq", "Int")),
        )
        .register(
            ObjectType::new("Alien")
                .implement("Being")
                .field(named_field())
                .field(MetaField::new("iq", "Int"))
                .field(MetaField::new("numEyes", "Int")),
        )
        .register(UnionType::new("DogOrHuman").member("Dog").member("Human"))
        .register(UnionType::new("HumanOrAlien").member("Human").member("Alien"))
        .register(
            InputObjectType::new("ComplexInput")
                .input_field(MetaInputValue::new("requiredField", "Boolean!"))
                .input_field(MetaInputValue::new("intField", "Int"))
                .input_field(MetaInputValue::new("stringField", "String"))
                .input_field(MetaInputValue::new("booleanField", "Boolean"))
                .input_field(MetaInputValue::new("stringListField", "[String]")),
        )
        .register(
            ObjectType::new("ComplicatedArgs")
                .field(
                    MetaField::new("intArgField", "String")
                        .argument(MetaInputValue::new("intArg", "Int")),
                )
                .field(
                    MetaField::new("nonNullIntArgField", "String")
                        .argument(MetaInputValue::new("nonNullIntArg", "Int!")),
                )
                .field(
                    MetaField::new("stringArgField", "String")
                        .argument(MetaInputValue::new("stringArg", "String")),
                )
                .field(
                    MetaField::new("booleanArgField", "String")
                        .argument(MetaInputValue::new("booleanArg", "Boolean")),
                )
                .field(
                    MetaField::new("enumArgField", "String")
                        .argument(MetaInputValue::new("enumArg", "FurColor")),
                )
                .field(
                    MetaField::new("floatArgField", "String")
                        .argument(MetaInputValue::new("floatArg", "Float")),
                )
                .field(
                    MetaField::new("idArgField", "String")
                        .argument(MetaInputValue::new("idArg", "ID")),
                )
                .field(
                    MetaField::new("stringListArgField", "String")
                        .argument(MetaInputValue::new("stringListArg", "[String]")),
                )
                .field(
                    MetaField::new("complexArgField", "String")
                        .argument(MetaInputValue::new("complexArg", "ComplexInput")),
                )
                .field(
                    MetaField::new("multipleReqs", "String")
                        .argument(MetaInputValue::new("req1", "Int!"))
                        .argument(MetaInputValue::new("req2", "Int!")),
                )
                .field(
                    MetaField::new("multipleOpts", "String")
                        .argument(
                            MetaInputValue::new("opt1", "Int")
                                .default_value(ConstValue::Number(0.into())),
                        )
                        .argument(
                            MetaInputValue::new("opt2", "Int")
                                .default_value(ConstValue::Number(0.into())),
                        ),
                ),
        )
        .register(
            ObjectType::new("Query")
                .field(MetaField::new("human", "Human").argument(MetaInputValue::new("id", "ID")))
                .field(MetaField::new("alien", "Alien"))
                .field(MetaField::new("dog", "Dog"))
                .field(MetaField::new("cat", "Cat"))
                .field(MetaField::new("pet", "Pet"))
                .field(MetaField::new("catOrDog", "CatOrDog"))
                .field(MetaField::new("dogOrHuman", "DogOrHuman"))
                .field(MetaField::new("humanOrAlien", "HumanOrAlien"))
                .field(MetaField::new("complicatedArgs", "ComplicatedArgs")),
        )
        .register(
            ObjectType::new("Mutation").field(
                MetaField::new("testInput", "Int")
                    .argument(MetaInputValue::new("input", "ComplexInput")),
            ),
        )
        .register(
            ObjectType::new("Subscription")
                .field(MetaField::new("newMessage", "String"))
                .field(MetaField::new("disallowedSecondRootField", "Boolean")),
        )
        .build()
        .expect("the test registry is valid")
}

/// Parse a test query with `graphql-parser` and convert it into the
/// crate's own AST.
pub(crate) fn parse(source: &str) -> Document {
    let document =
        graphql_parser::parse_query::<String>(source).expect("test document must parse");
    convert_document(&document)
}

fn convert_document(document: &q::Document<'_, String>) -> Document {
    Document {
        definitions: document
            .definitions
            .iter()
            .map(|definition| match definition {
                q::Definition::Operation(operation) => {
                    Definition::Operation(convert_operation(operation))
                }
                q::Definition::Fragment(fragment) => {
                    Definition::Fragment(convert_fragment(fragment))
                }
            })
            .collect(),
    }
}

fn pos(position: graphql_parser::Pos) -> Pos {
    Pos::new(position.line, position.column)
}

fn name(value: &str, position: graphql_parser::Pos) -> Positioned<Name> {
    Positioned::new(Name::new(value), pos(position))
}

fn convert_operation(
    operation: &q::OperationDefinition<'_, String>,
) -> Positioned<OperationDefinition> {
    let (ty, position, op_name, variable_definitions, directives, selection_set) = match operation {
        q::OperationDefinition::SelectionSet(set) => (
            OperationType::Query,
            set.span.0,
            None,
            &[][..],
            &[][..],
            set,
        ),
        q::OperationDefinition::Query(query) => (
            OperationType::Query,
            query.position,
            query.name.as_deref(),
            &query.variable_definitions[..],
            &query.directives[..],
            &query.selection_set,
        ),
        q::OperationDefinition::Mutation(mutation) => (
            OperationType::Mutation,
            mutation.position,
            mutation.name.as_deref(),
            &mutation.variable_definitions[..],
            &mutation.directives[..],
            &mutation.selection_set,
        ),
        q::OperationDefinition::Subscription(subscription) => (
            OperationType::Subscription,
            subscription.position,
            subscription.name.as_deref(),
            &subscription.variable_definitions[..],
            &subscription.directives[..],
            &subscription.selection_set,
        ),
    };
    Positioned::new(
        OperationDefinition {
            ty,
            name: op_name.map(|op_name| name(op_name, position)),
            variable_definitions: variable_definitions
                .iter()
                .map(convert_variable_definition)
                .collect(),
            directives: directives.iter().map(convert_directive).collect(),
            selection_set: convert_selection_set(selection_set),
        },
        pos(position),
    )
}

fn convert_variable_definition(
    definition: &q::VariableDefinition<'_, String>,
) -> Positioned<VariableDefinition> {
    Positioned::new(
        VariableDefinition {
            name: name(&definition.name, definition.position),
            var_type: Positioned::new(convert_type(&definition.var_type), pos(definition.position)),
            default_value: definition.default_value.as_ref().map(|value| {
                Positioned::new(
                    convert_value(value)
                        .into_const()
                        .expect("variable defaults are const"),
                    pos(definition.position),
                )
            }),
        },
        pos(definition.position),
    )
}

fn convert_type(ty: &q::Type<'_, String>) -> Type {
    match ty {
        q::Type::NamedType(type_name) => Type {
            base: BaseType::Named(Name::new(type_name)),
            nullable: true,
        },
        q::Type::ListType(item) => Type {
            base: BaseType::List(Box::new(convert_type(item))),
            nullable: true,
        },
        q::Type::NonNullType(inner) => Type {
            nullable: false,
            ..convert_type(inner)
        },
    }
}

fn convert_selection_set(selection_set: &q::SelectionSet<'_, String>) -> Positioned<SelectionSet> {
    Positioned::new(
        SelectionSet {
            items: selection_set
                .items
                .iter()
                .map(|selection| {
                    Positioned::new(
                        match selection {
                            q::Selection::Field(field) => Selection::Field(convert_field(field)),
                            q::Selection::FragmentSpread(spread) => Selection::FragmentSpread(
                                Positioned::new(
                                    FragmentSpread {
                                        fragment_name: name(&spread.fragment_name, spread.position),
                                        directives: spread
                                            .directives
                                            .iter()
                                            .map(convert_directive)
                                            .collect(),
                                    },
                                    pos(spread.position),
                                ),
                            ),
                            q::Selection::InlineFragment(fragment) => Selection::InlineFragment(
                                Positioned::new(
                                    InlineFragment {
                                        type_condition: fragment.type_condition.as_ref().map(
                                            |condition| {
                                                convert_type_condition(condition, fragment.position)
                                            },
                                        ),
                                        directives: fragment
                                            .directives
                                            .iter()
                                            .map(convert_directive)
                                            .collect(),
                                        selection_set: convert_selection_set(
                                            &fragment.selection_set,
                                        ),
                                    },
                                    pos(fragment.position),
                                ),
                            ),
                        },
                        match selection {
                            q::Selection::Field(field) => pos(field.position),
                            q::Selection::FragmentSpread(spread) => pos(spread.position),
                            q::Selection::InlineFragment(fragment) => pos(fragment.position),
                        },
                    )
                })
                .collect(),
        },
        pos(selection_set.span.0),
    )
}

fn convert_field(field: &q::Field<'_, String>) -> Positioned<Field> {
    Positioned::new(
        Field {
            alias: field
                .alias
                .as_ref()
                .map(|alias| name(alias, field.position)),
            name: name(&field.name, field.position),
            arguments: field
                .arguments
                .iter()
                .map(|(arg_name, value)| {
                    (
                        name(arg_name, field.position),
                        Positioned::new(convert_value(value), pos(field.position)),
                    )
                })
                .collect(),
            directives: field.directives.iter().map(convert_directive).collect(),
            selection_set: convert_selection_set(&field.selection_set),
        },
        pos(field.position),
    )
}

fn convert_fragment(
    fragment: &q::FragmentDefinition<'_, String>,
) -> Positioned<FragmentDefinition> {
    Positioned::new(
        FragmentDefinition {
            name: name(&fragment.name, fragment.position),
            type_condition: convert_type_condition(&fragment.type_condition, fragment.position),
            directives: fragment.directives.iter().map(convert_directive).collect(),
            selection_set: convert_selection_set(&fragment.selection_set),
        },
        pos(fragment.position),
    )
}

fn convert_type_condition(
    condition: &q::TypeCondition<'_, String>,
    position: graphql_parser::Pos,
) -> Positioned<TypeCondition> {
    let q::TypeCondition::On(on) = condition;
    Positioned::new(
        TypeCondition {
            on: name(on, position),
        },
        pos(position),
    )
}

fn convert_directive(directive: &q::Directive<'_, String>) -> Positioned<Directive> {
    Positioned::new(
        Directive {
            name: name(&directive.name, directive.position),
            arguments: directive
                .arguments
                .iter()
                .map(|(arg_name, value)| {
                    (
                        name(arg_name, directive.position),
                        Positioned::new(convert_value(value), pos(directive.position)),
                    )
                })
                .collect(),
        },
        pos(directive.position),
    )
}

fn convert_value(value: &q::Value<'_, String>) -> Value {
    match value {
        q::Value::Variable(variable) => Value::Variable(Name::new(variable)),
        q::Value::Int(int) => Value::Number(Number::from(int.as_i64().unwrap_or_default())),
        q::Value::Float(float) => Number::from_f64(*float)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        q::Value::String(string) => Value::String(string.clone()),
        q::Value::Boolean(boolean) => Value::Boolean(*boolean),
        q::Value::Null => Value::Null,
        q::Value::Enum(enum_name) => Value::Enum(Name::new(enum_name)),
        q::Value::List(items) => Value::List(items.iter().map(convert_value).collect()),
        q::Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(field_name, value)| (Name::new(field_name), convert_value(value)))
                .collect(),
        ),
    }
}
