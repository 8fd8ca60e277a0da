//! Type-aware traversal state.
//!
//! [`TypeInfo`] rides along with a document walk and answers "what does
//! the schema say about the node we are standing on": the current output
//! type, the enclosing composite type, the expected input type, the field
//! definition, argument, default value and enum value. The walk driver
//! calls [`TypeInfo::enter`] before dispatching a node and
//! [`TypeInfo::leave`] after; pushes and pops are symmetric and driven
//! solely by node kind.

use engine_value::{ConstValue, Name};

use crate::{
    ast::{
        Directive, Field, FragmentDefinition, InlineFragment, OperationDefinition, Positioned,
        SelectionSet, TypeCondition, VariableDefinition,
    },
    registry::{
        MetaDirective, MetaEnumValue, MetaField, MetaFieldType, MetaInputValue, MetaType,
        MetaTypeName, Registry,
    },
};

/// A borrowed view of the node kinds [`TypeInfo`] reacts to.
#[derive(Clone, Copy)]
pub enum VisitNode<'a> {
    SelectionSet(&'a Positioned<SelectionSet>),
    Field(&'a Positioned<Field>),
    Directive(&'a Positioned<Directive>),
    OperationDefinition(&'a Positioned<OperationDefinition>),
    InlineFragment(&'a Positioned<InlineFragment>),
    FragmentDefinition(&'a Positioned<FragmentDefinition>),
    VariableDefinition(&'a Positioned<VariableDefinition>),
    Argument(&'a Name),
    ListValue,
    ObjectField(&'a Name),
    EnumValue(&'a Name),
}

pub struct TypeInfo<'a> {
    registry: &'a Registry,
    type_stack: Vec<Option<MetaFieldType>>,
    parent_type_stack: Vec<Option<&'a MetaType>>,
    input_type_stack: Vec<Option<MetaFieldType>>,
    field_def_stack: Vec<Option<&'a MetaField>>,
    default_value_stack: Vec<Option<ConstValue>>,
    directive: Option<&'a MetaDirective>,
    argument: Option<&'a MetaInputValue>,
    enum_value: Option<&'a MetaEnumValue>,
}

impl<'a> TypeInfo<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        TypeInfo {
            registry,
            type_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            field_def_stack: Vec::new(),
            default_value_stack: Vec::new(),
            directive: None,
            argument: None,
            enum_value: None,
        }
    }

    /// The declared (possibly wrapped) output type at this point.
    pub fn current_type(&self) -> Option<&MetaFieldType> {
        self.type_stack.last().and_then(Option::as_ref)
    }

    /// The named type behind [`Self::current_type`].
    pub fn current_named_type(&self) -> Option<&'a MetaType> {
        self.current_type().and_then(|ty| self.registry.lookup(ty))
    }

    /// The composite type enclosing the current selection.
    pub fn parent_type(&self) -> Option<&'a MetaType> {
        self.parent_type_stack.last().copied().flatten()
    }

    /// The expected (possibly wrapped) input type at this point.
    pub fn current_input_type(&self) -> Option<&MetaFieldType> {
        self.input_type_stack.last().and_then(Option::as_ref)
    }

    /// The field definition the current field selection resolved to.
    pub fn current_field(&self) -> Option<&'a MetaField> {
        self.field_def_stack.last().copied().flatten()
    }

    /// The default value declared for the current input position.
    pub fn current_default_value(&self) -> Option<&ConstValue> {
        self.default_value_stack.last().and_then(Option::as_ref)
    }

    pub fn current_directive(&self) -> Option<&'a MetaDirective> {
        self.directive
    }

    pub fn current_argument(&self) -> Option<&'a MetaInputValue> {
        self.argument
    }

    pub fn current_enum_value(&self) -> Option<&'a MetaEnumValue> {
        self.enum_value
    }

    pub fn enter(&mut self, node: VisitNode<'a>) {
        match node {
            VisitNode::SelectionSet(_) => {
                let parent = self.current_named_type().filter(|ty| ty.is_composite());
                self.parent_type_stack.push(parent);
            }
            VisitNode::Field(field) => {
                let field_def = self
                    .parent_type()
                    .and_then(|parent| get_field_def(self.registry, parent, &field.node.name.node));
                self.field_def_stack.push(field_def);
                self.type_stack.push(field_def.map(|def| def.ty.clone()));
            }
            VisitNode::Directive(directive) => {
                self.directive = self.registry.directive(&directive.node.name.node);
            }
            VisitNode::OperationDefinition(operation) => {
                let root = self
                    .registry
                    .root_type_name(operation.node.ty)
                    .map(MetaFieldType::from);
                self.type_stack.push(root);
            }
            VisitNode::InlineFragment(fragment) => {
                self.enter_fragment(fragment.node.type_condition.as_ref());
            }
            VisitNode::FragmentDefinition(fragment) => {
                self.enter_fragment(Some(&fragment.node.type_condition));
            }
            VisitNode::VariableDefinition(definition) => {
                let ty = MetaFieldType::from(&definition.node.var_type.node);
                let ty = self
                    .registry
                    .lookup_type(ty.named_type())
                    .is_some_and(MetaType::is_input)
                    .then_some(ty);
                self.input_type_stack.push(ty);
            }
            VisitNode::Argument(name) => {
                let arg_def = match self.directive {
                    Some(directive) => directive.args.get(name.as_str()),
                    None => self
                        .current_field()
                        .and_then(|field| field.args.get(name.as_str())),
                };
                self.argument = arg_def;
                self.default_value_stack
                    .push(arg_def.and_then(|def| def.default_value.clone()));
                self.input_type_stack
                    .push(arg_def.map(|def| def.ty.clone()).filter(|ty| {
                        self.registry
                            .lookup_type(ty.named_type())
                            .is_some_and(MetaType::is_input)
                    }));
            }
            VisitNode::ListValue => {
                let item = self.current_input_type().map(|ty| {
                    let nullable = ty.as_str().strip_suffix('!').unwrap_or(ty.as_str());
                    match MetaTypeName::create(nullable) {
                        MetaTypeName::List(item) => MetaFieldType::from(item),
                        _ => MetaFieldType::from(nullable),
                    }
                });
                self.default_value_stack.push(None);
                self.input_type_stack.push(item);
            }
            VisitNode::ObjectField(name) => {
                let field_def = self
                    .current_input_type()
                    .and_then(|ty| self.registry.lookup(ty))
                    .and_then(|meta| meta.input_fields())
                    .and_then(|fields| fields.get(name.as_str()));
                self.default_value_stack
                    .push(field_def.and_then(|def| def.default_value.clone()));
                self.input_type_stack
                    .push(field_def.map(|def| def.ty.clone()));
            }
            VisitNode::EnumValue(name) => {
                self.enum_value = match self
                    .current_input_type()
                    .and_then(|ty| self.registry.lookup(ty))
                {
                    Some(MetaType::Enum(enum_type)) => enum_type.enum_value(name.as_str()),
                    _ => None,
                };
            }
        }
    }

    pub fn leave(&mut self, node: VisitNode<'a>) {
        match node {
            VisitNode::SelectionSet(_) => {
                self.parent_type_stack.pop();
            }
            VisitNode::Field(_) => {
                self.field_def_stack.pop();
                self.type_stack.pop();
            }
            VisitNode::Directive(_) => {
                self.directive = None;
            }
            VisitNode::OperationDefinition(_)
            | VisitNode::InlineFragment(_)
            | VisitNode::FragmentDefinition(_) => {
                self.type_stack.pop();
            }
            VisitNode::VariableDefinition(_) => {
                self.input_type_stack.pop();
            }
            VisitNode::Argument(_) => {
                self.argument = None;
                self.default_value_stack.pop();
                self.input_type_stack.pop();
            }
            VisitNode::ListValue | VisitNode::ObjectField(_) => {
                self.default_value_stack.pop();
                self.input_type_stack.pop();
            }
            VisitNode::EnumValue(_) => {
                self.enum_value = None;
            }
        }
    }

    fn enter_fragment(&mut self, condition: Option<&'a Positioned<TypeCondition>>) {
        let ty = match condition {
            Some(condition) => self
                .registry
                .lookup_type(condition.node.on.node.as_str())
                .filter(|meta| !matches!(meta, MetaType::InputObject(_)))
                .map(|meta| MetaFieldType::from(meta.name())),
            None => self
                .current_named_type()
                .map(|meta| MetaFieldType::from(meta.name())),
        };
        self.type_stack.push(ty);
    }
}

/// Field definition lookup with the meta-field rules: `__schema` and
/// `__type` resolve only on the query root, `__typename` on any composite
/// parent.
pub(crate) fn get_field_def<'a>(
    registry: &'a Registry,
    parent: &'a MetaType,
    name: &str,
) -> Option<&'a MetaField> {
    let is_query_root = parent.name() == registry.query_type_name();
    match name {
        "__schema" if is_query_root => Some(registry.schema_field()),
        "__type" if is_query_root => Some(registry.type_field()),
        "__typename" if parent.is_composite() => Some(registry.typename_field()),
        _ => parent.field(name),
    }
}
