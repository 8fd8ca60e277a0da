//! The validation walk.
//!
//! Rules are [`Visitor`]s chained into a cons list; [`visit`] walks the
//! document once, bracketing every dispatch with the [`TypeInfo`]
//! transitions so each rule observes the schema context of the node it is
//! handed. [`VisitorContext`] owns the error sink and the memoized
//! fragment and variable analyses rules share.

use std::{collections::HashMap, rc::Rc};

use engine_value::{ConstValue, Name, Value};
use fnv::FnvHashMap;

use crate::{
    ast::{
        Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
        InlineFragment, OperationDefinition, Pos, Positioned, Selection, SelectionSet,
        VariableDefinition,
    },
    error::ServerError,
    registry::{MetaField, MetaFieldType, MetaType, Registry},
    validation::type_info::{TypeInfo, VisitNode},
};

/// One occurrence of a variable, with the input type and default value the
/// position expects.
#[derive(Clone)]
pub struct VariableUsage<'a> {
    pub name: &'a Name,
    pub pos: Pos,
    pub ty: Option<MetaFieldType>,
    pub default_value: Option<ConstValue>,
}

/// Shared state of one validation walk.
pub struct VisitorContext<'a> {
    /// `None` for the AST-only (SDL) layer.
    pub registry: Option<&'a Registry>,
    pub document: &'a Document,
    pub errors: Vec<ServerError>,
    type_info: Option<TypeInfo<'a>>,
    fragments: HashMap<&'a str, &'a Positioned<FragmentDefinition>>,
    fragment_spreads_cache: FnvHashMap<usize, Rc<Vec<&'a Positioned<FragmentSpread>>>>,
    referenced_fragments_cache: FnvHashMap<usize, Rc<Vec<&'a Positioned<FragmentDefinition>>>>,
    variable_usages_cache: FnvHashMap<usize, Rc<Vec<VariableUsage<'a>>>>,
    max_errors: usize,
    aborted: bool,
}

impl<'a> VisitorContext<'a> {
    pub fn new(registry: Option<&'a Registry>, document: &'a Document, max_errors: usize) -> Self {
        VisitorContext {
            registry,
            document,
            errors: Vec::new(),
            type_info: registry.map(TypeInfo::new),
            fragments: document
                .fragments()
                .map(|fragment| (fragment.node.name.node.as_str(), fragment))
                .collect(),
            fragment_spreads_cache: FnvHashMap::default(),
            referenced_fragments_cache: FnvHashMap::default(),
            variable_usages_cache: FnvHashMap::default(),
            max_errors,
            aborted: false,
        }
    }

    /// Report a violation. Once the sink holds `max_errors` entries, one
    /// terminal error is appended and the walk stops delivering nodes.
    pub fn report_error(&mut self, locations: Vec<Pos>, message: impl Into<String>) {
        if self.aborted {
            return;
        }
        if self.errors.len() >= self.max_errors {
            self.aborted = true;
            self.errors.push(ServerError::new(
                "Too many validation errors, error limit reached. Validation aborted.",
                None,
            ));
            return;
        }
        let mut error = ServerError::new(message, None);
        error.locations = locations;
        self.errors.push(error);
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Look up a fragment definition by name.
    pub fn fragment(&self, name: &str) -> Option<&'a Positioned<FragmentDefinition>> {
        self.fragments.get(name).copied()
    }

    // TypeInfo accessors. All of them answer `None` on the AST-only layer.

    /// The declared (possibly wrapped) output type at the current node.
    pub fn current_type(&self) -> Option<MetaFieldType> {
        self.type_info.as_ref()?.current_type().cloned()
    }

    /// The named type behind [`Self::current_type`].
    pub fn current_named_type(&self) -> Option<&'a MetaType> {
        self.type_info.as_ref()?.current_named_type()
    }

    /// The composite type enclosing the current selection.
    pub fn parent_type(&self) -> Option<&'a MetaType> {
        self.type_info.as_ref()?.parent_type()
    }

    /// The field definition of the current field selection.
    pub fn current_field(&self) -> Option<&'a MetaField> {
        self.type_info.as_ref()?.current_field()
    }

    /// The expected input type at the current node.
    pub fn current_input_type(&self) -> Option<MetaFieldType> {
        self.type_info.as_ref()?.current_input_type().cloned()
    }

    /// The fragment spreads anywhere under a selection set, in depth-first
    /// document order. Memoized by node identity.
    pub fn fragment_spreads(
        &mut self,
        selection_set: &'a Positioned<SelectionSet>,
    ) -> Rc<Vec<&'a Positioned<FragmentSpread>>> {
        let key = std::ptr::from_ref(selection_set) as usize;
        if let Some(spreads) = self.fragment_spreads_cache.get(&key) {
            return Rc::clone(spreads);
        }
        let mut spreads = Vec::new();
        collect_fragment_spreads(selection_set, &mut spreads);
        let spreads = Rc::new(spreads);
        self.fragment_spreads_cache.insert(key, Rc::clone(&spreads));
        spreads
    }

    /// The fragments transitively reachable from an operation, deduplicated
    /// by name, in discovery order. Memoized by node identity.
    pub fn recursively_referenced_fragments(
        &mut self,
        operation: &'a Positioned<OperationDefinition>,
    ) -> Rc<Vec<&'a Positioned<FragmentDefinition>>> {
        let key = std::ptr::from_ref(operation) as usize;
        if let Some(fragments) = self.referenced_fragments_cache.get(&key) {
            return Rc::clone(fragments);
        }

        let mut fragments = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut pending = vec![&operation.node.selection_set];
        while let Some(selection_set) = pending.pop() {
            for spread in self.fragment_spreads(selection_set).iter() {
                let name = spread.node.fragment_name.node.as_str();
                if seen.insert(name) {
                    if let Some(fragment) = self.fragment(name) {
                        fragments.push(fragment);
                        pending.push(&fragment.node.selection_set);
                    }
                }
            }
        }

        let fragments = Rc::new(fragments);
        self.referenced_fragments_cache
            .insert(key, Rc::clone(&fragments));
        fragments
    }

    /// The variable usages directly under an operation, excluding its
    /// variable definitions. Memoized by node identity.
    pub fn variable_usages_of_operation(
        &mut self,
        operation: &'a Positioned<OperationDefinition>,
    ) -> Rc<Vec<VariableUsage<'a>>> {
        let key = std::ptr::from_ref(operation) as usize;
        if let Some(usages) = self.variable_usages_cache.get(&key) {
            return Rc::clone(usages);
        }
        let usages = Rc::new(match self.registry {
            Some(registry) => {
                let mut info = TypeInfo::new(registry);
                let mut usages = Vec::new();
                info.enter(VisitNode::OperationDefinition(operation));
                collect_usages_from_directives(&mut info, &operation.node.directives, &mut usages);
                collect_usages_from_selection_set(
                    &mut info,
                    &operation.node.selection_set,
                    &mut usages,
                );
                usages
            }
            None => Vec::new(),
        });
        self.variable_usages_cache.insert(key, Rc::clone(&usages));
        usages
    }

    /// The variable usages directly under a fragment definition.
    pub fn variable_usages_of_fragment(
        &mut self,
        fragment: &'a Positioned<FragmentDefinition>,
    ) -> Rc<Vec<VariableUsage<'a>>> {
        let key = std::ptr::from_ref(fragment) as usize;
        if let Some(usages) = self.variable_usages_cache.get(&key) {
            return Rc::clone(usages);
        }
        let usages = Rc::new(match self.registry {
            Some(registry) => {
                let mut info = TypeInfo::new(registry);
                let mut usages = Vec::new();
                info.enter(VisitNode::FragmentDefinition(fragment));
                collect_usages_from_directives(&mut info, &fragment.node.directives, &mut usages);
                collect_usages_from_selection_set(
                    &mut info,
                    &fragment.node.selection_set,
                    &mut usages,
                );
                usages
            }
            None => Vec::new(),
        });
        self.variable_usages_cache.insert(key, Rc::clone(&usages));
        usages
    }

    /// The operation's own variable usages plus those of every recursively
    /// referenced fragment.
    pub fn recursive_variable_usages(
        &mut self,
        operation: &'a Positioned<OperationDefinition>,
    ) -> Vec<VariableUsage<'a>> {
        let mut usages: Vec<VariableUsage<'a>> =
            self.variable_usages_of_operation(operation).as_ref().clone();
        let fragments = self.recursively_referenced_fragments(operation);
        for fragment in fragments.iter().copied() {
            usages.extend(self.variable_usages_of_fragment(fragment).iter().cloned());
        }
        usages
    }

    pub(crate) fn type_info_enter(&mut self, node: VisitNode<'a>) {
        if let Some(info) = &mut self.type_info {
            info.enter(node);
        }
    }

    pub(crate) fn type_info_leave(&mut self, node: VisitNode<'a>) {
        if let Some(info) = &mut self.type_info {
            info.leave(node);
        }
    }
}

fn collect_fragment_spreads<'a>(
    selection_set: &'a Positioned<SelectionSet>,
    spreads: &mut Vec<&'a Positioned<FragmentSpread>>,
) {
    for selection in &selection_set.node.items {
        match &selection.node {
            Selection::FragmentSpread(spread) => spreads.push(spread),
            Selection::Field(field) => collect_fragment_spreads(&field.node.selection_set, spreads),
            Selection::InlineFragment(fragment) => {
                collect_fragment_spreads(&fragment.node.selection_set, spreads);
            }
        }
    }
}

fn collect_usages_from_selection_set<'a>(
    info: &mut TypeInfo<'a>,
    selection_set: &'a Positioned<SelectionSet>,
    usages: &mut Vec<VariableUsage<'a>>,
) {
    info.enter(VisitNode::SelectionSet(selection_set));
    for selection in &selection_set.node.items {
        match &selection.node {
            Selection::Field(field) => {
                info.enter(VisitNode::Field(field));
                for (name, value) in &field.node.arguments {
                    info.enter(VisitNode::Argument(&name.node));
                    collect_usages_from_value(info, &value.node, value.pos, usages);
                    info.leave(VisitNode::Argument(&name.node));
                }
                collect_usages_from_directives(info, &field.node.directives, usages);
                if !field.node.selection_set.node.is_empty() {
                    collect_usages_from_selection_set(info, &field.node.selection_set, usages);
                }
                info.leave(VisitNode::Field(field));
            }
            Selection::FragmentSpread(spread) => {
                collect_usages_from_directives(info, &spread.node.directives, usages);
            }
            Selection::InlineFragment(fragment) => {
                info.enter(VisitNode::InlineFragment(fragment));
                collect_usages_from_directives(info, &fragment.node.directives, usages);
                collect_usages_from_selection_set(info, &fragment.node.selection_set, usages);
                info.leave(VisitNode::InlineFragment(fragment));
            }
        }
    }
    info.leave(VisitNode::SelectionSet(selection_set));
}

fn collect_usages_from_directives<'a>(
    info: &mut TypeInfo<'a>,
    directives: &'a [Positioned<Directive>],
    usages: &mut Vec<VariableUsage<'a>>,
) {
    for directive in directives {
        info.enter(VisitNode::Directive(directive));
        for (name, value) in &directive.node.arguments {
            info.enter(VisitNode::Argument(&name.node));
            collect_usages_from_value(info, &value.node, value.pos, usages);
            info.leave(VisitNode::Argument(&name.node));
        }
        info.leave(VisitNode::Directive(directive));
    }
}

fn collect_usages_from_value<'a>(
    info: &mut TypeInfo<'a>,
    value: &'a Value,
    pos: Pos,
    usages: &mut Vec<VariableUsage<'a>>,
) {
    match value {
        Value::Variable(name) => usages.push(VariableUsage {
            name,
            pos,
            ty: info.current_input_type().cloned(),
            default_value: info.current_default_value().cloned(),
        }),
        Value::List(items) => {
            info.enter(VisitNode::ListValue);
            for item in items {
                collect_usages_from_value(info, item, pos, usages);
            }
            info.leave(VisitNode::ListValue);
        }
        Value::Object(map) => {
            for (name, item) in map {
                info.enter(VisitNode::ObjectField(name));
                collect_usages_from_value(info, item, pos, usages);
                info.leave(VisitNode::ObjectField(name));
            }
        }
        _ => {}
    }
}

/// A validation rule: a visitor observing the walk through the shared
/// context. Every method defaults to "not interested".
#[allow(unused_variables)]
pub trait Visitor<'a> {
    fn enter_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {}
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {}

    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
    }
    fn exit_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
    }
    fn exit_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        definition: &'a Positioned<VariableDefinition>,
    ) {
    }
    fn exit_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        definition: &'a Positioned<VariableDefinition>,
    ) {
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
    }
    fn exit_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
    }

    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
    }
    fn exit_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
    }

    fn enter_selection_set(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        selection_set: &'a Positioned<SelectionSet>,
    ) {
    }
    fn exit_selection_set(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        selection_set: &'a Positioned<SelectionSet>,
    ) {
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {}
    fn exit_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {}

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        spread: &'a Positioned<FragmentSpread>,
    ) {
    }
    fn exit_fragment_spread(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        spread: &'a Positioned<FragmentSpread>,
    ) {
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<InlineFragment>,
    ) {
    }
    fn exit_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<InlineFragment>,
    ) {
    }
}

/// The empty rule list.
pub struct VisitorNil;

impl VisitorNil {
    pub const fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

impl<'a> Visitor<'a> for VisitorNil {}

/// A rule prepended to a rule list.
pub struct VisitorCons<A, B>(A, B);

impl<A, B> VisitorCons<A, B> {
    pub const fn with<V>(self, visitor: V) -> VisitorCons<V, Self> {
        VisitorCons(visitor, self)
    }
}

macro_rules! delegate {
    ($($method:ident($($arg:ident: $ty:ty),*)),+ $(,)?) => {
        $(fn $method(&mut self, ctx: &mut VisitorContext<'a>, $($arg: $ty),*) {
            self.0.$method(ctx, $($arg),*);
            self.1.$method(ctx, $($arg),*);
        })+
    };
}

impl<'a, A: Visitor<'a>, B: Visitor<'a>> Visitor<'a> for VisitorCons<A, B> {
    delegate! {
        enter_document(doc: &'a Document),
        exit_document(doc: &'a Document),
        enter_operation_definition(operation: &'a Positioned<OperationDefinition>),
        exit_operation_definition(operation: &'a Positioned<OperationDefinition>),
        enter_fragment_definition(fragment: &'a Positioned<FragmentDefinition>),
        exit_fragment_definition(fragment: &'a Positioned<FragmentDefinition>),
        enter_variable_definition(definition: &'a Positioned<VariableDefinition>),
        exit_variable_definition(definition: &'a Positioned<VariableDefinition>),
        enter_directive(directive: &'a Positioned<Directive>),
        exit_directive(directive: &'a Positioned<Directive>),
        enter_argument(name: &'a Positioned<Name>, value: &'a Positioned<Value>),
        exit_argument(name: &'a Positioned<Name>, value: &'a Positioned<Value>),
        enter_selection_set(selection_set: &'a Positioned<SelectionSet>),
        exit_selection_set(selection_set: &'a Positioned<SelectionSet>),
        enter_field(field: &'a Positioned<Field>),
        exit_field(field: &'a Positioned<Field>),
        enter_fragment_spread(spread: &'a Positioned<FragmentSpread>),
        exit_fragment_spread(spread: &'a Positioned<FragmentSpread>),
        enter_inline_fragment(fragment: &'a Positioned<InlineFragment>),
        exit_inline_fragment(fragment: &'a Positioned<InlineFragment>),
    }
}

/// Walk the document once, delivering every node to `v` with the TypeInfo
/// transitions wrapped around each dispatch.
pub fn visit<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
    v.enter_document(ctx, doc);
    for definition in &doc.definitions {
        if ctx.is_aborted() {
            break;
        }
        match definition {
            Definition::Operation(operation) => visit_operation(v, ctx, operation),
            Definition::Fragment(fragment) => visit_fragment(v, ctx, fragment),
            // Type-system definitions have no executable children; rules
            // that care inspect them from `enter_document`.
            Definition::TypeSystem(_) => {}
        }
    }
    v.exit_document(ctx, doc);
}

fn visit_operation<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    operation: &'a Positioned<OperationDefinition>,
) {
    ctx.type_info_enter(VisitNode::OperationDefinition(operation));
    v.enter_operation_definition(ctx, operation);
    for definition in &operation.node.variable_definitions {
        ctx.type_info_enter(VisitNode::VariableDefinition(definition));
        v.enter_variable_definition(ctx, definition);
        v.exit_variable_definition(ctx, definition);
        ctx.type_info_leave(VisitNode::VariableDefinition(definition));
    }
    visit_directives(v, ctx, &operation.node.directives);
    visit_selection_set(v, ctx, &operation.node.selection_set);
    v.exit_operation_definition(ctx, operation);
    ctx.type_info_leave(VisitNode::OperationDefinition(operation));
}

fn visit_fragment<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    fragment: &'a Positioned<FragmentDefinition>,
) {
    ctx.type_info_enter(VisitNode::FragmentDefinition(fragment));
    v.enter_fragment_definition(ctx, fragment);
    visit_directives(v, ctx, &fragment.node.directives);
    visit_selection_set(v, ctx, &fragment.node.selection_set);
    v.exit_fragment_definition(ctx, fragment);
    ctx.type_info_leave(VisitNode::FragmentDefinition(fragment));
}

fn visit_selection_set<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    selection_set: &'a Positioned<SelectionSet>,
) {
    ctx.type_info_enter(VisitNode::SelectionSet(selection_set));
    v.enter_selection_set(ctx, selection_set);
    for selection in &selection_set.node.items {
        if ctx.is_aborted() {
            break;
        }
        match &selection.node {
            Selection::Field(field) => visit_field(v, ctx, field),
            Selection::FragmentSpread(spread) => {
                v.enter_fragment_spread(ctx, spread);
                visit_directives(v, ctx, &spread.node.directives);
                v.exit_fragment_spread(ctx, spread);
            }
            Selection::InlineFragment(fragment) => {
                ctx.type_info_enter(VisitNode::InlineFragment(fragment));
                v.enter_inline_fragment(ctx, fragment);
                visit_directives(v, ctx, &fragment.node.directives);
                visit_selection_set(v, ctx, &fragment.node.selection_set);
                v.exit_inline_fragment(ctx, fragment);
                ctx.type_info_leave(VisitNode::InlineFragment(fragment));
            }
        }
    }
    v.exit_selection_set(ctx, selection_set);
    ctx.type_info_leave(VisitNode::SelectionSet(selection_set));
}

fn visit_field<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    field: &'a Positioned<Field>,
) {
    ctx.type_info_enter(VisitNode::Field(field));
    v.enter_field(ctx, field);
    visit_arguments(v, ctx, &field.node.arguments);
    visit_directives(v, ctx, &field.node.directives);
    if !field.node.selection_set.node.is_empty() {
        visit_selection_set(v, ctx, &field.node.selection_set);
    }
    v.exit_field(ctx, field);
    ctx.type_info_leave(VisitNode::Field(field));
}

fn visit_directives<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    directives: &'a [Positioned<Directive>],
) {
    for directive in directives {
        ctx.type_info_enter(VisitNode::Directive(directive));
        v.enter_directive(ctx, directive);
        visit_arguments(v, ctx, &directive.node.arguments);
        v.exit_directive(ctx, directive);
        ctx.type_info_leave(VisitNode::Directive(directive));
    }
}

fn visit_arguments<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    arguments: &'a [(Positioned<Name>, Positioned<Value>)],
) {
    for (name, value) in arguments {
        ctx.type_info_enter(VisitNode::Argument(&name.node));
        v.enter_argument(ctx, name, value);
        v.exit_argument(ctx, name, value);
        ctx.type_info_leave(VisitNode::Argument(&name.node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_harness::{parse, test_registry};

    #[test]
    fn fragment_spreads_are_found_depth_first_and_memoized() {
        let registry = test_registry();
        let document = parse(
            r#"
            {
                dog { ...A ... on Dog { ...B } }
                cat { ...C }
            }
            fragment A on Dog { name }
            fragment B on Dog { nickname }
            fragment C on Cat { name }
            "#,
        );
        let operation = document.operations().next().unwrap();
        let mut ctx = VisitorContext::new(Some(&registry), &document, 100);

        let spreads = ctx.fragment_spreads(&operation.node.selection_set);
        let names: Vec<_> = spreads
            .iter()
            .map(|spread| spread.node.fragment_name.node.as_str())
            .collect();
        assert_eq!(names, ["A", "B", "C"]);

        // Same node, same cached list.
        let again = ctx.fragment_spreads(&operation.node.selection_set);
        assert!(Rc::ptr_eq(&spreads, &again));
    }

    #[test]
    fn recursively_referenced_fragments_deduplicate_by_name() {
        let registry = test_registry();
        let document = parse(
            r#"
            { dog { ...A ...B } }
            fragment A on Dog { ...Shared }
            fragment B on Dog { ...Shared }
            fragment Shared on Dog { name }
            "#,
        );
        let operation = document.operations().next().unwrap();
        let mut ctx = VisitorContext::new(Some(&registry), &document, 100);

        let fragments = ctx.recursively_referenced_fragments(operation);
        let mut names: Vec<_> = fragments
            .iter()
            .map(|fragment| fragment.node.name.node.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["A", "B", "Shared"]);
    }

    #[test]
    fn variable_usages_carry_types_and_skip_definitions() {
        let registry = test_registry();
        let document = parse(
            r#"
            query ($atOtherHomes: Boolean = true) {
                dog {
                    isHousetrained(atOtherHomes: $atOtherHomes)
                    name @include(if: $cond)
                }
            }
            "#,
        );
        let operation = document.operations().next().unwrap();
        let mut ctx = VisitorContext::new(Some(&registry), &document, 100);

        let usages = ctx.variable_usages_of_operation(operation);
        let summary: Vec<_> = usages
            .iter()
            .map(|usage| {
                (
                    usage.name.as_str(),
                    usage.ty.as_ref().map(|ty| ty.as_str().to_string()),
                    usage.default_value.clone(),
                )
            })
            .collect();
        // The declaration itself contributes nothing; the argument position
        // carries the argument's declared type and default.
        assert_eq!(
            summary,
            [
                (
                    "atOtherHomes",
                    Some("Boolean".to_string()),
                    Some(ConstValue::Boolean(true)),
                ),
                ("cond", Some("Boolean!".to_string()), None),
            ]
        );

        let again = ctx.variable_usages_of_operation(operation);
        assert!(Rc::ptr_eq(&usages, &again));
    }
}
