//! Execution context.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    sync::Mutex,
};

use engine_value::{ConstValue, Name, Variables};
use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::{
    ast::{Field, FragmentDefinition, OperationDefinition, OperationType, Positioned},
    error::ServerError,
    query_path::ResponsePath,
    registry::{MetaField, MetaType, Registry, ResolveTypeFn, ResolverFn},
};

/// Request-scoped data, keyed by type.
///
/// This is the "context value" resolvers receive: store anything inside it
/// and read it back with [`ResolverContext::data`].
#[derive(Default)]
pub struct Data(FnvHashMap<TypeId, Box<dyn Any + Send + Sync>>);

impl Data {
    /// Insert data, replacing any previous value of the same type.
    pub fn insert<D: Any + Send + Sync>(&mut self, data: D) {
        self.0.insert(TypeId::of::<D>(), Box::new(data));
    }

    /// Get data of the given type, if present.
    pub fn get<D: Any + Send + Sync>(&self) -> Option<&D> {
        self.0
            .get(&TypeId::of::<D>())
            .and_then(|data| data.downcast_ref::<D>())
    }
}

impl Debug for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Data").finish()
    }
}

/// Everything one execution needs, bundled once up front.
///
/// The schema and document are borrowed and immutable for the lifetime of
/// the execution; the only mutation is appending to the error buffer, and
/// only the executor loop does that.
pub struct ExecutionContext<'a> {
    pub registry: &'a Registry,
    pub operation: &'a Positioned<OperationDefinition>,
    pub fragments: HashMap<&'a str, &'a Positioned<FragmentDefinition>>,
    /// Coerced variable values.
    pub variables: Variables,
    pub root_value: &'a ConstValue,
    pub data: Option<&'a Data>,
    /// Fallback resolver for fields without one of their own.
    pub field_resolver: Option<ResolverFn>,
    /// Fallback for abstract types without a `resolve_type` of their own.
    pub type_resolver: Option<ResolveTypeFn>,
    errors: Mutex<Vec<ServerError>>,
}

impl<'a> ExecutionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: &'a Registry,
        operation: &'a Positioned<OperationDefinition>,
        fragments: HashMap<&'a str, &'a Positioned<FragmentDefinition>>,
        variables: Variables,
        root_value: &'a ConstValue,
        data: Option<&'a Data>,
        field_resolver: Option<ResolverFn>,
        type_resolver: Option<ResolveTypeFn>,
    ) -> Self {
        ExecutionContext {
            registry,
            operation,
            fragments,
            variables,
            root_value,
            data,
            field_resolver,
            type_resolver,
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation.node.ty
    }

    /// Look up a fragment definition by name.
    pub fn fragment(&self, name: &str) -> Option<&'a Positioned<FragmentDefinition>> {
        self.fragments.get(name).copied()
    }

    /// The coerced value of a variable, if set.
    pub fn var_value(&self, name: &str) -> Option<&ConstValue> {
        self.variables.get(name)
    }

    /// Record a field error. Never blocks: the lock is only ever taken for
    /// the duration of a push.
    pub fn add_error(&self, error: ServerError) {
        self.errors.lock().expect("error buffer poisoned").push(error);
    }

    /// Take all recorded errors, leaving the buffer empty. Used once per
    /// execution, and once per payload for subscriptions.
    pub fn take_errors(&self) -> Vec<ServerError> {
        std::mem::take(&mut *self.errors.lock().expect("error buffer poisoned"))
    }
}

/// What a field resolver gets to see.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    pub ctx: &'a ExecutionContext<'a>,
    /// The value the parent resolver produced.
    pub parent_value: &'a ConstValue,
    /// Coerced argument values.
    pub args: &'a IndexMap<Name, ConstValue>,
    /// Every field node sharing this response key, document order.
    pub field_nodes: &'a [&'a Positioned<Field>],
    pub field_definition: &'a MetaField,
    pub parent_type: &'a MetaType,
    /// Path to the field being resolved; root fields already carry their
    /// own segment.
    pub path: &'a ResponsePath<'a>,
}

impl<'a> ResolverContext<'a> {
    /// The primary field node: the first one collected under the response
    /// key. Collection guarantees there is at least one.
    pub fn field(&self) -> &'a Positioned<Field> {
        self.field_nodes[0]
    }

    pub fn field_name(&self) -> &'a str {
        &self.field_definition.name
    }

    /// A coerced argument value.
    pub fn arg(&self, name: &str) -> Option<&'a ConstValue> {
        self.args.get(name)
    }

    /// Request-scoped data of the given type.
    pub fn data<D: Any + Send + Sync>(&self) -> Option<&'a D> {
        self.ctx.data.and_then(Data::get::<D>)
    }
}
