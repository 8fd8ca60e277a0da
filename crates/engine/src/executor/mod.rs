//! Operation execution.

pub(crate) mod collect;
mod resolve;
mod subscription;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use engine_value::{ConstValue, Variables};
use futures_util::FutureExt;

use crate::{
    ast::{Document, OperationDefinition, OperationType, Positioned},
    context::{Data, ExecutionContext},
    error::ServerError,
    input_coercion::coerce_variable_values,
    registry::{Registry, ResolveTypeFn, ResolverFn},
    response::Response,
};

pub use resolve::{default_field_resolver, default_type_resolver};
pub use subscription::subscribe;

static NULL_ROOT: ConstValue = ConstValue::Null;

/// Everything [`execute`] needs. Build one with [`ExecutionArgs::new`] and
/// fill in the optional pieces.
pub struct ExecutionArgs<'a> {
    pub registry: &'a Registry,
    pub document: &'a Document,
    pub operation_name: Option<&'a str>,
    pub variable_values: Variables,
    pub root_value: Option<&'a ConstValue>,
    /// Request-scoped data handed to every resolver.
    pub context_data: Option<&'a Data>,
    /// Fallback resolver for fields without one of their own.
    pub field_resolver: Option<ResolverFn>,
    /// Fallback for abstract types without a `resolve_type` of their own.
    pub type_resolver: Option<ResolveTypeFn>,
}

impl<'a> ExecutionArgs<'a> {
    pub fn new(registry: &'a Registry, document: &'a Document) -> Self {
        ExecutionArgs {
            registry,
            document,
            operation_name: None,
            variable_values: Variables::default(),
            root_value: None,
            context_data: None,
            field_resolver: None,
            type_resolver: None,
        }
    }
}

/// Execute an operation against the schema.
///
/// Pre-execution failures (unknown operation, variable coercion, missing
/// root type) return a response without a `data` key; execution failures
/// are collected per field with null propagation.
pub async fn execute(args: ExecutionArgs<'_>) -> Response {
    let operation = match select_operation(args.document, args.operation_name) {
        Ok(operation) => operation,
        Err(response) => return response,
    };

    let variables =
        match coerce_variable_values(args.registry, operation, &args.variable_values) {
            Ok(variables) => variables,
            Err(errors) => return Response::from_errors(errors),
        };

    let Some(root_type) = args.registry.root_type(operation.node.ty) else {
        return Response::from_errors(ServerError::new(
            format!(
                "Schema is not configured to execute {} operation.",
                operation.node.ty
            ),
            Some(operation.pos),
        ));
    };

    let root_value = args.root_value.unwrap_or(&NULL_ROOT);
    let ctx = ExecutionContext::new(
        args.registry,
        operation,
        fragment_map(args.document),
        variables,
        root_value,
        args.context_data,
        args.field_resolver,
        args.type_resolver,
    );

    let groups = match collect::collect_fields(&ctx, root_type, &operation.node.selection_set) {
        Ok(groups) => groups,
        Err(error) => return Response::from_errors(error),
    };

    tracing::debug!(
        operation = %operation.node.ty,
        root_fields = groups.len(),
        "executing operation"
    );

    let data = match operation.node.ty {
        OperationType::Mutation => {
            resolve::execute_fields_serial(&ctx, root_type, root_value, &groups).await
        }
        _ => resolve::execute_fields(&ctx, root_type, root_value, &groups, None).await,
    };

    let mut errors = ctx.take_errors();
    match data {
        Ok(data) => Response {
            data: Some(data),
            errors,
        },
        // A non-null root field failed; the whole response data is null.
        Err(error) => {
            errors.push(error);
            Response {
                data: Some(ConstValue::Null),
                errors,
            }
        }
    }
}

/// Execute an operation that is expected to finish synchronously. Fails
/// with a single error if any resolver suspends.
pub fn execute_sync(args: ExecutionArgs<'_>) -> Response {
    match execute(args).now_or_never() {
        Some(response) => response,
        None => Response::from_errors(ServerError::new(
            "Execution suspended on an asynchronous resolver; use `execute` instead.",
            None,
        )),
    }
}

pub(crate) fn fragment_map(
    document: &Document,
) -> HashMap<&str, &Positioned<crate::ast::FragmentDefinition>> {
    document
        .fragments()
        .map(|fragment| (fragment.node.name.node.as_str(), fragment))
        .collect()
}

pub(crate) fn select_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<&'a Positioned<OperationDefinition>, Response> {
    match operation_name {
        Some(name) => document
            .operations()
            .find(|operation| {
                operation
                    .node
                    .name
                    .as_ref()
                    .is_some_and(|op_name| op_name.node == name)
            })
            .ok_or_else(|| {
                Response::from_errors(ServerError::new(
                    format!("Unknown operation named \"{name}\"."),
                    None,
                ))
            }),
        None => {
            let mut operations = document.operations();
            match (operations.next(), operations.next()) {
                (Some(operation), None) => Ok(operation),
                (None, _) => Err(Response::from_errors(ServerError::new(
                    "Must provide an operation.",
                    None,
                ))),
                (Some(_), Some(_)) => Err(Response::from_errors(ServerError::new(
                    "Must provide operation name if query contains multiple operations.",
                    None,
                ))),
            }
        }
    }
}
