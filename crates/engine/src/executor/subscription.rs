//! Subscription execution.
//!
//! The single root field's `subscribe` hook produces the source stream of
//! event payloads; each payload is then executed as the root value of the
//! operation's selection set, yielding one response per event. Dropping
//! the mapped stream drops the source with it, so a consumer that stops
//! early closes the source exactly once.

use engine_value::ConstValue;
use futures_util::{stream::BoxStream, StreamExt};

use crate::{
    ast::OperationType,
    context::{ExecutionContext, ResolverContext},
    error::ServerError,
    executor::{collect, fragment_map, resolve, select_operation, ExecutionArgs, NULL_ROOT},
    query_path::{ResponsePath, ResponsePathSegment},
    response::Response,
};

/// Subscribe to an operation, producing a stream of responses.
///
/// Failures before the source stream exists (unknown operation, variable
/// coercion, missing root type, no subscribe hook) are returned as a
/// plain response instead of a stream.
pub fn subscribe<'a>(args: ExecutionArgs<'a>) -> Result<BoxStream<'a, Response>, Box<Response>> {
    let operation = match select_operation(args.document, args.operation_name) {
        Ok(operation) => operation,
        Err(response) => return Err(Box::new(response)),
    };
    if operation.node.ty != OperationType::Subscription {
        return Err(Box::new(Response::from_errors(ServerError::new(
            "Subscription operation expected.",
            Some(operation.pos),
        ))));
    }

    let variables = match crate::input_coercion::coerce_variable_values(
        args.registry,
        operation,
        &args.variable_values,
    ) {
        Ok(variables) => variables,
        Err(errors) => return Err(Box::new(Response::from_errors(errors))),
    };

    let Some(root_type) = args.registry.root_type(OperationType::Subscription) else {
        return Err(Box::new(Response::from_errors(ServerError::new(
            "Schema is not configured to execute subscription operation.",
            Some(operation.pos),
        ))));
    };

    let registry = args.registry;
    let document = args.document;
    let root_value = args.root_value.unwrap_or(&NULL_ROOT);

    let stream = async_stream::stream! {
        let ctx = ExecutionContext::new(
            registry,
            operation,
            fragment_map(document),
            variables,
            root_value,
            args.context_data,
            args.field_resolver,
            args.type_resolver,
        );

        let groups = match collect::collect_fields(&ctx, root_type, &operation.node.selection_set)
        {
            Ok(groups) => groups,
            Err(error) => {
                yield Response::from_errors(error);
                return;
            }
        };
        // Validated up front by SingleFieldSubscriptions; a stray document
        // still gets a clean error here.
        let single = match groups.first() {
            Some((key, fields)) if groups.len() == 1 => Some((key, fields.as_slice())),
            _ => None,
        };
        let Some((response_key, fields)) = single else {
            yield Response::from_errors(ServerError::new(
                "Subscription operations must select exactly one top level field.",
                Some(operation.pos),
            ));
            return;
        };
        let field = fields[0];
        let field_name = field.node.name.node.as_str();

        let Some(field_def) = root_type.field(field_name) else {
            yield Response::from_errors(ServerError::new(
                format!(
                    "The subscription field \"{field_name}\" is not defined.",
                ),
                Some(field.pos),
            ));
            return;
        };
        let Some(subscribe) = &field_def.subscribe else {
            yield Response::from_errors(ServerError::new(
                format!(
                    "Subscription field \"{field_name}\" has no subscribe resolver.",
                ),
                Some(field.pos),
            ));
            return;
        };

        let coerced_args = match crate::input_coercion::coerce_argument_values(
            ctx.registry,
            &field_def.args,
            &field.node.arguments,
            &ctx.variables,
            field.pos,
        ) {
            Ok(args) => args,
            Err(error) => {
                yield Response::from_errors(error);
                return;
            }
        };

        let path = ResponsePath::new(ResponsePathSegment::Field(response_key.as_str()));
        let resolver_ctx = ResolverContext {
            ctx: &ctx,
            parent_value: ctx.root_value,
            args: &coerced_args,
            field_nodes: fields,
            field_definition: field_def,
            parent_type: root_type,
            path: &path,
        };
        let mut source = match subscribe(resolver_ctx) {
            Ok(source) => source,
            Err(error) => {
                yield Response::from_errors(
                    error.into_server_error(field.pos).with_path(path.to_vec()),
                );
                return;
            }
        };

        tracing::debug!(field = field_name, "subscription source stream opened");

        while let Some(event) = source.next().await {
            match event {
                Ok(payload) => {
                    yield execute_event(&ctx, root_type, &groups, payload).await;
                }
                // A failing source terminates the subscription; breaking
                // out drops the source stream, which is the one and only
                // close.
                Err(error) => {
                    yield Response::from_errors(
                        error.into_server_error(field.pos).with_path(path.to_vec()),
                    );
                    break;
                }
            }
        }
    };

    Ok(stream.boxed())
}

/// Run the operation's selection set against one event payload.
async fn execute_event<'a>(
    ctx: &ExecutionContext<'a>,
    root_type: &'a crate::registry::MetaType,
    groups: &collect::FieldGroups<'a>,
    payload: ConstValue,
) -> Response {
    let data = resolve::execute_fields(ctx, root_type, &payload, groups, None).await;
    let mut errors = ctx.take_errors();
    match data {
        Ok(data) => Response {
            data: Some(data),
            errors,
        },
        Err(error) => {
            errors.push(error);
            Response {
                data: Some(ConstValue::Null),
                errors,
            }
        }
    }
}
