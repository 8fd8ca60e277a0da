//! Field resolution and value completion.
//!
//! Sibling fields of queries and subscriptions resolve concurrently;
//! mutation root fields resolve strictly one after another. A field error
//! is absorbed as `null` at the nearest nullable position and recorded;
//! under a non-null type it propagates to the enclosing field, and
//! through the root it nulls the entire response data.

use async_recursion::async_recursion;
use engine_value::{ConstValue, Name};
use futures_util::future::join_all;
use indexmap::IndexMap;

use crate::{
    ast::{Field, Pos, Positioned},
    context::{ExecutionContext, ResolverContext},
    error::{ServerError, ServerResult},
    executor::collect::{collect_subfields, FieldGroups},
    input_coercion::coerce_argument_values,
    query_path::{path_to_array, ResponsePath, ResponsePathSegment},
    registry::{FieldFuture, MetaField, MetaType, MetaTypeName, Registry},
    validation::get_field_def,
};

/// Resolve a group map concurrently and assemble the results in
/// collection order.
pub(crate) async fn execute_fields<'a>(
    ctx: &ExecutionContext<'a>,
    parent_type: &'a MetaType,
    parent_value: &'a ConstValue,
    groups: &'a FieldGroups<'a>,
    path: Option<&'a ResponsePath<'a>>,
) -> ServerResult<ConstValue> {
    let futures = groups.iter().map(|(response_key, fields)| async move {
        let result = resolve_field(ctx, parent_type, parent_value, response_key, fields, path).await;
        (response_key, result)
    });

    let mut data = IndexMap::new();
    for (response_key, result) in join_all(futures).await {
        match result {
            Some(Ok(value)) => {
                data.insert(response_key.clone(), value);
            }
            // No matching field definition: the key is left out entirely.
            None => {}
            Some(Err(error)) => return Err(error),
        }
    }
    Ok(ConstValue::Object(data))
}

/// Resolve a group map one field at a time, each to full completion
/// before the next resolver is invoked. Used for mutation roots.
pub(crate) async fn execute_fields_serial<'a>(
    ctx: &ExecutionContext<'a>,
    parent_type: &'a MetaType,
    parent_value: &'a ConstValue,
    groups: &'a FieldGroups<'a>,
) -> ServerResult<ConstValue> {
    let mut data = IndexMap::new();
    for (response_key, fields) in groups {
        match resolve_field(ctx, parent_type, parent_value, response_key, fields, None).await {
            Some(Ok(value)) => {
                data.insert(response_key.clone(), value);
            }
            None => {}
            Some(Err(error)) => return Err(error),
        }
    }
    Ok(ConstValue::Object(data))
}

/// Resolve one response key. `None` means the field has no definition and
/// its key is omitted from the result.
async fn resolve_field<'a>(
    ctx: &ExecutionContext<'a>,
    parent_type: &'a MetaType,
    parent_value: &'a ConstValue,
    response_key: &'a Name,
    fields: &'a [&'a Positioned<Field>],
    parent_path: Option<&'a ResponsePath<'a>>,
) -> Option<ServerResult<ConstValue>> {
    let field = fields[0];
    let field_name = field.node.name.node.as_str();
    let segment = ResponsePathSegment::Field(response_key.as_str());
    let path = match parent_path {
        Some(parent) => parent.child(segment),
        None => ResponsePath::new(segment),
    };

    if field_name == "__typename" {
        return Some(Ok(ConstValue::String(parent_type.name().to_string())));
    }
    let field_def = get_field_def(ctx.registry, parent_type, field_name)?;

    match resolve_field_value(ctx, parent_type, parent_value, field_def, fields, &path).await {
        Ok(value) => Some(Ok(value)),
        Err(error) if field_def.ty.is_nullable() => {
            tracing::debug!(field = field_name, error = %error.message, "field error");
            ctx.add_error(error);
            Some(Ok(ConstValue::Null))
        }
        Err(error) => Some(Err(error)),
    }
}

async fn resolve_field_value<'a>(
    ctx: &ExecutionContext<'a>,
    parent_type: &'a MetaType,
    parent_value: &'a ConstValue,
    field_def: &'a MetaField,
    fields: &'a [&'a Positioned<Field>],
    path: &ResponsePath<'a>,
) -> ServerResult<ConstValue> {
    let field = fields[0];

    // Introspection metadata is served by an external layer through the
    // resolver hook; without one these meta fields cannot be answered.
    if (field_def.name == "__schema" || field_def.name == "__type")
        && field_def.resolver.is_none()
    {
        return Err(located(
            format!(
                "Introspection is not available: no resolver installed for \"{}\".",
                field_def.name
            ),
            field.pos,
            Some(path),
        ));
    }

    let args = coerce_argument_values(
        ctx.registry,
        &field_def.args,
        &field.node.arguments,
        &ctx.variables,
        field.pos,
    )
    .map_err(|error| error.with_path(path.to_vec()))?;

    let resolver_ctx = ResolverContext {
        ctx,
        parent_value,
        args: &args,
        field_nodes: fields,
        field_definition: field_def,
        parent_type,
        path,
    };
    let reply = match (&field_def.resolver, &ctx.field_resolver) {
        (Some(resolver), _) => resolver(resolver_ctx),
        (None, Some(fallback)) => fallback(resolver_ctx),
        (None, None) => default_field_resolver(resolver_ctx),
    };
    let resolved = match reply {
        FieldFuture::Value(value) => value,
        FieldFuture::Future(future) => future
            .await
            .map_err(|error| error.into_server_error(field.pos).with_path(path.to_vec()))?,
    };

    complete_value(
        ctx,
        field_def.ty.as_str(),
        parent_type,
        field_def,
        fields,
        resolved.unwrap_or_default(),
        Some(path),
    )
    .await
}

/// The property-lookup resolver used when neither the field nor the
/// request installs one: read the field name out of the parent object.
pub fn default_field_resolver(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
    let value = match ctx.parent_value {
        ConstValue::Object(map) => map.get(ctx.field_name()).cloned(),
        _ => None,
    };
    FieldFuture::Value(value)
}

#[async_recursion]
async fn complete_value<'a>(
    ctx: &ExecutionContext<'a>,
    ty: &str,
    parent_type: &'a MetaType,
    field_def: &'a MetaField,
    fields: &'a [&'a Positioned<Field>],
    value: ConstValue,
    path: Option<&ResponsePath<'a>>,
) -> ServerResult<ConstValue> {
    let pos = fields[0].pos;
    match MetaTypeName::create(ty) {
        MetaTypeName::NonNull(inner) => {
            let completed =
                complete_value(ctx, inner, parent_type, field_def, fields, value, path).await?;
            if completed.is_null() {
                return Err(located(
                    format!(
                        "Cannot return null for non-nullable field {}.{}.",
                        parent_type.name(),
                        field_def.name
                    ),
                    pos,
                    path,
                ));
            }
            Ok(completed)
        }
        _ if value.is_null() => Ok(ConstValue::Null),
        MetaTypeName::List(item_ty) => {
            let ConstValue::List(items) = value else {
                return Err(located(
                    format!(
                        "Expected a list, but did not find one for field {}.{}.",
                        parent_type.name(),
                        field_def.name
                    ),
                    pos,
                    path,
                ));
            };

            let futures = items.into_iter().enumerate().map(|(index, item)| {
                let item_path = match path {
                    Some(parent) => parent.child(ResponsePathSegment::Index(index)),
                    None => ResponsePath::new(ResponsePathSegment::Index(index)),
                };
                async move {
                    complete_value(
                        ctx,
                        item_ty,
                        parent_type,
                        field_def,
                        fields,
                        item,
                        Some(&item_path),
                    )
                    .await
                }
            });

            let item_nullable = !MetaTypeName::create(item_ty).is_non_null();
            let mut completed = Vec::new();
            for result in join_all(futures).await {
                match result {
                    Ok(item) => completed.push(item),
                    Err(error) if item_nullable => {
                        ctx.add_error(error);
                        completed.push(ConstValue::Null);
                    }
                    Err(error) => return Err(error),
                }
            }
            Ok(ConstValue::List(completed))
        }
        MetaTypeName::Named(name) => {
            let Some(meta) = ctx.registry.lookup_type(name) else {
                return Err(located(format!("Unknown type \"{name}\"."), pos, path));
            };
            match meta {
                MetaType::Scalar(scalar) => scalar
                    .serialize(value)
                    .map_err(|error| error.into_server_error(pos).with_path(path_to_array(path))),
                MetaType::Enum(enum_type) => match enum_type.name_for_value(&value) {
                    Some(value_name) => Ok(ConstValue::Enum(Name::new(value_name))),
                    None => Err(located(
                        format!(
                            "Enum \"{}\" cannot represent value: {value}.",
                            enum_type.name
                        ),
                        pos,
                        path,
                    )),
                },
                MetaType::Object(object) => {
                    if let Some(is_type_of) = &object.is_type_of {
                        if !is_type_of(&value) {
                            return Err(located(
                                format!(
                                    "Expected value of type \"{}\" but received: {value}.",
                                    object.name
                                ),
                                pos,
                                path,
                            ));
                        }
                    }
                    complete_object(ctx, meta, fields, value, path).await
                }
                MetaType::Interface(_) | MetaType::Union(_) => {
                    let Some(runtime_name) = resolve_runtime_type(ctx, meta, &value) else {
                        return Err(located(
                            format!(
                                "Abstract type \"{name}\" must resolve to an Object type at runtime for field {}.{}.",
                                parent_type.name(),
                                field_def.name
                            ),
                            pos,
                            path,
                        ));
                    };
                    let Some(runtime_type) = ctx.registry.lookup_type(&runtime_name) else {
                        return Err(located(
                            format!(
                                "Abstract type \"{name}\" was resolved to a type \"{runtime_name}\" that does not exist inside the schema."
                            ),
                            pos,
                            path,
                        ));
                    };
                    if !ctx.registry.is_sub_type(name, &runtime_name) {
                        return Err(located(
                            format!(
                                "Runtime Object type \"{runtime_name}\" is not a possible type for \"{name}\"."
                            ),
                            pos,
                            path,
                        ));
                    }
                    if let MetaType::Object(object) = runtime_type {
                        if let Some(is_type_of) = &object.is_type_of {
                            if !is_type_of(&value) {
                                return Err(located(
                                    format!(
                                        "Expected value of type \"{runtime_name}\" but received: {value}."
                                    ),
                                    pos,
                                    path,
                                ));
                            }
                        }
                    }
                    complete_object(ctx, runtime_type, fields, value, path).await
                }
                MetaType::InputObject(_) => Err(located(
                    format!("Type \"{name}\" cannot be used as an output type."),
                    pos,
                    path,
                )),
            }
        }
    }
}

async fn complete_object<'a>(
    ctx: &ExecutionContext<'a>,
    object_type: &'a MetaType,
    fields: &'a [&'a Positioned<Field>],
    value: ConstValue,
    path: Option<&ResponsePath<'a>>,
) -> ServerResult<ConstValue> {
    let groups = collect_subfields(ctx, object_type, fields)?;
    execute_fields(ctx, object_type, &value, &groups, path).await
}

fn resolve_runtime_type(
    ctx: &ExecutionContext<'_>,
    abstract_type: &MetaType,
    value: &ConstValue,
) -> Option<String> {
    let hook = match abstract_type {
        MetaType::Interface(interface) => interface.resolve_type.as_ref(),
        MetaType::Union(union) => union.resolve_type.as_ref(),
        _ => None,
    };
    match (hook, &ctx.type_resolver) {
        (Some(resolve), _) => resolve(value),
        (None, Some(fallback)) => fallback(value),
        (None, None) => default_type_resolver(ctx.registry, abstract_type, value),
    }
}

/// The default abstract-type resolver: trust a `__typename` property,
/// otherwise the first possible type whose `is_type_of` claims the value.
pub fn default_type_resolver(
    registry: &Registry,
    abstract_type: &MetaType,
    value: &ConstValue,
) -> Option<String> {
    if let ConstValue::Object(map) = value {
        if let Some(ConstValue::String(type_name)) = map.get("__typename") {
            return Some(type_name.clone());
        }
    }
    registry
        .possible_types(abstract_type.name())?
        .iter()
        .find(|type_name| {
            matches!(
                registry.lookup_type(type_name),
                Some(MetaType::Object(object))
                    if object.is_type_of.as_ref().is_some_and(|is_type_of| is_type_of(value))
            )
        })
        .cloned()
}

fn located(message: String, pos: Pos, path: Option<&ResponsePath<'_>>) -> ServerError {
    ServerError::new(message, Some(pos)).with_path(path_to_array(path))
}
