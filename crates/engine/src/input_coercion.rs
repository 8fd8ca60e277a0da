//! Input value coercion.
//!
//! Three entry points, used at three moments:
//! [`value_from_ast`] turns a literal value node into a schema-typed
//! constant, [`coerce_input_value`] checks and converts a runtime value,
//! and [`coerce_variable_values`] runs the declared-variable loop before
//! any field executes. [`coerce_argument_values`] combines the first with
//! argument defaults during field resolution.

use engine_value::{ConstValue, Name, Value, Variables};
use indexmap::IndexMap;

use crate::{
    ast::{OperationDefinition, Pos, Positioned},
    error::{Error, ServerError},
    query_path::{path_to_array, QueryPathSegment, ResponsePath, ResponsePathSegment},
    registry::{MetaFieldType, MetaInputValue, MetaType, MetaTypeName, Registry},
    suggestion::make_suggestion,
};

/// Callback receiving each leaf coercion failure: the flattened path to
/// the offending value, the value itself and the error.
pub type OnInputError<'a> = dyn FnMut(Vec<QueryPathSegment>, &ConstValue, Error) + 'a;

/// Coerce a literal value node against an input type.
///
/// `Ok(None)` means "no value": a variable that was not supplied. Callers
/// decide whether a default fills the hole or the position requires one.
pub fn value_from_ast(
    registry: &Registry,
    value: &Value,
    ty: &str,
    variables: Option<&Variables>,
) -> Result<Option<ConstValue>, Error> {
    if let Value::Variable(name) = value {
        let Some(variables) = variables else {
            return Ok(None);
        };
        return match variables.get(name.as_str()) {
            None if MetaTypeName::create(ty).is_non_null() => Err(Error::new(format!(
                "Variable \"${name}\" of required type \"{ty}\" was not provided."
            ))),
            None => Ok(Some(ConstValue::Null)),
            Some(value) if value.is_null() && MetaTypeName::create(ty).is_non_null() => Err(
                Error::new(format!("Variable \"${name}\" must not be null.")),
            ),
            // Variable values were coerced when the request started; they
            // are used as-is here.
            Some(value) => Ok(Some(value.clone())),
        };
    }

    match MetaTypeName::create(ty) {
        MetaTypeName::NonNull(inner) => match value {
            Value::Null => Err(Error::new(format!("Expected type \"{ty}\", found null."))),
            _ => value_from_ast(registry, value, inner, variables),
        },
        _ if matches!(value, Value::Null) => Ok(Some(ConstValue::Null)),
        MetaTypeName::List(item_ty) => match value {
            Value::List(items) => {
                let mut coerced = Vec::with_capacity(items.len());
                for item in items {
                    match value_from_ast(registry, item, item_ty, variables)? {
                        Some(value) => coerced.push(value),
                        None if MetaTypeName::create(item_ty).is_non_null() => {
                            return Err(Error::new(format!(
                                "Expected a value of non-null type \"{item_ty}\" in list position."
                            )));
                        }
                        None => coerced.push(ConstValue::Null),
                    }
                }
                Ok(Some(ConstValue::List(coerced)))
            }
            // A single value coerces to a one-element list.
            _ => Ok(value_from_ast(registry, value, item_ty, variables)?
                .map(|single| ConstValue::List(vec![single]))),
        },
        MetaTypeName::Named(type_name) => {
            let meta = registry
                .lookup_type(type_name)
                .ok_or_else(|| Error::new(format!("Unknown type \"{type_name}\".")))?;
            value_from_ast_named(registry, meta, value, variables)
        }
    }
}

fn value_from_ast_named(
    registry: &Registry,
    meta: &MetaType,
    value: &Value,
    variables: Option<&Variables>,
) -> Result<Option<ConstValue>, Error> {
    let type_name = meta.name();
    match meta {
        MetaType::InputObject(input_object) => {
            let Value::Object(object) = value else {
                return Err(Error::new(format!(
                    "Expected type \"{type_name}\" to be an object."
                )));
            };
            for key in object.keys() {
                if !input_object.input_fields.contains_key(key.as_str()) {
                    let hint = make_suggestion(
                        " Did you mean",
                        input_object.input_fields.keys().map(String::as_str),
                        key,
                    )
                    .unwrap_or_default();
                    return Err(Error::new(format!(
                        "Field \"{key}\" is not defined by type \"{type_name}\".{hint}"
                    )));
                }
            }

            let mut coerced = IndexMap::new();
            for field in input_object.input_fields.values() {
                // A field set to a variable that was never supplied counts
                // as absent.
                let node = match object.get(field.name.as_str()) {
                    Some(Value::Variable(var))
                        if variables.map_or(true, |vars| !vars.contains_key(var.as_str())) =>
                    {
                        None
                    }
                    other => other,
                };
                match node {
                    None => {
                        if let Some(default) = &field.default_value {
                            coerced.insert(Name::new(&field.name), default.clone());
                        } else if field.ty.is_non_null() {
                            return Err(Error::new(format!(
                                "Field \"{type_name}.{}\" of required type \"{}\" was not provided.",
                                field.name, field.ty
                            )));
                        }
                    }
                    Some(node) => {
                        match value_from_ast(registry, node, field.ty.as_str(), variables)? {
                            Some(value) => {
                                coerced.insert(Name::new(&field.name), value);
                            }
                            None => return Ok(None),
                        }
                    }
                }
            }
            Ok(Some(ConstValue::Object(coerced)))
        }
        MetaType::Enum(enum_type) => match value {
            Value::Enum(name) => enum_type.coerce_name(name).map(Some).ok_or_else(|| {
                Error::new(format!(
                    "Value \"{name}\" does not exist in \"{type_name}\" enum."
                ))
            }),
            other => Err(Error::new(format!(
                "Enum \"{type_name}\" cannot represent non-enum value: {other}."
            ))),
        },
        MetaType::Scalar(scalar) => {
            // Complex scalar literals may still contain variables in
            // nested positions.
            let const_value = value.clone().into_const_with(|name| {
                variables
                    .and_then(|vars| vars.get(name.as_str()).cloned())
                    .ok_or_else(|| Error::new(format!("Variable \"${name}\" is not defined.")))
            })?;
            scalar.parse_literal(const_value).map(Some)
        }
        _ => Err(Error::new(format!(
            "Type \"{type_name}\" cannot be used as an input type."
        ))),
    }
}

/// Coerce a runtime value against an input type, reporting every leaf
/// failure through `on_error`. Returns `None` when anything failed.
pub fn coerce_input_value(
    registry: &Registry,
    ty: &str,
    value: ConstValue,
    path: Option<&ResponsePath<'_>>,
    on_error: &mut OnInputError<'_>,
) -> Option<ConstValue> {
    match MetaTypeName::create(ty) {
        MetaTypeName::NonNull(inner) => {
            if value.is_null() {
                on_error(
                    path_to_array(path),
                    &value,
                    Error::new(format!(
                        "Expected non-nullable type \"{ty}\" not to be null."
                    )),
                );
                return None;
            }
            coerce_input_value(registry, inner, value, path, on_error)
        }
        _ if value.is_null() => Some(ConstValue::Null),
        MetaTypeName::List(item_ty) => match value {
            ConstValue::List(items) => {
                let mut coerced = Vec::with_capacity(items.len());
                let mut failed = false;
                for (idx, item) in items.into_iter().enumerate() {
                    let item_path = match path {
                        Some(path) => path.child(ResponsePathSegment::Index(idx)),
                        None => ResponsePath::new(ResponsePathSegment::Index(idx)),
                    };
                    match coerce_input_value(registry, item_ty, item, Some(&item_path), on_error) {
                        Some(item) => coerced.push(item),
                        None => failed = true,
                    }
                }
                (!failed).then_some(ConstValue::List(coerced))
            }
            // A single value coerces to a one-element list.
            single => coerce_input_value(registry, item_ty, single, path, on_error)
                .map(|item| ConstValue::List(vec![item])),
        },
        MetaTypeName::Named(type_name) => {
            let Some(meta) = registry.lookup_type(type_name) else {
                on_error(
                    path_to_array(path),
                    &value,
                    Error::new(format!("Unknown type \"{type_name}\".")),
                );
                return None;
            };
            coerce_input_value_named(registry, meta, value, path, on_error)
        }
    }
}

fn coerce_input_value_named(
    registry: &Registry,
    meta: &MetaType,
    value: ConstValue,
    path: Option<&ResponsePath<'_>>,
    on_error: &mut OnInputError<'_>,
) -> Option<ConstValue> {
    let type_name = meta.name();
    match meta {
        MetaType::InputObject(input_object) => {
            let ConstValue::Object(object) = &value else {
                on_error(
                    path_to_array(path),
                    &value,
                    Error::new(format!("Expected type \"{type_name}\" to be an object.")),
                );
                return None;
            };

            let mut coerced = IndexMap::new();
            let mut failed = false;
            for field in input_object.input_fields.values() {
                match object.get(field.name.as_str()) {
                    Some(field_value) => {
                        let field_path = match path {
                            Some(path) => path.child(ResponsePathSegment::Field(&field.name)),
                            None => ResponsePath::new(ResponsePathSegment::Field(&field.name)),
                        };
                        match coerce_input_value(
                            registry,
                            field.ty.as_str(),
                            field_value.clone(),
                            Some(&field_path),
                            on_error,
                        ) {
                            Some(value) => {
                                coerced.insert(Name::new(&field.name), value);
                            }
                            None => failed = true,
                        }
                    }
                    None => {
                        if let Some(default) = &field.default_value {
                            coerced.insert(Name::new(&field.name), default.clone());
                        } else if field.ty.is_non_null() {
                            on_error(
                                path_to_array(path),
                                &value,
                                Error::new(format!(
                                    "Field \"{type_name}.{}\" of required type \"{}\" was not provided.",
                                    field.name, field.ty
                                )),
                            );
                            failed = true;
                        }
                    }
                }
            }
            for key in object.keys() {
                if !input_object.input_fields.contains_key(key.as_str()) {
                    let hint = make_suggestion(
                        " Did you mean",
                        input_object.input_fields.keys().map(String::as_str),
                        key,
                    )
                    .unwrap_or_default();
                    on_error(
                        path_to_array(path),
                        &value,
                        Error::new(format!(
                            "Field \"{key}\" is not defined by type \"{type_name}\".{hint}"
                        )),
                    );
                    failed = true;
                }
            }
            (!failed).then_some(ConstValue::Object(coerced))
        }
        MetaType::Enum(enum_type) => {
            let name = match &value {
                ConstValue::Enum(name) => Some(name.as_str()),
                ConstValue::String(name) => Some(name.as_str()),
                _ => None,
            };
            match name.and_then(|name| enum_type.coerce_name(name)) {
                Some(coerced) => Some(coerced),
                None => {
                    let hint = name
                        .and_then(|name| {
                            make_suggestion(
                                " Did you mean the enum value",
                                enum_type.enum_values.keys().map(String::as_str),
                                name,
                            )
                        })
                        .unwrap_or_default();
                    on_error(
                        path_to_array(path),
                        &value,
                        Error::new(format!(
                            "Value {value} does not exist in \"{type_name}\" enum.{hint}"
                        )),
                    );
                    None
                }
            }
        }
        MetaType::Scalar(scalar) => match scalar.parse_value(value.clone()) {
            Ok(coerced) => Some(coerced),
            Err(error) => {
                on_error(path_to_array(path), &value, error);
                None
            }
        },
        _ => {
            on_error(
                path_to_array(path),
                &value,
                Error::new(format!(
                    "Type \"{type_name}\" cannot be used as an input type."
                )),
            );
            None
        }
    }
}

/// Coerce the request-supplied variables against an operation's variable
/// definitions. Any failure aborts the request before field execution.
pub fn coerce_variable_values(
    registry: &Registry,
    operation: &Positioned<OperationDefinition>,
    variables: &Variables,
) -> Result<Variables, Vec<ServerError>> {
    let mut coerced = Variables::default();
    let mut errors = Vec::new();

    for definition in &operation.node.variable_definitions {
        let definition = &definition.node;
        let name = &definition.name.node;
        let ty = MetaFieldType::from(&definition.var_type.node);

        if !registry
            .lookup_type(ty.named_type())
            .is_some_and(MetaType::is_input)
        {
            errors.push(ServerError::new(
                format!(
                    "Variable \"${name}\" expected value of type \"{ty}\" which cannot be used as an input type."
                ),
                Some(definition.var_type.pos),
            ));
            continue;
        }

        match variables.get(name.as_str()) {
            None => {
                if let Some(default) = definition.default_value() {
                    match value_from_ast(registry, &default.clone().into_value(), ty.as_str(), None)
                    {
                        Ok(Some(value)) => {
                            coerced.insert(name.clone(), value);
                        }
                        Ok(None) => {}
                        Err(error) => {
                            errors.push(error.into_server_error(definition.name.pos));
                        }
                    }
                } else if ty.is_non_null() {
                    errors.push(ServerError::new(
                        format!("Variable \"${name}\" of required type \"{ty}\" was not provided."),
                        Some(definition.name.pos),
                    ));
                }
            }
            Some(value) if value.is_null() && ty.is_non_null() => {
                errors.push(ServerError::new(
                    format!("Variable \"${name}\" of non-null type \"{ty}\" must not be null."),
                    Some(definition.name.pos),
                ));
            }
            Some(value) => {
                let mut failed = false;
                let result = coerce_input_value(
                    registry,
                    ty.as_str(),
                    value.clone(),
                    None,
                    &mut |segments, invalid, error| {
                        failed = true;
                        let at = if segments.is_empty() {
                            String::new()
                        } else {
                            format!(" at \"{name}{}\"", print_path(&segments))
                        };
                        errors.push(ServerError::new(
                            format!("Variable \"${name}\" got invalid value {invalid}{at}; {error}"),
                            Some(definition.name.pos),
                        ));
                    },
                );
                if let (Some(value), false) = (result, failed) {
                    coerced.insert(name.clone(), value);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

fn print_path(segments: &[QueryPathSegment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            QueryPathSegment::Name(name) => format!(".{name}"),
            QueryPathSegment::Index(idx) => format!("[{idx}]"),
        })
        .collect()
}

/// Coerce a field's (or directive's) arguments, applying declared
/// defaults. Unknown arguments are validation's business and are ignored
/// here.
pub fn coerce_argument_values(
    registry: &Registry,
    arg_defs: &IndexMap<String, MetaInputValue>,
    arguments: &[(Positioned<Name>, Positioned<Value>)],
    variables: &Variables,
    pos: Pos,
) -> Result<IndexMap<Name, ConstValue>, ServerError> {
    let mut coerced = IndexMap::new();
    for def in arg_defs.values() {
        let node = arguments
            .iter()
            .find(|(name, _)| name.node == def.name.as_str());
        match node {
            None => apply_argument_default(def, &mut coerced, pos)?,
            Some((_, value)) => {
                match value_from_ast(registry, &value.node, def.ty.as_str(), Some(variables)) {
                    Ok(Some(coerced_value)) => {
                        coerced.insert(Name::new(&def.name), coerced_value);
                    }
                    Ok(None) => apply_argument_default(def, &mut coerced, value.pos)?,
                    Err(error) => {
                        return Err(ServerError::new(
                            format!("Invalid value for argument \"{}\": {error}", def.name),
                            Some(value.pos),
                        ));
                    }
                }
            }
        }
    }
    Ok(coerced)
}

fn apply_argument_default(
    def: &MetaInputValue,
    coerced: &mut IndexMap<Name, ConstValue>,
    pos: Pos,
) -> Result<(), ServerError> {
    if let Some(default) = &def.default_value {
        coerced.insert(Name::new(&def.name), default.clone());
        Ok(())
    } else if def.ty.is_non_null() {
        Err(ServerError::new(
            format!(
                "Argument \"{}\" of required type \"{}\" was not provided.",
                def.name, def.ty
            ),
            Some(pos),
        ))
    } else {
        Ok(())
    }
}
