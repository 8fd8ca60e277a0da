//! Helpers shared by the validation rules.

use engine_value::Value;

use crate::{
    query_path::QueryPathSegment,
    registry::{MetaType, MetaTypeName, Registry},
};

fn valid_error(path: &[QueryPathSegment], msg: String) -> String {
    let path = path
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".");
    format!("\"{path}\", {msg}")
}

/// Check a literal value against an input type, returning a message for
/// the first violation found. Variables pass unjudged; their compatibility
/// is a different rule's business.
pub(crate) fn is_valid_input_value(
    registry: &Registry,
    type_name: &str,
    value: &Value,
    path: Vec<QueryPathSegment>,
) -> Option<String> {
    if let Value::Variable(_) = value {
        return None;
    }
    match MetaTypeName::create(type_name) {
        MetaTypeName::NonNull(inner) => match value {
            Value::Null => Some(valid_error(
                &path,
                format!("expected type \"{inner}\" but found null"),
            )),
            _ => is_valid_input_value(registry, inner, value, path),
        },
        MetaTypeName::List(inner) => match value {
            Value::Null => None,
            Value::List(elems) => elems.iter().enumerate().find_map(|(idx, elem)| {
                let mut path = path.clone();
                path.push(QueryPathSegment::Index(idx));
                is_valid_input_value(registry, inner, elem, path)
            }),
            // A single value in list position is the one-element list.
            _ => is_valid_input_value(registry, inner, value, path),
        },
        MetaTypeName::Named(name) => {
            if let Value::Null = value {
                return None;
            }
            match registry.lookup_type(name)? {
                MetaType::Scalar(scalar) => {
                    // A literal with variables nested inside cannot be
                    // judged until execution.
                    let const_value = value.clone().into_const()?;
                    match scalar.parse_literal(const_value) {
                        Ok(_) => None,
                        Err(_) => Some(valid_error(&path, format!("expected type \"{name}\""))),
                    }
                }
                MetaType::Enum(enum_type) => {
                    let enum_name = &enum_type.name;
                    let value_name = match value {
                        Value::Enum(value_name) => Some(value_name.as_str()),
                        Value::String(value_name) => Some(value_name.as_str()),
                        _ => None,
                    };
                    match value_name {
                        Some(value_name) if enum_type.enum_value(value_name).is_none() => {
                            Some(valid_error(
                                &path,
                                format!(
                                    "enumeration type \"{enum_name}\" does not contain the value \"{value_name}\""
                                ),
                            ))
                        }
                        Some(_) => None,
                        None => Some(valid_error(
                            &path,
                            format!("expected type \"{name}\" but got {value}"),
                        )),
                    }
                }
                MetaType::InputObject(input_object) => match value {
                    Value::Object(values) => {
                        for key in values.keys() {
                            if !input_object.input_fields.contains_key(key.as_str()) {
                                return Some(valid_error(
                                    &path,
                                    format!(
                                        "unknown field \"{key}\" of type \"{}\"",
                                        input_object.name
                                    ),
                                ));
                            }
                        }
                        for field in input_object.input_fields.values() {
                            if let Some(value) = values.get(field.name.as_str()) {
                                let mut path = path.clone();
                                path.push(QueryPathSegment::Name(field.name.clone()));
                                if let Some(reason) = is_valid_input_value(
                                    registry,
                                    field.ty.as_str(),
                                    value,
                                    path,
                                ) {
                                    return Some(reason);
                                }
                            } else if field.ty.is_non_null() && field.default_value.is_none() {
                                return Some(valid_error(
                                    &path,
                                    format!(
                                        "field \"{}\" of type \"{}\" is required but not provided",
                                        field.name, input_object.name
                                    ),
                                ));
                            }
                        }
                        None
                    }
                    _ => Some(valid_error(&path, format!("expected type \"{name}\""))),
                },
                _ => None,
            }
        }
    }
}
