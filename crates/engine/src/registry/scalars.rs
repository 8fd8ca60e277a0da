//! The built-in scalars.
//!
//! Coercion follows the GraphQL spec: `Int` is a 32-bit signed integer,
//! `Float` accepts any finite number, `ID` accepts strings and integers and
//! always serializes as a string.

use engine_value::{ConstValue, Number};

use super::ScalarType;
use crate::error::Error;

pub(crate) fn builtin_scalars() -> Vec<ScalarType> {
    vec![
        string_scalar(),
        int_scalar(),
        float_scalar(),
        boolean_scalar(),
        id_scalar(),
    ]
}

pub fn string_scalar() -> ScalarType {
    ScalarType::new("String")
        .with_parse_value(|value| match value {
            ConstValue::String(_) => Ok(value),
            other => Err(Error::new(format!(
                "String cannot represent a non string value: {other}"
            ))),
        })
        .with_serialize(|value| match value {
            ConstValue::String(_) => Ok(value),
            ConstValue::Boolean(b) => Ok(ConstValue::String(b.to_string())),
            ConstValue::Number(n) => Ok(ConstValue::String(n.to_string())),
            other => Err(Error::new(format!(
                "String cannot represent value: {other}"
            ))),
        })
}

fn int_from_number(number: &Number) -> Option<i64> {
    let int = number.as_i64()?;
    i32::try_from(int).ok()?;
    Some(int)
}

pub fn int_scalar() -> ScalarType {
    let coerce = |value: ConstValue| match &value {
        ConstValue::Number(n) if n.is_i64() || n.is_u64() => match int_from_number(n) {
            Some(_) => Ok(value),
            None => Err(Error::new(format!(
                "Int cannot represent non 32-bit signed integer value: {value}"
            ))),
        },
        _ => Err(Error::new(format!(
            "Int cannot represent non-integer value: {value}"
        ))),
    };
    ScalarType::new("Int")
        .with_parse_value(coerce)
        .with_serialize(coerce)
}

pub fn float_scalar() -> ScalarType {
    let coerce = |value: ConstValue| match &value {
        ConstValue::Number(_) => Ok(value),
        _ => Err(Error::new(format!(
            "Float cannot represent non numeric value: {value}"
        ))),
    };
    ScalarType::new("Float")
        .with_parse_value(coerce)
        .with_serialize(coerce)
}

pub fn boolean_scalar() -> ScalarType {
    let coerce = |value: ConstValue| match &value {
        ConstValue::Boolean(_) => Ok(value),
        _ => Err(Error::new(format!(
            "Boolean cannot represent a non boolean value: {value}"
        ))),
    };
    ScalarType::new("Boolean")
        .with_parse_value(coerce)
        .with_serialize(coerce)
}

pub fn id_scalar() -> ScalarType {
    let coerce = |value: ConstValue| match &value {
        ConstValue::String(_) => Ok(value),
        ConstValue::Number(n) if n.is_i64() || n.is_u64() => {
            Ok(ConstValue::String(n.to_string()))
        }
        _ => Err(Error::new(format!("ID cannot represent value: {value}"))),
    };
    ScalarType::new("ID")
        .with_parse_value(coerce)
        .with_serialize(coerce)
}
