//! Value types for the GraphQL engine.
//!
//! [`Value`] is the value grammar as it appears in documents, so it may
//! contain variables. [`ConstValue`] is a fully resolved value: what the
//! coercion layer produces, what resolvers return and what ends up in a
//! response. [`Variables`] is the request-supplied variable map.

mod name;

use std::fmt::{self, Display, Formatter, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use name::Name;
pub use serde_json::Number;

/// A resolved GraphQL value, for example `1`, `"abc"`, `[1, 2, 3]` or
/// `{ "a": 1 }`.
///
/// Integers and floats share the [`Number`] representation, mirroring the
/// JSON layer they are transported over.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConstValue {
    /// `null`.
    #[default]
    Null,
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// A boolean.
    Boolean(bool),
    /// An enum value, e.g. `RED`.
    Enum(Name),
    /// A list of values.
    List(Vec<ConstValue>),
    /// An object, with insertion order preserved.
    Object(IndexMap<Name, ConstValue>),
}

impl ConstValue {
    /// Convert a JSON value. Total: every JSON value has a representation.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConstValue::Null,
            serde_json::Value::Bool(value) => ConstValue::Boolean(value),
            serde_json::Value::Number(value) => ConstValue::Number(value),
            serde_json::Value::String(value) => ConstValue::String(value),
            serde_json::Value::Array(items) => {
                ConstValue::List(items.into_iter().map(ConstValue::from_json).collect())
            }
            serde_json::Value::Object(map) => ConstValue::Object(
                map.into_iter()
                    .map(|(name, value)| (Name::new(name), ConstValue::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Convert into a JSON value. Enum values become strings.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            ConstValue::Null => serde_json::Value::Null,
            ConstValue::Number(value) => serde_json::Value::Number(value),
            ConstValue::String(value) => serde_json::Value::String(value),
            ConstValue::Boolean(value) => serde_json::Value::Bool(value),
            ConstValue::Enum(name) => serde_json::Value::String(name.to_string()),
            ConstValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(ConstValue::into_json).collect())
            }
            ConstValue::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(name, value)| (String::from(name), value.into_json()))
                    .collect(),
            ),
        }
    }

    /// Lift into the document value grammar.
    pub fn into_value(self) -> Value {
        match self {
            ConstValue::Null => Value::Null,
            ConstValue::Number(value) => Value::Number(value),
            ConstValue::String(value) => Value::String(value),
            ConstValue::Boolean(value) => Value::Boolean(value),
            ConstValue::Enum(name) => Value::Enum(name),
            ConstValue::List(items) => {
                Value::List(items.into_iter().map(ConstValue::into_value).collect())
            }
            ConstValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(name, value)| (name, value.into_value()))
                    .collect(),
            ),
        }
    }

    /// Short description of the value kind, for diagnostics.
    pub fn kind_str(&self) -> &'static str {
        match self {
            ConstValue::Null => "null",
            ConstValue::Number(_) => "number",
            ConstValue::String(_) => "string",
            ConstValue::Boolean(_) => "boolean",
            ConstValue::Enum(_) => "enum",
            ConstValue::List(_) => "list",
            ConstValue::Object(_) => "object",
        }
    }

    /// True for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }
}

impl From<serde_json::Value> for ConstValue {
    fn from(value: serde_json::Value) -> Self {
        ConstValue::from_json(value)
    }
}

impl From<ConstValue> for serde_json::Value {
    fn from(value: ConstValue) -> Self {
        value.into_json()
    }
}

impl Serialize for ConstValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConstValue::Null => serializer.serialize_unit(),
            ConstValue::Number(value) => value.serialize(serializer),
            ConstValue::String(value) => serializer.serialize_str(value),
            ConstValue::Boolean(value) => serializer.serialize_bool(*value),
            ConstValue::Enum(name) => serializer.serialize_str(name),
            ConstValue::List(items) => items.serialize(serializer),
            ConstValue::Object(map) => {
                use serde::ser::SerializeMap;
                let mut object = serializer.serialize_map(Some(map.len()))?;
                for (name, value) in map {
                    object.serialize_entry(name.as_str(), value)?;
                }
                object.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConstValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ConstValue::from_json(serde_json::Value::deserialize(
            deserializer,
        )?))
    }
}

impl Display for ConstValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Number(value) => write!(f, "{value}"),
            ConstValue::String(value) => write_quoted(value, f),
            ConstValue::Boolean(value) => write!(f, "{value}"),
            ConstValue::Enum(name) => f.write_str(name),
            ConstValue::List(items) => write_list(items, f),
            ConstValue::Object(map) => write_object(map, f),
        }
    }
}

/// A GraphQL value as written in a document, so possibly a variable.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// A variable reference, e.g. `$name`.
    Variable(Name),
    /// `null`.
    #[default]
    Null,
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// A boolean.
    Boolean(bool),
    /// An enum value.
    Enum(Name),
    /// A list of values.
    List(Vec<Value>),
    /// An object, with insertion order preserved.
    Object(IndexMap<Name, Value>),
}

impl Value {
    /// Resolve every variable through `f`, producing a constant value.
    pub fn into_const_with<E>(
        self,
        mut f: impl FnMut(Name) -> Result<ConstValue, E>,
    ) -> Result<ConstValue, E> {
        self.into_const_with_mut(&mut f)
    }

    fn into_const_with_mut<E>(
        self,
        f: &mut impl FnMut(Name) -> Result<ConstValue, E>,
    ) -> Result<ConstValue, E> {
        Ok(match self {
            Value::Variable(name) => f(name)?,
            Value::Null => ConstValue::Null,
            Value::Number(value) => ConstValue::Number(value),
            Value::String(value) => ConstValue::String(value),
            Value::Boolean(value) => ConstValue::Boolean(value),
            Value::Enum(name) => ConstValue::Enum(name),
            Value::List(items) => ConstValue::List(
                items
                    .into_iter()
                    .map(|item| item.into_const_with_mut(f))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => ConstValue::Object(
                map.into_iter()
                    .map(|(name, value)| Ok((name, value.into_const_with_mut(f)?)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Convert into a constant value, if no variable occurs anywhere inside.
    pub fn into_const(self) -> Option<ConstValue> {
        self.into_const_with(|_| Err(())).ok()
    }

    /// Short description of the value kind, for diagnostics.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Value::Variable(_) => "variable",
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }
}

impl From<ConstValue> for Value {
    fn from(value: ConstValue) -> Self {
        value.into_value()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Variable(name) => write!(f, "${name}"),
            Value::Null => f.write_str("null"),
            Value::Number(value) => write!(f, "{value}"),
            Value::String(value) => write_quoted(value, f),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Enum(name) => f.write_str(name),
            Value::List(items) => write_list(items, f),
            Value::Object(map) => write_object(map, f),
        }
    }
}

fn write_quoted(value: &str, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_list<T: Display>(items: &[T], f: &mut Formatter<'_>) -> fmt::Result {
    f.write_char('[')?;
    for (idx, item) in items.iter().enumerate() {
        if idx != 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_char(']')
}

fn write_object<T: Display>(map: &IndexMap<Name, T>, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_char('{')?;
    for (idx, (name, value)) in map.iter().enumerate() {
        if idx != 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}: {value}")?;
    }
    f.write_char('}')
}

/// The variable map of a request.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Variables(IndexMap<Name, ConstValue>);

impl Variables {
    /// Build a variable map from a JSON value. Anything but an object is
    /// treated as an empty map.
    pub fn from_json(value: serde_json::Value) -> Self {
        match ConstValue::from_json(value) {
            ConstValue::Object(map) => Variables(map),
            _ => Variables::default(),
        }
    }

    /// Consume the map into a single object value.
    pub fn into_value(self) -> ConstValue {
        ConstValue::Object(self.0)
    }
}

impl std::ops::Deref for Variables {
    type Target = IndexMap<Name, ConstValue>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Variables {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(Name, ConstValue)> for Variables {
    fn from_iter<T: IntoIterator<Item = (Name, ConstValue)>>(iter: T) -> Self {
        Variables(iter.into_iter().collect())
    }
}

impl IntoIterator for Variables {
    type Item = (Name, ConstValue);
    type IntoIter = indexmap::map::IntoIter<Name, ConstValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'de> Deserialize<'de> for Variables {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `"variables": null` is accepted as an empty map.
        Ok(<Option<IndexMap<Name, ConstValue>>>::deserialize(deserializer)?
            .map(Variables)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_graphql_literals() {
        let value = ConstValue::from_json(json!({
            "int": 1,
            "float": 1.5,
            "string": "a\"b",
            "list": [true, null],
        }));
        assert_eq!(
            value.to_string(),
            r#"{int: 1, float: 1.5, string: "a\"b", list: [true, null]}"#
        );
        assert_eq!(ConstValue::Enum(Name::new("RED")).to_string(), "RED");
        assert_eq!(Value::Variable(Name::new("id")).to_string(), "$id");
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let json = json!({"b": 1, "a": [1, 2], "c": {"z": null}});
        let value = ConstValue::from_json(json.clone());
        match &value {
            ConstValue::Object(map) => {
                let keys: Vec<_> = map.keys().map(Name::as_str).collect();
                assert_eq!(keys, ["b", "a", "c"]);
            }
            other => panic!("expected an object, got {other}"),
        }
        assert_eq!(value.into_json(), json);
    }

    #[test]
    fn into_const_with_resolves_variables() {
        let value = Value::List(vec![
            Value::Variable(Name::new("a")),
            Value::Number(2.into()),
        ]);
        let resolved = value
            .into_const_with(|name| {
                Ok::<_, ()>(ConstValue::String(format!("var:{name}")))
            })
            .unwrap();
        assert_eq!(
            resolved,
            ConstValue::List(vec![
                ConstValue::String("var:a".into()),
                ConstValue::Number(2.into())
            ])
        );
    }

    #[test]
    fn into_const_rejects_variables() {
        assert_eq!(Value::Variable(Name::new("a")).into_const(), None);
        assert_eq!(Value::Boolean(true).into_const(), Some(ConstValue::Boolean(true)));
    }

    #[test]
    fn null_variables_deserialize_to_empty() {
        let variables: Variables = serde_json::from_value(json!(null)).unwrap();
        assert!(variables.is_empty());

        let variables: Variables = serde_json::from_value(json!({"a": 1})).unwrap();
        assert_eq!(variables.get("a"), Some(&ConstValue::Number(1.into())));
    }
}
