//! Type-string handling.
//!
//! The registry stores field, argument and input types in their GraphQL
//! source form (`"[Foo!]!"`). [`MetaTypeName`] is the zero-copy structured
//! view used to peel wrappers during coercion and completion.

use std::fmt::{self, Display, Formatter};

use crate::ast::{self, BaseType};

/// A structured view over one level of a type string.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MetaTypeName<'a> {
    List(&'a str),
    NonNull(&'a str),
    Named(&'a str),
}

impl Display for MetaTypeName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MetaTypeName::Named(name) => write!(f, "{name}"),
            MetaTypeName::NonNull(name) => write!(f, "{name}!"),
            MetaTypeName::List(name) => write!(f, "[{name}]"),
        }
    }
}

fn strip_brackets(type_name: &str) -> Option<&str> {
    type_name
        .strip_prefix('[')
        .map(|rest| &rest[..rest.len() - 1])
}

impl<'a> MetaTypeName<'a> {
    /// View the outermost wrapper of a type string.
    #[inline]
    pub fn create(type_name: &str) -> MetaTypeName<'_> {
        if let Some(type_name) = type_name.strip_suffix('!') {
            MetaTypeName::NonNull(type_name)
        } else if let Some(type_name) = strip_brackets(type_name) {
            MetaTypeName::List(type_name)
        } else {
            MetaTypeName::Named(type_name)
        }
    }

    /// The innermost named type of a type string.
    #[inline]
    pub fn concrete_typename(type_name: &str) -> &str {
        match MetaTypeName::create(type_name) {
            MetaTypeName::List(type_name) | MetaTypeName::NonNull(type_name) => {
                Self::concrete_typename(type_name)
            }
            MetaTypeName::Named(type_name) => type_name,
        }
    }

    #[inline]
    pub fn is_non_null(&self) -> bool {
        matches!(self, MetaTypeName::NonNull(_))
    }

    /// Strip one non-null wrapper, if present.
    #[inline]
    #[must_use]
    pub fn unwrap_non_null(&self) -> Self {
        match self {
            MetaTypeName::NonNull(ty) => MetaTypeName::create(ty),
            _ => *self,
        }
    }

    /// Whether a value of type `sub` is acceptable where `self` is
    /// expected, considering only nullability and list shape.
    pub fn is_subtype(&self, sub: &MetaTypeName<'_>) -> bool {
        match (self, sub) {
            (
                MetaTypeName::NonNull(super_type) | MetaTypeName::Named(super_type),
                MetaTypeName::NonNull(sub_type),
            ) => MetaTypeName::create(super_type).is_subtype(&MetaTypeName::create(sub_type)),
            (MetaTypeName::Named(super_type), MetaTypeName::Named(sub_type)) => {
                super_type == sub_type
            }
            (MetaTypeName::List(super_type), MetaTypeName::List(sub_type)) => {
                MetaTypeName::create(super_type).is_subtype(&MetaTypeName::create(sub_type))
            }
            _ => false,
        }
    }
}

/// A field, argument or input type in its GraphQL string form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MetaFieldType(String);

impl MetaFieldType {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// One structured level of the type.
    pub fn name(&self) -> MetaTypeName<'_> {
        MetaTypeName::create(&self.0)
    }

    /// The innermost named type.
    pub fn named_type(&self) -> &str {
        MetaTypeName::concrete_typename(&self.0)
    }

    pub fn is_non_null(&self) -> bool {
        self.0.ends_with('!')
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_non_null()
    }

    /// Whether a list wrapper occurs anywhere in the type.
    pub fn is_list(&self) -> bool {
        self.0.contains('[')
    }
}

impl Display for MetaFieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetaFieldType {
    fn from(ty: &str) -> Self {
        MetaFieldType(ty.to_string())
    }
}

impl From<String> for MetaFieldType {
    fn from(ty: String) -> Self {
        MetaFieldType(ty)
    }
}

impl From<&ast::Type> for MetaFieldType {
    fn from(ty: &ast::Type) -> Self {
        MetaFieldType(type_string(ty))
    }
}

fn type_string(ty: &ast::Type) -> String {
    let base = match &ty.base {
        BaseType::Named(name) => name.to_string(),
        BaseType::List(item) => format!("[{}]", type_string(item)),
    };
    if ty.nullable {
        base
    } else {
        format!("{base}!")
    }
}
