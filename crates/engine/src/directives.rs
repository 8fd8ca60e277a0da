//! Directive argument extraction.

use engine_value::{ConstValue, Name, Variables};
use indexmap::IndexMap;

use crate::{
    ast::{Directive, Positioned},
    error::ServerError,
    input_coercion::coerce_argument_values,
    registry::{MetaDirective, Registry},
};

/// Extract the coerced argument values of a directive, applying declared
/// defaults. `None` when the directive is not present on the node.
pub fn get_directive_values(
    registry: &Registry,
    directive_def: &MetaDirective,
    directives: &[Positioned<Directive>],
    variables: &Variables,
) -> Result<Option<IndexMap<Name, ConstValue>>, ServerError> {
    let Some(directive) = directives
        .iter()
        .find(|directive| directive.node.name.node == directive_def.name.as_str())
    else {
        return Ok(None);
    };
    coerce_argument_values(
        registry,
        &directive_def.args,
        &directive.node.arguments,
        variables,
        directive.pos,
    )
    .map(Some)
}

/// Whether a selection survives its `@skip` and `@include` directives: it
/// is included iff `@skip.if` is not true and `@include.if` is not false.
pub fn is_selection_included(
    registry: &Registry,
    directives: &[Positioned<Directive>],
    variables: &Variables,
) -> Result<bool, ServerError> {
    if let Some(skip) = registry.directive("skip") {
        if let Some(args) = get_directive_values(registry, skip, directives, variables)? {
            if args.get("if") == Some(&ConstValue::Boolean(true)) {
                return Ok(false);
            }
        }
    }
    if let Some(include) = registry.directive("include") {
        if let Some(args) = get_directive_values(registry, include, directives, variables)? {
            if args.get("if") == Some(&ConstValue::Boolean(false)) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::Pos,
        registry::{MetaField, ObjectType},
    };
    use engine_value::Value;

    fn registry() -> Registry {
        Registry::builder("Query")
            .register(ObjectType::new("Query").field(MetaField::new("ok", "Boolean")))
            .build()
            .unwrap()
    }

    fn directive(name: &str, if_value: Value) -> Positioned<Directive> {
        Positioned::new(
            Directive {
                name: Positioned::new(Name::new(name), Pos::default()),
                arguments: vec![(
                    Positioned::new(Name::new("if"), Pos::default()),
                    Positioned::new(if_value, Pos::default()),
                )],
            },
            Pos::default(),
        )
    }

    #[test]
    fn absent_directive_yields_none() {
        let registry = registry();
        let skip = registry.directive("skip").unwrap();
        let values =
            get_directive_values(&registry, skip, &[], &Variables::default()).unwrap();
        assert!(values.is_none());
    }

    #[test]
    fn skip_beats_include() {
        let registry = registry();
        let variables = Variables::default();
        let both = [
            directive("skip", Value::Boolean(true)),
            directive("include", Value::Boolean(true)),
        ];
        assert!(!is_selection_included(&registry, &both, &variables).unwrap());

        let included = [
            directive("skip", Value::Boolean(false)),
            directive("include", Value::Boolean(true)),
        ];
        assert!(is_selection_included(&registry, &included, &variables).unwrap());
    }

    #[test]
    fn directive_arguments_resolve_variables() {
        let registry = registry();
        let variables =
            Variables::from_json(serde_json::json!({ "cond": true }));
        let skip = registry.directive("skip").unwrap();
        let node = [directive("skip", Value::Variable(Name::new("cond")))];
        let values = get_directive_values(&registry, skip, &node, &variables)
            .unwrap()
            .unwrap();
        assert_eq!(values.get("if"), Some(&ConstValue::Boolean(true)));
    }
}
