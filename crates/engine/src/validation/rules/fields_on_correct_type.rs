use crate::{
    ast::{Field, Positioned},
    suggestion::make_suggestion,
    validation::visitor::{Visitor, VisitorContext},
};

/// Every field selection must exist on its parent composite type.
pub struct FieldsOnCorrectType;

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(parent) = ctx.parent_type() else {
            return;
        };
        if ctx.current_field().is_some() {
            return;
        }
        // Unions expose no fields of their own, only `__typename`.
        let name = &field.node.name.node;
        let hint = parent
            .fields()
            .and_then(|fields| {
                make_suggestion(" Did you mean", fields.keys().map(String::as_str), name)
            })
            .unwrap_or_default();
        ctx.report_error(
            vec![field.pos],
            format!(
                "Cannot query field \"{name}\" on type \"{}\".{hint}",
                parent.name()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fields_pass() {
        expect_passes_rule!(
            FieldsOnCorrectType,
            r#"
            {
                dog { name __typename }
                pet { name }
                catOrDog { __typename ... on Dog { barkVolume } }
                __schema { queryType { name } }
            }
            "#,
        );
    }

    #[test]
    fn unknown_field_fails_with_hint() {
        let errors = expect_fails_rule!(FieldsOnCorrectType, "{ dog { nicknam } }");
        assert_eq!(
            errors[0].message,
            "Cannot query field \"nicknam\" on type \"Dog\". Did you mean \"nickname\"?"
        );
    }

    #[test]
    fn field_on_union_fails() {
        let errors = expect_fails_rule!(FieldsOnCorrectType, "{ catOrDog { name } }");
        assert_eq!(
            errors[0].message,
            "Cannot query field \"name\" on type \"CatOrDog\"."
        );
    }
}
