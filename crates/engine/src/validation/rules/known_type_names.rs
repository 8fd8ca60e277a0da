use crate::{
    ast::{
        BaseType, FragmentDefinition, InlineFragment, Pos, Positioned, Type, VariableDefinition,
    },
    suggestion::make_suggestion,
    validation::visitor::{Visitor, VisitorContext},
};

/// Every type referenced by a type condition or variable definition must
/// exist in the schema.
pub struct KnownTypeNames;

impl KnownTypeNames {
    fn check_name(&self, ctx: &mut VisitorContext<'_>, name: &str, pos: Pos) {
        let Some(registry) = ctx.registry else {
            return;
        };
        if registry.lookup_type(name).is_some() || name.starts_with("__") {
            return;
        }
        let hint = make_suggestion(
            " Did you mean",
            registry.types.keys().map(String::as_str),
            name,
        )
        .unwrap_or_default();
        ctx.report_error(vec![pos], format!("Unknown type \"{name}\".{hint}"));
    }

    fn check_type(&self, ctx: &mut VisitorContext<'_>, ty: &Positioned<Type>) {
        fn innermost(ty: &Type) -> &str {
            match &ty.base {
                BaseType::Named(name) => name,
                BaseType::List(item) => innermost(item),
            }
        }
        self.check_name(ctx, innermost(&ty.node), ty.pos);
    }
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        definition: &'a Positioned<VariableDefinition>,
    ) {
        self.check_type(ctx, &definition.node.var_type);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let condition = &fragment.node.type_condition;
        self.check_name(ctx, &condition.node.on.node, condition.pos);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<InlineFragment>,
    ) {
        if let Some(condition) = &fragment.node.type_condition {
            self.check_name(ctx, &condition.node.on.node, condition.pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_type_names_pass() {
        expect_passes_rule!(
            KnownTypeNames,
            r#"
            query ($var: String, $required: [String!]!) {
                human(id: $var) { pets { ... on Pet { name } ...PetDetails } }
            }
            fragment PetDetails on Dog { nickname }
            "#,
        );
    }

    #[test]
    fn unknown_type_names_fail_with_hint() {
        let errors = expect_fails_rule!(
            KnownTypeNames,
            "fragment F on Dig { name }",
        );
        assert_eq!(
            errors[0].message,
            "Unknown type \"Dig\". Did you mean \"Dog\"?"
        );
    }
}
