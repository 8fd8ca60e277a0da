use crate::{
    ast::{Positioned, VariableDefinition},
    registry::MetaFieldType,
    validation::visitor::{Visitor, VisitorContext},
};

/// Every declared variable's type must be an input type.
pub struct VariablesAreInputTypes;

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        definition: &'a Positioned<VariableDefinition>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let ty = MetaFieldType::from(&definition.node.var_type.node);
        // Unknown types are KnownTypeNames' to report.
        if registry
            .lookup_type(ty.named_type())
            .is_some_and(|meta| !meta.is_input())
        {
            ctx.report_error(
                vec![definition.node.var_type.pos],
                format!(
                    "Variable \"${}\" cannot be non-input type \"{ty}\".",
                    definition.node.name.node
                ),
            );
        }
    }
}
