use crate::{
    ast::{FragmentDefinition, InlineFragment, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Fragment type conditions must name composite types.
pub struct FragmentsOnCompositeTypes;

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let condition = &fragment.node.type_condition;
        let on = condition.node.on.node.as_str();
        if registry
            .lookup_type(on)
            .is_some_and(|meta| !meta.is_composite())
        {
            ctx.report_error(
                vec![condition.pos],
                format!(
                    "Fragment \"{}\" cannot condition on non composite type \"{on}\".",
                    fragment.node.name.node
                ),
            );
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<InlineFragment>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let Some(condition) = &fragment.node.type_condition else {
            return;
        };
        let on = condition.node.on.node.as_str();
        if registry
            .lookup_type(on)
            .is_some_and(|meta| !meta.is_composite())
        {
            ctx.report_error(
                vec![condition.pos],
                format!("Fragment cannot condition on non composite type \"{on}\"."),
            );
        }
    }
}
