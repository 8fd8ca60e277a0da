use crate::{
    ast::{Directive, Field, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Non-null arguments without a default must be provided.
pub struct ProvidedRequiredArguments;

impl<'a> Visitor<'a> for ProvidedRequiredArguments {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(field_def) = ctx.current_field() else {
            return;
        };
        let Some(parent) = ctx.parent_type() else {
            return;
        };
        for arg in field_def.args.values() {
            let provided = field
                .node
                .arguments
                .iter()
                .any(|(name, _)| name.node == arg.name.as_str());
            if !provided && arg.ty.is_non_null() && arg.default_value.is_none() {
                ctx.report_error(
                    vec![field.pos],
                    format!(
                        "Field \"{}.{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        parent.name(),
                        field_def.name,
                        arg.name,
                        arg.ty
                    ),
                );
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let Some(directive_def) = registry.directive(&directive.node.name.node) else {
            return;
        };
        for arg in directive_def.args.values() {
            let provided = directive
                .node
                .arguments
                .iter()
                .any(|(name, _)| name.node == arg.name.as_str());
            if !provided && arg.ty.is_non_null() && arg.default_value.is_none() {
                ctx.report_error(
                    vec![directive.pos],
                    format!(
                        "Directive \"@{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        directive_def.name, arg.name, arg.ty
                    ),
                );
            }
        }
    }
}
