use crate::{
    ast::{
        Directive, Field, FragmentDefinition, FragmentSpread, InlineFragment,
        OperationDefinition, OperationType, Positioned, VariableDefinition,
    },
    registry::DirectiveLocation,
    validation::visitor::{Visitor, VisitorContext},
};

/// Directives must be declared, and applied at locations they are
/// declared for.
#[derive(Default)]
pub struct KnownDirectives {
    location_stack: Vec<DirectiveLocation>,
}

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        self.location_stack.push(match operation.node.ty {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        });
    }

    fn exit_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _operation: &'a Positioned<OperationDefinition>,
    ) {
        self.location_stack.pop();
    }

    fn enter_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.location_stack.push(DirectiveLocation::Field);
    }

    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.location_stack.pop();
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.location_stack.push(DirectiveLocation::FragmentDefinition);
    }

    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.location_stack.pop();
    }

    fn enter_fragment_spread(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _spread: &'a Positioned<FragmentSpread>,
    ) {
        self.location_stack.push(DirectiveLocation::FragmentSpread);
    }

    fn exit_fragment_spread(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _spread: &'a Positioned<FragmentSpread>,
    ) {
        self.location_stack.pop();
    }

    fn enter_inline_fragment(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<InlineFragment>,
    ) {
        self.location_stack.push(DirectiveLocation::InlineFragment);
    }

    fn exit_inline_fragment(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<InlineFragment>,
    ) {
        self.location_stack.pop();
    }

    fn enter_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _definition: &'a Positioned<VariableDefinition>,
    ) {
        self.location_stack.push(DirectiveLocation::VariableDefinition);
    }

    fn exit_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _definition: &'a Positioned<VariableDefinition>,
    ) {
        self.location_stack.pop();
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let name = &directive.node.name.node;
        let Some(directive_def) = registry.directive(name) else {
            ctx.report_error(vec![directive.pos], format!("Unknown directive \"@{name}\"."));
            return;
        };
        if let Some(location) = self.location_stack.last() {
            if !directive_def.locations.contains(location) {
                ctx.report_error(
                    vec![directive.pos],
                    format!("Directive \"@{name}\" may not be used on {location}."),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_directives_in_valid_locations_pass() {
        expect_passes_rule!(
            KnownDirectives::default(),
            r#"
            {
                dog {
                    name @include(if: true)
                    ...Frag @skip(if: false)
                    ... @include(if: true) { nickname }
                }
            }
            fragment Frag on Dog { name }
            "#,
        );
    }

    #[test]
    fn unknown_directive_fails() {
        let errors = expect_fails_rule!(
            KnownDirectives::default(),
            "{ dog { name @mispelled } }",
        );
        assert_eq!(errors[0].message, "Unknown directive \"@mispelled\".");
    }

    #[test]
    fn misplaced_directive_fails() {
        let errors = expect_fails_rule!(
            KnownDirectives::default(),
            "query @skip(if: true) { dog { name } }",
        );
        assert_eq!(
            errors[0].message,
            "Directive \"@skip\" may not be used on QUERY."
        );
    }
}
