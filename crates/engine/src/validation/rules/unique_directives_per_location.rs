use std::collections::HashMap;

use crate::{
    ast::{
        Directive, Field, FragmentDefinition, FragmentSpread, InlineFragment,
        OperationDefinition, Positioned,
    },
    validation::visitor::{Visitor, VisitorContext},
};

/// Non-repeatable directives may appear at most once per location.
pub struct UniqueDirectivesPerLocation;

fn check<'a>(ctx: &mut VisitorContext<'a>, directives: &'a [Positioned<Directive>]) {
    let mut seen: HashMap<&str, crate::ast::Pos> = HashMap::new();
    for directive in directives {
        let name = directive.node.name.node.as_str();
        let repeatable = ctx
            .registry
            .and_then(|registry| registry.directive(name))
            .is_some_and(|def| def.is_repeatable);
        if repeatable {
            continue;
        }
        match seen.get(name) {
            Some(first) => ctx.report_error(
                vec![*first, directive.pos],
                format!("The directive \"@{name}\" can only be used once at this location."),
            ),
            None => {
                seen.insert(name, directive.pos);
            }
        }
    }
}

impl<'a> Visitor<'a> for UniqueDirectivesPerLocation {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        check(ctx, &operation.node.directives);
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        check(ctx, &field.node.directives);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        check(ctx, &fragment.node.directives);
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        spread: &'a Positioned<FragmentSpread>,
    ) {
        check(ctx, &spread.node.directives);
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<InlineFragment>,
    ) {
        check(ctx, &fragment.node.directives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_directives_pass() {
        expect_passes_rule!(
            UniqueDirectivesPerLocation,
            "{ dog { name @skip(if: false) @include(if: true) } }",
        );
    }

    #[test]
    fn repeated_directive_fails() {
        let errors = expect_fails_rule!(
            UniqueDirectivesPerLocation,
            "{ dog { name @skip(if: false) @skip(if: false) } }",
        );
        assert_eq!(
            errors[0].message,
            "The directive \"@skip\" can only be used once at this location."
        );
    }
}
