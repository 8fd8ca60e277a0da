use std::collections::HashSet;

use engine_value::{Name, Value};

use crate::{
    ast::{Directive, Field, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// No argument may be given twice on the same field or directive.
pub struct UniqueArgumentNames;

fn check<'a>(
    ctx: &mut VisitorContext<'a>,
    arguments: &'a [(Positioned<Name>, Positioned<Value>)],
) {
    let mut seen = HashSet::new();
    for (name, _) in arguments {
        if !seen.insert(name.node.as_str()) {
            ctx.report_error(
                vec![name.pos],
                format!("There can be only one argument named \"{}\".", name.node),
            );
        }
    }
}

impl<'a> Visitor<'a> for UniqueArgumentNames {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        check(ctx, &field.node.arguments);
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
        check(ctx, &directive.node.arguments);
    }
}
