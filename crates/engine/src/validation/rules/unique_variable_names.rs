use std::collections::HashSet;

use crate::{
    ast::{OperationDefinition, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// An operation may not declare two variables with the same name.
pub struct UniqueVariableNames;

impl<'a> Visitor<'a> for UniqueVariableNames {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let mut seen = HashSet::new();
        for definition in &operation.node.variable_definitions {
            let name = &definition.node.name.node;
            if !seen.insert(name.as_str()) {
                ctx.report_error(
                    vec![definition.pos],
                    format!("There can be only one variable named \"${name}\"."),
                );
            }
        }
    }
}
