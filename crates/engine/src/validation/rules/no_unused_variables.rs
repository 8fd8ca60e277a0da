use std::collections::HashSet;

use crate::{
    ast::{OperationDefinition, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Every declared variable must be used somewhere in its operation,
/// fragments included.
pub struct NoUnusedVariables;

impl<'a> Visitor<'a> for NoUnusedVariables {
    fn exit_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let used: HashSet<String> = ctx
            .recursive_variable_usages(operation)
            .into_iter()
            .map(|usage| usage.name.to_string())
            .collect();

        for definition in &operation.node.variable_definitions {
            let name = &definition.node.name.node;
            if used.contains(name.as_str()) {
                continue;
            }
            let message = match &operation.node.name {
                Some(op_name) => format!(
                    "Variable \"${name}\" is never used in operation \"{}\".",
                    op_name.node
                ),
                None => format!("Variable \"${name}\" is never used."),
            };
            ctx.report_error(vec![definition.pos], message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_variables_pass() {
        expect_passes_rule!(
            NoUnusedVariables,
            r#"
            query ($atOtherHomes: Boolean) { dog { ...HouseTrained } }
            fragment HouseTrained on Dog { isHousetrained(atOtherHomes: $atOtherHomes) }
            "#,
        );
    }

    #[test]
    fn unused_variable_fails() {
        let errors = expect_fails_rule!(
            NoUnusedVariables,
            "query Q($unused: Boolean) { dog { name } }",
        );
        assert_eq!(
            errors[0].message,
            "Variable \"$unused\" is never used in operation \"Q\"."
        );
    }
}
