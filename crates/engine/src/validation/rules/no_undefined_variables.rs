use std::collections::HashSet;

use crate::{
    ast::{OperationDefinition, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Every variable used by an operation (directly or via fragments) must
/// be declared by it.
pub struct NoUndefinedVariables;

impl<'a> Visitor<'a> for NoUndefinedVariables {
    fn exit_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let defined: HashSet<&str> = operation
            .node
            .variable_definitions
            .iter()
            .map(|definition| definition.node.name.node.as_str())
            .collect();

        let mut seen = HashSet::new();
        for usage in ctx.recursive_variable_usages(operation) {
            if defined.contains(usage.name.as_str()) || !seen.insert(usage.name.clone()) {
                continue;
            }
            let message = match &operation.node.name {
                Some(name) => format!(
                    "Variable \"${}\" is not defined by operation \"{}\".",
                    usage.name, name.node
                ),
                None => format!("Variable \"${}\" is not defined.", usage.name),
            };
            ctx.report_error(vec![usage.pos, operation.pos], message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_variables_pass() {
        expect_passes_rule!(
            NoUndefinedVariables,
            r#"
            query ($id: ID) { human(id: $id) { iq } }
            "#,
        );
    }

    #[test]
    fn undeclared_variable_fails() {
        let errors = expect_fails_rule!(
            NoUndefinedVariables,
            "query Q { human(id: $id) { iq } }",
        );
        assert_eq!(
            errors[0].message,
            "Variable \"$id\" is not defined by operation \"Q\"."
        );
    }

    #[test]
    fn undeclared_variable_in_fragment_fails() {
        let errors = expect_fails_rule!(
            NoUndefinedVariables,
            r#"
            query { dog { ...HouseTrained } }
            fragment HouseTrained on Dog { isHousetrained(atOtherHomes: $atOtherHomes) }
            "#,
        );
        assert_eq!(errors[0].message, "Variable \"$atOtherHomes\" is not defined.");
    }
}
