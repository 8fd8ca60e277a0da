use std::collections::HashMap;

use crate::{
    ast::{OperationDefinition, Pos, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Named operations must be unique within a document.
#[derive(Default)]
pub struct UniqueOperationNames<'a> {
    names: HashMap<&'a str, Pos>,
}

impl<'a> Visitor<'a> for UniqueOperationNames<'a> {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let Some(name) = &operation.node.name else {
            return;
        };
        match self.names.get(name.node.as_str()) {
            Some(first) => ctx.report_error(
                vec![*first, name.pos],
                format!("There can be only one operation named \"{}\".", name.node),
            ),
            None => {
                self.names.insert(name.node.as_str(), name.pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_names_pass() {
        expect_passes_rule!(
            UniqueOperationNames::default(),
            r#"
            query A { dog { name } }
            query B { dog { name } }
            "#,
        );
    }

    #[test]
    fn duplicate_names_fail() {
        let errors = expect_fails_rule!(
            UniqueOperationNames::default(),
            r#"
            query A { dog { name } }
            query A { cat { name } }
            "#,
        );
        assert_eq!(
            errors[0].message,
            "There can be only one operation named \"A\"."
        );
    }
}
