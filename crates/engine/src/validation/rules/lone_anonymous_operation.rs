use crate::{
    ast::{Definition, Document, OperationDefinition, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// An anonymous operation must be the only operation in the document.
#[derive(Default)]
pub struct LoneAnonymousOperation {
    operation_count: usize,
}

impl<'a> Visitor<'a> for LoneAnonymousOperation {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        self.operation_count = doc
            .definitions
            .iter()
            .filter(|definition| matches!(definition, Definition::Operation(_)))
            .count();
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        if operation.node.name.is_none() && self.operation_count > 1 {
            ctx.report_error(
                vec![operation.pos],
                "This anonymous operation must be the only defined operation.",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_anonymous_operation_passes() {
        expect_passes_rule!(LoneAnonymousOperation::default(), "{ dog { name } }");
    }

    #[test]
    fn anonymous_operation_beside_named_one_fails() {
        let errors = expect_fails_rule!(
            LoneAnonymousOperation::default(),
            r#"
            { dog { name } }
            query Named { dog { name } }
            "#,
        );
        assert_eq!(
            errors[0].message,
            "This anonymous operation must be the only defined operation."
        );
    }
}
