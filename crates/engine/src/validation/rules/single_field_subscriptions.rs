use crate::{
    ast::{OperationDefinition, OperationType, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Subscription operations must select exactly one top-level field.
pub struct SingleFieldSubscriptions;

impl<'a> Visitor<'a> for SingleFieldSubscriptions {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        if operation.node.ty != OperationType::Subscription {
            return;
        }
        if operation.node.selection_set.node.items.len() != 1 {
            let message = match &operation.node.name {
                Some(name) => format!(
                    "Subscription \"{}\" must select only one top level field.",
                    name.node
                ),
                None => "Anonymous Subscription must select only one top level field.".to_string(),
            };
            ctx.report_error(vec![operation.pos], message);
        }
    }
}
