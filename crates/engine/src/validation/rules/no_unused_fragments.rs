use std::collections::HashSet;

use crate::{
    ast::{Document, FragmentDefinition, OperationDefinition, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Every fragment definition must be reachable from some operation.
#[derive(Default)]
pub struct NoUnusedFragments<'a> {
    operations: Vec<&'a Positioned<OperationDefinition>>,
    fragments: Vec<&'a Positioned<FragmentDefinition>>,
}

impl<'a> Visitor<'a> for NoUnusedFragments<'a> {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        self.operations.push(operation);
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.fragments.push(fragment);
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a Document) {
        let mut referenced = HashSet::new();
        for operation in self.operations.iter().copied() {
            for fragment in ctx.recursively_referenced_fragments(operation).iter().copied() {
                referenced.insert(fragment.node.name.node.as_str());
            }
        }
        for fragment in &self.fragments {
            let name = &fragment.node.name.node;
            if !referenced.contains(name.as_str()) {
                ctx.report_error(
                    vec![fragment.pos],
                    format!("Fragment \"{name}\" is never used."),
                );
            }
        }
    }
}
