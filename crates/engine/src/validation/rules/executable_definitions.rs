use crate::{
    ast::{Definition, Document, TypeSystemDefinition},
    validation::visitor::{Visitor, VisitorContext},
};

/// Every top-level definition must be an operation or a fragment.
pub struct ExecutableDefinitions;

impl<'a> Visitor<'a> for ExecutableDefinitions {
    fn enter_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        for definition in &doc.definitions {
            let Definition::TypeSystem(type_system) = definition else {
                continue;
            };
            let def_name = match type_system {
                TypeSystemDefinition::Schema(_) => "schema".to_string(),
                TypeSystemDefinition::Type(name) | TypeSystemDefinition::Directive(name) => {
                    name.node.to_string()
                }
            };
            ctx.report_error(
                vec![type_system.pos()],
                format!("The \"{def_name}\" definition is not executable."),
            );
        }
    }
}
