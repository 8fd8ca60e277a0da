use engine_value::{Name, Value};

use crate::{
    ast::{Positioned, VariableDefinition},
    query_path::QueryPathSegment,
    validation::{
        utils::is_valid_input_value,
        visitor::{Visitor, VisitorContext},
    },
};

/// Literal argument values and variable defaults must match their
/// declared input types.
pub struct ValuesOfCorrectType;

impl<'a> Visitor<'a> for ValuesOfCorrectType {
    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let Some(expected) = ctx.current_input_type() else {
            return;
        };
        if let Some(reason) = is_valid_input_value(
            registry,
            expected.as_str(),
            &value.node,
            vec![QueryPathSegment::Name(name.node.to_string())],
        ) {
            ctx.report_error(
                vec![value.pos],
                format!("Invalid value for argument {reason}"),
            );
        }
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        definition: &'a Positioned<VariableDefinition>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let Some(default) = &definition.node.default_value else {
            return;
        };
        let ty = crate::registry::MetaFieldType::from(&definition.node.var_type.node);
        if registry.lookup_type(ty.named_type()).is_none() {
            return;
        }
        if let Some(reason) = is_valid_input_value(
            registry,
            ty.as_str(),
            &default.node.clone().into_value(),
            vec![QueryPathSegment::Name(
                definition.node.name.node.to_string(),
            )],
        ) {
            ctx.report_error(
                vec![default.pos],
                format!("Invalid default value for variable {reason}"),
            );
        }
    }
}
