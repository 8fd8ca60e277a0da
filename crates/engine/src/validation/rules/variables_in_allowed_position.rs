use std::collections::HashMap;

use crate::{
    ast::{OperationDefinition, Positioned, VariableDefinition},
    registry::{MetaFieldType, MetaTypeName},
    validation::visitor::{Visitor, VisitorContext},
};

/// A variable may only appear in positions its declared type can satisfy.
#[derive(Default)]
pub struct VariablesInAllowedPosition<'a> {
    definitions: HashMap<&'a str, (&'a Positioned<VariableDefinition>, MetaFieldType)>,
}

impl<'a> Visitor<'a> for VariablesInAllowedPosition<'a> {
    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        self.definitions = operation
            .node
            .variable_definitions
            .iter()
            .map(|definition| {
                (
                    definition.node.name.node.as_str(),
                    (definition, MetaFieldType::from(&definition.node.var_type.node)),
                )
            })
            .collect();
    }

    fn exit_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        for usage in ctx.recursive_variable_usages(operation) {
            let Some((definition, var_type)) = self.definitions.get(usage.name.as_str()) else {
                continue;
            };
            let Some(expected) = &usage.ty else {
                continue;
            };
            if !allowed_variable_usage(
                var_type,
                definition.node.default_value().is_some(),
                expected,
                usage.default_value.is_some(),
            ) {
                ctx.report_error(
                    vec![definition.pos, usage.pos],
                    format!(
                        "Variable \"${}\" of type \"{var_type}\" used in position expecting type \"{expected}\".",
                        usage.name
                    ),
                );
            }
        }
    }
}

/// A nullable variable may flow into a non-null position only when a
/// default fills the gap; otherwise the usual spread subtyping applies.
fn allowed_variable_usage(
    var_type: &MetaFieldType,
    var_has_default: bool,
    location_type: &MetaFieldType,
    location_has_default: bool,
) -> bool {
    if location_type.is_non_null() && !var_type.is_non_null() {
        if !var_has_default && !location_has_default {
            return false;
        }
        let nullable_location = location_type
            .as_str()
            .strip_suffix('!')
            .unwrap_or(location_type.as_str());
        return MetaTypeName::create(nullable_location)
            .is_subtype(&MetaTypeName::create(var_type.as_str()));
    }
    MetaTypeName::create(location_type.as_str()).is_subtype(&MetaTypeName::create(var_type.as_str()))
}
