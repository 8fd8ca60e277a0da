use engine_value::Value;

use crate::{
    ast::{Directive, Field, Positioned},
    registry::{MetaDirective, MetaField, MetaType},
    suggestion::make_suggestion,
    validation::visitor::{Visitor, VisitorContext},
};

enum ArgPosition<'a> {
    Directive(&'a MetaDirective),
    Field {
        parent: &'a MetaType,
        field_def: &'a MetaField,
    },
}

/// Arguments must be declared on the field or directive they are passed
/// to.
#[derive(Default)]
pub struct KnownArgumentNames<'a> {
    position: Option<ArgPosition<'a>>,
}

impl<'a> Visitor<'a> for KnownArgumentNames<'a> {
    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
    ) {
        self.position = ctx
            .registry
            .and_then(|registry| registry.directive(&directive.node.name.node))
            .map(ArgPosition::Directive);
    }

    fn exit_directive(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _directive: &'a Positioned<Directive>,
    ) {
        self.position = None;
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.position = match (ctx.parent_type(), ctx.current_field()) {
            (Some(parent), Some(field_def)) => Some(ArgPosition::Field { parent, field_def }),
            _ => None,
        };
    }

    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a Positioned<Field>) {
        self.position = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Positioned<engine_value::Name>,
        _value: &'a Positioned<Value>,
    ) {
        match &self.position {
            Some(ArgPosition::Directive(directive)) => {
                if !directive.args.contains_key(name.node.as_str()) {
                    let hint = make_suggestion(
                        " Did you mean",
                        directive.args.keys().map(String::as_str),
                        &name.node,
                    )
                    .unwrap_or_default();
                    ctx.report_error(
                        vec![name.pos],
                        format!(
                            "Unknown argument \"{}\" on directive \"@{}\".{hint}",
                            name.node, directive.name
                        ),
                    );
                }
            }
            Some(ArgPosition::Field { parent, field_def }) => {
                if !field_def.args.contains_key(name.node.as_str()) {
                    let hint = make_suggestion(
                        " Did you mean",
                        field_def.args.keys().map(String::as_str),
                        &name.node,
                    )
                    .unwrap_or_default();
                    ctx.report_error(
                        vec![name.pos],
                        format!(
                            "Unknown argument \"{}\" on field \"{}\" of type \"{}\".{hint}",
                            name.node,
                            field_def.name,
                            parent.name()
                        ),
                    );
                }
            }
            None => {}
        }
    }
}
