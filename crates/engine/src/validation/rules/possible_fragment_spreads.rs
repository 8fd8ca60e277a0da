use crate::{
    ast::{FragmentSpread, InlineFragment, Positioned},
    registry::MetaType,
    validation::visitor::{Visitor, VisitorContext},
};

/// A fragment can only be spread where its type condition can possibly
/// apply.
pub struct PossibleFragmentSpreads;

impl PossibleFragmentSpreads {
    fn check_overlap(
        &self,
        ctx: &mut VisitorContext<'_>,
        parent: Option<&MetaType>,
        fragment_type: Option<&MetaType>,
        pos: crate::ast::Pos,
        fragment_name: Option<&str>,
    ) {
        let Some(registry) = ctx.registry else {
            return;
        };
        let (Some(parent), Some(fragment_type)) = (parent, fragment_type) else {
            return;
        };
        if !parent.is_composite() || !fragment_type.is_composite() {
            return;
        }
        if registry.types_overlap(parent, fragment_type) {
            return;
        }
        let message = match fragment_name {
            Some(name) => format!(
                "Fragment \"{name}\" cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                parent.name(),
                fragment_type.name()
            ),
            None => format!(
                "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                parent.name(),
                fragment_type.name()
            ),
        };
        ctx.report_error(vec![pos], message);
    }
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<InlineFragment>,
    ) {
        if fragment.node.type_condition.is_none() {
            return;
        }
        let fragment_type = ctx.current_named_type();
        let parent = ctx.parent_type();
        self.check_overlap(ctx, parent, fragment_type, fragment.pos, None);
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        spread: &'a Positioned<FragmentSpread>,
    ) {
        let name = spread.node.fragment_name.node.as_str();
        let Some(fragment) = ctx.fragment(name) else {
            return;
        };
        let fragment_type = ctx
            .registry
            .and_then(|registry| {
                registry.lookup_type(fragment.node.type_condition.node.on.node.as_str())
            });
        let parent = ctx.parent_type();
        self.check_overlap(ctx, parent, fragment_type, spread.pos, Some(name));
    }
}
