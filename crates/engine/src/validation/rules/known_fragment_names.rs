use crate::{
    ast::{FragmentSpread, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Every fragment spread must name a fragment defined in the document.
pub struct KnownFragmentNames;

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        spread: &'a Positioned<FragmentSpread>,
    ) {
        let name = &spread.node.fragment_name.node;
        if ctx.fragment(name).is_none() {
            ctx.report_error(vec![spread.pos], format!("Unknown fragment \"{name}\"."));
        }
    }
}
