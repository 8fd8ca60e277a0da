use crate::{
    ast::{Field, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Leaf fields must not have sub-selections; composite fields must.
pub struct ScalarLeafs;

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(declared) = ctx.current_type() else {
            return;
        };
        let Some(meta) = ctx.current_named_type() else {
            return;
        };
        let name = &field.node.name.node;
        let has_selection = !field.node.selection_set.node.is_empty();
        if meta.is_leaf() && has_selection {
            ctx.report_error(
                vec![field.pos],
                format!(
                    "Field \"{name}\" must not have a selection since type \"{declared}\" has no subfields."
                ),
            );
        } else if !meta.is_leaf() && !has_selection {
            ctx.report_error(
                vec![field.pos],
                format!(
                    "Field \"{name}\" of type \"{declared}\" must have a selection of subfields. Did you mean \"{name} {{ ... }}\"?"
                ),
            );
        }
    }
}
