use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{
    ast::{Field, Positioned, Selection, SelectionSet},
    validation::visitor::{Visitor, VisitorContext},
};

/// Selections sharing a response key must be mergeable: the same field,
/// called with the same arguments.
#[derive(Default)]
pub struct OverlappingFieldsCanBeMerged {
    reported: HashSet<(usize, usize)>,
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged {
    fn enter_selection_set(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        selection_set: &'a Positioned<SelectionSet>,
    ) {
        let mut groups: IndexMap<&'a str, Vec<&'a Positioned<Field>>> = IndexMap::new();
        let mut visited_fragments = HashSet::new();
        collect_fields(ctx, selection_set, &mut groups, &mut visited_fragments);

        for fields in groups.values() {
            let first = fields[0];
            for other in &fields[1..] {
                let pair = (
                    std::ptr::from_ref(first) as usize,
                    std::ptr::from_ref(*other) as usize,
                );
                if self.reported.contains(&pair) {
                    continue;
                }
                let response_key = &first.node.response_key().node;
                if first.node.name.node != other.node.name.node {
                    self.reported.insert(pair);
                    ctx.report_error(
                        vec![first.pos, other.pos],
                        format!(
                            "Fields \"{response_key}\" conflict because \"{}\" and \"{}\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
                            first.node.name.node, other.node.name.node
                        ),
                    );
                } else if !same_arguments(&first.node, &other.node) {
                    self.reported.insert(pair);
                    ctx.report_error(
                        vec![first.pos, other.pos],
                        format!(
                            "Fields \"{response_key}\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional."
                        ),
                    );
                }
            }
        }
    }
}

fn collect_fields<'a>(
    ctx: &VisitorContext<'a>,
    selection_set: &'a Positioned<SelectionSet>,
    groups: &mut IndexMap<&'a str, Vec<&'a Positioned<Field>>>,
    visited_fragments: &mut HashSet<&'a str>,
) {
    for selection in &selection_set.node.items {
        match &selection.node {
            Selection::Field(field) => {
                groups
                    .entry(field.node.response_key().node.as_str())
                    .or_default()
                    .push(field);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                if visited_fragments.insert(name) {
                    if let Some(fragment) = ctx.fragment(name) {
                        collect_fields(ctx, &fragment.node.selection_set, groups, visited_fragments);
                    }
                }
            }
            Selection::InlineFragment(fragment) => {
                collect_fields(ctx, &fragment.node.selection_set, groups, visited_fragments);
            }
        }
    }
}

fn same_arguments(a: &Field, b: &Field) -> bool {
    if a.arguments.len() != b.arguments.len() {
        return false;
    }
    a.arguments.iter().all(|(name, value)| {
        b.arguments
            .iter()
            .find(|(other_name, _)| other_name.node == name.node)
            .is_some_and(|(_, other_value)| value.node == other_value.node)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_and_aliased_fields_pass() {
        expect_passes_rule!(
            OverlappingFieldsCanBeMerged::default(),
            r#"
            {
                dog { name name otherName: name }
                cat: dog { name }
            }
            "#,
        );
    }

    #[test]
    fn aliases_hiding_different_fields_fail() {
        let errors = expect_fails_rule!(
            OverlappingFieldsCanBeMerged::default(),
            "{ dog { fido: name fido: nickname } }",
        );
        assert_eq!(
            errors[0].message,
            "Fields \"fido\" conflict because \"name\" and \"nickname\" are different fields. Use different aliases on the fields to fetch both if this was intentional."
        );
    }

    #[test]
    fn differing_arguments_fail() {
        let errors = expect_fails_rule!(
            OverlappingFieldsCanBeMerged::default(),
            "{ dog { doesKnowCommand(dogCommand: SIT) doesKnowCommand(dogCommand: HEEL) } }",
        );
        assert_eq!(
            errors[0].message,
            "Fields \"doesKnowCommand\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional."
        );
    }

    #[test]
    fn conflicts_through_fragments_are_found() {
        let errors = expect_fails_rule!(
            OverlappingFieldsCanBeMerged::default(),
            r#"
            { dog { ...A ...B } }
            fragment A on Dog { x: name }
            fragment B on Dog { x: nickname }
            "#,
        );
        assert_eq!(errors.len(), 1);
    }
}
