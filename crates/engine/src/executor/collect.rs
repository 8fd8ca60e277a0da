//! Selection-set collection.
//!
//! Flattens a selection set into an ordered map from response key to the
//! field nodes grouped under it, resolving `@skip`/`@include`, fragment
//! spreads and type conditions along the way.

use std::collections::HashSet;

use engine_value::Name;
use indexmap::IndexMap;

use crate::{
    ast::{Field, Positioned, Selection, SelectionSet, TypeCondition},
    context::ExecutionContext,
    directives::is_selection_included,
    error::ServerResult,
    registry::{MetaType, Registry},
};

/// Fields grouped by response key, in source order. Duplicate response
/// keys append to the existing group.
pub(crate) type FieldGroups<'a> = IndexMap<Name, Vec<&'a Positioned<Field>>>;

pub(crate) fn collect_fields<'a>(
    ctx: &ExecutionContext<'a>,
    parent_type: &MetaType,
    selection_set: &'a Positioned<SelectionSet>,
) -> ServerResult<FieldGroups<'a>> {
    let mut groups = FieldGroups::new();
    let mut visited_fragments = HashSet::new();
    collect_into(ctx, parent_type, selection_set, &mut groups, &mut visited_fragments)?;
    Ok(groups)
}

/// Collect the merged sub-selections of every field node in a group.
pub(crate) fn collect_subfields<'a>(
    ctx: &ExecutionContext<'a>,
    parent_type: &MetaType,
    field_nodes: &[&'a Positioned<Field>],
) -> ServerResult<FieldGroups<'a>> {
    let mut groups = FieldGroups::new();
    let mut visited_fragments = HashSet::new();
    for field in field_nodes {
        if !field.node.selection_set.node.is_empty() {
            collect_into(
                ctx,
                parent_type,
                &field.node.selection_set,
                &mut groups,
                &mut visited_fragments,
            )?;
        }
    }
    Ok(groups)
}

fn collect_into<'a>(
    ctx: &ExecutionContext<'a>,
    parent_type: &MetaType,
    selection_set: &'a Positioned<SelectionSet>,
    groups: &mut FieldGroups<'a>,
    visited_fragments: &mut HashSet<&'a str>,
) -> ServerResult<()> {
    for selection in &selection_set.node.items {
        if !is_selection_included(ctx.registry, selection.node.directives(), &ctx.variables)? {
            continue;
        }
        match &selection.node {
            Selection::Field(field) => {
                groups
                    .entry(field.node.response_key().node.clone())
                    .or_default()
                    .push(field);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                if !visited_fragments.insert(name) {
                    continue;
                }
                // An unknown fragment is validation's problem; execution
                // just skips it.
                let Some(fragment) = ctx.fragment(name) else {
                    continue;
                };
                if !condition_matches(
                    ctx.registry,
                    Some(&fragment.node.type_condition),
                    parent_type,
                ) {
                    continue;
                }
                collect_into(
                    ctx,
                    parent_type,
                    &fragment.node.selection_set,
                    groups,
                    visited_fragments,
                )?;
            }
            Selection::InlineFragment(fragment) => {
                if !condition_matches(
                    ctx.registry,
                    fragment.node.type_condition.as_ref(),
                    parent_type,
                ) {
                    continue;
                }
                collect_into(
                    ctx,
                    parent_type,
                    &fragment.node.selection_set,
                    groups,
                    visited_fragments,
                )?;
            }
        }
    }
    Ok(())
}

/// Whether a type condition applies to the concrete type being executed.
fn condition_matches(
    registry: &Registry,
    condition: Option<&Positioned<TypeCondition>>,
    parent_type: &MetaType,
) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    let on = condition.node.on.node.as_str();
    if on == parent_type.name() {
        return true;
    }
    registry
        .lookup_type(on)
        .is_some_and(|meta| meta.is_abstract() && registry.is_sub_type(on, parent_type.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::ExecutionContext,
        registry::{MetaField, ObjectType, Registry, UnionType},
        validation::test_harness::parse,
    };
    use engine_value::{ConstValue, Variables};

    fn registry() -> Registry {
        Registry::builder("Query")
            .register(
                ObjectType::new("Query")
                    .field(MetaField::new("a", "String"))
                    .field(MetaField::new("b", "String"))
                    .field(MetaField::new("u", "U")),
            )
            .register(ObjectType::new("Other").field(MetaField::new("x", "String")))
            .register(UnionType::new("U").member("Query"))
            .build()
            .unwrap()
    }

    fn keys<'a>(groups: &'a FieldGroups<'a>) -> Vec<&'a str> {
        groups.keys().map(|key| key.as_str()).collect()
    }

    #[test]
    fn response_keys_keep_source_order() {
        let registry = registry();
        let document = parse("{ second: b a b ...F }\nfragment F on Query { a tail: a }");
        let operation = document.operations().next().unwrap();
        let root = ConstValue::Null;
        let ctx = ExecutionContext::new(
            &registry,
            operation,
            crate::executor::fragment_map(&document),
            Variables::default(),
            &root,
            None,
            None,
            None,
        );
        let root_type = registry.query_type();
        let groups =
            collect_fields(&ctx, root_type, &operation.node.selection_set).unwrap();
        assert_eq!(keys(&groups), ["second", "a", "b", "tail"]);
        // `a` was selected directly and again through the fragment.
        assert_eq!(groups["a"].len(), 2);
    }

    #[test]
    fn skip_and_include_are_applied() {
        let registry = registry();
        let document = parse(
            r#"{
                a @skip(if: true)
                b @skip(if: false) @include(if: true)
                both: a @skip(if: true) @include(if: true)
            }"#,
        );
        let operation = document.operations().next().unwrap();
        let root = ConstValue::Null;
        let ctx = ExecutionContext::new(
            &registry,
            operation,
            Default::default(),
            Variables::default(),
            &root,
            None,
            None,
            None,
        );
        let groups =
            collect_fields(&ctx, registry.query_type(), &operation.node.selection_set).unwrap();
        assert_eq!(keys(&groups), ["b"]);
    }

    #[test]
    fn incompatible_type_conditions_are_skipped() {
        let registry = registry();
        let document = parse("{ ... on Other { x } ... on U { a } b }");
        let operation = document.operations().next().unwrap();
        let root = ConstValue::Null;
        let ctx = ExecutionContext::new(
            &registry,
            operation,
            Default::default(),
            Variables::default(),
            &root,
            None,
            None,
            None,
        );
        let groups =
            collect_fields(&ctx, registry.query_type(), &operation.node.selection_set).unwrap();
        // `Other` can never be `Query`; the union `U` can.
        assert_eq!(keys(&groups), ["a", "b"]);
    }
}
