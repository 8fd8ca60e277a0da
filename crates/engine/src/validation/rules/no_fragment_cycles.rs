use std::collections::{HashMap, HashSet};

use crate::{
    ast::{FragmentDefinition, FragmentSpread, Positioned},
    validation::visitor::{Visitor, VisitorContext},
};

/// Fragment spreads must not form cycles.
#[derive(Default)]
pub struct NoFragmentCycles<'a> {
    checked: HashSet<&'a str>,
}

impl<'a> NoFragmentCycles<'a> {
    fn detect_cycle_from(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
        spread_path: &mut Vec<&'a Positioned<FragmentSpread>>,
        path_index_by_name: &mut HashMap<&'a str, usize>,
    ) {
        let fragment_name = fragment.node.name.node.as_str();
        if !self.checked.insert(fragment_name) {
            return;
        }
        let spreads = ctx.fragment_spreads(&fragment.node.selection_set);
        if spreads.is_empty() {
            return;
        }

        path_index_by_name.insert(fragment_name, spread_path.len());
        for spread in spreads.iter().copied() {
            let spread_name = spread.node.fragment_name.node.as_str();
            spread_path.push(spread);
            match path_index_by_name.get(spread_name).copied() {
                Some(cycle_index) => {
                    let cycle_path = &spread_path[cycle_index..];
                    let via = cycle_path[..cycle_path.len() - 1]
                        .iter()
                        .map(|spread| format!("\"{}\"", spread.node.fragment_name.node))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let message = if via.is_empty() {
                        format!("Cannot spread fragment \"{spread_name}\" within itself.")
                    } else {
                        format!(
                            "Cannot spread fragment \"{spread_name}\" within itself via {via}."
                        )
                    };
                    let locations = cycle_path.iter().map(|spread| spread.pos).collect();
                    ctx.report_error(locations, message);
                }
                None => {
                    if let Some(next) = ctx.fragment(spread_name) {
                        self.detect_cycle_from(ctx, next, spread_path, path_index_by_name);
                    }
                }
            }
            spread_path.pop();
        }
        path_index_by_name.remove(fragment_name);
    }
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let mut spread_path = Vec::new();
        let mut path_index_by_name = HashMap::new();
        self.detect_cycle_from(ctx, fragment, &mut spread_path, &mut path_index_by_name);
    }
}
