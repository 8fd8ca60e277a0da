//! Document validation.
//!
//! A document is checked by walking it once with every rule attached as a
//! visitor. [`check_rules`] runs the full canonical suite; [`validate`]
//! runs a caller-assembled rule list.

#[cfg(test)]
#[macro_use]
pub(crate) mod test_harness;

pub mod rules;
mod type_info;
mod utils;
mod visitor;

pub use type_info::{TypeInfo, VisitNode};
pub(crate) use type_info::get_field_def;
pub use visitor::{visit, VariableUsage, Visitor, VisitorContext, VisitorCons, VisitorNil};

use crate::{ast::Document, error::ServerError, registry::Registry};

/// How many errors are reported before validation gives up.
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Walk `document` once with the given rule list attached and return every
/// reported error. On reaching `max_errors` a terminal "too many errors"
/// entry is appended and the walk stops.
pub fn validate<'a, V: Visitor<'a>>(
    registry: &'a Registry,
    document: &'a Document,
    rules: V,
    max_errors: Option<usize>,
) -> Vec<ServerError> {
    let mut rules = rules;
    let mut ctx = VisitorContext::new(
        Some(registry),
        document,
        max_errors.unwrap_or(DEFAULT_MAX_ERRORS),
    );
    visit(&mut rules, &mut ctx, document);
    ctx.errors
}

/// Validate with rules that need no schema, for documents that define or
/// extend one.
pub fn validate_sdl<'a, V: Visitor<'a>>(document: &'a Document, rules: V) -> Vec<ServerError> {
    let mut rules = rules;
    let mut ctx = VisitorContext::new(None, document, DEFAULT_MAX_ERRORS);
    visit(&mut rules, &mut ctx, document);
    ctx.errors
}

/// Run the full canonical rule suite.
pub fn check_rules(registry: &Registry, document: &Document) -> Result<(), Vec<ServerError>> {
    let rules = VisitorNil
        .with(rules::ExecutableDefinitions)
        .with(rules::UniqueOperationNames::default())
        .with(rules::LoneAnonymousOperation::default())
        .with(rules::SingleFieldSubscriptions)
        .with(rules::KnownTypeNames)
        .with(rules::FragmentsOnCompositeTypes)
        .with(rules::VariablesAreInputTypes)
        .with(rules::ScalarLeafs)
        .with(rules::FieldsOnCorrectType)
        .with(rules::ProvidedRequiredArguments)
        .with(rules::KnownArgumentNames::default())
        .with(rules::UniqueArgumentNames)
        .with(rules::ValuesOfCorrectType)
        .with(rules::VariablesInAllowedPosition::default())
        .with(rules::OverlappingFieldsCanBeMerged::default())
        .with(rules::NoFragmentCycles::default())
        .with(rules::KnownFragmentNames)
        .with(rules::NoUndefinedVariables)
        .with(rules::NoUnusedVariables)
        .with(rules::NoUnusedFragments::default())
        .with(rules::PossibleFragmentSpreads)
        .with(rules::KnownDirectives::default())
        .with(rules::UniqueDirectivesPerLocation)
        .with(rules::UniqueVariableNames);

    let errors = validate(registry, document, rules, Some(DEFAULT_MAX_ERRORS));
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
