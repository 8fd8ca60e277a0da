//! Execution and validation core of a GraphQL engine.
//!
//! Given a built schema ([`Registry`]) and a parsed document
//! ([`ast::Document`]), this crate validates the document against the
//! canonical rule suite ([`check_rules`]) and executes operations against
//! resolver hooks ([`execute`], [`execute_sync`], [`subscribe`]),
//! producing a [`Response`], or a stream of them for subscriptions.
//!
//! Parsing, schema construction from SDL, introspection metadata and
//! transport are external collaborators: whatever sits in front of this
//! crate produces the AST and the registry and ships the response.

pub mod ast;
mod context;
mod directives;
mod error;
mod executor;
mod input_coercion;
pub mod query_path;
pub mod registry;
mod response;
mod suggestion;
pub mod validation;

pub use context::{Data, ExecutionContext, ResolverContext};
pub use directives::{get_directive_values, is_selection_included};
pub use error::{Error, ErrorExtensionValues, Result, ServerError, ServerResult};
pub use executor::{
    default_field_resolver, default_type_resolver, execute, execute_sync, subscribe,
    ExecutionArgs,
};
pub use input_coercion::{
    coerce_argument_values, coerce_input_value, coerce_variable_values, value_from_ast,
};
pub use query_path::{path_to_array, QueryPathSegment, ResponsePath, ResponsePathSegment};
pub use registry::Registry;
pub use response::Response;
pub use validation::{check_rules, validate, validate_sdl};

pub use ast::{Pos, Positioned};
pub use engine_value::{ConstValue, Name, Number, Value, Variables};
