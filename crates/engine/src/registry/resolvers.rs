//! Resolver hook types.
//!
//! Resolvers return a [`FieldFuture`]: either an already-resolved value or
//! a boxed future. A resolver that answers synchronously never allocates,
//! which keeps the all-sync query path cheap.

use std::{future::Future, sync::Arc};

use engine_value::ConstValue;
use futures_util::{future::BoxFuture, stream::BoxStream, FutureExt};

use crate::{context::ResolverContext, error::Result};

/// The outcome of invoking a field resolver.
pub enum FieldFuture<'a> {
    /// A synchronously produced value; `None` means "unresolved", which
    /// completes to `null` under a nullable type.
    Value(Option<ConstValue>),
    /// A value still being produced.
    Future(BoxFuture<'a, Result<Option<ConstValue>>>),
}

impl<'a> FieldFuture<'a> {
    /// Wrap an asynchronous resolution.
    pub fn new<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<Option<ConstValue>>> + Send + 'a,
    {
        FieldFuture::Future(future.boxed())
    }

    /// Wrap an immediately available value.
    pub fn from_value(value: Option<ConstValue>) -> Self {
        FieldFuture::Value(value)
    }
}

impl From<ConstValue> for FieldFuture<'_> {
    fn from(value: ConstValue) -> Self {
        FieldFuture::Value(Some(value))
    }
}

/// A field resolver.
pub type ResolverFn =
    Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync>;

/// A subscription root field's source-stream factory.
pub type SubscribeFn = Arc<
    dyn for<'a> Fn(ResolverContext<'a>) -> Result<BoxStream<'a, Result<ConstValue>>>
        + Send
        + Sync,
>;

/// Decides whether a runtime value belongs to an object type.
pub type IsTypeOfFn = Arc<dyn Fn(&ConstValue) -> bool + Send + Sync>;

/// Resolves the concrete object type of an abstract-typed value.
pub type ResolveTypeFn = Arc<dyn Fn(&ConstValue) -> Option<String> + Send + Sync>;
