use std::any::{Any, TypeId};

use crate::{Dep, Updater};

/// Dependency lists of a compute: `(state type ids, compute type ids)`.
pub type ComputeDeps = (&'static [TypeId], &'static [TypeId]);

/// Outcome of one `compute` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeStage {
    /// Work was started (usually a fetch); the result will arrive later
    /// through the [`Updater`]. The compute stays pending and will not be
    /// re-run until a new value lands or a dependency changes again.
    Pending,
    /// The compute is up to date.
    Finished,
}

/// Derived data registered in a [`StateCtx`](crate::StateCtx).
///
/// Two flavors exist in practice:
/// - derived computes, which read their dependencies via [`Dep`] and push a
///   fresh value of themselves through the [`Updater`];
/// - cache computes, whose `compute` is a no-op and which are written only by
///   commands or callbacks (see the business crate's fetch caches).
///
/// `compute` takes `&self`: a run must not mutate in place, it publishes a
/// replacement value instead. This is what makes late callbacks harmless.
pub trait Compute: Any {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater) -> ComputeStage;

    fn as_any(&self) -> &dyn Any;

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}
