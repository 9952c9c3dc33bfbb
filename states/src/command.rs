use std::any::Any;

use crate::{Dep, Updater};

/// A manual-only operation dispatched explicitly via
/// [`StateCtx::dispatch`](crate::StateCtx::dispatch).
///
/// Commands are where side effects live. They read inputs (form states,
/// config, the fetch service) through [`Dep`] and publish results through the
/// [`Updater`], typically into a cache compute. Parameters travel in input
/// states, so every command is a unit struct constructed via `Default`.
pub trait Command: Any + Default {
    fn run(&self, deps: Dep<'_>, updater: Updater);
}
