use std::any::type_name;

use crate::{Compute, State, StateCtx};

/// Read-only view over the context handed to computes and commands.
///
/// Lookups panic on a missing registration: a compute asking for a state it
/// never declared (or that setup forgot to add) is a programming error and
/// should fail loudly in development rather than limp along.
#[derive(Clone, Copy)]
pub struct Dep<'a> {
    ctx: &'a StateCtx,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(ctx: &'a StateCtx) -> Self {
        Self { ctx }
    }

    /// # Panics
    /// Panics if no state of type `T` is registered.
    pub fn get_state_ref<T: State>(&self) -> &'a T {
        self.ctx
            .state_ref::<T>()
            .unwrap_or_else(|| panic!("Dep: state {} is not registered", type_name::<T>()))
    }

    /// # Panics
    /// Panics if no compute of type `T` is registered.
    pub fn get_compute_ref<T: Compute>(&self) -> &'a T {
        self.ctx
            .cached::<T>()
            .unwrap_or_else(|| panic!("Dep: compute {} is not registered", type_name::<T>()))
    }
}
