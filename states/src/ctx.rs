use std::any::{Any, TypeId};
use std::collections::BTreeMap;

use flume::{Receiver, Sender};

use crate::{
    Command, Compute, ComputeStage, Dep, Graph, State, StateSyncStatus, TopologyError, Updater,
};

struct Slot<T> {
    value: T,
    status: StateSyncStatus,
}

/// Registry of every [`State`] and [`Compute`] plus the update channel.
///
/// The frame loop drives it in three steps: `sync_computes` applies values
/// published since the last frame, the UI reads states and caches, and
/// `run_computed` re-runs computes whose dependencies changed.
pub struct StateCtx {
    send: Sender<(TypeId, Box<dyn Any + Send>)>,
    recv: Receiver<(TypeId, Box<dyn Any + Send>)>,

    states: BTreeMap<TypeId, Slot<Box<dyn State>>>,
    computes: BTreeMap<TypeId, Slot<Box<dyn Compute>>>,

    graph: Graph<TypeId>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            send,
            recv,
            states: BTreeMap::new(),
            computes: BTreeMap::new(),
            graph: Graph::new(),
        }
    }

    /// A clonable write half, safe to move into fetch callbacks.
    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(
            TypeId::of::<T>(),
            Slot {
                value: Box::new(state),
                status: StateSyncStatus::Clean,
            },
        );
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        let id = TypeId::of::<T>();
        let (state_deps, compute_deps) = compute.deps();
        for dep in state_deps.iter().chain(compute_deps) {
            self.graph.route_to(*dep, id);
        }
        self.computes.insert(
            id,
            Slot {
                value: Box::new(compute),
                status: StateSyncStatus::Init,
            },
        );
    }

    pub fn state_ref<T: State>(&self) -> Option<&T> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.as_any().downcast_ref::<T>())
    }

    /// Latest value of a cache or derived compute.
    pub fn cached<T: Compute>(&self) -> Option<&T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.as_any().downcast_ref::<T>())
    }

    /// Mutates a state in place and marks its dependents dirty.
    ///
    /// Missing registrations are logged and ignored; UI code calls this from
    /// input handlers where a panic would take the whole frame down.
    pub fn update_state<T: State>(&mut self, mutate: impl FnOnce(&mut T)) {
        let id = TypeId::of::<T>();
        match self
            .states
            .get_mut(&id)
            .and_then(|slot| slot.value.as_any_mut().downcast_mut::<T>())
        {
            Some(state) => mutate(state),
            None => {
                log::warn!("update_state: {} is not registered", std::any::type_name::<T>());
                return;
            }
        }
        self.mark_dependents_dirty(id);
    }

    /// Forces a compute to re-run on the next `run_computed`.
    pub fn mark_dirty<T: Any>(&mut self) {
        if let Some(slot) = self.computes.get_mut(&TypeId::of::<T>()) {
            slot.status = StateSyncStatus::Dirty;
        }
    }

    /// Runs a command right now, on the current thread.
    pub fn dispatch<C: Command>(&self) {
        C::default().run(Dep::new(self), self.updater());
    }

    /// Runs every compute whose status is `Init` or `Dirty`.
    pub fn run_computed(&mut self) {
        let due: Vec<TypeId> = self
            .computes
            .iter()
            .filter(|(_, slot)| {
                matches!(slot.status, StateSyncStatus::Init | StateSyncStatus::Dirty)
            })
            .map(|(id, _)| *id)
            .collect();

        for id in due {
            // Take the compute out so it can borrow the rest of the context.
            let Some(slot) = self.computes.remove(&id) else {
                continue;
            };
            let stage = slot.value.compute(Dep::new(self), self.updater());
            let status = match stage {
                ComputeStage::Pending => StateSyncStatus::Pending,
                ComputeStage::Finished => StateSyncStatus::Clean,
            };
            self.computes.insert(
                id,
                Slot {
                    value: slot.value,
                    status,
                },
            );
        }
    }

    /// Applies every value published through [`Updater::set`] since the last
    /// call, then marks dependents of the changed slots dirty.
    pub fn sync_computes(&mut self) {
        while let Ok((id, boxed)) = self.recv.try_recv() {
            let applied = if let Some(slot) = self.states.get_mut(&id) {
                slot.value.assign_box(boxed);
                slot.status = StateSyncStatus::Clean;
                true
            } else if let Some(slot) = self.computes.get_mut(&id) {
                slot.value.assign_box(boxed);
                slot.status = StateSyncStatus::Clean;
                true
            } else {
                log::warn!("sync_computes: dropping update for unregistered slot {id:?}");
                false
            };
            if applied {
                self.mark_dependents_dirty(id);
            }
        }
    }

    /// Verifies the recorded dependency graph has no cycles.
    pub fn verify_deps(&self) -> Result<(), TopologyError<TypeId>> {
        self.graph.topology_sort()
    }

    fn mark_dependents_dirty(&mut self, id: TypeId) {
        let dependents: Vec<TypeId> = self.graph.dependents_of(id).collect();
        for dependent in dependents {
            if let Some(slot) = self.computes.get_mut(&dependent) {
                slot.status = StateSyncStatus::Dirty;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign_impl;

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Input {
        value: i32,
    }

    impl State for Input {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Default)]
    struct Doubled {
        value: i32,
    }

    impl Compute for Doubled {
        fn deps(&self) -> crate::ComputeDeps {
            const STATE_IDS: [TypeId; 1] = [TypeId::of::<Input>()];
            (&STATE_IDS, &[])
        }

        fn compute(&self, deps: Dep<'_>, updater: Updater) -> ComputeStage {
            let input = deps.get_state_ref::<Input>();
            updater.set(Doubled {
                value: input.value * 2,
            });
            ComputeStage::Finished
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Default)]
    struct SetInputTo9;

    impl Command for SetInputTo9 {
        fn run(&self, _deps: Dep<'_>, updater: Updater) {
            updater.set(Input { value: 9 });
        }
    }

    fn ctx_with_input(value: i32) -> StateCtx {
        let mut ctx = StateCtx::new();
        ctx.add_state(Input { value });
        ctx.record_compute(Doubled::default());
        ctx
    }

    #[test]
    fn derived_compute_runs_and_syncs() {
        let mut ctx = ctx_with_input(21);
        ctx.run_computed();
        ctx.sync_computes();
        assert_eq!(ctx.cached::<Doubled>().map(|d| d.value), Some(42));
    }

    #[test]
    fn update_state_marks_dependents_dirty() {
        let mut ctx = ctx_with_input(1);
        ctx.run_computed();
        ctx.sync_computes();
        assert_eq!(ctx.cached::<Doubled>().map(|d| d.value), Some(2));

        ctx.update_state::<Input>(|input| input.value = 5);
        ctx.run_computed();
        ctx.sync_computes();
        assert_eq!(ctx.cached::<Doubled>().map(|d| d.value), Some(10));
    }

    #[test]
    fn clean_compute_does_not_rerun() {
        let mut ctx = ctx_with_input(3);
        ctx.run_computed();
        ctx.sync_computes();
        // Overwrite the cache directly; an unnecessary re-run would clobber it.
        ctx.updater().set(Doubled { value: 999 });
        ctx.sync_computes();
        ctx.run_computed();
        ctx.sync_computes();
        assert_eq!(ctx.cached::<Doubled>().map(|d| d.value), Some(999));
    }

    #[test]
    fn dispatch_routes_through_updater() {
        let mut ctx = ctx_with_input(0);
        ctx.dispatch::<SetInputTo9>();
        ctx.sync_computes();
        assert_eq!(ctx.state_ref::<Input>().map(|i| i.value), Some(9));

        // The state change marks the dependent compute dirty.
        ctx.run_computed();
        ctx.sync_computes();
        assert_eq!(ctx.cached::<Doubled>().map(|d| d.value), Some(18));
    }

    #[test]
    fn update_for_unregistered_slot_is_dropped() {
        let mut ctx = StateCtx::new();
        ctx.updater().set(Input { value: 1 });
        ctx.sync_computes();
        assert!(ctx.state_ref::<Input>().is_none());
    }

    #[test]
    fn verify_deps_accepts_recorded_graph() {
        let ctx = ctx_with_input(0);
        assert!(ctx.verify_deps().is_ok());
    }
}
