//! Reactive state core for the AgriLink client.
//!
//! The UI owns a single [`StateCtx`] holding every registered [`State`]
//! (plain data) and [`Compute`] (derived data or IO-backed cache). Mutations
//! never touch the context directly from a callback: they go through an
//! [`Updater`], which sends the new value over a channel, and the frame loop
//! applies them in [`StateCtx::sync_computes`]. This keeps fetch callbacks
//! free of references into the context, so a response arriving after the
//! owning widget is gone is simply dropped with the channel.

mod command;
mod compute;
mod ctx;
mod dep;
mod graph;
mod state;
mod state_sync_status;
mod time;
mod updater;

pub use command::Command;
pub use compute::{Compute, ComputeDeps, ComputeStage};
pub use ctx::StateCtx;
pub use dep::Dep;
pub use graph::{DepRoute, Graph, TopologyError};
pub use state::{State, assign_impl};
pub use state_sync_status::StateSyncStatus;
pub use time::Time;
pub use updater::Updater;
