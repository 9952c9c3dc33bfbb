/// Sync status of a registered slot, driving which computes re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSyncStatus {
    /// Registered but never computed/assigned.
    #[default]
    Init,
    /// A compute started async work and is waiting for its result.
    Pending,
    /// A dependency changed since the last run.
    Dirty,
    /// Up to date.
    Clean,
}
