use std::any::{Any, TypeId};

use flume::Sender;

/// Write half of the state context, safe to move into fetch callbacks.
///
/// `set` replaces the registered state or compute of type `T` on the next
/// [`StateCtx::sync_computes`](crate::StateCtx::sync_computes). If the
/// context is gone by the time a callback fires, the send fails and the
/// value is dropped; that is the intended teardown behavior, not an error.
#[derive(Debug, Clone)]
pub struct Updater {
    send: Sender<(TypeId, Box<dyn Any + Send>)>,
}

impl Updater {
    pub(crate) fn new(send: Sender<(TypeId, Box<dyn Any + Send>)>) -> Self {
        Self { send }
    }

    pub fn set<T: Any + Send>(&self, value: T) {
        let _ = self.send.send((TypeId::of::<T>(), Box::new(value)));
    }
}
