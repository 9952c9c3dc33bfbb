use std::any::Any;

use chrono::{DateTime, Utc};

use crate::{State, assign_impl};

/// Virtual clock state.
///
/// The app advances it to `Utc::now()` once per frame; tests set it by hand,
/// which makes time-driven computes (status polling, retry backoff)
/// deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    virt: DateTime<Utc>,
}

impl Time {
    pub fn at(virt: DateTime<Utc>) -> Self {
        Self { virt }
    }
}

impl AsRef<DateTime<Utc>> for Time {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.virt
    }
}

impl AsMut<DateTime<Utc>> for Time {
    fn as_mut(&mut self) -> &mut DateTime<Utc> {
        &mut self.virt
    }
}

impl State for Time {
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
