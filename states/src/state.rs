use std::any::{Any, type_name};

/// A plain piece of application state registered in a
/// [`StateCtx`](crate::StateCtx).
///
/// States are owned by the context and read through
/// [`Dep::get_state_ref`](crate::Dep::get_state_ref) or
/// [`StateCtx::state_ref`](crate::StateCtx::state_ref). Replacement values
/// produced by callbacks arrive as `Box<dyn Any>` over the update channel,
/// which is why `assign_box` exists; implementations forward to
/// [`assign_impl`].
pub trait State: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Standard `assign_box` body: downcast and overwrite in place.
///
/// A type mismatch means an updater was fed a value registered under the
/// wrong slot; that is a wiring bug, so it is logged rather than panicking.
pub fn assign_impl<T: Any>(dst: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *dst = *value,
        Err(_) => log::error!("assign_impl: type mismatch while assigning {}", type_name::<T>()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Eq)]
    struct Counter {
        value: i32,
    }

    #[test]
    fn assign_impl_overwrites_on_matching_type() {
        let mut counter = Counter { value: 1 };
        assign_impl(&mut counter, Box::new(Counter { value: 42 }));
        assert_eq!(counter.value, 42);
    }

    #[test]
    fn assign_impl_keeps_value_on_type_mismatch() {
        let mut counter = Counter { value: 7 };
        assign_impl(&mut counter, Box::new("not a counter".to_owned()));
        assert_eq!(counter.value, 7);
    }
}
