/// Lifecycle of a fetched collection, stored inside cache computes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Remote<T> {
    /// No fetch attempted yet.
    #[default]
    Idle,
    /// Fetch in progress.
    Pending,
    /// Last fetch succeeded.
    Ready(T),
    /// Last fetch failed with an error message.
    Failed(String),
}

impl<T> Remote<T> {
    pub fn value(&self) -> Option<&T> {
        if let Self::Ready(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn error(&self) -> Option<&str> {
        if let Self::Failed(message) = self {
            Some(message)
        } else {
            None
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}
