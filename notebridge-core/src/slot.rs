use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

/// A value together with the moment it was stored.
#[derive(Debug)]
pub struct Stamped<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

/// Single-value store with atomic replace.
///
/// The lock guards only a pointer swap: values are fully built before the
/// write lock is taken and the displaced value is dropped after it is
/// released, so readers never wait on construction and never see a partial
/// value. A poisoned lock still holds a complete value and is recovered.
pub struct Slot<T> {
    current: RwLock<Option<Arc<Stamped<T>>>>,
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn replace(&self, value: T) -> Arc<Stamped<T>> {
        let entry = Arc::new(Stamped {
            value,
            stored_at: Utc::now(),
        });
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            guard.replace(Arc::clone(&entry))
        };
        drop(previous);
        entry
    }

    pub fn load(&self) -> Option<Arc<Stamped<T>>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}
