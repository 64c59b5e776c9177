//! Process-wide values shared as copy-on-write snapshots.

use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use tracing::warn;

/// A process-wide value. Readers take an `Arc` snapshot under a short read
/// lock; writers edit a private copy and swap it in.
///
/// Writers are serialised by a reentrant lock that readers never touch, so
/// an edit may read the current snapshot, or even start another update on
/// the same thread, without deadlocking.
pub(crate) struct Global<T> {
    current: RwLock<Arc<T>>,
    writer: ReentrantMutex<()>,
}

impl<T: Clone> Global<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
            writer: ReentrantMutex::new(()),
        }
    }

    pub(crate) fn snapshot(&self) -> Arc<T> {
        Arc::clone(&*self.current.read())
    }

    /// Runs `edit` on a copy of the current value with no read or write lock
    /// held, then publishes the copy.
    ///
    /// A value published from inside `edit` (a nested update or replace on
    /// the same thread) is superseded by the outer edit.
    pub(crate) fn update<R>(&self, edit: impl FnOnce(&mut T) -> R) -> R {
        let _writer = self.writer.lock();
        let base = self.snapshot();
        let mut updated = base.as_ref().clone();
        let result = edit(&mut updated);

        let mut current = self.current.write();
        if !Arc::ptr_eq(&current, &base) {
            warn!("global value was replaced during its own update; keeping the outer update");
        }
        *current = Arc::new(updated);
        result
    }

    pub(crate) fn replace(&self, value: T) {
        let _writer = self.writer.lock();
        *self.current.write() = Arc::new(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_keep_their_snapshot() {
        let global = Global::new(vec![1]);
        let before = global.snapshot();
        global.update(|items| items.push(2));
        assert_eq!(*before, vec![1]);
        assert_eq!(*global.snapshot(), vec![1, 2]);
    }

    #[test]
    fn edit_can_read_and_nest_without_deadlock() {
        let global = Global::new(vec![1]);
        let seen = global.update(|items| {
            let seen = global.snapshot().len();
            global.update(|inner| inner.push(99));
            items.push(2);
            seen
        });
        assert_eq!(seen, 1);
        assert_eq!(*global.snapshot(), vec![1, 2]);
    }

    #[test]
    fn replace_inside_update_is_superseded() {
        let global = Global::new(0);
        global.update(|value| {
            global.replace(7);
            *value += 1;
        });
        assert_eq!(*global.snapshot(), 1);
    }
}
