//! Single-assignment result slot.
//!
//! Bridges a platform completion callback, running on a thread outside the
//! caller's control, into a blocking wait on the caller's thread. The
//! [`Completer`] is consumed by its one write and the [`Completion`] by its
//! one read, so "exactly once" holds by construction.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

enum Slot<T> {
    Pending,
    Ready(T),
    Abandoned,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Write half. Dropping it without completing wakes the waiter with `None`.
pub struct Completer<T> {
    shared: Option<Arc<Shared<T>>>,
}

/// Read half.
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

/// Create a connected completer/completion pair.
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Pending),
        ready: Condvar::new(),
    });
    (
        Completer {
            shared: Some(Arc::clone(&shared)),
        },
        Completion { shared },
    )
}

impl<T> Completer<T> {
    pub fn complete(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            Self::publish(&shared, Slot::Ready(value));
        }
    }

    fn publish(shared: &Shared<T>, slot: Slot<T>) {
        *shared.slot.lock() = slot;
        shared.ready.notify_one();
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            Self::publish(&shared, Slot::Abandoned);
        }
    }
}

impl<T> Completion<T> {
    /// Block until the completer writes or is dropped.
    ///
    /// Returns `None` when the completer was dropped without a value.
    pub fn wait(self) -> Option<T> {
        let mut slot = self.shared.slot.lock();
        loop {
            match std::mem::replace(&mut *slot, Slot::Pending) {
                Slot::Ready(value) => return Some(value),
                Slot::Abandoned => return None,
                Slot::Pending => self.shared.ready.wait(&mut slot),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn value_written_before_wait() {
        let (completer, completion) = completion();
        completer.complete(7);
        assert_eq!(completion.wait(), Some(7));
    }

    #[test]
    fn waiter_blocks_until_other_thread_completes() {
        let (completer, completion) = completion::<Result<u32, String>>();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.complete(Ok(42));
        });
        assert_eq!(completion.wait(), Some(Ok(42)));
        producer.join().unwrap();
    }

    #[test]
    fn dropped_completer_wakes_waiter() {
        let (completer, completion) = completion::<u8>();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            drop(completer);
        });
        assert_eq!(completion.wait(), None);
        producer.join().unwrap();
    }
}
