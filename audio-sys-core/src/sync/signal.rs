//! Portable pair of auto-reset signals for the capture thread.

use parking_lot::{Condvar, Mutex};

use crate::models::error::AudioError;
use crate::traits::platform::{CaptureSignals, Wakeup};

#[derive(Debug, Default)]
struct Flags {
    shutdown: bool,
    buffer_ready: bool,
}

/// Shutdown and buffer-ready signals backed by a mutex and condvar.
///
/// Each `set` wakes one waiter and stays latched until a wait consumes it.
#[derive(Debug, Default)]
pub struct SignalPair {
    flags: Mutex<Flags>,
    changed: Condvar,
}

impl SignalPair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal_buffer_ready(&self) {
        self.flags.lock().buffer_ready = true;
        self.changed.notify_one();
    }

    /// Whether a buffer-ready set is still waiting to be consumed.
    pub fn buffer_ready_pending(&self) -> bool {
        self.flags.lock().buffer_ready
    }
}

impl CaptureSignals for SignalPair {
    fn request_shutdown(&self) {
        self.flags.lock().shutdown = true;
        self.changed.notify_one();
    }

    fn clear_shutdown(&self) {
        self.flags.lock().shutdown = false;
    }

    fn wait(&self) -> Result<Wakeup, AudioError> {
        let mut flags = self.flags.lock();
        loop {
            if flags.shutdown {
                flags.shutdown = false;
                return Ok(Wakeup::Shutdown);
            }
            if flags.buffer_ready {
                flags.buffer_ready = false;
                return Ok(Wakeup::BufferReady);
            }
            self.changed.wait(&mut flags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn shutdown_wins_ties() {
        let signals = SignalPair::new();
        signals.signal_buffer_ready();
        signals.request_shutdown();

        assert_eq!(signals.wait().unwrap(), Wakeup::Shutdown);
        assert_eq!(signals.wait().unwrap(), Wakeup::BufferReady);
    }

    #[test]
    fn signals_auto_reset() {
        let signals = SignalPair::new();
        signals.signal_buffer_ready();
        signals.signal_buffer_ready();

        assert_eq!(signals.wait().unwrap(), Wakeup::BufferReady);
        assert!(!signals.buffer_ready_pending());
    }

    #[test]
    fn cleared_shutdown_does_not_fire() {
        let signals = SignalPair::new();
        signals.request_shutdown();
        signals.clear_shutdown();
        signals.signal_buffer_ready();

        assert_eq!(signals.wait().unwrap(), Wakeup::BufferReady);
    }

    #[test]
    fn wait_blocks_until_set() {
        let signals = Arc::new(SignalPair::new());
        let setter = {
            let signals = Arc::clone(&signals);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                signals.request_shutdown();
            })
        };
        assert_eq!(signals.wait().unwrap(), Wakeup::Shutdown);
        setter.join().unwrap();
    }
}
