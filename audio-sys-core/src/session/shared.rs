use std::ops::ControlFlow;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::SessionOptions;
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::AudioError;
use crate::models::state::AudioState;
use crate::traits::callbacks::AudioCallbacks;

/// Mutable session fields, protected by `parking_lot::Mutex`.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub input_state: AudioState,
    pub output_state: AudioState,
    pub callbacks: AudioCallbacks,
    pub options: SessionOptions,
    pub diagnostics: CaptureDiagnostics,
}

/// State shared between the controller and the capture thread.
///
/// Callbacks are cloned out under the lock and invoked after it is released.
#[derive(Debug)]
pub(crate) struct SessionShared {
    pub id: Uuid,
    state: Mutex<SessionState>,
}

impl SessionShared {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, SessionState> {
        self.state.lock()
    }

    pub fn input_state(&self) -> AudioState {
        self.state.lock().input_state
    }

    fn notify_input(&self, state: AudioState) {
        let callback = self.state.lock().callbacks.input_state.clone();
        if let Some(callback) = callback {
            callback(state);
        }
    }

    /// Capture thread entry: announce `Starting`, persist `Running`.
    pub fn begin_capture(&self) {
        self.notify_input(AudioState::Starting);
        let mut s = self.state.lock();
        s.input_state = AudioState::Running;
        s.diagnostics.capture_runs += 1;
        s.diagnostics.last_started_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Capture thread exit: persist and announce `Stopped`.
    pub fn end_capture(&self) {
        self.state.lock().input_state = AudioState::Stopped;
        self.notify_input(AudioState::Stopped);
    }

    /// Persist `Stopped` without notifying, after a capture thread died
    /// without running its exit path.
    pub fn force_stopped(&self) {
        self.state.lock().input_state = AudioState::Stopped;
    }

    /// The write callback asked to stop.
    pub fn app_requested_stop(&self) {
        {
            let mut s = self.state.lock();
            s.input_state = AudioState::Stopped;
            s.diagnostics.app_stop_requests += 1;
        }
        self.notify_input(AudioState::Stopped);
    }

    /// Hand a full frame to the write callback.
    pub fn deliver(&self, frame: &[u8]) -> ControlFlow<()> {
        let callback = {
            let mut s = self.state.lock();
            s.diagnostics.frames_delivered += 1;
            s.callbacks.write.clone()
        };
        match callback {
            Some(write) => write(frame),
            None => ControlFlow::Continue(()),
        }
    }

    pub fn record_packet(&self, bytes: usize, silent: bool) {
        let mut s = self.state.lock();
        s.diagnostics.packets_drained += 1;
        s.diagnostics.bytes_captured += bytes as u64;
        if silent {
            s.diagnostics.silent_packets += 1;
        }
    }

    pub fn record_error(&self, error: &AudioError) {
        let mut s = self.state.lock();
        s.diagnostics.capture_errors += 1;
        s.diagnostics.last_error = Some(error.to_string());
    }
}
