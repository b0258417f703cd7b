use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::capture::worker;
use crate::models::config::{OptionValue, SessionOptions};
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::AudioError;
use crate::models::format::{PcmFormat, CAPTURE_FORMAT};
use crate::models::state::AudioState;
use crate::session::shared::SessionShared;
use crate::sync::completion::completion;
use crate::traits::callbacks::AudioCallbacks;
use crate::traits::platform::{AudioClient, CaptureSignals, DeviceActivator};

/// One microphone capture session, from activation to destruction.
///
/// Generic over the platform client via the `AudioClient` trait. Lifecycle
/// calls are serialized by the worker-handle lock; every other mutable field
/// sits behind the shared session lock.
///
/// ```text
/// create → set_callbacks → start ⇄ stop → destroy
/// ```
pub struct AudioSession<C: AudioClient> {
    client: Arc<C>,
    shared: Arc<SessionShared>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<C: AudioClient> AudioSession<C> {
    /// Activate the default capture endpoint and build a stopped session.
    ///
    /// Activation is attempted once. On failure nothing outlives the call.
    pub fn create<A>(activator: &A) -> Result<Self, AudioError>
    where
        A: DeviceActivator<Client = C>,
    {
        CAPTURE_FORMAT
            .validate()
            .map_err(AudioError::InvalidArgument)?;

        let shared = Arc::new(SessionShared::new());
        let client = activator.activate(&CAPTURE_FORMAT).map_err(|e| {
            log::error!("session {}: activation failed: {}", shared.id, e);
            e
        })?;

        log::info!("session {}: capture device activated", shared.id);
        Ok(Self {
            client: Arc::new(client),
            shared,
            worker: Mutex::new(None),
        })
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn format(&self) -> &PcmFormat {
        self.client.format()
    }

    pub fn input_state(&self) -> AudioState {
        self.shared.input_state()
    }

    pub fn output_state(&self) -> AudioState {
        self.shared.lock().output_state
    }

    pub fn frame_count(&self) -> usize {
        self.shared.lock().options.frame_count
    }

    pub fn device_name(&self) -> Option<String> {
        self.shared.lock().options.device_name.clone()
    }

    pub fn options(&self) -> SessionOptions {
        self.shared.lock().options.clone()
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.shared.lock().diagnostics.clone()
    }

    /// Replace all registered callbacks. The write callback is mandatory;
    /// without it nothing changes.
    pub fn set_callbacks(&self, callbacks: AudioCallbacks) -> Result<(), AudioError> {
        if callbacks.write.is_none() {
            return Err(AudioError::InvalidArgument("write callback is required".into()));
        }
        self.shared.lock().callbacks = callbacks;
        Ok(())
    }

    /// Apply a named option (`"buff_frame_count"` or `"devicename"`).
    pub fn set_option(&self, name: &str, value: Option<OptionValue<'_>>) -> Result<(), AudioError> {
        self.shared.lock().options.apply(name, value)
    }

    /// Spawn the capture thread and start the native stream.
    ///
    /// If the native start fails after the thread was spawned, the thread
    /// stays parked on its signals until `stop` or `destroy` reclaims it.
    pub fn start(&self) -> Result<(), AudioError> {
        let mut slot = self.worker.lock();

        {
            let s = self.shared.lock();
            if s.callbacks.write.is_none() {
                return Err(AudioError::InvalidState("no write callback registered".into()));
            }
            if s.input_state.is_running() {
                return Err(AudioError::InvalidState("capture already running".into()));
            }
        }

        // A previous run ended without `stop`: the write callback asked to
        // stop (thread parked) or a platform error ended it (thread gone).
        // Either way the native stream is still started.
        if let Some(handle) = slot.take() {
            log::debug!("session {}: retiring previous capture thread", self.shared.id);
            self.stop_stream();
            if !handle.is_finished() {
                self.client.signals().request_shutdown();
            }
            self.join_worker(handle);
        }
        self.client.signals().clear_shutdown();

        let (entered_tx, entered) = completion();
        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("audio-sys-capture".into())
            .spawn(move || worker::run(client, shared, entered_tx))
            .map_err(|e| AudioError::platform("spawn capture thread", e))?;
        *slot = Some(handle);

        if entered.wait().is_none() {
            return Err(AudioError::platform("spawn capture thread", "thread exited before entry"));
        }

        self.client.start().map_err(|e| {
            log::warn!("session {}: stream start failed, capture thread left parked: {}", self.shared.id, e);
            e
        })?;

        log::info!("session {}: capture started", self.shared.id);
        Ok(())
    }

    /// Stop the native stream and join the capture thread.
    pub fn stop(&self) -> Result<(), AudioError> {
        let mut slot = self.worker.lock();

        if !self.shared.input_state().is_running() {
            return Err(AudioError::InvalidState("capture is not running".into()));
        }

        self.stop_stream();
        self.client.signals().request_shutdown();
        if let Some(handle) = slot.take() {
            self.join_worker(handle);
        }

        log::info!("session {}: capture stopped", self.shared.id);
        Ok(())
    }

    /// Stub: output volume is not implemented.
    pub fn set_output_volume(&self, _level: i64) -> Result<(), AudioError> {
        Ok(())
    }

    /// Stub: WAV playback is not implemented.
    pub fn play_wav_file(&self, _path: &str) -> Result<(), AudioError> {
        Ok(())
    }

    /// Release the session. Equivalent to dropping it.
    pub fn destroy(self) {}

    fn join_worker(&self, handle: thread::JoinHandle<()>) {
        if handle.join().is_err() {
            log::error!("session {}: capture thread panicked", self.shared.id);
            self.shared.force_stopped();
        }
    }

    fn stop_stream(&self) {
        if let Err(e) = self.client.stop() {
            log::warn!("session {}: stream stop failed: {}", self.shared.id, e);
        }
    }
}

impl<C: AudioClient> Drop for AudioSession<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.get_mut().take() {
            self.stop_stream();
            if !handle.is_finished() {
                self.client.signals().request_shutdown();
            }
            self.join_worker(handle);
        }
        log::info!("session {}: destroyed", self.shared.id);
    }
}
