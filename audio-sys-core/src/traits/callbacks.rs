use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::models::error::AudioError;
use crate::models::state::AudioState;

/// Callback invoked with a full scratch buffer of captured PCM bytes.
///
/// Returning `ControlFlow::Break(())` asks the session to stop: the input
/// state becomes `Stopped` and the state callback fires, while the capture
/// thread finishes draining the packets already signalled.
///
/// Fires on the capture thread. Keep processing minimal and never call the
/// session's lifecycle methods from inside it.
pub type WriteCallback = Arc<dyn Fn(&[u8]) -> ControlFlow<()> + Send + Sync + 'static>;

/// Callback invoked when the input or output state changes.
pub type StateCallback = Arc<dyn Fn(AudioState) + Send + Sync + 'static>;

/// Callback registered for error notification.
pub type ErrorCallback = Arc<dyn Fn(&AudioError) + Send + Sync + 'static>;

/// The full set of handlers registered on a session.
///
/// One handler per kind; registering again replaces all four slots.
#[derive(Clone, Default)]
pub struct AudioCallbacks {
    pub output_state: Option<StateCallback>,
    pub input_state: Option<StateCallback>,
    pub write: Option<WriteCallback>,
    pub error: Option<ErrorCallback>,
}

impl AudioCallbacks {
    /// Handlers with only the mandatory write callback set.
    pub fn with_write<F>(write: F) -> Self
    where
        F: Fn(&[u8]) -> ControlFlow<()> + Send + Sync + 'static,
    {
        Self {
            write: Some(Arc::new(write)),
            ..Self::default()
        }
    }

    pub fn on_input_state<F>(mut self, callback: F) -> Self
    where
        F: Fn(AudioState) + Send + Sync + 'static,
    {
        self.input_state = Some(Arc::new(callback));
        self
    }

    pub fn on_output_state<F>(mut self, callback: F) -> Self
    where
        F: Fn(AudioState) + Send + Sync + 'static,
    {
        self.output_state = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&AudioError) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for AudioCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioCallbacks")
            .field("output_state", &self.output_state.is_some())
            .field("input_state", &self.input_state.is_some())
            .field("write", &self.write.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
