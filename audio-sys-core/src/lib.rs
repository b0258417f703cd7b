//! # audio-sys-core
//!
//! Platform-agnostic microphone capture lifecycle.
//!
//! Provides the session controller, the capture thread, the one-shot
//! activation handoff and a flat handle API. Platform backends (Windows
//! WASAPI) implement the `DeviceActivator` / `AudioClient` traits and plug
//! into the generic `AudioSession`.
//!
//! ## Architecture
//!
//! ```text
//! audio-sys-core (this crate)
//! ├── traits/     ← DeviceActivator, AudioClient, CaptureService, CaptureSignals, callbacks
//! ├── models/     ← AudioError, AudioResult, AudioState, PcmFormat, SessionOptions, diagnostics
//! ├── sync/       ← one-shot Completion, portable SignalPair
//! ├── capture/    ← ScratchBuffer, capture thread loop
//! ├── session/    ← AudioSession (lifecycle controller)
//! ├── handle      ← flat handle API returning AudioResult codes
//! └── simulated   ← in-process backend for tests and demos
//! ```

pub mod capture;
pub mod handle;
pub mod models;
pub mod session;
pub mod simulated;
pub mod sync;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use capture::scratch::ScratchBuffer;
pub use models::config::{OptionValue, SessionOptions, AUDIO_OPTION_DEVICENAME, AUDIO_OPTION_INPUT_FRAME_COUNT};
pub use models::diagnostics::CaptureDiagnostics;
pub use models::error::{AudioError, AudioResult};
pub use models::format::{PcmFormat, BUFFER_DURATION_HNS, CAPTURE_FORMAT, DEFAULT_INPUT_FRAME_COUNT};
pub use models::state::AudioState;
pub use session::controller::AudioSession;
pub use sync::completion::{completion, Completer, Completion};
pub use sync::signal::SignalPair;
pub use traits::callbacks::{AudioCallbacks, ErrorCallback, StateCallback, WriteCallback};
pub use traits::platform::{AudioClient, CaptureService, CaptureSignals, DeviceActivator, Packet, Wakeup};
