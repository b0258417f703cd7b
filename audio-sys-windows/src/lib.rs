//! # audio-sys-windows
//!
//! Windows WASAPI backend for audio-sys.
//!
//! Provides:
//! - `WasapiActivator` — Asynchronous activation of the default capture endpoint
//! - `WasapiClient` — Shared-mode, event-driven `IAudioClient` in 16 kHz mono PCM
//! - `WasapiSignals` — Shutdown / buffer-ready auto-reset events
//!
//! ## Platform Requirements
//! - Windows 10 1703+ for `ActivateAudioInterfaceAsync` on desktop
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use std::ops::ControlFlow;
//! use audio_sys_core::AudioCallbacks;
//! use audio_sys_windows::create_default_session;
//!
//! let session = create_default_session()?;
//! session.set_callbacks(AudioCallbacks::with_write(|frame| {
//!     println!("{} bytes", frame.len());
//!     ControlFlow::Continue(())
//! }))?;
//! session.start()?;
//! ```

#[cfg(target_os = "windows")]
pub mod activation;
#[cfg(target_os = "windows")]
pub mod client;
#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod signals;

#[cfg(target_os = "windows")]
pub use activation::WasapiActivator;
#[cfg(target_os = "windows")]
pub use client::{WasapiCaptureService, WasapiClient};
#[cfg(target_os = "windows")]
pub use signals::WasapiSignals;

#[cfg(target_os = "windows")]
pub type WasapiSession = audio_sys_core::AudioSession<WasapiClient>;

/// Activate the default microphone and wrap it in a session.
#[cfg(target_os = "windows")]
pub fn create_default_session() -> Result<WasapiSession, audio_sys_core::AudioError> {
    WasapiSession::create(&WasapiActivator::new())
}
