//! Flat handle API over [`AudioSession`].
//!
//! Each function takes an optional session reference, where `None` plays the
//! part of a null handle, and returns an [`AudioResult`] code instead of a
//! `Result`. Intended for embedding behind a C-style surface.

use crate::models::config::OptionValue;
use crate::models::error::AudioResult;
use crate::session::controller::AudioSession;
use crate::traits::callbacks::AudioCallbacks;
use crate::traits::platform::{AudioClient, DeviceActivator};

/// Create a session, or `None` if activation failed.
pub fn audio_create<A: DeviceActivator>(activator: &A) -> Option<AudioSession<A::Client>> {
    AudioSession::create(activator).ok()
}

/// Destroy a session. A null handle is ignored.
pub fn audio_destroy<C: AudioClient>(handle: Option<AudioSession<C>>) {
    if let Some(session) = handle {
        session.destroy();
    }
}

pub fn audio_setcallbacks<C: AudioClient>(
    handle: Option<&AudioSession<C>>,
    callbacks: AudioCallbacks,
) -> AudioResult {
    match handle {
        Some(session) => session.set_callbacks(callbacks).into(),
        None => AudioResult::InvalidArg,
    }
}

pub fn audio_input_start<C: AudioClient>(handle: Option<&AudioSession<C>>) -> AudioResult {
    handle.map_or(AudioResult::InvalidArg, |session| session.start().into())
}

pub fn audio_input_stop<C: AudioClient>(handle: Option<&AudioSession<C>>) -> AudioResult {
    handle.map_or(AudioResult::InvalidArg, |session| session.stop().into())
}

pub fn audio_set_options<C: AudioClient>(
    handle: Option<&AudioSession<C>>,
    option_name: &str,
    value: Option<OptionValue<'_>>,
) -> AudioResult {
    handle.map_or(AudioResult::InvalidArg, |session| {
        session.set_option(option_name, value).into()
    })
}

/// Stub: always `Ok` for a valid handle.
pub fn audio_output_set_volume<C: AudioClient>(handle: Option<&AudioSession<C>>, volume: i64) -> AudioResult {
    handle.map_or(AudioResult::InvalidArg, |session| {
        session.set_output_volume(volume).into()
    })
}

/// Stub: always `Ok` for a valid handle.
pub fn audio_playwavfile<C: AudioClient>(handle: Option<&AudioSession<C>>, file: &str) -> AudioResult {
    handle.map_or(AudioResult::InvalidArg, |session| session.play_wav_file(file).into())
}
