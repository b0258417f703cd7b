//! Asynchronous activation of the default capture endpoint.
//!
//! `ActivateAudioInterfaceAsync` reports back on a platform thread through
//! [`ActivationHandler`]. The handler initializes the client, binds the
//! buffer-ready event, and hands the outcome to the waiting caller through a
//! one-shot completion.

use parking_lot::Mutex;
use windows::core::{implement, Interface, Ref, HRESULT, IUnknown, PCWSTR, PWSTR};
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::{CoTaskMemFree, IAgileObject, IAgileObject_Impl, StringFromIID};

use audio_sys_core::models::error::AudioError;
use audio_sys_core::models::format::{PcmFormat, BUFFER_DURATION_HNS};
use audio_sys_core::sync::completion::{completion, Completer};
use audio_sys_core::traits::platform::DeviceActivator;

use crate::client::WasapiClient;
use crate::com::MtaUsage;
use crate::signals::WasapiSignals;

/// Activates a [`WasapiClient`] on the default capture device.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasapiActivator;

impl WasapiActivator {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceActivator for WasapiActivator {
    type Client = WasapiClient;

    fn activate(&self, format: &PcmFormat) -> Result<WasapiClient, AudioError> {
        let mta = MtaUsage::acquire()?;
        let signals = WasapiSignals::new()?;
        let device_path = CoTaskString::default_capture_path()?;

        let (completer, completion) = completion();
        let handler: IActivateAudioInterfaceCompletionHandler = ActivationHandler {
            format: wave_format(format),
            buffer_ready: signals.buffer_ready_handle(),
            completer: Mutex::new(Some(completer)),
        }
        .into();

        log::debug!("Activating capture endpoint {}", device_path);

        let _operation = unsafe {
            ActivateAudioInterfaceAsync(device_path.as_pcwstr(), &IAudioClient2::IID, None, &handler)
        }
        .map_err(|e| AudioError::platform("ActivateAudioInterfaceAsync", e))?;

        let client = completion.wait().unwrap_or_else(|| {
            Err(AudioError::platform(
                "ActivateAudioInterfaceAsync",
                "completion handler released without reporting",
            ))
        })?;

        Ok(WasapiClient::new(client.0, *format, signals, mta))
    }
}

/// Activated client crossing from the completion thread to the caller.
struct SendClient(IAudioClient);

// SAFETY: Activation runs in the MTA, held by the caller's `MtaUsage` for
// the duration of the handoff.
unsafe impl Send for SendClient {}

type ActivationOutcome = Result<SendClient, AudioError>;

#[implement(IActivateAudioInterfaceCompletionHandler, IAgileObject)]
struct ActivationHandler {
    format: WAVEFORMATEX,
    buffer_ready: HANDLE,
    completer: Mutex<Option<Completer<ActivationOutcome>>>,
}

impl ActivationHandler {
    fn initialize(&self, operation: Ref<'_, IActivateAudioInterfaceAsyncOperation>) -> ActivationOutcome {
        let operation = operation
            .ok()
            .map_err(|e| AudioError::platform("ActivateCompleted", e))?;

        let mut activate_result = HRESULT(0);
        let mut activated: Option<IUnknown> = None;
        unsafe { operation.GetActivateResult(&mut activate_result, &mut activated) }
            .map_err(|e| AudioError::platform("GetActivateResult", e))?;
        activate_result
            .ok()
            .map_err(|e| AudioError::platform("ActivateAudioInterfaceAsync", e))?;

        let client: IAudioClient = activated
            .ok_or_else(|| AudioError::platform("GetActivateResult", "no interface returned"))?
            .cast()
            .map_err(|e| AudioError::platform("QueryInterface(IAudioClient)", e))?;

        unsafe {
            client
                .Initialize(
                    AUDCLNT_SHAREMODE_SHARED,
                    AUDCLNT_STREAMFLAGS_EVENTCALLBACK | AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM,
                    BUFFER_DURATION_HNS,
                    0,
                    &self.format,
                    None,
                )
                .map_err(|e| AudioError::platform("IAudioClient::Initialize", e))?;

            client
                .SetEventHandle(self.buffer_ready)
                .map_err(|e| AudioError::platform("IAudioClient::SetEventHandle", e))?;
        }

        Ok(SendClient(client))
    }
}

impl IActivateAudioInterfaceCompletionHandler_Impl for ActivationHandler_Impl {
    fn ActivateCompleted(
        &self,
        operation: Ref<'_, IActivateAudioInterfaceAsyncOperation>,
    ) -> windows::core::Result<()> {
        let outcome = self.initialize(operation);
        if let Err(e) = &outcome {
            log::error!("Capture activation failed: {}", e);
        }

        match self.completer.lock().take() {
            Some(completer) => completer.complete(outcome),
            None => log::warn!("Activation completed more than once"),
        }
        Ok(())
    }
}

impl IAgileObject_Impl for ActivationHandler_Impl {}

/// `WAVEFORMATEX` for an integer PCM format.
fn wave_format(format: &PcmFormat) -> WAVEFORMATEX {
    WAVEFORMATEX {
        wFormatTag: WAVE_FORMAT_PCM as u16,
        nChannels: format.channels,
        nSamplesPerSec: format.sample_rate,
        nAvgBytesPerSec: format.avg_bytes_per_sec,
        nBlockAlign: format.block_align,
        wBitsPerSample: format.bits_per_sample,
        cbSize: 0,
    }
}

/// Device interface path allocated by COM.
struct CoTaskString(PWSTR);

impl CoTaskString {
    fn default_capture_path() -> Result<Self, AudioError> {
        unsafe { StringFromIID(&DEVINTERFACE_AUDIO_CAPTURE) }
            .map(Self)
            .map_err(|e| AudioError::platform("StringFromIID", e))
    }

    fn as_pcwstr(&self) -> PCWSTR {
        PCWSTR(self.0 .0)
    }
}

impl std::fmt::Display for CoTaskString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match unsafe { self.0.to_string() } {
            Ok(path) => f.write_str(&path),
            Err(_) => f.write_str("<invalid path>"),
        }
    }
}

impl Drop for CoTaskString {
    fn drop(&mut self) {
        unsafe { CoTaskMemFree(Some(self.0 .0 as *const _)) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audio_sys_core::models::format::CAPTURE_FORMAT;

    #[test]
    fn wave_format_matches_capture_format() {
        // WAVEFORMATEX is packed; fields are copied out before comparing.
        let wf = wave_format(&CAPTURE_FORMAT);
        let tag = { wf.wFormatTag };
        let rate = { wf.nSamplesPerSec };
        let channels = { wf.nChannels };
        let bits = { wf.wBitsPerSample };
        let align = { wf.nBlockAlign };
        let byte_rate = { wf.nAvgBytesPerSec };
        let extra = { wf.cbSize };

        assert_eq!(tag, WAVE_FORMAT_PCM as u16);
        assert_eq!(rate, 16_000);
        assert_eq!(channels, 1);
        assert_eq!(bits, 16);
        assert_eq!(align, 2);
        assert_eq!(byte_rate, 32_000);
        assert_eq!(extra, 0);
    }
}
