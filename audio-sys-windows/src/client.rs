//! Activated WASAPI capture client.
//!
//! Wraps the `IAudioClient` produced by activation together with its
//! auto-reset events. Captured packets are read through
//! `IAudioCaptureClient` on the capture thread.

use std::ptr;
use std::slice;

use windows::Win32::Media::Audio::*;

use audio_sys_core::models::error::AudioError;
use audio_sys_core::models::format::PcmFormat;
use audio_sys_core::traits::platform::{AudioClient, CaptureService, Packet};

use crate::com::{MmcssRegistration, MtaUsage};
use crate::signals::WasapiSignals;

/// Shared-mode, event-driven capture client for the default microphone.
pub struct WasapiClient {
    client: IAudioClient,
    format: PcmFormat,
    signals: WasapiSignals,
    _mta: MtaUsage,
}

// SAFETY: The client was activated in the multithreaded apartment, which
// `_mta` keeps alive for as long as the client exists. MTA objects may be
// called from any thread. Events are kernel handles.
unsafe impl Send for WasapiClient {}
unsafe impl Sync for WasapiClient {}

impl WasapiClient {
    pub(crate) fn new(client: IAudioClient, format: PcmFormat, signals: WasapiSignals, mta: MtaUsage) -> Self {
        Self {
            client,
            format,
            signals,
            _mta: mta,
        }
    }
}

impl AudioClient for WasapiClient {
    type Signals = WasapiSignals;
    type Service = WasapiCaptureService;

    fn format(&self) -> &PcmFormat {
        &self.format
    }

    fn signals(&self) -> &WasapiSignals {
        &self.signals
    }

    fn capture_service(&self) -> Result<WasapiCaptureService, AudioError> {
        let capture: IAudioCaptureClient = unsafe { self.client.GetService() }
            .map_err(|e| AudioError::platform("IAudioClient::GetService", e))?;

        Ok(WasapiCaptureService {
            capture,
            block_align: self.format.block_align as usize,
            _mmcss: MmcssRegistration::register("Pro Audio"),
        })
    }

    fn start(&self) -> Result<(), AudioError> {
        unsafe { self.client.Start() }.map_err(|e| AudioError::platform("IAudioClient::Start", e))
    }

    fn stop(&self) -> Result<(), AudioError> {
        unsafe { self.client.Stop() }.map_err(|e| AudioError::platform("IAudioClient::Stop", e))
    }
}

/// `IAudioCaptureClient` owned by the capture thread.
///
/// Registers the thread with MMCSS for real-time priority while it lives.
pub struct WasapiCaptureService {
    capture: IAudioCaptureClient,
    block_align: usize,
    _mmcss: Option<MmcssRegistration>,
}

impl CaptureService for WasapiCaptureService {
    fn next_packet_frames(&mut self) -> Result<u32, AudioError> {
        unsafe { self.capture.GetNextPacketSize() }
            .map_err(|e| AudioError::platform("IAudioCaptureClient::GetNextPacketSize", e))
    }

    fn read_packet(&mut self, sink: &mut dyn FnMut(Packet<'_>)) -> Result<(), AudioError> {
        let mut data: *mut u8 = ptr::null_mut();
        let mut frames: u32 = 0;
        let mut flags: u32 = 0;

        unsafe {
            self.capture
                .GetBuffer(&mut data, &mut frames, &mut flags, None, None)
                .map_err(|e| AudioError::platform("IAudioCaptureClient::GetBuffer", e))?;

            let len = frames as usize * self.block_align;
            if flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0 || data.is_null() {
                sink(Packet::Silent(len));
            } else {
                sink(Packet::Samples(slice::from_raw_parts(data, len)));
            }

            self.capture
                .ReleaseBuffer(frames)
                .map_err(|e| AudioError::platform("IAudioCaptureClient::ReleaseBuffer", e))
        }
    }
}
