//! Win32 auto-reset events used as the capture thread's signals.

use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, GetLastError, HANDLE, WAIT_OBJECT_0};
use windows::Win32::System::Threading::{CreateEventW, ResetEvent, SetEvent, WaitForMultipleObjects, INFINITE};

use audio_sys_core::models::error::AudioError;
use audio_sys_core::traits::platform::{CaptureSignals, Wakeup};

/// Owned auto-reset, initially unsignalled event handle.
pub struct Win32Event(HANDLE);

// SAFETY: Event handles are kernel objects usable from any thread.
unsafe impl Send for Win32Event {}
unsafe impl Sync for Win32Event {}

impl Win32Event {
    pub fn auto_reset() -> Result<Self, AudioError> {
        unsafe { CreateEventW(None, false, false, PCWSTR::null()) }
            .map(Self)
            .map_err(|e| AudioError::platform("CreateEventW", e))
    }

    pub fn raw(&self) -> HANDLE {
        self.0
    }

    pub fn set(&self) {
        if let Err(e) = unsafe { SetEvent(self.0) } {
            log::error!("SetEvent failed: {}", e);
        }
    }

    pub fn reset(&self) {
        if let Err(e) = unsafe { ResetEvent(self.0) } {
            log::error!("ResetEvent failed: {}", e);
        }
    }
}

impl Drop for Win32Event {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Shutdown and buffer-ready events of one capture client.
///
/// The buffer-ready event is bound to the client with `SetEventHandle`
/// during activation; WASAPI sets it whenever a buffer of captured audio is
/// ready.
pub struct WasapiSignals {
    shutdown: Win32Event,
    buffer_ready: Win32Event,
}

impl WasapiSignals {
    pub fn new() -> Result<Self, AudioError> {
        Ok(Self {
            shutdown: Win32Event::auto_reset()?,
            buffer_ready: Win32Event::auto_reset()?,
        })
    }

    pub fn buffer_ready_handle(&self) -> HANDLE {
        self.buffer_ready.raw()
    }
}

impl CaptureSignals for WasapiSignals {
    fn request_shutdown(&self) {
        self.shutdown.set();
    }

    fn clear_shutdown(&self) {
        self.shutdown.reset();
    }

    fn wait(&self) -> Result<Wakeup, AudioError> {
        // Index 0 wins when both are signalled.
        let handles = [self.shutdown.raw(), self.buffer_ready.raw()];
        let result = unsafe { WaitForMultipleObjects(&handles, false, INFINITE) };

        if result == WAIT_OBJECT_0 {
            Ok(Wakeup::Shutdown)
        } else if result.0 == WAIT_OBJECT_0.0 + 1 {
            Ok(Wakeup::BufferReady)
        } else {
            let last_error = unsafe { GetLastError() };
            Err(AudioError::platform(
                "WaitForMultipleObjects",
                format!("wait returned {:#x}, last error {}", result.0, last_error.0),
            ))
        }
    }
}
