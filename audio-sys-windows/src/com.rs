//! RAII guards for COM apartment usage and MMCSS thread registration.

use windows::core::PCWSTR;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Com::{CoDecrementMTAUsage, CoIncrementMTAUsage, CO_MTA_USAGE_COOKIE};
use windows::Win32::System::Threading::{AvRevertMmThreadCharacteristics, AvSetMmThreadCharacteristicsW};

use audio_sys_core::models::error::AudioError;

/// Keeps the process-wide multithreaded apartment alive while held.
///
/// Lets activation completions, the controller thread and the capture thread
/// all use MTA objects without each calling `CoInitializeEx`.
pub(crate) struct MtaUsage(CO_MTA_USAGE_COOKIE);

impl MtaUsage {
    pub fn acquire() -> Result<Self, AudioError> {
        unsafe { CoIncrementMTAUsage() }
            .map(Self)
            .map_err(|e| AudioError::platform("CoIncrementMTAUsage", e))
    }
}

impl Drop for MtaUsage {
    fn drop(&mut self) {
        unsafe {
            let _ = CoDecrementMTAUsage(self.0);
        }
    }
}

/// MMCSS task registration for the current thread.
pub(crate) struct MmcssRegistration(HANDLE);

impl MmcssRegistration {
    /// Register the calling thread. Failure only costs priority, so it is
    /// logged rather than returned.
    pub fn register(task: &str) -> Option<Self> {
        let name: Vec<u16> = task.encode_utf16().chain(std::iter::once(0)).collect();
        let mut task_index: u32 = 0;
        match unsafe { AvSetMmThreadCharacteristicsW(PCWSTR(name.as_ptr()), &mut task_index) } {
            Ok(handle) => Some(Self(handle)),
            Err(e) => {
                log::warn!("MMCSS registration for {:?} failed: {}", task, e);
                None
            }
        }
    }
}

impl Drop for MmcssRegistration {
    fn drop(&mut self) {
        unsafe {
            let _ = AvRevertMmThreadCharacteristics(self.0);
        }
    }
}
