use serde::Serialize;

/// PCM wave format negotiated with the capture endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    /// Bytes per sample-frame across all channels.
    pub block_align: u16,
    pub avg_bytes_per_sec: u32,
}

impl PcmFormat {
    /// Integer PCM with derived block alignment and byte rate.
    pub const fn pcm(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Self {
        let block_align = channels * bits_per_sample / 8;
        Self {
            sample_rate,
            bits_per_sample,
            channels,
            block_align,
            avg_bytes_per_sec: sample_rate * block_align as u32,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![8, 16, 24, 32].contains(&self.bits_per_sample) {
            return Err(format!("unsupported bit depth: {}", self.bits_per_sample));
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if self.block_align != self.channels * self.bits_per_sample / 8 {
            return Err(format!("inconsistent block align: {}", self.block_align));
        }
        if self.avg_bytes_per_sec != self.sample_rate * self.block_align as u32 {
            return Err(format!("inconsistent byte rate: {}", self.avg_bytes_per_sec));
        }
        Ok(())
    }

    /// Byte length of `frames` sample-frames.
    pub fn frames_to_bytes(&self, frames: usize) -> usize {
        frames * self.block_align as usize
    }
}

/// Format requested for every capture session: mono, 16 kHz, 16-bit.
pub const CAPTURE_FORMAT: PcmFormat = PcmFormat::pcm(16_000, 16, 1);

// Packet handling copies `frames * 2` bytes per packet.
const _: () = assert!(CAPTURE_FORMAT.block_align == 2);

/// Default input frame count: 10 ms at 16 kHz.
pub const DEFAULT_INPUT_FRAME_COUNT: usize = 160;

/// Requested endpoint buffer duration in 100-nanosecond units (1 second).
pub const BUFFER_DURATION_HNS: i64 = 10_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_format_is_mono_16k_16bit() {
        assert_eq!(CAPTURE_FORMAT.sample_rate, 16_000);
        assert_eq!(CAPTURE_FORMAT.bits_per_sample, 16);
        assert_eq!(CAPTURE_FORMAT.channels, 1);
        assert_eq!(CAPTURE_FORMAT.block_align, 2);
        assert_eq!(CAPTURE_FORMAT.avg_bytes_per_sec, 32_000);
        assert!(CAPTURE_FORMAT.validate().is_ok());
    }

    #[test]
    fn default_frame_count_fills_320_bytes() {
        assert_eq!(CAPTURE_FORMAT.frames_to_bytes(DEFAULT_INPUT_FRAME_COUNT), 320);
    }

    #[test]
    fn validate_rejects_inconsistent_alignment() {
        let mut format = CAPTURE_FORMAT;
        format.block_align = 4;
        assert!(format.validate().is_err());
    }
}
