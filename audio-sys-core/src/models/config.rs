use serde::Serialize;

use super::error::AudioError;
use super::format::DEFAULT_INPUT_FRAME_COUNT;

/// Option name for the number of frames delivered per write callback.
pub const AUDIO_OPTION_INPUT_FRAME_COUNT: &str = "buff_frame_count";

/// Option name for the capture device name.
pub const AUDIO_OPTION_DEVICENAME: &str = "devicename";

/// Value passed to [`AudioSession::set_option`](crate::AudioSession::set_option).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue<'a> {
    Int(i32),
    Str(&'a str),
}

/// Per-session options settable through the option API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOptions {
    /// Frames accumulated before each write callback (default: 160, 10 ms).
    pub frame_count: usize,

    /// Device name store. `None` until first set; clearing stores `""`.
    pub device_name: Option<String>,
}

impl SessionOptions {
    /// Apply a named option. On error no field changes.
    pub fn apply(&mut self, name: &str, value: Option<OptionValue<'_>>) -> Result<(), AudioError> {
        match name {
            AUDIO_OPTION_INPUT_FRAME_COUNT => {
                self.frame_count = match value {
                    None => 0,
                    Some(OptionValue::Int(count)) => usize::try_from(count).map_err(|_| {
                        AudioError::InvalidArgument(format!("negative frame count: {}", count))
                    })?,
                    Some(OptionValue::Str(_)) => {
                        return Err(AudioError::InvalidArgument(
                            "frame count must be an integer".into(),
                        ))
                    }
                };
                Ok(())
            }
            AUDIO_OPTION_DEVICENAME => {
                let name = match value {
                    None => "",
                    Some(OptionValue::Str(name)) => name,
                    Some(OptionValue::Int(_)) => {
                        return Err(AudioError::InvalidArgument(
                            "device name must be a string".into(),
                        ))
                    }
                };
                match self.device_name {
                    Some(ref mut stored) => {
                        stored.clear();
                        stored.push_str(name);
                    }
                    None => self.device_name = Some(name.to_owned()),
                }
                Ok(())
            }
            other => Err(AudioError::InvalidArgument(format!("unknown option: {}", other))),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_INPUT_FRAME_COUNT,
            device_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = SessionOptions::default();
        assert_eq!(options.frame_count, 160);
        assert!(options.device_name.is_none());
    }

    #[test]
    fn frame_count_set_and_reset() {
        let mut options = SessionOptions::default();
        options
            .apply(AUDIO_OPTION_INPUT_FRAME_COUNT, Some(OptionValue::Int(320)))
            .unwrap();
        assert_eq!(options.frame_count, 320);

        options.apply(AUDIO_OPTION_INPUT_FRAME_COUNT, None).unwrap();
        assert_eq!(options.frame_count, 0);
    }

    #[test]
    fn negative_frame_count_rejected() {
        let mut options = SessionOptions::default();
        let err = options
            .apply(AUDIO_OPTION_INPUT_FRAME_COUNT, Some(OptionValue::Int(-1)))
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument(_)));
        assert_eq!(options, SessionOptions::default());
    }

    #[test]
    fn device_name_clear_leaves_empty_string() {
        let mut options = SessionOptions::default();
        options
            .apply(AUDIO_OPTION_DEVICENAME, Some(OptionValue::Str("mic1")))
            .unwrap();
        assert_eq!(options.device_name.as_deref(), Some("mic1"));

        options.apply(AUDIO_OPTION_DEVICENAME, None).unwrap();
        assert_eq!(options.device_name.as_deref(), Some(""));
    }

    #[test]
    fn device_name_clear_before_set_constructs_empty() {
        let mut options = SessionOptions::default();
        options.apply(AUDIO_OPTION_DEVICENAME, None).unwrap();
        assert_eq!(options.device_name.as_deref(), Some(""));
    }

    #[test]
    fn unknown_option_changes_nothing() {
        let mut options = SessionOptions::default();
        let err = options
            .apply("sample_rate", Some(OptionValue::Int(48000)))
            .unwrap_err();
        assert!(matches!(err, AudioError::InvalidArgument(_)));
        assert_eq!(options, SessionOptions::default());
    }
}
