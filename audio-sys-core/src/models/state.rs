use serde::{Deserialize, Serialize};

/// Lifecycle state reported for the input (capture) and output paths.
///
/// State transitions for one capture run:
/// ```text
/// stopped → starting → running → stopped
/// ```
///
/// `Starting` is only ever delivered through the state callback. The value
/// persisted on a session is always `Stopped` or `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioState {
    #[default]
    Stopped,
    Starting,
    Running,
}

impl AudioState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_stopped() {
        assert_eq!(AudioState::default(), AudioState::Stopped);
        assert!(AudioState::default().is_stopped());
        assert!(!AudioState::Starting.is_running());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AudioState::Running).unwrap(), "\"running\"");
        let parsed: AudioState = serde_json::from_str("\"starting\"").unwrap();
        assert_eq!(parsed, AudioState::Starting);
    }
}
