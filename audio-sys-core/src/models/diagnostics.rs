use serde::Serialize;

/// Counters maintained by the capture thread, for debugging sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureDiagnostics {
    pub capture_runs: u64,
    pub packets_drained: u64,
    pub silent_packets: u64,
    pub bytes_captured: u64,
    /// Write callback invocations.
    pub frames_delivered: u64,
    pub app_stop_requests: u64,
    /// Errors that ended a capture run.
    pub capture_errors: u64,
    pub last_error: Option<String>,
    /// RFC 3339 timestamp of the most recent capture thread start.
    pub last_started_at: Option<String>,
}
