use crate::models::error::AudioError;
use crate::models::format::PcmFormat;

/// Which of the two capture signals woke the capture thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Shutdown,
    BufferReady,
}

/// Bytes of one captured packet, as handed out by [`CaptureService::read_packet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    Samples(&'a [u8]),
    /// The endpoint flagged the packet as silence; treat it as this many zero bytes.
    Silent(usize),
}

impl Packet<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Samples(bytes) => bytes.len(),
            Self::Silent(len) => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The two auto-reset signals a capture thread waits on.
pub trait CaptureSignals: Send + Sync {
    /// Set the shutdown signal.
    fn request_shutdown(&self);

    /// Reset a shutdown request no thread consumed.
    fn clear_shutdown(&self);

    /// Block with no timeout until either signal is set, reset it, and report
    /// which one fired. Shutdown wins when both are set.
    fn wait(&self) -> Result<Wakeup, AudioError>;
}

/// Capture-data service obtained from an activated client.
///
/// Created and dropped on the capture thread.
pub trait CaptureService {
    /// Frames in the next available packet; zero once drained.
    fn next_packet_frames(&mut self) -> Result<u32, AudioError>;

    /// Acquire the next packet, pass it to `sink`, then release it.
    fn read_packet(&mut self, sink: &mut dyn FnMut(Packet<'_>)) -> Result<(), AudioError>;
}

/// An activated, initialized capture client with its signals bound.
pub trait AudioClient: Send + Sync + 'static {
    type Signals: CaptureSignals;
    type Service: CaptureService;

    fn format(&self) -> &PcmFormat;

    fn signals(&self) -> &Self::Signals;

    /// Obtain the capture-data service. Called on the capture thread.
    fn capture_service(&self) -> Result<Self::Service, AudioError>;

    /// Start streaming between the endpoint buffer and the audio engine.
    fn start(&self) -> Result<(), AudioError>;

    fn stop(&self) -> Result<(), AudioError>;
}

/// Performs one-shot activation of the default capture endpoint.
///
/// Implementations bridge the platform's asynchronous completion into a
/// blocking call. On failure every partial resource is released before
/// returning.
pub trait DeviceActivator {
    type Client: AudioClient;

    fn activate(&self, format: &PcmFormat) -> Result<Self::Client, AudioError>;
}
