//! In-process capture backend.
//!
//! Implements the platform traits without audio hardware. Activation
//! completes on a separate "platform" thread, packets are injected by the
//! caller, and faults can be armed for any native call. Useful for testing
//! an application's callbacks as well as this crate's own lifecycle.
//!
//! ```
//! use std::ops::ControlFlow;
//! use audio_sys_core::simulated::{SimulatedActivator, SimulatedDevice};
//! use audio_sys_core::{AudioCallbacks, AudioSession};
//!
//! let device = SimulatedDevice::new();
//! let session = AudioSession::create(&SimulatedActivator::new(device.clone())).unwrap();
//! session
//!     .set_callbacks(AudioCallbacks::with_write(|frame| {
//!         assert_eq!(frame.len(), 320);
//!         ControlFlow::Continue(())
//!     }))
//!     .unwrap();
//! session.start().unwrap();
//! device.push_packet(vec![0; 320]);
//! session.stop().unwrap();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::error::AudioError;
use crate::models::format::PcmFormat;
use crate::sync::completion::completion;
use crate::sync::signal::SignalPair;
use crate::traits::platform::{AudioClient, CaptureService, DeviceActivator, Packet};

/// Native call that an armed fault makes fail. Each fault fires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedFault {
    Activation,
    SignalBinding,
    CaptureService,
    PacketSize,
    Buffer,
    StreamStart,
}

#[derive(Debug)]
enum QueuedPacket {
    Samples(Vec<u8>),
    Silent(usize),
}

#[derive(Debug, Default)]
struct DeviceInner {
    packets: Mutex<VecDeque<QueuedPacket>>,
    faults: Mutex<Vec<SimulatedFault>>,
    bound_signals: Mutex<Option<Arc<SignalPair>>>,
    streaming: AtomicBool,
    live_clients: AtomicUsize,
    live_services: AtomicUsize,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

/// Handle to a simulated capture endpoint. Clones share the same device.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDevice {
    inner: Arc<DeviceInner>,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of the given kind fail.
    pub fn inject_fault(&self, fault: SimulatedFault) {
        self.inner.faults.lock().push(fault);
    }

    /// Queue a packet of captured bytes and signal buffer-ready. A trailing
    /// partial frame counts as one frame; an empty packet is dropped.
    pub fn push_packet(&self, bytes: Vec<u8>) {
        self.enqueue(QueuedPacket::Samples(bytes));
    }

    /// Queue a packet flagged as silent and signal buffer-ready.
    pub fn push_silence(&self, bytes: usize) {
        self.enqueue(QueuedPacket::Silent(bytes));
    }

    pub fn is_streaming(&self) -> bool {
        self.inner.streaming.load(Ordering::SeqCst)
    }

    /// Clients activated and not yet released.
    pub fn live_clients(&self) -> usize {
        self.inner.live_clients.load(Ordering::SeqCst)
    }

    /// Capture services acquired and not yet released.
    pub fn live_services(&self) -> usize {
        self.inner.live_services.load(Ordering::SeqCst)
    }

    /// Whether a client has its buffer-ready signal bound.
    pub fn signals_bound(&self) -> bool {
        self.inner.bound_signals.lock().is_some()
    }

    pub fn start_calls(&self) -> usize {
        self.inner.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.inner.stop_calls.load(Ordering::SeqCst)
    }

    fn enqueue(&self, packet: QueuedPacket) {
        let empty = match &packet {
            QueuedPacket::Samples(bytes) => bytes.is_empty(),
            QueuedPacket::Silent(len) => *len == 0,
        };
        if empty {
            return;
        }
        self.inner.packets.lock().push_back(packet);
        if let Some(signals) = self.inner.bound_signals.lock().as_ref() {
            signals.signal_buffer_ready();
        }
    }

    fn take_fault(&self, fault: SimulatedFault) -> bool {
        let mut faults = self.inner.faults.lock();
        match faults.iter().position(|f| *f == fault) {
            Some(index) => {
                faults.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Activates a [`SimulatedClient`] through an asynchronous completion.
#[derive(Debug, Clone)]
pub struct SimulatedActivator {
    device: SimulatedDevice,
}

impl SimulatedActivator {
    pub fn new(device: SimulatedDevice) -> Self {
        Self { device }
    }
}

impl DeviceActivator for SimulatedActivator {
    type Client = SimulatedClient;

    fn activate(&self, format: &PcmFormat) -> Result<SimulatedClient, AudioError> {
        let (completer, completion) = completion();
        let device = self.device.clone();
        let format = *format;

        thread::Builder::new()
            .name("simulated-activation".into())
            .spawn(move || completer.complete(complete_activation(device, format)))
            .map_err(|e| AudioError::platform("ActivateAudioInterfaceAsync", e))?;

        completion.wait().unwrap_or_else(|| {
            Err(AudioError::platform(
                "ActivateAudioInterfaceAsync",
                "completion handler dropped",
            ))
        })
    }
}

/// Completion handler body, run on the platform thread.
fn complete_activation(device: SimulatedDevice, format: PcmFormat) -> Result<SimulatedClient, AudioError> {
    if device.take_fault(SimulatedFault::Activation) {
        return Err(AudioError::platform("ActivateAudioInterfaceAsync", "E_ACCESSDENIED"));
    }

    let client = SimulatedClient::new(device.clone(), format);

    if device.take_fault(SimulatedFault::SignalBinding) {
        return Err(AudioError::platform("IAudioClient::SetEventHandle", "E_INVALIDARG"));
    }
    *device.inner.bound_signals.lock() = Some(Arc::clone(&client.signals));

    Ok(client)
}

/// Activated simulated client.
#[derive(Debug)]
pub struct SimulatedClient {
    device: SimulatedDevice,
    format: PcmFormat,
    signals: Arc<SignalPair>,
}

impl SimulatedClient {
    fn new(device: SimulatedDevice, format: PcmFormat) -> Self {
        device.inner.live_clients.fetch_add(1, Ordering::SeqCst);
        Self {
            device,
            format,
            signals: Arc::new(SignalPair::new()),
        }
    }
}

impl AudioClient for SimulatedClient {
    type Signals = SignalPair;
    type Service = SimulatedService;

    fn format(&self) -> &PcmFormat {
        &self.format
    }

    fn signals(&self) -> &SignalPair {
        &self.signals
    }

    fn capture_service(&self) -> Result<SimulatedService, AudioError> {
        if self.device.take_fault(SimulatedFault::CaptureService) {
            return Err(AudioError::platform("IAudioClient::GetService", "E_NOINTERFACE"));
        }
        self.device.inner.live_services.fetch_add(1, Ordering::SeqCst);
        Ok(SimulatedService {
            device: self.device.clone(),
            block_align: self.format.block_align as usize,
        })
    }

    fn start(&self) -> Result<(), AudioError> {
        self.device.inner.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.device.take_fault(SimulatedFault::StreamStart) {
            return Err(AudioError::platform("IAudioClient::Start", "E_FAIL"));
        }
        if self.device.inner.streaming.swap(true, Ordering::SeqCst) {
            return Err(AudioError::platform("IAudioClient::Start", "AUDCLNT_E_NOT_STOPPED"));
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), AudioError> {
        self.device.inner.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.device.inner.streaming.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for SimulatedClient {
    fn drop(&mut self) {
        let mut bound = self.device.inner.bound_signals.lock();
        if bound.as_ref().is_some_and(|s| Arc::ptr_eq(s, &self.signals)) {
            *bound = None;
        }
        drop(bound);
        self.device.inner.streaming.store(false, Ordering::SeqCst);
        self.device.inner.live_clients.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Capture-data service of a [`SimulatedClient`].
#[derive(Debug)]
pub struct SimulatedService {
    device: SimulatedDevice,
    block_align: usize,
}

impl CaptureService for SimulatedService {
    fn next_packet_frames(&mut self) -> Result<u32, AudioError> {
        if self.device.take_fault(SimulatedFault::PacketSize) {
            return Err(AudioError::platform(
                "IAudioCaptureClient::GetNextPacketSize",
                "AUDCLNT_E_DEVICE_INVALIDATED",
            ));
        }
        let packets = self.device.inner.packets.lock();
        let bytes = match packets.front() {
            Some(QueuedPacket::Samples(bytes)) => bytes.len(),
            Some(QueuedPacket::Silent(len)) => *len,
            None => 0,
        };
        Ok(bytes.div_ceil(self.block_align) as u32)
    }

    fn read_packet(&mut self, sink: &mut dyn FnMut(Packet<'_>)) -> Result<(), AudioError> {
        if self.device.take_fault(SimulatedFault::Buffer) {
            return Err(AudioError::platform("IAudioCaptureClient::GetBuffer", "AUDCLNT_E_BUFFER_ERROR"));
        }
        let packet = self.device.inner.packets.lock().pop_front();
        match packet {
            Some(QueuedPacket::Samples(bytes)) => sink(Packet::Samples(&bytes)),
            Some(QueuedPacket::Silent(len)) => sink(Packet::Silent(len)),
            None => {
                return Err(AudioError::platform(
                    "IAudioCaptureClient::GetBuffer",
                    "AUDCLNT_S_BUFFER_EMPTY",
                ))
            }
        }
        Ok(())
    }
}

impl Drop for SimulatedService {
    fn drop(&mut self) {
        self.device.inner.live_services.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::CAPTURE_FORMAT;
    use crate::traits::platform::{CaptureSignals, Wakeup};

    #[test]
    fn activation_binds_signals() {
        let device = SimulatedDevice::new();
        let client = SimulatedActivator::new(device.clone())
            .activate(&CAPTURE_FORMAT)
            .unwrap();

        assert!(device.signals_bound());
        assert_eq!(device.live_clients(), 1);

        drop(client);
        assert!(!device.signals_bound());
        assert_eq!(device.live_clients(), 0);
    }

    #[test]
    fn faults_fire_once() {
        let device = SimulatedDevice::new();
        device.inject_fault(SimulatedFault::Activation);
        let activator = SimulatedActivator::new(device.clone());

        assert!(activator.activate(&CAPTURE_FORMAT).is_err());
        assert!(activator.activate(&CAPTURE_FORMAT).is_ok());
    }

    #[test]
    fn pushed_packet_signals_and_drains() {
        let device = SimulatedDevice::new();
        let client = SimulatedActivator::new(device.clone())
            .activate(&CAPTURE_FORMAT)
            .unwrap();
        let mut service = client.capture_service().unwrap();

        device.push_packet(vec![5; 320]);
        device.push_silence(64);
        assert_eq!(client.signals().wait().unwrap(), Wakeup::BufferReady);

        assert_eq!(service.next_packet_frames().unwrap(), 160);
        let mut seen = Vec::new();
        service
            .read_packet(&mut |packet| seen.push(packet.len()))
            .unwrap();
        assert_eq!(service.next_packet_frames().unwrap(), 32);
        service
            .read_packet(&mut |packet| {
                assert_eq!(packet, Packet::Silent(64));
                seen.push(packet.len());
            })
            .unwrap();
        assert_eq!(service.next_packet_frames().unwrap(), 0);
        assert_eq!(seen, vec![320, 64]);
    }

    #[test]
    fn partial_frame_packet_does_not_stall_queue() {
        let device = SimulatedDevice::new();
        let client = SimulatedActivator::new(device.clone())
            .activate(&CAPTURE_FORMAT)
            .unwrap();
        let mut service = client.capture_service().unwrap();

        device.push_packet(Vec::new());
        device.push_packet(vec![9; 1]);
        device.push_silence(3);
        device.push_packet(vec![9; 320]);

        let mut seen = Vec::new();
        while service.next_packet_frames().unwrap() > 0 {
            service
                .read_packet(&mut |packet| seen.push(packet.len()))
                .unwrap();
        }
        assert_eq!(seen, vec![1, 3, 320]);
    }

    #[test]
    fn start_twice_reports_not_stopped() {
        let device = SimulatedDevice::new();
        let client = SimulatedActivator::new(device.clone())
            .activate(&CAPTURE_FORMAT)
            .unwrap();

        client.start().unwrap();
        assert!(client.start().is_err());
        client.stop().unwrap();
        client.start().unwrap();
        assert_eq!(device.start_calls(), 3);
    }
}
