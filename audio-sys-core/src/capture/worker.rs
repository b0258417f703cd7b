//! The capture thread.
//!
//! Sequence:
//! 1. Announce `Starting`, persist `Running`, acknowledge the controller
//! 2. Acquire the capture-data service from the client
//! 3. Allocate the scratch buffer (`frame_count * block_align` bytes)
//! 4. Wait on shutdown / buffer-ready, drain packets into the write callback
//! 5. Exit path: free buffer and service, persist and announce `Stopped`
//!    (also on unwind, through `ExitPath`)

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::capture::scratch::ScratchBuffer;
use crate::models::error::AudioError;
use crate::session::shared::SessionShared;
use crate::sync::completion::Completer;
use crate::traits::platform::{AudioClient, CaptureService, CaptureSignals, Packet, Wakeup};

/// Thread body. Runs until shutdown is signalled or a platform error occurs.
pub(crate) fn run<C: AudioClient>(client: Arc<C>, shared: Arc<SessionShared>, entered: Completer<()>) {
    let _exit = ExitPath { shared: &shared };

    shared.begin_capture();
    entered.complete(());
    log::debug!("session {}: capture thread running", shared.id);

    match capture_loop(client.as_ref(), &shared) {
        Ok(()) => log::debug!("session {}: capture thread shutting down", shared.id),
        Err(e) => {
            log::error!("session {}: capture aborted: {}", shared.id, e);
            shared.record_error(&e);
        }
    }
}

/// Persists and announces `Stopped` when the thread leaves `run`, including
/// by unwinding out of an application callback.
struct ExitPath<'a> {
    shared: &'a SessionShared,
}

impl Drop for ExitPath<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("session {}: capture thread panicked in a callback", self.shared.id);
            self.shared
                .record_error(&AudioError::platform("capture thread", "callback panicked"));
            // The state callback may be the one that panicked.
            let _ = panic::catch_unwind(AssertUnwindSafe(|| self.shared.end_capture()));
        } else {
            self.shared.end_capture();
        }
    }
}

fn capture_loop<C: AudioClient>(client: &C, shared: &SessionShared) -> Result<(), AudioError> {
    let mut service = client.capture_service()?;

    let frame_count = shared.lock().options.frame_count;
    let mut scratch = ScratchBuffer::allocate(client.format().frames_to_bytes(frame_count))?;

    loop {
        match client.signals().wait()? {
            Wakeup::Shutdown => return Ok(()),
            Wakeup::BufferReady => drain(&mut service, &mut scratch, shared)?,
        }
    }
}

/// Drain every packet available for one buffer-ready signal.
fn drain<S: CaptureService>(
    service: &mut S,
    scratch: &mut ScratchBuffer,
    shared: &SessionShared,
) -> Result<(), AudioError> {
    loop {
        let frames = service.next_packet_frames()?;
        if frames == 0 {
            return Ok(());
        }

        let mut stop_requested = false;
        service.read_packet(&mut |packet| {
            log::trace!("session {}: packet of {} bytes", shared.id, packet.len());
            shared.record_packet(packet.len(), matches!(packet, Packet::Silent(_)));
            if scratch.fill(packet, |frame| shared.deliver(frame)).is_break() {
                stop_requested = true;
            }
        })?;

        if stop_requested {
            log::info!("session {}: write callback requested stop", shared.id);
            shared.app_requested_stop();
        }
    }
}
