use std::ops::ControlFlow;

use crate::models::error::AudioError;
use crate::traits::platform::Packet;

/// Fixed-capacity buffer that accumulates packet bytes and hands out full
/// frames to the write callback.
///
/// Owned by the capture thread; freed when the thread exits.
#[derive(Debug)]
pub struct ScratchBuffer {
    data: Vec<u8>,
    offset: usize,
}

impl ScratchBuffer {
    /// Allocate `total_size` bytes. A zero-sized buffer could never deliver
    /// a frame, so it is reported as an allocation failure.
    pub fn allocate(total_size: usize) -> Result<Self, AudioError> {
        if total_size == 0 {
            return Err(AudioError::Allocation { bytes: 0 });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(total_size)
            .map_err(|_| AudioError::Allocation { bytes: total_size })?;
        data.resize(total_size, 0);
        Ok(Self { data, offset: 0 })
    }

    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    /// Bytes waiting for the buffer to fill.
    pub fn pending(&self) -> usize {
        self.offset
    }

    /// Copy a packet in, calling `deliver` with the whole buffer each time it
    /// fills. Returns `Break` if any delivery asked to stop; the rest of the
    /// packet is still consumed.
    pub fn fill<F>(&mut self, packet: Packet<'_>, mut deliver: F) -> ControlFlow<()>
    where
        F: FnMut(&[u8]) -> ControlFlow<()>,
    {
        let mut remaining = packet.len();
        let mut consumed = 0;
        let mut outcome = ControlFlow::Continue(());

        while remaining > 0 {
            let room = self.data.len() - self.offset;
            let count = remaining.min(room);
            let dest = &mut self.data[self.offset..self.offset + count];
            match packet {
                Packet::Samples(bytes) => dest.copy_from_slice(&bytes[consumed..consumed + count]),
                Packet::Silent(_) => dest.fill(0),
            }
            self.offset += count;
            consumed += count;
            remaining -= count;

            if self.offset == self.data.len() {
                if deliver(&self.data).is_break() {
                    outcome = ControlFlow::Break(());
                }
                self.offset = 0;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_allocation_failure() {
        assert_eq!(
            ScratchBuffer::allocate(0).unwrap_err(),
            AudioError::Allocation { bytes: 0 }
        );
    }

    #[test]
    fn exact_packet_delivers_once() {
        let mut scratch = ScratchBuffer::allocate(320).unwrap();
        let packet = vec![7u8; 320];
        let mut deliveries = Vec::new();

        let flow = scratch.fill(Packet::Samples(&packet), |frame| {
            deliveries.push(frame.len());
            ControlFlow::Continue(())
        });

        assert!(flow.is_continue());
        assert_eq!(deliveries, vec![320]);
        assert_eq!(scratch.pending(), 0);
    }

    #[test]
    fn partial_packets_carry_over() {
        let mut scratch = ScratchBuffer::allocate(4).unwrap();
        let mut frames: Vec<Vec<u8>> = Vec::new();

        scratch.fill(Packet::Samples(&[1, 2, 3]), |f| {
            frames.push(f.to_vec());
            ControlFlow::Continue(())
        });
        assert!(frames.is_empty());
        assert_eq!(scratch.pending(), 3);

        scratch.fill(Packet::Samples(&[4, 5, 6, 7, 8, 9]), |f| {
            frames.push(f.to_vec());
            ControlFlow::Continue(())
        });
        assert_eq!(frames, vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]);
        assert_eq!(scratch.pending(), 1);
    }

    #[test]
    fn silent_packet_delivers_zeros() {
        let mut scratch = ScratchBuffer::allocate(4).unwrap();
        scratch.fill(Packet::Samples(&[9, 9, 9, 9]), |_| ControlFlow::Continue(()));

        let mut frames: Vec<Vec<u8>> = Vec::new();
        scratch.fill(Packet::Silent(4), |f| {
            frames.push(f.to_vec());
            ControlFlow::Continue(())
        });
        assert_eq!(frames, vec![vec![0, 0, 0, 0]]);
    }

    #[test]
    fn stop_request_still_consumes_packet() {
        let mut scratch = ScratchBuffer::allocate(2).unwrap();
        let mut calls = 0;

        let flow = scratch.fill(Packet::Samples(&[1, 2, 3, 4, 5, 6]), |_| {
            calls += 1;
            if calls == 1 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert!(flow.is_break());
        assert_eq!(calls, 3);
        assert_eq!(scratch.pending(), 0);
    }
}
