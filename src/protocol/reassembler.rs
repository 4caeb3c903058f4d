//! Packet reassembly for the peripheral-mode bus.
//!
//! Chunks arrive in whatever size the bus transaction produced. Each chunk is
//! appended to the batch storage, its whole frames are decoded and reported,
//! and once `FRAMES_PER_BATCH` frames have been counted the batch is handed to
//! the event sink and the state starts over.
//!
//! Bytes that do not complete a frame within their own chunk are reported as a
//! partial frame but are not stitched onto the next chunk.

use heapless::Vec;

use super::frame::{frames, Frame};
use crate::config::{BATCH_CAPACITY, FRAMES_PER_BATCH, FRAME_WIDTH};

/// Diagnostic sink for reassembly progress. Every hook defaults to a no-op.
pub trait ReassemblyEvents {
    /// Raw bytes of a non-empty delivery, before any checks.
    fn chunk(&mut self, _bytes: &[u8]) {}
    /// A whole frame decoded from the current chunk.
    fn frame(&mut self, _index: usize, _frame: Frame) {}
    /// The chunk ended with `leftover` bytes short of a frame.
    fn partial(&mut self, _leftover: usize) {}
    /// All accumulated bytes of a completed batch, just before the reset.
    fn batch_complete(&mut self, _batch: &[u8]) {}
    /// The delivery was rejected and nothing was stored.
    fn dropped(&mut self, _error: &ReassemblyError) {}
}

impl ReassemblyEvents for () {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ReassemblyError {
    /// Storing the chunk would push the batch past its capacity.
    Overflow {
        accumulated: usize,
        incoming: usize,
        capacity: usize,
    },
}

/// Outcome of one accepted delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Ingest {
    pub frames: usize,
    pub leftover: usize,
    pub batch_complete: bool,
}

/// Lifetime counters, never reset by batch completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct ReassemblerStats {
    pub batches: u32,
    pub frames: u32,
    pub partial_chunks: u32,
    pub dropped_chunks: u32,
    pub dropped_bytes: u32,
}

pub struct Reassembler {
    storage: Vec<u8, BATCH_CAPACITY>,
    frames: usize,
    stats: ReassemblerStats,
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reassembler {
    pub const fn new() -> Self {
        Self {
            storage: Vec::new(),
            frames: 0,
            stats: ReassemblerStats {
                batches: 0,
                frames: 0,
                partial_chunks: 0,
                dropped_chunks: 0,
                dropped_bytes: 0,
            },
        }
    }

    pub fn accumulated_bytes(&self) -> usize {
        self.storage.len()
    }

    pub fn accumulated_frames(&self) -> usize {
        self.frames
    }

    /// Bytes stored for the batch in progress.
    pub fn contents(&self) -> &[u8] {
        &self.storage
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty() && self.frames == 0
    }

    pub fn stats(&self) -> ReassemblerStats {
        self.stats
    }

    /// Feeds one delivery into the batch.
    ///
    /// A chunk that does not fit in the remaining capacity is rejected: none
    /// of its bytes are stored, no frame events are emitted and the error is
    /// also reported through [`ReassemblyEvents::dropped`]. Its whole frames
    /// still count toward the batch, so a stream whose chunks are not
    /// frame-aligned keeps completing (and resetting) batches instead of
    /// rejecting every later delivery. Empty chunks are ignored.
    pub fn ingest<E>(&mut self, chunk: &[u8], events: &mut E) -> Result<Ingest, ReassemblyError>
    where
        E: ReassemblyEvents + ?Sized,
    {
        if chunk.is_empty() {
            return Ok(Ingest::default());
        }
        events.chunk(chunk);

        // heapless checks capacity before copying, so a failure leaves storage untouched
        if self.storage.extend_from_slice(chunk).is_err() {
            let err = ReassemblyError::Overflow {
                accumulated: self.storage.len(),
                incoming: chunk.len(),
                capacity: BATCH_CAPACITY,
            };
            self.stats.dropped_chunks = self.stats.dropped_chunks.wrapping_add(1);
            self.stats.dropped_bytes = self.stats.dropped_bytes.wrapping_add(chunk.len() as u32);
            events.dropped(&err);

            self.frames += chunk.len() / FRAME_WIDTH;
            self.complete_if_full(events);
            return Err(err);
        }

        let mut outcome = Ingest {
            frames: chunk.len() / FRAME_WIDTH,
            leftover: chunk.len() % FRAME_WIDTH,
            batch_complete: false,
        };
        self.frames += outcome.frames;
        self.stats.frames = self.stats.frames.wrapping_add(outcome.frames as u32);

        for (index, frame) in frames(chunk) {
            events.frame(index, frame);
        }

        if outcome.leftover > 0 {
            self.stats.partial_chunks = self.stats.partial_chunks.wrapping_add(1);
            events.partial(outcome.leftover);
        }

        outcome.batch_complete = self.complete_if_full(events);
        Ok(outcome)
    }

    fn complete_if_full<E>(&mut self, events: &mut E) -> bool
    where
        E: ReassemblyEvents + ?Sized,
    {
        if self.frames < FRAMES_PER_BATCH {
            return false;
        }
        events.batch_complete(&self.storage);
        self.reset();
        self.stats.batches = self.stats.batches.wrapping_add(1);
        true
    }

    fn reset(&mut self) {
        self.storage.clear();
        self.frames = 0;
    }
}
