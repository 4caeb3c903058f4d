use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex as RawMutex, channel::Channel};
use heapless::Vec;
use portable_atomic::{AtomicU32, Ordering};

use crate::config::*;
use crate::protocol::ReassemblerStats;

pub type BatchBytes = Vec<u8, BATCH_CAPACITY>;

/* completed batches, receiver -> stats (dropped when full) */
pub static BATCH_CH: Channel<RawMutex, BatchBytes, BATCH_CHANNEL_SIZE> = Channel::new();

// Single writer (receiver task), any number of readers
pub struct ReceiverCounters {
    batches: AtomicU32,
    frames: AtomicU32,
    partial_chunks: AtomicU32,
    dropped_chunks: AtomicU32,
    dropped_bytes: AtomicU32,
    bus_errors: AtomicU32,
}

impl ReceiverCounters {
    pub const fn new() -> Self {
        Self {
            batches: AtomicU32::new(0),
            frames: AtomicU32::new(0),
            partial_chunks: AtomicU32::new(0),
            dropped_chunks: AtomicU32::new(0),
            dropped_bytes: AtomicU32::new(0),
            bus_errors: AtomicU32::new(0),
        }
    }

    pub fn publish(&self, stats: &ReassemblerStats) {
        self.batches.store(stats.batches, Ordering::Relaxed);
        self.frames.store(stats.frames, Ordering::Relaxed);
        self.partial_chunks.store(stats.partial_chunks, Ordering::Relaxed);
        self.dropped_chunks.store(stats.dropped_chunks, Ordering::Relaxed);
        self.dropped_bytes.store(stats.dropped_bytes, Ordering::Relaxed);
    }

    pub fn record_bus_error(&self) {
        self.bus_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (ReassemblerStats, u32) {
        let stats = ReassemblerStats {
            batches: self.batches.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            partial_chunks: self.partial_chunks.load(Ordering::Relaxed),
            dropped_chunks: self.dropped_chunks.load(Ordering::Relaxed),
            dropped_bytes: self.dropped_bytes.load(Ordering::Relaxed),
        };
        (stats, self.bus_errors.load(Ordering::Relaxed))
    }
}

pub static RECEIVER_STATS: ReceiverCounters = ReceiverCounters::new();
