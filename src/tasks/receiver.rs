//! SPI peripheral receiver: 8 x 24-bit packets per batch
//!
//! Each DMA transaction fills `rx` with one chunk. The chunk goes through the
//! reassembler, which reports frames, partial frames and completed batches to
//! `DefmtEvents`. Completed batches are also forwarded to the stats task.
use defmt::{debug, info, warn};
use embassy_executor::task;
use embassy_stm32::{mode::Async, spi, spi::SpiSlave};
use embassy_time::{with_timeout, Duration, Instant};

use crate::config::{FRAMES_PER_BATCH, RECEIVER_STATS_PERIOD_MS, SPI_RX_CHUNK_SIZE};
use crate::ipc::{BatchBytes, BATCH_CH, RECEIVER_STATS};
use crate::protocol::{
    pump, ChunkSource, Frame, PumpError, Reassembler, ReassemblyError, ReassemblyEvents,
};

impl ChunkSource for SpiSlave<'static, Async> {
    type Error = spi::Error;

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, spi::Error> {
        // the transaction completes once the whole buffer has been clocked in
        self.transfer_in_place(buf).await?;
        Ok(buf.len())
    }
}

struct DefmtEvents;

impl ReassemblyEvents for DefmtEvents {
    fn chunk(&mut self, bytes: &[u8]) {
        info!("Received {} bytes: {:02X}", bytes.len(), bytes);
    }

    fn frame(&mut self, index: usize, frame: Frame) {
        info!("Packet {} data: 0x{:06X}", index, frame.value());
    }

    fn partial(&mut self, leftover: usize) {
        info!("Partial packet data ({} bytes)", leftover);
    }

    fn batch_complete(&mut self, batch: &[u8]) {
        info!("=== All expected packets received ===");
        info!("Complete data: {:02X}", batch);
        if let Ok(bytes) = BatchBytes::from_slice(batch) {
            if BATCH_CH.try_send(bytes).is_err() {
                debug!("batch channel full, dropping batch");
            }
        }
    }

    fn dropped(&mut self, error: &ReassemblyError) {
        warn!("Delivery dropped: {}", error);
    }
}

#[task]
pub async fn receiver_task(mut spi: SpiSlave<'static, Async>) {
    info!(
        "SPI Slave Started - Ready to receive {} x 24-bit packets",
        FRAMES_PER_BATCH
    );

    let mut reassembler = Reassembler::new();
    let mut events = DefmtEvents;
    let mut rx = [0u8; SPI_RX_CHUNK_SIZE];

    loop {
        match pump(&mut spi, &mut rx, &mut reassembler, &mut events).await {
            Ok(out) if out.frames > 0 => {
                debug!("Received {} complete 24-bit packet(s)", out.frames);
            }
            Ok(_) => {}
            Err(PumpError::Bus(e)) => {
                RECEIVER_STATS.record_bus_error();
                warn!("SPI receive error: {:?}", e);
            }
            // reported through DefmtEvents::dropped
            Err(PumpError::Reassembly(_)) => {}
        }
        RECEIVER_STATS.publish(&reassembler.stats());
    }
}

#[task]
pub async fn receiver_stats_task() {
    info!("Receiver stats task started");
    let period = Duration::from_millis(RECEIVER_STATS_PERIOD_MS);
    let mut last_report = Instant::now();
    let mut batches = 0u32;
    let mut latest: Option<BatchBytes> = None;

    loop {
        if let Ok(batch) = with_timeout(period, BATCH_CH.receive()).await {
            batches += 1;
            latest = Some(batch);
        }

        if last_report.elapsed() >= period {
            let (stats, bus_errors) = RECEIVER_STATS.snapshot();
            info!(
                "RX: {} batches/period, {} batches total, {} frames, {} partial, {} dropped ({} bytes), {} bus errors",
                batches,
                stats.batches,
                stats.frames,
                stats.partial_chunks,
                stats.dropped_chunks,
                stats.dropped_bytes,
                bus_errors
            );
            if let Some(batch) = latest.take() {
                debug!("Last batch: {:02X}", batch.as_slice());
            }
            batches = 0;
            last_report = Instant::now();
        }
    }
}
