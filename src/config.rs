// Centralize all configuration constants

// Peripheral-mode packet layout
pub const FRAME_WIDTH: usize = 3; // 24-bit frames, MSB first
pub const FRAMES_PER_BATCH: usize = 8;
pub const BATCH_CAPACITY: usize = FRAME_WIDTH * FRAMES_PER_BATCH;
pub const SPI_RX_CHUNK_SIZE: usize = FRAME_WIDTH; // one frame per transaction

const _: () = assert!(SPI_RX_CHUNK_SIZE <= BATCH_CAPACITY);
const _: () = assert!(SPI_RX_CHUNK_SIZE % FRAME_WIDTH == 0);

// DAC8718 output
pub const DAC_SPI_FREQUENCY_HZ: u32 = 1_000_000;
pub const DAC_CHANNELS: usize = 8;
pub const DAC_VREF_VOLTS: f32 = 5.0;
pub const DAC_FULL_SCALE: u16 = u16::MAX;
pub const LDAC_PULSE_NS: u32 = 1_000; // datasheet minimum is 20ns
pub const DAC_PATTERN_PERIOD_MS: u64 = 5_000;

// Receiver telemetry
pub const RECEIVER_STATS_PERIOD_MS: u64 = 1_000;

// Channel sizes
pub const BATCH_CHANNEL_SIZE: usize = 2;

// DAC demo patterns
pub const DAC_DEMO_LEVELS: [u16; DAC_CHANNELS] = [
    0,     // 0V
    16383, // ~1.25V
    32767, // ~2.5V
    8192,  // ~0.625V
    24576, // ~1.875V
    4096,  // ~0.31V
    28672, // ~2.19V
    16384, // ~1.25V
];
pub const DAC_RAMP_STEP: u16 = 4681;
