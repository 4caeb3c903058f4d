//! 24-bit frames as carried on the peripheral-mode bus (big-endian).

use crate::config::FRAME_WIDTH;

/// One 24-bit unit of data. The upper byte of the backing `u32` is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Frame(u32);

impl Frame {
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Builds a frame from the low 24 bits of `value`.
    pub const fn new(value: u32) -> Self {
        Self(value & Self::MAX)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn from_be_bytes(bytes: [u8; FRAME_WIDTH]) -> Self {
        Self(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32)
    }

    /// MSB first, ready to be shifted out byte by byte.
    pub const fn to_be_bytes(self) -> [u8; FRAME_WIDTH] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Decodes a slice of exactly `FRAME_WIDTH` bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; FRAME_WIDTH] = bytes.try_into().ok()?;
        Some(Self::from_be_bytes(raw))
    }
}

/// Whole frames contained in `chunk`, with their index within the chunk.
/// Trailing bytes that do not fill a frame are skipped.
pub fn frames(chunk: &[u8]) -> impl Iterator<Item = (usize, Frame)> + '_ {
    chunk
        .chunks_exact(FRAME_WIDTH)
        .filter_map(Frame::from_slice)
        .enumerate()
}
