// DAC8718 serial command word + register list.

use crate::protocol::Frame;

/* ───── Command word anatomy (24 bits, MSB first) ───────────────────── */
//  23     : R/W   (0 = write)
//  22..21 : reserved, always 0
//  20..16 : register address
//  15..0  : data
pub const CMD_WRITE: u32 = 0;

const RW_SHIFT: u32 = 23;
const ADDR_SHIFT: u32 = 16;
const ADDR_MASK: u32 = 0x1F;
const DATA_MASK: u32 = 0xFFFF;

pub const COMMAND_BYTES: usize = crate::config::FRAME_WIDTH;

/* ────────────────── Register addresses ────────── */
pub const REG_CONFIG: u8 = 0x00;
pub const REG_DAC0: u8 = 0x08;
pub const REG_DAC1: u8 = 0x09;
pub const REG_DAC2: u8 = 0x0A;
pub const REG_DAC3: u8 = 0x0B;
pub const REG_DAC4: u8 = 0x0C;
pub const REG_DAC5: u8 = 0x0D;
pub const REG_DAC6: u8 = 0x0E;
pub const REG_DAC7: u8 = 0x0F;

/// Builds a write command. Out-of-range fields are truncated to their width.
pub const fn encode_write(register: u8, payload: u16) -> u32 {
    (CMD_WRITE << RW_SHIFT)
        | (((register as u32) & ADDR_MASK) << ADDR_SHIFT)
        | ((payload as u32) & DATA_MASK)
}

/// Splits a command word into the three bytes shifted out on the bus.
pub const fn command_bytes(command: u32) -> [u8; COMMAND_BYTES] {
    Frame::new(command).to_be_bytes()
}
