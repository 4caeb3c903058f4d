#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod drivers;
pub mod protocol;

#[cfg(target_os = "none")]
pub mod board;
#[cfg(target_os = "none")]
pub mod ipc;
#[cfg(target_os = "none")]
pub mod tasks;

#[cfg(target_os = "none")]
pub use board::Board;
pub use protocol::{Frame, Reassembler};
