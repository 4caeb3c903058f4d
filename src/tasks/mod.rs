pub mod dac;
pub mod receiver;

pub use dac::{dac_task, DacDriver};
pub use receiver::{receiver_stats_task, receiver_task};
