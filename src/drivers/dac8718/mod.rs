pub mod driver;
pub mod protocol;

pub use driver::{code_to_volts, ramp_levels, Channel, Dac8718, DacError, InvalidChannel};
