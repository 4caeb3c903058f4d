pub mod dac8718;

pub use dac8718::{Channel, Dac8718, DacError};
