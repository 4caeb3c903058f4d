//! DAC8718 demo output: alternates between fixed levels and a ramp, latching
//! all eight channels together with LDAC after each pattern.
use defmt::{info, warn};
use embassy_executor::task;
use embassy_stm32::{gpio::Output, mode::Async, spi::Spi};
use embassy_time::{Delay, Timer};

use crate::config::{DAC_CHANNELS, DAC_DEMO_LEVELS, DAC_PATTERN_PERIOD_MS, DAC_RAMP_STEP};
use crate::drivers::dac8718::{code_to_volts, ramp_levels, Channel, Dac8718};

pub type DacDriver = Dac8718<Spi<'static, Async>, Output<'static>, Output<'static>, Delay>;

#[task]
pub async fn dac_task(mut dac: DacDriver) {
    info!("DAC8718 task started");
    if !dac.has_ldac() {
        warn!("No LDAC line, outputs update on each write");
    }
    let patterns = [DAC_DEMO_LEVELS, ramp_levels(DAC_RAMP_STEP)];

    for levels in patterns.iter().cycle() {
        write_levels(&mut dac, levels).await;

        if let Err(e) = dac.synchronize_outputs().await {
            warn!("LDAC pulse failed: {:?}", e);
        }

        Timer::after_millis(DAC_PATTERN_PERIOD_MS).await;
    }
}

async fn write_levels(dac: &mut DacDriver, levels: &[u16; DAC_CHANNELS]) {
    for (channel, &value) in Channel::all().zip(levels.iter()) {
        match dac.write_channel(channel.index(), value).await {
            Ok(()) => info!(
                "DAC{} set to {} ({}V)",
                channel.index(),
                value,
                code_to_volts(value)
            ),
            Err(e) => warn!("DAC{} write failed: {:?}", channel.index(), e),
        }
    }
}
