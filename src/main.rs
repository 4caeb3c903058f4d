#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
use {defmt_rtt as _, panic_probe as _};

#[cfg(target_os = "none")]
#[embassy_executor::main]
async fn main(spawner: embassy_executor::Spawner) {
    use dac_link_embassy::{
        drivers::Dac8718,
        tasks::{dac_task, receiver_stats_task, receiver_task},
        Board,
    };
    use defmt::*;
    use embassy_time::Delay;

    info!("Starting dac-link firmware");
    let board = Board::init();

    match Dac8718::new(board.dac_spi, board.dac_cs, Some(board.dac_ldac), Delay) {
        Ok(dac) => {
            spawner.spawn(dac_task(dac)).unwrap();
            info!("DAC8718 initialized, task spawned");
        }
        Err(e) => error!("DAC8718 initialization failed: {:?}", e),
    }

    spawner.spawn(receiver_task(board.rx_spi)).unwrap();
    spawner.spawn(receiver_stats_task()).unwrap();
    info!("SPI receiver tasks spawned");

    core::future::pending::<()>().await;
}

// The firmware image only exists for the MCU target; host builds just run the library tests.
#[cfg(not(target_os = "none"))]
fn main() {}
