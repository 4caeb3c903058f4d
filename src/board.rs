use embassy_stm32::mode::Async;
use embassy_stm32::spi::{Spi, SpiSlave};
use embassy_stm32::time::Hertz;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    rcc, spi, Config,
};

use crate::config::DAC_SPI_FREQUENCY_HZ;

// ── Board struct ──────────────────────────────────────────
pub struct Board {
    pub dac_spi: Spi<'static, Async>, // DMA, controller
    pub dac_cs: Output<'static>,
    pub dac_ldac: Output<'static>,
    pub rx_spi: SpiSlave<'static, Async>, // DMA, peripheral
}

impl Board {
    pub fn init() -> Self {
        let mut config = Config::default();

        // 16MHz HSI -> PLL -> 64MHz SYSCLK
        config.rcc.hsi = Some(rcc::Hsi {
            sys_div: rcc::HsiSysDiv::DIV1,
        });
        config.rcc.pll = Some(rcc::Pll {
            source: rcc::PllSource::HSI,
            prediv: rcc::PllPreDiv::DIV2,   // 16MHz / 2 = 8MHz
            mul: rcc::PllMul::MUL16,        // 8MHz * 16 = 128MHz
            divp: None,
            divq: None,
            divr: Some(rcc::PllRDiv::DIV2), // 128MHz / 2 = 64MHz
        });
        config.rcc.sys = rcc::Sysclk::PLL1_R;
        let p = embassy_stm32::init(config);

        // DAC8718 control lines idle high (deselected, no latch)
        let dac_cs = Output::new(p.PB12, Level::High, Speed::VeryHigh);
        let dac_ldac = Output::new(p.PB1, Level::High, Speed::VeryHigh);

        // SPI2 controller for the DAC  (DMA CH2 TX, CH3 RX)
        let mut dac_cfg = spi::Config::default();
        dac_cfg.mode = spi::MODE_2;
        dac_cfg.frequency = Hertz(DAC_SPI_FREQUENCY_HZ);
        let dac_spi = Spi::new(
            p.SPI2,
            p.PB13, p.PB15, p.PB14, // SCK, MOSI, MISO
            p.DMA1_CH2,
            p.DMA1_CH3,
            dac_cfg,
        );

        // SPI1 peripheral for incoming 24-bit packets  (DMA CH5 TX, CH4 RX)
        let mut rx_cfg = spi::ConfigSlave::default();
        rx_cfg.mode = spi::MODE_3;
        let rx_spi = SpiSlave::new_hardware_cs(
            p.SPI1,
            p.PA5, p.PA7, p.PA6, p.PA4, // SCK, MOSI, MISO, NSS
            p.DMA1_CH5,
            p.DMA1_CH4,
            rx_cfg,
        );

        Self {
            dac_spi,
            dac_cs,
            dac_ldac,
            rx_spi,
        }
    }
}
