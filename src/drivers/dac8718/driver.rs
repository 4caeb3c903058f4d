//! DAC8718 8‑channel DAC driver
//! ===========================================================
//!
//! Every write is one 24-bit command shifted out MSB first while CS is held
//! low. Channel writes only stage a value; pulsing LDAC moves all staged
//! values to the outputs at once.

use super::protocol as p;
use crate::config::{DAC_CHANNELS, DAC_FULL_SCALE, DAC_VREF_VOLTS, LDAC_PULSE_NS};
use embedded_hal::digital::OutputPin;
use embedded_hal_async::{delay::DelayNs, spi::SpiBus};

/* ------------------------------------------------------------------------- */
/*  Error enum                                                               */
/* ------------------------------------------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum DacError<S, P> {
    Spi(S),
    Pin(P),
    InvalidChannel(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct InvalidChannel(pub u8);

impl<S, P> From<InvalidChannel> for DacError<S, P> {
    fn from(e: InvalidChannel) -> Self {
        Self::InvalidChannel(e.0)
    }
}

/* ------------------------------------------------------------------------- */
/*  Channel                                                                  */
/* ------------------------------------------------------------------------- */
/// Output channel 0..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn register(self) -> u8 {
        p::REG_DAC0 + self.0
    }

    pub fn all() -> impl Iterator<Item = Channel> {
        (0..DAC_CHANNELS as u8).map(Channel)
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        if (channel as usize) < DAC_CHANNELS {
            Ok(Self(channel))
        } else {
            Err(InvalidChannel(channel))
        }
    }
}

/* ------------------------------------------------------------------------- */
/*  Helper fns                                                               */
/* ------------------------------------------------------------------------- */
/// Output voltage for a DAC code, assuming a unipolar range over `DAC_VREF_VOLTS`.
pub fn code_to_volts(code: u16) -> f32 {
    code as f32 / DAC_FULL_SCALE as f32 * DAC_VREF_VOLTS
}

/// Evenly spaced levels, `channel * step`.
pub fn ramp_levels(step: u16) -> [u16; DAC_CHANNELS] {
    core::array::from_fn(|i| (i as u16).wrapping_mul(step))
}

/* ------------------------------------------------------------------------- */
/*  Main driver struct                                                       */
/* ------------------------------------------------------------------------- */
pub struct Dac8718<SPI, CS, LDAC, D> {
    spi: SPI,
    cs: CS,
    ldac: Option<LDAC>,
    delay: D,
}

impl<SPI, CS, LDAC, D> Dac8718<SPI, CS, LDAC, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    LDAC: OutputPin<Error = CS::Error>,
    D: DelayNs,
{
    /// Deselects the chip and parks LDAC high. Without an LDAC line the
    /// outputs follow the DAC's own update mode and
    /// [`synchronize_outputs`](Self::synchronize_outputs) does nothing.
    pub fn new(
        spi: SPI,
        mut cs: CS,
        mut ldac: Option<LDAC>,
        delay: D,
    ) -> Result<Self, DacError<SPI::Error, CS::Error>> {
        cs.set_high().map_err(DacError::Pin)?;
        if let Some(pin) = ldac.as_mut() {
            pin.set_high().map_err(DacError::Pin)?;
        }
        Ok(Self {
            spi,
            cs,
            ldac,
            delay,
        })
    }

    /* ================= low‑level bus ========================= */

    /// Sends one write command. CS is released even when the transfer fails.
    pub async fn write_register(
        &mut self,
        register: u8,
        payload: u16,
    ) -> Result<(), DacError<SPI::Error, CS::Error>> {
        let bytes = p::command_bytes(p::encode_write(register, payload));

        self.cs.set_low().map_err(DacError::Pin)?;
        let sent = match self.spi.write(&bytes).await {
            Ok(()) => self.spi.flush().await,
            Err(e) => Err(e),
        };
        self.cs.set_high().map_err(DacError::Pin)?;

        sent.map_err(DacError::Spi)
    }

    /* ================= public API ============================ */

    /// Stages `value` on `channel`. Channels past 7 are rejected before
    /// anything touches the bus.
    pub async fn write_channel(
        &mut self,
        channel: u8,
        value: u16,
    ) -> Result<(), DacError<SPI::Error, CS::Error>> {
        let channel = Channel::try_from(channel)?;
        self.write_register(channel.register(), value).await
    }

    /// Pulses LDAC low to latch every staged value onto the outputs.
    pub async fn synchronize_outputs(&mut self) -> Result<(), DacError<SPI::Error, CS::Error>> {
        if let Some(ldac) = &mut self.ldac {
            ldac.set_low().map_err(DacError::Pin)?;
            self.delay.delay_ns(LDAC_PULSE_NS).await;
            ldac.set_high().map_err(DacError::Pin)?;
        }
        Ok(())
    }

    pub fn has_ldac(&self) -> bool {
        self.ldac.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DAC_RAMP_STEP;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Cs(bool),
        Ldac(bool),
        Write(Vec<u8>),
        Flush,
        DelayNs(u32),
    }

    type Log = Rc<RefCell<Vec<Op>>>;

    struct FakeSpi {
        log: Log,
        fail: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct SpiFault;

    impl embedded_hal::spi::Error for SpiFault {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    impl embedded_hal::spi::ErrorType for FakeSpi {
        type Error = SpiFault;
    }

    impl SpiBus<u8> for FakeSpi {
        async fn read(&mut self, words: &mut [u8]) -> Result<(), SpiFault> {
            words.fill(0);
            Ok(())
        }

        async fn write(&mut self, words: &[u8]) -> Result<(), SpiFault> {
            if self.fail {
                return Err(SpiFault);
            }
            self.log.borrow_mut().push(Op::Write(words.to_vec()));
            Ok(())
        }

        async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), SpiFault> {
            read.fill(0);
            self.write(write).await
        }

        async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), SpiFault> {
            let out = words.to_vec();
            words.fill(0);
            self.write(&out).await
        }

        async fn flush(&mut self) -> Result<(), SpiFault> {
            self.log.borrow_mut().push(Op::Flush);
            Ok(())
        }
    }

    struct FakePin {
        log: Log,
        op: fn(bool) -> Op,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.op)(false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.op)(true));
            Ok(())
        }
    }

    struct FakeDelay(Log);

    impl DelayNs for FakeDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().push(Op::DelayNs(ns));
        }
    }

    type TestDac = Dac8718<FakeSpi, FakePin, FakePin, FakeDelay>;

    fn dac(with_ldac: bool, fail_spi: bool) -> (TestDac, Log) {
        let log: Log = Rc::default();
        let spi = FakeSpi {
            log: log.clone(),
            fail: fail_spi,
        };
        let cs = FakePin {
            log: log.clone(),
            op: Op::Cs,
        };
        let ldac = with_ldac.then(|| FakePin {
            log: log.clone(),
            op: Op::Ldac,
        });
        let dac = Dac8718::new(spi, cs, ldac, FakeDelay(log.clone())).unwrap();
        log.borrow_mut().clear();
        (dac, log)
    }

    #[test]
    fn new_parks_control_lines_high() {
        let log: Log = Rc::default();
        let spi = FakeSpi {
            log: log.clone(),
            fail: false,
        };
        let cs = FakePin {
            log: log.clone(),
            op: Op::Cs,
        };
        let ldac = FakePin {
            log: log.clone(),
            op: Op::Ldac,
        };
        let _dac = Dac8718::new(spi, cs, Some(ldac), FakeDelay(log.clone())).unwrap();
        assert_eq!(*log.borrow(), vec![Op::Cs(true), Op::Ldac(true)]);
    }

    #[test]
    fn register_write_is_framed_by_chip_select() {
        let (mut dac, log) = dac(false, false);

        block_on(dac.write_register(p::REG_CONFIG, 0xA5C3)).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Op::Cs(false),
                Op::Write(vec![0x00, 0xA5, 0xC3]),
                Op::Flush,
                Op::Cs(true),
            ]
        );
    }

    #[test]
    fn channel_maps_onto_dac_registers() {
        for channel in Channel::all() {
            let (mut dac, log) = dac(false, false);
            block_on(dac.write_channel(channel.index(), 0x1234)).unwrap();

            let expected = p::command_bytes(p::encode_write(p::REG_DAC0 + channel.index(), 0x1234));
            assert!(log.borrow().contains(&Op::Write(expected.to_vec())));
        }
    }

    #[test]
    fn channel_seven_targets_dac7() {
        let (mut dac, log) = dac(false, false);
        block_on(dac.write_channel(7, 0xFFFF)).unwrap();
        assert!(log.borrow().contains(&Op::Write(vec![p::REG_DAC7, 0xFF, 0xFF])));
    }

    #[test]
    fn invalid_channel_never_touches_bus() {
        let (mut dac, log) = dac(true, false);

        for channel in [8u8, 9, 200, u8::MAX] {
            let err = block_on(dac.write_channel(channel, 1)).unwrap_err();
            assert_eq!(err, DacError::InvalidChannel(channel));
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn failed_transfer_still_releases_chip_select() {
        let (mut dac, log) = dac(false, true);

        let err = block_on(dac.write_register(p::REG_DAC1, 7)).unwrap_err();

        assert_eq!(err, DacError::Spi(SpiFault));
        assert_eq!(*log.borrow(), vec![Op::Cs(false), Op::Cs(true)]);
    }

    #[test]
    fn sync_pulses_ldac_low_then_high() {
        let (mut dac, log) = dac(true, false);
        assert!(dac.has_ldac());

        block_on(dac.synchronize_outputs()).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![Op::Ldac(false), Op::DelayNs(LDAC_PULSE_NS), Op::Ldac(true)]
        );
        assert!(LDAC_PULSE_NS >= 20);
    }

    #[test]
    fn sync_without_ldac_is_a_no_op() {
        let (mut dac, log) = dac(false, false);
        assert!(!dac.has_ldac());

        block_on(dac.synchronize_outputs()).unwrap();

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn code_to_volts_spans_reference() {
        assert_eq!(code_to_volts(0), 0.0);
        assert!((code_to_volts(u16::MAX) - DAC_VREF_VOLTS).abs() < 1e-6);
        assert!((code_to_volts(32768) - DAC_VREF_VOLTS / 2.0).abs() < 1e-3);
    }

    #[test]
    fn ramp_spreads_channels() {
        let levels = ramp_levels(DAC_RAMP_STEP);
        assert_eq!(levels[0], 0);
        assert_eq!(levels[1], 4681);
        assert_eq!(levels[7], 32767);
    }

    #[test]
    fn channel_range_is_checked() {
        assert_eq!(Channel::try_from(0).map(Channel::register), Ok(p::REG_DAC0));
        assert_eq!(Channel::try_from(8), Err(InvalidChannel(8)));
        assert_eq!(Channel::all().count(), DAC_CHANNELS);
    }
}
