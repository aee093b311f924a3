//! Bus engines for the XN297's SPI-style serial interface
//!
//! The protocol layer in [`device`](crate::device) is written against the
//! [`Bus`] trait, a four-primitive capability: open a chip-select session,
//! close it, shift a byte out, clock a byte in. Which engine provides those
//! primitives is a build-time choice made through the type parameter of
//! [`Xn297`](crate::Xn297):
//!
//! - [`BitBangBus`] drives the bus entirely in software over four GPIO
//!   lines, for targets without a free SPI peripheral. This is the engine
//!   the XN297 is most commonly wired to in small flight controllers.
//! - [`SpiAdapter`] maps the same primitives onto any
//!   [`embedded_hal::spi::SpiBus`] implementation plus a chip-select pin,
//!   for targets that do have hardware SPI.
//!
//! # Timing
//! The bit-bang engine pulses the clock once per bit (low, high, low), with
//! data-out driven before the rising edge and data-in sampled after it, as
//! in SPI mode 0. Correctness rests on that sequencing alone, not on a
//! wall-clock bit period: a settle stall after each edge-of-interest keeps
//! the clock inside the chip's rated rate when the surrounding code runs
//! unusually fast, and is a no-op ([`NoDelay`]) on targets slow enough not
//! to need it. The transfer routines never suspend; an interrupt landing
//! mid-byte stretches the clock but cannot reorder the edges.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

/// Byte-level bus capability the protocol layer is written against.
///
/// One chip-select session brackets exactly one command transaction; the
/// protocol layer opens and closes it around every operation. Transfers are
/// most significant bit first in both directions.
pub trait Bus {
    /// Error raised by the underlying line drivers.
    type Error;

    /// Drive chip-select active, opening a command session.
    fn select(&mut self) -> Result<(), Self::Error>;

    /// Drive chip-select inactive, closing the session.
    fn deselect(&mut self) -> Result<(), Self::Error>;

    /// Shift one byte out, most significant bit first.
    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Clock one byte in, most significant bit first, holding data-out low
    /// for the whole transfer.
    ///
    /// The XN297 ignores data-out while it is answering, so this engine set
    /// transmits zero bits rather than supporting full duplex.
    fn receive_byte(&mut self) -> Result<u8, Self::Error>;
}

/// Settle stall that compiles to nothing.
///
/// For targets slow enough that the natural instruction timing already
/// satisfies the chip's maximum clock rate.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Software serial engine over four GPIO lines.
///
/// All four pins must share one error type; in practice pin types from a
/// single HAL always do, and most are infallible.
///
/// Between transfers the engine parks the clock and data-out lines low.
/// That idle state is part of the contract with the chip: glitches on these
/// lines between operations cost extra chip-select transitions on some
/// XN297 die revisions, so the lines are only ever touched inside a
/// transfer.
pub struct BitBangBus<CLK, MOSI, MISO, CS, D = NoDelay> {
    clk: CLK,
    mosi: MOSI,
    miso: MISO,
    cs: CS,
    delay: D,
    settle_ns: u32,
}

impl<CLK, MOSI, MISO, CS, E> BitBangBus<CLK, MOSI, MISO, CS>
where
    CLK: OutputPin<Error = E>,
    MOSI: OutputPin<Error = E>,
    MISO: InputPin<Error = E>,
    CS: OutputPin<Error = E>,
{
    /// Creates an engine with no settle stall.
    ///
    /// Drives chip-select inactive and parks clock and data-out low. The
    /// pins must already be configured as push-pull outputs (input for
    /// `miso`); this driver never touches pin modes.
    pub fn new(clk: CLK, mosi: MOSI, miso: MISO, cs: CS) -> Result<Self, E> {
        Self::with_delay(clk, mosi, miso, cs, NoDelay, 0)
    }
}

impl<CLK, MOSI, MISO, CS, D, E> BitBangBus<CLK, MOSI, MISO, CS, D>
where
    CLK: OutputPin<Error = E>,
    MOSI: OutputPin<Error = E>,
    MISO: InputPin<Error = E>,
    CS: OutputPin<Error = E>,
    D: DelayNs,
{
    /// Creates an engine that stalls for `settle_ns` after each clock edge
    /// of interest.
    ///
    /// Needed when the target executes the bit loop faster than the chip's
    /// rated clock, e.g. under aggressive optimization on a fast core.
    pub fn with_delay(
        mut clk: CLK,
        mut mosi: MOSI,
        miso: MISO,
        mut cs: CS,
        delay: D,
        settle_ns: u32,
    ) -> Result<Self, E> {
        cs.set_high()?;
        clk.set_low()?;
        mosi.set_low()?;
        Ok(Self {
            clk,
            mosi,
            miso,
            cs,
            delay,
            settle_ns,
        })
    }

    /// Releases the pins and the delay provider.
    pub fn release(self) -> (CLK, MOSI, MISO, CS, D) {
        (self.clk, self.mosi, self.miso, self.cs, self.delay)
    }

    fn settle(&mut self) {
        self.delay.delay_ns(self.settle_ns);
    }
}

impl<CLK, MOSI, MISO, CS, D, E> Bus for BitBangBus<CLK, MOSI, MISO, CS, D>
where
    CLK: OutputPin<Error = E>,
    MOSI: OutputPin<Error = E>,
    MISO: InputPin<Error = E>,
    CS: OutputPin<Error = E>,
    D: DelayNs,
{
    type Error = E;

    fn select(&mut self) -> Result<(), E> {
        self.cs.set_low()
    }

    fn deselect(&mut self) -> Result<(), E> {
        self.cs.set_high()
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), E> {
        for bit in (0..8).rev() {
            self.clk.set_low()?;
            if (byte >> bit) & 1 != 0 {
                self.mosi.set_high()?;
            } else {
                self.mosi.set_low()?;
            }
            self.clk.set_high()?;
            self.settle();
        }
        // idle contract: clock and data-out parked low between bytes
        self.clk.set_low()?;
        self.mosi.set_low()
    }

    fn receive_byte(&mut self) -> Result<u8, E> {
        let mut byte = 0;
        self.mosi.set_low()?;
        for _ in 0..8 {
            byte <<= 1;
            self.clk.set_high()?;
            self.settle();
            if self.miso.is_high()? {
                byte |= 1;
            }
            self.clk.set_low()?;
            self.settle();
        }
        Ok(byte)
    }
}

/// Fault source of a [`SpiAdapter`] operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiAdapterError<SPI, CS> {
    /// The SPI bus reported a transfer fault.
    Spi(SPI),
    /// The chip-select pin could not be driven.
    ChipSelect(CS),
}

/// External bus engine: a hardware (or otherwise foreign) SPI bus plus a
/// chip-select pin, presented through the [`Bus`] primitives.
///
/// Receiving clocks out explicit zero bytes to match the bit-bang engine's
/// send-zero-and-receive behavior, rather than leaving the idle word to the
/// SPI implementation.
pub struct SpiAdapter<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> SpiAdapter<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Wraps an SPI bus and chip-select pin, driving chip-select inactive.
    pub fn new(spi: SPI, mut cs: CS) -> Result<Self, SpiAdapterError<SPI::Error, CS::Error>> {
        cs.set_high().map_err(SpiAdapterError::ChipSelect)?;
        Ok(Self { spi, cs })
    }

    /// Releases the SPI bus and the chip-select pin.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Bus for SpiAdapter<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = SpiAdapterError<SPI::Error, CS::Error>;

    fn select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(SpiAdapterError::ChipSelect)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        // the last byte must be on the wire before the session closes
        self.spi.flush().map_err(SpiAdapterError::Spi)?;
        self.cs.set_high().map_err(SpiAdapterError::ChipSelect)
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.spi.write(&[byte]).map_err(SpiAdapterError::Spi)
    }

    fn receive_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = [0u8];
        self.spi
            .transfer(&mut byte, &[0x00])
            .map_err(SpiAdapterError::Spi)?;
        Ok(byte[0])
    }
}
