//! Register map for the XN297
//!
//! Register addresses and flag views from the datasheet. The transport layer
//! in [`device`](crate::device) never interprets register contents; these
//! definitions exist for the link layer built on top of it, which configures
//! the chip and decodes its status through them.
//!
//! The map matches the nRF24L01 layout, plus the calibration registers that
//! are specific to the XN297 and must be programmed before the radio meets
//! its RF specification.

use bitflags::bitflags;

/// Interrupt masks, CRC configuration, power and RX/TX mode (address: 0x00)
pub const CONFIG: u8 = 0x00;

/// Auto-acknowledgement enable per RX pipe (address: 0x01)
pub const EN_AA: u8 = 0x01;

/// RX pipe enable (address: 0x02)
pub const EN_RXADDR: u8 = 0x02;

/// Address width for all pipes (address: 0x03)
pub const SETUP_AW: u8 = 0x03;

/// Automatic retransmission delay and count (address: 0x04)
pub const SETUP_RETR: u8 = 0x04;

/// RF channel, 1 MHz steps above 2400 MHz (address: 0x05)
pub const RF_CH: u8 = 0x05;

/// Data rate and output power (address: 0x06)
pub const RF_SETUP: u8 = 0x06;

/// Interrupt flags and RX pipe number (address: 0x07)
///
/// See [`Status`] for the flag layout. Interrupt flags are cleared by
/// writing them back as ones.
pub const STATUS: u8 = 0x07;

/// Lost and retransmitted packet counters (address: 0x08)
pub const OBSERVE_TX: u8 = 0x08;

/// Received power detector (address: 0x09)
pub const RPD: u8 = 0x09;

/// RX address, pipe 0 (address: 0x0A), 5 bytes written LSByte first
pub const RX_ADDR_P0: u8 = 0x0A;

/// RX address, pipe 1 (address: 0x0B), 5 bytes written LSByte first
pub const RX_ADDR_P1: u8 = 0x0B;

/// TX address (address: 0x10), 5 bytes written LSByte first
pub const TX_ADDR: u8 = 0x10;

/// Static payload length, pipe 0 (address: 0x11)
pub const RX_PW_P0: u8 = 0x11;

/// FIFO state flags (address: 0x17)
///
/// See [`FifoStatus`] for the flag layout.
pub const FIFO_STATUS: u8 = 0x17;

/// Demodulator calibration (address: 0x19, XN297 specific)
pub const DEMOD_CAL: u8 = 0x19;

/// Dynamic payload length enable per RX pipe (address: 0x1C)
pub const DYNPD: u8 = 0x1C;

/// Feature register (address: 0x1D)
pub const FEATURE: u8 = 0x1D;

/// RF calibration (address: 0x1E, XN297 specific)
pub const RF_CAL: u8 = 0x1E;

/// Baseband calibration (address: 0x1F, XN297 specific)
pub const BB_CAL: u8 = 0x1F;

bitflags! {
    /// Flags of the [`STATUS`] register
    ///
    /// Clocked out by the chip on every command byte; also readable at any
    /// time through [`STATUS`]. Bits 3:1 carry the RX pipe number rather
    /// than independent flags, see [`Status::rx_pipe`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// A payload arrived in the RX FIFO
        const RX_DR = 1 << 6;
        /// A payload was transmitted (and acknowledged, with auto-ack on)
        const TX_DS = 1 << 5;
        /// The retransmission limit was reached
        const MAX_RT = 1 << 4;
        /// The TX FIFO is full
        const TX_FULL = 1;
    }
}

impl Status {
    /// Pipe number of the payload at the head of the RX FIFO.
    ///
    /// `None` when the RX FIFO is empty (the chip reports 7) or the field
    /// holds the reserved value 6.
    pub fn rx_pipe(self) -> Option<u8> {
        match (self.bits() >> 1) & 0b111 {
            pipe @ 0..=5 => Some(pipe),
            _ => None,
        }
    }
}

bitflags! {
    /// Flags of the [`CONFIG`] register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Config: u8 {
        /// Mask the RX_DR interrupt off the IRQ pin
        const MASK_RX_DR = 1 << 6;
        /// Mask the TX_DS interrupt off the IRQ pin
        const MASK_TX_DS = 1 << 5;
        /// Mask the MAX_RT interrupt off the IRQ pin
        const MASK_MAX_RT = 1 << 4;
        /// Enable CRC generation and checking
        const EN_CRC = 1 << 3;
        /// Two-byte CRC when set, one byte when clear
        const CRCO = 1 << 2;
        /// Power up the oscillator and baseband
        const PWR_UP = 1 << 1;
        /// Primary RX when set, primary TX when clear
        const PRIM_RX = 1;
    }
}

bitflags! {
    /// Flags of the [`FIFO_STATUS`] register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FifoStatus: u8 {
        /// The last transmitted payload is being reused
        const TX_REUSE = 1 << 6;
        /// The TX FIFO is full
        const TX_FULL = 1 << 5;
        /// The TX FIFO is empty
        const TX_EMPTY = 1 << 4;
        /// The RX FIFO is full
        const RX_FULL = 1 << 1;
        /// The RX FIFO is empty
        const RX_EMPTY = 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Status({=u8:b})", self.bits());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Config {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Config({=u8:b})", self.bits());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FifoStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "FifoStatus({=u8:b})", self.bits());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_pipe_decodes_the_three_bit_field() {
        assert_eq!(Status::from_bits_retain(0b0000_0000).rx_pipe(), Some(0));
        assert_eq!(Status::from_bits_retain(0b0000_0100).rx_pipe(), Some(2));
        assert_eq!(Status::from_bits_retain(0b0000_1010).rx_pipe(), Some(5));
        // 6 is reserved, 7 means RX FIFO empty
        assert_eq!(Status::from_bits_retain(0b0000_1100).rx_pipe(), None);
        assert_eq!(Status::from_bits_retain(0b0000_1110).rx_pipe(), None);
    }

    #[test]
    fn interrupt_flags_do_not_overlap_the_pipe_field() {
        let flags = Status::RX_DR | Status::TX_DS | Status::MAX_RT | Status::TX_FULL;
        assert_eq!(flags.bits() & 0b0000_1110, 0);
    }
}
