//! XN297 register protocol layer
//!
//! This module provides the chip-level command surface on top of any
//! [`Bus`] engine. Every operation is one chip-select session: select, one
//! command byte, the operation's data bytes, deselect. The layer knows the
//! chip's command encoding and nothing about bus timing; the bus knows
//! timing and nothing about commands.
//!
//! There is no acknowledgement or status handshake at this level. A wrong
//! chip on the bus or a floating line shows up only as wrong data; callers
//! that need confidence in a configuration write should read the register
//! back and compare, which is link-layer policy rather than transport
//! behavior.
//!
//! # Example
//! ```no_run
//! # fn run<B>(bus: B) -> Result<(), B::Error>
//! # where B: xn297::Bus {
//! use xn297::{registers, Xn297};
//!
//! let mut radio = Xn297::new(bus);
//! radio.write_register(registers::RF_CH, 0x3C)?;
//! assert_eq!(radio.read_register(registers::RF_CH)?, 0x3C);
//! # Ok(())
//! # }
//! ```

use crate::bus::Bus;
use crate::commands;
use crate::registers;

/// Length in bytes of the chip's RX and TX pipe addresses.
///
/// A fixed protocol constant; the XN297's address registers are always
/// programmed with all five bytes.
pub const ADDRESS_LENGTH: usize = 5;

/// Capacity in bytes of the chip's payload FIFOs.
pub const MAX_PAYLOAD_LENGTH: usize = 32;

/// Register protocol interface for the XN297.
///
/// Generic over the bus engine, so the same protocol code runs over the
/// software [`BitBangBus`](crate::BitBangBus) or an external engine such as
/// [`SpiAdapter`](crate::SpiAdapter); the choice is made where the driver
/// is constructed and costs nothing at run time.
pub struct Xn297<B> {
    bus: B,
}

impl<B> Xn297<B> {
    /// Creates a driver over the given bus engine.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Releases the underlying bus engine.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: Bus> Xn297<B> {
    /// Runs `f` inside a single chip-select session.
    ///
    /// The deselect half of the bracket runs even when the body fails, so a
    /// faulted transfer never leaves the chip selected.
    fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut B) -> Result<T, B::Error>,
    ) -> Result<T, B::Error> {
        self.bus.select()?;
        let result = f(&mut self.bus);
        let closed = self.bus.deselect();
        result.and_then(|value| closed.map(|()| value))
    }

    /// Writes a single register.
    ///
    /// The address is masked to 6 bits before the write opcode is OR'd in;
    /// out-of-range addresses are normalized, not rejected.
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), B::Error> {
        let command = (reg & commands::W_REGISTER_MASK) | commands::W_REGISTER;
        self.transaction(|bus| {
            bus.send_byte(command)?;
            bus.send_byte(value)
        })
    }

    /// Reads a single register.
    ///
    /// The address is masked with [`commands::REGISTER_MASK`], the address
    /// field of the chip's read command byte.
    pub fn read_register(&mut self, reg: u8) -> Result<u8, B::Error> {
        let command = reg & commands::REGISTER_MASK;
        self.transaction(|bus| {
            bus.send_byte(command)?;
            bus.receive_byte()
        })
    }

    /// Sends a bare command byte with no data phase.
    ///
    /// For fire-and-forget opcodes such as [`commands::FLUSH_TX`] and
    /// [`commands::FLUSH_RX`].
    pub fn command(&mut self, opcode: u8) -> Result<(), B::Error> {
        self.transaction(|bus| bus.send_byte(opcode))
    }

    /// Reads `buffer.len()` bytes of the payload at the head of the RX FIFO
    /// into `buffer`, in arrival order.
    ///
    /// The caller chooses how much of the payload to clock out; asking for
    /// more than [`MAX_PAYLOAD_LENGTH`] bytes reads past the chip's FIFO
    /// and fills the tail with junk.
    pub fn read_payload(&mut self, buffer: &mut [u8]) -> Result<(), B::Error> {
        self.transaction(|bus| {
            bus.send_byte(commands::R_RX_PAYLOAD)?;
            for slot in buffer.iter_mut() {
                *slot = bus.receive_byte()?;
            }
            Ok(())
        })
    }

    /// Appends `buffer` to the TX FIFO as one payload, first byte first.
    ///
    /// Payloads longer than [`MAX_PAYLOAD_LENGTH`] overrun the chip's FIFO
    /// and the excess is discarded by the chip.
    pub fn write_payload(&mut self, buffer: &[u8]) -> Result<(), B::Error> {
        self.transaction(|bus| {
            bus.send_byte(commands::W_TX_PAYLOAD)?;
            for &byte in buffer {
                bus.send_byte(byte)?;
            }
            Ok(())
        })
    }

    /// Programs the pipe 0 receive address.
    pub fn write_rx_address(&mut self, address: &[u8; ADDRESS_LENGTH]) -> Result<(), B::Error> {
        self.write_address(registers::RX_ADDR_P0, address)
    }

    /// Programs the transmit address.
    pub fn write_tx_address(&mut self, address: &[u8; ADDRESS_LENGTH]) -> Result<(), B::Error> {
        self.write_address(registers::TX_ADDR, address)
    }

    fn write_address(&mut self, reg: u8, address: &[u8; ADDRESS_LENGTH]) -> Result<(), B::Error> {
        self.transaction(|bus| {
            bus.send_byte(commands::W_REGISTER | reg)?;
            for &byte in address {
                bus.send_byte(byte)?;
            }
            Ok(())
        })
    }

    /// Sends a raw byte stream inside one chip-select session, with no
    /// leading opcode.
    ///
    /// Escape hatch for callers that compose the command byte themselves,
    /// e.g. to program a register the named operations do not cover. The
    /// first buffer byte is sent verbatim and must be the command byte.
    pub fn write_registers(&mut self, bytes: &[u8]) -> Result<(), B::Error> {
        self.transaction(|bus| {
            for &byte in bytes {
                bus.send_byte(byte)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::convert::Infallible;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Select,
        Deselect,
        Send(u8),
        Receive,
    }

    /// Records the primitive sequence; receives are served from a queue.
    #[derive(Default)]
    struct TraceBus {
        ops: Vec<Op>,
        rx: VecDeque<u8>,
    }

    impl Bus for TraceBus {
        type Error = Infallible;

        fn select(&mut self) -> Result<(), Infallible> {
            self.ops.push(Op::Select);
            Ok(())
        }

        fn deselect(&mut self) -> Result<(), Infallible> {
            self.ops.push(Op::Deselect);
            Ok(())
        }

        fn send_byte(&mut self, byte: u8) -> Result<(), Infallible> {
            self.ops.push(Op::Send(byte));
            Ok(())
        }

        fn receive_byte(&mut self) -> Result<u8, Infallible> {
            self.ops.push(Op::Receive);
            Ok(self.rx.pop_front().unwrap_or(0))
        }
    }

    /// Decodes command bytes the way the chip's SPI front end does: top
    /// three bits select the operation, low five address a register.
    #[derive(Default)]
    struct EchoChip {
        registers: [u8; 32],
        payload: Vec<u8>,
        selected: bool,
        command: Option<u8>,
        cursor: usize,
    }

    impl Bus for EchoChip {
        type Error = Infallible;

        fn select(&mut self) -> Result<(), Infallible> {
            assert!(!self.selected, "nested chip-select session");
            self.selected = true;
            self.command = None;
            self.cursor = 0;
            Ok(())
        }

        fn deselect(&mut self) -> Result<(), Infallible> {
            assert!(self.selected, "deselect without select");
            self.selected = false;
            Ok(())
        }

        fn send_byte(&mut self, byte: u8) -> Result<(), Infallible> {
            assert!(self.selected, "byte sent outside a session");
            match self.command {
                None => self.command = Some(byte),
                Some(commands::W_TX_PAYLOAD) => self.payload.push(byte),
                Some(command) if command & 0xE0 == commands::W_REGISTER => {
                    self.registers[(command & commands::REGISTER_MASK) as usize] = byte;
                }
                Some(command) => panic!("data byte after command {:#04x}", command),
            }
            Ok(())
        }

        fn receive_byte(&mut self) -> Result<u8, Infallible> {
            assert!(self.selected, "byte read outside a session");
            let value = match self.command {
                Some(commands::R_RX_PAYLOAD) => {
                    let byte = self.payload[self.cursor];
                    self.cursor += 1;
                    byte
                }
                Some(command) if command & 0xE0 == commands::R_REGISTER => {
                    self.registers[(command & commands::REGISTER_MASK) as usize]
                }
                other => panic!("read under command {:?}", other),
            };
            Ok(value)
        }
    }

    #[test]
    fn write_register_masks_address_and_sets_write_opcode() {
        let mut radio = Xn297::new(TraceBus::default());
        radio.write_register(0x05, 0x3C).unwrap();
        assert_eq!(
            radio.release().ops,
            vec![Op::Select, Op::Send(0x25), Op::Send(0x3C), Op::Deselect]
        );
    }

    #[test]
    fn register_addresses_are_masked_to_six_bits() {
        let mut full = Xn297::new(TraceBus::default());
        full.write_register(0x7F, 0xAA).unwrap();
        let mut masked = Xn297::new(TraceBus::default());
        masked.write_register(0x3F, 0xAA).unwrap();
        assert_eq!(full.release().ops, masked.release().ops);
    }

    #[test]
    fn read_register_applies_the_read_mask() {
        let mut radio = Xn297::new(TraceBus {
            rx: VecDeque::from([0x5A]),
            ..TraceBus::default()
        });
        assert_eq!(radio.read_register(0xE7).unwrap(), 0x5A);
        assert_eq!(
            radio.release().ops,
            vec![Op::Select, Op::Send(0x07), Op::Receive, Op::Deselect]
        );
    }

    #[test]
    fn command_sends_a_bare_opcode() {
        let mut radio = Xn297::new(TraceBus::default());
        radio.command(commands::FLUSH_TX).unwrap();
        assert_eq!(
            radio.release().ops,
            vec![Op::Select, Op::Send(commands::FLUSH_TX), Op::Deselect]
        );
    }

    #[test]
    fn addresses_are_sent_opcode_first_then_all_five_bytes() {
        let address = [0x11, 0x22, 0x33, 0x44, 0x55];

        let mut radio = Xn297::new(TraceBus::default());
        radio.write_tx_address(&address).unwrap();
        assert_eq!(
            radio.release().ops,
            vec![
                Op::Select,
                Op::Send(commands::W_REGISTER | registers::TX_ADDR),
                Op::Send(0x11),
                Op::Send(0x22),
                Op::Send(0x33),
                Op::Send(0x44),
                Op::Send(0x55),
                Op::Deselect,
            ]
        );

        let mut radio = Xn297::new(TraceBus::default());
        radio.write_rx_address(&address).unwrap();
        assert_eq!(
            radio.release().ops[1],
            Op::Send(commands::W_REGISTER | registers::RX_ADDR_P0)
        );
    }

    #[test]
    fn read_payload_sends_the_opcode_then_clocks_in_each_byte() {
        let mut radio = Xn297::new(TraceBus {
            rx: VecDeque::from([1, 2, 3]),
            ..TraceBus::default()
        });
        let mut buffer = [0u8; 3];
        radio.read_payload(&mut buffer).unwrap();
        assert_eq!(buffer, [1, 2, 3]);
        assert_eq!(
            radio.release().ops,
            vec![
                Op::Select,
                Op::Send(commands::R_RX_PAYLOAD),
                Op::Receive,
                Op::Receive,
                Op::Receive,
                Op::Deselect,
            ]
        );
    }

    #[test]
    fn write_registers_sends_the_buffer_verbatim() {
        let mut radio = Xn297::new(TraceBus::default());
        radio
            .write_registers(&[commands::W_REGISTER | registers::RF_CH, 0x3C])
            .unwrap();
        assert_eq!(
            radio.release().ops,
            vec![Op::Select, Op::Send(0x25), Op::Send(0x3C), Op::Deselect]
        );
    }

    #[test]
    fn registers_round_trip_through_an_echoing_chip() {
        let mut radio = Xn297::new(EchoChip::default());
        for reg in 0..=63u8 {
            for value in [0x00, 0x5A, 0xA5, 0xFF] {
                radio.write_register(reg, value).unwrap();
                assert_eq!(radio.read_register(reg).unwrap(), value);
            }
        }
    }

    #[test]
    fn payload_round_trip_is_lossless() {
        let mut radio = Xn297::new(EchoChip::default());
        let sent = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x55, 0xAA, 0xFF];
        radio.write_payload(&sent).unwrap();
        let mut received = [0u8; 8];
        radio.read_payload(&mut received).unwrap();
        assert_eq!(received, sent);
    }

    #[test]
    fn every_operation_is_exactly_one_chip_select_session() {
        let operations: [fn(&mut Xn297<TraceBus>); 8] = [
            |radio| radio.write_register(0x00, 0x0F).unwrap(),
            |radio| {
                radio.read_register(0x07).unwrap();
            },
            |radio| radio.command(commands::FLUSH_RX).unwrap(),
            |radio| radio.read_payload(&mut [0u8; 4]).unwrap(),
            |radio| radio.write_payload(&[1, 2, 3, 4]).unwrap(),
            |radio| radio.write_rx_address(&[1, 2, 3, 4, 5]).unwrap(),
            |radio| radio.write_tx_address(&[1, 2, 3, 4, 5]).unwrap(),
            |radio| radio.write_registers(&[0x20, 0x00]).unwrap(),
        ];

        for operation in operations {
            let mut radio = Xn297::new(TraceBus {
                rx: VecDeque::from(vec![0; 8]),
                ..TraceBus::default()
            });
            operation(&mut radio);
            let ops = radio.release().ops;
            let selects = ops.iter().filter(|op| **op == Op::Select).count();
            let deselects = ops.iter().filter(|op| **op == Op::Deselect).count();
            assert_eq!((selects, deselects), (1, 1), "trace: {:?}", ops);
            assert_eq!(ops.first(), Some(&Op::Select));
            assert_eq!(ops.last(), Some(&Op::Deselect));
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    struct WireFault;

    /// Fails every transfer, to prove the session still closes.
    struct FailBus {
        deselected: bool,
    }

    impl Bus for FailBus {
        type Error = WireFault;

        fn select(&mut self) -> Result<(), WireFault> {
            Ok(())
        }

        fn deselect(&mut self) -> Result<(), WireFault> {
            self.deselected = true;
            Ok(())
        }

        fn send_byte(&mut self, _byte: u8) -> Result<(), WireFault> {
            Err(WireFault)
        }

        fn receive_byte(&mut self) -> Result<u8, WireFault> {
            Err(WireFault)
        }
    }

    #[test]
    fn a_faulted_transfer_still_closes_the_session() {
        let mut radio = Xn297::new(FailBus { deselected: false });
        assert_eq!(radio.write_register(0x00, 0x00), Err(WireFault));
        assert!(radio.release().deselected);
    }
}
