#![cfg_attr(not(test), no_std)]
//! XN297 Radio Transport Driver
//!
//! This crate provides the low-level transport layer for the Panchip XN297,
//! a 2.4 GHz RF transceiver that keeps the nRF24L01's register-addressable
//! SPI protocol. It covers everything between GPIO edges and chip commands:
//! a software bit-banged serial bus for targets without a free SPI
//! peripheral, and the register protocol built on top of it.
//!
//! # Features
//! - Software (bit-banged) bus over four `embedded-hal` digital pins, with
//!   a configurable settle stall for fast cores
//! - The full transport command surface: register read/write, bare
//!   commands, payload transfer, 5-byte address programming, and a raw
//!   byte-stream escape hatch
//! - Pluggable bus engines: the protocol layer is generic over a small
//!   [`Bus`] capability, so a hardware SPI peripheral can be substituted at
//!   build time through [`SpiAdapter`]
//! - `no_std`, zero allocation, optional `defmt` formatting
//!
//! # Architecture
//! The driver is organized into two layers plus the chip's constant tables:
//!
//! - [`bus`]: byte transport
//!   - [`Bus`]: the four-primitive capability the protocol layer consumes
//!   - [`BitBangBus`]: software engine driving clock/data lines directly
//!   - [`SpiAdapter`]: external engine over `embedded_hal::spi::SpiBus`
//!
//! - [`device`]: chip protocol
//!   - [`Xn297`]: one method per chip operation, each a single
//!     chip-select session
//!
//! - [`commands`] / [`registers`]: the datasheet's command bytes, register
//!   addresses, and flag layouts
//!
//! The layering is strict: the protocol layer never touches line timing,
//! and the bus engines know nothing about command encoding.
//!
//! # Usage
//! Wire the four lines up as plain push-pull outputs (input for MISO),
//! hand them to a bus engine, and hand the engine to [`Xn297`]:
//!
//! ```no_run
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use xn297::{registers, BitBangBus, Xn297};
//!
//! fn bring_up<CLK, MOSI, MISO, CS, E>(
//!     clk: CLK,
//!     mosi: MOSI,
//!     miso: MISO,
//!     cs: CS,
//! ) -> Result<(), E>
//! where
//!     CLK: OutputPin<Error = E>,
//!     MOSI: OutputPin<Error = E>,
//!     MISO: InputPin<Error = E>,
//!     CS: OutputPin<Error = E>,
//! {
//!     let bus = BitBangBus::new(clk, mosi, miso, cs)?;
//!     let mut radio = Xn297::new(bus);
//!
//!     radio.write_register(registers::RF_CH, 0x3C)?;
//!     radio.write_tx_address(&[0xE7, 0xE7, 0xE7, 0xE7, 0xE7])?;
//!     radio.write_payload(&[0x01, 0x02, 0x03, 0x04])?;
//!     Ok(())
//! }
//! ```
//!
//! # Important Notes
//! - Transfers are fully synchronous and must not be preempted by anything
//!   that touches the same lines; the driver takes no locks. Run
//!   transactions from one context, or mask interrupts around them.
//! - The driver never configures pin modes, directions, or pulls; that is
//!   board bring-up's job.
//! - No operation can fail in protocol terms; there is no status handshake
//!   at this layer. Errors surface only from the pin or SPI HAL, and are
//!   `Infallible` on most targets.
//! - Read-after-write verification of chip configuration is deliberately
//!   left to the link layer above.

pub mod bus;
pub mod commands;
pub mod device;
pub mod registers;

pub use bus::{BitBangBus, Bus, NoDelay, SpiAdapter, SpiAdapterError};
pub use device::{Xn297, ADDRESS_LENGTH, MAX_PAYLOAD_LENGTH};
