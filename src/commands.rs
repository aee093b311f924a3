//! SPI command set for the XN297
//!
//! Command bytes from the datasheet command table. A command byte is the
//! first byte of every chip-select session; register reads and writes embed
//! the register address in the low bits of the command byte itself.
//!
//! These values are protocol constants and must match the datasheet exactly.
//! The XN297 keeps the nRF24L01 command encoding, so the familiar mnemonics
//! apply unchanged.

/// Read a register: OR with the address, masked by [`REGISTER_MASK`].
///
/// The opcode is `0x00`, so the masked address is the command byte.
pub const R_REGISTER: u8 = 0x00;

/// Write a register: OR with the address, masked by [`W_REGISTER_MASK`].
pub const W_REGISTER: u8 = 0x20;

/// Address bits of a read command byte.
pub const REGISTER_MASK: u8 = 0x1F;

/// Address bits kept when forming a write command byte.
pub const W_REGISTER_MASK: u8 = 0x3F;

/// Unlock the extended feature set (follow with the magic byte `0x73`).
pub const ACTIVATE: u8 = 0x50;

/// Read the length of the payload at the head of the RX FIFO.
pub const R_RX_PL_WID: u8 = 0x60;

/// Read the payload at the head of the RX FIFO.
pub const R_RX_PAYLOAD: u8 = 0x61;

/// Append a payload to the TX FIFO.
pub const W_TX_PAYLOAD: u8 = 0xA0;

/// Append an acknowledgement payload for an RX pipe (OR in the pipe number).
pub const W_ACK_PAYLOAD: u8 = 0xA8;

/// Drop everything in the TX FIFO.
pub const FLUSH_TX: u8 = 0xE1;

/// Drop everything in the RX FIFO.
pub const FLUSH_RX: u8 = 0xE2;

/// Keep retransmitting the last payload while CE is held high.
pub const REUSE_TX_PL: u8 = 0xE3;

/// No operation; clocks out the STATUS register.
pub const NOP: u8 = 0xFF;
