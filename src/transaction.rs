//! Quad-SPI transaction descriptors
//!
//! A [`Transaction`] is the unit handed to the bus: an opcode, a 24-bit
//! address, field widths, lane mode and a borrowed payload. Descriptors are
//! built per command or per pixel chunk and dropped as soon as the bus has
//! taken them.
//!
//! Two header shapes exist for pixel data:
//!
//! - **First** transfer: full 8-bit opcode, 24-bit address, no dummy cycles
//! - **Continuation** transfer: all three fields marked variable and zero
//!   wide, so the controller keeps writing where the previous chunk stopped
//!   without a new header
//!
//! ## Example
//!
//! ```
//! use axs15231b::command::{CASET, QSPI_WRITE_CMD};
//! use axs15231b::transaction::Transaction;
//!
//! let t = Transaction::command(CASET, &[0x00, 0x00, 0x00, 0xB3]);
//! assert_eq!(t.cmd, QSPI_WRITE_CMD);
//! assert_eq!(t.addr, 0x00_2A00);
//! assert_eq!(t.length_bits, 32);
//! ```

use crate::command::{QSPI_WRITE_CMD, QSPI_WRITE_COLOR, RAMWR_ADDRESS};

/// Command byte reserved as a no-op sentinel
const SENTINEL_COMMAND: u8 = 0xFF;
/// Declared length that, together with [`SENTINEL_COMMAND`], selects the sentinel mapping
const SENTINEL_LENGTH: usize = 0x1F;
/// Address sent for the sentinel
const SENTINEL_ADDRESS: u32 = 0xFFFF;
/// Fixed payload of a zero command, in bytes
const ZERO_COMMAND_LENGTH: usize = 4;

/// Number of data lanes used for the payload
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum IoMode {
    /// One lane (MOSI)
    #[default]
    Single,
    /// Four lanes (IO0..IO3)
    Quad,
}

/// Per-transaction header flags
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransactionFlags(u8);

impl TransactionFlags {
    /// No flags
    pub const NONE: Self = Self(0);
    /// Command phase uses all configured lanes
    pub const MULTILINE_CMD: Self = Self(0x01);
    /// Address phase uses all configured lanes
    pub const MULTILINE_ADDR: Self = Self(0x02);
    /// Command width taken from the descriptor instead of the device default
    pub const VARIABLE_CMD: Self = Self(0x04);
    /// Address width taken from the descriptor instead of the device default
    pub const VARIABLE_ADDR: Self = Self(0x08);
    /// Dummy width taken from the descriptor instead of the device default
    pub const VARIABLE_DUMMY: Self = Self(0x10);

    /// Raw bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for TransactionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Data attached to a transaction
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Payload<'a> {
    /// Header only
    #[default]
    None,
    /// Register parameters
    Bytes(&'a [u8]),
    /// Zero-padded four-byte parameter block
    Fixed([u8; 4]),
    /// RGB565 samples
    Pixels(&'a [u16]),
}

impl Payload<'_> {
    /// Payload size in bits
    pub fn bit_len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Bytes(bytes) => bytes.len() * 8,
            Self::Fixed(block) => block.len() * 8,
            Self::Pixels(pixels) => pixels.len() * 16,
        }
    }
}

/// A single bus transaction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transaction<'a> {
    /// Opcode
    pub cmd: u8,
    /// Address field (24 bits used)
    pub addr: u32,
    /// Lane mode for the payload
    pub mode: IoMode,
    /// Header flags
    pub flags: TransactionFlags,
    /// Command field width in bits
    pub command_bits: u8,
    /// Address field width in bits
    pub address_bits: u8,
    /// Dummy cycles between header and payload
    pub dummy_bits: u8,
    /// Data to send
    pub payload: Payload<'a>,
    /// Bits to clock out after the header
    pub length_bits: usize,
}

impl<'a> Transaction<'a> {
    /// Register write
    ///
    /// Maps `cmd` onto the controller's multiplexed header:
    ///
    /// - `0xFF` with a 31-byte declared payload: opcode `0x02`, address
    ///   `0xFFFF`, nothing sent
    /// - `0x00`: opcode `0x00`, address `0`, the first four bytes of `data`
    ///   zero-padded to 32 bits
    /// - anything else: opcode `0x02`, address `cmd << 8`, `data` as payload
    pub fn command(cmd: u8, data: &'a [u8]) -> Self {
        let (opcode, addr, payload, length_bits) =
            if cmd == SENTINEL_COMMAND && data.len() == SENTINEL_LENGTH {
                (QSPI_WRITE_CMD, SENTINEL_ADDRESS, Payload::None, 0)
            } else if cmd == 0x00 {
                let mut block = [0u8; ZERO_COMMAND_LENGTH];
                let end = data.len().min(ZERO_COMMAND_LENGTH);
                block[..end].copy_from_slice(&data[..end]);
                (0x00, 0x0000, Payload::Fixed(block), ZERO_COMMAND_LENGTH * 8)
            } else if data.is_empty() {
                (QSPI_WRITE_CMD, u32::from(cmd) << 8, Payload::None, 0)
            } else {
                let payload = Payload::Bytes(data);
                (
                    QSPI_WRITE_CMD,
                    u32::from(cmd) << 8,
                    payload,
                    payload.bit_len(),
                )
            };

        Self {
            cmd: opcode,
            addr,
            mode: IoMode::Single,
            flags: TransactionFlags::MULTILINE_CMD | TransactionFlags::MULTILINE_ADDR,
            command_bits: 8,
            address_bits: 24,
            dummy_bits: 0,
            payload,
            length_bits,
        }
    }

    /// First chunk of a pixel burst, starting at the window origin
    pub fn pixels_first(pixels: &'a [u16]) -> Self {
        Self::pixels_at(RAMWR_ADDRESS, pixels)
    }

    /// Pixel chunk with a full header at an explicit address
    pub fn pixels_at(addr: u32, pixels: &'a [u16]) -> Self {
        let payload = Payload::Pixels(pixels);
        Self {
            cmd: QSPI_WRITE_COLOR,
            addr,
            mode: IoMode::Quad,
            flags: TransactionFlags::NONE,
            command_bits: 8,
            address_bits: 24,
            dummy_bits: 0,
            payload,
            length_bits: payload.bit_len(),
        }
    }

    /// Follow-up chunk of a pixel burst, reusing the previous header
    pub fn pixels_continue(pixels: &'a [u16]) -> Self {
        let payload = Payload::Pixels(pixels);
        Self {
            cmd: 0,
            addr: 0,
            mode: IoMode::Quad,
            flags: TransactionFlags::VARIABLE_CMD
                | TransactionFlags::VARIABLE_ADDR
                | TransactionFlags::VARIABLE_DUMMY,
            command_bits: 0,
            address_bits: 0,
            dummy_bits: 0,
            payload,
            length_bits: payload.bit_len(),
        }
    }

    /// Whether this descriptor reuses the previous header
    pub fn is_continuation(&self) -> bool {
        self.flags.contains(
            TransactionFlags::VARIABLE_CMD
                | TransactionFlags::VARIABLE_ADDR
                | TransactionFlags::VARIABLE_DUMMY,
        ) && self.command_bits == 0
            && self.address_bits == 0
            && self.dummy_bits == 0
    }
}
