//! AXS15231B command definitions
//!
//! The controller multiplexes its command channel over the quad-SPI header:
//! every register write is sent with the generic [`QSPI_WRITE_CMD`] opcode
//! and the real command byte shifted into bits 15..8 of the 24-bit address
//! field. Pixel bursts use [`QSPI_WRITE_COLOR`] with [`RAMWR`] (or
//! [`RAMWRC`]) in the same position.
//!
//! ## Transaction Structure
//!
//! 1. Assert CS (chip select, active low)
//! 2. Send the 8-bit opcode on one lane
//! 3. Send the 24-bit address (`command << 8`)
//! 4. Send data bytes (if any), single lane for registers, four lanes for pixels
//! 5. Deassert CS
//!
//! ## Example
//!
//! ```
//! use axs15231b::command::{self, InitCommand};
//!
//! let step = InitCommand::new(command::SLEEP_OUT, &[0x00], 0x80).decode();
//! assert_eq!(step.payload_length, 0);
//! assert!(step.long_delay);
//! assert!(!step.short_delay);
//! ```

// QSPI header opcodes

/// Generic register write opcode (0x02)
///
/// The register number travels in the address field.
pub const QSPI_WRITE_CMD: u8 = 0x02;

/// Quad-lane pixel write opcode (0x32)
pub const QSPI_WRITE_COLOR: u8 = 0x32;

// Display commands

/// Sleep in command (0x10)
///
/// Stops the panel scan and enters low-power mode.
pub const SLEEP_IN: u8 = 0x10;

/// Sleep out command (0x11)
///
/// Wakes the controller. Needs 120ms+ before the next command.
pub const SLEEP_OUT: u8 = 0x11;

/// Fill the frame memory with black (0x22)
pub const ALL_PIXELS_OFF: u8 = 0x22;

/// Display off command (0x28)
pub const DISPLAY_OFF: u8 = 0x28;

/// Display on command (0x29)
pub const DISPLAY_ON: u8 = 0x29;

/// Column address set command (0x2A)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const CASET: u8 = 0x2A;

/// Row address set command (0x2B)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const RASET: u8 = 0x2B;

/// Memory write command (0x2C)
///
/// Starts writing at the window origin.
pub const RAMWR: u8 = 0x2C;

/// Fill the frame memory with a solid RGB888 color (0x2F)
///
/// Requires 3 bytes: [r, g, b]
pub const SOLID_FILL: u8 = 0x2F;

/// Memory access control command (0x36)
///
/// Requires 1 byte built from the `MADCTL_*` bits below.
pub const MADCTL: u8 = 0x36;

/// Memory write continue command (0x3C)
///
/// Continues writing from the last written position.
pub const RAMWRC: u8 = 0x3C;

/// Write display brightness command (0x51)
///
/// Requires 1 byte, 0x00 (off) to 0xFF (full).
pub const WRITE_BRIGHTNESS: u8 = 0x51;

// MADCTL bits

/// Row address order (mirror Y)
pub const MADCTL_MY: u8 = 0x80;
/// Column address order (mirror X)
pub const MADCTL_MX: u8 = 0x40;
/// Row/column exchange (swap X and Y)
pub const MADCTL_MV: u8 = 0x20;
/// Vertical refresh order
pub const MADCTL_ML: u8 = 0x10;
/// BGR subpixel order
pub const MADCTL_BGR: u8 = 0x08;
/// Horizontal refresh order
pub const MADCTL_MH: u8 = 0x04;
/// RGB subpixel order
pub const MADCTL_RGB: u8 = 0x00;

// Pixel header addresses

/// Header address for the first chunk of a burst (`RAMWR << 8`)
pub const RAMWR_ADDRESS: u32 = (RAMWR as u32) << 8;

/// Header address for later chunks of a blocking burst (`RAMWRC << 8`)
pub const RAMWRC_ADDRESS: u32 = (RAMWRC as u32) << 8;

// Init table flags

/// Mask of the payload-length bits in an init table flag byte
pub const INIT_LENGTH_MASK: u8 = 0x3F;
/// Flag bit requesting a short delay after the command
pub const INIT_SHORT_DELAY: u8 = 0x40;
/// Flag bit requesting a long delay after the command
pub const INIT_LONG_DELAY: u8 = 0x80;

/// Short post-command delay in milliseconds
pub const SHORT_DELAY_MS: u32 = 20;
/// Long post-command delay in milliseconds
pub const LONG_DELAY_MS: u32 = 200;

/// One row of the controller init table, as stored
///
/// The flag byte packs the payload length (low six bits) with two delay
/// directives. Use [`InitCommand::decode`] to unpack it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitCommand {
    /// Register to write
    pub command: u8,
    /// Inline payload
    pub data: &'static [u8],
    /// Packed length and delay flags
    pub flags: u8,
}

/// A decoded init table row
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitStep {
    /// Register to write
    pub command: u8,
    /// Payload, already cut to `payload_length`
    pub payload: &'static [u8],
    /// Number of payload bytes to send
    pub payload_length: usize,
    /// Wait [`SHORT_DELAY_MS`] after the command
    pub short_delay: bool,
    /// Wait [`LONG_DELAY_MS`] after the command (runs before the short delay)
    pub long_delay: bool,
}

impl InitCommand {
    /// Create a table row
    pub const fn new(command: u8, data: &'static [u8], flags: u8) -> Self {
        Self {
            command,
            data,
            flags,
        }
    }

    /// Unpack the flag byte
    ///
    /// A length larger than the inline payload is clamped to it.
    pub fn decode(&self) -> InitStep {
        let declared = usize::from(self.flags & INIT_LENGTH_MASK);
        let payload_length = declared.min(self.data.len());
        if payload_length != declared {
            log::warn!(
                "init cmd {:#04x}: declared {} payload bytes, only {} inline",
                self.command,
                declared,
                self.data.len()
            );
        }
        InitStep {
            command: self.command,
            payload: &self.data[..payload_length],
            payload_length,
            short_delay: self.flags & INIT_SHORT_DELAY != 0,
            long_delay: self.flags & INIT_LONG_DELAY != 0,
        }
    }
}

/// Power-up sequence for the AXS15231B in QSPI mode
///
/// Display off, sleep in, sleep out, display on.
pub const AXS15231B_INIT: [InitCommand; 4] = [
    InitCommand::new(DISPLAY_OFF, &[0x00], 0x40),
    InitCommand::new(SLEEP_IN, &[0x00], 0x20),
    InitCommand::new(SLEEP_OUT, &[0x00], 0x80),
    InitCommand::new(DISPLAY_ON, &[0x00], 0x00),
];
