//! RGB565 color helpers
//!
//! The panel takes 16-bit RGB565 samples: five bits of red, six of green and
//! five of blue, packed most significant first.
//!
//! | Bits  | Channel | Range   |
//! |-------|---------|---------|
//! | 15-11 | Red     | 0..=31  |
//! | 10-5  | Green   | 0..=63  |
//! | 4-0   | Blue    | 0..=31  |
//!
//! ## Example
//!
//! ```
//! use axs15231b::color::{palette, rgb565};
//!
//! assert_eq!(rgb565(31, 63, 31), palette::WHITE);
//! assert_eq!(rgb565(31, 0, 0), 0xF800);
//! ```

/// Pack 5/6/5-bit channels into an RGB565 sample
///
/// Channels are masked to their width, so out-of-range values wrap
/// rather than bleed into the neighbouring channel.
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0x1F) << 11) | ((g as u16 & 0x3F) << 5) | (b as u16 & 0x1F)
}

/// Colors used by the boot splash and the clear-screen path
pub mod palette {
    use super::rgb565;

    /// Black
    pub const BLACK: u16 = rgb565(0, 0, 0);
    /// White
    pub const WHITE: u16 = rgb565(31, 63, 31);
    /// Red
    pub const RED: u16 = rgb565(31, 0, 0);
    /// Yellow
    pub const YELLOW: u16 = rgb565(31, 63, 0);
    /// Green (slightly dimmed)
    pub const GREEN: u16 = rgb565(0, 55, 0);
    /// Cyan
    pub const CYAN: u16 = rgb565(0, 63, 31);
}

/// Convert an `embedded-graphics` color into a raw panel sample
#[cfg(feature = "graphics")]
pub fn from_rgb565(color: embedded_graphics_core::pixelcolor::Rgb565) -> u16 {
    use embedded_graphics_core::prelude::IntoStorage;
    color.into_storage()
}
