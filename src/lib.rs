//! AXS15231B QSPI TFT Display Driver
//!
//! A driver for the AXS15231B display controller in quad-SPI mode, as found
//! on 180x640 RGB565 bar panels.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Chunked pixel transfers, blocking or queued with backpressure
//! - 90° rotation through a caller-sized scratch buffer
//! - Hardware fill, sleep and brightness commands
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use axs15231b::transaction::Transaction;
//! use axs15231b::{BusConfig, Config, Display, Interface, PushStatus, QspiBus};
//!
//! # struct MockBus;
//! # impl QspiBus for MockBus {
//! #     type Error = Infallible;
//! #     fn configure(&mut self, _config: &BusConfig) -> Result<(), Self::Error> { Ok(()) }
//! #     fn polling_transmit(&mut self, _t: &Transaction<'_>) -> Result<(), Self::Error> { Ok(()) }
//! #     fn queue_transmit(&mut self, _t: &Transaction<'_>) -> Result<(), Self::Error> { Ok(()) }
//! #     fn poll_completed(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn wait_completed(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let bus = MockBus;
//! # let cs = MockPin;
//! # let rst = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(bus, cs, rst);
//! let mut display = Display::new(interface, Config::axs15231b_180x640());
//! if display.initialize(&mut delay).is_err() {
//!     return;
//! }
//!
//! // 2x2 red square in the top-left corner
//! let pixels = [0xF800u16; 4];
//! match display.push(0, 0, 2, 2, &pixels) {
//!     Ok(PushStatus::Complete) => {}
//!     Ok(PushStatus::Pending { .. }) => {
//!         let _ = display.flush();
//!     }
//!     Err(_) => return,
//! }
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// RGB565 packing and palette
pub mod color;
/// AXS15231B command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Quarter-turn rotation into a scratch buffer
pub mod rotation;
/// Quad-SPI transaction descriptors
pub mod transaction;
/// Chunked pixel transfers
pub mod transfer;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

#[cfg(test)]
mod mock;

pub use color::rgb565;
pub use config::{Builder, BusConfig, Config, Dimensions, Rotation, TransferStrategy};
pub use display::{Display, PanelState, Window};
pub use error::{BuilderError, Error, MAX_COLUMNS, MAX_ROWS};
pub use interface::InterfaceError;
pub use interface::{DisplayInterface, Interface, QspiBus};
pub use rotation::RotationBuffer;
pub use transfer::{PushStatus, TransferSession};

#[cfg(feature = "graphics")]
pub use graphics::GraphicDisplay;
