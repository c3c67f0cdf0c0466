//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and panel operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during panel operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level bus and pin errors
//!
//! A bus failure is not recoverable: once [`Error::BusFailure`] has been
//! returned the panel is marked faulted and every later call reports
//! [`Error::Faulted`] until the device is power-cycled.
//!
//! Running out of queue slots is *not* an error. It is reported as
//! [`PushStatus::Pending`](crate::transfer::PushStatus::Pending) and the
//! caller retries the same push.
//!
//! ## Example
//!
//! ```
//! use axs15231b::{Builder, BuilderError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(400, 640); // Too wide
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;
use crate::rotation::RotateError;

/// Maximum source outputs (columns) supported by the AXS15231B controller
pub const MAX_COLUMNS: u16 = 360;

/// Maximum gate outputs (rows) supported by the AXS15231B controller
pub const MAX_ROWS: u16 = 640;

/// Errors that can occur when driving the panel
///
/// Generic over the interface type to preserve the specific bus error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// The bus rejected a transaction
    ///
    /// Wraps the underlying error from the [`DisplayInterface`] implementation.
    /// The panel is left in the faulted state.
    BusFailure(I::Error),
    /// Pixel count exceeds the rotation scratch buffer
    BufferTooLarge {
        /// Pixels requested (`width * height`)
        required: usize,
        /// Pixels the scratch buffer can hold
        capacity: usize,
    },
    /// Pixel buffer length does not match `width * height`
    BufferTooSmall {
        /// Required length in pixels
        required: usize,
        /// Provided length in pixels
        provided: usize,
    },
    /// Requested rectangle does not fit on the panel
    WindowOutOfBounds {
        /// X coordinate
        x: u16,
        /// Y coordinate
        y: u16,
        /// Width
        w: u16,
        /// Height
        h: u16,
    },
    /// Orientation index outside `0..=3`
    InvalidRotation(u8),
    /// Called before [`Display::initialize`](crate::display::Display::initialize) completed
    NotInitialized,
    /// [`Display::initialize`](crate::display::Display::initialize) was called twice
    AlreadyInitialized,
    /// A queued push for a different rectangle has not drained yet
    SessionBusy,
    /// A previous bus failure left the panel unusable
    Faulted,
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusFailure(e) => write!(f, "Bus failure: {e:?}"),
            Self::BufferTooLarge { required, capacity } => {
                write!(
                    f,
                    "Buffer too large: {required} pixels, scratch capacity {capacity}"
                )
            }
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer size mismatch: required {required} pixels, provided {provided}"
                )
            }
            Self::WindowOutOfBounds { x, y, w, h } => {
                write!(f, "Window out of bounds: x={x}, y={y}, w={w}, h={h}")
            }
            Self::InvalidRotation(r) => write!(f, "Invalid rotation index {r}"),
            Self::NotInitialized => write!(f, "Panel not initialized"),
            Self::AlreadyInitialized => write!(f, "Panel already initialized"),
            Self::SessionBusy => write!(f, "Another push is still in flight"),
            Self::Faulted => write!(f, "Panel faulted after bus failure"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

impl<I: DisplayInterface> From<RotateError> for Error<I> {
    fn from(err: RotateError) -> Self {
        match err {
            RotateError::TooLarge { required, capacity } => {
                Self::BufferTooLarge { required, capacity }
            }
            RotateError::SourceTooShort { required, provided } => {
                Self::BufferTooSmall { required, provided }
            }
        }
    }
}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width in pixels (source outputs)
        width: u16,
        /// Height in pixels (gate outputs)
        height: u16,
    },
    /// Chunk size is zero or larger than the bus transfer limit
    InvalidChunkSize(usize),
    /// Queued strategy with a zero in-flight cap, or a cap above the bus queue depth
    InvalidQueueDepth {
        /// Requested in-flight cap
        max_in_flight: usize,
        /// Bus queue depth
        queue_size: usize,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_COLUMNS}x{MAX_ROWS})"
            ),
            Self::InvalidChunkSize(pixels) => write!(f, "Invalid chunk size: {pixels} pixels"),
            Self::InvalidQueueDepth {
                max_in_flight,
                queue_size,
            } => write!(
                f,
                "Invalid in-flight cap {max_in_flight} for bus queue depth {queue_size}"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
