//! Panel configuration types and builder

use embedded_hal::spi::{MODE_0, Mode};

use crate::command::{MADCTL_MV, MADCTL_MX, MADCTL_MY, MADCTL_RGB};
pub use crate::error::{BuilderError, MAX_COLUMNS, MAX_ROWS};

/// Pixels per chunk used by the stock firmware (28 800 bytes of RGB565)
pub const DEFAULT_CHUNK_PIXELS: usize = 14_400;

/// Largest chunk a single DMA transfer can carry (32 × 1023 bytes of RGB565)
pub const MAX_CHUNK_PIXELS: usize = 32 * 1023 / 2;

/// Default bus clock
pub const DEFAULT_CLOCK_HZ: u32 = 32_000_000;

/// Default depth of the bus transaction queue
pub const DEFAULT_QUEUE_SIZE: usize = 17;

/// Default cap on queued, unreaped transactions
pub const DEFAULT_MAX_IN_FLIGHT: usize = 3;

/// Default free-memory floor below which nothing new is queued, in bytes
pub const DEFAULT_MEMORY_FLOOR: usize = 70_000;

/// Panel dimensions in native (portrait) orientation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Number of columns (source outputs)
    pub width: u16,
    /// Number of rows (gate outputs)
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero,
    /// `width > MAX_COLUMNS` or `height > MAX_ROWS`.
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_COLUMNS || height == 0 || height > MAX_ROWS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels on the panel
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Panel orientation
///
/// Each variant maps to a fixed MADCTL value, see [`Rotation::madctl`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Rotation {
    /// Portrait
    #[default]
    Rotate0,
    /// Landscape (portrait + 90 degrees)
    Rotate90,
    /// Inverted portrait
    Rotate180,
    /// Inverted landscape
    Rotate270,
}

impl Rotation {
    /// MADCTL register value for this orientation
    ///
    /// ```
    /// use axs15231b::Rotation;
    ///
    /// assert_eq!(Rotation::Rotate0.madctl(), 0x00);
    /// assert_eq!(Rotation::Rotate90.madctl(), 0x60);
    /// ```
    pub const fn madctl(self) -> u8 {
        match self {
            Self::Rotate0 => MADCTL_RGB,
            Self::Rotate90 => MADCTL_MX | MADCTL_MV | MADCTL_RGB,
            Self::Rotate180 => MADCTL_MX | MADCTL_MY | MADCTL_RGB,
            Self::Rotate270 => MADCTL_MV | MADCTL_MY | MADCTL_RGB,
        }
    }

    /// Whether rows and columns are exchanged
    pub const fn is_landscape(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }
}

impl TryFrom<u8> for Rotation {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::Rotate0),
            1 => Ok(Self::Rotate90),
            2 => Ok(Self::Rotate180),
            3 => Ok(Self::Rotate270),
            other => Err(other),
        }
    }
}

/// How pixel chunks are handed to the bus
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TransferStrategy {
    /// Submit each chunk and wait for it
    ///
    /// Every push completes before returning.
    #[default]
    Blocking,
    /// Queue chunks without waiting
    ///
    /// A push may return [`PushStatus::Pending`](crate::transfer::PushStatus::Pending)
    /// when the cap or the memory floor is hit; repeat the same push to continue.
    Queued {
        /// Maximum queued, unreaped transactions
        max_in_flight: usize,
        /// Do not queue while free memory is at or below this many bytes
        memory_floor: usize,
    },
}

impl TransferStrategy {
    /// Queued strategy with the stock limits
    pub const fn queued() -> Self {
        Self::Queued {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            memory_floor: DEFAULT_MEMORY_FLOOR,
        }
    }
}

/// Bus and device settings applied during initialization
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BusConfig {
    /// Clock frequency in Hz
    pub clock_hz: u32,
    /// SPI mode (clock polarity and phase)
    pub mode: Mode,
    /// Width of the command field in bits
    pub command_bits: u8,
    /// Width of the address field in bits
    pub address_bits: u8,
    /// Half-duplex operation (no MISO phase)
    pub half_duplex: bool,
    /// Use four data lanes
    pub quad: bool,
    /// Depth of the transaction queue
    pub queue_size: usize,
    /// Largest single transfer in bytes
    pub max_transfer_bytes: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            mode: MODE_0,
            command_bits: 8,
            address_bits: 24,
            half_duplex: true,
            quad: true,
            queue_size: DEFAULT_QUEUE_SIZE,
            max_transfer_bytes: max_transfer_bytes(DEFAULT_CHUNK_PIXELS),
        }
    }
}

/// Transfer size the bus is configured for, given a chunk size
const fn max_transfer_bytes(chunk_pixels: usize) -> usize {
    chunk_pixels * 16 + 8
}

/// Panel configuration
///
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Panel dimensions (native orientation)
    pub dimensions: Dimensions,
    /// Orientation applied after init
    pub rotation: Rotation,
    /// Largest number of pixels per bus transaction
    pub chunk_pixels: usize,
    /// Bus settings
    pub bus: BusConfig,
    /// Chunk submission policy
    pub strategy: TransferStrategy,
}

impl Config {
    /// Board default: 180x640 panel, stock chunk size, blocking transfers
    pub fn axs15231b_180x640() -> Self {
        Self {
            dimensions: Dimensions {
                width: 180,
                height: 640,
            },
            rotation: Rotation::Rotate0,
            chunk_pixels: DEFAULT_CHUNK_PIXELS,
            bus: BusConfig::default(),
            strategy: TransferStrategy::Blocking,
        }
    }

    /// Get the rotated dimensions based on rotation setting
    pub fn rotated_dimensions(&self) -> Dimensions {
        if self.rotation.is_landscape() {
            Dimensions {
                width: self.dimensions.height,
                height: self.dimensions.width,
            }
        } else {
            self.dimensions
        }
    }
}

/// Builder for constructing panel configuration
///
/// # Example
///
/// ```rust,no_run
/// use axs15231b::{Builder, Dimensions, TransferStrategy};
///
/// let dims = match Dimensions::new(180, 640) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .dimensions(dims)
///     .strategy(TransferStrategy::queued())
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    /// Panel dimensions (required)
    dimensions: Option<Dimensions>,
    /// Orientation
    rotation: Rotation,
    /// Pixels per bus transaction
    chunk_pixels: usize,
    /// Bus settings
    bus: BusConfig,
    /// Chunk submission policy
    strategy: TransferStrategy,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            rotation: Rotation::Rotate0,
            chunk_pixels: DEFAULT_CHUNK_PIXELS,
            bus: BusConfig::default(),
            strategy: TransferStrategy::Blocking,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set orientation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the largest number of pixels per bus transaction
    pub fn chunk_pixels(mut self, pixels: usize) -> Self {
        self.chunk_pixels = pixels;
        self
    }

    /// Set the bus clock
    pub fn clock_hz(mut self, hz: u32) -> Self {
        self.bus.clock_hz = hz;
        self
    }

    /// Set the SPI mode
    pub fn spi_mode(mut self, mode: Mode) -> Self {
        self.bus.mode = mode;
        self
    }

    /// Set the bus queue depth
    pub fn queue_size(mut self, size: usize) -> Self {
        self.bus.queue_size = size;
        self
    }

    /// Set the chunk submission policy
    pub fn strategy(mut self, strategy: TransferStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::MissingDimensions` if dimensions were not set
    /// - `BuilderError::InvalidChunkSize` if the chunk is empty or above [`MAX_CHUNK_PIXELS`]
    /// - `BuilderError::InvalidQueueDepth` if a queued cap is zero or deeper than the bus queue
    pub fn build(self) -> Result<Config, BuilderError> {
        let dimensions = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        if self.chunk_pixels == 0 || self.chunk_pixels > MAX_CHUNK_PIXELS {
            return Err(BuilderError::InvalidChunkSize(self.chunk_pixels));
        }
        if let TransferStrategy::Queued { max_in_flight, .. } = self.strategy {
            if max_in_flight == 0 || max_in_flight > self.bus.queue_size {
                return Err(BuilderError::InvalidQueueDepth {
                    max_in_flight,
                    queue_size: self.bus.queue_size,
                });
            }
        }

        let mut bus = self.bus;
        bus.max_transfer_bytes = max_transfer_bytes(self.chunk_pixels);

        Ok(Config {
            dimensions,
            rotation: self.rotation,
            chunk_pixels: self.chunk_pixels,
            bus,
            strategy: self.strategy,
        })
    }
}
