//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait the panel driver is
//! written against, the [`QspiBus`] trait describing the quad-SPI master the
//! board supplies, and the [`Interface`] struct gluing a bus to the chip
//! select and reset pins.
//!
//! ## Hardware Requirements
//!
//! The AXS15231B in QSPI mode requires:
//! - A quad-SPI master (SCK + IO0..IO3) supporting per-transaction command,
//!   address and dummy widths, a blocking transmit and a transaction queue
//! - 2 GPIO pins:
//!   - **CS**: Chip select (output, active low, driven in software so it can
//!     stay asserted across several transactions)
//!   - **RST**: Reset (output, active low)
//!
//! ## Example
//!
//! ```rust,no_run
//! use axs15231b::interface::{DisplayInterface, Interface, QspiBus};
//! use axs15231b::transaction::Transaction;
//! use axs15231b::BusConfig;
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::OutputPin;
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
//! # let mut delay = MockDelay;
//! // Create interface with the bus and GPIO pins
//! let mut interface = Interface::new(MockBus, MockPin, MockPin);
//!
//! // Hardware reset
//! interface.reset(&mut delay);
//!
//! // Send a register write (display on)
//! let _ = interface.select();
//! let _ = interface.transmit(&Transaction::command(0x29, &[]));
//! let _ = interface.deselect();
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::BusConfig;
use crate::transaction::Transaction;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Reset line held high before the pulse, in milliseconds
pub const RESET_PRE_MS: u32 = 130;
/// Reset pulse width (line low), in milliseconds
pub const RESET_PULSE_MS: u32 = 130;
/// Settle time after releasing reset, in milliseconds
pub const RESET_SETTLE_MS: u32 = 300;

/// Quad-SPI master supplied by the board support code
///
/// Mirrors the three transmit primitives of a DMA-capable SPI master:
/// blocking (polling) transmit, queued transmit, and completion retrieval.
///
/// ## Queued transactions
///
/// [`queue_transmit`](Self::queue_transmit) receives a borrowed descriptor.
/// Implementations must copy the header and payload into their own DMA
/// descriptors before returning; the driver reuses the descriptor and may
/// hand the same pixel memory out again on the next call.
pub trait QspiBus {
    /// Error type for bus operations
    type Error: Debug;

    /// Apply bus and device settings
    fn configure(&mut self, config: &BusConfig) -> InterfaceResult<(), Self::Error>;

    /// Send a transaction and wait for it to finish
    fn polling_transmit(&mut self, transaction: &Transaction<'_>)
    -> InterfaceResult<(), Self::Error>;

    /// Queue a transaction without waiting
    fn queue_transmit(&mut self, transaction: &Transaction<'_>) -> InterfaceResult<(), Self::Error>;

    /// Retrieve one finished queued transaction, if any
    ///
    /// Returns `Ok(true)` when a completion was consumed.
    fn poll_completed(&mut self) -> InterfaceResult<bool, Self::Error>;

    /// Block until one queued transaction finishes and consume its result
    fn wait_completed(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Free memory available to the transfer path, in bytes
    ///
    /// Used as a backpressure signal by the queued strategy.
    fn free_memory(&mut self) -> usize {
        usize::MAX
    }
}

/// Trait for hardware interface to the AXS15231B controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// bus + GPIO combination.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. Implement this
/// trait directly when chip select is handled by hardware or the bus needs
/// board-specific sequencing.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Apply bus and device settings
    fn configure(&mut self, config: &BusConfig) -> InterfaceResult<(), Self::Error>;

    /// Perform hardware reset
    ///
    /// The implementation must:
    /// 1. Set RST high, wait [`RESET_PRE_MS`]
    /// 2. Set RST low, wait [`RESET_PULSE_MS`]
    /// 3. Set RST high, wait [`RESET_SETTLE_MS`]
    fn reset<D: DelayNs>(&mut self, delay: &mut D);

    /// Assert chip select
    fn select(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Release chip select
    fn deselect(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Send a transaction and wait for it
    fn transmit(&mut self, transaction: &Transaction<'_>) -> InterfaceResult<(), Self::Error>;

    /// Queue a transaction without waiting
    fn queue(&mut self, transaction: &Transaction<'_>) -> InterfaceResult<(), Self::Error>;

    /// Retrieve one finished queued transaction, if any
    fn poll_completed(&mut self) -> InterfaceResult<bool, Self::Error>;

    /// Block until one queued transaction finishes
    fn wait_completed(&mut self) -> InterfaceResult<(), Self::Error>;

    /// Free memory available to the transfer path, in bytes
    fn free_memory(&mut self) -> usize {
        usize::MAX
    }
}

/// Errors that can occur at the interface level
///
/// Generic over bus and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<BusErr, PinErr> {
    /// Bus transaction error
    Bus(BusErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<BusErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<BusErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "Bus error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<BusErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<BusErr, PinErr> {}

/// Hardware interface implementation for the AXS15231B
///
/// Implements [`DisplayInterface`] from a [`QspiBus`] and embedded-hal v1.0
/// output pins.
///
/// ## Type Parameters
///
/// * `BUS` - Quad-SPI master implementing [`QspiBus`]
/// * `CS` - Chip select pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
pub struct Interface<BUS, CS, RST> {
    /// Quad-SPI master
    bus: BUS,
    /// Chip select pin (active low)
    cs: CS,
    /// Reset pin (active low)
    rst: RST,
}

impl<BUS, CS, RST> Interface<BUS, CS, RST>
where
    BUS: QspiBus,
    CS: OutputPin,
    RST: OutputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `bus` - Quad-SPI master (must implement [`QspiBus`])
    /// * `cs` - Chip select pin (output, active low)
    /// * `rst` - Reset pin (output, active low)
    pub fn new(bus: BUS, cs: CS, rst: RST) -> Self {
        Self { bus, cs, rst }
    }

    /// Access the underlying bus
    pub fn bus(&self) -> &BUS {
        &self.bus
    }

    /// Release the bus and pins
    pub fn release(self) -> (BUS, CS, RST) {
        (self.bus, self.cs, self.rst)
    }
}

impl<BUS, CS, RST, PinErr> DisplayInterface for Interface<BUS, CS, RST>
where
    BUS: QspiBus,
    CS: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<BUS::Error, PinErr>;

    fn configure(&mut self, config: &BusConfig) -> InterfaceResult<(), Self::Error> {
        self.bus.configure(config).map_err(InterfaceError::Bus)
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        // Reset sequence: HIGH -> wait 130ms -> LOW -> wait 130ms -> HIGH -> wait 300ms
        let _ = self.rst.set_high();
        delay.delay_ms(RESET_PRE_MS);
        let _ = self.rst.set_low();
        delay.delay_ms(RESET_PULSE_MS);
        let _ = self.rst.set_high();
        delay.delay_ms(RESET_SETTLE_MS);
    }

    fn select(&mut self) -> InterfaceResult<(), Self::Error> {
        self.cs.set_low().map_err(InterfaceError::Pin)
    }

    fn deselect(&mut self) -> InterfaceResult<(), Self::Error> {
        self.cs.set_high().map_err(InterfaceError::Pin)
    }

    fn transmit(&mut self, transaction: &Transaction<'_>) -> InterfaceResult<(), Self::Error> {
        self.bus
            .polling_transmit(transaction)
            .map_err(InterfaceError::Bus)
    }

    fn queue(&mut self, transaction: &Transaction<'_>) -> InterfaceResult<(), Self::Error> {
        self.bus
            .queue_transmit(transaction)
            .map_err(InterfaceError::Bus)
    }

    fn poll_completed(&mut self) -> InterfaceResult<bool, Self::Error> {
        self.bus.poll_completed().map_err(InterfaceError::Bus)
    }

    fn wait_completed(&mut self) -> InterfaceResult<(), Self::Error> {
        self.bus.wait_completed().map_err(InterfaceError::Bus)
    }

    fn free_memory(&mut self) -> usize {
        self.bus.free_memory()
    }
}
