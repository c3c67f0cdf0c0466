//! Chunked pixel transfers
//!
//! Pixel data goes to the panel in chunks no larger than the bus buffer.
//! [`TransferSession`] owns every piece of per-transfer state (the burst in
//! progress, the in-flight counter) so a second burst cannot be interleaved
//! with the first: the session is borrowed mutably for each call.
//!
//! ## Strategies
//!
//! - [`TransferStrategy::Blocking`]: each chunk is sent and waited for.
//!   The first chunk carries `RAMWR`, later chunks `RAMWRC`, and chip
//!   select is cycled between chunks.
//! - [`TransferStrategy::Queued`]: chunks are queued without waiting,
//!   limited by an in-flight cap and a free-memory floor. When a limit is
//!   hit the push returns [`PushStatus::Pending`] with chip select still
//!   asserted; calling the same push again reaps finished chunks and queues
//!   more. The call that sees the last chunk reaped returns
//!   [`PushStatus::Complete`].
//!
//! A third shape, [`TransferSession::stream`], sends a synchronous burst
//! with one full header followed by header-less continuation chunks. It is
//! used for rotated sprites and single-pixel writes.

use crate::command::{CASET, RASET, RAMWR_ADDRESS, RAMWRC_ADDRESS};
use crate::config::TransferStrategy;
use crate::display::Window;
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::transaction::Transaction;

type TransferResult<T, I> = core::result::Result<T, Error<I>>;

/// Outcome of a push
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PushStatus {
    /// Every pixel has been transferred and chip select released
    Complete,
    /// Part of the burst is still outstanding; repeat the same push
    Pending {
        /// Pixels not yet handed to the bus
        remaining: usize,
        /// Chunks queued but not yet reaped
        in_flight: usize,
    },
}

impl PushStatus {
    /// Whether the push has finished
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Queued burst in progress
#[derive(Clone, Copy, Debug, PartialEq)]
struct Burst {
    /// Window armed for this burst
    window: Window,
    /// Pixels in the burst
    total: usize,
    /// Pixels already queued
    queued: usize,
}

/// Transfer state for one panel
#[derive(Debug)]
pub struct TransferSession {
    /// Chunk submission policy
    strategy: TransferStrategy,
    /// Largest chunk in pixels
    chunk_pixels: usize,
    /// Queued transactions not yet reaped
    in_flight: usize,
    /// Queued burst awaiting more calls, if any
    burst: Option<Burst>,
}

/// Send a register write with its own chip-select cycle
pub(crate) fn send_command<I: DisplayInterface>(
    interface: &mut I,
    command: u8,
    data: &[u8],
) -> TransferResult<(), I> {
    interface.select().map_err(Error::BusFailure)?;
    interface
        .transmit(&Transaction::command(command, data))
        .map_err(Error::BusFailure)?;
    interface.deselect().map_err(Error::BusFailure)
}

/// Arm the controller's addressing window
pub(crate) fn arm_window<I: DisplayInterface>(
    interface: &mut I,
    window: &Window,
) -> TransferResult<(), I> {
    send_command(interface, CASET, &window.column_bytes())?;
    send_command(interface, RASET, &window.row_bytes())
}

impl TransferSession {
    /// Create an idle session
    ///
    /// A zero `chunk_pixels` is treated as one.
    pub fn new(strategy: TransferStrategy, chunk_pixels: usize) -> Self {
        Self {
            strategy,
            chunk_pixels: chunk_pixels.max(1),
            in_flight: 0,
            burst: None,
        }
    }

    /// Configured strategy
    pub fn strategy(&self) -> TransferStrategy {
        self.strategy
    }

    /// Largest chunk in pixels
    pub fn chunk_pixels(&self) -> usize {
        self.chunk_pixels
    }

    /// Queued transactions not yet reaped
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether a queued burst is still outstanding
    pub fn is_active(&self) -> bool {
        self.burst.is_some() || self.in_flight > 0
    }

    /// Write `pixels` into `window` using the configured strategy
    ///
    /// `pixels.len()` must equal the window area; the caller checks this.
    pub fn push<I: DisplayInterface>(
        &mut self,
        interface: &mut I,
        window: Window,
        pixels: &[u16],
    ) -> TransferResult<PushStatus, I> {
        match self.strategy {
            TransferStrategy::Blocking => {
                self.push_blocking(interface, window, pixels)?;
                Ok(PushStatus::Complete)
            }
            TransferStrategy::Queued {
                max_in_flight,
                memory_floor,
            } => self.push_queued(interface, window, pixels, max_in_flight, memory_floor),
        }
    }

    /// Repeat [`push`](Self::push) until it completes, blocking on completions
    pub fn push_to_completion<I: DisplayInterface>(
        &mut self,
        interface: &mut I,
        window: Window,
        pixels: &[u16],
    ) -> TransferResult<(), I> {
        loop {
            match self.push(interface, window, pixels)? {
                PushStatus::Complete => return Ok(()),
                PushStatus::Pending { in_flight, .. } if in_flight > 0 => {
                    interface.wait_completed().map_err(Error::BusFailure)?;
                    self.in_flight -= 1;
                    log::trace!("reaped chunk (blocking), {} in flight", self.in_flight);
                }
                // Held back by the memory floor with nothing in flight
                PushStatus::Pending { .. } => self.transmit_next(interface, pixels)?,
            }
        }
    }

    /// Send the next unqueued chunk of the pending burst synchronously
    fn transmit_next<I: DisplayInterface>(
        &mut self,
        interface: &mut I,
        pixels: &[u16],
    ) -> TransferResult<(), I> {
        let Some(mut burst) = self.burst else {
            return Ok(());
        };
        let end = (burst.queued + self.chunk_pixels).min(burst.total);
        let chunk = &pixels[burst.queued..end];
        let transaction = if burst.queued == 0 {
            Transaction::pixels_first(chunk)
        } else {
            Transaction::pixels_continue(chunk)
        };
        log::debug!("memory floor with nothing in flight, sending {} px inline", chunk.len());
        interface
            .transmit(&transaction)
            .map_err(Error::BusFailure)?;
        burst.queued = end;
        self.burst = Some(burst);
        Ok(())
    }

    /// Block until every queued chunk has finished
    ///
    /// Completes the burst if its tail was already queued. Otherwise the
    /// burst stays pending and the caller repeats the original push.
    pub fn drain<I: DisplayInterface>(
        &mut self,
        interface: &mut I,
    ) -> TransferResult<PushStatus, I> {
        while self.in_flight > 0 {
            interface.wait_completed().map_err(Error::BusFailure)?;
            self.in_flight -= 1;
        }
        match self.burst {
            Some(burst) if burst.queued < burst.total => Ok(PushStatus::Pending {
                remaining: burst.total - burst.queued,
                in_flight: 0,
            }),
            Some(_) => {
                interface.deselect().map_err(Error::BusFailure)?;
                self.burst = None;
                log::debug!("queued burst drained");
                Ok(PushStatus::Complete)
            }
            None => Ok(PushStatus::Complete),
        }
    }

    /// Send a synchronous burst into the window that is already armed
    ///
    /// The first chunk carries the `RAMWR` header, the rest reuse it.
    /// Chip select stays asserted for the whole burst.
    pub fn stream<I: DisplayInterface>(
        &mut self,
        interface: &mut I,
        pixels: &[u16],
    ) -> TransferResult<(), I> {
        if self.is_active() {
            return Err(Error::SessionBusy);
        }
        if pixels.is_empty() {
            return Ok(());
        }

        interface.select().map_err(Error::BusFailure)?;
        for (index, chunk) in pixels.chunks(self.chunk_pixels).enumerate() {
            let transaction = if index == 0 {
                Transaction::pixels_first(chunk)
            } else {
                Transaction::pixels_continue(chunk)
            };
            log::trace!("stream chunk {}: {} px", index, chunk.len());
            interface
                .transmit(&transaction)
                .map_err(Error::BusFailure)?;
        }
        interface.deselect().map_err(Error::BusFailure)
    }

    fn push_blocking<I: DisplayInterface>(
        &mut self,
        interface: &mut I,
        window: Window,
        pixels: &[u16],
    ) -> TransferResult<(), I> {
        arm_window(interface, &window)?;
        if pixels.is_empty() {
            return Ok(());
        }

        interface.select().map_err(Error::BusFailure)?;
        let mut address = RAMWR_ADDRESS;
        for (index, chunk) in pixels.chunks(self.chunk_pixels).enumerate() {
            if index > 0 {
                interface.deselect().map_err(Error::BusFailure)?;
                interface.select().map_err(Error::BusFailure)?;
            }
            log::trace!("chunk {} at {:#08x}: {} px", index, address, chunk.len());
            interface
                .transmit(&Transaction::pixels_at(address, chunk))
                .map_err(Error::BusFailure)?;
            address = RAMWRC_ADDRESS;
        }
        interface.deselect().map_err(Error::BusFailure)
    }

    fn push_queued<I: DisplayInterface>(
        &mut self,
        interface: &mut I,
        window: Window,
        pixels: &[u16],
        max_in_flight: usize,
        memory_floor: usize,
    ) -> TransferResult<PushStatus, I> {
        let mut burst = match self.burst {
            Some(burst) if burst.window == window && burst.total == pixels.len() => burst,
            Some(_) => return Err(Error::SessionBusy),
            None => {
                arm_window(interface, &window)?;
                if pixels.is_empty() {
                    return Ok(PushStatus::Complete);
                }
                interface.select().map_err(Error::BusFailure)?;
                log::debug!("queued burst: {} px into {:?}", pixels.len(), window);
                Burst {
                    window,
                    total: pixels.len(),
                    queued: 0,
                }
            }
        };

        // Reap whatever finished since the last call
        while self.in_flight > 0 && interface.poll_completed().map_err(Error::BusFailure)? {
            self.in_flight -= 1;
        }

        while burst.queued < burst.total {
            if self.in_flight >= max_in_flight {
                log::trace!("in-flight cap {} reached", max_in_flight);
                break;
            }
            let free = interface.free_memory();
            if free <= memory_floor {
                log::warn!("free memory {} at or below floor {}", free, memory_floor);
                break;
            }

            let end = (burst.queued + self.chunk_pixels).min(burst.total);
            let chunk = &pixels[burst.queued..end];
            let transaction = if burst.queued == 0 {
                Transaction::pixels_first(chunk)
            } else {
                Transaction::pixels_continue(chunk)
            };
            // A failed queue leaves the burst recorded
            self.burst = Some(burst);
            interface.queue(&transaction).map_err(Error::BusFailure)?;
            self.in_flight += 1;
            burst.queued = end;
            log::trace!("queued {} px, {} in flight", chunk.len(), self.in_flight);
        }

        if burst.queued == burst.total && self.in_flight == 0 {
            interface.deselect().map_err(Error::BusFailure)?;
            self.burst = None;
            log::debug!("queued burst complete");
            return Ok(PushStatus::Complete);
        }

        self.burst = Some(burst);
        Ok(PushStatus::Pending {
            remaining: burst.total - burst.queued,
            in_flight: self.in_flight,
        })
    }
}
