//! Recording interface shared by the unit tests

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;

use crate::config::BusConfig;
use crate::interface::DisplayInterface;
use crate::transaction::{Payload, Transaction, TransactionFlags};

/// Owned copy of a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub cmd: u8,
    pub addr: u32,
    pub flags: TransactionFlags,
    pub continuation: bool,
    pub bytes: Vec<u8>,
    pub pixels: Vec<u16>,
    pub length_bits: usize,
}

impl From<&Transaction<'_>> for Recorded {
    fn from(t: &Transaction<'_>) -> Self {
        let (bytes, pixels) = match t.payload {
            Payload::None => (Vec::new(), Vec::new()),
            Payload::Bytes(b) => (b.to_vec(), Vec::new()),
            Payload::Fixed(b) => (b.to_vec(), Vec::new()),
            Payload::Pixels(p) => (Vec::new(), p.to_vec()),
        };
        Self {
            cmd: t.cmd,
            addr: t.addr,
            flags: t.flags,
            continuation: t.is_continuation(),
            bytes,
            pixels,
            length_bits: t.length_bits,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Configure,
    Reset,
    Select,
    Deselect,
    Transmit(Recorded),
    Queue(Recorded),
    Reaped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockError;

/// Interface that logs every call
///
/// Queued transactions complete only when the test calls
/// [`MockInterface::complete`], or when `auto_complete` is set.
#[derive(Debug, Default)]
pub struct MockInterface {
    pub events: Vec<Event>,
    /// Queued but not yet finished
    pub pending: usize,
    /// Finished but not yet reaped
    pub finished: usize,
    /// Every queued transaction finishes immediately
    pub auto_complete: bool,
    /// Fail the transmit/queue call with this zero-based index
    pub fail_at: Option<usize>,
    pub free_memory: Option<usize>,
    submitted: usize,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish up to `n` queued transactions
    pub fn complete(&mut self, n: usize) {
        let n = n.min(self.pending);
        self.pending -= n;
        self.finished += n;
    }

    /// Transactions sent or queued, in order
    pub fn transactions(&self) -> Vec<&Recorded> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Transmit(r) | Event::Queue(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Register writes (address-mode transactions) as `(command, data)`
    pub fn commands(&self) -> Vec<(u8, Vec<u8>)> {
        self.transactions()
            .into_iter()
            .filter(|r| r.cmd == crate::command::QSPI_WRITE_CMD)
            .map(|r| ((r.addr >> 8) as u8, r.bytes.clone()))
            .collect()
    }

    /// Every pixel sent, in order
    pub fn pixels(&self) -> Vec<u16> {
        self.transactions()
            .into_iter()
            .flat_map(|r| r.pixels.iter().copied())
            .collect()
    }

    /// Pixel chunk sizes, in order
    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.transactions()
            .into_iter()
            .filter(|r| !r.pixels.is_empty())
            .map(|r| r.pixels.len())
            .collect()
    }

    /// Transmit/queue calls so far, including ones cleared from the log
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn check_fail(&mut self) -> Result<(), MockError> {
        let index = self.submitted;
        self.submitted += 1;
        if self.fail_at == Some(index) {
            return Err(MockError);
        }
        Ok(())
    }
}

impl DisplayInterface for MockInterface {
    type Error = MockError;

    fn configure(&mut self, _config: &BusConfig) -> Result<(), Self::Error> {
        self.events.push(Event::Configure);
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, _delay: &mut D) {
        self.events.push(Event::Reset);
    }

    fn select(&mut self) -> Result<(), Self::Error> {
        self.events.push(Event::Select);
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.events.push(Event::Deselect);
        Ok(())
    }

    fn transmit(&mut self, transaction: &Transaction<'_>) -> Result<(), Self::Error> {
        self.check_fail()?;
        self.events.push(Event::Transmit(transaction.into()));
        Ok(())
    }

    fn queue(&mut self, transaction: &Transaction<'_>) -> Result<(), Self::Error> {
        self.check_fail()?;
        self.events.push(Event::Queue(transaction.into()));
        if self.auto_complete {
            self.finished += 1;
        } else {
            self.pending += 1;
        }
        Ok(())
    }

    fn poll_completed(&mut self) -> Result<bool, Self::Error> {
        if self.finished == 0 {
            return Ok(false);
        }
        self.finished -= 1;
        self.events.push(Event::Reaped);
        Ok(true)
    }

    fn wait_completed(&mut self) -> Result<(), Self::Error> {
        if self.finished == 0 {
            self.complete(1);
        }
        self.finished = self.finished.saturating_sub(1);
        self.events.push(Event::Reaped);
        Ok(())
    }

    fn free_memory(&mut self) -> usize {
        self.free_memory.unwrap_or(usize::MAX)
    }
}

pub struct MockDelay {
    pub total_ms: u32,
    pub calls: Vec<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self {
            total_ms: 0,
            calls: Vec::new(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += ms;
        self.calls.push(ms);
    }
}
