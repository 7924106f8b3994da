//! Serial link buffering
//!
//! Each link has an [`RxRing`] filled by its receive context and drained by
//! one or more [`RxCursor`]s, plus a [`TxBuffer`] that holds one armed,
//! line-feed terminated sequence which the transmit context drains a byte at
//! a time.
//!
//! The ring publishes its write position as a single atomic sequence number
//! stored after the byte itself, so a consumer never sees a position that
//! points at a byte not yet written. A consumer that falls a full buffer
//! behind loses the oldest unread bytes; the loss is counted on the cursor.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};

use crate::config::SERIAL_CAPACITY;
use crate::error::TxError;

/// Receive ring, single producer
pub struct RxRing<const N: usize = SERIAL_CAPACITY> {
    buf: [AtomicU8; N],
    /// Write sequence, wraps at [`Self::WRAP`]
    written: AtomicU32,
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RxRing<N> {
    /// Sequence numbers wrap at a multiple of the capacity so `seq % N` stays
    /// continuous across the wrap.
    const WRAP: u32 = N as u32 * 4096;

    pub const fn new() -> Self {
        Self {
            buf: [const { AtomicU8::new(0) }; N],
            written: AtomicU32::new(0),
        }
    }

    /// Receive-event entry point: store the byte and advance the write index.
    pub fn on_receive(&self, byte: u8) {
        let seq = self.written.load(Ordering::Relaxed);
        self.buf[seq as usize % N].store(byte, Ordering::Relaxed);
        self.written.store((seq + 1) % Self::WRAP, Ordering::Release);
    }

    /// Position of the next byte the producer will write
    pub fn write_index(&self) -> usize {
        self.written.load(Ordering::Acquire) as usize % N
    }

    /// Cursor starting at the current write position, it sees only bytes
    /// received from now on.
    pub fn cursor(&self) -> RxCursor {
        RxCursor {
            read: self.written.load(Ordering::Acquire),
            overruns: 0,
        }
    }
}

/// Consumer side of an [`RxRing`]
///
/// The read index wraps on its own, independent of the producer.
#[derive(Debug, Clone)]
pub struct RxCursor {
    read: u32,
    overruns: u32,
}

impl Default for RxCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl RxCursor {
    /// Cursor at the start of a freshly created ring
    pub const fn new() -> Self {
        Self { read: 0, overruns: 0 }
    }

    /// Next unread byte, if any
    pub fn next<const N: usize>(&mut self, ring: &RxRing<N>) -> Option<u8> {
        let wrap = RxRing::<N>::WRAP;
        let written = ring.written.load(Ordering::Acquire);
        let mut lag = (written + wrap - self.read) % wrap;
        if lag == 0 {
            return None;
        }
        if lag > N as u32 {
            // the producer lapped us, skip to the oldest byte still in the ring
            self.overruns = self.overruns.wrapping_add(1);
            warn!("rx overrun, {} bytes lost", lag - N as u32);
            self.read = (written + wrap - N as u32) % wrap;
            lag = N as u32;
        }
        debug_assert!(lag <= N as u32);
        let byte = ring.buf[self.read as usize % N].load(Ordering::Relaxed);
        self.read = (self.read + 1) % wrap;
        Some(byte)
    }

    /// Position the cursor reads next, in `0..N`
    pub fn read_index<const N: usize>(&self) -> usize {
        self.read as usize % N
    }

    /// Number of times the producer overtook this cursor
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

/// Transmit buffer with edge-triggered drain
///
/// Arming copies a sequence and enables draining; every transmit-ready event
/// then yields one byte. The line feed ends the sequence: it is sent, the
/// index returns to zero and draining disables itself until the next arm.
pub struct TxBuffer<const N: usize = SERIAL_CAPACITY> {
    buf: [AtomicU8; N],
    index: AtomicUsize,
    enabled: AtomicBool,
}

impl<const N: usize> Default for TxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TxBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: [const { AtomicU8::new(0) }; N],
            index: AtomicUsize::new(0),
            enabled: AtomicBool::new(false),
        }
    }

    /// Arms a sequence. It must end with `\n`, anything after the first line
    /// feed would never be sent.
    pub fn arm(&self, sequence: &[u8]) -> Result<(), TxError> {
        if self.enabled.load(Ordering::Acquire) {
            return Err(TxError::Busy);
        }
        if sequence.len() > N {
            return Err(TxError::TooLong);
        }
        if sequence.last() != Some(&b'\n') {
            return Err(TxError::MissingTerminator);
        }
        for (slot, byte) in self.buf.iter().zip(sequence) {
            slot.store(*byte, Ordering::Relaxed);
        }
        self.index.store(0, Ordering::Relaxed);
        self.enabled.store(true, Ordering::Release);
        Ok(())
    }

    /// Whether a sequence is still draining
    pub fn is_busy(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Transmit-ready entry point. Returns the byte to put on the wire, or
    /// `None` once draining is disabled.
    pub fn on_tx_ready(&self) -> Option<u8> {
        if !self.enabled.load(Ordering::Acquire) {
            return None;
        }
        let index = self.index.load(Ordering::Relaxed);
        let byte = self.buf[index].swap(0, Ordering::Relaxed);
        if byte == b'\n' || index + 1 >= N {
            self.index.store(0, Ordering::Relaxed);
            self.enabled.store(false, Ordering::Release);
        } else {
            self.index.store(index + 1, Ordering::Relaxed);
        }
        Some(byte)
    }
}
