//! Time source and cancellation traits
//!
//! Blocking delays come from [`embedded_hal::delay::DelayNs`]; this module
//! adds the monotonic clock used for phase timestamps and the stop signal
//! polled by the sequencer.

use portable_atomic::{AtomicBool, Ordering};

/// Monotonic time source
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;

    /// Milliseconds since the same origin
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}

/// Out-of-band stop request, polled by the sequencer
pub trait CancelSignal {
    /// Check if a stop has been requested
    fn is_cancelled(&self) -> bool;
}

impl<T: CancelSignal + ?Sized> CancelSignal for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Stop flag that can be raised from an interrupt handler
///
/// Place it in a `static` and hand a reference to the sequencer.
#[derive(Debug, Default)]
pub struct StopFlag {
    requested: AtomicBool,
}

impl StopFlag {
    /// Create a cleared flag
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Request a stop
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Clear a previous request
    pub fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }

    /// Check if a stop is pending
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

impl CancelSignal for StopFlag {
    fn is_cancelled(&self) -> bool {
        self.is_requested()
    }
}

/// Signal that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}
