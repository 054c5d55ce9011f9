//! Master clock configuration.

use crate::Ticks;

/// Master clock of a machine.
///
/// On the machines modelled here the bus cycle is the master tick, so this
/// is the CPU frequency at multiplier 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Tick frequency in Hz (e.g., `985_248` for a PAL C64).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per period of a slower signal (rounded to nearest).
    ///
    /// Used for mains-derived inputs such as the CIA time-of-day pin.
    #[must_use]
    pub const fn ticks_per_period(&self, signal_hz: u64) -> Ticks {
        Ticks::new((self.frequency_hz + signal_hz / 2) / signal_hz)
    }
}
