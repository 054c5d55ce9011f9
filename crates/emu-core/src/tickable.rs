//! Trait for components that are clocked without needing the bus.

use crate::Ticks;

/// A component advanced by the master clock alone.
///
/// Chips that run independently of CPU activity (timers, interrupt
/// routing) implement this. The machine ticks them whether or not the CPU
/// owns the bus on that tick.
pub trait Tickable {
    /// Advance the component by one tick.
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Must produce the same state as calling `tick()` `count` times.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
