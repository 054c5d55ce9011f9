//! Core traits and types for tick-exact emulation.
//!
//! One tick is one memory-bus cycle. Every chip advances in ticks, and the
//! CPU advances the clock through its own bus accesses. No exceptions.

mod bus;
mod clock;
mod cpu;
mod observable;
mod tickable;
mod ticks;

pub use bus::{AccessKind, Bus, SimpleBus};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
