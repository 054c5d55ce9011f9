//! CPU core trait.

use crate::Bus;

/// A CPU core that executes one instruction per call.
///
/// The bus is passed in, not owned, so the machine can clock every other
/// chip from inside the bus accesses. Time therefore advances as a side
/// effect of `step`: each read or write is one bus cycle, and a bus that
/// stalls the CPU simply takes longer to return.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute one instruction, or take one pending interrupt.
    ///
    /// Returns the number of bus cycles the CPU issued. Cycles the bus spent
    /// holding the CPU are not included.
    fn step<B: Bus>(&mut self, bus: &mut B) -> u32;

    /// Run the reset sequence, loading PC from the reset vector.
    fn reset<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a copy of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU has locked up and only a reset recovers it.
    fn is_jammed(&self) -> bool;
}
