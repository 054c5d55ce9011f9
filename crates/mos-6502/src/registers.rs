//! 6502 register file.

use crate::flags::Status;

/// Reset vector.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// NMI vector.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// IRQ and BRK vector.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// 6502 register set.
///
/// - A: 8-bit accumulator
/// - X, Y: 8-bit index registers
/// - S: 8-bit stack pointer (stack is at $0100-$01FF)
/// - PC: 16-bit program counter
/// - P: 8-bit processor status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer (points to next free location).
    pub s: u8,
    /// Program counter.
    pub pc: u16,
    /// Processor status flags.
    pub p: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Registers as they look after the reset sequence (PC not yet loaded).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            pc: 0,
            p: Status::new(),
        }
    }

    /// Address of the current top-of-stack slot.
    #[must_use]
    pub const fn stack_addr(&self) -> u16 {
        0x0100 | self.s as u16
    }
}
