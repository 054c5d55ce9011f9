//! Processor status register.
//!
//! ```text
//! 7 6 5 4 3 2 1 0
//! N V - B D I Z C
//! ```
//!
//! Bit 5 has no storage and always reads as 1. Bit 4 (B) has no storage
//! either: it only exists in the copy pushed to the stack, set by BRK/PHP
//! and clear for hardware interrupts.

/// Carry.
pub const C: u8 = 0x01;
/// Zero.
pub const Z: u8 = 0x02;
/// Interrupt disable.
pub const I: u8 = 0x04;
/// Decimal mode.
pub const D: u8 = 0x08;
/// Break (stack copy only).
pub const B: u8 = 0x10;
/// Unused, always 1.
pub const U: u8 = 0x20;
/// Overflow.
pub const V: u8 = 0x40;
/// Negative.
pub const N: u8 = 0x80;

/// Processor status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(pub u8);

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    #[must_use]
    pub const fn new() -> Self {
        Self(U | I)
    }

    /// Status as restored by PLP/RTI: B is dropped, U forced on.
    #[must_use]
    pub const fn from_stack(byte: u8) -> Self {
        Self((byte & !B) | U)
    }

    /// Byte pushed by BRK and PHP.
    #[must_use]
    pub const fn pushed_by_software(self) -> u8 {
        self.0 | B | U
    }

    /// Byte pushed by IRQ and NMI.
    #[must_use]
    pub const fn pushed_by_interrupt(self) -> u8 {
        (self.0 & !B) | U
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    /// Set N and Z from a result byte.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(Z, value == 0);
        self.set_if(N, value & 0x80 != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_images_differ_only_in_b() {
        let p = Status(C | N | U);
        assert_eq!(p.pushed_by_software(), C | N | U | B);
        assert_eq!(p.pushed_by_interrupt(), C | N | U);
    }

    #[test]
    fn restore_drops_b_and_forces_u() {
        assert_eq!(Status::from_stack(0xFF).0, 0xEF);
        assert_eq!(Status::from_stack(0x00).0, U);
    }
}
