//! Addressing modes and their bus-cycle patterns.
//!
//! Reads through an indexed mode only pay the fix-up cycle when the index
//! carries into the high byte; stores and read-modify-write always pay it.
//! The fix-up cycle reads the half-computed address (old high byte, new low
//! byte), which matters when that address is an I/O register.

use emu_core::Bus;

use crate::Mos6502;

/// Operand addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// (zp,X)
    IndirectX,
    /// (zp),Y
    IndirectY,
}

/// Same page test used by indexing and branches.
pub(crate) const fn crosses_page(a: u16, b: u16) -> bool {
    (a ^ b) & 0xFF00 != 0
}

impl Mos6502 {
    /// Effective address for an instruction that only reads its operand.
    pub(crate) fn read_address<B: Bus>(&mut self, bus: &mut B, mode: Mode) -> u16 {
        self.effective_address(bus, mode, false)
    }

    /// Effective address for a store or read-modify-write.
    pub(crate) fn write_address<B: Bus>(&mut self, bus: &mut B, mode: Mode) -> u16 {
        self.effective_address(bus, mode, true)
    }

    fn effective_address<B: Bus>(&mut self, bus: &mut B, mode: Mode, store: bool) -> u16 {
        match mode {
            Mode::Immediate => {
                let address = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                address
            }
            Mode::ZeroPage => u16::from(self.fetch(bus)),
            Mode::ZeroPageX => {
                let base = self.fetch(bus);
                self.dummy_read(bus, u16::from(base));
                u16::from(base.wrapping_add(self.regs.x))
            }
            Mode::ZeroPageY => {
                let base = self.fetch(bus);
                self.dummy_read(bus, u16::from(base));
                u16::from(base.wrapping_add(self.regs.y))
            }
            Mode::Absolute => self.fetch_word(bus),
            Mode::AbsoluteX => {
                let base = self.fetch_word(bus);
                self.index(bus, base, self.regs.x, store)
            }
            Mode::AbsoluteY => {
                let base = self.fetch_word(bus);
                self.index(bus, base, self.regs.y, store)
            }
            Mode::IndirectX => {
                let base = self.fetch(bus);
                self.dummy_read(bus, u16::from(base));
                let pointer = base.wrapping_add(self.regs.x);
                self.read_zero_page_word(bus, pointer)
            }
            Mode::IndirectY => {
                let base = self.zero_page_pointer(bus);
                self.index(bus, base, self.regs.y, store)
            }
        }
    }

    /// Fetch a zero-page pointer operand and read the word it points at.
    pub(crate) fn zero_page_pointer<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let pointer = self.fetch(bus);
        self.read_zero_page_word(bus, pointer)
    }

    /// Read a little-endian word from zero page; the high byte wraps
    /// within page zero.
    fn read_zero_page_word<B: Bus>(&mut self, bus: &mut B, pointer: u8) -> u16 {
        let lo = self.read(bus, u16::from(pointer));
        let hi = self.read(bus, u16::from(pointer.wrapping_add(1)));
        u16::from_le_bytes([lo, hi])
    }

    /// Add an index register to a base address, issuing the fix-up read
    /// when the access needs one.
    fn index<B: Bus>(&mut self, bus: &mut B, base: u16, index: u8, store: bool) -> u16 {
        let address = base.wrapping_add(u16::from(index));
        if store || crosses_page(base, address) {
            self.dummy_read(bus, (base & 0xFF00) | (address & 0x00FF));
        }
        address
    }

    /// Two-cycle implied instructions re-read the next opcode byte.
    pub(crate) fn implied<B: Bus>(&mut self, bus: &mut B) {
        let pc = self.regs.pc;
        self.dummy_read(bus, pc);
    }

    /// Conditional branch: 2 cycles, +1 if taken, +1 more if the target is
    /// on another page.
    pub(crate) fn branch<B: Bus>(&mut self, bus: &mut B, taken: bool) {
        let offset = self.fetch(bus) as i8;
        if !taken {
            return;
        }
        let pc = self.regs.pc;
        self.dummy_read(bus, pc);
        let target = pc.wrapping_add(offset as u16);
        if crosses_page(pc, target) {
            self.dummy_read(bus, (pc & 0xFF00) | (target & 0x00FF));
        }
        self.regs.pc = target;
    }
}
