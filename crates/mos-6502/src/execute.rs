//! Opcode decode and execution.

use emu_core::Bus;

use crate::Mos6502;
use crate::addressing::{Mode, crosses_page};
use crate::flags::{C, D, I, N, V, Z};
use crate::registers::IRQ_VECTOR;
use crate::Status;

use Mode::{
    Absolute as Abs, AbsoluteX as AbsX, AbsoluteY as AbsY, Immediate as Imm,
    IndirectX as IndX, IndirectY as IndY, ZeroPage as Zp, ZeroPageX as ZpX,
    ZeroPageY as ZpY,
};

impl Mos6502 {
    /// Execute a fetched opcode. The opcode fetch cycle has already been
    /// counted.
    pub(crate) fn execute<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        match opcode {
            // =================================================================
            // Loads and stores
            // =================================================================
            0xA9 => self.load_with(bus, Imm, Self::load_a),
            0xA5 => self.load_with(bus, Zp, Self::load_a),
            0xB5 => self.load_with(bus, ZpX, Self::load_a),
            0xAD => self.load_with(bus, Abs, Self::load_a),
            0xBD => self.load_with(bus, AbsX, Self::load_a),
            0xB9 => self.load_with(bus, AbsY, Self::load_a),
            0xA1 => self.load_with(bus, IndX, Self::load_a),
            0xB1 => self.load_with(bus, IndY, Self::load_a),

            0xA2 => self.load_with(bus, Imm, Self::load_x),
            0xA6 => self.load_with(bus, Zp, Self::load_x),
            0xB6 => self.load_with(bus, ZpY, Self::load_x),
            0xAE => self.load_with(bus, Abs, Self::load_x),
            0xBE => self.load_with(bus, AbsY, Self::load_x),

            0xA0 => self.load_with(bus, Imm, Self::load_y),
            0xA4 => self.load_with(bus, Zp, Self::load_y),
            0xB4 => self.load_with(bus, ZpX, Self::load_y),
            0xAC => self.load_with(bus, Abs, Self::load_y),
            0xBC => self.load_with(bus, AbsX, Self::load_y),

            0x85 => self.store(bus, Zp, self.regs.a),
            0x95 => self.store(bus, ZpX, self.regs.a),
            0x8D => self.store(bus, Abs, self.regs.a),
            0x9D => self.store(bus, AbsX, self.regs.a),
            0x99 => self.store(bus, AbsY, self.regs.a),
            0x81 => self.store(bus, IndX, self.regs.a),
            0x91 => self.store(bus, IndY, self.regs.a),

            0x86 => self.store(bus, Zp, self.regs.x),
            0x96 => self.store(bus, ZpY, self.regs.x),
            0x8E => self.store(bus, Abs, self.regs.x),

            0x84 => self.store(bus, Zp, self.regs.y),
            0x94 => self.store(bus, ZpX, self.regs.y),
            0x8C => self.store(bus, Abs, self.regs.y),

            // =================================================================
            // Arithmetic and logic
            // =================================================================
            0x69 => self.load_with(bus, Imm, Self::adc),
            0x65 => self.load_with(bus, Zp, Self::adc),
            0x75 => self.load_with(bus, ZpX, Self::adc),
            0x6D => self.load_with(bus, Abs, Self::adc),
            0x7D => self.load_with(bus, AbsX, Self::adc),
            0x79 => self.load_with(bus, AbsY, Self::adc),
            0x61 => self.load_with(bus, IndX, Self::adc),
            0x71 => self.load_with(bus, IndY, Self::adc),

            0xE9 | 0xEB => self.load_with(bus, Imm, Self::sbc),
            0xE5 => self.load_with(bus, Zp, Self::sbc),
            0xF5 => self.load_with(bus, ZpX, Self::sbc),
            0xED => self.load_with(bus, Abs, Self::sbc),
            0xFD => self.load_with(bus, AbsX, Self::sbc),
            0xF9 => self.load_with(bus, AbsY, Self::sbc),
            0xE1 => self.load_with(bus, IndX, Self::sbc),
            0xF1 => self.load_with(bus, IndY, Self::sbc),

            0x29 => self.load_with(bus, Imm, Self::and),
            0x25 => self.load_with(bus, Zp, Self::and),
            0x35 => self.load_with(bus, ZpX, Self::and),
            0x2D => self.load_with(bus, Abs, Self::and),
            0x3D => self.load_with(bus, AbsX, Self::and),
            0x39 => self.load_with(bus, AbsY, Self::and),
            0x21 => self.load_with(bus, IndX, Self::and),
            0x31 => self.load_with(bus, IndY, Self::and),

            0x09 => self.load_with(bus, Imm, Self::ora),
            0x05 => self.load_with(bus, Zp, Self::ora),
            0x15 => self.load_with(bus, ZpX, Self::ora),
            0x0D => self.load_with(bus, Abs, Self::ora),
            0x1D => self.load_with(bus, AbsX, Self::ora),
            0x19 => self.load_with(bus, AbsY, Self::ora),
            0x01 => self.load_with(bus, IndX, Self::ora),
            0x11 => self.load_with(bus, IndY, Self::ora),

            0x49 => self.load_with(bus, Imm, Self::eor),
            0x45 => self.load_with(bus, Zp, Self::eor),
            0x55 => self.load_with(bus, ZpX, Self::eor),
            0x4D => self.load_with(bus, Abs, Self::eor),
            0x5D => self.load_with(bus, AbsX, Self::eor),
            0x59 => self.load_with(bus, AbsY, Self::eor),
            0x41 => self.load_with(bus, IndX, Self::eor),
            0x51 => self.load_with(bus, IndY, Self::eor),

            0xC9 => self.load_with(bus, Imm, Self::cmp_a),
            0xC5 => self.load_with(bus, Zp, Self::cmp_a),
            0xD5 => self.load_with(bus, ZpX, Self::cmp_a),
            0xCD => self.load_with(bus, Abs, Self::cmp_a),
            0xDD => self.load_with(bus, AbsX, Self::cmp_a),
            0xD9 => self.load_with(bus, AbsY, Self::cmp_a),
            0xC1 => self.load_with(bus, IndX, Self::cmp_a),
            0xD1 => self.load_with(bus, IndY, Self::cmp_a),

            0xE0 => self.load_with(bus, Imm, Self::cmp_x),
            0xE4 => self.load_with(bus, Zp, Self::cmp_x),
            0xEC => self.load_with(bus, Abs, Self::cmp_x),
            0xC0 => self.load_with(bus, Imm, Self::cmp_y),
            0xC4 => self.load_with(bus, Zp, Self::cmp_y),
            0xCC => self.load_with(bus, Abs, Self::cmp_y),

            0x24 => self.load_with(bus, Zp, Self::bit),
            0x2C => self.load_with(bus, Abs, Self::bit),

            // =================================================================
            // Read-modify-write
            // =================================================================
            0x0A => self.accumulator(bus, Self::asl),
            0x06 => self.modify(bus, Zp, Self::asl),
            0x16 => self.modify(bus, ZpX, Self::asl),
            0x0E => self.modify(bus, Abs, Self::asl),
            0x1E => self.modify(bus, AbsX, Self::asl),

            0x4A => self.accumulator(bus, Self::lsr),
            0x46 => self.modify(bus, Zp, Self::lsr),
            0x56 => self.modify(bus, ZpX, Self::lsr),
            0x4E => self.modify(bus, Abs, Self::lsr),
            0x5E => self.modify(bus, AbsX, Self::lsr),

            0x2A => self.accumulator(bus, Self::rol),
            0x26 => self.modify(bus, Zp, Self::rol),
            0x36 => self.modify(bus, ZpX, Self::rol),
            0x2E => self.modify(bus, Abs, Self::rol),
            0x3E => self.modify(bus, AbsX, Self::rol),

            0x6A => self.accumulator(bus, Self::ror),
            0x66 => self.modify(bus, Zp, Self::ror),
            0x76 => self.modify(bus, ZpX, Self::ror),
            0x6E => self.modify(bus, Abs, Self::ror),
            0x7E => self.modify(bus, AbsX, Self::ror),

            0xE6 => self.modify(bus, Zp, Self::inc),
            0xF6 => self.modify(bus, ZpX, Self::inc),
            0xEE => self.modify(bus, Abs, Self::inc),
            0xFE => self.modify(bus, AbsX, Self::inc),

            0xC6 => self.modify(bus, Zp, Self::dec),
            0xD6 => self.modify(bus, ZpX, Self::dec),
            0xCE => self.modify(bus, Abs, Self::dec),
            0xDE => self.modify(bus, AbsX, Self::dec),

            // =================================================================
            // Register transfers, increments, flags
            // =================================================================
            0xAA => self.register_op(bus, |cpu| cpu.load_x(cpu.regs.a)),
            0xA8 => self.register_op(bus, |cpu| cpu.load_y(cpu.regs.a)),
            0x8A => self.register_op(bus, |cpu| cpu.load_a(cpu.regs.x)),
            0x98 => self.register_op(bus, |cpu| cpu.load_a(cpu.regs.y)),
            0xBA => self.register_op(bus, |cpu| cpu.load_x(cpu.regs.s)),
            0x9A => self.register_op(bus, |cpu| cpu.regs.s = cpu.regs.x),
            0xE8 => self.register_op(bus, |cpu| cpu.load_x(cpu.regs.x.wrapping_add(1))),
            0xC8 => self.register_op(bus, |cpu| cpu.load_y(cpu.regs.y.wrapping_add(1))),
            0xCA => self.register_op(bus, |cpu| cpu.load_x(cpu.regs.x.wrapping_sub(1))),
            0x88 => self.register_op(bus, |cpu| cpu.load_y(cpu.regs.y.wrapping_sub(1))),

            0x18 => self.register_op(bus, |cpu| cpu.regs.p.clear(C)),
            0x38 => self.register_op(bus, |cpu| cpu.regs.p.set(C)),
            0x58 => self.register_op(bus, |cpu| cpu.regs.p.clear(I)),
            0x78 => self.register_op(bus, |cpu| cpu.regs.p.set(I)),
            0xD8 => self.register_op(bus, |cpu| cpu.regs.p.clear(D)),
            0xF8 => self.register_op(bus, |cpu| cpu.regs.p.set(D)),
            0xB8 => self.register_op(bus, |cpu| cpu.regs.p.clear(V)),

            // =================================================================
            // Stack
            // =================================================================
            0x48 => {
                self.implied(bus);
                self.push(bus, self.regs.a);
            }
            0x08 => {
                self.implied(bus);
                let p = self.regs.p.pushed_by_software();
                self.push(bus, p);
            }
            0x68 => {
                self.pre_pull(bus);
                let value = self.pull(bus);
                self.load_a(value);
            }
            0x28 => {
                self.pre_pull(bus);
                let value = self.pull(bus);
                self.regs.p = Status::from_stack(value);
            }

            // =================================================================
            // Control flow
            // =================================================================
            0x4C => self.regs.pc = self.fetch_word(bus),
            0x6C => {
                // The pointer's high byte is fetched without carry into the
                // next page: JMP ($10FF) reads $10FF and $1000.
                let pointer = self.fetch_word(bus);
                let lo = self.read(bus, pointer);
                let hi = self.read(bus, (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF));
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            0x20 => {
                let lo = self.fetch(bus);
                let stack = self.regs.stack_addr();
                self.dummy_read(bus, stack);
                self.push_word(bus, self.regs.pc);
                let hi = self.read(bus, self.regs.pc);
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            0x60 => {
                self.pre_pull(bus);
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                let pc = u16::from_le_bytes([lo, hi]);
                self.dummy_read(bus, pc);
                self.regs.pc = pc.wrapping_add(1);
            }
            0x40 => {
                self.pre_pull(bus);
                let p = self.pull(bus);
                self.regs.p = Status::from_stack(p);
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            0x00 => {
                // The byte after BRK is read and skipped.
                let pc = self.regs.pc;
                self.dummy_read(bus, pc);
                self.regs.pc = pc.wrapping_add(1);
                self.push_word(bus, self.regs.pc);
                let p = self.regs.p.pushed_by_software();
                self.push(bus, p);
                self.regs.p.set(I);
                self.regs.pc = self.read_vector(bus, IRQ_VECTOR);
            }

            0x10 => self.branch(bus, !self.regs.p.is_set(N)),
            0x30 => self.branch(bus, self.regs.p.is_set(N)),
            0x50 => self.branch(bus, !self.regs.p.is_set(V)),
            0x70 => self.branch(bus, self.regs.p.is_set(V)),
            0x90 => self.branch(bus, !self.regs.p.is_set(C)),
            0xB0 => self.branch(bus, self.regs.p.is_set(C)),
            0xD0 => self.branch(bus, !self.regs.p.is_set(Z)),
            0xF0 => self.branch(bus, self.regs.p.is_set(Z)),

            // =================================================================
            // Undocumented: combined read-modify-write
            // =================================================================
            0x07 => self.modify(bus, Zp, Self::slo),
            0x17 => self.modify(bus, ZpX, Self::slo),
            0x0F => self.modify(bus, Abs, Self::slo),
            0x1F => self.modify(bus, AbsX, Self::slo),
            0x1B => self.modify(bus, AbsY, Self::slo),
            0x03 => self.modify(bus, IndX, Self::slo),
            0x13 => self.modify(bus, IndY, Self::slo),

            0x27 => self.modify(bus, Zp, Self::rla),
            0x37 => self.modify(bus, ZpX, Self::rla),
            0x2F => self.modify(bus, Abs, Self::rla),
            0x3F => self.modify(bus, AbsX, Self::rla),
            0x3B => self.modify(bus, AbsY, Self::rla),
            0x23 => self.modify(bus, IndX, Self::rla),
            0x33 => self.modify(bus, IndY, Self::rla),

            0x47 => self.modify(bus, Zp, Self::sre),
            0x57 => self.modify(bus, ZpX, Self::sre),
            0x4F => self.modify(bus, Abs, Self::sre),
            0x5F => self.modify(bus, AbsX, Self::sre),
            0x5B => self.modify(bus, AbsY, Self::sre),
            0x43 => self.modify(bus, IndX, Self::sre),
            0x53 => self.modify(bus, IndY, Self::sre),

            0x67 => self.modify(bus, Zp, Self::rra),
            0x77 => self.modify(bus, ZpX, Self::rra),
            0x6F => self.modify(bus, Abs, Self::rra),
            0x7F => self.modify(bus, AbsX, Self::rra),
            0x7B => self.modify(bus, AbsY, Self::rra),
            0x63 => self.modify(bus, IndX, Self::rra),
            0x73 => self.modify(bus, IndY, Self::rra),

            0xC7 => self.modify(bus, Zp, Self::dcp),
            0xD7 => self.modify(bus, ZpX, Self::dcp),
            0xCF => self.modify(bus, Abs, Self::dcp),
            0xDF => self.modify(bus, AbsX, Self::dcp),
            0xDB => self.modify(bus, AbsY, Self::dcp),
            0xC3 => self.modify(bus, IndX, Self::dcp),
            0xD3 => self.modify(bus, IndY, Self::dcp),

            0xE7 => self.modify(bus, Zp, Self::isc),
            0xF7 => self.modify(bus, ZpX, Self::isc),
            0xEF => self.modify(bus, Abs, Self::isc),
            0xFF => self.modify(bus, AbsX, Self::isc),
            0xFB => self.modify(bus, AbsY, Self::isc),
            0xE3 => self.modify(bus, IndX, Self::isc),
            0xF3 => self.modify(bus, IndY, Self::isc),

            // =================================================================
            // Undocumented: combined load / store
            // =================================================================
            0xA7 => self.load_with(bus, Zp, Self::lax),
            0xB7 => self.load_with(bus, ZpY, Self::lax),
            0xAF => self.load_with(bus, Abs, Self::lax),
            0xBF => self.load_with(bus, AbsY, Self::lax),
            0xA3 => self.load_with(bus, IndX, Self::lax),
            0xB3 => self.load_with(bus, IndY, Self::lax),

            0x87 => self.store(bus, Zp, self.regs.a & self.regs.x),
            0x97 => self.store(bus, ZpY, self.regs.a & self.regs.x),
            0x8F => self.store(bus, Abs, self.regs.a & self.regs.x),
            0x83 => self.store(bus, IndX, self.regs.a & self.regs.x),

            0xBB => self.load_with(bus, AbsY, Self::las),

            // =================================================================
            // Undocumented: immediate
            // =================================================================
            0x0B | 0x2B => self.load_with(bus, Imm, Self::anc),
            0x4B => self.load_with(bus, Imm, Self::alr),
            0x6B => self.load_with(bus, Imm, Self::arr),
            0x8B => self.load_with(bus, Imm, Self::ane),
            0xAB => self.load_with(bus, Imm, Self::lxa),
            0xCB => self.load_with(bus, Imm, Self::sbx),

            // =================================================================
            // Undocumented: unstable stores (value & (high byte + 1))
            // =================================================================
            0x93 => {
                let base = self.zero_page_pointer(bus);
                self.store_unstable(bus, base, self.regs.y, self.regs.a & self.regs.x);
            }
            0x9F => {
                let base = self.fetch_word(bus);
                self.store_unstable(bus, base, self.regs.y, self.regs.a & self.regs.x);
            }
            0x9E => {
                let base = self.fetch_word(bus);
                self.store_unstable(bus, base, self.regs.y, self.regs.x);
            }
            0x9C => {
                let base = self.fetch_word(bus);
                self.store_unstable(bus, base, self.regs.x, self.regs.y);
            }
            0x9B => {
                let base = self.fetch_word(bus);
                self.regs.s = self.regs.a & self.regs.x;
                self.store_unstable(bus, base, self.regs.y, self.regs.s);
            }

            // =================================================================
            // NOPs
            // =================================================================
            0xEA | 0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => self.implied(bus),
            0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => self.nop_read(bus, Imm),
            0x04 | 0x44 | 0x64 => self.nop_read(bus, Zp),
            0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => self.nop_read(bus, ZpX),
            0x0C => self.nop_read(bus, Abs),
            0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => self.nop_read(bus, AbsX),

            // =================================================================
            // JAM
            // =================================================================
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2
            | 0xF2 => self.jam(bus, opcode),
        }
    }

    // =========================================================================
    // Instruction shapes
    // =========================================================================

    fn load_with<B: Bus>(&mut self, bus: &mut B, mode: Mode, op: fn(&mut Self, u8)) {
        let address = self.read_address(bus, mode);
        let value = self.read(bus, address);
        op(self, value);
    }

    fn store<B: Bus>(&mut self, bus: &mut B, mode: Mode, value: u8) {
        let address = self.write_address(bus, mode);
        self.write(bus, address, value);
    }

    /// Read, write back the unmodified value, then write the result.
    fn modify<B: Bus>(&mut self, bus: &mut B, mode: Mode, op: fn(&mut Self, u8) -> u8) {
        let address = self.write_address(bus, mode);
        let value = self.read(bus, address);
        self.write(bus, address, value);
        let result = op(self, value);
        self.write(bus, address, result);
    }

    fn accumulator<B: Bus>(&mut self, bus: &mut B, op: fn(&mut Self, u8) -> u8) {
        self.implied(bus);
        let a = self.regs.a;
        self.regs.a = op(self, a);
    }

    fn register_op<B: Bus>(&mut self, bus: &mut B, op: impl FnOnce(&mut Self)) {
        self.implied(bus);
        op(self);
    }

    fn nop_read<B: Bus>(&mut self, bus: &mut B, mode: Mode) {
        let address = self.read_address(bus, mode);
        self.dummy_read(bus, address);
    }

    /// The two idle cycles before a pull: next opcode, then current stack
    /// slot.
    fn pre_pull<B: Bus>(&mut self, bus: &mut B) {
        self.implied(bus);
        let stack = self.regs.stack_addr();
        self.dummy_read(bus, stack);
    }

    /// SHA/SHX/SHY/TAS store.
    ///
    /// The value is ANDed with the base address high byte + 1, unless the
    /// CPU was held off the bus on the fix-up cycle, in which case the
    /// address term drops out. On a page cross the stored value also
    /// replaces the target high byte.
    fn store_unstable<B: Bus>(&mut self, bus: &mut B, base: u16, index: u8, value: u8) {
        let address = base.wrapping_add(u16::from(index));
        self.dummy_read(bus, (base & 0xFF00) | (address & 0x00FF));
        let data = if bus.held() {
            value
        } else {
            value & ((base >> 8) as u8).wrapping_add(1)
        };
        let target = if crosses_page(base, address) {
            (u16::from(data) << 8) | (address & 0x00FF)
        } else {
            address
        };
        self.write(bus, target, data);
    }

    fn cmp_a(&mut self, value: u8) {
        self.compare(self.regs.a, value);
    }

    fn cmp_x(&mut self, value: u8) {
        self.compare(self.regs.x, value);
    }

    fn cmp_y(&mut self, value: u8) {
        self.compare(self.regs.y, value);
    }

    fn lax(&mut self, value: u8) {
        self.load_a(value);
        self.regs.x = value;
    }
}
