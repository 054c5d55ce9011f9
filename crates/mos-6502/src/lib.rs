//! MOS 6502/6510 CPU, one instruction per `step()`.
//!
//! Every bus cycle the real chip performs is issued to the bus, including
//! the ones whose data is discarded (tagged [`AccessKind::Dummy`]). The
//! number of bus cycles per instruction is therefore exact by
//! construction, and a machine that clocks its other chips from inside the
//! bus sees the same access pattern as the hardware.
//!
//! The 6510's I/O port at $00/$01 is part of the memory map, not the CPU.
//!
//! # Undocumented opcodes
//!
//! All 256 opcodes are decoded:
//!
//! - Combined ops: LAX, SAX, DCP, ISC, SLO, SRE, RLA, RRA
//! - Immediate ops: ANC, ALR, ARR, SBX, ANE, LXA, and SBC #$EB
//! - LAS, plus the "unstable store" group SHA, SHX, SHY, TAS
//! - NOPs of every addressing mode, with their reads
//! - The twelve JAM opcodes, which lock the CPU until reset
//!
//! ANE and LXA depend on analogue chip behaviour. They are modelled as
//! `A = (A | MAGIC) & ...` with [`ANE_MAGIC`] and [`LXA_MAGIC`], the values
//! commonly measured on C64 machines.

mod addressing;
mod alu;
mod decimal;
mod execute;
pub mod flags;
mod registers;

use emu_core::{AccessKind, Bus, Cpu, Observable, Value};

pub use flags::Status;
pub use registers::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR, Registers};

/// Constant ORed into A by ANE (opcode $8B).
pub const ANE_MAGIC: u8 = 0xEF;
/// Constant ORed into A by LXA (opcode $AB).
pub const LXA_MAGIC: u8 = 0xEE;

/// Complete CPU state as flat fields, for save/restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpuState {
    pub registers: Registers,
    pub jammed: bool,
    pub total_cycles: u64,
}

/// The MOS 6502/6510 CPU.
pub struct Mos6502 {
    /// Register file.
    pub regs: Registers,
    /// Set by a JAM opcode; only `reset` clears it.
    jammed: bool,
    /// Bus cycles issued by the current `step`.
    cycles: u32,
    /// Bus cycles issued since construction.
    total_cycles: u64,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            jammed: false,
            cycles: 0,
            total_cycles: 0,
        }
    }

    /// Execute one instruction or take one interrupt.
    ///
    /// Interrupts are sampled once, before the opcode fetch. NMI wins over
    /// IRQ; IRQ is ignored while I is set. A jammed CPU issues one idle read
    /// per call and never retires an instruction.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.cycles = 0;

        if self.jammed {
            self.dummy_read(bus, 0xFFFF);
        } else if bus.take_nmi() {
            self.interrupt(bus, NMI_VECTOR);
        } else if bus.irq() && !self.regs.p.is_set(flags::I) {
            self.interrupt(bus, IRQ_VECTOR);
        } else {
            let opcode = self.fetch(bus);
            self.execute(bus, opcode);
        }

        self.total_cycles += u64::from(self.cycles);
        self.cycles
    }

    /// Reset sequence: 7 cycles, no writes.
    ///
    /// The three stack cycles are reads on the real chip, so memory is
    /// untouched. I is set, D is cleared, S ends at $FD.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.cycles = 0;
        self.jammed = false;
        let pc = self.regs.pc;
        self.dummy_read(bus, pc);
        self.dummy_read(bus, pc);
        self.dummy_read(bus, 0x01FF);
        self.dummy_read(bus, 0x01FE);
        self.dummy_read(bus, 0x01FD);
        self.regs.s = 0xFD;
        self.regs.p.set(flags::I);
        self.regs.p.clear(flags::D);
        self.regs.pc = self.read_vector(bus, RESET_VECTOR);
        self.total_cycles += u64::from(self.cycles);
    }

    /// Hardware interrupt sequence: 7 cycles.
    fn interrupt<B: Bus>(&mut self, bus: &mut B, vector: u16) {
        let pc = self.regs.pc;
        self.dummy_read(bus, pc);
        self.dummy_read(bus, pc);
        self.push_word(bus, pc);
        let p = self.regs.p.pushed_by_interrupt();
        self.push(bus, p);
        self.regs.p.set(flags::I);
        self.regs.pc = self.read_vector(bus, vector);
    }

    /// Lock up. The opcode fetch and one operand read have already happened
    /// on the real chip before the bus goes idle.
    fn jam<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        let pc = self.regs.pc;
        self.dummy_read(bus, pc);
        self.jammed = true;
        log::warn!(
            target: "cpu",
            "JAM opcode {opcode:#04X} at {:#06X}",
            pc.wrapping_sub(1)
        );
    }

    /// True once a JAM opcode has executed.
    #[must_use]
    pub fn jammed(&self) -> bool {
        self.jammed
    }

    /// Bus cycles issued since construction.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    #[must_use]
    pub fn snapshot(&self) -> CpuState {
        CpuState {
            registers: self.regs,
            jammed: self.jammed,
            total_cycles: self.total_cycles,
        }
    }

    pub fn restore(&mut self, state: &CpuState) {
        self.regs = state.registers;
        self.jammed = state.jammed;
        self.total_cycles = state.total_cycles;
        self.cycles = 0;
    }

    // =========================================================================
    // Bus access
    // =========================================================================

    fn read<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        self.cycles += 1;
        bus.read(address, AccessKind::Real)
    }

    fn dummy_read<B: Bus>(&mut self, bus: &mut B, address: u16) {
        self.cycles += 1;
        let _ = bus.read(address, AccessKind::Dummy);
    }

    fn write<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.cycles += 1;
        bus.write(address, value);
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = self.read(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn read_vector<B: Bus>(&mut self, bus: &mut B, vector: u16) -> u16 {
        let lo = self.read(bus, vector);
        let hi = self.read(bus, vector.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let address = self.regs.stack_addr();
        self.write(bus, address, value);
        self.regs.s = self.regs.s.wrapping_sub(1);
    }

    fn push_word<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull<B: Bus>(&mut self, bus: &mut B) -> u8 {
        self.regs.s = self.regs.s.wrapping_add(1);
        let address = self.regs.stack_addr();
        self.read(bus, address)
    }
}

impl Cpu for Mos6502 {
    type Registers = Registers;

    fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        Mos6502::step(self, bus)
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) {
        Mos6502::reset(self, bus);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_jammed(&self) -> bool {
        self.jammed
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        let p = self.regs.p;
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" => Some(self.regs.s.into()),
            "p" => Some(p.0.into()),
            "flags.n" => Some(p.is_set(flags::N).into()),
            "flags.v" => Some(p.is_set(flags::V).into()),
            "flags.d" => Some(p.is_set(flags::D).into()),
            "flags.i" => Some(p.is_set(flags::I).into()),
            "flags.z" => Some(p.is_set(flags::Z).into()),
            "flags.c" => Some(p.is_set(flags::C).into()),
            "jammed" => Some(self.jammed.into()),
            "cycles" => Some(self.total_cycles.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.n", "flags.v", "flags.d", "flags.i",
            "flags.z", "flags.c", "jammed", "cycles",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    #[test]
    fn reset_loads_vector_without_writing() {
        let mut bus = SimpleBus::new();
        bus.load(RESET_VECTOR, &[0x34, 0x12]);
        let mut cpu = Mos6502::new();
        cpu.regs.p = Status(flags::D | flags::U);

        cpu.reset(&mut bus);

        assert_eq!(cpu.regs.pc, 0x1234);
        assert_eq!(cpu.regs.s, 0xFD);
        assert!(cpu.regs.p.is_set(flags::I));
        assert!(!cpu.regs.p.is_set(flags::D));
        assert_eq!(bus.cycles(), 7);
        assert!(bus.log().iter().all(|&(_, _, write)| !write));
    }

    #[test]
    fn jammed_cpu_burns_one_cycle_per_step() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x02]);
        let mut cpu = Mos6502::new();
        cpu.regs.pc = 0x0200;

        assert_eq!(cpu.step(&mut bus), 2);
        assert!(cpu.jammed());
        let pc = cpu.regs.pc;
        for _ in 0..10 {
            assert_eq!(cpu.step(&mut bus), 1);
        }
        assert_eq!(cpu.regs.pc, pc, "a jammed CPU never retires");

        bus.load(RESET_VECTOR, &[0x00, 0x03]);
        cpu.reset(&mut bus);
        assert!(!cpu.jammed());
        assert_eq!(cpu.regs.pc, 0x0300);
    }

    #[test]
    fn jammed_cpu_ignores_interrupts() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x12]);
        let mut cpu = Mos6502::new();
        cpu.regs.pc = 0x0200;
        cpu.step(&mut bus);

        bus.nmi = true;
        cpu.step(&mut bus);
        assert!(cpu.jammed());
        assert_eq!(cpu.regs.s, 0xFD);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut cpu = Mos6502::new();
        cpu.regs.a = 0x42;
        cpu.regs.pc = 0xC000;
        let state = cpu.snapshot();

        let mut other = Mos6502::new();
        other.restore(&state);
        assert_eq!(other.regs, cpu.regs);
        assert_eq!(other.snapshot(), state);
    }

    #[test]
    fn observable_paths_resolve() {
        let cpu = Mos6502::new();
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path} should resolve");
        }
        assert_eq!(cpu.query("s"), Some(Value::U8(0xFD)));
    }
}
