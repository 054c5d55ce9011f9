//! Decimal mode, including the NMOS flag quirks on invalid operands.

use emu_core::SimpleBus;
use mos_6502::{Mos6502, flags};

/// Run `SED; ADC #operand` or `SED; SBC #operand` from a given A and C.
fn decimal_op(opcode: u8, a: u8, operand: u8, carry: bool) -> Mos6502 {
    let mut bus = SimpleBus::new();
    bus.load(0x0200, &[0xF8, opcode, operand]);
    let mut cpu = Mos6502::new();
    cpu.regs.pc = 0x0200;
    cpu.regs.a = a;
    cpu.regs.p.set_if(flags::C, carry);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu
}

fn flag(cpu: &Mos6502, f: u8) -> bool {
    cpu.regs.p.is_set(f)
}

#[test]
fn adc_valid_bcd() {
    let cpu = decimal_op(0x69, 0x15, 0x27, false);
    assert_eq!(cpu.regs.a, 0x42);
    assert!(!flag(&cpu, flags::C));

    let cpu = decimal_op(0x69, 0x58, 0x46, true);
    assert_eq!(cpu.regs.a, 0x05);
    assert!(flag(&cpu, flags::C));
}

#[test]
fn adc_99_plus_01_sets_n_but_not_z() {
    let cpu = decimal_op(0x69, 0x99, 0x01, false);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(flag(&cpu, flags::C));
    assert!(!flag(&cpu, flags::Z), "Z follows the binary sum $9A");
    assert!(flag(&cpu, flags::N), "N follows the half-corrected sum $A0");
    assert!(!flag(&cpu, flags::V));
}

#[test]
fn adc_invalid_low_digit() {
    // $0F + $01: low digit $10 corrects to $16.
    let cpu = decimal_op(0x69, 0x0F, 0x01, false);
    assert_eq!(cpu.regs.a, 0x16);
    assert!(!flag(&cpu, flags::C));
}

#[test]
fn adc_invalid_both_digits() {
    // $FF + $FF + 1: low $1F -> $25 digit 5 carry; high $F0+$F0+$10 = $1F0
    // -> +$60 = $250: A = $55, C set.
    let cpu = decimal_op(0x69, 0xFF, 0xFF, true);
    assert_eq!(cpu.regs.a, 0x55);
    assert!(flag(&cpu, flags::C));
    assert!(!flag(&cpu, flags::Z));
}

#[test]
fn adc_overflow_from_intermediate() {
    // $79 + $10 = $89: sign changes from + to - without operand sign change.
    let cpu = decimal_op(0x69, 0x79, 0x10, false);
    assert_eq!(cpu.regs.a, 0x89);
    assert!(flag(&cpu, flags::V));
    assert!(flag(&cpu, flags::N));
}

#[test]
fn sbc_valid_bcd() {
    let cpu = decimal_op(0xE9, 0x42, 0x15, true);
    assert_eq!(cpu.regs.a, 0x27);
    assert!(flag(&cpu, flags::C));
}

#[test]
fn sbc_borrow_wraps_to_99() {
    let cpu = decimal_op(0xE9, 0x00, 0x01, true);
    assert_eq!(cpu.regs.a, 0x99);
    assert!(!flag(&cpu, flags::C));
    assert!(flag(&cpu, flags::N), "N follows the binary result $FF");
    assert!(!flag(&cpu, flags::Z));
}

#[test]
fn sbc_flags_come_from_binary_difference() {
    // $20 - $20 with borrow in: binary $FF.
    let cpu = decimal_op(0xE9, 0x20, 0x20, false);
    assert_eq!(cpu.regs.a, 0x99);
    assert!(!flag(&cpu, flags::Z));
    assert!(!flag(&cpu, flags::C));
}

#[test]
fn sbc_invalid_digits() {
    // $1A - $00: no borrow out of the low digit, so $1A stays uncorrected.
    let cpu = decimal_op(0xE9, 0x1A, 0x00, true);
    assert_eq!(cpu.regs.a, 0x1A);
    assert!(flag(&cpu, flags::C));
}

#[test]
fn arr_decimal_fixes_digits() {
    // A & op = $FF, C=0: ROR gives $7F; low fix ($F+1 > 5) -> $75,
    // high fix ($F0+$10 > $50) -> $D5 with C set.
    let cpu = decimal_op(0x6B, 0xFF, 0xFF, false);
    assert_eq!(cpu.regs.a, 0xD5);
    assert!(flag(&cpu, flags::C));
    assert!(!flag(&cpu, flags::N), "N is the incoming carry");
    assert!(!flag(&cpu, flags::V), "bit 6 unchanged across the rotate");
}

#[test]
fn isc_uses_decimal_subtract() {
    let mut bus = SimpleBus::new();
    bus.load(0x0200, &[0xF8, 0xE7, 0x10]);
    bus.poke(0x0010, 0x09);
    let mut cpu = Mos6502::new();
    cpu.regs.pc = 0x0200;
    cpu.regs.a = 0x20;
    cpu.regs.p.set(flags::C);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(bus.peek(0x0010), 0x0A);
    // $20 - $0A in decimal: low 0 - A borrows -> (-10-6)&F = 0, high 2-0-1 = 1.
    assert_eq!(cpu.regs.a, 0x10);
}
