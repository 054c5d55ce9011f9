//! Arithmetic, logic and shift operations.

use crate::decimal::{self, ADC_LOW, SBC_LOW};
use crate::flags::{C, D, N, V, Z};
use crate::{ANE_MAGIC, LXA_MAGIC, Mos6502};

impl Mos6502 {
    fn carry(&self) -> bool {
        self.regs.p.is_set(C)
    }

    // =========================================================================
    // Add / subtract
    // =========================================================================

    pub(crate) fn adc(&mut self, value: u8) {
        if self.regs.p.is_set(D) {
            self.adc_decimal(value);
        } else {
            self.adc_binary(value);
        }
    }

    fn adc_binary(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(value) + u16::from(self.carry());
        let result = sum as u8;
        self.regs.p.set_if(C, sum > 0xFF);
        self.regs.p.set_if(V, (a ^ result) & (value ^ result) & 0x80 != 0);
        self.regs.p.update_nz(result);
        self.regs.a = result;
    }

    /// NMOS decimal add. Z comes from the binary sum; N and V come from the
    /// sum after the low digit is corrected but before the high digit is.
    fn adc_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = self.carry();
        let binary = a.wrapping_add(value).wrapping_add(u8::from(carry));

        let low = u16::from(ADC_LOW[decimal::index(carry, a, value)]);
        let mut sum = low + u16::from(a & 0xF0) + u16::from(value & 0xF0);

        self.regs.p.set_if(Z, binary == 0);
        self.regs.p.set_if(N, sum & 0x80 != 0);
        self.regs.p.set_if(
            V,
            (u16::from(a) ^ sum) & 0x80 != 0 && (a ^ value) & 0x80 == 0,
        );
        if sum & 0x1F0 > 0x90 {
            sum += 0x60;
        }
        self.regs.p.set_if(C, sum & 0xFF0 > 0xF0);
        self.regs.a = sum as u8;
    }

    pub(crate) fn sbc(&mut self, value: u8) {
        let a = self.regs.a;
        let borrow = !self.carry();
        let diff = u16::from(a)
            .wrapping_sub(u16::from(value))
            .wrapping_sub(u16::from(borrow));
        let result = diff as u8;

        // Flags always come from the binary difference on NMOS.
        self.regs.p.set_if(C, diff < 0x100);
        self.regs.p.set_if(V, (a ^ result) & (a ^ value) & 0x80 != 0);
        self.regs.p.update_nz(result);

        self.regs.a = if self.regs.p.is_set(D) {
            Self::sbc_decimal_result(a, value, borrow)
        } else {
            result
        };
    }

    fn sbc_decimal_result(a: u8, value: u8, borrow: bool) -> u8 {
        let low = SBC_LOW[decimal::index(borrow, a, value)];
        let mut high = u16::from(a & 0xF0).wrapping_sub(u16::from(value & 0xF0));
        if low & 0x10 != 0 {
            high = high.wrapping_sub(0x10);
        }
        let mut result = u16::from(low & 0x0F) | high;
        if result & 0x100 != 0 {
            result = result.wrapping_sub(0x60);
        }
        result as u8
    }

    pub(crate) fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.regs.p.set_if(C, register >= value);
        self.regs.p.update_nz(result);
    }

    // =========================================================================
    // Logic
    // =========================================================================

    pub(crate) fn and(&mut self, value: u8) {
        self.regs.a &= value;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn ora(&mut self, value: u8) {
        self.regs.a |= value;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn eor(&mut self, value: u8) {
        self.regs.a ^= value;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn bit(&mut self, value: u8) {
        self.regs.p.set_if(Z, self.regs.a & value == 0);
        self.regs.p.set_if(N, value & 0x80 != 0);
        self.regs.p.set_if(V, value & 0x40 != 0);
    }

    pub(crate) fn load_a(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.update_nz(value);
    }

    pub(crate) fn load_x(&mut self, value: u8) {
        self.regs.x = value;
        self.regs.p.update_nz(value);
    }

    pub(crate) fn load_y(&mut self, value: u8) {
        self.regs.y = value;
        self.regs.p.update_nz(value);
    }

    // =========================================================================
    // Shifts and increments (read-modify-write bodies)
    // =========================================================================

    pub(crate) fn asl(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.regs.p.set_if(C, value & 0x80 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn lsr(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.regs.p.set_if(C, value & 0x01 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn rol(&mut self, value: u8) -> u8 {
        let result = (value << 1) | u8::from(self.carry());
        self.regs.p.set_if(C, value & 0x80 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn ror(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (u8::from(self.carry()) << 7);
        self.regs.p.set_if(C, value & 0x01 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }

    // =========================================================================
    // Undocumented combinations
    // =========================================================================

    /// SLO: ASL memory, then ORA.
    pub(crate) fn slo(&mut self, value: u8) -> u8 {
        let result = self.asl(value);
        self.ora(result);
        result
    }

    /// RLA: ROL memory, then AND.
    pub(crate) fn rla(&mut self, value: u8) -> u8 {
        let result = self.rol(value);
        self.and(result);
        result
    }

    /// SRE: LSR memory, then EOR.
    pub(crate) fn sre(&mut self, value: u8) -> u8 {
        let result = self.lsr(value);
        self.eor(result);
        result
    }

    /// RRA: ROR memory, then ADC (decimal mode applies).
    pub(crate) fn rra(&mut self, value: u8) -> u8 {
        let result = self.ror(value);
        self.adc(result);
        result
    }

    /// DCP: DEC memory, then CMP.
    pub(crate) fn dcp(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.compare(self.regs.a, result);
        result
    }

    /// ISC: INC memory, then SBC (decimal mode applies).
    pub(crate) fn isc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.sbc(result);
        result
    }

    /// ANC: AND, then copy N into C.
    pub(crate) fn anc(&mut self, value: u8) {
        self.and(value);
        self.regs.p.set_if(C, self.regs.a & 0x80 != 0);
    }

    /// ALR: AND, then LSR A.
    pub(crate) fn alr(&mut self, value: u8) {
        let masked = self.regs.a & value;
        self.regs.a = self.lsr(masked);
    }

    /// ARR: AND, then ROR A with the adder's flag side effects.
    ///
    /// In decimal mode the ROR result is additionally BCD-fixed per digit,
    /// with C taken from the high-digit fix.
    pub(crate) fn arr(&mut self, value: u8) {
        let masked = self.regs.a & value;
        let carry_in = u8::from(self.carry()) << 7;
        let rotated = (masked >> 1) | carry_in;

        if !self.regs.p.is_set(D) {
            self.regs.p.update_nz(rotated);
            self.regs.p.set_if(C, rotated & 0x40 != 0);
            self.regs.p.set_if(V, ((rotated >> 6) ^ (rotated >> 5)) & 0x01 != 0);
            self.regs.a = rotated;
            return;
        }

        self.regs.p.set_if(N, carry_in != 0);
        self.regs.p.set_if(Z, rotated == 0);
        self.regs.p.set_if(V, (rotated ^ masked) & 0x40 != 0);

        let mut result = rotated;
        if (masked & 0x0F) + (masked & 0x01) > 0x05 {
            result = (result & 0xF0) | (result.wrapping_add(0x06) & 0x0F);
        }
        let high_fix = u16::from(masked & 0xF0) + u16::from(masked & 0x10) > 0x50;
        if high_fix {
            result = (result & 0x0F) | (result.wrapping_add(0x60) & 0xF0);
        }
        self.regs.p.set_if(C, high_fix);
        self.regs.a = result;
    }

    /// SBX: X = (A & X) - operand, flags as CMP.
    pub(crate) fn sbx(&mut self, value: u8) {
        let masked = self.regs.a & self.regs.x;
        self.regs.p.set_if(C, masked >= value);
        self.regs.x = masked.wrapping_sub(value);
        self.regs.p.update_nz(self.regs.x);
    }

    /// LAS: A, X and S all become operand & S.
    pub(crate) fn las(&mut self, value: u8) {
        let result = value & self.regs.s;
        self.regs.a = result;
        self.regs.x = result;
        self.regs.s = result;
        self.regs.p.update_nz(result);
    }

    /// ANE (XAA): A = (A | magic) & X & operand.
    pub(crate) fn ane(&mut self, value: u8) {
        self.regs.a = (self.regs.a | ANE_MAGIC) & self.regs.x & value;
        self.regs.p.update_nz(self.regs.a);
    }

    /// LXA: A = X = (A | magic) & operand.
    pub(crate) fn lxa(&mut self, value: u8) {
        let result = (self.regs.a | LXA_MAGIC) & value;
        self.regs.a = result;
        self.regs.x = result;
        self.regs.p.update_nz(result);
    }
}
