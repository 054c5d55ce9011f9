//! Decimal-mode correction tables.
//!
//! The NMOS 6502 corrects the low BCD digit with a half-carry network that
//! works on any nibble, valid BCD or not. Each table is indexed by
//! `carry_in << 8 | a_low << 4 | operand_low` and holds the corrected low
//! digit in bits 0-3 with the digit carry (ADC) or borrow (SBC) in bit 4.
//! The high digit is corrected in `alu.rs`, where the NMOS N/V/Z quirks are
//! taken from the intermediate values.

/// Low-digit result of a decimal ADC; index carry bit is C.
pub(crate) static ADC_LOW: [u8; 512] = build_adc_low();

/// Low-digit result of a decimal SBC; index carry bit is the borrow (!C).
pub(crate) static SBC_LOW: [u8; 512] = build_sbc_low();

const fn build_adc_low() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut i = 0;
    while i < 512 {
        let carry = (i >> 8) as u8;
        let a = ((i >> 4) & 0x0F) as u8;
        let b = (i & 0x0F) as u8;
        let mut sum = a + b + carry;
        if sum > 9 {
            sum += 6;
        }
        table[i] = if sum > 0x0F { (sum & 0x0F) | 0x10 } else { sum };
        i += 1;
    }
    table
}

const fn build_sbc_low() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut i = 0;
    while i < 512 {
        let borrow = (i >> 8) as i16;
        let a = ((i >> 4) & 0x0F) as i16;
        let b = (i & 0x0F) as i16;
        let diff = a - b - borrow;
        table[i] = if diff < 0 {
            (((diff - 6) & 0x0F) as u8) | 0x10
        } else {
            diff as u8
        };
        i += 1;
    }
    table
}

/// Table index for a digit pair.
pub(crate) const fn index(carry: bool, a: u8, b: u8) -> usize {
    ((carry as usize) << 8) | (((a & 0x0F) as usize) << 4) | (b & 0x0F) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_digits_add_like_bcd() {
        // 5 + 4 = 9, no carry
        assert_eq!(ADC_LOW[index(false, 5, 4)], 0x09);
        // 5 + 5 = 10 -> 0 carry 1
        assert_eq!(ADC_LOW[index(false, 5, 5)], 0x10);
        // 9 + 9 + 1 = 19 -> 9 carry 1
        assert_eq!(ADC_LOW[index(true, 9, 9)], 0x19);
    }

    #[test]
    fn invalid_digits_follow_the_correction_network() {
        // $F + $F + 1 = $1F, +6 = $25: digit 5, carry out
        assert_eq!(ADC_LOW[index(true, 0x0F, 0x0F)], 0x15);
        // $A + 0: 10 > 9 so +6 = $10
        assert_eq!(ADC_LOW[index(false, 0x0A, 0x00)], 0x10);
    }

    #[test]
    fn subtract_borrows_and_corrects() {
        assert_eq!(SBC_LOW[index(false, 7, 3)], 0x04);
        // 0 - 1 -> 9 borrow
        assert_eq!(SBC_LOW[index(false, 0, 1)], 0x19);
        // 0 - 0 - borrow -> 9 borrow
        assert_eq!(SBC_LOW[index(true, 0, 0)], 0x19);
        // $F - 0 = $F, no correction without a borrow
        assert_eq!(SBC_LOW[index(false, 0x0F, 0)], 0x0F);
    }
}
