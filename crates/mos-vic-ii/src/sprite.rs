//! Sprite sequencer state.
//!
//! Each sprite has a DMA flag, a display flag, the 6-bit MC/MCBASE data
//! counters and the Y expansion flip-flop. The three bytes fetched by the
//! s-accesses sit in a 24-bit shift register that starts shifting when the
//! beam reaches the sprite's X coordinate.

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sprite {
    pub dma: bool,
    pub display: bool,
    pub mc: u8,
    pub mcbase: u8,
    /// Y expansion flip-flop. Held set while MxYE is clear.
    pub expand_flop: bool,
    pub pointer: u8,
    pub data: [u8; 3],
    /// Data loaded this line and waiting for the X match.
    pub armed: bool,
    pub shifting: bool,
    /// Pixels output since the X match.
    pub offset: u8,
}

impl Sprite {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dma: false,
            display: false,
            mc: 0,
            mcbase: 0,
            expand_flop: true,
            pointer: 0,
            data: [0; 3],
            armed: false,
            shifting: false,
            offset: 0,
        }
    }

    /// DMA switch-on check of cycles 55 and 56.
    pub(crate) fn check_dma_on(&mut self, y_matches: bool, y_expand: bool) -> bool {
        if self.dma || !y_matches {
            return false;
        }
        self.dma = true;
        self.mcbase = 0;
        if y_expand {
            self.expand_flop = false;
        }
        true
    }

    /// Cycle 16: MCBASE follows MC when the flip-flop is set. Returns true
    /// if the sprite's DMA ends here.
    pub(crate) fn update_mcbase(&mut self) -> bool {
        if self.expand_flop {
            self.mcbase = self.mc & 0x3F;
        }
        if self.dma && self.mcbase == 63 {
            self.dma = false;
            return true;
        }
        false
    }

    /// One s-access: the byte at pointer*64 + MC.
    pub(crate) fn load(&mut self, index: usize, value: u8) {
        self.data[index] = value;
        self.mc = (self.mc + 1) & 0x3F;
        if index == 2 {
            self.armed = true;
        }
    }

    /// A $D017 write cleared MxYE while the flip-flop was reset. In cycle
    /// 15 this crunches MC. A crunched MCBASE off the multiples of 3 only
    /// reaches 63 after wrapping, so DMA can still be on at the next Y
    /// match and that reload is skipped.
    pub(crate) fn clear_y_expand(&mut self, cycle: u8) {
        if !self.expand_flop && cycle == 15 {
            self.mc = crunch(self.mc, self.mcbase);
        }
        self.expand_flop = true;
    }

    /// Colour code for the pixel at `x`: 0 transparent, 1-3 as the
    /// multicolour bit pair (hires pixels report 2).
    pub(crate) fn pixel(&mut self, x: u16, sprite_x: u16, expand_x: bool, multicolor: bool) -> u8 {
        if !self.display {
            return 0;
        }
        if self.armed && !self.shifting && x == sprite_x {
            self.armed = false;
            self.shifting = true;
            self.offset = 0;
        }
        if !self.shifting {
            return 0;
        }

        let position = if expand_x { self.offset / 2 } else { self.offset };
        let bits = u32::from_be_bytes([0, self.data[0], self.data[1], self.data[2]]);
        let code = if multicolor {
            ((bits >> (22 - (position & !1))) & 0x03) as u8
        } else if bits & (1 << (23 - position)) != 0 {
            2
        } else {
            0
        };

        self.offset += 1;
        if self.offset == if expand_x { 48 } else { 24 } {
            self.shifting = false;
        }
        code
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new()
    }
}

/// MC after a $D017 clear in cycle 15.
#[must_use]
pub const fn crunch(mc: u8, mcbase: u8) -> u8 {
    (0x2A & (mcbase & mc)) | (0x15 & (mcbase | mc))
}
