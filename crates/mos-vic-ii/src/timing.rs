//! Per-model raster geometry.
//!
//! Cycles are numbered from 1 as in the chip documentation, so a PAL line
//! runs cycles 1-63. Each cycle covers 8 pixels; the X coordinate of the
//! first pixel of cycle 16 (the first graphics fetch) is 24.

/// First and last cycle forwarded to the pixel sink (inclusive).
pub const FIRST_VISIBLE_CYCLE: u8 = 10;
pub const LAST_VISIBLE_CYCLE: u8 = 61;

/// Width of a forwarded scanline in pixels.
pub const VISIBLE_WIDTH: usize = (LAST_VISIBLE_CYCLE - FIRST_VISIBLE_CYCLE + 1) as usize * 8;

/// Lines on which a badline can occur.
pub const FIRST_DMA_LINE: u16 = 0x30;
pub const LAST_DMA_LINE: u16 = 0xF7;

/// Cycles carrying c-accesses on a badline, and g-accesses on any line.
pub const FIRST_C_ACCESS: u8 = 15;
pub const LAST_C_ACCESS: u8 = 54;
pub const FIRST_G_ACCESS: u8 = 16;
pub const LAST_G_ACCESS: u8 = 55;

/// VIC-II variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VicModel {
    /// 6569: 63 cycles x 312 lines.
    #[default]
    Pal,
    /// 6567R8: 65 cycles x 263 lines.
    Ntsc,
}

impl VicModel {
    #[must_use]
    pub const fn cycles_per_line(self) -> u8 {
        match self {
            Self::Pal => 63,
            Self::Ntsc => 65,
        }
    }

    #[must_use]
    pub const fn lines_per_frame(self) -> u16 {
        match self {
            Self::Pal => 312,
            Self::Ntsc => 263,
        }
    }

    #[must_use]
    pub const fn ticks_per_frame(self) -> u32 {
        self.cycles_per_line() as u32 * self.lines_per_frame() as u32
    }

    /// System clock (phi2) in Hz.
    #[must_use]
    pub const fn clock_hz(self) -> u64 {
        match self {
            Self::Pal => 985_248,
            Self::Ntsc => 1_022_727,
        }
    }

    /// Mains frequency feeding the CIA TOD pins on this machine.
    #[must_use]
    pub const fn mains_hz(self) -> u64 {
        match self {
            Self::Pal => 50,
            Self::Ntsc => 60,
        }
    }

    /// Cycle of each sprite's pointer fetch; the three data bytes follow in
    /// this cycle and the next.
    #[must_use]
    pub const fn sprite_slots(self) -> [u8; 8] {
        match self {
            Self::Pal => [58, 60, 62, 1, 3, 5, 7, 9],
            Self::Ntsc => [58, 60, 62, 64, 1, 3, 5, 7],
        }
    }

    /// First and last raster line forwarded to the pixel sink (inclusive).
    #[must_use]
    pub const fn visible_lines(self) -> (u16, u16) {
        match self {
            Self::Pal => (16, 299),
            Self::Ntsc => (27, 260),
        }
    }

    /// Number of forwarded lines per frame.
    #[must_use]
    pub const fn visible_height(self) -> usize {
        let (first, last) = self.visible_lines();
        (last - first + 1) as usize
    }

    /// X coordinate of pixel `px` of cycle `cycle`, wrapped to the line.
    #[must_use]
    pub const fn x_coordinate(self, cycle: u8, px: u8) -> u16 {
        let wrap = self.cycles_per_line() as i32 * 8;
        let x = (cycle as i32 - 16) * 8 + 24 + px as i32;
        x.rem_euclid(wrap) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pal_frame_is_19656_ticks() {
        assert_eq!(VicModel::Pal.ticks_per_frame(), 19_656);
        assert_eq!(VicModel::Ntsc.ticks_per_frame(), 17_095);
    }

    #[test]
    fn x_coordinate_wraps_at_line_width() {
        let pal = VicModel::Pal;
        assert_eq!(pal.x_coordinate(16, 0), 24);
        assert_eq!(pal.x_coordinate(56, 0), 344);
        assert_eq!(pal.x_coordinate(13, 0), 0);
        assert_eq!(pal.x_coordinate(12, 7), 503);
        assert_eq!(VicModel::Ntsc.x_coordinate(12, 7), 519);
    }

    #[test]
    fn visible_width_is_416() {
        assert_eq!(VISIBLE_WIDTH, 416);
        assert_eq!(VicModel::Pal.visible_height(), 284);
    }
}
