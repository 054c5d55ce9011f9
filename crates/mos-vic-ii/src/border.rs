//! Border unit: the main and vertical border flip-flops.
//!
//! The main flip-flop hides everything (graphics and sprites) behind the
//! border colour. The vertical flip-flop keeps the main one from being
//! reset at the left edge, which is how the top and bottom borders form.
//! Comparisons are against the X coordinate pixel by pixel and against the
//! raster line, so CSEL/RSEL changes only take effect when the beam
//! reaches a compare position.

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Border {
    pub main: bool,
    pub vertical: bool,
}

/// Left/right X compare values for CSEL = 1 (40 columns) and 0 (38).
const fn horizontal(csel: bool) -> (u16, u16) {
    if csel { (24, 344) } else { (31, 335) }
}

/// Top/bottom line compare values for RSEL = 1 (25 rows) and 0 (24).
const fn vertical(rsel: bool) -> (u16, u16) {
    if rsel { (51, 251) } else { (55, 247) }
}

impl Border {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            main: true,
            vertical: true,
        }
    }

    /// Update for the pixel at `x` on line `y`; returns whether the pixel
    /// is border.
    pub(crate) fn pixel(&mut self, x: u16, y: u16, csel: bool, rsel: bool, den: bool) -> bool {
        let (left, right) = horizontal(csel);
        if x == right {
            self.main = true;
        }
        if x == left {
            self.line_compare(y, rsel, den);
            if !self.vertical {
                self.main = false;
            }
        }
        self.main
    }

    /// Vertical compares done in the last cycle of the line.
    pub(crate) fn end_of_line(&mut self, y: u16, rsel: bool, den: bool) {
        self.line_compare(y, rsel, den);
    }

    fn line_compare(&mut self, y: u16, rsel: bool, den: bool) {
        let (top, bottom) = vertical(rsel);
        if y == bottom {
            self.vertical = true;
        } else if y == top && den {
            self.vertical = false;
        }
    }
}

impl Default for Border {
    fn default() -> Self {
        Self::new()
    }
}
