//! Graphics data sequencer: turns one g-access into 8 pixels.

/// Display mode from the ECM, BMM and MCM bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsMode {
    StandardText,
    MulticolorText,
    StandardBitmap,
    MulticolorBitmap,
    ExtendedColorText,
    /// ECM+MCM text.
    InvalidText,
    /// ECM+BMM.
    InvalidBitmap,
    /// ECM+BMM+MCM.
    InvalidMulticolorBitmap,
}

impl GraphicsMode {
    #[must_use]
    pub const fn from_bits(ecm: bool, bmm: bool, mcm: bool) -> Self {
        match (ecm, bmm, mcm) {
            (false, false, false) => Self::StandardText,
            (false, false, true) => Self::MulticolorText,
            (false, true, false) => Self::StandardBitmap,
            (false, true, true) => Self::MulticolorBitmap,
            (true, false, false) => Self::ExtendedColorText,
            (true, false, true) => Self::InvalidText,
            (true, true, false) => Self::InvalidBitmap,
            (true, true, true) => Self::InvalidMulticolorBitmap,
        }
    }

    #[must_use]
    pub const fn is_bitmap(self) -> bool {
        matches!(
            self,
            Self::StandardBitmap
                | Self::MulticolorBitmap
                | Self::InvalidBitmap
                | Self::InvalidMulticolorBitmap
        )
    }

    #[must_use]
    pub const fn is_ecm(self) -> bool {
        matches!(
            self,
            Self::ExtendedColorText
                | Self::InvalidText
                | Self::InvalidBitmap
                | Self::InvalidMulticolorBitmap
        )
    }
}

/// One graphics pixel: palette index and whether it counts as foreground
/// for sprite priority and collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pixel {
    pub colour: u8,
    pub foreground: bool,
}

impl Pixel {
    #[must_use]
    pub const fn background(colour: u8) -> Self {
        Self {
            colour,
            foreground: false,
        }
    }
}

/// Decode one cell. `matrix` and `colour` are the c-access data (zero in
/// idle state), `background` is $D021-$D024.
#[must_use]
pub fn decode(
    mode: GraphicsMode,
    data: u8,
    matrix: u8,
    colour: u8,
    background: [u8; 4],
) -> [Pixel; 8] {
    let colour = colour & 0x0F;
    let hi = matrix >> 4;
    let lo = matrix & 0x0F;

    match mode {
        GraphicsMode::StandardText => hires(data, colour, background[0]),
        GraphicsMode::ExtendedColorText => {
            hires(data, colour, background[usize::from(matrix >> 6)])
        }
        GraphicsMode::StandardBitmap => hires(data, hi, lo),
        GraphicsMode::MulticolorText if colour & 0x08 == 0 => {
            hires(data, colour & 0x07, background[0])
        }
        GraphicsMode::MulticolorText => multicolor(
            data,
            [background[0], background[1], background[2], colour & 0x07],
        ),
        GraphicsMode::MulticolorBitmap => multicolor(data, [background[0], hi, lo, colour]),
        GraphicsMode::InvalidText if colour & 0x08 == 0 => black(hires(data, 0, 0)),
        GraphicsMode::InvalidText | GraphicsMode::InvalidMulticolorBitmap => {
            black(multicolor(data, [0; 4]))
        }
        GraphicsMode::InvalidBitmap => black(hires(data, 0, 0)),
    }
}

fn hires(data: u8, fg: u8, bg: u8) -> [Pixel; 8] {
    std::array::from_fn(|px| {
        if data & (0x80 >> px) != 0 {
            Pixel {
                colour: fg,
                foreground: true,
            }
        } else {
            Pixel::background(bg)
        }
    })
}

/// Bit pairs 00 and 01 are background for priority and collisions.
fn multicolor(data: u8, colours: [u8; 4]) -> [Pixel; 8] {
    std::array::from_fn(|px| {
        let pair = (data >> (6 - (px & !1))) & 0x03;
        Pixel {
            colour: colours[usize::from(pair)],
            foreground: pair & 0x02 != 0,
        }
    })
}

fn black(pixels: [Pixel; 8]) -> [Pixel; 8] {
    pixels.map(|p| Pixel { colour: 0, ..p })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: [u8; 4] = [6, 2, 5, 7];

    fn colours(pixels: &[Pixel; 8]) -> [u8; 8] {
        pixels.map(|p| p.colour)
    }

    fn foreground(pixels: &[Pixel; 8]) -> [bool; 8] {
        pixels.map(|p| p.foreground)
    }

    #[test]
    fn standard_text() {
        let p = decode(GraphicsMode::StandardText, 0b1100_0001, 0x41, 0x0E, BG);
        assert_eq!(colours(&p), [14, 14, 6, 6, 6, 6, 6, 14]);
    }

    #[test]
    fn extended_colour_text_picks_background_from_code() {
        let p = decode(GraphicsMode::ExtendedColorText, 0x00, 0xC1, 0x01, BG);
        assert_eq!(colours(&p), [7; 8]);
        let p = decode(GraphicsMode::ExtendedColorText, 0x00, 0x41, 0x01, BG);
        assert_eq!(colours(&p), [2; 8]);
    }

    #[test]
    fn multicolour_text_bit3_selects_mode() {
        let p = decode(GraphicsMode::MulticolorText, 0b0001_1011, 0, 0x05, BG);
        assert_eq!(colours(&p), [6, 6, 6, 5, 5, 6, 5, 5], "hires with colour & 7");

        let p = decode(GraphicsMode::MulticolorText, 0b0001_1011, 0, 0x0D, BG);
        assert_eq!(colours(&p), [6, 6, 2, 2, 5, 5, 5, 5]);
        assert_eq!(
            foreground(&p),
            [false, false, false, false, true, true, true, true],
            "01 is background"
        );
    }

    #[test]
    fn bitmaps_take_colours_from_matrix() {
        let p = decode(GraphicsMode::StandardBitmap, 0xF0, 0x3A, 0, BG);
        assert_eq!(colours(&p), [3, 3, 3, 3, 10, 10, 10, 10]);

        let p = decode(GraphicsMode::MulticolorBitmap, 0b0001_1011, 0x3A, 0x09, BG);
        assert_eq!(colours(&p), [6, 6, 3, 3, 10, 10, 9, 9]);
    }

    #[test]
    fn invalid_modes_are_black_but_keep_foreground() {
        let p = decode(GraphicsMode::InvalidBitmap, 0xAA, 0x3A, 0x0F, BG);
        assert_eq!(colours(&p), [0; 8]);
        assert_eq!(
            foreground(&p),
            [true, false, true, false, true, false, true, false]
        );
    }

    #[test]
    fn mode_bits() {
        assert_eq!(GraphicsMode::from_bits(false, true, true), GraphicsMode::MulticolorBitmap);
        assert!(GraphicsMode::from_bits(true, true, false).is_bitmap());
        assert!(!GraphicsMode::from_bits(false, false, true).is_ecm());
    }
}
