//! Output side: where finished scanlines go.

use crate::timing::{VISIBLE_WIDTH, VicModel};

/// Receiver of finished scanlines.
///
/// `pixels` holds palette indices (0-15). `first_x` is the X coordinate of
/// the leftmost pixel.
pub trait PixelSink {
    fn scanline(&mut self, y: u16, first_x: u16, pixels: &[u8]);
}

/// VICE PAL palette as ARGB32, for sinks that want RGB.
pub const PALETTE: [u32; 16] = [
    0xFF00_0000, // black
    0xFFFF_FFFF, // white
    0xFF88_3932, // red
    0xFF67_B6BD, // cyan
    0xFF8B_3F96, // purple
    0xFF55_A049, // green
    0xFF40_318D, // blue
    0xFFBF_CE72, // yellow
    0xFF8B_5429, // orange
    0xFF57_4200, // brown
    0xFFB8_6962, // light red
    0xFF50_5050, // dark grey
    0xFF78_7878, // medium grey
    0xFF94_E089, // light green
    0xFF78_68C0, // light blue
    0xFF9F_9F9F, // light grey
];

/// A whole visible frame of palette indices.
pub struct FrameBuffer {
    first_line: u16,
    height: usize,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(model: VicModel) -> Self {
        let height = model.visible_height();
        Self {
            first_line: model.visible_lines().0,
            height,
            pixels: vec![0; VISIBLE_WIDTH * height],
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        VISIBLE_WIDTH
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Palette index at framebuffer coordinates.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * VISIBLE_WIDTH + x]
    }

    /// The frame as ARGB32.
    #[must_use]
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels
            .iter()
            .map(|&c| PALETTE[usize::from(c & 0x0F)])
            .collect()
    }
}

impl PixelSink for FrameBuffer {
    fn scanline(&mut self, y: u16, _first_x: u16, pixels: &[u8]) {
        let Some(row) = y.checked_sub(self.first_line).map(usize::from) else {
            return;
        };
        if row >= self.height {
            return;
        }
        let start = row * VISIBLE_WIDTH;
        let len = pixels.len().min(VISIBLE_WIDTH);
        self.pixels[start..start + len].copy_from_slice(&pixels[..len]);
    }
}
