//! Per-line collision bitmap.
//!
//! Each cell holds the mask of sprites with an opaque pixel in that column
//! (bits 0-7) and whether the graphics pixel there is foreground (bit 8).
//! Graphics and sprites mark their cells separately; collisions are read
//! back from what the cell has accumulated. The bitmap is cleared at the
//! start of every line. Guard cells on both sides absorb columns outside
//! the line.

pub(crate) const FOREGROUND: u16 = 0x100;
const GUARD: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionLine {
    cells: Vec<u16>,
}

/// Collisions found in one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hits {
    /// Sprites involved in a sprite-sprite collision.
    pub sprite_sprite: u8,
    /// Sprites touching foreground graphics.
    pub sprite_background: u8,
}

impl CollisionLine {
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            cells: vec![0; width + 2 * GUARD],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Foreground graphics at `x`.
    pub fn mark_foreground(&mut self, x: u16) {
        if let Some(cell) = self.cells.get_mut(usize::from(x) + GUARD) {
            *cell |= FOREGROUND;
        }
    }

    /// Opaque pixels of `sprites` at `x`. Reports everything the cell now
    /// holds.
    pub fn mark_sprites(&mut self, x: u16, sprites: u8) -> Hits {
        let Some(cell) = self.cells.get_mut(usize::from(x) + GUARD) else {
            return Hits::default();
        };
        *cell |= u16::from(sprites);
        let present = (*cell & 0xFF) as u8;
        Hits {
            sprite_sprite: if present.count_ones() >= 2 { present } else { 0 },
            sprite_background: if *cell & FOREGROUND != 0 { present } else { 0 },
        }
    }

    /// Cell contents at `x`.
    #[must_use]
    pub fn at(&self, x: u16) -> u16 {
        self.cells.get(usize::from(x) + GUARD).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// Load cells saved with [`cells`](Self::cells).
    pub fn load(&mut self, cells: &[u16]) {
        self.clear();
        for (dst, src) in self.cells.iter_mut().zip(cells) {
            *dst = *src;
        }
    }
}
