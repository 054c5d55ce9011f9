//! MOS 6569 (PAL) / 6567R8 (NTSC) VIC-II video chip.
//!
//! Cycle-stepped: each `tick` is one phi2 cycle and produces 8 pixels.
//! The chip tracks the raster beam, decides badlines, runs the
//! VC/VCBASE/RC display state machine, the 8 sprite DMA sequencers, the
//! border flip-flops and the collision bitmap, and raises raster and
//! collision interrupts.
//!
//! Bus takeover is not decided here. The chip exposes the badline state
//! and the sprite DMA mask, and the machine's bus arbiter turns those into
//! BA/AEC timing for the CPU.
//!
//! # Registers
//!
//! | Reg       | Function                                        |
//! |-----------|-------------------------------------------------|
//! | $00-$0F   | Sprite X/Y                                      |
//! | $10       | Sprite X bit 8                                  |
//! | $11       | Control 1: RST8, ECM, BMM, DEN, RSEL, YSCROLL   |
//! | $12       | Raster (read) / raster compare (write)          |
//! | $13-$14   | Light pen X/Y                                   |
//! | $15       | Sprite enable                                   |
//! | $16       | Control 2: MCM, CSEL, XSCROLL                   |
//! | $17       | Sprite Y expansion                              |
//! | $18       | Memory pointers                                 |
//! | $19       | Interrupt status (write 1 to acknowledge)       |
//! | $1A       | Interrupt enable                                |
//! | $1B       | Sprite priority                                 |
//! | $1C       | Sprite multicolour                              |
//! | $1D       | Sprite X expansion                              |
//! | $1E       | Sprite-sprite collision                         |
//! | $1F       | Sprite-background collision                     |
//! | $20-$2E   | Colours                                         |

mod border;
mod collision;
mod graphics;
mod sink;
mod sprite;
mod timing;

use emu_core::{Observable, Value};
use log::{debug, trace};

pub use border::Border;
pub use collision::{CollisionLine, Hits};
pub use graphics::{GraphicsMode, Pixel, decode};
pub use sink::{FrameBuffer, PALETTE, PixelSink};
pub use sprite::{Sprite, crunch};
pub use timing::{
    FIRST_C_ACCESS, FIRST_DMA_LINE, FIRST_G_ACCESS, FIRST_VISIBLE_CYCLE, LAST_C_ACCESS,
    LAST_DMA_LINE, LAST_G_ACCESS, LAST_VISIBLE_CYCLE, VISIBLE_WIDTH, VicModel,
};

/// Interrupt sources in $D019/$D01A.
pub const IRQ_RASTER: u8 = 0x01;
pub const IRQ_SPRITE_BACKGROUND: u8 = 0x02;
pub const IRQ_SPRITE_SPRITE: u8 = 0x04;
pub const IRQ_LIGHTPEN: u8 = 0x08;

/// Width of the graphics line buffer: 40 cells plus XSCROLL spill.
const GFX_WIDTH: usize = 40 * 8 + 8;

/// Memory as the VIC-II sees it.
pub trait VicMemory {
    /// Byte at a full 16-bit address; the bank is already in bits 14-15.
    fn vic_read(&self, address: u16) -> u8;

    /// Colour RAM nibble at `offset` ($000-$3FF).
    fn colour_read(&self, offset: u16) -> u8;
}

/// Flat copy of all chip state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VicState {
    pub regs: Vec<u8>,
    pub raster_y: u16,
    pub cycle: u8,
    pub raster_compare: u16,
    pub irq_status: u8,
    pub irq_enable: u8,
    pub den_latch: bool,
    pub badline: bool,
    pub badline_from: u8,
    pub display_state: bool,
    pub vc: u16,
    pub vcbase: u16,
    pub rc: u8,
    pub vmli: u8,
    pub matrix: Vec<u8>,
    pub colours: Vec<u8>,
    pub bank: u8,
    pub latched_bank: u8,
    pub latched_pointers: u8,
    pub sprites: Vec<Sprite>,
    pub border: Border,
    pub sprite_sprite: u8,
    pub sprite_background: u8,
    pub gfx_line: Vec<Option<Pixel>>,
    pub collisions: Vec<u16>,
    pub line_pixels: Vec<u8>,
    pub line_ready: bool,
    pub frame_complete: bool,
    pub frame_count: u64,
}

/// VIC-II chip.
pub struct Vic {
    model: VicModel,
    regs: [u8; 0x40],

    /// Current raster line.
    raster_y: u16,
    /// Current cycle, 1-based. Zero only before the first tick.
    cycle: u8,
    /// Raster compare ($D012 + bit 7 of $D011).
    raster_compare: u16,

    irq_status: u8,
    irq_enable: u8,

    /// DEN seen during line $30.
    den_latch: bool,
    badline: bool,
    /// First cycle the badline condition held on this line.
    badline_from: u8,
    display_state: bool,

    vc: u16,
    vcbase: u16,
    rc: u8,
    vmli: usize,
    /// Video matrix line: screen codes and colour nibbles from c-accesses.
    matrix: [u8; 40],
    colours: [u8; 40],

    /// Bank from CIA2, and the copy in use since the last re-latch.
    bank: u8,
    latched_bank: u8,
    /// $D018 as of the last re-latch.
    latched_pointers: u8,

    sprites: [Sprite; 8],
    border: Border,

    /// $D01E and $D01F.
    sprite_sprite: u8,
    sprite_background: u8,

    /// Graphics pixels for this line, positioned after XSCROLL.
    gfx_line: Vec<Option<Pixel>>,
    collisions: CollisionLine,

    line_pixels: Vec<u8>,
    line_ready: bool,
    frame_complete: bool,
    frame_count: u64,
}

impl Vic {
    #[must_use]
    pub fn new(model: VicModel) -> Self {
        Self {
            model,
            regs: [0; 0x40],
            raster_y: 0,
            cycle: 0,
            raster_compare: 0,
            irq_status: 0,
            irq_enable: 0,
            den_latch: false,
            badline: false,
            badline_from: 1,
            display_state: false,
            vc: 0,
            vcbase: 0,
            rc: 0,
            vmli: 0,
            matrix: [0; 40],
            colours: [0; 40],
            bank: 0,
            latched_bank: 0,
            latched_pointers: 0,
            sprites: std::array::from_fn(|_| Sprite::new()),
            border: Border::new(),
            sprite_sprite: 0,
            sprite_background: 0,
            gfx_line: vec![None; GFX_WIDTH],
            collisions: CollisionLine::new(usize::from(model.cycles_per_line()) * 8),
            line_pixels: vec![0; VISIBLE_WIDTH],
            line_ready: false,
            frame_complete: false,
            frame_count: 0,
        }
    }

    pub fn reset(&mut self) {
        let bank = self.bank;
        *self = Self::new(self.model);
        self.bank = bank;
        self.latched_bank = bank;
    }

    /// Advance one cycle.
    pub fn tick<M: VicMemory + ?Sized>(&mut self, memory: &M) {
        self.advance();
        let cycle = self.cycle;
        if cycle == 1 {
            self.start_line();
        }

        let compare_cycle = if self.raster_y == 0 { 2 } else { 1 };
        if cycle == compare_cycle && self.raster_y == self.raster_compare {
            self.raise(IRQ_RASTER);
        }

        if self.badline {
            self.display_state = true;
        }

        match cycle {
            14 => {
                self.vc = self.vcbase;
                self.vmli = 0;
                if self.badline {
                    self.rc = 0;
                    self.latch_pointers();
                }
            }
            16 => self.update_sprite_counters(),
            55 => {
                self.flip_expand_flops();
                self.check_sprite_dma();
            }
            56 => self.check_sprite_dma(),
            58 => self.end_of_row(),
            _ => {}
        }

        self.sprite_accesses(memory, cycle);
        if (FIRST_G_ACCESS..=LAST_G_ACCESS).contains(&cycle) {
            self.g_access(memory, cycle);
        }
        self.draw(cycle);
        if self.badline && (FIRST_C_ACCESS..=LAST_C_ACCESS).contains(&cycle) {
            self.c_access(memory, cycle);
        }

        if cycle == self.model.cycles_per_line() {
            let (rsel, den) = (self.rsel(), self.den());
            self.border.end_of_line(self.raster_y, rsel, den);
        }
    }

    fn advance(&mut self) {
        self.cycle += 1;
        if self.cycle <= self.model.cycles_per_line() {
            return;
        }
        self.cycle = 1;
        self.raster_y += 1;
        if self.raster_y == self.model.lines_per_frame() {
            self.raster_y = 0;
            self.frame_count += 1;
            self.frame_complete = true;
            debug!("vic: frame {} complete", self.frame_count);
        }
    }

    fn start_line(&mut self) {
        self.gfx_line.fill(None);
        self.collisions.clear();
        if self.raster_y == 0 {
            self.vcbase = 0;
            self.den_latch = false;
            self.latch_pointers();
        }
        if self.raster_y == FIRST_DMA_LINE && self.den() {
            self.den_latch = true;
        }
        self.badline = self.badline_condition();
        self.badline_from = 1;
    }

    fn badline_condition(&self) -> bool {
        self.den_latch
            && (FIRST_DMA_LINE..=LAST_DMA_LINE).contains(&self.raster_y)
            && self.raster_y & 7 == u16::from(self.regs[0x11] & 0x07)
    }

    fn latch_pointers(&mut self) {
        self.latched_pointers = self.regs[0x18];
        self.latched_bank = self.bank;
    }

    /// Cycle 58: end of a character row, and sprite display switch.
    fn end_of_row(&mut self) {
        if self.rc == 7 {
            self.vcbase = self.vc;
            if !self.badline {
                self.display_state = false;
            }
        }
        if self.display_state {
            self.rc = (self.rc + 1) & 7;
        }
        for sprite in &mut self.sprites {
            sprite.mc = sprite.mcbase;
            sprite.display = sprite.dma;
        }
    }

    // =========================================================================
    // Sprites
    // =========================================================================

    fn flip_expand_flops(&mut self) {
        let y_expand = self.regs[0x17];
        for (n, sprite) in self.sprites.iter_mut().enumerate() {
            if y_expand & (1 << n) != 0 {
                sprite.expand_flop = !sprite.expand_flop;
            }
        }
    }

    fn check_sprite_dma(&mut self) {
        let line = (self.raster_y & 0xFF) as u8;
        for n in 0..8 {
            let bit = 1 << n;
            if self.regs[0x15] & bit == 0 {
                continue;
            }
            let y_matches = self.regs[1 + n * 2] == line;
            if self.sprites[n].check_dma_on(y_matches, self.regs[0x17] & bit != 0) {
                debug!("vic: sprite {n} DMA on at line {}", self.raster_y);
            }
        }
    }

    fn update_sprite_counters(&mut self) {
        for (n, sprite) in self.sprites.iter_mut().enumerate() {
            if sprite.update_mcbase() {
                debug!("vic: sprite {n} DMA off at line {}", self.raster_y);
            }
        }
    }

    /// p- and s-accesses: pointer and first byte in the slot cycle, the
    /// other two bytes in the next.
    fn sprite_accesses<M: VicMemory + ?Sized>(&mut self, memory: &M, cycle: u8) {
        for (n, slot) in self.model.sprite_slots().into_iter().enumerate() {
            if !self.sprites[n].dma || (cycle != slot && cycle != slot + 1) {
                continue;
            }
            if cycle == slot {
                let pointer_address = self.video_matrix() | 0x03F8 | n as u16;
                let pointer = memory.vic_read(self.vic_address(pointer_address));
                self.sprites[n].pointer = pointer;
                self.sprite_byte(memory, n, 0);
            } else {
                self.sprite_byte(memory, n, 1);
                self.sprite_byte(memory, n, 2);
            }
        }
    }

    fn sprite_byte<M: VicMemory + ?Sized>(&mut self, memory: &M, n: usize, index: usize) {
        let sprite = &self.sprites[n];
        let address = (u16::from(sprite.pointer) << 6) | u16::from(sprite.mc);
        let value = memory.vic_read(self.vic_address(address));
        self.sprites[n].load(index, value);
    }

    fn sprite_x(&self, n: usize) -> u16 {
        let msb = u16::from(self.regs[0x10] >> n) & 1;
        (msb << 8) | u16::from(self.regs[n * 2])
    }

    // =========================================================================
    // Graphics
    // =========================================================================

    fn mode(&self) -> GraphicsMode {
        GraphicsMode::from_bits(
            self.regs[0x11] & 0x40 != 0,
            self.regs[0x11] & 0x20 != 0,
            self.regs[0x16] & 0x10 != 0,
        )
    }

    fn video_matrix(&self) -> u16 {
        u16::from(self.latched_pointers & 0xF0) << 6
    }

    fn char_base(&self) -> u16 {
        u16::from(self.latched_pointers & 0x0E) << 10
    }

    fn vic_address(&self, address: u16) -> u16 {
        (u16::from(self.latched_bank) << 14) | (address & 0x3FFF)
    }

    fn background(&self) -> [u8; 4] {
        [
            self.regs[0x21] & 0x0F,
            self.regs[0x22] & 0x0F,
            self.regs[0x23] & 0x0F,
            self.regs[0x24] & 0x0F,
        ]
    }

    /// c-access: one screen code and colour nibble into the matrix line.
    /// The first three accesses after BA drops on a mid-line badline see
    /// $FF because the CPU still owns the bus.
    fn c_access<M: VicMemory + ?Sized>(&mut self, memory: &M, cycle: u8) {
        let index = self.vmli.min(39);
        let owned_from = (self.badline_from.max(12) + 3).max(FIRST_C_ACCESS);
        self.matrix[index] = if cycle < owned_from {
            0xFF
        } else {
            memory.vic_read(self.vic_address(self.video_matrix() | self.vc))
        };
        self.colours[index] = memory.colour_read(self.vc) & 0x0F;
    }

    /// g-access: one byte of character, bitmap or idle data, decoded and
    /// placed XSCROLL pixels to the right.
    fn g_access<M: VicMemory + ?Sized>(&mut self, memory: &M, cycle: u8) {
        let mode = self.mode();
        let index = self.vmli.min(39);
        let (address, matrix, colour) = if self.display_state {
            let matrix = self.matrix[index];
            let address = if mode.is_bitmap() {
                (u16::from(self.latched_pointers & 0x08) << 10)
                    | (self.vc << 3)
                    | u16::from(self.rc)
            } else {
                let code = if mode.is_ecm() { matrix & 0x3F } else { matrix };
                self.char_base() | (u16::from(code) << 3) | u16::from(self.rc)
            };
            (address, matrix, self.colours[index])
        } else {
            (0x3FFF, 0, 0)
        };
        let address = if mode.is_ecm() { address & 0x39FF } else { address };
        let data = memory.vic_read(self.vic_address(address));
        let pixels = decode(mode, data, matrix, colour, self.background());

        if self.display_state {
            self.vc = (self.vc + 1) & 0x03FF;
            self.vmli += 1;
        }

        let start = usize::from(cycle - FIRST_G_ACCESS) * 8 + usize::from(self.regs[0x16] & 0x07);
        for (slot, pixel) in self.gfx_line[start..start + 8].iter_mut().zip(pixels) {
            *slot = Some(pixel);
        }
    }

    fn gfx_pixel(&self, cycle: u8, px: u8) -> Pixel {
        let background = Pixel::background(self.regs[0x21] & 0x0F);
        if cycle < FIRST_G_ACCESS {
            return background;
        }
        let index = usize::from(cycle - FIRST_G_ACCESS) * 8 + usize::from(px);
        self.gfx_line.get(index).copied().flatten().unwrap_or(background)
    }

    /// Border, graphics, sprites and collisions for the 8 pixels of a
    /// cycle.
    fn draw(&mut self, cycle: u8) {
        let visible = (FIRST_VISIBLE_CYCLE..=LAST_VISIBLE_CYCLE).contains(&cycle) && {
            let (first, last) = self.model.visible_lines();
            (first..=last).contains(&self.raster_y)
        };
        let (csel, rsel, den) = (self.regs[0x16] & 0x08 != 0, self.rsel(), self.den());

        for px in 0..8u8 {
            let x = self.model.x_coordinate(cycle, px);
            let in_border = self.border.pixel(x, self.raster_y, csel, rsel, den);
            let gfx = self.gfx_pixel(cycle, px);

            let mut mask = 0u8;
            let mut front: Option<(usize, u8)> = None;
            for n in 0..8 {
                let sprite_x = self.sprite_x(n);
                let bit = 1u8 << n;
                let expand_x = self.regs[0x1D] & bit != 0;
                let multicolor = self.regs[0x1C] & bit != 0;
                let code = self.sprites[n].pixel(x, sprite_x, expand_x, multicolor);
                if code != 0 {
                    mask |= bit;
                    front.get_or_insert((n, code));
                }
            }
            if gfx.foreground {
                self.collisions.mark_foreground(x);
            }
            if mask != 0 {
                let hits = self.collisions.mark_sprites(x, mask);
                self.record_collisions(hits);
            }

            if visible {
                let colour = if in_border {
                    self.regs[0x20] & 0x0F
                } else {
                    match front {
                        Some((n, _)) if self.regs[0x1B] & (1 << n) != 0 && gfx.foreground => {
                            gfx.colour
                        }
                        Some((n, code)) => self.sprite_colour(n, code),
                        None => gfx.colour,
                    }
                };
                let index = usize::from(cycle - FIRST_VISIBLE_CYCLE) * 8 + usize::from(px);
                self.line_pixels[index] = colour;
            }
        }

        if visible && cycle == LAST_VISIBLE_CYCLE {
            self.line_ready = true;
        }
    }

    fn sprite_colour(&self, n: usize, code: u8) -> u8 {
        let register = match code {
            1 => 0x25,
            3 => 0x26,
            _ => 0x27 + n,
        };
        self.regs[register] & 0x0F
    }

    /// Collision registers are sticky; each raises its interrupt only when
    /// it goes from empty to non-empty.
    fn record_collisions(&mut self, hits: Hits) {
        if hits.sprite_sprite != 0 {
            if self.sprite_sprite == 0 {
                self.raise(IRQ_SPRITE_SPRITE);
            }
            self.sprite_sprite |= hits.sprite_sprite;
        }
        if hits.sprite_background != 0 {
            if self.sprite_background == 0 {
                self.raise(IRQ_SPRITE_BACKGROUND);
            }
            self.sprite_background |= hits.sprite_background;
        }
    }

    fn raise(&mut self, source: u8) {
        self.irq_status |= source;
    }

    fn den(&self) -> bool {
        self.regs[0x11] & 0x10 != 0
    }

    fn rsel(&self) -> bool {
        self.regs[0x11] & 0x08 != 0
    }

    // =========================================================================
    // Register access
    // =========================================================================

    /// Register read. $D01E and $D01F clear on read.
    pub fn read(&mut self, reg: u8) -> u8 {
        let value = self.peek(reg);
        match reg & 0x3F {
            0x1E => self.sprite_sprite = 0,
            0x1F => self.sprite_background = 0,
            _ => {}
        }
        trace!(target: "vic::reg", "R $D0{:02X} -> ${value:02X}", reg & 0x3F);
        value
    }

    /// Register read without side effects.
    #[must_use]
    pub fn peek(&self, reg: u8) -> u8 {
        match reg & 0x3F {
            0x11 => (self.regs[0x11] & 0x7F) | (((self.raster_y >> 1) & 0x80) as u8),
            0x12 => self.raster_y as u8,
            0x16 => self.regs[0x16] | 0xC0,
            0x18 => self.regs[0x18] | 0x01,
            0x19 => {
                let any = if self.irq_active() { 0x80 } else { 0 };
                self.irq_status | 0x70 | any
            }
            0x1A => self.irq_enable | 0xF0,
            0x1E => self.sprite_sprite,
            0x1F => self.sprite_background,
            r @ 0x20..=0x2E => self.regs[usize::from(r)] | 0xF0,
            r @ 0x00..=0x1D => self.regs[usize::from(r)],
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, reg: u8, value: u8) {
        let r = reg & 0x3F;
        trace!(target: "vic::reg", "W $D0{r:02X} = ${value:02X} at line {} cycle {}", self.raster_y, self.cycle);
        match r {
            0x11 => {
                self.regs[0x11] = value;
                self.raster_compare = (self.raster_compare & 0x00FF) | (u16::from(value & 0x80) << 1);
                if self.raster_y == FIRST_DMA_LINE && self.den() {
                    self.den_latch = true;
                }
                let was_badline = self.badline;
                self.badline = self.badline_condition();
                if self.badline && !was_badline {
                    self.badline_from = self.cycle + 1;
                    debug!(
                        "vic: badline forced at line {} cycle {}",
                        self.raster_y, self.cycle
                    );
                }
            }
            0x12 => {
                self.regs[0x12] = value;
                self.raster_compare = (self.raster_compare & 0x0100) | u16::from(value);
            }
            // Light pen and collision registers are read-only; a write to a
            // collision register acknowledges it.
            0x13 | 0x14 => {}
            0x17 => {
                for (n, sprite) in self.sprites.iter_mut().enumerate() {
                    if value & (1 << n) == 0 {
                        sprite.clear_y_expand(self.cycle);
                    }
                }
                self.regs[0x17] = value;
            }
            0x19 => self.irq_status &= !(value & 0x0F),
            0x1A => self.irq_enable = value & 0x0F,
            0x1E => self.sprite_sprite = 0,
            0x1F => self.sprite_background = 0,
            r @ 0x00..=0x2E => self.regs[usize::from(r)] = value,
            _ => {}
        }
    }

    // =========================================================================
    // Machine-facing state
    // =========================================================================

    /// Interrupt output.
    #[must_use]
    pub fn irq_active(&self) -> bool {
        self.irq_status & self.irq_enable & 0x0F != 0
    }

    /// Bank (0-3) from CIA2 port A; takes effect at the next re-latch.
    pub fn set_bank(&mut self, bank: u8) {
        self.bank = bank & 0x03;
    }

    #[must_use]
    pub fn bank(&self) -> u8 {
        self.bank
    }

    #[must_use]
    pub fn model(&self) -> VicModel {
        self.model
    }

    #[must_use]
    pub fn raster_y(&self) -> u16 {
        self.raster_y
    }

    #[must_use]
    pub fn cycle(&self) -> u8 {
        self.cycle
    }

    #[must_use]
    pub fn badline(&self) -> bool {
        self.badline
    }

    /// First cycle of the current line on which the badline condition
    /// held: 1 for an ordinary badline, later when forced by a $D011 write.
    #[must_use]
    pub fn badline_from(&self) -> u8 {
        self.badline_from
    }

    #[must_use]
    pub fn display_state(&self) -> bool {
        self.display_state
    }

    /// Sprites with DMA on, one bit each.
    #[must_use]
    pub fn sprite_dma(&self) -> u8 {
        self.sprites
            .iter()
            .enumerate()
            .fold(0, |mask, (n, s)| mask | (u8::from(s.dma) << n))
    }

    #[must_use]
    pub fn sprite(&self, n: usize) -> &Sprite {
        &self.sprites[n & 7]
    }

    #[must_use]
    pub fn collision_line(&self) -> &CollisionLine {
        &self.collisions
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Check and clear the frame-complete flag.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// The scanline finished by the last tick, if any: raster line, X
    /// coordinate of the first pixel, palette indices.
    pub fn completed_line(&mut self) -> Option<(u16, u16, &[u8])> {
        if !std::mem::take(&mut self.line_ready) {
            return None;
        }
        let first_x = self.model.x_coordinate(FIRST_VISIBLE_CYCLE, 0);
        Some((self.raster_y, first_x, &self.line_pixels))
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> VicState {
        VicState {
            regs: self.regs.to_vec(),
            raster_y: self.raster_y,
            cycle: self.cycle,
            raster_compare: self.raster_compare,
            irq_status: self.irq_status,
            irq_enable: self.irq_enable,
            den_latch: self.den_latch,
            badline: self.badline,
            badline_from: self.badline_from,
            display_state: self.display_state,
            vc: self.vc,
            vcbase: self.vcbase,
            rc: self.rc,
            vmli: self.vmli as u8,
            matrix: self.matrix.to_vec(),
            colours: self.colours.to_vec(),
            bank: self.bank,
            latched_bank: self.latched_bank,
            latched_pointers: self.latched_pointers,
            sprites: self.sprites.to_vec(),
            border: self.border.clone(),
            sprite_sprite: self.sprite_sprite,
            sprite_background: self.sprite_background,
            gfx_line: self.gfx_line.clone(),
            collisions: self.collisions.cells().to_vec(),
            line_pixels: self.line_pixels.clone(),
            line_ready: self.line_ready,
            frame_complete: self.frame_complete,
            frame_count: self.frame_count,
        }
    }

    /// Restore from a snapshot taken on the same model.
    pub fn restore(&mut self, state: &VicState) {
        copy_into(&mut self.regs, &state.regs);
        self.raster_y = state.raster_y;
        self.cycle = state.cycle;
        self.raster_compare = state.raster_compare;
        self.irq_status = state.irq_status;
        self.irq_enable = state.irq_enable;
        self.den_latch = state.den_latch;
        self.badline = state.badline;
        self.badline_from = state.badline_from;
        self.display_state = state.display_state;
        self.vc = state.vc;
        self.vcbase = state.vcbase;
        self.rc = state.rc;
        self.vmli = usize::from(state.vmli);
        copy_into(&mut self.matrix, &state.matrix);
        copy_into(&mut self.colours, &state.colours);
        self.bank = state.bank;
        self.latched_bank = state.latched_bank;
        self.latched_pointers = state.latched_pointers;
        copy_into(&mut self.sprites, &state.sprites);
        self.border = state.border.clone();
        self.sprite_sprite = state.sprite_sprite;
        self.sprite_background = state.sprite_background;
        copy_into(&mut self.gfx_line, &state.gfx_line);
        copy_into(&mut self.line_pixels, &state.line_pixels);
        self.line_ready = state.line_ready;
        self.frame_complete = state.frame_complete;
        self.frame_count = state.frame_count;
        self.collisions.load(&state.collisions);
    }
}

fn copy_into<T: Clone>(dst: &mut [T], src: &[T]) {
    for (d, s) in dst.iter_mut().zip(src) {
        d.clone_from(s);
    }
}

impl Observable for Vic {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "raster_y" => Some(self.raster_y.into()),
            "cycle" => Some(self.cycle.into()),
            "raster_compare" => Some(self.raster_compare.into()),
            "badline" => Some(self.badline.into()),
            "display_state" => Some(self.display_state.into()),
            "den_latch" => Some(self.den_latch.into()),
            "vc" => Some(self.vc.into()),
            "vcbase" => Some(self.vcbase.into()),
            "rc" => Some(self.rc.into()),
            "irq.status" => Some(self.irq_status.into()),
            "irq.enable" => Some(self.irq_enable.into()),
            "sprite_dma" => Some(self.sprite_dma().into()),
            "collision.sprite_sprite" => Some(self.sprite_sprite.into()),
            "collision.sprite_background" => Some(self.sprite_background.into()),
            "bank" => Some(self.latched_bank.into()),
            "frame_count" => Some(self.frame_count.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "raster_y", "cycle", "raster_compare", "badline", "display_state", "den_latch",
            "vc", "vcbase", "rc", "irq.status", "irq.enable", "sprite_dma",
            "collision.sprite_sprite", "collision.sprite_background", "bank", "frame_count",
        ]
    }
}
