//! Pixel output, sprites and collisions.

mod common;

use common::{Ram, run, ticks_to};
use mos_vic_ii::{FrameBuffer, IRQ_SPRITE_SPRITE, PixelSink, Vic, VicModel};

/// Screen at $0400, characters at $1000, 25 rows, 40 columns.
fn text_screen() -> Vic {
    let mut vic = Vic::new(VicModel::Pal);
    vic.write(0x11, 0x1B);
    vic.write(0x16, 0x08);
    vic.write(0x18, 0x14);
    vic.write(0x20, 14);
    vic.write(0x21, 6);
    vic
}

fn render_frame(vic: &mut Vic, ram: &Ram) -> FrameBuffer {
    let mut fb = FrameBuffer::new(vic.model());
    for _ in 0..VicModel::Pal.ticks_per_frame() {
        vic.tick(ram);
        if let Some((y, first_x, pixels)) = vic.completed_line() {
            fb.scanline(y, first_x, pixels);
        }
    }
    fb
}

/// Framebuffer column of screen X coordinate `x`.
fn column(x: usize) -> usize {
    x + 24
}

#[test]
fn text_mode_draws_character_in_its_colour() {
    let mut ram = Ram::new();
    ram.bytes[0x0400] = 1;
    ram.bytes[0x1008] = 0xF0;
    ram.colour[0] = 1;
    let mut vic = text_screen();

    let fb = render_frame(&mut vic, &ram);
    let row = 0x33 - 16;
    for x in 24..28 {
        assert_eq!(fb.pixel(column(x), row), 1, "x={x}");
    }
    for x in 28..40 {
        assert_eq!(fb.pixel(column(x), row), 6, "x={x}");
    }
    assert_eq!(fb.pixel(0, row), 14);
    // Top border above the first text line.
    assert_eq!(fb.pixel(column(24), row - 1), 14);
}

#[test]
fn xscroll_moves_graphics_right() {
    let mut ram = Ram::new();
    ram.bytes[0x0400] = 1;
    ram.bytes[0x1008] = 0x80;
    ram.colour[0] = 1;
    let mut vic = text_screen();
    vic.write(0x16, 0x08 | 3);

    let fb = render_frame(&mut vic, &ram);
    let row = 0x33 - 16;
    assert_eq!(fb.pixel(column(24), row), 6);
    assert_eq!(fb.pixel(column(27), row), 1);
}

#[test]
fn badline_reads_forty_screen_codes() {
    let ram = Ram::new();
    let mut vic = text_screen();

    run(&mut vic, &ram, ticks_to(0x33, 0));
    ram.reads.borrow_mut().clear();
    run(&mut vic, &ram, 63);

    let reads = ram.reads.borrow();
    let matrix: Vec<u16> = reads.iter().copied().filter(|a| (0x0400..0x0800).contains(a)).collect();
    assert_eq!(matrix, (0x0400..0x0428).collect::<Vec<u16>>());
}

fn sprite_setup(ram: &mut Ram, vic: &mut Vic, sprites: u8, x: &[u16]) {
    ram.bytes[0x07F8..0x0800].fill(0x80);
    ram.bytes[0x2000..0x2040].fill(0xFF);
    vic.write(0x18, 0x14);
    vic.write(0x15, sprites);
    for (n, &x) in x.iter().enumerate() {
        vic.write((n * 2) as u8, x as u8);
        vic.write((n * 2 + 1) as u8, 0x40);
        vic.write(0x27 + n as u8, 2 + n as u8);
    }
}

#[test]
fn sprite_dma_runs_for_21_lines() {
    let mut ram = Ram::new();
    let mut vic = text_screen();
    sprite_setup(&mut ram, &mut vic, 0x01, &[100]);

    run(&mut vic, &ram, ticks_to(0x40, 54));
    assert_eq!(vic.sprite_dma(), 0);
    vic.tick(&ram);
    assert_eq!(vic.sprite_dma(), 0x01);

    run(&mut vic, &ram, ticks_to(0x40 + 21, 15) - ticks_to(0x40, 55));
    assert_eq!(vic.sprite_dma(), 0x01);
    vic.tick(&ram);
    assert_eq!(vic.sprite_dma(), 0);
}

#[test]
fn sprite_shows_from_the_line_after_its_y() {
    let mut ram = Ram::new();
    let mut vic = text_screen();
    sprite_setup(&mut ram, &mut vic, 0x01, &[100]);

    let fb = render_frame(&mut vic, &ram);
    let row = 0x41 - 16;
    assert_eq!(fb.pixel(column(99), row), 6);
    assert_eq!(fb.pixel(column(100), row), 2);
    assert_eq!(fb.pixel(column(123), row), 2);
    assert_eq!(fb.pixel(column(124), row), 6);
    assert_eq!(fb.pixel(column(100), row - 1), 6);
}

#[test]
fn lower_numbered_sprite_wins() {
    let mut ram = Ram::new();
    let mut vic = text_screen();
    sprite_setup(&mut ram, &mut vic, 0x03, &[100, 104]);

    let fb = render_frame(&mut vic, &ram);
    let row = 0x41 - 16;
    assert_eq!(fb.pixel(column(110), row), 2);
    assert_eq!(fb.pixel(column(126), row), 3);
}

#[test]
fn sprite_sprite_collision_is_sticky() {
    let mut ram = Ram::new();
    let mut vic = Vic::new(VicModel::Pal);
    sprite_setup(&mut ram, &mut vic, 0x03, &[100, 104]);
    vic.write(0x1A, IRQ_SPRITE_SPRITE);

    run(&mut vic, &ram, ticks_to(0x42, 1));
    assert!(vic.irq_active());
    assert_eq!(vic.peek(0x1E), 0x03);
    assert_eq!(vic.peek(0x1F), 0);

    // Acknowledged but not read: no new interrupt while the register
    // still holds bits.
    vic.write(0x19, IRQ_SPRITE_SPRITE);
    run(&mut vic, &ram, VicModel::Pal.ticks_per_frame());
    assert!(!vic.irq_active());

    // Reading clears it; the next overlap raises again.
    assert_eq!(vic.read(0x1E), 0x03);
    assert_eq!(vic.peek(0x1E), 0);
    run(&mut vic, &ram, VicModel::Pal.ticks_per_frame());
    assert!(vic.irq_active());
}

#[test]
fn sprite_background_collision_needs_foreground() {
    let mut ram = Ram::new();
    ram.bytes[0x0400..0x07E8].fill(1);
    ram.bytes[0x1008..0x1010].fill(0xFF);
    let mut vic = text_screen();
    sprite_setup(&mut ram, &mut vic, 0x01, &[100]);

    run(&mut vic, &ram, ticks_to(0x42, 1));
    assert_eq!(vic.peek(0x1F), 0x01);
    assert_eq!(vic.peek(0x1E), 0);
}

#[test]
fn priority_bit_puts_sprite_behind_foreground() {
    let mut ram = Ram::new();
    ram.bytes[0x0400..0x07E8].fill(1);
    ram.bytes[0x1008..0x1010].fill(0xF0);
    ram.colour.fill(1);
    let mut vic = text_screen();
    sprite_setup(&mut ram, &mut vic, 0x01, &[104]);
    vic.write(0x1B, 0x01);

    let fb = render_frame(&mut vic, &ram);
    let row = 0x41 - 16;
    assert_eq!(fb.pixel(column(104), row), 1);
    assert_eq!(fb.pixel(column(108), row), 2);
}

#[test]
fn clearing_y_expand_in_cycle_15_crunches() {
    let mut ram = Ram::new();
    let mut vic = Vic::new(VicModel::Pal);
    sprite_setup(&mut ram, &mut vic, 0x01, &[100]);
    vic.write(0x17, 0x01);

    // Expanded: MCBASE advances every other line.
    run(&mut vic, &ram, ticks_to(0x43, 15));
    assert_eq!((vic.sprite(0).mc, vic.sprite(0).mcbase), (6, 3));

    vic.write(0x17, 0x00);
    assert_eq!(vic.sprite(0).mc, 7);
    vic.tick(&ram);
    assert_eq!(vic.sprite(0).mcbase, 7);
}

/// Sprite 0 at Y=$20, Y-expanded. On PAL that Y also matches line $120,
/// so the sprite is fetched twice a frame. Returns every (frame, line)
/// at which its DMA switched on over three frames. With `crunch`, MxYE is
/// cleared in cycle 15 of line $121 and set again in cycle 20.
fn dma_starts(crunch: bool) -> Vec<(u64, u16)> {
    let mut ram = Ram::new();
    ram.bytes[0x07F8] = 0x80;
    let mut vic = Vic::new(VicModel::Pal);
    vic.write(0x18, 0x14);
    vic.write(0x15, 0x01);
    vic.write(0x01, 0x20);
    vic.write(0x17, 0x01);

    let mut starts = Vec::new();
    let mut was_on = false;
    while vic.frame_count() < 3 {
        vic.tick(&ram);
        let on = vic.sprite_dma() & 1 != 0;
        if on && !was_on {
            starts.push((vic.frame_count(), vic.raster_y()));
        }
        was_on = on;

        if crunch && vic.frame_count() == 0 && vic.raster_y() == 0x121 {
            match vic.cycle() {
                15 => vic.write(0x17, 0x00),
                20 => vic.write(0x17, 0x01),
                _ => {}
            }
        }
    }
    starts
}

#[test]
fn sprite_y_alias_fetches_twice_a_frame() {
    let starts = dma_starts(false);
    assert_eq!(
        starts,
        [(0, 0x20), (0, 0x120), (1, 0x20), (1, 0x120), (2, 0x20), (2, 0x120)]
    );
}

#[test]
fn crunched_sprite_skips_next_frames_reload() {
    let starts = dma_starts(true);
    // The crunch leaves MCBASE at 1, so DMA runs on into frame 1 past line
    // $20 and that reload never happens. Line $20 reloads again in frame 2.
    assert_eq!(starts, [(0, 0x20), (0, 0x120), (1, 0x120), (2, 0x20), (2, 0x120)]);
}

#[test]
fn crunch_in_cycle_15_sets_odd_counter() {
    let mut ram = Ram::new();
    ram.bytes[0x07F8] = 0x80;
    let mut vic = Vic::new(VicModel::Pal);
    vic.write(0x18, 0x14);
    vic.write(0x15, 0x01);
    vic.write(0x01, 0x20);
    vic.write(0x17, 0x01);

    run(&mut vic, &ram, ticks_to(0x121, 15));
    assert_eq!((vic.sprite(0).mc, vic.sprite(0).mcbase), (3, 0));
    vic.write(0x17, 0x00);
    vic.tick(&ram);
    assert_eq!(vic.sprite(0).mcbase, 1);
    assert!(vic.sprite(0).dma);
}

#[test]
fn collision_cells_survive_snapshot() {
    let mut ram = Ram::new();
    let mut vic = Vic::new(VicModel::Pal);
    sprite_setup(&mut ram, &mut vic, 0x03, &[100, 104]);
    vic.write(0x1A, IRQ_SPRITE_SPRITE);

    run(&mut vic, &ram, ticks_to(0x41, 63));
    assert_eq!(vic.collision_line().at(110), 0x03);
    assert_eq!(vic.collision_line().at(101), 0x01);
    assert!(vic.irq_active());

    let mut restored = Vic::new(VicModel::Pal);
    restored.restore(&vic.snapshot());
    assert_eq!(restored.collision_line(), vic.collision_line());
    assert_eq!(restored.peek(0x1E), 0x03);
    assert!(restored.irq_active());
    assert_eq!(restored.snapshot(), vic.snapshot());

    // The next line starts with an empty bitmap on both.
    vic.tick(&ram);
    restored.tick(&ram);
    assert_eq!(restored.collision_line().at(110), 0);
    assert_eq!(restored.snapshot(), vic.snapshot());
}
