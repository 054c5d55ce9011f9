//! Save and restore of the whole machine.

mod common;

use common::{Recorder, machine};
use emu_c64::{C64, C64Config, FlatMemory, Snapshot};

/// Text screen on, raster IRQ at line 100 that bumps the border colour.
const PROGRAM: &[u8] = &[
    0x78, //             SEI
    0xA9, 0xFF, //       LDA #$FF
    0x8D, 0x19, 0xD0, // STA $D019
    0xA9, 0x64, //       LDA #100
    0x8D, 0x12, 0xD0, // STA $D012
    0xA9, 0x1B, //       LDA #$1B
    0x8D, 0x11, 0xD0, // STA $D011
    0xA9, 0x00, //       LDA #<HANDLER
    0x8D, 0xFE, 0xFF, // STA $FFFE
    0xA9, 0x09, //       LDA #>HANDLER
    0x8D, 0xFF, 0xFF, // STA $FFFF
    0xA9, 0x01, //       LDA #$01
    0x8D, 0x1A, 0xD0, // STA $D01A
    0x58, //             CLI
    0xE6, 0x04, //       INC $04
    0x4C, 0x20, 0x08, // JMP *-2
];

const HANDLER: &[u8] = &[
    0xEE, 0x20, 0xD0, // INC $D020
    0xEE, 0x00, 0x04, // INC $0400
    0xAD, 0x19, 0xD0, // LDA $D019
    0x8D, 0x19, 0xD0, // STA $D019
    0x40, //             RTI
];

#[test]
fn json_round_trip_preserves_every_field() {
    let mut c64 = machine(C64Config::default(), PROGRAM, HANDLER);
    c64.run(30_000);

    let snapshot = c64.snapshot();
    let json = serde_json::to_string(&snapshot).expect("serialise");
    let decoded: Snapshot = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(decoded, snapshot);
}

#[test]
fn restored_machine_runs_identically() {
    let mut original = machine(C64Config::default(), PROGRAM, HANDLER);
    original.run(30_000);
    let json = serde_json::to_string(&original.snapshot()).expect("serialise");

    let mut copy = C64::new(C64Config::default(), Box::new(FlatMemory::new())).expect("config");
    copy.restore(&serde_json::from_str(&json).expect("deserialise"));
    assert_eq!(copy.snapshot(), original.snapshot());

    let first = Recorder::default();
    let second = Recorder::default();
    original.set_pixel_sink(Box::new(first.clone()));
    copy.set_pixel_sink(Box::new(second.clone()));

    for _ in 0..2 {
        original.run_frame();
        copy.run_frame();
    }

    assert_eq!(copy.snapshot(), original.snapshot());
    assert_eq!(copy.ticks(), original.ticks());
    let first = first.0.borrow();
    assert!(first.len() > 500);
    assert_eq!(*first, *second.0.borrow());
}

/// Sprites 0 and 1 overlapping at line $41, no interrupts enabled.
const SPRITES: &[u8] = &[
    0x78, //             SEI
    0xA9, 0x03, //       LDA #$03
    0x8D, 0x15, 0xD0, // STA $D015
    0xA9, 0x64, //       LDA #100
    0x8D, 0x00, 0xD0, // STA $D000
    0xA9, 0x68, //       LDA #104
    0x8D, 0x02, 0xD0, // STA $D002
    0xA9, 0x40, //       LDA #$40
    0x8D, 0x01, 0xD0, // STA $D001
    0x8D, 0x03, 0xD0, // STA $D003
    0x4C, 0x18, 0x08, // JMP *
];

#[test]
fn restore_mid_line_keeps_pending_collisions() {
    let mut original = machine(C64Config::default(), SPRITES, &[]);
    let memory = original.memory_mut();
    memory.write(0x03F8, 0x80);
    memory.write(0x03F9, 0x80);
    for offset in 0..63 {
        memory.write(0x2000 + offset, 0xFF);
    }

    while !(original.vic().raster_y() == 0x41 && original.vic().cycle() >= 40) {
        original.step_instruction();
    }
    assert_eq!(original.vic().collision_line().at(110), 0x03);
    assert_eq!(original.vic().peek(0x1E), 0x03);
    assert_ne!(original.vic().peek(0x19) & 0x04, 0);

    let json = serde_json::to_string(&original.snapshot()).expect("serialise");
    let mut copy = C64::new(C64Config::default(), Box::new(FlatMemory::new())).expect("config");
    copy.restore(&serde_json::from_str(&json).expect("deserialise"));
    assert_eq!(copy.vic().collision_line(), original.vic().collision_line());
    assert_eq!(copy.snapshot(), original.snapshot());

    original.run_frame();
    copy.run_frame();
    assert_eq!(copy.snapshot(), original.snapshot());
    assert_eq!(copy.vic().peek(0x1E), 0x03);
}
