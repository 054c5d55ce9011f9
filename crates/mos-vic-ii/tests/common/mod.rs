use std::cell::RefCell;

use mos_vic_ii::{Vic, VicMemory};

/// 64K of RAM plus colour RAM, recording every VIC read.
pub struct Ram {
    pub bytes: Vec<u8>,
    pub colour: Vec<u8>,
    pub reads: RefCell<Vec<u16>>,
}

impl Ram {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; 0x10000],
            colour: vec![0; 0x400],
            reads: RefCell::new(Vec::new()),
        }
    }
}

impl VicMemory for Ram {
    fn vic_read(&self, address: u16) -> u8 {
        self.reads.borrow_mut().push(address);
        self.bytes[usize::from(address)]
    }

    fn colour_read(&self, offset: u16) -> u8 {
        self.colour[usize::from(offset & 0x03FF)]
    }
}

pub fn run(vic: &mut Vic, ram: &Ram, ticks: u32) {
    for _ in 0..ticks {
        vic.tick(ram);
    }
}

/// Ticks from reset until the chip sits on `cycle` of `line` (PAL).
pub fn ticks_to(line: u32, cycle: u32) -> u32 {
    line * 63 + cycle
}
