use std::cell::RefCell;
use std::rc::Rc;

use emu_c64::{C64, C64Config, FlatMemory, PixelSink};

pub const ORIGIN: u16 = 0x0800;
pub const HANDLER: u16 = 0x0900;

/// A machine with `program` at $0800, `handler` at $0900 and the reset
/// vector pointing at the program.
pub fn machine(config: C64Config, program: &[u8], handler: &[u8]) -> C64 {
    let mut memory = FlatMemory::new();
    memory.load(ORIGIN, program);
    memory.load(HANDLER, handler);
    memory.load(0xFFFC, &ORIGIN.to_le_bytes());
    C64::new(config, Box::new(memory)).expect("valid configuration")
}

pub fn zero_page(c64: &C64, address: u16) -> u8 {
    c64.memory().peek(address)
}

/// Scanlines received, shared with the test.
#[derive(Clone, Default)]
pub struct Recorder(pub Rc<RefCell<Vec<(u16, u16, Vec<u8>)>>>);

impl PixelSink for Recorder {
    fn scanline(&mut self, y: u16, first_x: u16, pixels: &[u8]) {
        self.0.borrow_mut().push((y, first_x, pixels.to_vec()));
    }
}
