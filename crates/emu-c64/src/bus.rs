//! C64 bus: the shared clock and the address decoder.
//!
//! Every CPU bus cycle enters here. Before the access is performed the bus
//! clocks the chips for the tick it falls on, then keeps clocking while the
//! arbiter says the VIC-II has the bus. Time only moves forward through
//! CPU accesses, so the CPU, VIC-II and CIAs can never disagree about which
//! tick it is.
//!
//! # Tick order
//!
//! 1. VIC-II: beam, badline, raster compare, fetches, 8 pixels
//! 2. Completed scanline to the pixel sink
//! 3. Bus arbiter: BA/AEC for this tick
//! 4. CIA1, then CIA2
//! 5. Interrupt lines into the latch, latch countdown
//! 6. The CPU's access, if the arbiter allows it

use emu_core::{AccessKind, Bus, Tickable};
use log::trace;
use mos_cia_6526::Cia;
use mos_vic_ii::{PixelSink, Vic, VicMemory};
use serde::{Deserialize, Serialize};

use crate::arbiter::{BusArbiter, BusCycle};
use crate::config::{C64Config, GlueLogic};
use crate::interrupt::{InterruptLatch, Source};
use crate::memory::MemoryMap;

/// Scheduler state owned by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub ticks: u64,
    /// CPU cycles already issued in the current tick.
    pub phase: u8,
    pub held: bool,
    /// VIC-II output one tick ago, for the custom glue IC.
    pub vic_irq_delayed: bool,
}

/// The C64 bus, implementing `emu_core::Bus`.
pub struct C64Bus {
    pub(crate) memory: Box<dyn MemoryMap>,
    pub(crate) vic: Vic,
    pub(crate) cia1: Cia,
    pub(crate) cia2: Cia,
    pub(crate) arbiter: BusArbiter,
    pub(crate) interrupts: InterruptLatch,
    pub(crate) sink: Option<Box<dyn PixelSink>>,
    glue: GlueLogic,
    multiplier: u8,
    clock: ClockState,
}

impl C64Bus {
    pub(crate) fn new(config: &C64Config, memory: Box<dyn MemoryMap>) -> Self {
        let divisor = config.tod_divisor();
        Self {
            memory,
            vic: Vic::new(config.model),
            cia1: Cia::new("cia1", config.cia_revision, divisor),
            cia2: Cia::new("cia2", config.cia_revision, divisor),
            arbiter: BusArbiter::new(),
            interrupts: InterruptLatch::new(),
            sink: None,
            glue: config.glue,
            multiplier: config.cpu_clock_multiplier.max(1),
            clock: ClockState {
                ticks: 0,
                phase: 0,
                held: false,
                vic_irq_delayed: false,
            },
        }
    }

    /// Reset every chip and the clock. Memory is untouched.
    pub(crate) fn reset(&mut self) {
        self.vic.reset();
        self.cia1.reset();
        self.cia2.reset();
        self.arbiter = BusArbiter::new();
        self.interrupts = InterruptLatch::new();
        self.clock = ClockState {
            ticks: 0,
            phase: 0,
            held: false,
            vic_irq_delayed: false,
        };
        self.update_vic_bank();
    }

    /// Ticks since reset.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.clock.ticks
    }

    pub(crate) fn clock_state(&self) -> ClockState {
        self.clock
    }

    pub(crate) fn restore_clock(&mut self, state: ClockState) {
        self.clock = state;
    }

    /// Advance every chip by one tick.
    fn tick(&mut self) {
        self.vic.tick(&*self.memory);
        if let Some((y, first_x, pixels)) = self.vic.completed_line() {
            if let Some(sink) = self.sink.as_mut() {
                sink.scanline(y, first_x, pixels);
            }
        }

        self.arbiter.advance(&self.vic);
        self.cia1.tick();
        self.cia2.tick();

        let vic_irq = self.vic.irq_active();
        let vic_line = match self.glue {
            GlueLogic::Discrete => vic_irq,
            GlueLogic::CustomIc => std::mem::replace(&mut self.clock.vic_irq_delayed, vic_irq),
        };
        self.interrupts.set(Source::Vic, vic_line);
        self.sync_cia_lines();
        self.interrupts.tick();

        self.clock.ticks += 1;
    }

    fn sync_cia_lines(&mut self) {
        self.interrupts.set(Source::Cia1, self.cia1.irq_active());
        self.interrupts.set(Source::Cia2, self.cia2.irq_active());
    }

    /// After a register access: an acknowledged source drops its line at
    /// once.
    fn resync_lines(&mut self) {
        if !self.vic.irq_active() {
            self.interrupts.acknowledge(Source::Vic);
            self.clock.vic_irq_delayed = false;
        }
        self.sync_cia_lines();
    }

    /// Claim a tick for one CPU access, clocking the machine as needed.
    fn begin_access(&mut self, write: bool) {
        if self.clock.phase == 0 {
            self.tick();
        }
        self.clock.held = false;
        while !self.arbiter.allows(write) {
            self.arbiter.count(self.arbiter.denied());
            self.clock.held = true;
            self.tick();
        }
        self.clock.phase = (self.clock.phase + 1) % self.multiplier;
    }

    fn io_read(&mut self, address: u16, kind: AccessKind) -> u8 {
        let real = kind == AccessKind::Real;
        let value = match address {
            0xD000..=0xD3FF => {
                let reg = (address & 0x3F) as u8;
                if real { self.vic.read(reg) } else { self.vic.peek(reg) }
            }
            0xD800..=0xDBFF => self.memory.colour_read(address & 0x03FF),
            0xDC00..=0xDCFF => {
                let reg = (address & 0x0F) as u8;
                if real { self.cia1.read(reg) } else { self.cia1.peek(reg) }
            }
            0xDD00..=0xDDFF => {
                let reg = (address & 0x0F) as u8;
                if real { self.cia2.read(reg) } else { self.cia2.peek(reg) }
            }
            // SID and the expansion port are outside the core.
            _ => 0xFF,
        };
        if real {
            self.resync_lines();
        }
        value
    }

    fn io_write(&mut self, address: u16, value: u8) {
        match address {
            0xD000..=0xD3FF => self.vic.write((address & 0x3F) as u8, value),
            0xD800..=0xDBFF => self.memory.colour_write(address & 0x03FF, value),
            0xDC00..=0xDCFF => self.cia1.write((address & 0x0F) as u8, value),
            0xDD00..=0xDDFF => {
                let reg = (address & 0x0F) as u8;
                self.cia2.write(reg, value);
                if reg == 0x00 || reg == 0x02 {
                    self.update_vic_bank();
                }
            }
            _ => trace!("unmapped I/O write ${address:04X} = ${value:02X}"),
        }
        self.resync_lines();
    }

    /// CIA2 port A bits 0-1, inverted, select the VIC-II bank.
    fn update_vic_bank(&mut self) {
        let bank = !self.cia2.port_a_output() & 0x03;
        self.vic.set_bank(bank);
    }
}

impl Bus for C64Bus {
    fn read(&mut self, address: u16, kind: AccessKind) -> u8 {
        self.begin_access(false);
        self.arbiter.count(match kind {
            AccessKind::Real => BusCycle::Normal,
            AccessKind::Dummy => BusCycle::Dumb,
        });
        if self.memory.io_visible(address) {
            self.io_read(address, kind)
        } else if kind == AccessKind::Dummy {
            self.memory.peek(address)
        } else {
            self.memory.read(address)
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        self.begin_access(true);
        self.arbiter.count(BusCycle::Normal);
        // The RAM under visible I/O never sees the write.
        if self.memory.io_visible(address) {
            self.io_write(address, value);
        } else {
            self.memory.write(address, value);
        }
    }

    fn irq(&self) -> bool {
        self.interrupts.irq()
    }

    fn take_nmi(&mut self) -> bool {
        self.interrupts.take_nmi()
    }

    fn held(&self) -> bool {
        self.clock.held
    }
}
