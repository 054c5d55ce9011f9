//! Top-level C64 system: the clock scheduler.
//!
//! The scheduler only ever steps the CPU. Each CPU bus cycle advances the
//! shared clock inside [`C64Bus`], which ticks the VIC-II and both CIAs
//! and holds the CPU for as long as the VIC-II owns the bus. A single
//! instruction may therefore span any number of ticks.

use emu_core::{Observable, Value};
use log::debug;
use mos_6502::Mos6502;
use mos_cia_6526::Cia;
use mos_vic_ii::{PixelSink, Vic};

use crate::arbiter::{BusArbiter, BusCycle};
use crate::bus::C64Bus;
use crate::config::{C64Config, ConfigError};
use crate::interrupt::InterruptLatch;
use crate::memory::MemoryMap;
use crate::snapshot::Snapshot;

/// C64 system.
pub struct C64 {
    cpu: Mos6502,
    bus: C64Bus,
    config: C64Config,
}

impl C64 {
    /// Build a machine around `memory` and run the reset sequence.
    ///
    /// # Errors
    ///
    /// Any field of `config` that fails [`C64Config::validate`].
    pub fn new(config: C64Config, memory: Box<dyn MemoryMap>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut c64 = Self {
            cpu: Mos6502::new(),
            bus: C64Bus::new(&config, memory),
            config,
        };
        c64.reset();
        Ok(c64)
    }

    /// Reset every chip, zero the clock and run the CPU reset sequence.
    /// Memory keeps its contents.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        debug!("c64: reset, PC=${:04X}", self.cpu.regs.pc);
    }

    /// Run whole instructions until at least `budget` ticks have passed.
    ///
    /// A budget of zero or less runs exactly one instruction (one idle
    /// cycle if the CPU is jammed). Returns the ticks consumed.
    pub fn run(&mut self, budget: i64) -> u64 {
        let start = self.bus.ticks();
        if budget <= 0 {
            self.cpu.step(&mut self.bus);
            return self.bus.ticks() - start;
        }
        let budget = budget.unsigned_abs();
        while self.bus.ticks() - start < budget {
            self.cpu.step(&mut self.bus);
        }
        self.bus.ticks() - start
    }

    /// Execute one instruction. Returns the ticks consumed.
    pub fn step_instruction(&mut self) -> u64 {
        self.run(0)
    }

    /// Run until the VIC-II finishes the current frame. Returns the ticks
    /// consumed.
    pub fn run_frame(&mut self) -> u64 {
        let start = self.bus.ticks();
        let target = self.bus.vic.frame_count() + 1;
        while self.bus.vic.frame_count() < target {
            self.cpu.step(&mut self.bus);
        }
        self.bus.ticks() - start
    }

    /// Ticks since reset.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.bus.ticks()
    }

    /// Completed frames since reset.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.bus.vic.frame_count()
    }

    /// Check and clear the VIC-II frame-complete flag.
    pub fn take_frame_complete(&mut self) -> bool {
        self.bus.vic.take_frame_complete()
    }

    /// Send every finished visible scanline to `sink`.
    pub fn set_pixel_sink(&mut self, sink: Box<dyn PixelSink>) {
        self.bus.sink = Some(sink);
    }

    pub fn take_pixel_sink(&mut self) -> Option<Box<dyn PixelSink>> {
        self.bus.sink.take()
    }

    #[must_use]
    pub fn config(&self) -> &C64Config {
        &self.config
    }

    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    #[must_use]
    pub fn vic(&self) -> &Vic {
        &self.bus.vic
    }

    #[must_use]
    pub fn cia1(&self) -> &Cia {
        &self.bus.cia1
    }

    #[must_use]
    pub fn cia2(&self) -> &Cia {
        &self.bus.cia2
    }

    /// Levels external hardware drives onto CIA1's ports (keyboard matrix,
    /// joysticks).
    pub fn set_cia1_inputs(&mut self, port_a: u8, port_b: u8) {
        self.bus.cia1.set_port_a_input(port_a);
        self.bus.cia1.set_port_b_input(port_b);
    }

    #[must_use]
    pub fn interrupts(&self) -> &InterruptLatch {
        &self.bus.interrupts
    }

    #[must_use]
    pub fn arbiter(&self) -> &BusArbiter {
        &self.bus.arbiter
    }

    #[must_use]
    pub fn memory(&self) -> &dyn MemoryMap {
        &*self.bus.memory
    }

    pub fn memory_mut(&mut self) -> &mut dyn MemoryMap {
        &mut *self.bus.memory
    }

    /// Flat copy of all machine state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            config: self.config,
            cpu: self.cpu.snapshot(),
            vic: self.bus.vic.snapshot(),
            cia1: self.bus.cia1.snapshot(),
            cia2: self.bus.cia2.snapshot(),
            interrupts: self.bus.interrupts,
            arbiter: self.bus.arbiter,
            clock: self.bus.clock_state(),
            memory: self.bus.memory.image(),
        }
    }

    /// Load state from a snapshot taken on a machine with the same
    /// configuration. The pixel sink stays attached.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.cpu.restore(&snapshot.cpu);
        self.bus.vic.restore(&snapshot.vic);
        self.bus.cia1.restore(&snapshot.cia1);
        self.bus.cia2.restore(&snapshot.cia2);
        self.bus.interrupts = snapshot.interrupts;
        self.bus.arbiter = snapshot.arbiter;
        self.bus.restore_clock(snapshot.clock);
        self.bus.memory.load_image(&snapshot.memory);
    }
}

impl Observable for C64 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("vic.") {
            self.bus.vic.query(rest)
        } else if let Some(rest) = path.strip_prefix("cia1.") {
            self.bus.cia1.query(rest)
        } else if let Some(rest) = path.strip_prefix("cia2.") {
            self.bus.cia2.query(rest)
        } else if let Some(rest) = path.strip_prefix("irq.") {
            let latch = &self.bus.interrupts;
            match rest {
                "line" => Some(latch.irq_line().into()),
                "visible" => Some(latch.irq().into()),
                "nmi_line" => Some(latch.nmi_line().into()),
                "nmi_pending" => Some(latch.nmi_pending().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("bus.") {
            let arbiter = &self.bus.arbiter;
            match rest {
                "normal" => Some(arbiter.counted(BusCycle::Normal).into()),
                "dumb" => Some(arbiter.counted(BusCycle::Dumb).into()),
                "stolen" => Some(arbiter.counted(BusCycle::Stolen).into()),
                "waiting" => Some(arbiter.counted(BusCycle::Waiting).into()),
                "takeovers" => Some(arbiter.takeovers().into()),
                "ba_low" => Some(arbiter.ba_low().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let address = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix('$')) {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            address.map(|a| Value::U8(self.bus.memory.peek(a)))
        } else {
            match path {
                "ticks" => Some(self.bus.ticks().into()),
                "frame_count" => Some(self.frame_count().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6502 paths>",
            "vic.<VIC-II paths>",
            "cia1.<CIA paths>",
            "cia2.<CIA paths>",
            "irq.line",
            "irq.visible",
            "irq.nmi_line",
            "irq.nmi_pending",
            "bus.normal",
            "bus.dumb",
            "bus.stolen",
            "bus.waiting",
            "bus.takeovers",
            "bus.ba_low",
            "memory.<address>",
            "ticks",
            "frame_count",
        ]
    }
}
