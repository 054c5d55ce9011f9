//! Interrupt lines between the chips and the CPU.
//!
//! The VIC-II and CIA1 share the open-collector IRQ line; CIA2 drives NMI.
//! Each line passes through a two-tick countdown before the CPU may see it,
//! which is how an interrupt raised during the last cycle of an instruction
//! waits for the next instruction boundary.

use serde::{Deserialize, Serialize};

/// Ticks between a line going active and the CPU seeing it.
const LATENCY: u8 = 2;

/// A chip driving an interrupt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// VIC-II, on IRQ.
    Vic,
    /// CIA1, on IRQ.
    Cia1,
    /// CIA2, on NMI.
    Cia2,
}

impl Source {
    const fn irq_bit(self) -> u8 {
        match self {
            Self::Vic => 0x01,
            Self::Cia1 => 0x02,
            Self::Cia2 => 0x00,
        }
    }
}

/// IRQ and NMI as seen by the CPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptLatch {
    /// Asserted IRQ sources, one bit per [`Source`].
    irq_sources: u8,
    irq_countdown: u8,
    nmi_line: bool,
    /// Armed by a rising NMI edge, consumed by the CPU.
    nmi_edge: bool,
    nmi_countdown: u8,
}

impl InterruptLatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert a source's output.
    pub fn raise(&mut self, source: Source) {
        match source {
            Source::Cia2 => {
                if !self.nmi_line {
                    self.nmi_line = true;
                    self.nmi_edge = true;
                    self.nmi_countdown = LATENCY;
                }
            }
            _ => {
                if self.irq_sources == 0 {
                    self.irq_countdown = LATENCY;
                }
                self.irq_sources |= source.irq_bit();
            }
        }
    }

    /// Release a source's output.
    pub fn acknowledge(&mut self, source: Source) {
        match source {
            Source::Cia2 => self.nmi_line = false,
            _ => self.irq_sources &= !source.irq_bit(),
        }
    }

    /// Drive a source's output to `level`.
    pub fn set(&mut self, source: Source, level: bool) {
        if level {
            self.raise(source);
        } else {
            self.acknowledge(source);
        }
    }

    /// Once per tick, before the CPU's access.
    pub fn tick(&mut self) {
        self.irq_countdown = self.irq_countdown.saturating_sub(1);
        self.nmi_countdown = self.nmi_countdown.saturating_sub(1);
    }

    /// IRQ level as the CPU samples it.
    #[must_use]
    pub fn irq(&self) -> bool {
        self.irq_sources != 0 && self.irq_countdown == 0
    }

    /// A ripe NMI edge, if any; consumed by this call.
    pub fn take_nmi(&mut self) -> bool {
        if self.nmi_edge && self.nmi_countdown == 0 {
            self.nmi_edge = false;
            return true;
        }
        false
    }

    /// Raw IRQ line level, ignoring latency.
    #[must_use]
    pub fn irq_line(&self) -> bool {
        self.irq_sources != 0
    }

    #[must_use]
    pub fn nmi_line(&self) -> bool {
        self.nmi_line
    }

    /// An NMI edge is waiting for the CPU.
    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_edge
    }
}
