//! Whole-machine snapshots.
//!
//! Every field is a flat copy of chip state; no pointers, no sinks.
//! Restoring into a machine built from the same [`C64Config`] continues
//! execution tick for tick. The container format is left to the caller;
//! the struct derives serde.

use mos_6502::CpuState;
use mos_cia_6526::CiaState;
use mos_vic_ii::VicState;
use serde::{Deserialize, Serialize};

use crate::arbiter::BusArbiter;
use crate::bus::ClockState;
use crate::config::C64Config;
use crate::interrupt::InterruptLatch;
use crate::memory::MemoryImage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Configuration the snapshot was taken under.
    pub config: C64Config,
    pub cpu: CpuState,
    pub vic: VicState,
    pub cia1: CiaState,
    pub cia2: CiaState,
    pub interrupts: InterruptLatch,
    pub arbiter: BusArbiter,
    pub clock: ClockState,
    pub memory: MemoryImage,
}
