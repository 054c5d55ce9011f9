//! Tick-exact Commodore 64 co-simulation core.
//!
//! One shared clock drives the 6510 CPU, the VIC-II and both CIAs. The
//! master clock ticks at CPU cycle rate (985,248 Hz PAL, 1,022,727 Hz
//! NTSC). The VIC-II steals ticks from the CPU for badlines and sprite
//! DMA; the CIAs count every tick regardless.
//!
//! Out of the box the machine has no ROMs: give it a [`FlatMemory`] with a
//! program and a reset vector, or a [`BankedMemory`] with the stock ROM
//! images.

mod arbiter;
mod bus;
mod c64;
mod config;
mod interrupt;
mod memory;
mod snapshot;

pub use arbiter::{BusArbiter, BusCycle};
pub use bus::{C64Bus, ClockState};
pub use c64::C64;
pub use config::{C64Config, ConfigError, GlueLogic};
pub use interrupt::{InterruptLatch, Source};
pub use memory::{BankedMemory, FlatMemory, MemoryImage, MemoryMap};
pub use snapshot::Snapshot;

pub use mos_cia_6526::CiaRevision;
pub use mos_vic_ii::{FrameBuffer, PixelSink, VicModel};
