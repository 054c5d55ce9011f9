//! Machine configuration, consumed at construction.

use emu_core::MasterClock;
use mos_cia_6526::CiaRevision;
use mos_vic_ii::VicModel;
use thiserror::Error;

/// How the VIC-II interrupt output reaches the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum GlueLogic {
    /// Discrete TTL glue (early boards).
    #[default]
    Discrete,
    /// Custom glue IC (later boards): the VIC-II interrupt arrives one
    /// tick late.
    CustomIc,
}

/// Configuration for constructing a [`crate::C64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct C64Config {
    /// Video standard; fixes the master clock and frame geometry.
    pub model: VicModel,
    pub glue: GlueLogic,
    pub cia_revision: CiaRevision,
    /// CPU bus cycles per video tick. 1 on a stock machine.
    pub cpu_clock_multiplier: u8,
    /// Ticks per mains pulse on the CIA TOD pins. `None` derives it from
    /// the model's clock and mains frequency.
    pub tod_divisor: Option<u32>,
}

impl Default for C64Config {
    fn default() -> Self {
        Self {
            model: VicModel::Pal,
            glue: GlueLogic::Discrete,
            cia_revision: CiaRevision::Mos6526,
            cpu_clock_multiplier: 1,
            tod_divisor: None,
        }
    }
}

/// Configuration rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("CPU clock multiplier must be at least 1")]
    ZeroClockMultiplier,
    #[error("time-of-day divisor must be at least 1")]
    TodDivisorZero,
    #[error("{name} ROM must be {expected} bytes, got {actual}")]
    RomSize {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl C64Config {
    /// PAL defaults.
    #[must_use]
    pub fn pal() -> Self {
        Self::default()
    }

    /// NTSC defaults.
    #[must_use]
    pub fn ntsc() -> Self {
        Self {
            model: VicModel::Ntsc,
            ..Self::default()
        }
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// The first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cpu_clock_multiplier == 0 {
            return Err(ConfigError::ZeroClockMultiplier);
        }
        if self.tod_divisor == Some(0) {
            return Err(ConfigError::TodDivisorZero);
        }
        Ok(())
    }

    /// Master clock of the model at multiplier 1.
    #[must_use]
    pub fn master_clock(&self) -> MasterClock {
        MasterClock::new(self.model.clock_hz())
    }

    /// Effective TOD pin divisor.
    #[must_use]
    pub fn tod_divisor(&self) -> u32 {
        self.tod_divisor.unwrap_or_else(|| {
            self.master_clock()
                .ticks_per_period(self.model.mains_hz())
                .get() as u32
        })
    }
}
