//! Bus arbitration between the CPU and VIC-II DMA.
//!
//! The VIC-II takes the bus in two steps. BA drops three cycles before the
//! chip needs the bus; from then on the CPU stops at its next read, but may
//! finish up to three writes. Then AEC goes low and the VIC-II owns the bus
//! outright.
//!
//! Takeover windows per line:
//!
//! | Cause            | BA low                     | VIC-II owns        |
//! |------------------|----------------------------|--------------------|
//! | Badline          | 12..=54                    | 15..=54 (40 ticks) |
//! | Sprite n DMA     | slot-3 ..= slot+1          | slot, slot+1       |
//!
//! A badline steals the 40 ticks the VIC-II owns. The three BA cycles in
//! front of them are a separate cost: a read stops there ([`BusCycle::Waiting`])
//! while up to three writes still go through.
//!
//! A badline forced by a mid-line $D011 write starts BA at the write and
//! ownership three cycles later. Sprite windows near the end of a line wrap
//! into the next.

use mos_vic_ii::Vic;
use serde::{Deserialize, Serialize};

/// Classification of one CPU bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusCycle {
    /// A real access.
    Normal,
    /// A timing-only access.
    Dumb,
    /// A tick the CPU wanted but the VIC-II had.
    Stolen,
    /// A tick the CPU spent stopped on BA before the VIC-II took the bus.
    Waiting,
}

/// Bus arbiter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusArbiter {
    ba_low: bool,
    owned: bool,
    /// Consecutive ticks with BA low, including this one.
    ba_low_run: u32,

    normal: u64,
    dumb: u64,
    stolen: u64,
    waiting: u64,
    takeovers: u64,
}

impl BusArbiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Work out this tick's BA and AEC from the VIC-II, after its tick.
    pub fn advance(&mut self, vic: &Vic) {
        let cycle = vic.cycle();
        let mut ba_low = false;
        let mut owned = false;

        if vic.badline() {
            let ba_from = vic.badline_from().max(12);
            let owned_from = (ba_from + 3).max(15);
            ba_low |= (ba_from..=54).contains(&cycle);
            owned |= (owned_from..=54).contains(&cycle);
        }

        let dma = vic.sprite_dma();
        if dma != 0 {
            let model = vic.model();
            let cycles = model.cycles_per_line();
            for (n, slot) in model.sprite_slots().into_iter().enumerate() {
                if dma & (1 << n) == 0 {
                    continue;
                }
                if cycle == slot || cycle == slot + 1 {
                    owned = true;
                    ba_low = true;
                }
                // Three cycles before the slot, wrapping to the previous line.
                ba_low |= (1..=3).any(|k| wrap_back(slot, k, cycles) == cycle);
            }
        }

        self.ba_low = ba_low;
        self.owned = owned;
        self.ba_low_run = if ba_low { self.ba_low_run + 1 } else { 0 };
        if owned {
            self.takeovers += 1;
        }
    }

    /// How a tick the CPU could not use is counted.
    #[must_use]
    pub fn denied(&self) -> BusCycle {
        if self.owned { BusCycle::Stolen } else { BusCycle::Waiting }
    }

    /// May the CPU perform its access on this tick?
    #[must_use]
    pub fn allows(&self, write: bool) -> bool {
        if write {
            !self.owned && self.ba_low_run <= 3
        } else {
            !self.ba_low
        }
    }

    /// Record what the CPU did with a tick.
    pub fn count(&mut self, cycle: BusCycle) {
        match cycle {
            BusCycle::Normal => self.normal += 1,
            BusCycle::Dumb => self.dumb += 1,
            BusCycle::Stolen => self.stolen += 1,
            BusCycle::Waiting => self.waiting += 1,
        }
    }

    /// Ticks counted as each [`BusCycle`] kind.
    #[must_use]
    pub fn counted(&self, cycle: BusCycle) -> u64 {
        match cycle {
            BusCycle::Normal => self.normal,
            BusCycle::Dumb => self.dumb,
            BusCycle::Stolen => self.stolen,
            BusCycle::Waiting => self.waiting,
        }
    }

    /// Ticks on which the VIC-II owned the bus, whether or not the CPU
    /// wanted it.
    #[must_use]
    pub fn takeovers(&self) -> u64 {
        self.takeovers
    }

    #[must_use]
    pub fn ba_low(&self) -> bool {
        self.ba_low
    }

    #[must_use]
    pub fn owned(&self) -> bool {
        self.owned
    }
}

/// `slot - back` on a 1-based line of `cycles` cycles.
fn wrap_back(slot: u8, back: u8, cycles: u8) -> u8 {
    let zero_based = u16::from(slot - 1) + u16::from(cycles) - u16::from(back);
    (zero_based % u16::from(cycles)) as u8 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use mos_vic_ii::{VicMemory, VicModel};

    struct Blank;

    impl VicMemory for Blank {
        fn vic_read(&self, _address: u16) -> u8 {
            0
        }

        fn colour_read(&self, _offset: u16) -> u8 {
            0
        }
    }

    /// Windows (BA low, owned) per cycle across `lines` lines starting at
    /// the VIC-II's current position.
    fn trace(vic: &mut Vic, lines: usize) -> Vec<(u16, u8, bool, bool)> {
        let mut arbiter = BusArbiter::new();
        let mut out = Vec::new();
        for _ in 0..lines * 63 {
            vic.tick(&Blank);
            arbiter.advance(vic);
            out.push((vic.raster_y(), vic.cycle(), arbiter.ba_low(), arbiter.owned()));
        }
        out
    }

    #[test]
    fn wrap_back_crosses_line_start() {
        assert_eq!(wrap_back(58, 3, 63), 55);
        assert_eq!(wrap_back(1, 1, 63), 63);
        assert_eq!(wrap_back(1, 3, 63), 61);
        assert_eq!(wrap_back(3, 3, 65), 65);
    }

    #[test]
    fn badline_window() {
        let mut vic = Vic::new(VicModel::Pal);
        vic.write(0x11, 0x1B);
        for _ in 0..0x33 * 63 {
            vic.tick(&Blank);
        }
        let line = trace(&mut vic, 1);
        let ba: Vec<u8> = line.iter().filter(|t| t.2).map(|t| t.1).collect();
        let owned: Vec<u8> = line.iter().filter(|t| t.3).map(|t| t.1).collect();
        assert_eq!(ba, (12..=54).collect::<Vec<u8>>());
        assert_eq!(owned, (15..=54).collect::<Vec<u8>>());
    }

    #[test]
    fn sprite_zero_window() {
        let mut vic = Vic::new(VicModel::Pal);
        vic.write(0x15, 0x01);
        vic.write(0x01, 0x40);
        for _ in 0..0x41 * 63 {
            vic.tick(&Blank);
        }
        let line = trace(&mut vic, 1);
        let ba: Vec<u8> = line.iter().filter(|t| t.2).map(|t| t.1).collect();
        let owned: Vec<u8> = line.iter().filter(|t| t.3).map(|t| t.1).collect();
        assert_eq!(ba, vec![55, 56, 57, 58, 59]);
        assert_eq!(owned, vec![58, 59]);
    }

    #[test]
    fn writes_pass_for_three_ba_cycles() {
        let mut arbiter = BusArbiter::new();
        arbiter.ba_low = true;
        for _ in 0..3 {
            arbiter.ba_low_run += 1;
            assert!(arbiter.allows(true));
            assert!(!arbiter.allows(false));
        }
        arbiter.ba_low_run += 1;
        assert!(!arbiter.allows(true));
    }
}
