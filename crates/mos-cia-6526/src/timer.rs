//! 16-bit interval timer.
//!
//! Starting a timer does not load the counter straight away: the start bit
//! moves it to `Armed`, and the following tick copies the latch into the
//! counter and begins counting. Underflow happens on the tick that finds
//! the counter at zero, so a latch of N gives a period of N+1 ticks.

/// Timer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimerState {
    #[default]
    Stopped,
    /// Start bit written; the counter loads on the next tick.
    Armed,
    Running,
    /// One-shot underflow happened; the latch reloads on the next tick and
    /// the timer stops.
    OneShotPendingReload,
}

impl TimerState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Armed => "Armed",
            Self::Running => "Running",
            Self::OneShotPendingReload => "OneShotPendingReload",
        }
    }
}

/// One timer: counter, reload latch and state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timer {
    pub counter: u16,
    pub latch: u16,
    pub state: TimerState,
    pub one_shot: bool,
}

impl Timer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: 0xFFFF,
            latch: 0xFFFF,
            state: TimerState::Stopped,
            one_shot: false,
        }
    }

    /// True while the control register's start bit reads back as set.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        matches!(self.state, TimerState::Armed | TimerState::Running)
    }

    /// Advance one tick. `count` is whether this tick carries an input
    /// event for the selected source. Returns true on underflow.
    pub fn tick(&mut self, count: bool) -> bool {
        match self.state {
            TimerState::Stopped => false,
            TimerState::Armed => {
                self.counter = self.latch;
                self.state = TimerState::Running;
                false
            }
            TimerState::OneShotPendingReload => {
                self.counter = self.latch;
                self.state = TimerState::Stopped;
                false
            }
            TimerState::Running => {
                if !count {
                    return false;
                }
                if self.counter == 0 {
                    if self.one_shot {
                        self.state = TimerState::OneShotPendingReload;
                    } else {
                        self.counter = self.latch;
                    }
                    true
                } else {
                    self.counter -= 1;
                    false
                }
            }
        }
    }

    pub fn write_latch_lo(&mut self, value: u8) {
        self.latch = (self.latch & 0xFF00) | u16::from(value);
    }

    /// High latch byte. A stopped timer also loads its counter.
    pub fn write_latch_hi(&mut self, value: u8) {
        self.latch = (self.latch & 0x00FF) | (u16::from(value) << 8);
        if self.state == TimerState::Stopped {
            self.counter = self.latch;
        }
    }

    /// Apply the start, run-mode and force-load bits of a control write.
    pub fn control(&mut self, start: bool, one_shot: bool, force_load: bool) {
        self.one_shot = one_shot;
        if force_load {
            self.counter = self.latch;
        }
        self.state = match (self.state, start) {
            (TimerState::Running, true) => TimerState::Running,
            (TimerState::OneShotPendingReload, false) => TimerState::OneShotPendingReload,
            (_, true) => TimerState::Armed,
            (_, false) => TimerState::Stopped,
        };
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
