//! MOS 6526 Complex Interface Adapter (CIA).
//!
//! Two in the C64: CIA1 drives IRQ (keyboard, joysticks, the system timer)
//! and CIA2 drives NMI (serial bus, user port, VIC-II bank select).
//!
//! Each chip has two 8-bit ports, two 16-bit timers that can cascade, a
//! BCD time-of-day clock with alarm, a serial shift register and an
//! interrupt control register (ICR).
//!
//! # Registers
//!
//! | Reg | Read                  | Write                    |
//! |-----|-----------------------|--------------------------|
//! | $x0 | Port A                | Port A                   |
//! | $x1 | Port B (PB6/7 timers) | Port B                   |
//! | $x2 | DDR A                 | DDR A                    |
//! | $x3 | DDR B                 | DDR B                    |
//! | $x4 | Timer A low (count)   | Timer A low (latch)      |
//! | $x5 | Timer A high (count)  | Timer A high (latch)     |
//! | $x6 | Timer B low (count)   | Timer B low (latch)      |
//! | $x7 | Timer B high (count)  | Timer B high (latch)     |
//! | $x8 | TOD tenths (unlatch)  | TOD/alarm tenths (start) |
//! | $x9 | TOD seconds           | TOD/alarm seconds        |
//! | $xA | TOD minutes           | TOD/alarm minutes        |
//! | $xB | TOD hours (latch)     | TOD/alarm hours (halt)   |
//! | $xC | Serial data           | Serial data              |
//! | $xD | ICR (read clears)     | ICR mask (bit 7 set/clr) |
//! | $xE | Control A             | Control A                |
//! | $xF | Control B             | Control B                |

mod serial;
mod timer;
mod tod;

use emu_core::{Observable, Tickable, Value};
use log::{debug, trace};

pub use serial::SerialPort;
pub use timer::{Timer, TimerState};
pub use tod::TimeOfDay;

/// ICR source bits.
pub const ICR_TIMER_A: u8 = 0x01;
pub const ICR_TIMER_B: u8 = 0x02;
pub const ICR_ALARM: u8 = 0x04;
pub const ICR_SERIAL: u8 = 0x08;
pub const ICR_FLAG: u8 = 0x10;

/// Chip revision. The two differ in how fast an ICR flag reaches the
/// interrupt output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CiaRevision {
    /// Original 6526: the output asserts one tick after the flag. An ICR
    /// read in that tick clears the flag before the output ever asserts.
    #[default]
    Mos6526,
    /// Corrected 6526A: the output follows the flag in the same tick.
    Mos6526A,
}

/// Flat copy of all chip state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CiaState {
    pub port_a: u8,
    pub port_b: u8,
    pub ddr_a: u8,
    pub ddr_b: u8,
    pub external_a: u8,
    pub external_b: u8,
    pub timer_a: Timer,
    pub timer_b: Timer,
    pub cra: u8,
    pub crb: u8,
    pub pb_pulse: [bool; 2],
    pub pb_toggle: [bool; 2],
    pub icr_flags: u8,
    pub icr_mask: u8,
    pub irq_line: bool,
    pub irq_pending: bool,
    pub tod: TimeOfDay,
    pub serial: SerialPort,
}

/// One CIA instance.
pub struct Cia {
    label: &'static str,
    revision: CiaRevision,

    port_a: u8,
    port_b: u8,
    ddr_a: u8,
    ddr_b: u8,
    /// Levels driven onto the port pins from outside.
    external_a: u8,
    external_b: u8,

    timer_a: Timer,
    timer_b: Timer,
    /// Control registers; bit 0 reads back from the timer state and the
    /// force-load strobe is never stored.
    cra: u8,
    crb: u8,
    /// PB6/PB7 in pulse mode: high for the tick of the underflow.
    pb_pulse: [bool; 2],
    /// PB6/PB7 in toggle mode.
    pb_toggle: [bool; 2],

    icr_flags: u8,
    icr_mask: u8,
    irq_line: bool,
    /// 6526 only: the output asserts at the start of the next tick.
    irq_pending: bool,

    tod: TimeOfDay,
    serial: SerialPort,
}

impl Cia {
    /// `tod_divisor` is the number of ticks per TOD pin pulse.
    #[must_use]
    pub fn new(label: &'static str, revision: CiaRevision, tod_divisor: u32) -> Self {
        Self {
            label,
            revision,
            port_a: 0,
            port_b: 0,
            ddr_a: 0,
            ddr_b: 0,
            external_a: 0xFF,
            external_b: 0xFF,
            timer_a: Timer::new(),
            timer_b: Timer::new(),
            cra: 0,
            crb: 0,
            pb_pulse: [false; 2],
            pb_toggle: [false; 2],
            icr_flags: 0,
            icr_mask: 0,
            irq_line: false,
            irq_pending: false,
            tod: TimeOfDay::new(tod_divisor),
            serial: SerialPort::new(),
        }
    }

    /// Hardware reset. Port inputs and the TOD divisor are external and
    /// survive.
    pub fn reset(&mut self) {
        let external_a = self.external_a;
        let external_b = self.external_b;
        let divisor = self.tod.divisor;
        *self = Self::new(self.label, self.revision, divisor);
        self.external_a = external_a;
        self.external_b = external_b;
    }

    #[must_use]
    pub fn revision(&self) -> CiaRevision {
        self.revision
    }

    /// State of the IRQ/NMI output (active high here; the pin is active
    /// low).
    #[must_use]
    pub fn irq_active(&self) -> bool {
        self.irq_line
    }

    // =========================================================================
    // Register access
    // =========================================================================

    /// Register read with side effects (ICR clear, TOD latch).
    pub fn read(&mut self, reg: u8) -> u8 {
        let value = match reg & 0x0F {
            0x08..=0x0B => self.tod.read(usize::from(reg & 0x03)),
            0x0D => self.read_icr_and_clear(),
            r => self.peek(r),
        };
        trace!(target: "cia::reg", "{} R ${:X} -> ${value:02X}", self.label, reg & 0x0F);
        value
    }

    /// Register read without side effects.
    #[must_use]
    pub fn peek(&self, reg: u8) -> u8 {
        match reg & 0x0F {
            0x00 => (self.port_a & self.ddr_a) | (self.external_a & !self.ddr_a),
            0x01 => self.read_port_b(),
            0x02 => self.ddr_a,
            0x03 => self.ddr_b,
            0x04 => self.timer_a.counter as u8,
            0x05 => (self.timer_a.counter >> 8) as u8,
            0x06 => self.timer_b.counter as u8,
            0x07 => (self.timer_b.counter >> 8) as u8,
            r @ 0x08..=0x0B => self.tod.peek(usize::from(r & 0x03)),
            0x0C => self.serial.data,
            0x0D => self.icr_flags | if self.irq_line { 0x80 } else { 0 },
            0x0E => (self.cra & !0x01) | u8::from(self.timer_a.is_started()),
            _ => (self.crb & !0x01) | u8::from(self.timer_b.is_started()),
        }
    }

    fn read_port_b(&self) -> u8 {
        let mut value = (self.port_b & self.ddr_b) | (self.external_b & !self.ddr_b);
        if self.cra & 0x02 != 0 {
            value = (value & !0x40) | (u8::from(self.timer_output(0)) << 6);
        }
        if self.crb & 0x02 != 0 {
            value = (value & !0x80) | (u8::from(self.timer_output(1)) << 7);
        }
        value
    }

    fn timer_output(&self, timer: usize) -> bool {
        let control = if timer == 0 { self.cra } else { self.crb };
        if control & 0x04 != 0 {
            self.pb_toggle[timer]
        } else {
            self.pb_pulse[timer]
        }
    }

    /// ICR read: returns the flags with bit 7 reflecting the output, then
    /// clears everything and drops the output.
    ///
    /// This is where the two [`CiaRevision`]s differ for software. On the
    /// 6526 a timer underflow sets its flag one tick before the output
    /// follows; a read in that tick sees the flag with bit 7 clear and
    /// clears it, so the interrupt never asserts even though the timer has
    /// already reloaded and counts on. The 6526A drives the output in the
    /// same tick and has no such window.
    pub fn read_icr_and_clear(&mut self) -> u8 {
        let value = self.icr_flags | if self.irq_line { 0x80 } else { 0 };
        if self.irq_pending {
            debug!("{}: ICR read cancelled a pending interrupt", self.label);
        }
        self.icr_flags = 0;
        self.irq_line = false;
        self.irq_pending = false;
        value
    }

    pub fn write(&mut self, reg: u8, value: u8) {
        trace!(target: "cia::reg", "{} W ${:X} = ${value:02X}", self.label, reg & 0x0F);
        match reg & 0x0F {
            0x00 => self.port_a = value,
            0x01 => self.port_b = value,
            0x02 => self.ddr_a = value,
            0x03 => self.ddr_b = value,
            0x04 => self.timer_a.write_latch_lo(value),
            0x05 => self.timer_a.write_latch_hi(value),
            0x06 => self.timer_b.write_latch_lo(value),
            0x07 => self.timer_b.write_latch_hi(value),
            r @ 0x08..=0x0B => {
                let to_alarm = self.crb & 0x80 != 0;
                if self.tod.write(usize::from(r & 0x03), value, to_alarm) {
                    self.raise(ICR_ALARM);
                }
            }
            0x0C => self.serial.write(value),
            0x0D => {
                if value & 0x80 != 0 {
                    self.icr_mask |= value & 0x1F;
                } else {
                    self.icr_mask &= !(value & 0x1F);
                }
                self.update_output();
            }
            0x0E => {
                if value & 0x01 != 0 && !self.timer_a.is_started() {
                    self.pb_toggle[0] = true;
                }
                self.timer_a
                    .control(value & 0x01 != 0, value & 0x08 != 0, value & 0x10 != 0);
                self.cra = value & !0x10;
            }
            _ => {
                if value & 0x01 != 0 && !self.timer_b.is_started() {
                    self.pb_toggle[1] = true;
                }
                self.timer_b
                    .control(value & 0x01 != 0, value & 0x08 != 0, value & 0x10 != 0);
                self.crb = value & !0x10;
            }
        }
    }

    // =========================================================================
    // Interrupts and pins
    // =========================================================================

    /// Set ICR flags and drive the output according to the revision.
    fn raise(&mut self, bits: u8) {
        self.icr_flags |= bits;
        self.update_output();
    }

    fn update_output(&mut self) {
        if self.irq_line || self.icr_flags & self.icr_mask & 0x1F == 0 {
            return;
        }
        match self.revision {
            CiaRevision::Mos6526A => self.irq_line = true,
            CiaRevision::Mos6526 => self.irq_pending = true,
        }
    }

    /// Negative edge on the FLAG pin (cassette read, serial SRQ).
    pub fn pulse_flag(&mut self) {
        self.raise(ICR_FLAG);
    }

    /// Levels driven onto port A by external hardware.
    pub fn set_port_a_input(&mut self, value: u8) {
        self.external_a = value;
    }

    /// Levels driven onto port B by external hardware.
    pub fn set_port_b_input(&mut self, value: u8) {
        self.external_b = value;
    }

    /// Port A pin levels as seen from outside; inputs float high.
    #[must_use]
    pub fn port_a_output(&self) -> u8 {
        (self.port_a & self.ddr_a) | !self.ddr_a
    }

    /// Port B pin levels as seen from outside; inputs float high.
    #[must_use]
    pub fn port_b_output(&self) -> u8 {
        (self.port_b & self.ddr_b) | !self.ddr_b
    }

    /// Serial data pin level.
    #[must_use]
    pub fn sp_output(&self) -> bool {
        self.serial.sp
    }

    // =========================================================================
    // Inspection and snapshots
    // =========================================================================

    #[must_use]
    pub fn timer_a(&self) -> &Timer {
        &self.timer_a
    }

    #[must_use]
    pub fn timer_b(&self) -> &Timer {
        &self.timer_b
    }

    #[must_use]
    pub fn icr_flags(&self) -> u8 {
        self.icr_flags
    }

    #[must_use]
    pub fn icr_mask(&self) -> u8 {
        self.icr_mask
    }

    #[must_use]
    pub fn tod(&self) -> &TimeOfDay {
        &self.tod
    }

    #[must_use]
    pub fn snapshot(&self) -> CiaState {
        CiaState {
            port_a: self.port_a,
            port_b: self.port_b,
            ddr_a: self.ddr_a,
            ddr_b: self.ddr_b,
            external_a: self.external_a,
            external_b: self.external_b,
            timer_a: self.timer_a.clone(),
            timer_b: self.timer_b.clone(),
            cra: self.cra,
            crb: self.crb,
            pb_pulse: self.pb_pulse,
            pb_toggle: self.pb_toggle,
            icr_flags: self.icr_flags,
            icr_mask: self.icr_mask,
            irq_line: self.irq_line,
            irq_pending: self.irq_pending,
            tod: self.tod.clone(),
            serial: self.serial.clone(),
        }
    }

    pub fn restore(&mut self, state: &CiaState) {
        self.port_a = state.port_a;
        self.port_b = state.port_b;
        self.ddr_a = state.ddr_a;
        self.ddr_b = state.ddr_b;
        self.external_a = state.external_a;
        self.external_b = state.external_b;
        self.timer_a = state.timer_a.clone();
        self.timer_b = state.timer_b.clone();
        self.cra = state.cra;
        self.crb = state.crb;
        self.pb_pulse = state.pb_pulse;
        self.pb_toggle = state.pb_toggle;
        self.icr_flags = state.icr_flags;
        self.icr_mask = state.icr_mask;
        self.irq_line = state.irq_line;
        self.irq_pending = state.irq_pending;
        self.tod = state.tod.clone();
        self.serial = state.serial.clone();
    }
}

impl Tickable for Cia {
    /// One phi2 cycle: pending output, timers, serial port, TOD.
    fn tick(&mut self) {
        if self.irq_pending {
            self.irq_pending = false;
            self.irq_line = true;
        }
        self.pb_pulse = [false; 2];

        let mut flags = 0;

        // CRA bit 5 selects CNT, which never transitions here.
        let ta_underflow = self.timer_a.tick(self.cra & 0x20 == 0);
        if ta_underflow {
            flags |= ICR_TIMER_A;
            self.pb_pulse[0] = true;
            self.pb_toggle[0] = !self.pb_toggle[0];
            if self.timer_a.state == TimerState::OneShotPendingReload {
                debug!("{}: timer A one-shot underflow", self.label);
            }
            if self.cra & 0x40 != 0 && self.serial.shift_out() {
                flags |= ICR_SERIAL;
            }
        }

        // CRB bits 6-5: phi2, CNT, TA underflow, TA underflow while CNT high.
        // CNT idles high.
        let tb_input = match (self.crb >> 5) & 0x03 {
            0 => true,
            1 => false,
            _ => ta_underflow,
        };
        if self.timer_b.tick(tb_input) {
            flags |= ICR_TIMER_B;
            self.pb_pulse[1] = true;
            self.pb_toggle[1] = !self.pb_toggle[1];
            if self.timer_b.state == TimerState::OneShotPendingReload {
                debug!("{}: timer B one-shot underflow", self.label);
            }
        }

        if self.tod.tick(self.cra & 0x80 != 0) {
            flags |= ICR_ALARM;
        }

        if flags != 0 {
            self.raise(flags);
        }
    }
}

impl Observable for Cia {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "port_a" => Some(self.peek(0x00).into()),
            "port_b" => Some(self.peek(0x01).into()),
            "ddr_a" => Some(self.ddr_a.into()),
            "ddr_b" => Some(self.ddr_b.into()),
            "timer_a" => Some(self.timer_a.counter.into()),
            "timer_a.latch" => Some(self.timer_a.latch.into()),
            "timer_a.state" => Some(self.timer_a.state.name().into()),
            "timer_b" => Some(self.timer_b.counter.into()),
            "timer_b.latch" => Some(self.timer_b.latch.into()),
            "timer_b.state" => Some(self.timer_b.state.name().into()),
            "cra" => Some(self.peek(0x0E).into()),
            "crb" => Some(self.peek(0x0F).into()),
            "icr.flags" => Some(self.icr_flags.into()),
            "icr.mask" => Some(self.icr_mask.into()),
            "irq" => Some(self.irq_line.into()),
            "tod" => Some(TimeOfDay::packed(self.tod.time).into()),
            "tod.alarm" => Some(TimeOfDay::packed(self.tod.alarm).into()),
            "tod.latched" => Some(self.tod.latched.into()),
            "sdr" => Some(self.serial.data.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "port_a", "port_b", "ddr_a", "ddr_b", "timer_a", "timer_a.latch",
            "timer_a.state", "timer_b", "timer_b.latch", "timer_b.state", "cra", "crb",
            "icr.flags", "icr.mask", "irq", "tod", "tod.alarm", "tod.latched", "sdr",
        ]
    }
}
