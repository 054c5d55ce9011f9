//! Time-of-day clock.
//!
//! Four packed-BCD fields (tenths, seconds, minutes, hours with bit 7 as
//! PM) advanced by the TOD pin. The pin pulses at mains frequency, which
//! the machine derives from the master clock with a fixed divisor; the
//! chip divides that again by 5 or 6 to get tenths.

/// Field indices, in register order.
const TENTHS: usize = 0;
const HOURS: usize = 3;

/// Write masks per field.
const FIELD_MASK: [u8; 4] = [0x0F, 0x7F, 0x7F, 0x9F];

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeOfDay {
    /// Tenths, seconds, minutes, hours.
    pub time: [u8; 4],
    pub alarm: [u8; 4],
    /// Read copy, frozen by an hours read until tenths is read.
    pub latch: [u8; 4],
    pub latched: bool,
    /// Stopped by an hours write until tenths is written.
    pub halted: bool,
    /// Ticks per TOD pin pulse.
    pub divisor: u32,
    pub pin_counter: u32,
    /// Pin pulses since the last tenth.
    pub pulses: u8,
}

impl TimeOfDay {
    #[must_use]
    pub fn new(divisor: u32) -> Self {
        Self {
            time: [0x00, 0x00, 0x00, 0x01],
            alarm: [0; 4],
            latch: [0; 4],
            latched: false,
            halted: false,
            divisor: divisor.max(1),
            pin_counter: 0,
            pulses: 0,
        }
    }

    /// Advance one tick. `fifty_hz` selects 5 pin pulses per tenth instead
    /// of 6. Returns true when the clock steps onto the alarm time.
    pub fn tick(&mut self, fifty_hz: bool) -> bool {
        self.pin_counter += 1;
        if self.pin_counter < self.divisor {
            return false;
        }
        self.pin_counter = 0;
        if self.halted {
            return false;
        }
        self.pulses += 1;
        if self.pulses < if fifty_hz { 5 } else { 6 } {
            return false;
        }
        self.pulses = 0;
        self.advance();
        self.alarm_matches()
    }

    fn advance(&mut self) {
        let [tenths, seconds, minutes, hours] = &mut self.time;
        if *tenths != 0x09 {
            *tenths = (*tenths + 1) & 0x0F;
            return;
        }
        *tenths = 0;
        if !bcd_step(seconds) || !bcd_step(minutes) {
            return;
        }
        let pm = *hours & 0x80;
        *hours = match *hours & 0x1F {
            0x11 => 0x12 | (pm ^ 0x80),
            0x12 => 0x01 | pm,
            hour => bcd_increment(hour) | pm,
        };
    }

    #[must_use]
    pub fn alarm_matches(&self) -> bool {
        self.time == self.alarm
    }

    /// Register read. Hours freezes the read copy, tenths releases it.
    pub fn read(&mut self, field: usize) -> u8 {
        if field == HOURS && !self.latched {
            self.latch = self.time;
            self.latched = true;
        }
        let value = self.peek(field);
        if field == TENTHS {
            self.latched = false;
        }
        value
    }

    #[must_use]
    pub fn peek(&self, field: usize) -> u8 {
        if self.latched {
            self.latch[field]
        } else {
            self.time[field]
        }
    }

    /// Register write to the clock or, with `to_alarm`, the alarm. Returns
    /// true if the write makes the clock equal to the alarm.
    pub fn write(&mut self, field: usize, value: u8, to_alarm: bool) -> bool {
        let mut value = value & FIELD_MASK[field];
        if to_alarm {
            self.alarm[field] = value;
        } else {
            match field {
                HOURS => {
                    if value & 0x1F == 0x12 {
                        value ^= 0x80;
                    }
                    self.halted = true;
                }
                TENTHS => {
                    self.halted = false;
                    self.pulses = 0;
                }
                _ => {}
            }
            self.time[field] = value;
        }
        self.alarm_matches()
    }

    /// Packed `hours:minutes:seconds:tenths` for observers.
    #[must_use]
    pub fn packed(fields: [u8; 4]) -> u32 {
        u32::from_le_bytes(fields)
    }
}

/// Increment a 00-59 BCD field; returns true on wrap to 00.
fn bcd_step(field: &mut u8) -> bool {
    if *field == 0x59 {
        *field = 0;
        true
    } else {
        *field = bcd_increment(*field);
        false
    }
}

fn bcd_increment(value: u8) -> u8 {
    if value & 0x0F >= 0x09 {
        (value & 0xF0).wrapping_add(0x10)
    } else {
        value + 1
    }
}
