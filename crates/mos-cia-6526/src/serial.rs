//! Serial shift register, output mode.
//!
//! In output mode Timer A clocks the port: every underflow toggles CNT and
//! a bit leaves on SP every second underflow, MSB first. After eight bits
//! the SP interrupt fires, and a byte written meanwhile starts straight
//! away.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerialPort {
    /// Serial data register as written by the CPU.
    pub data: u8,
    /// Byte being shifted out.
    pub shift: u8,
    /// Bits still to send.
    pub bits_left: u8,
    /// A write is waiting for the shifter.
    pub loaded: bool,
    /// Second underflow of the current bit is due.
    pub half: bool,
    /// SP pin level.
    pub sp: bool,
}

impl SerialPort {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: 0,
            shift: 0,
            bits_left: 0,
            loaded: false,
            half: false,
            sp: false,
        }
    }

    pub fn write(&mut self, value: u8) {
        self.data = value;
        self.loaded = true;
    }

    /// One Timer A underflow in output mode. Returns true when the last
    /// bit of a byte has gone out.
    pub fn shift_out(&mut self) -> bool {
        if self.bits_left == 0 {
            if !self.loaded {
                return false;
            }
            self.shift = self.data;
            self.bits_left = 8;
            self.loaded = false;
            self.half = false;
        }
        if !self.half {
            self.sp = self.shift & 0x80 != 0;
            self.shift <<= 1;
            self.half = true;
            return false;
        }
        self.half = false;
        self.bits_left -= 1;
        self.bits_left == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_takes_sixteen_underflows() {
        let mut port = SerialPort::new();
        port.write(0b1010_0000);
        let mut levels = Vec::new();
        for n in 1..=16 {
            let done = port.shift_out();
            if n % 2 == 1 {
                levels.push(port.sp);
            }
            assert_eq!(done, n == 16, "underflow {n}");
        }
        assert_eq!(levels, [true, false, true, false, false, false, false, false]);
        assert!(!port.shift_out(), "idle without a new byte");
    }

    #[test]
    fn queued_byte_follows_immediately() {
        let mut port = SerialPort::new();
        port.write(0xFF);
        port.shift_out();
        port.write(0x00);
        let interrupts = (0..31).filter(|_| port.shift_out()).count();
        assert_eq!(interrupts, 2);
    }
}
