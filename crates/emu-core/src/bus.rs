//! Memory and I/O bus interface.

/// What a bus access is for.
///
/// The 6502 issues a bus cycle on every clock, including cycles whose data
/// it throws away (operand re-reads, stack pre-reads, page-cross fix-ups).
/// Those are `Dummy`: they cost a tick but have no architectural effect, so
/// the memory side may skip read side effects such as clear-on-read
/// registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessKind {
    /// An access whose data the CPU uses.
    Real,
    /// A timing-only access.
    Dummy,
}

/// Memory and I/O bus interface.
///
/// Every call to `read` or `write` is exactly one bus cycle from the CPU's
/// point of view. A bus that shares the data lines with DMA devices may
/// hold the CPU inside a call for any number of ticks before performing the
/// access; the CPU never observes that other than through [`Bus::held`].
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16, kind: AccessKind) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Level of the maskable interrupt input, sampled at an instruction
    /// boundary.
    fn irq(&self) -> bool {
        false
    }

    /// Consume a pending non-maskable interrupt edge.
    fn take_nmi(&mut self) -> bool {
        false
    }

    /// True if the most recent access had to wait for the bus.
    fn held(&self) -> bool {
        false
    }
}

/// Flat 64K RAM bus for tests and bare CPU use.
///
/// Counts every access and keeps a log of the most recent ones so tests
/// can check bus patterns, not just results.
pub struct SimpleBus {
    memory: Box<[u8; 0x10000]>,
    /// Level driven onto the IRQ input.
    pub irq: bool,
    /// Pending NMI edge.
    pub nmi: bool,
    /// Pretend every access from now on waited on a DMA takeover.
    pub hold: bool,
    cycles: u64,
    log: Vec<(u16, AccessKind, bool)>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            irq: false,
            nmi: false,
            hold: false,
            cycles: 0,
            log: Vec::new(),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.memory[usize::from(address.wrapping_add(i as u16))] = byte;
        }
    }

    /// Read memory without counting a cycle.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    /// Write memory without counting a cycle.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }

    /// Bus cycles issued so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Accesses since the last `clear_log`: address, kind, and whether it
    /// was a write (writes are always `Real`).
    #[must_use]
    pub fn log(&self) -> &[(u16, AccessKind, bool)] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16, kind: AccessKind) -> u8 {
        self.cycles += 1;
        self.log.push((address, kind, false));
        self.memory[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.cycles += 1;
        self.log.push((address, AccessKind::Real, true));
        self.memory[usize::from(address)] = value;
    }

    fn irq(&self) -> bool {
        self.irq
    }

    fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    fn held(&self) -> bool {
        self.hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accesses_are_counted_and_logged() {
        let mut bus = SimpleBus::new();
        bus.load(0x1000, &[1, 2, 3]);
        assert_eq!(bus.read(0x1001, AccessKind::Real), 2);
        bus.write(0x2000, 0x55);
        let _ = bus.read(0x2000, AccessKind::Dummy);

        assert_eq!(bus.cycles(), 3);
        assert_eq!(
            bus.log(),
            &[
                (0x1001, AccessKind::Real, false),
                (0x2000, AccessKind::Real, true),
                (0x2000, AccessKind::Dummy, false),
            ]
        );
        assert_eq!(bus.peek(0x2000), 0x55);
    }

    #[test]
    fn nmi_edge_is_consumed() {
        let mut bus = SimpleBus::new();
        bus.nmi = true;
        assert!(bus.take_nmi());
        assert!(!bus.take_nmi());
    }

    #[test]
    fn load_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFF, &[0xAA, 0xBB]);
        assert_eq!(bus.peek(0xFFFF), 0xAA);
        assert_eq!(bus.peek(0x0000), 0xBB);
    }
}
