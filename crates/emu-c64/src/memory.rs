//! Memory maps.
//!
//! The co-simulation core never decides what lives at an address; it asks
//! a [`MemoryMap`]. Two maps ship with the crate:
//!
//! - [`FlatMemory`]: 64K RAM with I/O always at $D000-$DFFF. For tests and
//!   bare-metal programs.
//! - [`BankedMemory`]: the stock C64 layout, with BASIC, Kernal and
//!   character ROM banked in and out by the 6510 port at $00/$01:
//!
//! | HIRAM(2) | LORAM(1) | CHAREN(0) | $A000-$BFFF | $D000-$DFFF | $E000-$FFFF |
//! |----------|----------|-----------|-------------|-------------|-------------|
//! | 1        | 1        | 1         | BASIC       | I/O         | Kernal      |
//! | 1        | 1        | 0         | BASIC       | Char ROM    | Kernal      |
//! | 1        | 0        | 1         | RAM         | I/O         | Kernal      |
//! | 0        | 1        | 1         | RAM         | I/O         | RAM         |
//! | 0        | 0        | x         | RAM         | RAM         | RAM         |
//!
//! Both show the VIC-II the character ROM at $1000-$1FFF of banks 0 and 2
//! when one is installed.

use mos_vic_ii::VicMemory;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const IO_START: u16 = 0xD000;
const IO_END: u16 = 0xDFFF;

/// RAM contents for snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryImage {
    pub ram: Vec<u8>,
    pub colour_ram: Vec<u8>,
    /// 6510 port DDR and data, where the map has one.
    pub cpu_port: Option<[u8; 2]>,
}

/// Address decoding as seen by the CPU and the VIC-II.
///
/// The bus routes an access to the I/O chips whenever `io_visible` says
/// so; everything else comes here.
pub trait MemoryMap: VicMemory {
    /// CPU read of RAM or ROM.
    fn read(&self, address: u16) -> u8;

    /// Read for debuggers; identical to `read` unless the map has read
    /// side effects.
    fn peek(&self, address: u16) -> u8 {
        self.read(address)
    }

    /// CPU write. Writes under ROM land in RAM. The bus does not call this
    /// for addresses where `io_visible` holds.
    fn write(&mut self, address: u16, value: u8);

    /// True if `address` currently decodes to the I/O chips.
    fn io_visible(&self, address: u16) -> bool;

    /// Write a colour RAM nibble.
    fn colour_write(&mut self, offset: u16, value: u8);

    fn image(&self) -> MemoryImage;

    fn load_image(&mut self, image: &MemoryImage);
}

/// Plain RAM, colour RAM and an optional character ROM.
pub struct FlatMemory {
    ram: Box<[u8; 0x10000]>,
    colour_ram: [u8; 0x400],
    char_rom: Option<Vec<u8>>,
}

impl FlatMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            colour_ram: [0; 0x400],
            char_rom: None,
        }
    }

    /// Show the VIC-II a character ROM in banks 0 and 2.
    ///
    /// # Errors
    ///
    /// `ConfigError::RomSize` unless the image is 4096 bytes.
    pub fn with_char_rom(mut self, rom: &[u8]) -> Result<Self, ConfigError> {
        check_size("character", rom, 0x1000)?;
        self.char_rom = Some(rom.to_vec());
        Ok(self)
    }

    /// Copy `data` into RAM at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.ram[usize::from(address.wrapping_add(i as u16))] = byte;
        }
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram[..]
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl VicMemory for FlatMemory {
    fn vic_read(&self, address: u16) -> u8 {
        char_rom_view(self.char_rom.as_deref(), address).unwrap_or(self.ram[usize::from(address)])
    }

    fn colour_read(&self, offset: u16) -> u8 {
        self.colour_ram[usize::from(offset & 0x03FF)]
    }
}

impl MemoryMap for FlatMemory {
    fn read(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    fn io_visible(&self, address: u16) -> bool {
        (IO_START..=IO_END).contains(&address)
    }

    fn colour_write(&mut self, offset: u16, value: u8) {
        self.colour_ram[usize::from(offset & 0x03FF)] = value & 0x0F;
    }

    fn image(&self) -> MemoryImage {
        MemoryImage {
            ram: self.ram.to_vec(),
            colour_ram: self.colour_ram.to_vec(),
            cpu_port: None,
        }
    }

    fn load_image(&mut self, image: &MemoryImage) {
        copy_into(&mut self.ram[..], &image.ram);
        copy_into(&mut self.colour_ram, &image.colour_ram);
    }
}

/// Stock C64 memory: RAM, three ROMs and the 6510 port.
pub struct BankedMemory {
    ram: Box<[u8; 0x10000]>,
    colour_ram: [u8; 0x400],
    basic_rom: Vec<u8>,
    kernal_rom: Vec<u8>,
    char_rom: Vec<u8>,
    port_ddr: u8,
    port_data: u8,
}

/// Lines of the 6510 port with pull-ups; the rest float low.
const PORT_PULL_UPS: u8 = 0x37;

impl BankedMemory {
    /// # Errors
    ///
    /// `ConfigError::RomSize` for a ROM image of the wrong size.
    pub fn new(basic: &[u8], kernal: &[u8], chargen: &[u8]) -> Result<Self, ConfigError> {
        check_size("BASIC", basic, 0x2000)?;
        check_size("Kernal", kernal, 0x2000)?;
        check_size("character", chargen, 0x1000)?;
        Ok(Self {
            ram: Box::new([0; 0x10000]),
            colour_ram: [0; 0x400],
            basic_rom: basic.to_vec(),
            kernal_rom: kernal.to_vec(),
            char_rom: chargen.to_vec(),
            port_ddr: 0x2F,
            port_data: 0x37,
        })
    }

    /// Port lines as driven: outputs from the data register, inputs from
    /// the pull-ups.
    fn port(&self) -> u8 {
        (self.port_data & self.port_ddr) | (PORT_PULL_UPS & !self.port_ddr)
    }

    fn hiram(&self) -> bool {
        self.port() & 0x04 != 0
    }

    fn loram(&self) -> bool {
        self.port() & 0x02 != 0
    }

    fn charen(&self) -> bool {
        self.port() & 0x01 != 0
    }

    fn char_rom_visible(&self) -> bool {
        !self.charen() && (self.hiram() || self.loram())
    }

    /// Copy `data` into RAM at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.ram[usize::from(address.wrapping_add(i as u16))] = byte;
        }
    }
}

impl VicMemory for BankedMemory {
    fn vic_read(&self, address: u16) -> u8 {
        char_rom_view(Some(&self.char_rom), address).unwrap_or(self.ram[usize::from(address)])
    }

    fn colour_read(&self, offset: u16) -> u8 {
        self.colour_ram[usize::from(offset & 0x03FF)]
    }
}

impl MemoryMap for BankedMemory {
    fn read(&self, address: u16) -> u8 {
        let index = usize::from(address);
        match address {
            0x0000 => self.port_ddr,
            0x0001 => self.port(),
            0xA000..=0xBFFF if self.hiram() && self.loram() => self.basic_rom[index - 0xA000],
            IO_START..=IO_END if self.char_rom_visible() => self.char_rom[index - 0xD000],
            0xE000..=0xFFFF if self.hiram() => self.kernal_rom[index - 0xE000],
            _ => self.ram[index],
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000 => self.port_ddr = value,
            0x0001 => self.port_data = value,
            _ => self.ram[usize::from(address)] = value,
        }
    }

    fn io_visible(&self, address: u16) -> bool {
        (IO_START..=IO_END).contains(&address) && self.charen() && (self.hiram() || self.loram())
    }

    fn colour_write(&mut self, offset: u16, value: u8) {
        self.colour_ram[usize::from(offset & 0x03FF)] = value & 0x0F;
    }

    fn image(&self) -> MemoryImage {
        MemoryImage {
            ram: self.ram.to_vec(),
            colour_ram: self.colour_ram.to_vec(),
            cpu_port: Some([self.port_ddr, self.port_data]),
        }
    }

    fn load_image(&mut self, image: &MemoryImage) {
        copy_into(&mut self.ram[..], &image.ram);
        copy_into(&mut self.colour_ram, &image.colour_ram);
        if let Some([ddr, data]) = image.cpu_port {
            self.port_ddr = ddr;
            self.port_data = data;
        }
    }
}

/// Character ROM as the VIC-II sees it: $1000-$1FFF of banks 0 and 2.
fn char_rom_view(rom: Option<&[u8]>, address: u16) -> Option<u8> {
    let rom = rom?;
    let bank = address >> 14;
    let offset = address & 0x3FFF;
    ((bank == 0 || bank == 2) && (0x1000..0x2000).contains(&offset))
        .then(|| rom[usize::from(offset - 0x1000)])
}

fn check_size(name: &'static str, rom: &[u8], expected: usize) -> Result<(), ConfigError> {
    if rom.len() == expected {
        Ok(())
    } else {
        Err(ConfigError::RomSize {
            name,
            expected,
            actual: rom.len(),
        })
    }
}

fn copy_into(dst: &mut [u8], src: &[u8]) {
    let len = dst.len().min(src.len());
    dst[..len].copy_from_slice(&src[..len]);
}
