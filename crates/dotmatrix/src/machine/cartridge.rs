mod mbc1;
mod mbc2;
mod mbc3;
mod mbc5;

use std::io::{Read, Write};

use crate::state::{invalid_data, StateRead, StateWrite};
use crate::{Error, Result};

pub use mbc1::Mbc1;
pub use mbc2::Mbc2;
pub use mbc3::Mbc3;
pub use mbc5::Mbc5;

pub(crate) const ROM_BANK_SIZE: usize = 0x4000;
pub(crate) const RAM_BANK_SIZE: usize = 0x2000;

/// Smallest accepted ROM image: the fixed bank plus one switchable bank.
const MIN_ROM_SIZE: usize = 2 * ROM_BANK_SIZE;

/// Banking controller variant fitted to a cartridge.
///
/// Detecting the variant from the ROM header is the host's job; the core
/// only needs to know which state machine to build.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CartKind {
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

impl CartKind {
    /// Tag byte that opens the cartridge section of a save state.
    fn tag(self) -> u8 {
        match self {
            CartKind::Mbc1 => 1,
            CartKind::Mbc2 => 2,
            CartKind::Mbc3 => 3,
            CartKind::Mbc5 => 5,
        }
    }
}

/// Operations every memory bank controller supports.
///
/// `read` covers both the ROM window (0x0000-0x7FFF) and the external RAM
/// window (0xA000-0xBFFF). `write_rom` only ever changes bank selection
/// registers; `write_ram` is the only path that mutates RAM or RTC state.
pub trait BankingController {
    fn read(&self, addr: u16) -> u8;
    fn write_rom(&mut self, addr: u16, value: u8);
    fn write_ram(&mut self, addr: u16, value: u8);

    /// Copy of the battery-backed RAM, suitable for a `.sav` file.
    fn save_data(&self) -> Vec<u8>;
    fn load_save_data(&mut self, data: &[u8]) -> Result<()>;

    fn save_state(&self, w: &mut dyn Write) -> Result<()>;
    fn load_state(&mut self, r: &mut dyn Read) -> Result<()>;
}

/// State shared by every controller: the ROM image, the RAM buffer, the
/// RAM gate and the selected switchable ROM bank.
pub(crate) struct BankCore {
    rom: Vec<u8>,
    pub(crate) ram: Vec<u8>,
    pub(crate) ram_enabled: bool,
    /// Bank mapped at 0x4000-0x7FFF. Never 0.
    pub(crate) rom_bank: u16,
}

impl BankCore {
    pub(crate) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
            ram_enabled: false,
            rom_bank: 1,
        }
    }

    fn rom_bank_count(&self) -> usize {
        (self.rom.len() / ROM_BANK_SIZE).max(1)
    }

    pub(crate) fn read_rom(&self, addr: u16) -> u8 {
        let index = if addr < 0x4000 {
            addr as usize
        } else {
            // Banks past the end of the image wrap, as the unused upper
            // address lines are simply not connected.
            let bank = self.rom_bank as usize % self.rom_bank_count();
            bank * ROM_BANK_SIZE + (addr as usize & 0x3FFF)
        };
        self.rom.get(index).copied().unwrap_or(0xFF)
    }

    /// Handle a write to the RAM gate register (0x0000-0x1FFF).
    pub(crate) fn write_ram_gate(&mut self, value: u8) {
        match value & 0x0F {
            0x0A => self.ram_enabled = true,
            0x00 => self.ram_enabled = false,
            _ => {}
        }
    }

    pub(crate) fn ram_offset(bank: u8, addr: u16) -> usize {
        bank as usize * RAM_BANK_SIZE + (addr as usize & 0x1FFF)
    }

    pub(crate) fn load_save_data(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.ram.len() {
            return Err(Error::SaveDataTooLarge {
                len: data.len(),
                capacity: self.ram.len(),
            });
        }
        self.ram[..data.len()].copy_from_slice(data);
        Ok(())
    }

    pub(crate) fn save_state(&self, w: &mut dyn Write) -> Result<()> {
        w.put_u16(self.rom_bank)?;
        w.put_bool(self.ram_enabled)?;
        w.put_u32(self.ram.len() as u32)?;
        w.put_bytes(&self.ram)
    }

    /// The ROM bank is restored as stored; each controller masks it to its
    /// own register width afterwards.
    pub(crate) fn load_state(&mut self, r: &mut dyn Read) -> Result<()> {
        self.rom_bank = r.get_u16()?;
        self.ram_enabled = r.get_bool()?;
        let len = r.get_u32()? as usize;
        if len != self.ram.len() {
            return Err(invalid_data(format!(
                "cartridge RAM is {} bytes in the state but {} in this machine",
                len,
                self.ram.len()
            )));
        }
        r.get_bytes(&mut self.ram)
    }
}

/// Banks 0x00, 0x20, 0x40 and 0x60 cannot be selected through the MBC1
/// style bank register; the hardware maps the next bank instead.
pub(crate) fn skip_aliased_bank(bank: u16) -> u16 {
    match bank {
        0x00 | 0x20 | 0x40 | 0x60 => bank + 1,
        _ => bank,
    }
}

/// The cartridge currently inserted in the machine.
pub enum Cartridge {
    Mbc1(Mbc1),
    Mbc2(Mbc2),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

impl Cartridge {
    /// Build the controller for `kind` around a raw ROM image.
    pub fn new(kind: CartKind, rom: Vec<u8>) -> Result<Self> {
        if rom.len() < MIN_ROM_SIZE {
            return Err(Error::RomTooSmall {
                len: rom.len(),
                min: MIN_ROM_SIZE,
            });
        }
        log::debug!("cartridge: {:?}, {} ROM banks", kind, rom.len() / ROM_BANK_SIZE);
        Ok(match kind {
            CartKind::Mbc1 => Cartridge::Mbc1(Mbc1::new(rom)),
            CartKind::Mbc2 => Cartridge::Mbc2(Mbc2::new(rom)),
            CartKind::Mbc3 => Cartridge::Mbc3(Mbc3::new(rom)),
            CartKind::Mbc5 => Cartridge::Mbc5(Mbc5::new(rom)),
        })
    }

    pub fn kind(&self) -> CartKind {
        match self {
            Cartridge::Mbc1(_) => CartKind::Mbc1,
            Cartridge::Mbc2(_) => CartKind::Mbc2,
            Cartridge::Mbc3(_) => CartKind::Mbc3,
            Cartridge::Mbc5(_) => CartKind::Mbc5,
        }
    }

    fn controller(&self) -> &dyn BankingController {
        match self {
            Cartridge::Mbc1(m) => m,
            Cartridge::Mbc2(m) => m,
            Cartridge::Mbc3(m) => m,
            Cartridge::Mbc5(m) => m,
        }
    }

    fn controller_mut(&mut self) -> &mut dyn BankingController {
        match self {
            Cartridge::Mbc1(m) => m,
            Cartridge::Mbc2(m) => m,
            Cartridge::Mbc3(m) => m,
            Cartridge::Mbc5(m) => m,
        }
    }
}

impl BankingController for Cartridge {
    fn read(&self, addr: u16) -> u8 {
        self.controller().read(addr)
    }

    fn write_rom(&mut self, addr: u16, value: u8) {
        self.controller_mut().write_rom(addr, value)
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        self.controller_mut().write_ram(addr, value)
    }

    fn save_data(&self) -> Vec<u8> {
        self.controller().save_data()
    }

    fn load_save_data(&mut self, data: &[u8]) -> Result<()> {
        self.controller_mut().load_save_data(data)
    }

    /// Writes the variant tag first so a state from another controller is
    /// rejected on load instead of being misparsed.
    fn save_state(&self, w: &mut dyn Write) -> Result<()> {
        w.put_u8(self.kind().tag())?;
        self.controller().save_state(w)
    }

    fn load_state(&mut self, r: &mut dyn Read) -> Result<()> {
        let tag = r.get_u8()?;
        let expected = self.kind();
        if tag != expected.tag() {
            return Err(Error::CartridgeMismatch {
                expected,
                found: tag,
            });
        }
        self.controller_mut().load_state(r)
    }
}

#[cfg(test)]
mod tests;
