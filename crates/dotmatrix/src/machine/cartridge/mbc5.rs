use std::io::{Read, Write};

use crate::state::{StateRead, StateWrite};
use crate::Result;

use super::{BankCore, BankingController, RAM_BANK_SIZE};

const RAM_SIZE: usize = 16 * RAM_BANK_SIZE;

/// MBC5: 9-bit ROM bank split over two registers and 16 RAM banks.
pub struct Mbc5 {
    core: BankCore,
    /// Low ROM bank register as written, before the bank-0 fixup.
    rom_bank_low: u8,
    ram_bank: u8,
}

impl Mbc5 {
    pub(super) fn new(rom: Vec<u8>) -> Self {
        Self {
            core: BankCore::new(rom, RAM_SIZE),
            rom_bank_low: 1,
            ram_bank: 0,
        }
    }

    fn rom_bank_high(&self) -> u16 {
        self.core.rom_bank & 0x100
    }

    fn update_rom_bank(&mut self, high: u16) {
        let bank = high | u16::from(self.rom_bank_low);
        self.core.rom_bank = bank.max(1);
    }
}

impl BankingController for Mbc5 {
    fn read(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return self.core.read_rom(addr);
        }
        if !self.core.ram_enabled {
            return 0xFF;
        }
        self.core.ram[BankCore::ram_offset(self.ram_bank, addr)]
    }

    fn write_rom(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.core.write_ram_gate(value),
            0x2000..=0x2FFF => {
                self.rom_bank_low = value;
                self.update_rom_bank(self.rom_bank_high());
            }
            0x3000..=0x3FFF => self.update_rom_bank(u16::from(value & 0x01) << 8),
            0x4000..=0x5FFF => self.ram_bank = value & 0x0F,
            _ => {}
        }
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        if self.core.ram_enabled {
            self.core.ram[BankCore::ram_offset(self.ram_bank, addr)] = value;
        }
    }

    fn save_data(&self) -> Vec<u8> {
        self.core.ram.clone()
    }

    fn load_save_data(&mut self, data: &[u8]) -> Result<()> {
        self.core.load_save_data(data)
    }

    fn save_state(&self, w: &mut dyn Write) -> Result<()> {
        self.core.save_state(w)?;
        w.put_u8(self.rom_bank_low)?;
        w.put_u8(self.ram_bank)
    }

    fn load_state(&mut self, r: &mut dyn Read) -> Result<()> {
        self.core.load_state(r)?;
        self.rom_bank_low = r.get_u8()?;
        self.update_rom_bank(self.rom_bank_high());
        self.ram_bank = r.get_u8()? & 0x0F;
        Ok(())
    }
}
