use std::io::{Read, Write};

use crate::state::{StateRead, StateWrite};
use crate::Result;

use super::{skip_aliased_bank, BankCore, BankingController, RAM_BANK_SIZE};

const RAM_SIZE: usize = 4 * RAM_BANK_SIZE;

/// MBC1: 5-bit ROM bank register plus a 2-bit register that either extends
/// the ROM bank or selects one of four RAM banks, depending on the banking
/// mode.
pub struct Mbc1 {
    core: BankCore,
    ram_bank: u8,
    /// Mode 0 (the power-on default): the 2-bit register drives ROM bank
    /// bits 5-6. Mode 1: it selects the RAM bank.
    rom_banking: bool,
}

impl Mbc1 {
    pub(super) fn new(rom: Vec<u8>) -> Self {
        Self {
            core: BankCore::new(rom, RAM_SIZE),
            ram_bank: 0,
            rom_banking: true,
        }
    }

    fn set_rom_bank(&mut self, bank: u16) {
        self.core.rom_bank = skip_aliased_bank(bank & 0x7F);
    }
}

impl BankingController for Mbc1 {
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
            0x2000..=0x3FFF => {
                let bank = (self.core.rom_bank & 0x60) | u16::from(value & 0x1F);
                self.set_rom_bank(bank);
            }
            0x4000..=0x5FFF => {
                if self.rom_banking {
                    let bank = (self.core.rom_bank & 0x1F) | (u16::from(value & 0x03) << 5);
                    self.set_rom_bank(bank);
                } else {
                    self.ram_bank = value & 0x03;
                }
            }
            0x6000..=0x7FFF => {
                self.rom_banking = value & 0x01 == 0;
                if self.rom_banking {
                    self.ram_bank = 0;
                } else {
                    self.core.rom_bank &= 0x1F;
                }
                log::debug!(
                    "MBC1: {} banking mode, rom bank {:#04x}",
                    if self.rom_banking { "ROM" } else { "RAM" },
                    self.core.rom_bank
                );
            }
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
        w.put_bool(self.rom_banking)?;
        w.put_u8(self.ram_bank)
    }

    fn load_state(&mut self, r: &mut dyn Read) -> Result<()> {
        self.core.load_state(r)?;
        self.rom_banking = r.get_bool()?;
        let mask = if self.rom_banking { 0x7F } else { 0x1F };
        self.set_rom_bank(self.core.rom_bank & mask);
        self.ram_bank = r.get_u8()? & 0x03;
        Ok(())
    }
}
