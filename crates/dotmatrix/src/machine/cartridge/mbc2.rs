use std::io::{Read, Write};

use crate::Result;

use super::{skip_aliased_bank, BankCore, BankingController};

/// 512 half-byte cells built into the controller.
const RAM_SIZE: usize = 0x200;

/// MBC2: up to 16 ROM banks and a small built-in 4-bit RAM.
///
/// The RAM gate and the ROM bank register share the 0x0000-0x3FFF range;
/// address bit 8 decides which one a write reaches.
pub struct Mbc2 {
    core: BankCore,
}

impl Mbc2 {
    pub(super) fn new(rom: Vec<u8>) -> Self {
        Self {
            core: BankCore::new(rom, RAM_SIZE),
        }
    }
}

impl BankingController for Mbc2 {
    fn read(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return self.core.read_rom(addr);
        }
        if !self.core.ram_enabled {
            return 0xFF;
        }
        // The 512 cells repeat across the whole 0xA000-0xBFFF window.
        self.core.ram[addr as usize & (RAM_SIZE - 1)]
    }

    fn write_rom(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF if addr & 0x0100 == 0 => self.core.write_ram_gate(value),
            0x2000..=0x3FFF if addr & 0x0100 != 0 => {
                self.core.rom_bank = skip_aliased_bank(u16::from(value & 0x0F));
            }
            _ => {}
        }
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        if self.core.ram_enabled {
            self.core.ram[addr as usize & (RAM_SIZE - 1)] = value & 0x0F;
        }
    }

    fn save_data(&self) -> Vec<u8> {
        self.core.ram.clone()
    }

    fn load_save_data(&mut self, data: &[u8]) -> Result<()> {
        self.core.load_save_data(data)
    }

    fn save_state(&self, w: &mut dyn Write) -> Result<()> {
        self.core.save_state(w)
    }

    fn load_state(&mut self, r: &mut dyn Read) -> Result<()> {
        self.core.load_state(r)?;
        self.core.rom_bank = skip_aliased_bank(self.core.rom_bank & 0x0F);
        Ok(())
    }
}
