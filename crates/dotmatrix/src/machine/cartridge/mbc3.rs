use std::io::{Read, Write};

use crate::state::{StateRead, StateWrite};
use crate::Result;

use super::{BankCore, BankingController, RAM_BANK_SIZE};

const RAM_SIZE: usize = 4 * RAM_BANK_SIZE;
const RTC_REGISTERS: usize = 0x10;

/// MBC3: 7-bit ROM bank, four RAM banks and a memory-mapped real-time
/// clock.
///
/// Selecting a RAM bank of 4 or above maps an RTC register into the RAM
/// window instead. The RTC registers are plain storage here; nothing
/// advances them except software writes.
pub struct Mbc3 {
    core: BankCore,
    /// RAM bank (0-3) or RTC register index (4-15).
    ram_select: u8,
    rtc: [u8; RTC_REGISTERS],
    latched_rtc: [u8; RTC_REGISTERS],
    latched: bool,
}

impl Mbc3 {
    pub(super) fn new(rom: Vec<u8>) -> Self {
        Self {
            core: BankCore::new(rom, RAM_SIZE),
            ram_select: 0,
            rtc: [0; RTC_REGISTERS],
            latched_rtc: [0; RTC_REGISTERS],
            latched: false,
        }
    }

    fn rtc_selected(&self) -> bool {
        self.ram_select >= 0x04
    }
}

impl BankingController for Mbc3 {
    fn read(&self, addr: u16) -> u8 {
        if addr < 0x8000 {
            return self.core.read_rom(addr);
        }
        if !self.core.ram_enabled {
            return 0xFF;
        }
        let index = self.ram_select as usize;
        if self.rtc_selected() {
            if self.latched {
                self.latched_rtc[index]
            } else {
                self.rtc[index]
            }
        } else {
            self.core.ram[BankCore::ram_offset(self.ram_select, addr)]
        }
    }

    fn write_rom(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.core.write_ram_gate(value),
            0x2000..=0x3FFF => {
                self.core.rom_bank = u16::from(value & 0x7F).max(1);
            }
            0x4000..=0x5FFF => self.ram_select = value & 0x0F,
            0x6000..=0x7FFF => match value {
                0x00 => {
                    self.latched_rtc = self.rtc;
                    self.latched = true;
                    log::debug!("MBC3: RTC latched {:02X?}", &self.latched_rtc[0x08..=0x0C]);
                }
                0x01 => self.latched = false,
                _ => {}
            },
            _ => {}
        }
    }

    fn write_ram(&mut self, addr: u16, value: u8) {
        if !self.core.ram_enabled {
            return;
        }
        if self.rtc_selected() {
            self.rtc[self.ram_select as usize] = value;
        } else {
            self.core.ram[BankCore::ram_offset(self.ram_select, addr)] = value;
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
        w.put_u8(self.ram_select)?;
        w.put_bytes(&self.rtc)?;
        w.put_bytes(&self.latched_rtc)?;
        w.put_bool(self.latched)
    }

    fn load_state(&mut self, r: &mut dyn Read) -> Result<()> {
        self.core.load_state(r)?;
        self.core.rom_bank = (self.core.rom_bank & 0x7F).max(1);
        self.ram_select = r.get_u8()? & 0x0F;
        r.get_bytes(&mut self.rtc)?;
        r.get_bytes(&mut self.latched_rtc)?;
        self.latched = r.get_bool()?;
        Ok(())
    }
}
