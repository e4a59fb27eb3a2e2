use super::super::cartridge::BankingController;
use super::{
    Memory, DIV, DMA, IE, IF, LY, P1, SC, STAT, TAC, VRAM_BANK_SIZE, WRAM_BANK_SIZE,
};

impl Memory {
    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.cart.read(addr),
            0x8000..=0x9FFF => self.vram[self.vram_offset(addr)],
            0xC000..=0xDFFF => self.wram[self.wram_offset(addr)],
            // Echo RAM mirrors 0xC000-0xDDFF.
            0xE000..=0xFDFF => self.wram[self.wram_offset(addr - 0x2000)],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00..=0xFFFF => self.read_io((addr & 0x00FF) as usize),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => self.cart.write_rom(addr, value),
            0xA000..=0xBFFF => self.cart.write_ram(addr, value),
            0x8000..=0x9FFF => {
                let offset = self.vram_offset(addr);
                self.vram[offset] = value;
            }
            0xC000..=0xDFFF => {
                let offset = self.wram_offset(addr);
                self.wram[offset] = value;
            }
            0xE000..=0xFDFF => {
                let offset = self.wram_offset(addr - 0x2000);
                self.wram[offset] = value;
            }
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = value,
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFFFF => self.write_io((addr & 0x00FF) as usize, value),
        }
    }

    fn vram_offset(&self, addr: u16) -> usize {
        self.vram_bank as usize * VRAM_BANK_SIZE + (addr as usize & 0x1FFF)
    }

    fn wram_offset(&self, addr: u16) -> usize {
        if addr < 0xD000 {
            addr as usize & 0x0FFF
        } else {
            self.wram_bank as usize * WRAM_BANK_SIZE + (addr as usize & 0x0FFF)
        }
    }

    fn read_io(&self, reg: usize) -> u8 {
        match reg {
            P1 => self.joypad.read(),
            // Only the low 5 bits exist; the rest read back as 1.
            IF => self.high[IF] | 0xE0,

            // --- CGB-only registers ---
            0x4D => {
                if self.cgb {
                    0x7E | u8::from(self.speed.double) << 7 | u8::from(self.speed.armed)
                } else {
                    0xFF
                }
            }
            0x4F => {
                if self.cgb {
                    0xFE | self.vram_bank
                } else {
                    0xFF
                }
            }
            0x70 => {
                if self.cgb {
                    0xF8 | self.wram_bank
                } else {
                    0xFF
                }
            }

            _ => self.high[reg],
        }
    }

    fn write_io(&mut self, reg: usize, value: u8) {
        match reg {
            P1 => self.joypad.select(value),

            SC => {
                self.high[SC] = value;
                if value == 0x81 {
                    self.start_transfer();
                }
            }

            DIV => {
                self.high[DIV] = 0;
                self.timer.reset_divider();
            }
            TAC => self.write_tac(value),

            IF => self.high[IF] = value & 0x1F,

            // Mode and coincidence bits are owned by the LCD.
            STAT => self.high[STAT] = 0x80 | (value & 0x78) | (self.high[STAT] & 0x07),
            LY => self.high[LY] = 0,
            DMA => self.oam_dma(value),

            0x4D => {
                if self.cgb {
                    self.speed.armed = value & 0x01 != 0;
                }
            }
            0x4F => {
                if self.cgb {
                    self.vram_bank = value & 0x01;
                }
            }
            0x70 => {
                if self.cgb {
                    self.wram_bank = (value & 0x07).max(1);
                }
            }

            IE => self.high[IE] = value,
            // Sound registers, HRAM and everything else are plain storage.
            _ => self.high[reg] = value,
        }
    }
}
