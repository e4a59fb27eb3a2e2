//! Machine snapshot: CPU part, then the address space, then the cartridge.

use std::io::{Read, Write};

use crate::cpu::ExecState;
use crate::state::{invalid_data, StateRead, StateWrite};
use crate::Result;

use super::cartridge::BankingController;
use super::memory::{Speed, DIVIDER_PERIOD, LINE_CYCLES, MAX_TIMER_PERIOD};
use super::{GameBoy, Memory};

impl GameBoy {
    pub fn save_state<W: Write>(&self, w: &mut W) -> Result<()> {
        let regs = &self.cpu.regs;
        for value in [regs.af(), regs.bc(), regs.de(), regs.hl(), regs.pc, regs.sp] {
            w.put_u16(value)?;
        }
        w.put_u32(self.mem.timer.counter)?;
        w.put_u32(self.cpu.ticks)?;
        w.put_u8(self.cpu.state.to_flags())?;
        self.mem.save_state(w)
    }

    /// Restore a snapshot taken from a machine running the same ROM.
    ///
    /// On error the machine is left partially restored and should be
    /// discarded.
    pub fn load_state<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let regs = &mut self.cpu.regs;
        regs.set_af(r.get_u16()?);
        regs.set_bc(r.get_u16()?);
        regs.set_de(r.get_u16()?);
        regs.set_hl(r.get_u16()?);
        regs.pc = r.get_u16()?;
        regs.sp = r.get_u16()?;
        let counter = r.get_u32()?;
        if counter >= MAX_TIMER_PERIOD {
            return Err(invalid_data(format!("timer counter {counter} out of range")));
        }
        self.mem.timer.counter = counter;
        self.cpu.ticks = r.get_u32()?;
        self.cpu.state = ExecState::from_flags(r.get_u8()?)?;
        self.mem.load_state(r)?;
        log::debug!(
            "state restored: pc={:#06x} state={:?}",
            self.cpu.regs.pc,
            self.cpu.state
        );
        Ok(())
    }
}

impl Memory {
    fn save_state(&self, w: &mut dyn Write) -> Result<()> {
        w.put_u32(self.timer.divider)?;
        w.put_i32(self.lcd.scanline_counter)?;
        w.put_u32(self.lcd.frames)?;
        w.put_u8(self.speed.to_byte())?;
        w.put_u8(self.vram_bank)?;
        w.put_u8(self.wram_bank)?;
        w.put_bytes(&self.vram)?;
        w.put_bytes(&self.wram)?;
        w.put_bytes(&self.oam)?;
        w.put_bytes(&self.high)?;
        w.put_u8(self.joypad.select)?;
        w.put_u8(self.joypad.pressed)?;
        self.cart.save_state(w)
    }

    fn load_state(&mut self, r: &mut dyn Read) -> Result<()> {
        let divider = r.get_u32()?;
        if divider >= DIVIDER_PERIOD {
            return Err(invalid_data(format!("divider counter {divider} out of range")));
        }
        self.timer.divider = divider;
        // Up to a full double-speed line may be left after a speed switch.
        let scanline = r.get_i32()?;
        if scanline <= 0 || scanline > 2 * LINE_CYCLES {
            return Err(invalid_data(format!("scanline counter {scanline} out of range")));
        }
        self.lcd.scanline_counter = scanline;
        self.lcd.frames = r.get_u32()?;
        self.speed = Speed::from_byte(r.get_u8()?);
        self.vram_bank = r.get_u8()? & 0x01;
        self.wram_bank = (r.get_u8()? & 0x07).max(1);
        r.get_bytes(&mut self.vram)?;
        r.get_bytes(&mut self.wram)?;
        r.get_bytes(&mut self.oam)?;
        r.get_bytes(&mut self.high)?;
        self.joypad.select = r.get_u8()? & 0x30;
        self.joypad.pressed = r.get_u8()?;
        self.cart.load_state(r)
    }
}
