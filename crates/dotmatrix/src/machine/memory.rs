mod init;
mod joypad;
mod lcd;
mod mmio;
mod timer;

pub use joypad::Button;
pub(crate) use joypad::Joypad;
pub(crate) use lcd::{Lcd, LINE_CYCLES};
pub(crate) use timer::{Timer, DIVIDER_PERIOD, MAX_TIMER_PERIOD};

use crate::cpu::Bus;

use super::cartridge::Cartridge;
use super::Interrupts;

pub(crate) const VRAM_BANK_SIZE: usize = 0x2000;
pub(crate) const VRAM_SIZE: usize = 2 * VRAM_BANK_SIZE;
pub(crate) const WRAM_BANK_SIZE: usize = 0x1000;
pub(crate) const WRAM_SIZE: usize = 8 * WRAM_BANK_SIZE;
pub(crate) const OAM_SIZE: usize = 0xA0;
pub(crate) const HIGH_PAGE_SIZE: usize = 0x100;

// Offsets into the high page (0xFF00-0xFFFF).
pub(crate) const P1: usize = 0x00;
pub(crate) const SB: usize = 0x01;
pub(crate) const SC: usize = 0x02;
pub(crate) const DIV: usize = 0x04;
pub(crate) const TIMA: usize = 0x05;
pub(crate) const TMA: usize = 0x06;
pub(crate) const TAC: usize = 0x07;
pub(crate) const IF: usize = 0x0F;
pub(crate) const LCDC: usize = 0x40;
pub(crate) const STAT: usize = 0x41;
pub(crate) const LY: usize = 0x44;
pub(crate) const LYC: usize = 0x45;
pub(crate) const DMA: usize = 0x46;
pub(crate) const IE: usize = 0xFF;

/// Callback fired when the game starts a serial transfer; receives SB.
pub type TransferCallback = Box<dyn FnMut(u8)>;

/// CGB CPU speed and the KEY1 "prepare speed switch" latch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Speed {
    pub double: bool,
    pub armed: bool,
}

impl Speed {
    /// Clock multiplier: 1 at normal speed, 2 in double-speed mode.
    pub fn factor(self) -> u32 {
        if self.double {
            2
        } else {
            1
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        u8::from(self.double) | u8::from(self.armed) << 1
    }

    pub(crate) fn from_byte(value: u8) -> Self {
        Self {
            double: value & 0x01 != 0,
            armed: value & 0x02 != 0,
        }
    }
}

/// The 16-bit address space: built-in RAM, the I/O page and the inserted
/// cartridge.
pub struct Memory {
    pub(super) cart: Cartridge,
    pub(super) cgb: bool,
    pub(super) vram: Vec<u8>,
    pub(super) vram_bank: u8,
    pub(super) wram: Vec<u8>,
    /// Bank mapped at 0xD000-0xDFFF. Never 0.
    pub(super) wram_bank: u8,
    pub(super) oam: [u8; OAM_SIZE],
    /// I/O registers, HRAM and IE.
    pub(super) high: [u8; HIGH_PAGE_SIZE],
    pub(super) timer: Timer,
    pub(super) lcd: Lcd,
    pub(super) speed: Speed,
    pub(super) joypad: Joypad,
    transfer: Option<TransferCallback>,
}

impl Memory {
    pub fn new(cart: Cartridge, cgb: bool) -> Self {
        let mut mem = Self {
            cart,
            cgb,
            vram: vec![0; VRAM_SIZE],
            vram_bank: 0,
            wram: vec![0; WRAM_SIZE],
            wram_bank: 1,
            oam: [0; OAM_SIZE],
            high: [0; HIGH_PAGE_SIZE],
            timer: Timer::default(),
            lcd: Lcd::default(),
            speed: Speed::default(),
            joypad: Joypad::default(),
            transfer: None,
        };
        mem.apply_initial_io_state();
        mem
    }

    pub fn set_transfer_callback(&mut self, callback: Option<TransferCallback>) {
        self.transfer = callback;
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cart
    }

    pub fn is_cgb(&self) -> bool {
        self.cgb
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Frames completed since power-on (LY reaching 144).
    pub fn frames(&self) -> u32 {
        self.lcd.frames
    }

    /// Lines currently raised in IF.
    pub fn requested(&self) -> Interrupts {
        Interrupts::from_bits_truncate(self.high[IF])
    }

    /// Lines enabled in IE.
    pub fn enabled(&self) -> Interrupts {
        Interrupts::from_bits_truncate(self.high[IE])
    }

    pub fn request_interrupt(&mut self, lines: Interrupts) {
        self.high[IF] |= lines.bits();
    }

    pub(crate) fn clear_interrupt(&mut self, lines: Interrupts) {
        self.high[IF] &= !lines.bits();
    }

    /// Consume an armed speed switch, returning whether one happened.
    pub(crate) fn take_speed_switch(&mut self) -> bool {
        if !(self.cgb && self.speed.armed) {
            return false;
        }
        self.speed.double = !self.speed.double;
        self.speed.armed = false;
        log::debug!(
            "speed switch: now {} speed",
            if self.speed.double { "double" } else { "normal" }
        );
        true
    }

    pub fn press(&mut self, button: Button) {
        if self.joypad.press(button) {
            self.request_interrupt(Interrupts::JOYPAD);
        }
    }

    pub fn release(&mut self, button: Button) {
        self.joypad.release(button);
    }

    fn start_transfer(&mut self) {
        let data = self.high[SB];
        if let Some(callback) = self.transfer.as_mut() {
            callback(data);
        }
    }

    fn oam_dma(&mut self, value: u8) {
        let base = u16::from(value) << 8;
        for i in 0..OAM_SIZE as u16 {
            self.oam[i as usize] = self.read(base.wrapping_add(i));
        }
        self.high[DMA] = value;
    }
}

impl Bus for Memory {
    fn read8(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.write(addr, value)
    }
}
