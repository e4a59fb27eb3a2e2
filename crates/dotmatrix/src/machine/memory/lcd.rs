use super::super::Interrupts;
use super::{Memory, LCDC, LY, LYC, STAT};

/// Cycles per scanline at normal speed.
pub(crate) const LINE_CYCLES: i32 = 456;
const OAM_SCAN_CYCLES: i32 = 80;
const TRANSFER_CYCLES: i32 = 172;
const VBLANK_START: u8 = 144;
const LAST_LINE: u8 = 153;

const MODE_HBLANK: u8 = 0;
const MODE_VBLANK: u8 = 1;
const MODE_OAM: u8 = 2;
const MODE_TRANSFER: u8 = 3;

/// LCD timing state. LY and STAT live in the I/O page.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Lcd {
    /// Cycles left on the current scanline.
    pub(crate) scanline_counter: i32,
    pub(crate) frames: u32,
}

impl Default for Lcd {
    fn default() -> Self {
        Self {
            scanline_counter: LINE_CYCLES,
            frames: 0,
        }
    }
}

impl Memory {
    /// Advance LY/STAT timing by `cycles`. No pixels are produced.
    pub(crate) fn step_lcd(&mut self, cycles: u32) {
        let speed = self.speed.factor() as i32;
        let line_cycles = LINE_CYCLES * speed;

        if self.high[LCDC] & 0x80 == 0 {
            self.lcd.scanline_counter = line_cycles;
            self.high[LY] = 0;
            self.high[STAT] = (self.high[STAT] & !0x03) | MODE_VBLANK;
            return;
        }

        self.lcd.scanline_counter -= cycles as i32;
        while self.lcd.scanline_counter <= 0 {
            self.lcd.scanline_counter += line_cycles;
            self.next_line();
        }

        let elapsed = (line_cycles - self.lcd.scanline_counter) / speed;
        self.update_stat(elapsed);
    }

    fn next_line(&mut self) {
        let ly = self.high[LY].wrapping_add(1);
        if ly == VBLANK_START {
            self.request_interrupt(Interrupts::VBLANK);
            self.lcd.frames = self.lcd.frames.wrapping_add(1);
        }
        self.high[LY] = if ly > LAST_LINE { 0 } else { ly };
    }

    /// Recompute STAT's mode and LY==LYC bits, requesting the STAT interrupt
    /// on a mode entry or coincidence edge whose select bit is set.
    fn update_stat(&mut self, elapsed: i32) {
        let ly = self.high[LY];
        let stat = self.high[STAT];
        let old_mode = stat & 0x03;
        let old_coincidence = stat & 0x04 != 0;

        let mode = if ly >= VBLANK_START {
            MODE_VBLANK
        } else if elapsed < OAM_SCAN_CYCLES {
            MODE_OAM
        } else if elapsed < OAM_SCAN_CYCLES + TRANSFER_CYCLES {
            MODE_TRANSFER
        } else {
            MODE_HBLANK
        };
        let coincidence = ly == self.high[LYC];

        let mut request = false;
        if mode != old_mode {
            let select = match mode {
                MODE_HBLANK => 0x08,
                MODE_VBLANK => 0x10,
                MODE_OAM => 0x20,
                _ => 0x00,
            };
            request |= stat & select != 0;
        }
        if coincidence && !old_coincidence {
            request |= stat & 0x40 != 0;
        }

        self.high[STAT] = (stat & 0xF8) | u8::from(coincidence) << 2 | mode;
        if request {
            log::debug!("LCD: STAT interrupt, LY={} mode={}", ly, mode);
            self.request_interrupt(Interrupts::LCD_STAT);
        }
    }
}
