use super::{Memory, DIV, DMA, IE, IF, LCDC, SB, SC, STAT, TAC};

/// Sound register values left by the boot ROM, starting at 0xFF10.
const SOUND_POST_BOOT: [(usize, u8); 21] = [
    (0x10, 0x80),
    (0x11, 0xBF),
    (0x12, 0xF3),
    (0x13, 0xFF),
    (0x14, 0xBF),
    (0x16, 0x3F),
    (0x17, 0x00),
    (0x18, 0xFF),
    (0x19, 0xBF),
    (0x1A, 0x7F),
    (0x1B, 0xFF),
    (0x1C, 0x9F),
    (0x1D, 0xFF),
    (0x1E, 0xBF),
    (0x20, 0xFF),
    (0x21, 0x00),
    (0x22, 0x00),
    (0x23, 0xBF),
    (0x24, 0x77),
    (0x25, 0xF3),
    (0x26, 0xF1),
];

impl Memory {
    /// Initialize I/O registers to the state the boot ROM hands over at
    /// PC=0x0100.
    pub(super) fn apply_initial_io_state(&mut self) {
        self.high[SB] = 0x00;
        self.high[SC] = 0x7E;

        self.high[DIV] = 0xAB;
        self.high[TAC] = 0xF8;

        // VBlank is already requested when cartridge code starts.
        self.high[IF] = 0x01;
        self.high[IE] = 0x00;

        for (reg, value) in SOUND_POST_BOOT {
            self.high[reg] = value;
        }

        self.high[LCDC] = 0x91;
        self.high[STAT] = 0x85;
        self.high[DMA] = 0xFF;
        self.high[0x47] = 0xFC; // BGP
    }
}
