use super::super::Interrupts;
use super::{Memory, DIV, TAC, TIMA, TMA};

/// Cycles per DIV increment.
pub(crate) const DIVIDER_PERIOD: u32 = 255;

/// Cycles per TIMA increment for each TAC clock select value.
pub(crate) const TIMER_PERIODS: [u32; 4] = [1024, 16, 64, 256];

/// Slowest TIMA rate; the TIMA accumulator always stays below it.
pub(crate) const MAX_TIMER_PERIOD: u32 = 1024;

/// Cycle accumulators behind DIV and TIMA. The register values themselves
/// live in the I/O page.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Timer {
    pub(crate) divider: u32,
    pub(crate) counter: u32,
}

impl Timer {
    pub(crate) fn reset_divider(&mut self) {
        self.divider = 0;
    }
}

pub(crate) fn timer_period(tac: u8) -> u32 {
    TIMER_PERIODS[(tac & 0x03) as usize]
}

impl Memory {
    /// Advance DIV and, when enabled, TIMA by `cycles`.
    pub(crate) fn step_timers(&mut self, cycles: u32) {
        self.timer.divider += cycles;
        while self.timer.divider >= DIVIDER_PERIOD {
            self.timer.divider -= DIVIDER_PERIOD;
            self.high[DIV] = self.high[DIV].wrapping_add(1);
        }

        let tac = self.high[TAC];
        if tac & 0x04 == 0 {
            return;
        }

        let period = timer_period(tac);
        self.timer.counter += cycles;
        while self.timer.counter >= period {
            self.timer.counter -= period;
            let (tima, overflow) = self.high[TIMA].overflowing_add(1);
            if overflow {
                self.high[TIMA] = self.high[TMA];
                self.request_interrupt(Interrupts::TIMER);
            } else {
                self.high[TIMA] = tima;
            }
        }
    }

    pub(super) fn write_tac(&mut self, value: u8) {
        let old = self.high[TAC];
        self.high[TAC] = value;
        if timer_period(old) != timer_period(value) {
            self.timer.counter = 0;
        }
    }
}
