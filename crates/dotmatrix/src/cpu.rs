mod dispatch;
mod regs;

pub use dispatch::{BasicDispatcher, Dispatcher};
pub use regs::{Flag, Registers};

use crate::{Error, Result};

/// Abstraction over the Game Boy bus (memory and IO).
///
/// Instruction execution and interrupt entry only ever see memory through
/// this trait.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);
}

/// Interrupt-enable and halt state of the CPU.
///
/// Only the reachable combinations exist: an `EI` that has not taken effect
/// yet can never coexist with a halted CPU.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecState {
    Running { ime: bool },
    /// `EI` executed; interrupts turn on at the next interrupt evaluation.
    EnablePending,
    Halted { ime: bool },
}

const FLAG_PENDING: u8 = 1 << 0;
const FLAG_IME: u8 = 1 << 1;
const FLAG_HALTED: u8 = 1 << 2;

impl ExecState {
    pub fn ime(self) -> bool {
        match self {
            ExecState::Running { ime } | ExecState::Halted { ime } => ime,
            ExecState::EnablePending => false,
        }
    }

    pub fn is_halted(self) -> bool {
        matches!(self, ExecState::Halted { .. })
    }

    /// Packed form used by save states: bit 0 pending enable, bit 1
    /// interrupts on, bit 2 halted.
    pub fn to_flags(self) -> u8 {
        let ime_bit = |ime: bool| if ime { FLAG_IME } else { 0 };
        match self {
            ExecState::Running { ime } => ime_bit(ime),
            ExecState::EnablePending => FLAG_PENDING,
            ExecState::Halted { ime } => FLAG_HALTED | ime_bit(ime),
        }
    }

    pub fn from_flags(flags: u8) -> Result<Self> {
        let pending = flags & FLAG_PENDING != 0;
        let ime = flags & FLAG_IME != 0;
        let halted = flags & FLAG_HALTED != 0;
        match (pending, halted) {
            (false, false) => Ok(ExecState::Running { ime }),
            (false, true) => Ok(ExecState::Halted { ime }),
            // A pending enable always promotes before IME is observed.
            (true, false) => Ok(ExecState::EnablePending),
            (true, true) => Err(Error::InvalidExecFlags(flags)),
        }
    }
}

impl Default for ExecState {
    fn default() -> Self {
        ExecState::Running { ime: false }
    }
}

pub struct Cpu {
    pub regs: Registers,
    pub state: ExecState,
    /// Cycles executed since power-on, wrapping.
    pub ticks: u32,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::post_boot(),
            state: ExecState::default(),
            ticks: 0,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    pub fn fetch8<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub fn fetch16<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Push a 16-bit value: high byte at SP-1, low byte at SP-2.
    pub fn push_u16<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    pub fn pop_u16<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read8(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    pub fn halt(&mut self) {
        self.state = match self.state {
            ExecState::Running { ime } => ExecState::Halted { ime },
            // The enable lands before the CPU goes to sleep.
            ExecState::EnablePending => ExecState::Halted { ime: true },
            halted @ ExecState::Halted { .. } => halted,
        };
    }

    /// `EI`: interrupts turn on after the next interrupt evaluation.
    pub fn enable_interrupts_deferred(&mut self) {
        self.state = ExecState::EnablePending;
    }

    /// `RETI`: interrupts turn on immediately.
    pub fn enable_interrupts(&mut self) {
        self.state = ExecState::Running { ime: true };
    }

    /// `DI`: clears both the pending enable and IME.
    pub fn disable_interrupts(&mut self) {
        self.state = match self.state {
            ExecState::Halted { .. } => ExecState::Halted { ime: false },
            _ => ExecState::Running { ime: false },
        };
    }

    /// Wake from HALT, keeping the interrupt-enable state.
    pub fn wake(&mut self) {
        if let ExecState::Halted { ime } = self.state {
            self.state = ExecState::Running { ime };
        }
    }
}

#[cfg(test)]
mod tests;
