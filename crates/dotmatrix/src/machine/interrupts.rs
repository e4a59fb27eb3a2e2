use crate::cpu::{Cpu, ExecState};

use super::Memory;

/// Cost of an interrupt dispatch (and of a halt wake with IME off).
pub(crate) const INTERRUPT_CYCLES: u32 = 20;

bitflags::bitflags! {
    /// Interrupt lines as laid out in IF (0xFF0F) and IE (0xFFFF).
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Interrupts: u8 {
        const VBLANK = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

impl Interrupts {
    /// The highest-priority (lowest-numbered) line in the set.
    pub fn highest_priority(self) -> Option<Interrupts> {
        if self.is_empty() {
            None
        } else {
            Some(Interrupts::from_bits_retain(1 << self.bits().trailing_zeros()))
        }
    }

    /// Handler address for a single line.
    pub fn vector(self) -> u16 {
        0x0040 + 8 * self.bits().trailing_zeros() as u16
    }
}

/// Evaluate pending interrupts once, returning the cycles it took (0 or 20).
pub(crate) fn service(cpu: &mut Cpu, mem: &mut Memory) -> u32 {
    match cpu.state {
        ExecState::EnablePending => {
            cpu.state = ExecState::Running { ime: true };
            return 0;
        }
        ExecState::Running { ime: false } => return 0,
        _ => {}
    }

    let Some(line) = (mem.requested() & mem.enabled()).highest_priority() else {
        return 0;
    };

    if cpu.state == (ExecState::Halted { ime: false }) {
        // Halt ends without dispatch; the request stays pending.
        cpu.wake();
        return INTERRUPT_CYCLES;
    }

    mem.clear_interrupt(line);
    let pc = cpu.regs.pc;
    cpu.push_u16(mem, pc);
    cpu.regs.pc = line.vector();
    cpu.state = ExecState::Running { ime: false };
    log::debug!(
        "interrupt {:?}: {:#06x} -> {:#06x}, sp={:#06x}",
        line,
        pc,
        cpu.regs.pc,
        cpu.regs.sp
    );
    INTERRUPT_CYCLES
}
