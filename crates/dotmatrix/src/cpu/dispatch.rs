use super::{Bus, Cpu, Flag};

/// Executes one instruction at PC and reports its cost in T-cycles.
///
/// The machine calls this once per loop iteration while the CPU is not
/// halted. Implementations reach memory only through `bus`, and change the
/// interrupt state only through the `Cpu` helpers (`halt`, `enable_*`,
/// `disable_interrupts`).
pub trait Dispatcher {
    fn execute(&mut self, cpu: &mut Cpu, bus: &mut dyn Bus) -> u32;
}

/// Operand index 6 in the `r8` encoding means `(HL)`.
const HL_INDIRECT: u8 = 6;

/// Small built-in decoder for the control and system instructions.
///
/// Covers what drives the machine's state (HALT, STOP, EI/DI, calls,
/// returns, jumps, RST, stack and a few loads). Any other opcode executes
/// as a 4-cycle no-op and is reported once.
pub struct BasicDispatcher {
    warned: [bool; 256],
}

impl Default for BasicDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicDispatcher {
    pub fn new() -> Self {
        Self {
            warned: [false; 256],
        }
    }

    fn read_r8(cpu: &Cpu, bus: &mut dyn Bus, index: u8) -> u8 {
        if index == HL_INDIRECT {
            bus.read8(cpu.regs.hl())
        } else {
            cpu.regs.r8(index)
        }
    }

    fn write_r8(cpu: &mut Cpu, bus: &mut dyn Bus, index: u8, value: u8) {
        if index == HL_INDIRECT {
            bus.write8(cpu.regs.hl(), value);
        } else {
            cpu.regs.set_r8(index, value);
        }
    }

    fn exec_inc_dec(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u8) -> u32 {
        let reg = (opcode >> 3) & 0x07;
        let value = Self::read_r8(cpu, bus, reg);
        let dec = opcode & 0x01 != 0;
        let result = if dec {
            value.wrapping_sub(1)
        } else {
            value.wrapping_add(1)
        };
        Self::write_r8(cpu, bus, reg, result);

        let half = if dec {
            value & 0x0F == 0x00
        } else {
            value & 0x0F == 0x0F
        };
        cpu.regs.set_flag(Flag::Z, result == 0);
        cpu.regs.set_flag(Flag::N, dec);
        cpu.regs.set_flag(Flag::H, half);

        if reg == HL_INDIRECT { 12 } else { 4 }
    }

    fn exec_push(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u8) -> u32 {
        let value = match (opcode >> 4) & 0x03 {
            0 => cpu.regs.bc(),
            1 => cpu.regs.de(),
            2 => cpu.regs.hl(),
            _ => cpu.regs.af(),
        };
        cpu.push_u16(bus, value);
        16
    }

    fn exec_pop(cpu: &mut Cpu, bus: &mut dyn Bus, opcode: u8) -> u32 {
        let value = cpu.pop_u16(bus);
        match (opcode >> 4) & 0x03 {
            0 => cpu.regs.set_bc(value),
            1 => cpu.regs.set_de(value),
            2 => cpu.regs.set_hl(value),
            _ => cpu.regs.set_af(value),
        }
        12
    }

    fn unknown(&mut self, cpu: &Cpu, opcode: u8) -> u32 {
        let seen = &mut self.warned[opcode as usize];
        if !*seen {
            *seen = true;
            log::warn!(
                "opcode {:#04x} at {:#06x} is not handled; treating it as NOP",
                opcode,
                cpu.regs.pc.wrapping_sub(1)
            );
        }
        4
    }
}

impl Dispatcher for BasicDispatcher {
    fn execute(&mut self, cpu: &mut Cpu, bus: &mut dyn Bus) -> u32 {
        let opcode = cpu.fetch8(bus);
        match opcode {
            0x00 => 4,
            0x10 => {
                // Two-byte encoding; the speed switch itself is driven by
                // the machine loop through KEY1.
                let _padding = cpu.fetch8(bus);
                4
            }
            0x76 => {
                cpu.halt();
                4
            }
            0xF3 => {
                cpu.disable_interrupts();
                4
            }
            0xFB => {
                cpu.enable_interrupts_deferred();
                4
            }
            0x18 => {
                let offset = cpu.fetch8(bus) as i8;
                cpu.regs.pc = cpu.regs.pc.wrapping_add(offset as u16);
                12
            }
            0xC3 => {
                cpu.regs.pc = cpu.fetch16(bus);
                16
            }
            0xCD => {
                let addr = cpu.fetch16(bus);
                let ret = cpu.regs.pc;
                cpu.push_u16(bus, ret);
                cpu.regs.pc = addr;
                24
            }
            0xC9 => {
                cpu.regs.pc = cpu.pop_u16(bus);
                16
            }
            0xD9 => {
                cpu.regs.pc = cpu.pop_u16(bus);
                cpu.enable_interrupts();
                16
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                let ret = cpu.regs.pc;
                cpu.push_u16(bus, ret);
                cpu.regs.pc = u16::from(opcode & 0x38);
                16
            }
            0xC5 | 0xD5 | 0xE5 | 0xF5 => Self::exec_push(cpu, bus, opcode),
            0xC1 | 0xD1 | 0xE1 | 0xF1 => Self::exec_pop(cpu, bus, opcode),
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let reg = (opcode >> 3) & 0x07;
                let value = cpu.fetch8(bus);
                Self::write_r8(cpu, bus, reg, value);
                if reg == HL_INDIRECT { 12 } else { 8 }
            }
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C | 0x05 | 0x0D | 0x15
            | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => Self::exec_inc_dec(cpu, bus, opcode),
            0xE0 => {
                let addr = 0xFF00 | u16::from(cpu.fetch8(bus));
                bus.write8(addr, cpu.regs.a);
                12
            }
            0xF0 => {
                let addr = 0xFF00 | u16::from(cpu.fetch8(bus));
                cpu.regs.a = bus.read8(addr);
                12
            }
            0xEA => {
                let addr = cpu.fetch16(bus);
                bus.write8(addr, cpu.regs.a);
                16
            }
            0xFA => {
                let addr = cpu.fetch16(bus);
                cpu.regs.a = bus.read8(addr);
                16
            }
            _ => self.unknown(cpu, opcode),
        }
    }
}
