use super::*;
use crate::Error;

/// 64 KiB of plain RAM with no I/O side effects.
struct FlatBus {
    mem: Vec<u8>,
}

impl FlatBus {
    fn with_program(at: u16, program: &[u8]) -> Self {
        let mut mem = vec![0u8; 0x10000];
        mem[at as usize..at as usize + program.len()].copy_from_slice(program);
        Self { mem }
    }
}

impl Bus for FlatBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }
}

fn run(cpu: &mut Cpu, bus: &mut FlatBus, steps: usize) -> u32 {
    let mut dispatcher = BasicDispatcher::new();
    let mut cycles = 0;
    for _ in 0..steps {
        cycles += dispatcher.execute(cpu, bus);
    }
    cycles
}

#[test]
fn post_boot_registers_match_dmg() {
    let cpu = Cpu::new();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
    assert_eq!(cpu.state, ExecState::Running { ime: false });
}

#[test]
fn f_low_nibble_is_always_zero() {
    let mut regs = Registers::default();
    regs.set_af(0x12FF);
    assert_eq!(regs.f, 0xF0);
    assert_eq!(regs.af(), 0x12F0);
}

/// Push stores the high byte at SP-1 and the low byte at SP-2; pop reads
/// them back in the opposite order.
#[test]
fn stack_push_pop_round_trip() {
    let mut cpu = Cpu::new();
    let mut bus = FlatBus::with_program(0, &[]);
    cpu.regs.sp = 0xD000;

    cpu.push_u16(&mut bus, 0xBEEF);
    assert_eq!(cpu.regs.sp, 0xCFFE);
    assert_eq!(bus.mem[0xCFFF], 0xBE);
    assert_eq!(bus.mem[0xCFFE], 0xEF);

    assert_eq!(cpu.pop_u16(&mut bus), 0xBEEF);
    assert_eq!(cpu.regs.sp, 0xD000);
}

#[test]
fn stack_pointer_wraps() {
    let mut cpu = Cpu::new();
    let mut bus = FlatBus::with_program(0, &[]);
    cpu.regs.sp = 0x0001;
    cpu.push_u16(&mut bus, 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFF);
    assert_eq!(bus.mem[0x0000], 0x12);
    assert_eq!(bus.mem[0xFFFF], 0x34);
    assert_eq!(cpu.pop_u16(&mut bus), 0x1234);
    assert_eq!(cpu.regs.sp, 0x0001);
}

#[test]
fn exec_flags_round_trip_with_halted_at_bit_2() {
    let states = [
        ExecState::Running { ime: false },
        ExecState::Running { ime: true },
        ExecState::EnablePending,
        ExecState::Halted { ime: false },
        ExecState::Halted { ime: true },
    ];
    for state in states {
        assert_eq!(ExecState::from_flags(state.to_flags()).unwrap(), state);
    }
    assert_eq!(ExecState::Halted { ime: false }.to_flags(), 0b100);
    assert_eq!(ExecState::Halted { ime: true }.to_flags(), 0b110);
}

#[test]
fn pending_enable_while_halted_is_rejected() {
    let err = ExecState::from_flags(0b101).unwrap_err();
    assert!(matches!(err, Error::InvalidExecFlags(0b101)));
}

#[test]
fn halt_after_ei_keeps_the_enable() {
    let mut cpu = Cpu::new();
    let mut bus = FlatBus::with_program(0x0100, &[0xFB, 0x76]);
    assert_eq!(run(&mut cpu, &mut bus, 2), 8);
    assert_eq!(cpu.state, ExecState::Halted { ime: true });
}

#[test]
fn di_clears_pending_enable() {
    let mut cpu = Cpu::new();
    let mut bus = FlatBus::with_program(0x0100, &[0xFB, 0xF3]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.state, ExecState::Running { ime: false });
}

#[test]
fn call_and_ret_use_the_stack() {
    let mut cpu = Cpu::new();
    // CALL 0x0200 ; ... ; 0x0200: RET
    let mut bus = FlatBus::with_program(0x0100, &[0xCD, 0x00, 0x02]);
    bus.mem[0x0200] = 0xC9;

    assert_eq!(run(&mut cpu, &mut bus, 1), 24);
    assert_eq!(cpu.regs.pc, 0x0200);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.mem[0xFFFD], 0x01);
    assert_eq!(bus.mem[0xFFFC], 0x03);

    assert_eq!(run(&mut cpu, &mut bus, 1), 16);
    assert_eq!(cpu.regs.pc, 0x0103);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn reti_enables_interrupts_immediately() {
    let mut cpu = Cpu::new();
    let mut bus = FlatBus::with_program(0x0100, &[0xD9]);
    cpu.push_u16(&mut bus, 0x4321);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.pc, 0x4321);
    assert_eq!(cpu.state, ExecState::Running { ime: true });
}

#[test]
fn rst_jumps_to_fixed_vector() {
    let mut cpu = Cpu::new();
    let mut bus = FlatBus::with_program(0x0100, &[0xEF]);
    assert_eq!(run(&mut cpu, &mut bus, 1), 16);
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(cpu.pop_u16(&mut bus), 0x0101);
}

#[test]
fn jr_takes_signed_offset() {
    let mut cpu = Cpu::new();
    // JR -2 loops on itself.
    let mut bus = FlatBus::with_program(0x0100, &[0x18, 0xFE]);
    assert_eq!(run(&mut cpu, &mut bus, 3), 36);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn push_pop_moves_pairs() {
    let mut cpu = Cpu::new();
    // PUSH BC ; POP DE
    let mut bus = FlatBus::with_program(0x0100, &[0xC5, 0xD1]);
    cpu.regs.set_bc(0xA55A);
    assert_eq!(run(&mut cpu, &mut bus, 2), 28);
    assert_eq!(cpu.regs.de(), 0xA55A);
}

#[test]
fn loads_and_inc_dec_update_registers_and_flags() {
    let mut cpu = Cpu::new();
    // LD A,0x0F ; INC A ; LD B,0x01 ; DEC B ; LDH (0x80),A ; LD A,(0xFF80)
    let program = [0x3E, 0x0F, 0x3C, 0x06, 0x01, 0x05, 0xE0, 0x80, 0xFA, 0x80, 0xFF];
    let mut bus = FlatBus::with_program(0x0100, &program);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.a, 0x10);
    assert!(cpu.regs.flag(Flag::H));
    assert!(!cpu.regs.flag(Flag::Z));

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.b, 0x00);
    assert!(cpu.regs.flag(Flag::Z));
    assert!(cpu.regs.flag(Flag::N));

    run(&mut cpu, &mut bus, 1);
    assert_eq!(bus.mem[0xFF80], 0x10);
    cpu.regs.a = 0;
    assert_eq!(run(&mut cpu, &mut bus, 1), 16);
    assert_eq!(cpu.regs.a, 0x10);
}

#[test]
fn unknown_opcode_is_a_four_cycle_nop() {
    let mut cpu = Cpu::new();
    let mut bus = FlatBus::with_program(0x0100, &[0xD3, 0xD3]);
    let before = cpu.regs;
    assert_eq!(run(&mut cpu, &mut bus, 2), 8);
    assert_eq!(cpu.regs.pc, 0x0102);
    assert_eq!(cpu.regs.af(), before.af());
}
