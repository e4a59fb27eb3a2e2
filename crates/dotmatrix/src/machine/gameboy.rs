use typed_builder::TypedBuilder;

use crate::cpu::{BasicDispatcher, Cpu, Dispatcher};
use crate::{Result, CYCLES_PER_FRAME};

use super::cartridge::{BankingController, CartKind, Cartridge};
use super::interrupts;
use super::memory::{Button, Memory, TransferCallback};

/// Cost of one loop iteration while the CPU is halted.
const HALT_CYCLES: u32 = 4;

/// Receives the cycles of every executed instruction so an external APU
/// can produce samples in step with the CPU.
pub trait AudioSink {
    fn buffer(&mut self, cycles: u32, speed: u32);
}

impl<F: FnMut(u32, u32)> AudioSink for F {
    fn buffer(&mut self, cycles: u32, speed: u32) {
        self(cycles, speed)
    }
}

/// Construction options for [`GameBoy`].
#[derive(TypedBuilder)]
pub struct Options {
    /// Run in CGB mode (KEY1, VBK and SVBK become live).
    #[builder(default = false)]
    pub cgb: bool,
    /// Battery RAM contents to preload, typically a `.sav` file.
    #[builder(default, setter(strip_option))]
    pub save_data: Option<Vec<u8>>,
    #[builder(default, setter(strip_option))]
    pub transfer: Option<TransferCallback>,
    #[builder(default = Box::new(|_: u32, _: u32| {}) as Box<dyn AudioSink>)]
    pub audio: Box<dyn AudioSink>,
    #[builder(default = Box::new(BasicDispatcher::new()) as Box<dyn Dispatcher>)]
    pub dispatcher: Box<dyn Dispatcher>,
}

impl Default for Options {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// High-level Game Boy machine.
///
/// Holds the CPU core and the address space, and drives them one frame at
/// a time through [`GameBoy::update`].
pub struct GameBoy {
    pub cpu: Cpu,
    pub mem: Memory,
    dispatcher: Box<dyn Dispatcher>,
    audio: Box<dyn AudioSink>,
    paused: bool,
}

impl GameBoy {
    pub fn new(kind: CartKind, rom: Vec<u8>, options: Options) -> Result<Self> {
        let Options {
            cgb,
            save_data,
            transfer,
            audio,
            dispatcher,
        } = options;

        let mut cart = Cartridge::new(kind, rom)?;
        if let Some(data) = save_data {
            cart.load_save_data(&data)?;
        }

        let mut mem = Memory::new(cart, cgb);
        mem.set_transfer_callback(transfer);

        let mut cpu = Cpu::new();
        if cgb {
            // The CGB boot ROM leaves 0x11 in A; games check it.
            cpu.regs.a = 0x11;
        }
        log::debug!("machine: {:?} cartridge, cgb={}", kind, cgb);

        Ok(Self {
            cpu,
            mem,
            dispatcher,
            audio,
            paused: false,
        })
    }

    /// Run one frame worth of cycles and return how many were executed.
    ///
    /// The budget doubles while the CGB runs at double speed. Returns 0
    /// without touching any state while paused.
    pub fn update(&mut self) -> u32 {
        if self.paused {
            return 0;
        }

        let mut cycles = 0;
        while cycles < CYCLES_PER_FRAME * self.mem.speed().factor() {
            cycles += self.step();
        }
        cycles
    }

    /// Execute one instruction (or one halted slot) plus everything that
    /// follows it: LCD, timers, interrupts, speed switch and audio.
    pub fn step(&mut self) -> u32 {
        let op_cycles = if self.cpu.is_halted() {
            HALT_CYCLES
        } else {
            self.dispatcher.execute(&mut self.cpu, &mut self.mem)
        };

        self.mem.step_lcd(op_cycles);
        self.mem.step_timers(op_cycles);
        let cycles = op_cycles + interrupts::service(&mut self.cpu, &mut self.mem);

        if self.mem.take_speed_switch() {
            self.cpu.wake();
        }

        self.audio.buffer(op_cycles, self.mem.speed().factor());
        self.cpu.ticks = self.cpu.ticks.wrapping_add(cycles);
        cycles
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
    }

    /// Battery RAM contents, for writing a `.sav` file.
    pub fn save_data(&self) -> Vec<u8> {
        self.mem.cartridge().save_data()
    }

    pub fn press(&mut self, button: Button) {
        self.mem.press(button);
    }

    pub fn release(&mut self, button: Button) {
        self.mem.release(button);
    }
}
