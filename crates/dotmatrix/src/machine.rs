pub mod cartridge;
mod gameboy;
mod interrupts;
mod memory;
mod savestate;

pub use cartridge::{BankingController, CartKind, Cartridge};
pub use gameboy::{AudioSink, GameBoy, Options};
pub use interrupts::Interrupts;
pub use memory::{Button, Memory, Speed, TransferCallback};
