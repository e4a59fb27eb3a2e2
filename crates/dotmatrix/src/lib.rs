pub mod cpu;
mod error;
pub mod machine;
mod state;

pub use error::{Error, Result};
pub use machine::{
    AudioSink, BankingController, Button, CartKind, Cartridge, GameBoy, Interrupts, Memory,
    Options, Speed, TransferCallback,
};

/// Number of CPU T-cycles per second on DMG hardware.
pub const CLOCK_SPEED: u32 = 4_194_304;
/// Target frame rate of the host loop.
pub const FRAMES_PER_SECOND: u32 = 60;
/// Cycle budget of a single `GameBoy::update` call at normal speed.
pub const CYCLES_PER_FRAME: u32 = CLOCK_SPEED / FRAMES_PER_SECOND;

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
