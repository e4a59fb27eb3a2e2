use std::io;

use thiserror::Error;

use crate::machine::CartKind;

/// Errors surfaced by machine construction and save-state handling.
///
/// Addressing never produces an error: every bank computation is masked to
/// its field width.
#[derive(Error, Debug)]
pub enum Error {
    #[error("ROM image is {len} bytes, at least {min} are required")]
    RomTooSmall { len: usize, min: usize },
    #[error("save data is {len} bytes but the cartridge only holds {capacity}")]
    SaveDataTooLarge { len: usize, capacity: usize },
    #[error("save state cartridge tag {found} does not match this machine's {expected:?} controller")]
    CartridgeMismatch { expected: CartKind, found: u8 },
    #[error("save state holds unreachable interrupt/halt flags {0:#04x}")]
    InvalidExecFlags(u8),
    #[error("save state stream failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
