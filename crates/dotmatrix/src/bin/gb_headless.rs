use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use dotmatrix::{CartKind, GameBoy, Options};

const USAGE: &str = "Usage: gb_headless <rom_path> [frames] [--cgb] [--save-ram PATH] \
                     [--save-state PATH] [--load-state PATH]";

struct Args {
    rom: PathBuf,
    frames: u32,
    cgb: bool,
    save_ram: Option<PathBuf>,
    save_state: Option<PathBuf>,
    load_state: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut rom = None;
    let mut frames = None;
    let mut cgb = false;
    let mut save_ram = None;
    let mut save_state = None;
    let mut load_state = None;

    while let Some(arg) = args.next() {
        let mut path_for = |flag: &str| {
            args.next()
                .map(PathBuf::from)
                .with_context(|| format!("{flag} needs a path\n{USAGE}"))
        };
        match arg.as_str() {
            "--cgb" => cgb = true,
            "--save-ram" => save_ram = Some(path_for("--save-ram")?),
            "--save-state" => save_state = Some(path_for("--save-state")?),
            "--load-state" => load_state = Some(path_for("--load-state")?),
            _ if rom.is_none() => rom = Some(PathBuf::from(&arg)),
            _ if frames.is_none() => {
                frames = Some(
                    arg.parse()
                        .with_context(|| format!("invalid frame count '{arg}'"))?,
                )
            }
            _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
        }
    }

    Ok(Args {
        rom: rom.context(USAGE)?,
        frames: frames.unwrap_or(60),
        cgb,
        save_ram,
        save_state,
        load_state,
    })
}

/// Map the cartridge type byte at 0x0147 to a banking controller.
fn cart_kind(rom: &[u8]) -> Result<CartKind> {
    let code = rom.get(0x0147).copied().unwrap_or(0);
    Ok(match code {
        // Plain ROM carts behave like an MBC1 that is never written to.
        0x00 => {
            log::warn!("ROM-only cartridge, emulating with MBC1");
            CartKind::Mbc1
        }
        0x01..=0x03 => CartKind::Mbc1,
        0x05 | 0x06 => CartKind::Mbc2,
        0x0F..=0x13 => CartKind::Mbc3,
        0x19..=0x1E => CartKind::Mbc5,
        _ => bail!("unsupported cartridge type {code:#04x}"),
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("failed to read ROM '{}'", args.rom.display()))?;
    let kind = cart_kind(&rom)?;
    // 0xC0 marks a CGB-only game.
    let cgb = args.cgb || rom.get(0x0143) == Some(&0xC0);
    log::info!("{}: {:?}, cgb={}", args.rom.display(), kind, cgb);

    let mut options = Options::builder()
        .cgb(cgb)
        .transfer(Box::new(|byte: u8| {
            let mut out = std::io::stdout().lock();
            // Serial output is best effort.
            if let Err(e) = write!(out, "{}", byte as char).and_then(|()| out.flush()) {
                log::debug!("serial output dropped: {}", e);
            }
        }))
        .build();
    if let Some(path) = &args.save_ram {
        if path.exists() {
            let data = std::fs::read(path)
                .with_context(|| format!("failed to read save RAM '{}'", path.display()))?;
            options.save_data = Some(data);
        }
    }

    let mut gb = GameBoy::new(kind, rom, options).context("failed to build machine")?;

    if let Some(path) = &args.load_state {
        let file = File::open(path)
            .with_context(|| format!("failed to open state '{}'", path.display()))?;
        gb.load_state(&mut BufReader::new(file))
            .with_context(|| format!("failed to load state '{}'", path.display()))?;
        log::info!("loaded state from {}", path.display());
    }

    let mut cycles = 0u64;
    for _ in 0..args.frames {
        cycles += u64::from(gb.update());
    }
    log::info!(
        "ran {} frames, {} cycles, {} LCD frames, pc={:#06x}",
        args.frames,
        cycles,
        gb.mem.frames(),
        gb.cpu.regs.pc
    );

    if let Some(path) = &args.save_ram {
        std::fs::write(path, gb.save_data())
            .with_context(|| format!("failed to write save RAM '{}'", path.display()))?;
    }

    if let Some(path) = &args.save_state {
        let file = File::create(path)
            .with_context(|| format!("failed to create state '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        gb.save_state(&mut writer)
            .with_context(|| format!("failed to write state '{}'", path.display()))?;
        writer.flush()?;
        log::info!("saved state to {}", path.display());
    }

    Ok(())
}
