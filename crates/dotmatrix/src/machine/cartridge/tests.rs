use super::*;
use crate::Error;

/// ROM with `banks` 16 KiB banks, each filled with its own bank number.
fn banked_rom(banks: usize) -> Vec<u8> {
    let mut rom = vec![0u8; banks * ROM_BANK_SIZE];
    for (bank, chunk) in rom.chunks_mut(ROM_BANK_SIZE).enumerate() {
        chunk.fill(bank as u8);
    }
    rom
}

fn cart(kind: CartKind, banks: usize) -> Cartridge {
    Cartridge::new(kind, banked_rom(banks)).expect("valid ROM")
}

#[test]
fn rom_shorter_than_two_banks_is_rejected() {
    let err = Cartridge::new(CartKind::Mbc1, vec![0; 0x4000])
        .err()
        .expect("construction must fail");
    assert!(matches!(err, Error::RomTooSmall { len: 0x4000, min: 0x8000 }));
}

/// Selecting bank 0 must map bank 1 on every controller.
#[test]
fn bank_zero_maps_bank_one_for_every_variant() {
    let selects: [(CartKind, u16); 4] = [
        (CartKind::Mbc1, 0x2000),
        (CartKind::Mbc2, 0x2100),
        (CartKind::Mbc3, 0x2000),
        (CartKind::Mbc5, 0x2000),
    ];
    for (kind, addr) in selects {
        let mut cart = cart(kind, 4);
        cart.write_rom(addr, 0x03);
        assert_eq!(cart.read(0x4000), 3, "{kind:?} bank 3");
        cart.write_rom(addr, 0x00);
        assert_eq!(cart.read(0x4000), 1, "{kind:?} bank 0 aliasing");
        assert_eq!(cart.read(0x0000), 0, "{kind:?} fixed bank");
    }
}

#[test]
fn rom_bank_past_end_of_image_wraps() {
    let mut cart = cart(CartKind::Mbc3, 4);
    cart.write_rom(0x2000, 0x06);
    assert_eq!(cart.read(0x4000), 2);
}

#[test]
fn disabled_ram_reads_ff_and_drops_writes() {
    for kind in [CartKind::Mbc1, CartKind::Mbc2, CartKind::Mbc3, CartKind::Mbc5] {
        let mut cart = cart(kind, 2);
        cart.write_ram(0xA000, 0x05);
        assert_eq!(cart.read(0xA000), 0xFF, "{kind:?}");

        cart.write_rom(0x0000, 0x0A);
        cart.write_ram(0xA000, 0x05);
        assert_eq!(cart.read(0xA000), 0x05, "{kind:?}");

        // Values other than 0x0A/0x00 in the low nibble leave the gate alone.
        cart.write_rom(0x0000, 0x05);
        assert_eq!(cart.read(0xA000), 0x05, "{kind:?}");

        cart.write_rom(0x0000, 0x10);
        assert_eq!(cart.read(0xA000), 0xFF, "{kind:?}");
        assert_eq!(cart.save_data()[0], 0x05, "{kind:?}");
    }
}

/// In ROM banking mode the 0x4000 register supplies bank bits 5-6; after
/// switching to RAM banking mode the same register picks the RAM bank and
/// only the low 5 ROM bank bits remain.
#[test]
fn mbc1_mode_toggle_moves_upper_bits_between_rom_and_ram() {
    let mut cart = cart(CartKind::Mbc1, 0x80);
    cart.write_rom(0x0000, 0x0A);

    cart.write_rom(0x2000, 0x05);
    cart.write_rom(0x4000, 0x01);
    assert_eq!(cart.read(0x4000), 0x25);

    // 0x20 is one of the aliased banks.
    cart.write_rom(0x2000, 0x00);
    assert_eq!(cart.read(0x4000), 0x21);

    cart.write_rom(0x6000, 0x01);
    assert_eq!(cart.read(0x4000), 0x01);
    cart.write_rom(0x4000, 0x02);
    cart.write_ram(0xA000, 0xAB);
    assert_eq!(cart.save_data()[2 * RAM_BANK_SIZE], 0xAB);

    // Back to ROM banking: RAM bank 0 is mapped again and the ROM bank
    // keeps only its low 5 bits.
    cart.write_rom(0x6000, 0x00);
    assert_eq!(cart.read(0xA000), 0x00);
    assert_eq!(cart.read(0x4000), 0x01);
    cart.write_rom(0x4000, 0x03);
    cart.write_rom(0x2000, 0x02);
    assert_eq!(cart.read(0x4000), 0x62);
}

#[test]
fn mbc2_address_bit_8_routes_gate_and_bank_writes() {
    let mut cart = cart(CartKind::Mbc2, 8);

    // Bit 8 set: not the RAM gate.
    cart.write_rom(0x0100, 0x0A);
    cart.write_ram(0xA000, 0x07);
    assert_eq!(cart.read(0xA000), 0xFF);

    cart.write_rom(0x0000, 0x0A);
    // Bit 8 clear: not the bank register.
    cart.write_rom(0x2000, 0x05);
    assert_eq!(cart.read(0x4000), 1);
    cart.write_rom(0x2100, 0x05);
    assert_eq!(cart.read(0x4000), 5);
}

#[test]
fn mbc2_ram_keeps_low_nibble_and_mirrors() {
    let mut cart = cart(CartKind::Mbc2, 2);
    cart.write_rom(0x0000, 0x0A);
    cart.write_ram(0xA010, 0xF3);
    assert_eq!(cart.read(0xA010), 0x03);
    assert_eq!(cart.read(0xA210), 0x03);
    assert_eq!(cart.read(0xBE10), 0x03);
    assert_eq!(cart.save_data().len(), 0x200);
}

/// Latching copies the live RTC registers into the snapshot; later writes
/// only reach the live copy, and unlatching exposes it again.
#[test]
fn mbc3_latch_snapshots_live_rtc_registers() {
    let mut cart = cart(CartKind::Mbc3, 2);
    cart.write_rom(0x0000, 0x0A);
    cart.write_rom(0x4000, 0x08);
    cart.write_ram(0xA000, 0x2A);

    cart.write_rom(0x6000, 0x00);
    assert_eq!(cart.read(0xA000), 0x2A);

    cart.write_ram(0xA000, 0x30);
    assert_eq!(cart.read(0xA000), 0x2A, "latched copy is stable");

    cart.write_rom(0x6000, 0x01);
    assert_eq!(cart.read(0xA000), 0x30, "unlatched reads see live value");

    // Relatching refreshes the snapshot.
    cart.write_rom(0x6000, 0x00);
    cart.write_ram(0xA000, 0x31);
    assert_eq!(cart.read(0xA000), 0x30);
}

#[test]
fn mbc3_rtc_select_does_not_touch_ram() {
    let mut cart = cart(CartKind::Mbc3, 2);
    cart.write_rom(0x0000, 0x0A);
    cart.write_rom(0x4000, 0x03);
    cart.write_ram(0xA000, 0x11);
    cart.write_rom(0x4000, 0x0C);
    cart.write_ram(0xA000, 0x22);

    cart.write_rom(0x4000, 0x03);
    assert_eq!(cart.read(0xA000), 0x11);
    assert!(cart.save_data().iter().all(|&b| b == 0x00 || b == 0x11));
}

#[test]
fn mbc5_uses_nine_bit_rom_bank() {
    let mut rom = vec![0u8; 0x200 * ROM_BANK_SIZE];
    for (bank, chunk) in rom.chunks_mut(ROM_BANK_SIZE).enumerate() {
        chunk[0] = bank as u8;
        chunk[1] = (bank >> 8) as u8;
    }
    let mut cart = Cartridge::new(CartKind::Mbc5, rom).expect("valid ROM");

    cart.write_rom(0x2000, 0x34);
    cart.write_rom(0x3000, 0x01);
    assert_eq!((cart.read(0x4000), cart.read(0x4001)), (0x34, 0x01));

    // A bank of 0x100 is not bank 0.
    cart.write_rom(0x2000, 0x00);
    assert_eq!((cart.read(0x4000), cart.read(0x4001)), (0x00, 0x01));

    cart.write_rom(0x3000, 0x00);
    assert_eq!((cart.read(0x4000), cart.read(0x4001)), (0x01, 0x00));
}

#[test]
fn mbc5_ram_bank_is_four_bits() {
    let mut cart = cart(CartKind::Mbc5, 2);
    cart.write_rom(0x0000, 0x0A);
    cart.write_rom(0x4000, 0x1F);
    cart.write_ram(0xA001, 0x99);
    assert_eq!(cart.save_data()[15 * RAM_BANK_SIZE + 1], 0x99);
}

#[test]
fn save_data_round_trips_and_rejects_oversize() {
    let mut cart = cart(CartKind::Mbc1, 2);
    cart.load_save_data(&[1, 2, 3]).expect("prefix fits");
    cart.write_rom(0x0000, 0x0A);
    assert_eq!(cart.read(0xA002), 3);
    assert_eq!(cart.read(0xA003), 0);

    let err = cart.load_save_data(&vec![0; 0x8001]).unwrap_err();
    assert!(matches!(
        err,
        Error::SaveDataTooLarge { len: 0x8001, capacity: 0x8000 }
    ));
}

#[test]
fn state_restores_bank_registers_and_rtc() {
    let mut cart = cart(CartKind::Mbc3, 8);
    cart.write_rom(0x0000, 0x0A);
    cart.write_rom(0x2000, 0x05);
    cart.write_rom(0x4000, 0x09);
    cart.write_ram(0xA000, 0x17);
    cart.write_rom(0x6000, 0x00);

    let mut buf = Vec::new();
    cart.save_state(&mut buf).expect("save");

    let mut restored = self::cart(CartKind::Mbc3, 8);
    restored.load_state(&mut buf.as_slice()).expect("load");
    assert_eq!(restored.read(0x4000), 5);
    assert_eq!(restored.read(0xA000), 0x17);
    restored.write_ram(0xA000, 0x18);
    assert_eq!(restored.read(0xA000), 0x17, "latch flag restored");
}

/// A stored ROM bank of zero or wider than the register is normalised on
/// load, so bank 0 never appears in the switchable window.
#[test]
fn restored_rom_bank_is_masked_and_never_zero() {
    for kind in [CartKind::Mbc1, CartKind::Mbc2, CartKind::Mbc3, CartKind::Mbc5] {
        let mut buf = Vec::new();
        cart(kind, 4).save_state(&mut buf).expect("save");
        // Tag byte, then the ROM bank as a little-endian u16.
        buf[1..3].copy_from_slice(&0u16.to_le_bytes());
        let mut restored = cart(kind, 4);
        restored.load_state(&mut buf.as_slice()).expect("load");
        assert_eq!(restored.read(0x4000), 1, "{kind:?} bank 0");
    }

    let mut buf = Vec::new();
    cart(CartKind::Mbc2, 32).save_state(&mut buf).expect("save");
    buf[1..3].copy_from_slice(&0x0013u16.to_le_bytes());
    let mut restored = cart(CartKind::Mbc2, 32);
    restored.load_state(&mut buf.as_slice()).expect("load");
    assert_eq!(restored.read(0x4000), 0x03, "MBC2 keeps four bank bits");

    let mut buf = Vec::new();
    cart(CartKind::Mbc3, 256).save_state(&mut buf).expect("save");
    buf[1..3].copy_from_slice(&0x00C5u16.to_le_bytes());
    let mut restored = cart(CartKind::Mbc3, 256);
    restored.load_state(&mut buf.as_slice()).expect("load");
    assert_eq!(restored.read(0x4000), 0x45, "MBC3 keeps seven bank bits");
}

#[test]
fn state_from_another_controller_is_rejected() {
    let mut buf = Vec::new();
    cart(CartKind::Mbc5, 2).save_state(&mut buf).expect("save");

    let err = cart(CartKind::Mbc1, 2)
        .load_state(&mut buf.as_slice())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::CartridgeMismatch { expected: CartKind::Mbc1, found: 5 }
    ));
}

#[test]
fn truncated_state_is_an_io_error() {
    let mut buf = Vec::new();
    cart(CartKind::Mbc1, 2).save_state(&mut buf).expect("save");
    buf.truncate(buf.len() - 1);

    let err = cart(CartKind::Mbc1, 2)
        .load_state(&mut buf.as_slice())
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
