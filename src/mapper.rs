//! Cartridge mappers.
//!
//! Writes into the 0x0000-0x7FFF ROM window never change ROM bytes; they
//! drive the bank-selection state held here. Dispatch is a plain enum so the
//! hot read path stays a match on a tag.

use crate::cartridge::Cartridge;
use crate::error::EmuError;
use crate::memory_map::{EXT_RAM_BANK_SIZE, EXT_RAM_START, ROM_BANK_SIZE};

/// Bank-switching logic for one cartridge.
pub enum Mapper {
    /// Plain 32 KiB ROM, no banking hardware.
    NoMbc,
    Mbc1(Mbc1),
}

/// MBC1 banking state.
///
/// `bank1` is the 5-bit low bank register (zero-fixed to 1), `bank2` the
/// 2-bit high register, `mode` the banking-mode select. The effective bank
/// is always reduced modulo the cartridge's bank count.
pub struct Mbc1 {
    rom_bank_count: usize,
    ram_bank_count: usize,
    ram_enable: bool,
    bank1: u8,
    bank2: u8,
    mode: u8,
    ram: Vec<u8>,
}

impl Mapper {
    /// Picks the mapper from the cartridge type byte at 0x0147.
    ///
    /// Types this core knows about but does not implement (MBC2, MBC3,
    /// MBC5, the HuC family) fail here, at session start.
    pub fn for_cartridge(cart: &Cartridge) -> Result<Mapper, EmuError> {
        match cart.cartridge_type() {
            0x00 | 0x08 | 0x09 => Ok(Mapper::NoMbc),
            0x01..=0x03 => Ok(Mapper::Mbc1(Mbc1 {
                rom_bank_count: cart.rom_bank_count(),
                ram_bank_count: cart.ram_bank_count(),
                ram_enable: false,
                bank1: 1,
                bank2: 0,
                mode: 0,
                ram: vec![0; cart.ram_size()],
            })),
            kind => Err(EmuError::UnsupportedMapper(kind)),
        }
    }

    /// Read from the ROM window (0x0000-0x7FFF).
    pub fn read_rom(&self, cart: &Cartridge, addr: u16) -> u8 {
        let rom = cart.rom();
        match self {
            Mapper::NoMbc => {
                if (addr as usize) < rom.len() {
                    rom[addr as usize]
                } else {
                    0xFF
                }
            }
            Mapper::Mbc1(state) => {
                let bank = if addr < 0x4000 {
                    state.low_region_bank()
                } else {
                    state.high_region_bank()
                };
                let offset = bank * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1));
                if offset < rom.len() { rom[offset] } else { 0xFF }
            }
        }
    }

    /// Interpret a write into the ROM window as a bank-selection command.
    pub fn write_rom(&mut self, addr: u16, value: u8) {
        match self {
            Mapper::NoMbc => {}
            Mapper::Mbc1(state) => match addr {
                0x0000..=0x1FFF => state.ram_enable = (value & 0x0F) == 0x0A,
                0x2000..=0x3FFF => {
                    let bank = value & 0x1F;
                    state.bank1 = if bank == 0 { 1 } else { bank };
                }
                0x4000..=0x5FFF => state.bank2 = value & 0x03,
                0x6000..=0x7FFF => state.mode = value & 0x01,
                _ => unreachable!(),
            },
        }
    }

    /// Read from the external RAM window (0xA000-0xBFFF).
    pub fn read_ram(&self, addr: u16) -> u8 {
        match self {
            Mapper::NoMbc => 0xFF,
            Mapper::Mbc1(state) => match state.ram_offset(addr) {
                Some(offset) => state.ram[offset],
                None => 0xFF,
            },
        }
    }

    /// Write to the external RAM window (0xA000-0xBFFF).
    pub fn write_ram(&mut self, addr: u16, value: u8) {
        match self {
            Mapper::NoMbc => {}
            Mapper::Mbc1(state) => {
                if let Some(offset) = state.ram_offset(addr) {
                    state.ram[offset] = value;
                }
            }
        }
    }
}

impl Mbc1 {
    /// Effective bank for reads in 0x0000-0x3FFF.
    fn low_region_bank(&self) -> usize {
        if self.mode == 1 {
            ((self.bank2 as usize) << 5) % self.rom_bank_count
        } else {
            0
        }
    }

    /// Effective bank for reads in 0x4000-0x7FFF.
    fn high_region_bank(&self) -> usize {
        (((self.bank2 as usize) << 5) | self.bank1 as usize) % self.rom_bank_count
    }

    /// RAM byte offset for an 0xA000-0xBFFF access, if RAM is reachable.
    fn ram_offset(&self, addr: u16) -> Option<usize> {
        if !self.ram_enable || self.ram.is_empty() {
            return None;
        }
        // bank2 selects the RAM bank only in mode 1 on carts with 4+ banks
        let bank = if self.mode == 1 && self.ram_bank_count >= 4 {
            self.bank2 as usize % self.ram_bank_count
        } else {
            0
        };
        let offset = bank * EXT_RAM_BANK_SIZE + (addr - EXT_RAM_START) as usize;
        (offset < self.ram.len()).then_some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mbc1_cart(rom_size_code: u8, ram_size_code: u8) -> Cartridge {
        let mut rom = vec![0u8; 0x8000 << rom_size_code];
        rom[0x0147] = 0x03; // MBC1+RAM+BATTERY
        rom[0x0148] = rom_size_code;
        rom[0x0149] = ram_size_code;
        // Tag the start of every bank with its own index.
        for bank in 0..(rom.len() / ROM_BANK_SIZE) {
            rom[bank * ROM_BANK_SIZE] = bank as u8;
        }
        Cartridge::new(rom).unwrap()
    }

    #[test]
    fn unimplemented_mappers_fail_at_creation() {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0147] = 0x19; // MBC5
        let cart = Cartridge::new(rom).unwrap();
        assert_eq!(
            Mapper::for_cartridge(&cart).err(),
            Some(EmuError::UnsupportedMapper(0x19))
        );
    }

    #[test]
    fn bank_register_is_zero_fixed_after_masking() {
        let cart = mbc1_cart(0x05, 0x00); // 64 banks
        let mut mapper = Mapper::for_cartridge(&cart).unwrap();

        mapper.write_rom(0x2000, 0x00); // bank1 = 1
        assert_eq!(mapper.read_rom(&cart, 0x4000), 1);

        mapper.write_rom(0x2000, 0x20); // masked to 0, fixed to 1
        assert_eq!(mapper.read_rom(&cart, 0x4000), 1);

        mapper.write_rom(0x4000, 0x01); // bank2 = 1 -> bank 33
        assert_eq!(mapper.read_rom(&cart, 0x4000), 33);
    }

    #[test]
    fn effective_bank_wraps_at_the_bank_count() {
        let cart = mbc1_cart(0x01, 0x00); // 4 banks
        let mut mapper = Mapper::for_cartridge(&cart).unwrap();
        mapper.write_rom(0x2000, 0x1F); // 31 % 4 == 3
        assert_eq!(mapper.read_rom(&cart, 0x4000), 3);
    }

    #[test]
    fn ram_is_gated_on_the_enable_register() {
        let cart = mbc1_cart(0x00, 0x02);
        let mut mapper = Mapper::for_cartridge(&cart).unwrap();

        mapper.write_ram(0xA000, 0x55);
        assert_eq!(mapper.read_ram(0xA000), 0xFF); // disabled: open bus

        mapper.write_rom(0x0000, 0x0A);
        mapper.write_ram(0xA000, 0x55);
        assert_eq!(mapper.read_ram(0xA000), 0x55);

        mapper.write_rom(0x0000, 0x00);
        assert_eq!(mapper.read_ram(0xA000), 0xFF);
    }
}
