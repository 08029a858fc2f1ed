//! Cartridge blob and header decoding.

use crate::error::EmuError;
use crate::memory_map::ROM_BANK_SIZE;

// Header field offsets.
const HEADER_END: usize = 0x0150;
const TITLE_ADDR: usize = 0x0134;
const TITLE_MAX_LEN: usize = 16;
const CARTRIDGE_TYPE_ADDR: usize = 0x0147;
const ROM_SIZE_ADDR: usize = 0x0148;
const RAM_SIZE_ADDR: usize = 0x0149;
const HEADER_CHECKSUM_ADDR: usize = 0x014D;

// The checksum covers title, licensee, flags and size codes.
const CHECKSUM_START: usize = 0x0134;
const CHECKSUM_END: usize = 0x014C;

/// An immutable ROM image plus the decoded header fields the core cares
/// about. Bank-selection state lives in the mapper, not here.
pub struct Cartridge {
    rom: Vec<u8>,
    title: String,
    cartridge_type: u8,
    rom_size_code: u8,
    ram_size_code: u8,
}

impl Cartridge {
    /// Decodes the header and validates the ROM length against it.
    pub fn new(rom: Vec<u8>) -> Result<Self, EmuError> {
        if rom.len() < HEADER_END {
            return Err(EmuError::RomTooShort(rom.len()));
        }

        let rom_size_code = rom[ROM_SIZE_ADDR];
        if rom_size_code > 0x08 {
            return Err(EmuError::RomSizeCode(rom_size_code));
        }

        let expected_len = 0x8000usize << rom_size_code;
        if rom.len() != expected_len {
            return Err(EmuError::RomLength {
                expected: expected_len,
                actual: rom.len(),
            });
        }

        let ram_size_code = rom[RAM_SIZE_ADDR];
        if ram_size_code > 0x05 {
            return Err(EmuError::RamSizeCode(ram_size_code));
        }

        let title = rom[TITLE_ADDR..TITLE_ADDR + TITLE_MAX_LEN]
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| b as char)
            .collect();

        Ok(Cartridge {
            cartridge_type: rom[CARTRIDGE_TYPE_ADDR],
            rom_size_code,
            ram_size_code,
            title,
            rom,
        })
    }

    /// Verifies the header checksum: `x = x - rom[a] - 1` over
    /// 0x0134..=0x014C, low 8 bits compared against 0x014D.
    pub fn verify_checksum(&self) -> Result<(), EmuError> {
        let mut checksum: u8 = 0;
        for addr in CHECKSUM_START..=CHECKSUM_END {
            checksum = checksum.wrapping_sub(self.rom[addr]).wrapping_sub(1);
        }

        let expected = self.rom[HEADER_CHECKSUM_ADDR];
        if checksum != expected {
            return Err(EmuError::HeaderChecksum {
                expected,
                computed: checksum,
            });
        }
        Ok(())
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cartridge_type(&self) -> u8 {
        self.cartridge_type
    }

    pub fn rom_size_code(&self) -> u8 {
        self.rom_size_code
    }

    /// Number of 16 KiB ROM banks: `2^(code + 1)`.
    pub fn rom_bank_count(&self) -> usize {
        2usize << self.rom_size_code
    }

    /// Number of 8 KiB external RAM banks.
    pub fn ram_bank_count(&self) -> usize {
        match self.ram_size_code {
            0x00 | 0x01 => 0, // 0x01 is an unused 2 KiB code; treat as none
            0x02 => 1,
            0x03 => 4,
            0x04 => 16,
            0x05 => 8,
            _ => 0,
        }
    }

    pub fn ram_size(&self) -> usize {
        self.ram_bank_count() * crate::memory_map::EXT_RAM_BANK_SIZE
    }

    /// One log line with the decoded header, emitted at session start.
    pub fn log_info(&self) {
        log::info!(
            "cartridge \"{}\": type {:#04X}, {} ROM banks ({} KiB), {} RAM banks",
            self.title,
            self.cartridge_type,
            self.rom_bank_count(),
            self.rom_bank_count() * ROM_BANK_SIZE / 1024,
            self.ram_bank_count(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        // 27 zero bytes under the checksum give (0 - 27) mod 256 = 0xE5
        rom[HEADER_CHECKSUM_ADDR] = 0xE5;
        rom
    }

    #[test]
    fn checksum_of_zeroed_header() {
        let cart = Cartridge::new(blank_rom()).unwrap();
        cart.verify_checksum().unwrap();
    }

    #[test]
    fn checksum_mismatch_is_fatal() {
        let mut rom = blank_rom();
        rom[HEADER_CHECKSUM_ADDR] = 0x00;
        let cart = Cartridge::new(rom).unwrap();
        assert_eq!(
            cart.verify_checksum(),
            Err(EmuError::HeaderChecksum {
                expected: 0x00,
                computed: 0xE5
            })
        );
    }

    #[test]
    fn rom_length_must_match_header() {
        let mut rom = blank_rom();
        rom[ROM_SIZE_ADDR] = 0x01; // header claims 4 banks, file has 2
        assert!(matches!(
            Cartridge::new(rom),
            Err(EmuError::RomLength { .. })
        ));
    }

    #[test]
    fn title_is_decoded() {
        let mut rom = vec![0u8; 0x8000];
        rom[TITLE_ADDR..TITLE_ADDR + 5].copy_from_slice(b"TETRA");
        let cart = Cartridge::new(rom).unwrap();
        assert_eq!(cart.title(), "TETRA");
    }

    #[test]
    fn bank_counts_follow_the_size_codes() {
        let mut rom = vec![0u8; 0x8000 << 5];
        rom[ROM_SIZE_ADDR] = 0x05;
        rom[RAM_SIZE_ADDR] = 0x03;
        let cart = Cartridge::new(rom).unwrap();
        assert_eq!(cart.rom_bank_count(), 64);
        assert_eq!(cart.ram_bank_count(), 4);
    }
}
