//! Fatal error kinds for the emulator core.
//!
//! Recoverable conditions (open-bus reads, writes into undecoded I/O) never
//! surface here; they return stable values and go through the log facade.

use std::error::Error;
use std::fmt;

/// Fatal conditions that terminate the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmuError {
    /// The interpreter fetched an opcode with no encoding.
    InvalidOpcode { pc: u16, opcode: u8 },
    /// The cartridge type byte names a mapper this core does not implement.
    UnsupportedMapper(u8),
    /// The header checksum over 0x0134..=0x014C does not match 0x014D.
    HeaderChecksum { expected: u8, computed: u8 },
    /// The ROM file length disagrees with the header's ROM size code.
    RomLength { expected: usize, actual: usize },
    /// The ROM is too short to contain a header at all.
    RomTooShort(usize),
    /// The header carries a ROM size code outside 0x00..=0x08.
    RomSizeCode(u8),
    /// The header carries an unknown RAM size code.
    RamSizeCode(u8),
    /// A boot ROM was supplied but is not exactly 256 bytes.
    BootRomLength(usize),
}

impl fmt::Display for EmuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmuError::InvalidOpcode { pc, opcode } => {
                write!(f, "invalid opcode {:#04X} at PC={:#06X}", opcode, pc)
            }
            EmuError::UnsupportedMapper(kind) => {
                write!(f, "unsupported cartridge mapper type {:#04X}", kind)
            }
            EmuError::HeaderChecksum { expected, computed } => write!(
                f,
                "header checksum mismatch (header says {:#04X}, computed {:#04X})",
                expected, computed
            ),
            EmuError::RomLength { expected, actual } => write!(
                f,
                "ROM length {} does not match header ({} expected)",
                actual, expected
            ),
            EmuError::RomTooShort(len) => {
                write!(f, "ROM of {} bytes is too short to hold a header", len)
            }
            EmuError::RomSizeCode(code) => write!(f, "unsupported ROM size code {:#04X}", code),
            EmuError::RamSizeCode(code) => write!(f, "unsupported RAM size code {:#04X}", code),
            EmuError::BootRomLength(len) => {
                write!(f, "boot ROM must be 256 bytes, got {}", len)
            }
        }
    }
}

impl Error for EmuError {}

/// Result alias used throughout the interpreter.
pub type CpuResult<T> = Result<T, EmuError>;
