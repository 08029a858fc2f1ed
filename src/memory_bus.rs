//! The 64 KiB address space: decode and routing.

use crate::cartridge::Cartridge;
use crate::joypad::Joypad;
use crate::mapper::Mapper;
use crate::memory_map::*;

/// Routes every CPU access to the right backing store: the cartridge ROM
/// through its mapper, the RAMs owned here, the I/O register file, or the
/// interrupt-enable byte. Also owns the boot-ROM overlay while it is mapped.
pub struct MemoryBus {
    cartridge: Cartridge,
    mapper: Mapper,

    vram: Box<[u8; VRAM_SIZE]>,
    wram: Box<[u8; WRAM_SIZE]>,
    oam: Box<[u8; OAM_SIZE]>,
    io_registers: Box<[u8; IO_REGISTERS_SIZE]>,
    hram: Box<[u8; HRAM_SIZE]>,
    interrupt_enable: u8,

    boot_rom: Option<Vec<u8>>,
    boot_rom_enabled: bool,

    pub joypad: Joypad,
}

impl MemoryBus {
    /// Builds the bus around a cartridge and its mapper. All RAMs start
    /// zeroed. When a boot ROM is supplied it overlays 0x0000-0x00FF until
    /// the program writes a non-zero byte to 0xFF50.
    pub fn new(cartridge: Cartridge, mapper: Mapper, boot_rom: Option<Vec<u8>>) -> Self {
        let boot_rom_enabled = boot_rom.is_some();
        MemoryBus {
            cartridge,
            mapper,
            vram: Box::new([0; VRAM_SIZE]),
            wram: Box::new([0; WRAM_SIZE]),
            oam: Box::new([0; OAM_SIZE]),
            io_registers: Box::new([0; IO_REGISTERS_SIZE]),
            hram: Box::new([0; HRAM_SIZE]),
            interrupt_enable: 0,
            boot_rom,
            boot_rom_enabled,
            joypad: Joypad::new(),
        }
    }

    /// Seeds the I/O file with the state the boot ROM would leave behind.
    /// Only called when the session starts without a boot ROM.
    pub fn initialize_post_boot_io(&mut self) {
        let defaults: &[(u16, u8)] = &[
            (SC_ADDR, 0x7E),
            (IF_ADDR, 0xE1),
            // Audio mirrors
            (0xFF10, 0x80),
            (0xFF11, 0xBF),
            (0xFF12, 0xF3),
            (0xFF14, 0xBF),
            (0xFF16, 0x3F),
            (0xFF19, 0xBF),
            (0xFF1A, 0x7F),
            (0xFF1B, 0xFF),
            (0xFF1C, 0x9F),
            (0xFF1E, 0xBF),
            (0xFF20, 0xFF),
            (0xFF23, 0xBF),
            (0xFF24, 0x77),
            (0xFF25, 0xF3),
            (0xFF26, 0xF1),
            // LCD
            (LCDC_ADDR, 0x91),
            (STAT_ADDR, 0x85),
            (BGP_ADDR, 0xFC),
            (OBP0_ADDR, 0xFF),
            (OBP1_ADDR, 0xFF),
        ];
        for &(addr, value) in defaults {
            self.io_registers[(addr - IO_REGISTERS_START) as usize] = value;
        }
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            ROM_BANK_0_START..=ROM_BANK_N_END => {
                if self.boot_rom_enabled && addr < BOOT_ROM_SIZE as u16 {
                    if let Some(boot) = &self.boot_rom {
                        return boot[addr as usize];
                    }
                }
                self.mapper.read_rom(&self.cartridge, addr)
            }
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize],
            EXT_RAM_START..=EXT_RAM_END => self.mapper.read_ram(addr),
            WRAM_START..=WRAM_END => self.wram[(addr - WRAM_START) as usize],
            // Echo RAM mirrors WRAM
            ECHO_RAM_START..=ECHO_RAM_END => self.wram[(addr - ECHO_RAM_START) as usize],
            OAM_START..=OAM_END => self.oam[(addr - OAM_START) as usize],
            NOT_USABLE_START..=NOT_USABLE_END => 0xFF,
            IO_REGISTERS_START..=IO_REGISTERS_END => self.read_io(addr),
            HRAM_START..=HRAM_END => self.hram[(addr - HRAM_START) as usize],
            INTERRUPT_ENABLE_REGISTER => self.interrupt_enable,
        }
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        match addr {
            // ROM-window writes drive the mapper's bank registers
            ROM_BANK_0_START..=ROM_BANK_N_END => self.mapper.write_rom(addr, value),
            VRAM_START..=VRAM_END => self.vram[(addr - VRAM_START) as usize] = value,
            EXT_RAM_START..=EXT_RAM_END => self.mapper.write_ram(addr, value),
            WRAM_START..=WRAM_END => self.wram[(addr - WRAM_START) as usize] = value,
            ECHO_RAM_START..=ECHO_RAM_END => {
                self.wram[(addr - ECHO_RAM_START) as usize] = value;
            }
            OAM_START..=OAM_END => self.oam[(addr - OAM_START) as usize] = value,
            NOT_USABLE_START..=NOT_USABLE_END => {
                log::warn!(
                    "write into unusable memory ignored (addr = {:#06X}, value = {:#04X})",
                    addr,
                    value
                );
            }
            IO_REGISTERS_START..=IO_REGISTERS_END => self.write_io(addr, value),
            HRAM_START..=HRAM_END => self.hram[(addr - HRAM_START) as usize] = value,
            INTERRUPT_ENABLE_REGISTER => self.interrupt_enable = value,
        }
    }

    fn read_io(&self, addr: u16) -> u8 {
        match addr {
            P1_JOYP_ADDR => self.joypad.read(),
            BOOT_ROM_DISABLE_ADDR => 0xFF,
            SB_ADDR
            | SC_ADDR
            | DIV_ADDR..=TAC_ADDR
            | IF_ADDR
            | AUDIO_START..=AUDIO_END
            | WAVE_RAM_START..=WAVE_RAM_END
            | LCDC_ADDR..=WX_ADDR => self.io_registers[(addr - IO_REGISTERS_START) as usize],
            _ => 0xFF, // undecoded slots read open-bus
        }
    }

    fn write_io(&mut self, addr: u16, value: u8) {
        let offset = (addr - IO_REGISTERS_START) as usize;
        match addr {
            P1_JOYP_ADDR => self.joypad.write(value),
            DIV_ADDR => self.io_registers[offset] = 0, // any write resets the divider
            LY_ADDR => {} // read-only, synthesized by the scheduler
            STAT_ADDR => {
                // Bits 0-2 (mode, coincidence) belong to the video timing
                self.io_registers[offset] =
                    (value & 0xF8) | (self.io_registers[offset] & 0x07);
            }
            DMA_ADDR => {
                self.io_registers[offset] = value;
                self.oam_dma(value);
            }
            BOOT_ROM_DISABLE_ADDR => {
                if self.boot_rom_enabled && value != 0 {
                    self.boot_rom_enabled = false;
                }
            }
            SB_ADDR
            | SC_ADDR
            | TIMA_ADDR..=TAC_ADDR
            | IF_ADDR
            | AUDIO_START..=AUDIO_END
            | WAVE_RAM_START..=WAVE_RAM_END
            | LCDC_ADDR
            | SCY_ADDR..=SCX_ADDR
            | LYC_ADDR
            | BGP_ADDR..=WX_ADDR => self.io_registers[offset] = value,
            0xFF7F => {} // several titles write here; silently ignored
            _ => {
                log::debug!(
                    "write into undecoded I/O slot ignored (addr = {:#06X}, value = {:#04X})",
                    addr,
                    value
                );
            }
        }
    }

    /// OAM DMA: copies 160 bytes from `source << 8` into OAM in one go.
    fn oam_dma(&mut self, source: u8) {
        let base = (source as u16) << 8;
        if base >= OAM_START {
            log::warn!("OAM DMA from restricted area {:#06X} ignored", base);
            return;
        }
        for i in 0..OAM_SIZE as u16 {
            let byte = self.read_byte(base + i);
            self.oam[i as usize] = byte;
        }
    }

    // --- Accessors for the scheduler and the projector ---
    //
    // These bypass the write-side special cases above, which is exactly what
    // the components that own those registers need.

    pub fn io_reg(&self, addr: u16) -> u8 {
        debug_assert!((IO_REGISTERS_START..=IO_REGISTERS_END).contains(&addr));
        self.io_registers[(addr - IO_REGISTERS_START) as usize]
    }

    pub fn set_io_reg(&mut self, addr: u16, value: u8) {
        debug_assert!((IO_REGISTERS_START..=IO_REGISTERS_END).contains(&addr));
        self.io_registers[(addr - IO_REGISTERS_START) as usize] = value;
    }

    /// ORs one source bit (0-4) into the pending-interrupt register.
    pub fn request_interrupt(&mut self, bit: u8) {
        if bit < 5 {
            let offset = (IF_ADDR - IO_REGISTERS_START) as usize;
            self.io_registers[offset] = crate::bits::set_bit(self.io_registers[offset], bit);
        }
    }

    /// Clears one pending bit after the CPU dispatches it.
    pub fn clear_interrupt_flag(&mut self, bit: u8) {
        let offset = (IF_ADDR - IO_REGISTERS_START) as usize;
        self.io_registers[offset] = crate::bits::clear_bit(self.io_registers[offset], bit);
    }

    pub fn interrupt_flags(&self) -> u8 {
        self.io_reg(IF_ADDR)
    }

    pub fn interrupt_enable(&self) -> u8 {
        self.interrupt_enable
    }

    pub fn boot_rom_enabled(&self) -> bool {
        self.boot_rom_enabled
    }

    pub fn vram(&self) -> &[u8; VRAM_SIZE] {
        &self.vram
    }

    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }
}
