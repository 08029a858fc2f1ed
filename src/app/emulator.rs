use pocket::cartridge::Cartridge;
use pocket::cpu::Cpu;
use pocket::joypad::JoypadState;
use pocket::mapper::Mapper;
use pocket::memory_bus::MemoryBus;
use pocket::memory_map::{BOOT_ROM_SIZE, SCX_ADDR, SCY_ADDR};
use pocket::ppu::Ppu;
use pocket::scheduler::Scheduler;
use std::fs;
use std::path::Path;

/// The assembled machine: CPU, bus, projector and scheduler.
pub struct Emulator {
    pub cpu: Cpu,
    pub bus: MemoryBus,
    pub ppu: Ppu,
    pub scheduler: Scheduler,
}

impl Emulator {
    /// Loads the cartridge (and optional 256-byte boot ROM) and builds the
    /// machine. Without a boot ROM the header checksum must hold and the
    /// CPU/I-O state starts in the post-boot configuration.
    pub fn new(rom_path: &Path, boot_rom_path: Option<&Path>) -> Result<Self, String> {
        let rom = fs::read(rom_path)
            .map_err(|e| format!("could not read ROM '{}': {}", rom_path.display(), e))?;
        let cartridge = Cartridge::new(rom).map_err(|e| e.to_string())?;

        let boot_rom = match boot_rom_path {
            Some(path) => {
                let data = fs::read(path)
                    .map_err(|e| format!("could not read boot ROM '{}': {}", path.display(), e))?;
                if data.len() != BOOT_ROM_SIZE {
                    return Err(pocket::error::EmuError::BootRomLength(data.len()).to_string());
                }
                Some(data)
            }
            None => None,
        };

        let skip_boot_rom = boot_rom.is_none();
        if skip_boot_rom {
            cartridge.verify_checksum().map_err(|e| e.to_string())?;
        }
        cartridge.log_info();

        let mapper = Mapper::for_cartridge(&cartridge).map_err(|e| e.to_string())?;
        let mut bus = MemoryBus::new(cartridge, mapper, boot_rom);
        if skip_boot_rom {
            bus.initialize_post_boot_io();
        }

        Ok(Emulator {
            cpu: Cpu::new(skip_boot_rom),
            bus,
            ppu: Ppu::new(),
            scheduler: Scheduler::new(),
        })
    }

    /// Advances the machine by `delta` seconds of emulated time.
    pub fn run(&mut self, delta: f64) -> Result<(), String> {
        self.scheduler
            .run(&mut self.cpu, &mut self.bus, delta)
            .map_err(|e| e.to_string())
    }

    pub fn set_joypad(&mut self, state: JoypadState) {
        self.bus.joypad.set_state(state);
    }

    /// Projects the current frame into the host buffer.
    pub fn render(&mut self, frame: &mut [u8]) {
        self.ppu.render_frame(&self.bus, frame);
    }

    /// (SCX, SCY): where the host samples its 160x144 window.
    pub fn scroll(&self) -> (u8, u8) {
        (self.bus.io_reg(SCX_ADDR), self.bus.io_reg(SCY_ADDR))
    }
}
