//! Real-time pacing: drives the CPU, timers and the synthetic scanline.

use crate::cpu::{Cpu, CpuMode};
use crate::error::EmuError;
use crate::memory_bus::MemoryBus;
use crate::memory_map::{
    DIV_ADDR, JOYPAD_INTERRUPT_BIT, LCD_STAT_INTERRUPT_BIT, LY_ADDR, LYC_ADDR, STAT_ADDR,
    TAC_ADDR, TIMA_ADDR, TIMER_INTERRUPT_BIT, TMA_ADDR, VBLANK_INTERRUPT_BIT,
};

/// CPU machine-cycle frequency: 4.194304 MHz / 4.
pub const M_CYCLE_FREQ_HZ: f64 = 1_048_576.0;

/// Vertical-blank frequency of the LCD.
pub const VBLANK_FREQ_HZ: f64 = 59.7;

/// Duration of one vertical frame, in seconds.
pub const VFRAME_PERIOD: f64 = 1.0 / VBLANK_FREQ_HZ;

/// Scanlines per vertical frame; LY stays in 0..154, VBlank is 144..154.
pub const SCANLINES_PER_FRAME: u8 = 154;
const VBLANK_START_LINE: u8 = 144;

// A stalled host gets at most this much catch-up per call.
const MAX_DELTA: f64 = 4.0 * VFRAME_PERIOD;

// The divider ticks at 16384 Hz, i.e. once per 64 M-cycles.
const DIV_PERIOD_CYCLES: u32 = 64;

// STAT bit 6 enables the LY=LYC interrupt source.
const STAT_LYC_INT_ENABLE: u8 = 1 << 6;
const STAT_LYC_FLAG: u8 = 1 << 2;
const STAT_MODE_MASK: u8 = 0x03;

/// Converts host time into an M-cycle budget and runs the machine until the
/// budget is spent. Owns the sub-cycle counters that survive between calls.
pub struct Scheduler {
    cycle_accumulator: f64,
    vframe_time: f64,
    div_counter: u32,
    tima_counter: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            cycle_accumulator: 0.0,
            vframe_time: 0.0,
            div_counter: 0,
            tima_counter: 0,
        }
    }

    /// Advances the machine by `delta` seconds of emulated time.
    ///
    /// Each iteration follows a fixed order: joypad edges, scanline
    /// synthesis, interrupt service, one instruction, divider, timer,
    /// accumulate. Later steps observe the side effects of earlier ones.
    pub fn run(&mut self, cpu: &mut Cpu, bus: &mut MemoryBus, delta: f64) -> Result<(), EmuError> {
        let delta = delta.min(MAX_DELTA);
        let budget = delta * M_CYCLE_FREQ_HZ;

        while self.cycle_accumulator < budget {
            // 1. Joypad: a 1->0 edge on the selected lines wakes a stopped
            //    CPU and, when enabled in IE, raises the joypad interrupt.
            if bus.joypad.poll_edges() {
                if cpu.mode() == CpuMode::Stopped {
                    cpu.set_mode(CpuMode::Running);
                }
                if crate::bits::bit_set(bus.interrupt_enable(), JOYPAD_INTERRUPT_BIT) {
                    bus.request_interrupt(JOYPAD_INTERRUPT_BIT);
                }
            }

            // 2. Synthesize LY from the position inside the vertical frame.
            self.update_scanline(bus);

            // 3. Interrupt service, then 4. one instruction (a halted or
            //    stopped CPU reports exactly one M-cycle).
            let mut cycles = cpu.service_interrupts(bus);
            cycles += cpu.step(bus)?;

            // 5./6. DIV and TIMA never observe cycles spent in STOP.
            if cpu.mode() != CpuMode::Stopped {
                self.tick_timers(bus, cycles);
            }

            // 7. Account the consumed cycles against the budget.
            self.cycle_accumulator += cycles as f64;
        }

        self.cycle_accumulator -= budget;
        self.vframe_time = (self.vframe_time + delta) % VFRAME_PERIOD;
        Ok(())
    }

    /// LY = floor(frame_progress * 154), with the VBlank and LY=LYC edges
    /// raised exactly once per transition.
    fn update_scanline(&self, bus: &mut MemoryBus) {
        let frame_time = self.vframe_time + self.cycle_accumulator / M_CYCLE_FREQ_HZ;
        let progress = (frame_time / VFRAME_PERIOD).fract();
        let ly = (progress * SCANLINES_PER_FRAME as f64) as u8;

        let prev_ly = bus.io_reg(LY_ADDR);
        let lyc = bus.io_reg(LYC_ADDR);
        bus.set_io_reg(LY_ADDR, ly);

        // STAT bits 0-2 are the video timing's to write: the mode field
        // (VBlank inside 144..154, otherwise 0) and the coincidence flag.
        let mut stat = bus.io_reg(STAT_ADDR) & !(STAT_MODE_MASK | STAT_LYC_FLAG);
        if ly >= VBLANK_START_LINE {
            stat |= 0x01;
        }
        if ly == lyc {
            stat |= STAT_LYC_FLAG;
        }
        bus.set_io_reg(STAT_ADDR, stat);

        if ly != prev_ly {
            if ly == VBLANK_START_LINE {
                bus.request_interrupt(VBLANK_INTERRUPT_BIT);
            }
            if stat & STAT_LYC_INT_ENABLE != 0 && ly == lyc {
                bus.request_interrupt(LCD_STAT_INTERRUPT_BIT);
            }
        }
    }

    /// Advances DIV and, when TAC enables it, TIMA by `cycles` M-cycles.
    fn tick_timers(&mut self, bus: &mut MemoryBus, cycles: u32) {
        self.div_counter += cycles;
        while self.div_counter >= DIV_PERIOD_CYCLES {
            self.div_counter -= DIV_PERIOD_CYCLES;
            let div = bus.io_reg(DIV_ADDR).wrapping_add(1);
            bus.set_io_reg(DIV_ADDR, div);
        }

        let tac = bus.io_reg(TAC_ADDR);
        if tac & 0x04 == 0 {
            return;
        }

        let rate = match tac & 0x03 {
            0b00 => 256,
            0b01 => 4,
            0b10 => 16,
            _ => 64,
        };

        self.tima_counter += cycles;
        while self.tima_counter >= rate {
            self.tima_counter -= rate;
            let tima = bus.io_reg(TIMA_ADDR).wrapping_add(1);
            if tima == 0 {
                // Overflow reloads from TMA and raises the timer interrupt
                bus.set_io_reg(TIMA_ADDR, bus.io_reg(TMA_ADDR));
                bus.request_interrupt(TIMER_INTERRUPT_BIT);
            } else {
                bus.set_io_reg(TIMA_ADDR, tima);
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
