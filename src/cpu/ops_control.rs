use super::instruction::CB_INSTRUCTIONS;
use super::{Cpu, CpuMode, CpuResult, constants::*};
use crate::memory_bus::MemoryBus;
use crate::memory_map::DIV_ADDR;

// --- Control flow and misc ---
impl Cpu {
    pub fn op_nop(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        Ok(0)
    }

    // JP a16 / JP HL / JP cc, a16 (+1 when taken)
    fn conditional_jp_a16(&mut self, condition: bool, bus: &MemoryBus) -> CpuResult<u32> {
        let addr = self.read_d16(bus);
        if condition {
            self.pc = addr;
            Ok(1)
        } else {
            Ok(0)
        }
    }
    pub fn op_jp_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.pc = self.read_d16(bus);
        Ok(0)
    }
    pub fn op_jp_hl(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.pc = self.get_hl();
        Ok(0)
    }
    pub fn op_jp_nz_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jp_a16(!self.get_flag(FLAG_Z), bus)
    }
    pub fn op_jp_z_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jp_a16(self.get_flag(FLAG_Z), bus)
    }
    pub fn op_jp_nc_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jp_a16(!self.get_flag(FLAG_C), bus)
    }
    pub fn op_jp_c_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jp_a16(self.get_flag(FLAG_C), bus)
    }

    // JR r8 / JR cc, r8 (+1 when taken); the offset is relative to the
    // address after the offset byte, which is where PC already points.
    fn conditional_jr(&mut self, condition: bool, bus: &MemoryBus) -> CpuResult<u32> {
        let offset = self.read_r8(bus);
        if condition {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            Ok(1)
        } else {
            Ok(0)
        }
    }
    pub fn op_jr_r8(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        let offset = self.read_r8(bus);
        self.pc = self.pc.wrapping_add(offset as i16 as u16);
        Ok(0)
    }
    pub fn op_jr_nz_r8(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jr(!self.get_flag(FLAG_Z), bus)
    }
    pub fn op_jr_z_r8(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jr(self.get_flag(FLAG_Z), bus)
    }
    pub fn op_jr_nc_r8(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jr(!self.get_flag(FLAG_C), bus)
    }
    pub fn op_jr_c_r8(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_jr(self.get_flag(FLAG_C), bus)
    }

    // CALL a16 / CALL cc, a16 (+3 when taken: decrement + two pushes)
    fn conditional_call_a16(&mut self, condition: bool, bus: &mut MemoryBus) -> CpuResult<u32> {
        let addr = self.read_d16(bus);
        if condition {
            self.push_word(self.pc, bus);
            self.pc = addr;
            Ok(3)
        } else {
            Ok(0)
        }
    }
    pub fn op_call_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        let addr = self.read_d16(bus);
        self.push_word(self.pc, bus);
        self.pc = addr;
        Ok(0)
    }
    pub fn op_call_nz_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_call_a16(!self.get_flag(FLAG_Z), bus)
    }
    pub fn op_call_z_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_call_a16(self.get_flag(FLAG_Z), bus)
    }
    pub fn op_call_nc_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_call_a16(!self.get_flag(FLAG_C), bus)
    }
    pub fn op_call_c_a16(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_call_a16(self.get_flag(FLAG_C), bus)
    }

    // RET / RET cc (+3 when taken) / RETI
    fn conditional_ret(&mut self, condition: bool, bus: &mut MemoryBus) -> CpuResult<u32> {
        if condition {
            self.pc = self.pop_word(bus);
            Ok(3)
        } else {
            Ok(0)
        }
    }
    pub fn op_ret(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.pc = self.pop_word(bus);
        Ok(0)
    }
    pub fn op_ret_nz(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_ret(!self.get_flag(FLAG_Z), bus)
    }
    pub fn op_ret_z(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_ret(self.get_flag(FLAG_Z), bus)
    }
    pub fn op_ret_nc(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_ret(!self.get_flag(FLAG_C), bus)
    }
    pub fn op_ret_c(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.conditional_ret(self.get_flag(FLAG_C), bus)
    }
    pub fn op_reti(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        // Unlike EI the enable takes effect immediately
        self.pc = self.pop_word(bus);
        self.ime = true;
        self.ime_pending = false;
        Ok(0)
    }

    // RST n -> vector n * 8
    fn rst(&mut self, vector: u16, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.push_word(self.pc, bus);
        self.pc = vector;
        Ok(0)
    }
    pub fn op_rst_00h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0000, bus)
    }
    pub fn op_rst_08h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0008, bus)
    }
    pub fn op_rst_10h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0010, bus)
    }
    pub fn op_rst_18h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0018, bus)
    }
    pub fn op_rst_20h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0020, bus)
    }
    pub fn op_rst_28h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0028, bus)
    }
    pub fn op_rst_30h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0030, bus)
    }
    pub fn op_rst_38h(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.rst(0x0038, bus)
    }

    // Interrupt enable control
    pub fn op_di(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        // Immediate, and cancels a not-yet-committed EI
        self.ime = false;
        self.ime_pending = false;
        Ok(0)
    }
    pub fn op_ei(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        // Takes effect after the next instruction
        self.ime_pending = true;
        Ok(0)
    }

    // Execution modes
    pub fn op_halt(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.mode = CpuMode::Halted;
        Ok(0)
    }
    pub fn op_stop(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        self.mode = CpuMode::Stopped;
        bus.set_io_reg(DIV_ADDR, 0); // STOP resets the divider
        Ok(0)
    }

    // Carry flag control
    pub fn op_scf(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, true);
        Ok(0)
    }
    pub fn op_ccf(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        let carry = self.get_flag(FLAG_C);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, !carry);
        Ok(0)
    }

    // Accumulator misc
    pub fn op_cpl(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.a = !self.a;
        self.set_flag(FLAG_N | FLAG_H, true);
        Ok(0)
    }
    pub fn op_daa(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.daa();
        Ok(0)
    }

    // 0xCB prefix: the second opcode byte selects from the CB table; its
    // entry's cost covers the second fetch and any (HL) accesses.
    pub fn op_prefix_cb(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        let cb_opcode = bus.read_byte(self.instruction_pc.wrapping_add(1));
        let cb_instr = &CB_INSTRUCTIONS[cb_opcode as usize];
        log::trace!("{:#06X}: {}", self.instruction_pc, cb_instr.mnemonic);
        (cb_instr.execute)(self, bus)?;
        Ok(cb_instr.cycles as u32)
    }
}
