use super::{Cpu, CpuResult};
use crate::memory_bus::MemoryBus;

// --- ALU implementations ---
impl Cpu {
    // ADD A, r / (HL) / d8
    alu_a_r!(op_add_a_b, add_a, b);
    alu_a_r!(op_add_a_c, add_a, c);
    alu_a_r!(op_add_a_d, add_a, d);
    alu_a_r!(op_add_a_e, add_a, e);
    alu_a_r!(op_add_a_h, add_a, h);
    alu_a_r!(op_add_a_l, add_a, l);
    alu_a_hlp!(op_add_a_hlp, add_a);
    alu_a_r!(op_add_a_a, add_a, a);
    alu_a_d8!(op_add_a_d8, add_a);

    // ADC A, r / (HL) / d8
    alu_a_r!(op_adc_a_b, add_a, b, carry);
    alu_a_r!(op_adc_a_c, add_a, c, carry);
    alu_a_r!(op_adc_a_d, add_a, d, carry);
    alu_a_r!(op_adc_a_e, add_a, e, carry);
    alu_a_r!(op_adc_a_h, add_a, h, carry);
    alu_a_r!(op_adc_a_l, add_a, l, carry);
    alu_a_hlp!(op_adc_a_hlp, add_a, carry);
    alu_a_r!(op_adc_a_a, add_a, a, carry);
    alu_a_d8!(op_adc_a_d8, add_a, carry);

    // SUB A, r / (HL) / d8
    alu_a_r!(op_sub_a_b, sub_a, b);
    alu_a_r!(op_sub_a_c, sub_a, c);
    alu_a_r!(op_sub_a_d, sub_a, d);
    alu_a_r!(op_sub_a_e, sub_a, e);
    alu_a_r!(op_sub_a_h, sub_a, h);
    alu_a_r!(op_sub_a_l, sub_a, l);
    alu_a_hlp!(op_sub_a_hlp, sub_a);
    alu_a_r!(op_sub_a_a, sub_a, a);
    alu_a_d8!(op_sub_a_d8, sub_a);

    // SBC A, r / (HL) / d8
    alu_a_r!(op_sbc_a_b, sub_a, b, carry);
    alu_a_r!(op_sbc_a_c, sub_a, c, carry);
    alu_a_r!(op_sbc_a_d, sub_a, d, carry);
    alu_a_r!(op_sbc_a_e, sub_a, e, carry);
    alu_a_r!(op_sbc_a_h, sub_a, h, carry);
    alu_a_r!(op_sbc_a_l, sub_a, l, carry);
    alu_a_hlp!(op_sbc_a_hlp, sub_a, carry);
    alu_a_r!(op_sbc_a_a, sub_a, a, carry);
    alu_a_d8!(op_sbc_a_d8, sub_a, carry);

    // AND A, r / (HL) / d8
    alu_a_r!(op_and_a_b, and_a, b);
    alu_a_r!(op_and_a_c, and_a, c);
    alu_a_r!(op_and_a_d, and_a, d);
    alu_a_r!(op_and_a_e, and_a, e);
    alu_a_r!(op_and_a_h, and_a, h);
    alu_a_r!(op_and_a_l, and_a, l);
    alu_a_hlp!(op_and_a_hlp, and_a);
    alu_a_r!(op_and_a_a, and_a, a);
    alu_a_d8!(op_and_a_d8, and_a);

    // XOR A, r / (HL) / d8
    alu_a_r!(op_xor_a_b, xor_a, b);
    alu_a_r!(op_xor_a_c, xor_a, c);
    alu_a_r!(op_xor_a_d, xor_a, d);
    alu_a_r!(op_xor_a_e, xor_a, e);
    alu_a_r!(op_xor_a_h, xor_a, h);
    alu_a_r!(op_xor_a_l, xor_a, l);
    alu_a_hlp!(op_xor_a_hlp, xor_a);
    alu_a_r!(op_xor_a_a, xor_a, a);
    alu_a_d8!(op_xor_a_d8, xor_a);

    // OR A, r / (HL) / d8
    alu_a_r!(op_or_a_b, or_a, b);
    alu_a_r!(op_or_a_c, or_a, c);
    alu_a_r!(op_or_a_d, or_a, d);
    alu_a_r!(op_or_a_e, or_a, e);
    alu_a_r!(op_or_a_h, or_a, h);
    alu_a_r!(op_or_a_l, or_a, l);
    alu_a_hlp!(op_or_a_hlp, or_a);
    alu_a_r!(op_or_a_a, or_a, a);
    alu_a_d8!(op_or_a_d8, or_a);

    // CP A, r / (HL) / d8
    alu_a_r!(op_cp_a_b, cp_a, b);
    alu_a_r!(op_cp_a_c, cp_a, c);
    alu_a_r!(op_cp_a_d, cp_a, d);
    alu_a_r!(op_cp_a_e, cp_a, e);
    alu_a_r!(op_cp_a_h, cp_a, h);
    alu_a_r!(op_cp_a_l, cp_a, l);
    alu_a_hlp!(op_cp_a_hlp, cp_a);
    alu_a_r!(op_cp_a_a, cp_a, a);
    alu_a_d8!(op_cp_a_d8, cp_a);

    // INC r / INC (HL)
    unary_r!(op_inc_b, inc_u8, b);
    unary_r!(op_inc_c, inc_u8, c);
    unary_r!(op_inc_d, inc_u8, d);
    unary_r!(op_inc_e, inc_u8, e);
    unary_r!(op_inc_h, inc_u8, h);
    unary_r!(op_inc_l, inc_u8, l);
    unary_r!(op_inc_a, inc_u8, a);
    pub fn op_inc_hlp(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        let addr = self.get_hl();
        let result = self.inc_u8(bus.read_byte(addr));
        bus.write_byte(addr, result);
        Ok(0)
    }

    // DEC r / DEC (HL)
    unary_r!(op_dec_b, dec_u8, b);
    unary_r!(op_dec_c, dec_u8, c);
    unary_r!(op_dec_d, dec_u8, d);
    unary_r!(op_dec_e, dec_u8, e);
    unary_r!(op_dec_h, dec_u8, h);
    unary_r!(op_dec_l, dec_u8, l);
    unary_r!(op_dec_a, dec_u8, a);
    pub fn op_dec_hlp(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        let addr = self.get_hl();
        let result = self.dec_u8(bus.read_byte(addr));
        bus.write_byte(addr, result);
        Ok(0)
    }

    // ADD HL, rr
    pub fn op_add_hl_bc(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.add_hl(self.get_bc());
        Ok(0)
    }
    pub fn op_add_hl_de(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.add_hl(self.get_de());
        Ok(0)
    }
    pub fn op_add_hl_hl(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.add_hl(self.get_hl());
        Ok(0)
    }
    pub fn op_add_hl_sp(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.add_hl(self.sp);
        Ok(0)
    }

    // ADD SP, r8
    pub fn op_add_sp_r8(&mut self, bus: &mut MemoryBus) -> CpuResult<u32> {
        let offset = self.read_r8(bus);
        self.sp = self.sp_plus_offset(offset);
        Ok(0)
    }

    // INC rr / DEC rr (no flags)
    pub fn op_inc_bc(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.set_bc(self.get_bc().wrapping_add(1));
        Ok(0)
    }
    pub fn op_inc_de(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.set_de(self.get_de().wrapping_add(1));
        Ok(0)
    }
    pub fn op_inc_hl(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.set_hl(self.get_hl().wrapping_add(1));
        Ok(0)
    }
    pub fn op_inc_sp(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.sp = self.sp.wrapping_add(1);
        Ok(0)
    }
    pub fn op_dec_bc(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.set_bc(self.get_bc().wrapping_sub(1));
        Ok(0)
    }
    pub fn op_dec_de(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.set_de(self.get_de().wrapping_sub(1));
        Ok(0)
    }
    pub fn op_dec_hl(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.set_hl(self.get_hl().wrapping_sub(1));
        Ok(0)
    }
    pub fn op_dec_sp(&mut self, _bus: &mut MemoryBus) -> CpuResult<u32> {
        self.sp = self.sp.wrapping_sub(1);
        Ok(0)
    }
}
