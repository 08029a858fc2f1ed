// --- LD Macros ---
macro_rules! ld_r_r {
    ($name:ident, $r1:ident, $r2:ident) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$r1 = self.$r2;
            Ok(0)
        }
    };
}
macro_rules! ld_r_d8 {
    ($name:ident, $r1:ident) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$r1 = self.read_d8(bus);
            Ok(0)
        }
    };
}
macro_rules! ld_r_hlp {
    ($name:ident, $r1:ident) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$r1 = bus.read_byte(self.get_hl());
            Ok(0)
        }
    };
}
macro_rules! ld_hlp_r {
    ($name:ident, $r2:ident) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            bus.write_byte(self.get_hl(), self.$r2);
            Ok(0)
        }
    };
}

// --- ALU Macros ---
macro_rules! alu_a_r {
    ($name:ident, $op:ident, $r2:ident) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$op(self.$r2, false);
            Ok(0)
        }
    };
    ($name:ident, $op:ident, $r2:ident, carry) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$op(self.$r2, true);
            Ok(0)
        }
    };
}
macro_rules! alu_a_hlp {
    ($name:ident, $op:ident) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let value = bus.read_byte(self.get_hl());
            self.$op(value, false);
            Ok(0)
        }
    };
    ($name:ident, $op:ident, carry) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let value = bus.read_byte(self.get_hl());
            self.$op(value, true);
            Ok(0)
        }
    };
}
macro_rules! alu_a_d8 {
    ($name:ident, $op:ident) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let value = self.read_d8(bus);
            self.$op(value, false);
            Ok(0)
        }
    };
    ($name:ident, $op:ident, carry) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let value = self.read_d8(bus);
            self.$op(value, true);
            Ok(0)
        }
    };
}
macro_rules! unary_r {
    ($name:ident, $op:ident, $reg:ident) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$reg = self.$op(self.$reg);
            Ok(0)
        }
    };
}

// --- CB-prefix Macros ---
macro_rules! cb_reg_op {
    ($name:ident, $op:ident, $reg:ident) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$reg = self.$op(self.$reg);
            Ok(0)
        }
    };
    ($name:ident, bit, $bit:expr, $reg:ident) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.op_bit($bit, self.$reg);
            Ok(0)
        }
    };
    ($name:ident, res, $bit:expr, $reg:ident) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$reg = crate::bits::clear_bit(self.$reg, $bit);
            Ok(0)
        }
    };
    ($name:ident, set, $bit:expr, $reg:ident) => {
        #[inline(always)]
        pub fn $name(&mut self, _bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            self.$reg = crate::bits::set_bit(self.$reg, $bit);
            Ok(0)
        }
    };
}
macro_rules! cb_hlp_op {
    ($name:ident, $op:ident) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let addr = self.get_hl();
            let value = bus.read_byte(addr);
            let result = self.$op(value);
            bus.write_byte(addr, result);
            Ok(0)
        }
    };
    ($name:ident, bit, $bit:expr) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let value = bus.read_byte(self.get_hl());
            self.op_bit($bit, value);
            Ok(0)
        }
    };
    ($name:ident, res, $bit:expr) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let addr = self.get_hl();
            let value = bus.read_byte(addr);
            bus.write_byte(addr, crate::bits::clear_bit(value, $bit));
            Ok(0)
        }
    };
    ($name:ident, set, $bit:expr) => {
        pub fn $name(&mut self, bus: &mut crate::memory_bus::MemoryBus) -> super::CpuResult<u32> {
            let addr = self.get_hl();
            let value = bus.read_byte(addr);
            bus.write_byte(addr, crate::bits::set_bit(value, $bit));
            Ok(0)
        }
    };
}
