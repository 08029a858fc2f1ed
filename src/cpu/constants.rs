// Flag positions (bit index in F; the low nibble of F is always zero)
pub const FLAG_Z_POS: u8 = 7; // Zero
pub const FLAG_N_POS: u8 = 6; // Subtract
pub const FLAG_H_POS: u8 = 5; // Half carry
pub const FLAG_C_POS: u8 = 4; // Carry

// Flag masks
pub const FLAG_Z: u8 = 1 << FLAG_Z_POS;
pub const FLAG_N: u8 = 1 << FLAG_N_POS;
pub const FLAG_H: u8 = 1 << FLAG_H_POS;
pub const FLAG_C: u8 = 1 << FLAG_C_POS;

// Interrupt handler vectors, indexed by IF/IE bit position
pub const VBLANK_VECTOR: u16 = 0x0040;
pub const LCD_STAT_VECTOR: u16 = 0x0048;
pub const TIMER_VECTOR: u16 = 0x0050;
pub const SERIAL_VECTOR: u16 = 0x0058;
pub const JOYPAD_VECTOR: u16 = 0x0060;

/// M-cycles consumed by an interrupt dispatch (2 idle + push + jump).
pub const INTERRUPT_DISPATCH_CYCLES: u32 = 5;
