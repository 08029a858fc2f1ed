// Interpreter tests: tiny programs assembled into a valid ROM image,
// executed on the real CPU and bus.

use pocket::cartridge::Cartridge;
use pocket::cpu::{Cpu, CpuMode, FLAG_C, FLAG_H, FLAG_N, FLAG_Z};
use pocket::error::EmuError;
use pocket::mapper::Mapper;
use pocket::memory_bus::MemoryBus;

/// Builds a 32 KiB no-MBC ROM with `program` at the 0x0100 entry point and
/// a valid header checksum.
fn test_rom(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    let mut checksum: u8 = 0;
    for addr in 0x0134..=0x014C {
        checksum = checksum.wrapping_sub(rom[addr]).wrapping_sub(1);
    }
    rom[0x014D] = checksum;
    rom
}

/// CPU in the post-boot state plus a bus around the assembled ROM.
fn boot(program: &[u8]) -> (Cpu, MemoryBus) {
    let cartridge = Cartridge::new(test_rom(program)).unwrap();
    cartridge.verify_checksum().unwrap();
    let mapper = Mapper::for_cartridge(&cartridge).unwrap();
    let bus = MemoryBus::new(cartridge, mapper, None);
    (Cpu::new(true), bus)
}

/// Steps until the CPU halts, checking the F-low-nibble invariant along
/// the way. Panics if `limit` instructions pass without a HALT.
fn run_to_halt(cpu: &mut Cpu, bus: &mut MemoryBus, limit: usize) {
    for _ in 0..limit {
        cpu.step(bus).unwrap();
        assert_eq!(cpu.f() & 0x0F, 0, "F low nibble must stay zero");
        if cpu.mode() == CpuMode::Halted {
            return;
        }
    }
    panic!("program did not halt within {} instructions", limit);
}

#[test]
fn post_boot_register_state() {
    let (cpu, _bus) = boot(&[0x76]);
    let (a, f, b, c, d, e, h, l) = cpu.registers();
    assert_eq!(
        (a, f, b, c, d, e, h, l),
        (0x01, 0xB0, 0x00, 0x13, 0x00, 0xD8, 0x01, 0x4D)
    );
    assert_eq!(cpu.sp(), 0xFFFE);
    assert_eq!(cpu.pc(), 0x0100);
    assert!(!cpu.ime());
}

#[test]
fn add_a_a_overflow() {
    // 0x80 + 0x80 wraps to zero with carry out
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0x80, // LD A, 0x80
        0x87, // ADD A, A
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.get_flag(FLAG_Z));
    assert!(!cpu.get_flag(FLAG_N));
    assert!(cpu.get_flag(FLAG_C));
}

#[test]
fn add_a_a_half_carry() {
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0x88, // LD A, 0x88
        0x87, // ADD A, A
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.a(), 0x10);
    assert!(!cpu.get_flag(FLAG_Z));
    assert!(cpu.get_flag(FLAG_H));
    assert!(cpu.get_flag(FLAG_C));
}

#[test]
fn inc_indirect_hl_wraps_to_zero() {
    let (mut cpu, mut bus) = boot(&[
        0x21, 0x00, 0xC0, // LD HL, 0xC000
        0x36, 0xFF, // LD (HL), 0xFF
        0x34, // INC (HL)
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(bus.read_byte(0xC000), 0x00);
    assert!(cpu.get_flag(FLAG_Z));
    assert!(cpu.get_flag(FLAG_H));
    assert!(!cpu.get_flag(FLAG_N));
}

#[test]
fn daa_after_bcd_addition() {
    // 0x99 + 0x99 = 0x32 with C and H; DAA corrects to 0x98
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0x99, // LD A, 0x99
        0xC6, 0x99, // ADD A, 0x99
        0x27, // DAA
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.a(), 0x98);
    assert!(cpu.get_flag(FLAG_C));
    assert!(!cpu.get_flag(FLAG_Z));
}

#[test]
fn daa_after_bcd_subtraction() {
    // 0x15 - 0x27 = 0xEE (N, H, C); DAA corrects to 0x88
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0x15, // LD A, 0x15
        0xD6, 0x27, // SUB A, 0x27
        0x27, // DAA
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.a(), 0x88);
    assert!(cpu.get_flag(FLAG_N));
    assert!(!cpu.get_flag(FLAG_H));
    assert!(cpu.get_flag(FLAG_C));
    assert!(!cpu.get_flag(FLAG_Z));
}

#[test]
fn push_pop_roundtrip_preserves_sp() {
    let (mut cpu, mut bus) = boot(&[
        0x01, 0x34, 0x12, // LD BC, 0x1234
        0xC5, // PUSH BC
        0xD1, // POP DE
        0x76, // HALT
    ]);
    let sp_before = cpu.sp();

    assert_eq!(cpu.step(&mut bus).unwrap(), 3); // LD BC, d16
    assert_eq!(cpu.step(&mut bus).unwrap(), 4); // PUSH
    assert_eq!(cpu.step(&mut bus).unwrap(), 3); // POP
    assert_eq!(cpu.get_de(), 0x1234);
    assert_eq!(cpu.sp(), sp_before);
}

#[test]
fn pop_af_masks_the_flag_low_nibble() {
    let (mut cpu, mut bus) = boot(&[
        0x01, 0xFF, 0x12, // LD BC, 0x12FF
        0xC5, // PUSH BC
        0xF1, // POP AF
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.a(), 0x12);
    assert_eq!(cpu.f(), 0xF0);
}

#[test]
fn ld_pair_settles_both_registers() {
    let (mut cpu, mut bus) = boot(&[
        0x06, 0x12, // LD B, 0x12
        0x0E, 0x34, // LD C, 0x34
        0x41, // LD B, C
        0x48, // LD C, B
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.get_bc(), 0x3434);
}

#[test]
fn ei_takes_effect_one_instruction_late() {
    let (mut cpu, mut bus) = boot(&[
        0xFB, // EI
        0x00, // NOP (first)
        0x00, // NOP (second, never reached)
    ]);
    bus.write_byte(0xFFFF, 0x01); // IE: VBlank
    bus.write_byte(0xFF0F, 0x01); // IF: VBlank already pending

    // Tick 1: EI executes, enable still pending
    assert_eq!(cpu.service_interrupts(&mut bus), 0);
    cpu.step(&mut bus).unwrap();
    assert!(!cpu.ime());

    // Tick 2: the first NOP retires; IME commits at its fetch
    assert_eq!(cpu.service_interrupts(&mut bus), 0);
    cpu.step(&mut bus).unwrap();
    assert!(cpu.ime());
    assert_eq!(cpu.pc(), 0x0102);

    // Tick 3: dispatch happens before the second NOP is fetched
    assert_eq!(cpu.service_interrupts(&mut bus), 5);
    assert_eq!(cpu.pc(), 0x0040);
    assert!(!cpu.ime());
    assert_eq!(bus.interrupt_flags() & 0x1F, 0);
    // The stacked return address is the second NOP
    assert_eq!(bus.read_byte(0xFFFC), 0x02);
    assert_eq!(bus.read_byte(0xFFFD), 0x01);
}

#[test]
fn di_cancels_a_pending_enable() {
    let (mut cpu, mut bus) = boot(&[
        0xFB, // EI
        0xF3, // DI
        0x00, // NOP
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert!(!cpu.ime());
}

#[test]
fn halt_wakes_without_dispatch_when_ime_clear() {
    let (mut cpu, mut bus) = boot(&[
        0x76, // HALT
        0x00, // NOP
        0x76, // HALT
    ]);
    bus.write_byte(0xFFFF, 0x01); // IE: VBlank

    cpu.service_interrupts(&mut bus);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.mode(), CpuMode::Halted);

    // Nothing pending: stays halted, one M-cycle per tick
    cpu.service_interrupts(&mut bus);
    assert_eq!(cpu.step(&mut bus).unwrap(), 1);
    assert_eq!(cpu.mode(), CpuMode::Halted);

    // Raise IF from outside: the next check wakes the CPU but must not
    // dispatch (IME is clear)
    bus.request_interrupt(0);
    assert_eq!(cpu.service_interrupts(&mut bus), 0);
    assert_eq!(cpu.mode(), CpuMode::Running);
    assert_eq!(bus.interrupt_flags() & 0x01, 0x01); // still pending
    cpu.step(&mut bus).unwrap(); // the NOP after HALT
    assert_eq!(cpu.pc(), 0x0102);
}

#[test]
fn halt_then_dispatch_with_ime_set() {
    let (mut cpu, mut bus) = boot(&[
        0xFB, // EI
        0x76, // HALT
    ]);
    bus.write_byte(0xFFFF, 0x01);

    cpu.service_interrupts(&mut bus);
    cpu.step(&mut bus).unwrap(); // EI
    cpu.service_interrupts(&mut bus);
    cpu.step(&mut bus).unwrap(); // HALT (commits IME at its fetch)
    assert!(cpu.ime());
    assert_eq!(cpu.mode(), CpuMode::Halted);

    bus.request_interrupt(0);
    assert_eq!(cpu.service_interrupts(&mut bus), 5);
    assert_eq!(cpu.mode(), CpuMode::Running);
    assert_eq!(cpu.pc(), 0x0040);
    assert!(!cpu.ime());
    assert_eq!(bus.interrupt_flags() & 0x1F, 0);
    // Stacked PC is the address after HALT
    assert_eq!(bus.read_byte(0xFFFC), 0x02);
    assert_eq!(bus.read_byte(0xFFFD), 0x01);
}

#[test]
fn taken_and_untaken_jr_costs() {
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0x02, // LD A, 2
        0x3D, // 0x102: DEC A
        0x20, 0xFD, // 0x103: JR NZ, -3
        0x76, // 0x105: HALT
    ]);
    cpu.step(&mut bus).unwrap(); // LD A
    assert_eq!(cpu.step(&mut bus).unwrap(), 1); // DEC -> A=1, NZ
    assert_eq!(cpu.step(&mut bus).unwrap(), 3); // JR taken
    assert_eq!(cpu.pc(), 0x0102);
    assert_eq!(cpu.step(&mut bus).unwrap(), 1); // DEC -> A=0, Z
    assert_eq!(cpu.step(&mut bus).unwrap(), 2); // JR not taken
    assert_eq!(cpu.pc(), 0x0105);
}

#[test]
fn jr_minus_two_spins_in_place() {
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0x01, // LD A, 1
        0xB7, // OR A, A -> clears Z
        0x20, 0xFE, // 0x103: JR NZ, -2 (jumps to itself)
    ]);
    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();

    let mut iterations = 0;
    for _ in 0..10 {
        assert_eq!(cpu.pc(), 0x0103);
        assert_eq!(cpu.step(&mut bus).unwrap(), 3);
        iterations += 1;
    }
    assert_eq!(iterations, 10);
}

#[test]
fn call_and_ret_cycle_costs() {
    // The subroutine body (a lone RET) is planted in WRAM
    let (mut cpu, mut bus) = boot(&[
        0x21, 0x00, 0xC0, // LD HL, 0xC000
        0x36, 0xC9, // LD (HL), 0xC9 (RET)
        0xCD, 0x00, 0xC0, // CALL 0xC000
        0x76, // HALT
    ]);
    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.step(&mut bus).unwrap(), 6); // CALL
    assert_eq!(cpu.pc(), 0xC000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 4); // RET
    assert_eq!(cpu.pc(), 0x0108);
}

#[test]
fn conditional_ret_costs() {
    let (mut cpu, mut bus) = boot(&[
        0x37, // SCF (C = 1)
        0xD0, // RET NC: not taken
        0x76, // HALT
    ]);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.step(&mut bus).unwrap(), 2); // untaken conditional RET
    assert_eq!(cpu.pc(), 0x0102);
}

#[test]
fn rst_jumps_to_its_vector() {
    let (mut cpu, mut bus) = boot(&[
        0xEF, // RST 28H
    ]);
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.pc(), 0x0028);
    assert_eq!(bus.read_byte(0xFFFC), 0x01);
    assert_eq!(bus.read_byte(0xFFFD), 0x01);
}

#[test]
fn cb_prefixed_costs_and_semantics() {
    let (mut cpu, mut bus) = boot(&[
        0x06, 0x85, // LD B, 0x85
        0xCB, 0x00, // RLC B -> 0x0B, C=1
        0x21, 0x00, 0xC0, // LD HL, 0xC000
        0x36, 0x01, // LD (HL), 0x01
        0xCB, 0x46, // BIT 0, (HL)
        0xCB, 0xC6, // SET 0, (HL) -- already set, stays 0x01
        0xCB, 0xFE, // SET 7, (HL) -> 0x81
        0xCB, 0x86, // RES 0, (HL) -> 0x80
        0x76, // HALT
    ]);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.step(&mut bus).unwrap(), 2); // RLC B
    let (_, _, b, ..) = cpu.registers();
    assert_eq!(b, 0x0B);
    assert!(cpu.get_flag(FLAG_C));

    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.step(&mut bus).unwrap(), 3); // BIT n, (HL)
    assert!(!cpu.get_flag(FLAG_Z)); // bit 0 is set
    assert!(cpu.get_flag(FLAG_H));

    assert_eq!(cpu.step(&mut bus).unwrap(), 4); // SET n, (HL)
    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.read_byte(0xC000), 0x80);
}

#[test]
fn swap_and_srl() {
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0xF0, // LD A, 0xF0
        0xCB, 0x37, // SWAP A -> 0x0F
        0xCB, 0x3F, // SRL A -> 0x07, C=1
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.a(), 0x07);
    assert!(cpu.get_flag(FLAG_C));
}

#[test]
fn add_sp_and_ld_hl_sp_flags() {
    let (mut cpu, mut bus) = boot(&[
        0x31, 0xFF, 0xCF, // LD SP, 0xCFFF
        0xF8, 0x01, // LD HL, SP+1 -> 0xD000, H and C from low-byte adds
        0xE8, 0xFF, // ADD SP, -1 -> 0xCFFE
        0x76, // HALT
    ]);
    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.get_hl(), 0xD000);
    assert!(cpu.get_flag(FLAG_H));
    assert!(cpu.get_flag(FLAG_C));
    assert!(!cpu.get_flag(FLAG_Z));

    // The offset byte participates unsigned in the flag adds: 0xF + 0xF
    // and 0xFF + 0xFF both carry
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.sp(), 0xCFFE);
    assert!(cpu.get_flag(FLAG_H));
    assert!(cpu.get_flag(FLAG_C));
}

#[test]
fn high_ram_loads() {
    let (mut cpu, mut bus) = boot(&[
        0x3E, 0x55, // LD A, 0x55
        0xE0, 0x80, // LDH (0x80), A
        0x3E, 0x00, // LD A, 0
        0xF0, 0x80, // LDH A, (0x80)
        0x76, // HALT
    ]);
    run_to_halt(&mut cpu, &mut bus, 10);
    assert_eq!(cpu.a(), 0x55);
    assert_eq!(bus.read_byte(0xFF80), 0x55);
}

#[test]
fn invalid_opcode_reports_decode_context() {
    let (mut cpu, mut bus) = boot(&[0xD3]);
    assert_eq!(
        cpu.step(&mut bus),
        Err(EmuError::InvalidOpcode {
            pc: 0x0100,
            opcode: 0xD3
        })
    );
}

#[test]
fn reti_enables_immediately() {
    let (mut cpu, mut bus) = boot(&[
        0x21, 0x00, 0xC0, // LD HL, 0xC000
        0x36, 0xD9, // LD (HL), 0xD9 (RETI)
        0xCD, 0x00, 0xC0, // CALL 0xC000
        0x76, // HALT
    ]);
    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap(); // CALL
    assert_eq!(cpu.step(&mut bus).unwrap(), 4); // RETI
    assert!(cpu.ime());
    assert_eq!(cpu.pc(), 0x0108);
}
