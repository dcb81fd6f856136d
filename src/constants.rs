//! Sizes and fixed addresses from the M16 data model.

/// The backing array's size in bytes, preserved at `0xFFFF` rather than the
/// rounder `0x10000`: `original_source/src/include/M16_Common.h` defines
/// `MAX_MEM_SIZE = (1 << 16) - 1`, one byte short of a full 64 KiB. An array
/// of this many bytes has valid indices `0..=0xFFFE`; address `0xFFFF` does
/// not exist (it is one past the end), and a *word* access at `0xFFFE`
/// would need both `0xFFFE` and the nonexistent `0xFFFF` — see
/// `memory.rs`'s bounds checks, which treat both as out of range rather
/// than indexing past the buffer.
pub const MAX_MEM_SIZE: usize = (1 << 16) - 1;

/// Size, in bytes, of the trap vector table occupying the start of memory.
pub const TRAP_VECTOR_TABLE_SIZE: usize = 0x200;

/// Number of entries in the register file: R0-R5 general purpose, R6 (SP),
/// R7 (LR), R8 (PC), R9 (PSR).
pub const REGISTER_COUNT: usize = 10;

/// PSR bit: 1 = user mode, 0 = supervisor mode.
pub const PSR_USER_BIT: u32 = 15;
/// PSR bits 10..8: current interrupt priority level (3 bits).
pub const PSR_PRIORITY_SHIFT: u32 = 8;
pub const PSR_PRIORITY_WIDTH: u32 = 3;
/// PSR condition code bits.
pub const PSR_N_BIT: u32 = 2;
pub const PSR_Z_BIT: u32 = 1;
pub const PSR_P_BIT: u32 = 0;

/// Trap vector dispatched by the debug hook to halt the simulator.
pub const TRAP_VECTOR_HALT: u8 = 0x25;
/// Trap vector dispatched by the debug hook to print R4 as a signed decimal.
pub const TRAP_VECTOR_PRINT_INT: u8 = 0x10;
