//! ISA definitions, the instruction-set simulator and the programmatic
//! emitter for the M16 toolkit. The textual assembler lives in the
//! sibling `m16-asm` crate; both front ends share [`label_table`] and
//! [`encode`] so they stay byte-for-byte compatible.

pub mod bits;
pub mod constants;
pub mod emitter;
pub mod encode;
pub mod label_table;
pub mod memory;
pub mod opcode;
pub mod register;
pub mod simulator;

pub use emitter::Emitter;
pub use label_table::{LabelError, LabelTable};
pub use memory::{Memory, SimulatorError};
pub use register::{RegisterFile, RegisterId};
pub use simulator::Simulator;
