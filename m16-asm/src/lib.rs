//! MicrAsm: the single-pass textual assembler for the M16 toolkit.
//!
//! Unlike `vasm`'s two-section, `pest`-driven grammar, MicrAsm's source
//! format is a flat stream of line-oriented statements with no sections
//! and no syntax tree to build — a hand-rolled [`lexer::Lexer`] scans it
//! directly into the same [`m16::encode`] words the programmatic
//! [`m16::Emitter`] produces, sharing one [`m16::LabelTable`] so the two
//! front ends can never drift apart on label resolution.

mod assembler;
mod error;
mod lexer;
mod mnemonic;

#[cfg(test)]
mod test;

pub use assembler::assemble;
pub use error::{AssemblerError, ErrorKind, UnknownMnemonic};
