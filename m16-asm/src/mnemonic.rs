//! The fixed-string mnemonic table.
//!
//! `br` and its `n`/`z`/`p` condition suffixes are handled separately
//! (see `assembler.rs::op_branch`) since their text isn't drawn from a
//! finite literal set the same way the rest of the table is; pseudo-ops
//! (`.orig`, `.strz`, `.dat`, `.blk`) are dispatched on their leading `.`
//! before this table is consulted at all. Everything else here resolves
//! through one derived `FromStr` impl instead of the original's nested
//! first-letter `switch` (see SPEC_FULL.md's re-architecture notes).

use m16_mnemonic_derive::MnemonicFromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug, MnemonicFromStr)]
pub enum Mnemonic {
    Add,
    And,
    Mul,
    Not,
    Div,
    Mod,
    Ldr,
    Str,
    Ldb,
    Stb,
    Lea,
    Jsr,
    Jmp,
    Ret,
    Rti,
    Nop,
    Hlt,
    Trap,
    Lshf,
    Rshf,
    Arshf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn recognizes_every_mnemonic() {
        assert_eq!(Mnemonic::from_str("add").unwrap(), Mnemonic::Add);
        assert_eq!(Mnemonic::from_str("arshf").unwrap(), Mnemonic::Arshf);
        assert_eq!(Mnemonic::from_str("hlt").unwrap(), Mnemonic::Hlt);
    }

    #[test]
    fn rejects_unknown_text() {
        assert!(Mnemonic::from_str("addi").is_err());
        assert!(Mnemonic::from_str("br").is_err());
    }
}
