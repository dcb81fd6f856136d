//! Assembler diagnostics.
//!
//! Grounded on `vasm/src/error.rs`'s `ParseError`/`AssembleError`/`Error`
//! trio (each a tagged struct rendered by one `Display` impl, never
//! `printf`-style variadic formatting — see SPEC_FULL.md's re-architecture
//! notes) and on `M16_MicrAsm.h`'s `micrasm_error`, whose every thrown
//! message is `"line %d: ..."`. One `AssemblerError` enum folds both: a
//! `kind` carries the structured detail, `line` carries the context.

use m16::LabelError;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownMnemonic(pub String);

impl fmt::Display for UnknownMnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mnemonic `{}`", self.0)
    }
}

impl std::error::Error for UnknownMnemonic {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownNumberPrefix { found: char },
    LiteralOutOfRange { width: u32, signed: bool },
    UnknownMnemonic { text: String },
    UnexpectedCharacter { found: char },
    DuplicateLabel { name: String },
    UnterminatedString,
    UndefinedLabel { name: String },
    UnreachableLabel { name: String },
    RegisterOutOfRange { text: String },
    MissingComma,
    MissingOperand,
    ReservedSpaceOverflow { requested: u16 },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownNumberPrefix { found } => {
                write!(f, "unknown number specifier '{}'", found)
            }
            ErrorKind::LiteralOutOfRange { width, signed } => {
                if *signed {
                    write!(f, "number exceeds {}-bit signed range", width)
                } else {
                    write!(f, "number exceeds {}-bit unsigned range", width)
                }
            }
            ErrorKind::UnknownMnemonic { text } => write!(f, "unknown mnemonic '{}'", text),
            ErrorKind::UnexpectedCharacter { found } => {
                write!(f, "unexpected character '{}'", found)
            }
            ErrorKind::DuplicateLabel { name } => write!(f, "label '{}' already exists", name),
            ErrorKind::UnterminatedString => write!(f, "unterminated string in '.strz'"),
            ErrorKind::UndefinedLabel { name } => {
                write!(f, "there is no label with name '{}'", name)
            }
            ErrorKind::UnreachableLabel { name } => {
                write!(f, "label '{}' is not reachable", name)
            }
            ErrorKind::RegisterOutOfRange { text } => {
                write!(f, "'{}' is not a valid register (only r0 through r7 exist)", text)
            }
            ErrorKind::MissingComma => write!(f, "expected ',' between operands"),
            ErrorKind::MissingOperand => write!(f, "missing operand"),
            ErrorKind::ReservedSpaceOverflow { requested } => write!(
                f,
                "space needed to be reserved ({} bytes) is too large",
                requested
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblerError {
    pub line: u32,
    pub kind: ErrorKind,
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for AssemblerError {}

impl AssemblerError {
    pub fn new(line: u32, kind: ErrorKind) -> AssemblerError {
        AssemblerError { line, kind }
    }

    pub(crate) fn from_label(line: u32, err: LabelError) -> AssemblerError {
        let kind = match err {
            LabelError::Redefined { name } => ErrorKind::DuplicateLabel { name },
            LabelError::Unresolved { name } => ErrorKind::UndefinedLabel { name },
            LabelError::Unreachable { name } => ErrorKind::UnreachableLabel { name },
        };
        AssemblerError { line, kind }
    }
}
