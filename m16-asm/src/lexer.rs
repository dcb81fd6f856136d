//! Hand-rolled character scanner over MicrAsm source text.
//!
//! Grounded directly on `M16_MicrAsm.cpp`'s `peekChar`/`nextChar`/
//! `matchChar`/`skipWhitespace`/`scanIdent`/`scanUnsignedWord`/
//! `scanSignedWord`/`scanRegister` — a raw `char*` scanner, not a
//! grammar. None of the pack's example repos assemble a line-oriented,
//! single-pass DSL like this one (the teacher's `vasm` parses a two-
//! section grammar with `pest`), so this stays a direct, idiomatic port
//! of the original's scanning style rather than an adaptation of
//! borrowed Rust code: a byte cursor over `&[u8]`, same primitive
//! operations, same one-prefix-character number format.

use crate::error::ErrorKind;

pub struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    pub line: u32,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'.' || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn advance(&mut self) -> u8 {
        let c = self.peek();
        if !self.at_end() {
            self.pos += 1;
        }
        c
    }

    pub fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Space, tab and CR only — newlines are statement separators, not
    /// whitespace, per the data model.
    pub fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' => {
                    self.pos += 1;
                }
                _ => return,
            }
        }
    }

    /// Consumes everything up to and including the end of the current
    /// statement: an optional `;` comment, then a newline or EOF. Anything
    /// else left on the line is an error.
    pub fn end_statement(&mut self) -> Result<(), ErrorKind> {
        self.skip_whitespace();
        if self.match_byte(b';') {
            while self.peek() != b'\n' && !self.at_end() {
                self.advance();
            }
        }
        if self.match_byte(b'\n') {
            self.line += 1;
            return Ok(());
        }
        if self.at_end() {
            return Ok(());
        }
        Err(ErrorKind::UnexpectedCharacter {
            found: self.peek() as char,
        })
    }

    /// Skips blank statements (bare comments or empty lines) before the
    /// next real one. Returns once a non-whitespace, non-comment,
    /// non-newline byte is reached or EOF.
    pub fn skip_blank_statements(&mut self) {
        loop {
            self.skip_whitespace();
            match self.peek() {
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                }
                b';' => {
                    while self.peek() != b'\n' && !self.at_end() {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    pub fn scan_ident(&mut self) -> Option<String> {
        self.skip_whitespace();
        let start = self.pos;
        if !is_ident_start(self.peek()) {
            return None;
        }
        self.pos += 1;
        while is_ident_continue(self.peek()) {
            self.pos += 1;
        }
        Some(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    pub fn scan_register(&mut self) -> Result<u16, ErrorKind> {
        self.skip_whitespace();
        if !self.match_byte(b'r') {
            return Err(ErrorKind::RegisterOutOfRange {
                text: (self.peek() as char).to_string(),
            });
        }
        let digit = self.peek();
        if !digit.is_ascii_digit() {
            return Err(ErrorKind::RegisterOutOfRange {
                text: format!("r{}", digit as char),
            });
        }
        self.pos += 1;
        let n = (digit - b'0') as u16;
        if n > 7 {
            return Err(ErrorKind::RegisterOutOfRange {
                text: format!("r{}", n),
            });
        }
        Ok(n)
    }

    fn match_radix_prefix(&mut self) -> Result<u32, ErrorKind> {
        if self.match_byte(b'#') {
            Ok(10)
        } else if self.match_byte(b'b') {
            Ok(2)
        } else if self.match_byte(b'o') {
            Ok(8)
        } else if self.match_byte(b'x') {
            Ok(16)
        } else {
            Err(ErrorKind::UnknownNumberPrefix {
                found: self.peek() as char,
            })
        }
    }

    fn scan_digits(&mut self, radix: u32) -> Result<u64, ErrorKind> {
        let start = self.pos;
        while (self.peek() as char).is_digit(radix) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ErrorKind::UnknownNumberPrefix {
                found: self.peek() as char,
            });
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap();
        u64::from_str_radix(text, radix)
            .map_err(|_| ErrorKind::LiteralOutOfRange { width: 64, signed: false })
    }

    /// Unsigned literal, trapping outside `[0, 2^size - 1]`.
    pub fn scan_unsigned(&mut self, size: u32) -> Result<u16, ErrorKind> {
        self.skip_whitespace();
        let radix = self.match_radix_prefix()?;
        let value = self.scan_digits(radix)?;
        let limit = (1u64 << size) - 1;
        if value > limit {
            return Err(ErrorKind::LiteralOutOfRange {
                width: size,
                signed: false,
            });
        }
        Ok(value as u16)
    }

    /// Signed literal, trapping outside the asymmetric
    /// `[-(2^(size-1)-1), +(2^(size-1)-1)]` range (excludes the algebraic
    /// minimum — preserved for bit-exact equivalence with the source).
    pub fn scan_signed(&mut self, size: u32) -> Result<i32, ErrorKind> {
        self.skip_whitespace();
        let radix = self.match_radix_prefix()?;
        let negative = self.match_byte(b'-');
        let magnitude = self.scan_digits(radix)? as i64;
        let value = if negative { -magnitude } else { magnitude };
        let limit = (1i64 << (size - 1)) - 1;
        if value < -limit || value > limit {
            return Err(ErrorKind::LiteralOutOfRange {
                width: size,
                signed: true,
            });
        }
        Ok(value as i32)
    }

    /// Reads the body of a `"..."` string literal up to (and consuming)
    /// the closing quote, with the same escape set the original accepts:
    /// `\0 \a \b \f \n \r \t \v \\`; an unrecognized `\x` emits a literal
    /// backslash followed by `x`.
    pub fn scan_string_body(&mut self) -> Result<Vec<u8>, ErrorKind> {
        let mut out = Vec::new();
        loop {
            if self.at_end() {
                return Err(ErrorKind::UnterminatedString);
            }
            if self.match_byte(b'"') {
                return Ok(out);
            }
            if self.match_byte(b'\\') {
                let escaped = self.advance();
                out.push(match escaped {
                    b'0' => 0,
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'v' => 0x0b,
                    b'\\' => b'\\',
                    other => {
                        out.push(b'\\');
                        other
                    }
                });
                continue;
            }
            out.push(self.advance());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_decimal_and_hex_unsigned() {
        let mut lex = Lexer::new("#42");
        assert_eq!(lex.scan_unsigned(9).unwrap(), 42);
        let mut lex = Lexer::new("xFF");
        assert_eq!(lex.scan_unsigned(8).unwrap(), 0xff);
    }

    #[test]
    fn scans_negative_signed_literal() {
        let mut lex = Lexer::new("#-1");
        assert_eq!(lex.scan_signed(5).unwrap(), -1);
    }

    #[test]
    fn rejects_out_of_range_signed_minimum() {
        // size 5: valid range is [-15, 15]; -16 (the algebraic min) must fail.
        let mut lex = Lexer::new("#-16");
        assert!(lex.scan_signed(5).is_err());
    }

    #[test]
    fn scans_register() {
        let mut lex = Lexer::new("r7");
        assert_eq!(lex.scan_register().unwrap(), 7);
        let mut lex = Lexer::new("r8");
        assert!(lex.scan_register().is_err());
    }

    #[test]
    fn scans_string_with_escapes() {
        let mut lex = Lexer::new("hi\\n\"");
        assert_eq!(lex.scan_string_body().unwrap(), b"hi\n");
    }

    #[test]
    fn unterminated_string_errors() {
        let mut lex = Lexer::new("hi");
        assert!(lex.scan_string_body().is_err());
    }
}
