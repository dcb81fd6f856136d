//! The programmatic assembler: one method per ISA opcode, producing the
//! exact same byte image the textual assembler would for equivalent
//! source.
//!
//! Grounded on `M16_Emitter.{h,cpp}`'s `ir` class: a byte buffer sized
//! `MAX_MEM_SIZE`, a `PC` cursor, and the label table. The buffer here is
//! a boxed fixed-size array rather than a `new`/`delete` raw pointer (see
//! SPEC_FULL.md's re-architecture notes); everything else — method names,
//! the `label`/`emitLabel`/`completeCode` shape, the three `MOV` macros —
//! follows the original directly.

use crate::encode;
use crate::label_table::{LabelError, LabelTable};
use crate::register::RegisterId;

pub struct Emitter {
    code: Box<[u8]>,
    pc: u16,
    labels: LabelTable,
}

impl Default for Emitter {
    fn default() -> Emitter {
        Emitter {
            code: vec![0u8; crate::constants::MAX_MEM_SIZE].into_boxed_slice(),
            pc: 0,
            labels: LabelTable::new(),
        }
    }
}

impl Emitter {
    pub fn new() -> Emitter {
        Emitter::default()
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn start_from(&mut self, address: u16) {
        self.pc = address;
    }

    /// Writes `value` at the current PC and advances it by 2, silently
    /// dropping bytes that fall on or past `MAX_MEM_SIZE` rather than
    /// indexing past the buffer (only `pc == MAX_MEM_SIZE - 1` can do this:
    /// its low byte would land on the nonexistent one-past-end address).
    pub fn emit_word(&mut self, value: u16) {
        let a = self.pc as usize;
        if let Some(slot) = self.code.get_mut(a) {
            *slot = (value >> 8) as u8;
        }
        if let Some(slot) = self.code.get_mut(a + 1) {
            *slot = (value & 0xff) as u8;
        }
        self.pc = self.pc.wrapping_add(2);
    }

    /// Writes `value` at the current PC and advances it by 1, silently
    /// doing nothing if the PC is on or past `MAX_MEM_SIZE`; see
    /// `emit_word`.
    pub fn emit_byte(&mut self, value: u8) {
        if let Some(slot) = self.code.get_mut(self.pc as usize) {
            *slot = value;
        }
        self.pc = self.pc.wrapping_add(1);
    }

    pub fn emit_string(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.emit_byte(b);
        }
    }

    /// If `name` is already declared, returns its signed `(PC+2)>>1`-relative
    /// offset from the current PC, range-checked against `offset_size` bits;
    /// otherwise records a patch site here and returns `0`.
    pub fn label(&mut self, name: &str, offset_size: u32) -> Result<u16, LabelError> {
        self.labels.resolve_or_patch(name, self.pc, offset_size)
    }

    /// Declares `name` at the current PC. Fails if already declared.
    pub fn emit_label(&mut self, name: &str) -> Result<(), LabelError> {
        self.labels.declare(name, self.pc)
    }

    pub fn emit_br(&mut self, n: bool, z: bool, p: bool, offset9: u16) {
        self.emit_word(encode::br(n, z, p, offset9));
    }

    pub fn emit_br_label(&mut self, n: bool, z: bool, p: bool, name: &str) -> Result<(), LabelError> {
        let offset = self.label(name, 9)?;
        self.emit_br(n, z, p, offset);
        Ok(())
    }

    pub fn emit_add_reg(&mut self, dest: RegisterId, src1: RegisterId, src2: RegisterId) {
        self.emit_word(encode::add_reg(
            dest.index() as u16,
            src1.index() as u16,
            src2.index() as u16,
        ));
    }

    pub fn emit_add_imm(&mut self, dest: RegisterId, src1: RegisterId, imm5: u16) {
        self.emit_word(encode::add_imm(
            dest.index() as u16,
            src1.index() as u16,
            imm5,
        ));
    }

    pub fn emit_ldb(&mut self, dest: RegisterId, base: RegisterId, offset6: u16) {
        self.emit_word(encode::ldb(
            dest.index() as u16,
            base.index() as u16,
            offset6,
        ));
    }

    pub fn emit_stb(&mut self, src: RegisterId, base: RegisterId, offset6: u16) {
        self.emit_word(encode::stb(
            src.index() as u16,
            base.index() as u16,
            offset6,
        ));
    }

    pub fn emit_jsr(&mut self, offset11: u16) {
        self.emit_word(encode::jsr(offset11));
    }

    pub fn emit_jsr_label(&mut self, name: &str) -> Result<(), LabelError> {
        let offset = self.label(name, 11)?;
        self.emit_jsr(offset);
        Ok(())
    }

    pub fn emit_jsrr(&mut self, base: RegisterId) {
        self.emit_word(encode::jsrr(base.index() as u16));
    }

    pub fn emit_and_reg(&mut self, dest: RegisterId, src1: RegisterId, src2: RegisterId) {
        self.emit_word(encode::and_reg(
            dest.index() as u16,
            src1.index() as u16,
            src2.index() as u16,
        ));
    }

    pub fn emit_and_imm(&mut self, dest: RegisterId, src1: RegisterId, imm5: u16) {
        self.emit_word(encode::and_imm(
            dest.index() as u16,
            src1.index() as u16,
            imm5,
        ));
    }

    pub fn emit_ldr(&mut self, dest: RegisterId, base: RegisterId, offset6: u16) {
        self.emit_word(encode::ldr(
            dest.index() as u16,
            base.index() as u16,
            offset6,
        ));
    }

    pub fn emit_str(&mut self, src: RegisterId, base: RegisterId, offset6: u16) {
        self.emit_word(encode::str(
            src.index() as u16,
            base.index() as u16,
            offset6,
        ));
    }

    pub fn emit_rti(&mut self) {
        self.emit_word(encode::rti());
    }

    pub fn emit_not(&mut self, dest: RegisterId, src1: RegisterId) {
        self.emit_word(encode::not(dest.index() as u16, src1.index() as u16));
    }

    pub fn emit_mul_reg(&mut self, dest: RegisterId, src1: RegisterId, src2: RegisterId) {
        self.emit_word(encode::mul_reg(
            dest.index() as u16,
            src1.index() as u16,
            src2.index() as u16,
        ));
    }

    pub fn emit_mul_imm(&mut self, dest: RegisterId, src1: RegisterId, imm5: u16) {
        self.emit_word(encode::mul_imm(
            dest.index() as u16,
            src1.index() as u16,
            imm5,
        ));
    }

    pub fn emit_div(&mut self, dest: RegisterId, src1: RegisterId, src2: RegisterId) {
        self.emit_word(encode::div_mod(
            dest.index() as u16,
            src1.index() as u16,
            false,
            src2.index() as u16,
        ));
    }

    pub fn emit_mod(&mut self, dest: RegisterId, src1: RegisterId, src2: RegisterId) {
        self.emit_word(encode::div_mod(
            dest.index() as u16,
            src1.index() as u16,
            true,
            src2.index() as u16,
        ));
    }

    pub fn emit_jmp(&mut self, base: RegisterId) {
        self.emit_word(encode::jmp(base.index() as u16));
    }

    pub fn emit_ret(&mut self) {
        self.emit_word(encode::ret());
    }

    pub fn emit_lshf(&mut self, dest: RegisterId, src1: RegisterId, imm4: u16) {
        self.emit_word(encode::shf(dest.index() as u16, src1.index() as u16, false, true, imm4));
    }

    pub fn emit_rshf(&mut self, dest: RegisterId, src1: RegisterId, imm4: u16) {
        self.emit_word(encode::shf(dest.index() as u16, src1.index() as u16, false, false, imm4));
    }

    pub fn emit_arshf(&mut self, dest: RegisterId, src1: RegisterId, imm4: u16) {
        self.emit_word(encode::shf(dest.index() as u16, src1.index() as u16, true, false, imm4));
    }

    pub fn emit_lea(&mut self, dest: RegisterId, offset9: u16) {
        self.emit_word(encode::lea(dest.index() as u16, offset9));
    }

    pub fn emit_lea_label(&mut self, dest: RegisterId, name: &str) -> Result<(), LabelError> {
        let offset = self.label(name, 9)?;
        self.emit_lea(dest, offset);
        Ok(())
    }

    pub fn emit_trap(&mut self, trapvect8: u8) {
        self.emit_word(encode::trap(trapvect8));
    }

    /// `AND dest, dest, #0; ADD dest, dest, src` — moves a register.
    pub fn emit_mov_reg(&mut self, dest: RegisterId, src: RegisterId) {
        self.emit_and_imm(dest, dest, 0);
        self.emit_add_reg(dest, dest, src);
    }

    /// `AND dest, dest, #0; ADD dest, dest, #imm5` — moves a small constant.
    pub fn emit_mov_imm(&mut self, dest: RegisterId, imm5: u16) {
        self.emit_and_imm(dest, dest, 0);
        self.emit_add_imm(dest, dest, imm5);
    }

    /// `LEA dest, label; LDR dest, dest, #0` — loads the word stored at
    /// `label`.
    pub fn emit_mov_label(&mut self, dest: RegisterId, name: &str) -> Result<(), LabelError> {
        self.emit_lea_label(dest, name)?;
        self.emit_ldr(dest, dest, 0);
        Ok(())
    }

    /// Drains the patch stack, overwriting every deferred PC-relative field
    /// now that all labels are known. Consumes the label table; the
    /// emitter keeps working afterwards (you may keep emitting and call
    /// `complete_code` again, though a second call with no new patches is
    /// a no-op).
    pub fn complete_code(&mut self) -> Result<(), LabelError> {
        let labels = std::mem::take(&mut self.labels);
        labels.complete(&mut self.code)
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }
}
