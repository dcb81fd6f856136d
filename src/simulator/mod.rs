//! The instruction-set simulator: owns memory and the register file,
//! executes one instruction per `step`, and services synchronous
//! interrupts between steps.
//!
//! Grounded on `M16_CPU.{h,cpp}`'s `cpu` class (`process()`'s big opcode
//! switch, `push`/`pop`, `setFlags`, `sendInterrupt`). Following
//! `snacchus-vcpu/src/processor/logic.rs`'s newer free-function `tick`
//! design rather than its older `Core`/method-per-tick generation — a
//! plain `step(&mut self) -> Result<(), SimulatorError>` reads better here
//! since M16, unlike DLX, has no separate fetch/decode/execute stages to
//! model as distinct return variants.

mod diagnostics;

use crate::bits::{get_bit, sign_extend, zero_extend};
use crate::constants::{PSR_N_BIT, PSR_P_BIT, PSR_USER_BIT, PSR_Z_BIT};
use crate::memory::{Memory, SimulatorError};
use crate::opcode::Opcode;
use crate::register::{RegisterFile, RegisterId};

pub use diagnostics::{dump_memory, dump_registers};

pub struct Simulator {
    registers: RegisterFile,
    memory: Memory,
    usp: u16,
    ssp: u16,
    halted: bool,
}

impl Default for Simulator {
    fn default() -> Simulator {
        Simulator {
            registers: RegisterFile::default(),
            memory: Memory::new(),
            usp: 0,
            ssp: 0,
            halted: false,
        }
    }
}

impl Simulator {
    pub fn new() -> Simulator {
        Simulator::default()
    }

    pub fn load_image(&mut self, image: &[u8]) {
        self.memory.load_image(image);
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn register(&self, id: RegisterId) -> u16 {
        self.registers.get(id)
    }

    pub fn set_register(&mut self, id: RegisterId, value: u16) {
        self.registers.set(id, value);
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    fn is_privileged(&self) -> bool {
        !get_bit(self.registers.get(RegisterId::Psr), PSR_USER_BIT)
    }

    fn set_privileged(&mut self, privileged: bool) {
        let psr = self.registers.get(RegisterId::Psr);
        self.registers
            .set(RegisterId::Psr, crate::bits::set_bit(psr, PSR_USER_BIT, !privileged));
    }

    fn priority(&self) -> u16 {
        crate::bits::subscr(self.registers.get(RegisterId::Psr), 8, 11)
    }

    /// Sets N/Z/P from `result`; exactly one bit ends up set, per §4.1.
    fn set_flags(&mut self, result: u16) {
        let psr = self.registers.get(RegisterId::Psr);
        let psr = if result == 0 {
            let psr = crate::bits::set_bit(psr, PSR_N_BIT, false);
            let psr = crate::bits::set_bit(psr, PSR_Z_BIT, true);
            crate::bits::set_bit(psr, PSR_P_BIT, false)
        } else if result & 0x8000 != 0 {
            let psr = crate::bits::set_bit(psr, PSR_Z_BIT, false);
            let psr = crate::bits::set_bit(psr, PSR_N_BIT, true);
            crate::bits::set_bit(psr, PSR_P_BIT, false)
        } else {
            let psr = crate::bits::set_bit(psr, PSR_Z_BIT, false);
            let psr = crate::bits::set_bit(psr, PSR_N_BIT, false);
            crate::bits::set_bit(psr, PSR_P_BIT, true)
        };
        self.registers.set(RegisterId::Psr, psr);
    }

    fn set_and_flag(&mut self, id: RegisterId, value: u16) {
        self.registers.set(id, value);
        self.set_flags(value);
    }

    /// `writeWord(--SP, val)`.
    fn push(&mut self, value: u16) -> Result<(), SimulatorError> {
        let sp = self.registers.get(RegisterId::Sp).wrapping_sub(2);
        self.registers.set(RegisterId::Sp, sp);
        self.memory.write_word(sp, value)
    }

    /// `readWord(SP++)`.
    fn pop(&mut self) -> Result<u16, SimulatorError> {
        let sp = self.registers.get(RegisterId::Sp);
        let value = self.memory.read_word(sp)?;
        self.registers.set(RegisterId::Sp, sp.wrapping_add(2));
        Ok(value)
    }

    /// Delivers interrupt `id` at priority `level`. A no-op if `level` does
    /// not exceed the current PSR priority. Synchronous: the host calls
    /// this between `step`s, per §5.
    pub fn send_interrupt(&mut self, id: u8, level: u16) -> Result<(), SimulatorError> {
        if level < self.priority() {
            return Ok(());
        }

        self.set_privileged(true);

        self.usp = self.registers.get(RegisterId::Sp);
        self.registers.set(RegisterId::Sp, self.ssp);

        let pc = self.registers.get(RegisterId::Pc);
        let psr = self.registers.get(RegisterId::Psr);
        self.push(pc)?;
        self.push(psr)?;

        // Reads a single byte from `memory[id]` with no shift to a word
        // address — a known source anomaly (see DESIGN.md), preserved
        // literally rather than "corrected" to `readWord(id << 1)`.
        let target = zero_extend(self.memory.read_byte(id as u16));
        self.registers.set(RegisterId::Pc, target);
        Ok(())
    }

    /// Fetches, decodes and executes one instruction. Advances PC by 2
    /// before the instruction's own effect runs, matching `process()`'s
    /// `regs[8] += 2` preceding its opcode switch.
    pub fn step(&mut self) -> Result<(), SimulatorError> {
        let pc = self.registers.get(RegisterId::Pc);
        let instruction = self.memory.read_word(pc)?;
        self.registers.set(RegisterId::Pc, pc.wrapping_add(2));

        let reg1 = RegisterId::from_field(instruction >> 9);
        let reg2 = RegisterId::from_field(instruction >> 6);
        let imm6 = instruction & 0x3f;
        let is_imm = instruction & 0x20 != 0;

        match Opcode::decode(instruction) {
            Opcode::Br => self.exec_br(instruction),
            Opcode::Add => {
                let value = if is_imm {
                    self.registers
                        .get(reg2)
                        .wrapping_add(sign_extend(imm6 & 0x1f, 5))
                } else {
                    let sr2 = RegisterId::from_field(imm6);
                    self.registers.get(reg2).wrapping_add(self.registers.get(sr2))
                };
                self.set_and_flag(reg1, value);
            }
            Opcode::Ldb => {
                let address = self
                    .registers
                    .get(reg2)
                    .wrapping_add(sign_extend(imm6, 6));
                let value = zero_extend(self.memory.read_byte(address));
                self.set_and_flag(reg1, value);
            }
            Opcode::Stb => {
                let address = self
                    .registers
                    .get(reg2)
                    .wrapping_add(sign_extend(imm6, 6));
                self.memory.write_byte(address, self.registers.get(reg1) as u8);
            }
            Opcode::Jsr => self.exec_jsr(instruction, reg2),
            Opcode::And => {
                let value = if is_imm {
                    self.registers.get(reg2) & sign_extend(imm6 & 0x1f, 5)
                } else {
                    let sr2 = RegisterId::from_field(imm6);
                    self.registers.get(reg2) & self.registers.get(sr2)
                };
                self.set_and_flag(reg1, value);
            }
            Opcode::Ldr => {
                let address = self
                    .registers
                    .get(reg2)
                    .wrapping_add(sign_extend(imm6, 6) << 1);
                let value = self.memory.read_word(address)?;
                self.set_and_flag(reg1, value);
            }
            Opcode::Str => {
                let address = self
                    .registers
                    .get(reg2)
                    .wrapping_add(sign_extend(imm6, 6) << 1);
                self.memory.write_word(address, self.registers.get(reg1))?;
            }
            Opcode::Rti => self.exec_rti()?,
            Opcode::Not => {
                let value = !self.registers.get(reg2);
                self.set_and_flag(reg1, value);
            }
            Opcode::Mul => {
                let value = if is_imm {
                    self.registers
                        .get(reg2)
                        .wrapping_mul(sign_extend(imm6 & 0x1f, 5))
                } else {
                    let sr2 = RegisterId::from_field(imm6);
                    self.registers.get(reg2).wrapping_mul(self.registers.get(sr2))
                };
                self.set_and_flag(reg1, value);
            }
            Opcode::DivMod => {
                let sr2 = RegisterId::from_field(imm6);
                let divisor = self.registers.get(sr2);
                let dividend = self.registers.get(reg2);
                // §7/§9: division by zero wraps to 0 rather than faulting.
                let value = if divisor == 0 {
                    0
                } else if is_imm {
                    dividend % divisor
                } else {
                    dividend / divisor
                };
                self.set_and_flag(reg1, value);
            }
            Opcode::Jmp => {
                let base = self.registers.get(reg2);
                self.registers.set(RegisterId::Pc, base & 0xfffe);
            }
            Opcode::Shf => self.exec_shf(imm6, reg1, reg2),
            Opcode::Lea => {
                let pc = self.registers.get(RegisterId::Pc);
                let value = pc.wrapping_add(sign_extend(instruction & 0x1ff, 9) << 1);
                self.set_and_flag(reg1, value);
            }
            Opcode::Trap => self.exec_trap(instruction)?,
        }
        Ok(())
    }

    fn exec_br(&mut self, instruction: u16) {
        let psr = self.registers.get(RegisterId::Psr);
        let taken = (instruction & 0x800 != 0 && psr & 0x4 != 0)
            || (instruction & 0x400 != 0 && psr & 0x2 != 0)
            || (instruction & 0x200 != 0 && psr & 0x1 != 0);
        if taken {
            let pc = self.registers.get(RegisterId::Pc);
            let target = pc.wrapping_add(sign_extend(instruction & 0x1ff, 9) << 1);
            self.registers.set(RegisterId::Pc, target);
        }
    }

    fn exec_jsr(&mut self, instruction: u16, reg2: RegisterId) {
        let pc = self.registers.get(RegisterId::Pc);
        self.registers.set(RegisterId::Lr, pc);
        if get_bit(instruction, 11) {
            let target = pc.wrapping_add(sign_extend(instruction & 0x3ff, 11) << 1);
            self.registers.set(RegisterId::Pc, target);
        } else {
            self.registers.set(RegisterId::Pc, self.registers.get(reg2));
        }
    }

    /// Pops PC then PSR in that order, matching `sendInterrupt`'s push
    /// order (PC, then PSR) read back in the same order rather than
    /// reversed. Since the last value pushed is the first one a `pop`
    /// returns, this hands the pushed PSR to PC and the pushed PC to PSR —
    /// preserved literally, not fixed (see DESIGN.md).
    fn exec_rti(&mut self) -> Result<(), SimulatorError> {
        if self.is_privileged() {
            let first = self.pop()?;
            self.registers.set(RegisterId::Pc, first);
            let second = self.pop()?;
            self.registers.set(RegisterId::Psr, second);
        }
        Ok(())
    }

    fn exec_shf(&mut self, imm6: u16, reg1: RegisterId, reg2: RegisterId) {
        let amount = imm6 & 0xf;
        let src = self.registers.get(reg2);
        let value = if imm6 & 0x10 != 0 {
            src.wrapping_shl(amount as u32)
        } else if imm6 & 0x20 != 0 {
            let shifted = src >> amount;
            if src & 0x8000 != 0 && amount != 0 {
                let sign_mask = 0xffffu16 ^ ((1u16 << (16 - amount)).wrapping_sub(1));
                shifted | sign_mask
            } else {
                shifted
            }
        } else {
            src >> amount
        };
        self.set_and_flag(reg1, value);
    }

    fn exec_trap(&mut self, instruction: u16) -> Result<(), SimulatorError> {
        let pc = self.registers.get(RegisterId::Pc);
        self.registers.set(RegisterId::Lr, pc);
        let vector = (instruction & 0xff) as u8;

        if cfg!(feature = "debug-traps") {
            match vector {
                crate::constants::TRAP_VECTOR_HALT => self.halted = true,
                crate::constants::TRAP_VECTOR_PRINT_INT => {
                    println!("{}", self.registers.get(RegisterId::R4) as i16);
                }
                _ => {}
            }
        } else {
            let address = zero_extend(vector) << 1;
            let target = self.memory.read_word(address)?;
            self.registers.set(RegisterId::Pc, target);
            if vector == crate::constants::TRAP_VECTOR_HALT {
                self.halted = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;

    fn run_to_halt(sim: &mut Simulator, max_steps: usize) {
        for _ in 0..max_steps {
            if sim.halted() {
                return;
            }
            sim.step().unwrap();
        }
        panic!("did not halt within {} steps", max_steps);
    }

    #[test]
    fn hello_halt() {
        let mut ir = Emitter::new();
        ir.emit_trap(0x25);
        let mut sim = Simulator::new();
        sim.load_image(ir.code());
        run_to_halt(&mut sim, 2);
        assert!(sim.halted());
    }

    #[test]
    fn immediate_add_sets_positive_flag() {
        let mut ir = Emitter::new();
        ir.emit_add_imm(RegisterId::R0, RegisterId::R0, 5);
        let mut sim = Simulator::new();
        sim.load_image(ir.code());
        sim.step().unwrap();
        assert_eq!(sim.register(RegisterId::R0), 5);
        assert_eq!(sim.register(RegisterId::Psr) & 0x7, 0b001);
    }

    #[test]
    fn negative_immediate_sets_negative_flag() {
        let mut ir = Emitter::new();
        ir.emit_add_imm(RegisterId::R1, RegisterId::R1, 0b11111);
        let mut sim = Simulator::new();
        sim.load_image(ir.code());
        sim.step().unwrap();
        assert_eq!(sim.register(RegisterId::R1), 0xffff);
        assert_eq!(sim.register(RegisterId::Psr) & 0x7, 0b100);
    }

    #[test]
    fn forward_branch_skips_the_add() {
        let mut ir = Emitter::new();
        ir.emit_br_label(true, true, true, "end").unwrap();
        ir.emit_add_imm(RegisterId::R0, RegisterId::R0, 1);
        ir.emit_label("end").unwrap();
        ir.emit_trap(0x25);
        ir.complete_code().unwrap();
        let mut sim = Simulator::new();
        sim.load_image(ir.code());
        run_to_halt(&mut sim, 3);
        assert_eq!(sim.register(RegisterId::R0), 0);
    }

    #[test]
    fn lea_is_pc_relative_to_the_post_fetch_pc() {
        let mut ir = Emitter::new();
        ir.emit_lea(RegisterId::R0, 0);
        let mut sim = Simulator::new();
        sim.load_image(ir.code());
        sim.step().unwrap();
        assert_eq!(sim.register(RegisterId::R0), 2);
    }

    #[test]
    fn jsr_and_ret() {
        let mut ir = Emitter::new();
        ir.emit_jsr_label("sub").unwrap();
        ir.emit_trap(0x25);
        ir.emit_label("sub").unwrap();
        ir.emit_ret();
        ir.complete_code().unwrap();
        let mut sim = Simulator::new();
        sim.load_image(ir.code());
        sim.step().unwrap();
        assert_eq!(sim.register(RegisterId::Lr), 2);
        assert_eq!(sim.register(RegisterId::Pc), 4);
        sim.step().unwrap();
        assert_eq!(sim.register(RegisterId::Pc), 2);
    }

    #[test]
    fn push_pop_round_trips_without_intervening_writes() {
        let mut sim = Simulator::new();
        sim.set_register(RegisterId::Sp, 0x100);
        sim.push(0xBEEF).unwrap();
        assert_eq!(sim.pop().unwrap(), 0xBEEF);
    }

    #[test]
    fn divide_by_zero_wraps_to_zero() {
        let mut ir = Emitter::new();
        ir.emit_div(RegisterId::R0, RegisterId::R1, RegisterId::R2);
        let mut sim = Simulator::new();
        sim.load_image(ir.code());
        sim.step().unwrap();
        assert_eq!(sim.register(RegisterId::R0), 0);
        assert_eq!(sim.register(RegisterId::Psr) & 0x7, 0b010);
    }

    #[test]
    fn odd_pc_fetch_traps() {
        let mut sim = Simulator::new();
        sim.set_register(RegisterId::Pc, 1);
        assert!(sim.step().is_err());
    }
}
