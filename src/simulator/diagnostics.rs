//! Diagnostic-only memory and register dump formatters.
//!
//! Grounded on `M16_CPU.cpp`'s `dumpMem`/`printRegs`: 16-byte hex+ASCII
//! rows with consecutive all-zero rows collapsed into a single `...`
//! line, and a two-column hex/signed-decimal register table. Returns
//! `String` instead of `printf`-ing directly, so the CLI binary decides
//! where the text goes.

use super::Simulator;
use crate::register::RegisterId;

pub fn dump_memory(sim: &Simulator) -> String {
    let bytes = sim.memory().as_slice();
    let mut out = String::from("*** <Memory dump>\n");
    let mut previous_was_empty = false;

    let mut line = 0usize;
    while line < bytes.len() {
        let end = (line + 16).min(bytes.len());
        let row = &bytes[line..end];
        let is_empty = row.iter().all(|&b| b == 0);

        if previous_was_empty && !is_empty {
            out.push_str("...\n");
        }
        previous_was_empty = is_empty;

        if !is_empty {
            out.push_str(&format!("{:04x}: ", line));
            for &b in row {
                out.push_str(&format!("{:02x} ", b));
            }
            out.push_str("| ");
            for &b in row {
                let c = if b >= 32 { b as char } else { '.' };
                out.push(c);
            }
            out.push('\n');
        }

        line += 16;
    }

    out.push_str("[END OF MEMORY]\n***\n");
    out
}

pub fn dump_registers(sim: &Simulator) -> String {
    let r = |id: RegisterId| sim.register(id);
    let signed = |v: u16| v as i16;

    let mut out = String::from("*** <Registers dump>\n");
    out.push_str("General purpose registers:\n");
    out.push_str(&format!(
        "R0 = 0x{:04x} : {:<6} | R4 = 0x{:04x} : {}\n",
        r(RegisterId::R0),
        signed(r(RegisterId::R0)),
        r(RegisterId::R4),
        signed(r(RegisterId::R4))
    ));
    out.push_str(&format!(
        "R1 = 0x{:04x} : {:<6} | R5 = 0x{:04x} : {}\n",
        r(RegisterId::R1),
        signed(r(RegisterId::R1)),
        r(RegisterId::R5),
        signed(r(RegisterId::R5))
    ));
    out.push_str(&format!(
        "R2 = 0x{:04x} : {:<6} | R6 = 0x{:04x} : {}\n",
        r(RegisterId::R2),
        signed(r(RegisterId::R2)),
        r(RegisterId::R6),
        signed(r(RegisterId::R6))
    ));
    out.push_str(&format!(
        "R3 = 0x{:04x} : {:<6} | R7 = 0x{:04x} : {}\n",
        r(RegisterId::R3),
        signed(r(RegisterId::R3)),
        r(RegisterId::R7),
        signed(r(RegisterId::R7))
    ));

    let psr = r(RegisterId::Psr);
    out.push_str("\nControl registers:\n");
    out.push_str(&format!("PC  = 0x{:04x}\n", r(RegisterId::Pc)));
    out.push_str(&format!(
        "PSR = 0x{:04x}(n = {}, z = {}, p = {})\n***\n",
        psr,
        psr & 0x4 != 0,
        psr & 0x2 != 0,
        psr & 0x1 != 0
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dump_collapses_zero_runs() {
        let mut sim = Simulator::new();
        let mut image = vec![0u8; 0x40];
        image[0x30] = 0xAB;
        sim.load_image(&image);
        let dump = dump_memory(&sim);
        assert!(dump.contains("[END OF MEMORY]"));
        assert!(dump.contains("..."));
        assert!(dump.contains("ab"));
    }

    #[test]
    fn register_dump_reports_initial_zero_state() {
        let sim = Simulator::new();
        let dump = dump_registers(&sim);
        assert!(dump.contains("PC  = 0x0000"));
        assert!(dump.contains("n = false"));
    }
}
