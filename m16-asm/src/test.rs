//! End-to-end assembler tests: source text in, the §4.1 worked scenarios
//! out, cross-checked by loading the image into [`m16::Simulator`] and
//! stepping it. Mirrors `vasm/src/test.rs`'s placement (a top-level
//! `test` module pulled in from `lib.rs` under `#[cfg(test)]`) rather than
//! scattering these across the per-file unit test modules, since these
//! exercise the assembler and the simulator together.

use crate::{assemble, ErrorKind};
use m16::{RegisterId, Simulator};

fn run_to_halt(source: &str) -> Simulator {
    let image = assemble(source).unwrap();
    let mut sim = Simulator::default();
    sim.load_image(&image);
    while !sim.halted() {
        sim.step().unwrap();
    }
    sim
}

#[test]
fn hello_halt() {
    let image = assemble(".orig x0\nhlt").unwrap();
    assert_eq!(image[0], 0xF0);
    assert_eq!(image[1], 0x25);
}

#[test]
fn immediate_add_sets_positive_flag() {
    let sim = run_to_halt(".orig x0\nadd r0, r0, #5\nhlt");
    assert_eq!(sim.register(RegisterId::R0), 5);
}

#[test]
fn negative_immediate_wraps_and_sets_negative_flag() {
    let image = assemble(".orig x0\nadd r1, r1, #-1\nhlt").unwrap();
    let word = ((image[0] as u16) << 8) | image[1] as u16;
    assert_eq!((word >> 5) & 1, 1);
    assert_eq!(word & 0x1f, 0b11111);

    let sim = run_to_halt(".orig x0\nadd r1, r1, #-1\nhlt");
    assert_eq!(sim.register(RegisterId::R1), 0xFFFF);
}

#[test]
fn forward_branch_skips_the_add() {
    let source = ".orig x0\n    brnzp end\n    add r0, r0, #1\nend:\n    hlt";
    let image = assemble(source).unwrap();
    let word = ((image[0] as u16) << 8) | image[1] as u16;
    assert_eq!(word, 0x0E01);

    let sim = run_to_halt(source);
    assert_eq!(sim.register(RegisterId::R0), 0);
}

#[test]
fn lea_is_self_relative() {
    let sim = run_to_halt(".orig x0\nlea r0, #0\nhlt");
    assert_eq!(sim.register(RegisterId::R0), 2);
}

#[test]
fn jsr_and_ret_roundtrip() {
    let source = ".orig x0\n    jsr sub\n    hlt\nsub:\n    ret";
    let image = assemble(source).unwrap();
    let mut sim = Simulator::default();
    sim.load_image(&image);

    sim.step().unwrap(); // JSR
    assert_eq!(sim.register(RegisterId::Lr), 2);
    assert_eq!(sim.register(RegisterId::Pc), 4);

    sim.step().unwrap(); // RET
    assert_eq!(sim.register(RegisterId::Pc), 2);

    sim.step().unwrap(); // HLT
    assert!(sim.halted());
}

#[test]
fn literal_encoding_matches_low_bits_for_every_width() {
    // width 5 (ADD/AND/MUL immediate): valid range is [-15, 15].
    for n in -15i32..=15 {
        let text = format!(".orig x0\nadd r0, r0, #{}\nhlt", n);
        let image = assemble(&text).unwrap();
        let word = ((image[0] as u16) << 8) | image[1] as u16;
        assert_eq!(word & 0x1f, (n & 0x1f) as u16, "n = {}", n);
    }
}

#[test]
fn literal_out_of_range_is_rejected() {
    let err = assemble(".orig x0\nadd r0, r0, #16\nhlt").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LiteralOutOfRange { .. }));

    // The algebraic minimum -16 is excluded from the valid range too.
    let err = assemble(".orig x0\nadd r0, r0, #-16\nhlt").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LiteralOutOfRange { .. }));
}

#[test]
fn hex_octal_and_binary_prefixes_agree() {
    let decimal = assemble(".orig x0\n.dat #255").unwrap();
    let hex = assemble(".orig x0\n.dat xFF").unwrap();
    let octal = assemble(".orig x0\n.dat o377").unwrap();
    let binary = assemble(".orig x0\n.dat b11111111").unwrap();
    assert_eq!(decimal[0..2], hex[0..2]);
    assert_eq!(hex[0..2], octal[0..2]);
    assert_eq!(octal[0..2], binary[0..2]);
}

#[test]
fn dat_accepts_a_label_reference() {
    let image = assemble(".orig x0\n.dat here\nhere: .dat #0").unwrap();
    let word = ((image[0] as u16) << 8) | image[1] as u16;
    assert_eq!(word, 2);
}

#[test]
fn unreachable_forward_reference_is_rejected() {
    let mut source = String::from(".orig x0\nbrnzp far\n");
    for _ in 0..400 {
        source.push_str("add r0, r0, #0\n");
    }
    source.push_str("far: hlt\n");
    let err = assemble(&source).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnreachableLabel { .. }));
}

#[test]
fn assembling_the_same_source_twice_is_deterministic() {
    let source = ".orig x0\nbrnzp end\nadd r0, r0, #1\nend:\nhlt";
    let once = assemble(source).unwrap();
    let twice = assemble(source).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn mismatched_register_width_is_rejected() {
    let err = assemble(".orig x0\nadd r8, r0, r0\nhlt").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::RegisterOutOfRange { .. }));
}

#[test]
fn missing_comma_between_operands_is_rejected() {
    let err = assemble(".orig x0\nadd r0 r0, #1\nhlt").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingComma));
}
