//! `m16`: assemble a MicrAsm source file and run it to halt.
//!
//! Grounded on `original_source/src/main.cpp`'s driver (read file, assemble,
//! load image, dump memory, step until halt, dump registers, exit
//! 64/−1/0) and on `vex/src/main.rs`'s `clap` builder style for argument
//! handling and its shape as a standalone binary crate depending on both
//! the ISA crate and the assembler crate (`vex` depends on `vcpu` and
//! `vasm`; this crate depends on `m16` and `m16-asm` the same way) — this
//! is the member that actually drives `m16::Simulator` and
//! `m16_asm::assemble`, so it cannot live inside the `m16` package itself:
//! `m16-asm` already depends on `m16` for `encode`/`LabelTable`, and a
//! package can't depend on itself through another member.

#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::process;

use m16::simulator::{dump_memory, dump_registers};
use m16::Simulator;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("SOURCE")
                .help("MicrAsm source file to assemble and run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enables debug logging"),
        )
        .arg(
            Arg::with_name("no-dump")
                .long("no-dump")
                .help("Suppresses the memory and register dumps"),
        )
        .get_matches();

    if matches.is_present("verbose") {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::init();
    }

    let source_path = matches.value_of("SOURCE").unwrap();
    let dump = !matches.is_present("no-dump");

    let source = match fs::read_to_string(source_path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("reading '{}' failed: {}", source_path, err);
            process::exit(64);
        }
    };

    let image = match m16_asm::assemble(&source) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(-1);
        }
    };

    let mut sim = Simulator::new();
    sim.load_image(&image);
    log::info!("loaded image from '{}'", source_path);

    if dump {
        print!("{}", dump_memory(&sim));
    }

    while !sim.halted() {
        if let Err(err) = sim.step() {
            eprintln!("{}", err);
            process::exit(-1);
        }
    }

    if dump {
        print!("{}", dump_registers(&sim));
    }

    process::exit(0);
}
