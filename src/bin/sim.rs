// sim -- a tree-walking interpreter for the Sim language
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `sim` - runs a Sim source file and prints what the program printed.

use std::io;
use std::path::PathBuf;
use std::process;

use structopt::StructOpt;

use sim::eval::Evaluator;
use sim::interpreter::Interpreter;
use sim::parser::Parser;

#[derive(Debug, StructOpt)]
#[structopt(name = "sim", about = "An interpreter for the Sim language")]
struct Opt {
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,

    /// The Sim source file to run.
    #[structopt(parse(from_os_str))]
    source: PathBuf,
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = if opt.verbose {
        log::Level::Trace
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level).unwrap();

    let source = std::fs::read_to_string(&opt.source)?;

    let program = match Parser::parse(&source) {
        Ok(program) => program,
        Err(err) => {
            println!("{}", err);
            process::exit(1);
        }
    };

    log::debug!("running {}", opt.source.display());

    let mut interp = Interpreter::new(Vec::new());
    let result = Evaluator::new(&mut interp, &source).run(&program);

    match result {
        Ok(_) => {
            print!("{}", String::from_utf8_lossy(interp.output()));
            Ok(())
        }
        Err(err) => {
            println!("{}", err);
            process::exit(1);
        }
    }
}
