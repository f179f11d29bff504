// cdrewrite-print: Print a binary transducer in AT&T text format.
//
// Labels are printed as symbol strings, or as decimal numbers with
// `--numeric`.
//
// Usage:
//   cdrewrite-print [--numeric] [IN]

use std::io::{self, Write};

use clap::Parser;

use cdrewrite_cli::{Fst, STDIO, fatal, read_input};
use cdrewrite_fst::format::read_fst;
use cdrewrite_fst::text::write_text;

#[derive(Parser)]
#[command(version, about = "Print a binary transducer as AT&T text", long_about = None)]
struct Cli {
    /// Input binary file
    #[arg(default_value = STDIO)]
    input: String,
    /// Print labels as decimal numbers
    #[arg(long)]
    numeric: bool,
}

fn run(cli: &Cli) -> Result<(), String> {
    let data = read_input(&cli.input)?;
    let (fst, symbols): (Fst, _) = read_fst(&data).map_err(|e| format!("{}: {e}", cli.input))?;
    let text = write_text(&fst, if cli.numeric { None } else { Some(&symbols) });
    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(text.as_bytes())
        .map_err(|e| format!("failed to write stdout: {e}"))
}

fn main() {
    cdrewrite_cli::init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        fatal(&e);
    }
}
