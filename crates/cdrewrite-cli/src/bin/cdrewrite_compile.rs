// cdrewrite-compile: Compile an AT&T text transducer to the binary format.
//
// Labels in the text are symbol strings: single characters, bracketed
// names such as `[BOS]`, raw labels such as `[42]`, or `<eps>`. With
// `--numeric` every label is a decimal number instead.
//
// Usage:
//   cdrewrite-compile [--numeric] [IN] [OUT]

use clap::Parser;

use cdrewrite_cli::{Fst, STDIO, fatal, read_input, save_fst};
use cdrewrite_fst::SymbolTable;
use cdrewrite_fst::text::read_text;

#[derive(Parser)]
#[command(version, about = "Compile AT&T text into a binary transducer", long_about = None)]
struct Cli {
    /// Input text file
    #[arg(default_value = STDIO)]
    input: String,
    /// Output file
    #[arg(default_value = STDIO)]
    out: String,
    /// Labels are decimal numbers
    #[arg(long)]
    numeric: bool,
}

fn run(cli: &Cli) -> Result<(), String> {
    let data = read_input(&cli.input)?;
    let text = String::from_utf8(data).map_err(|e| format!("{}: {e}", cli.input))?;
    let mut symbols = SymbolTable::new();
    let table = if cli.numeric { None } else { Some(&mut symbols) };
    let fst: Fst = read_text(&text, table).map_err(|e| format!("{}: {e}", cli.input))?;
    log::debug!("compiled {} states, {} symbols", fst.num_states(), symbols.len());
    if cli.out.ends_with(".txt") {
        return Err(format!("{}: output must be a binary file", cli.out));
    }
    save_fst(&cli.out, &fst, &symbols)
}

fn main() {
    cdrewrite_cli::init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        fatal(&e);
    }
}
