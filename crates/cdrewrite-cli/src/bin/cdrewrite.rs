// cdrewrite: Compile a context-dependent rewrite rule into a transducer.
//
// TAU is the rewrite relation (phi x psi); LAMBDA and RHO are the left and
// right contexts and SIGMA is the closure of the alphabet. Operands ending
// in `.txt` are read as AT&T text, anything else as binary; `-` reads one
// operand from stdin. The result goes to OUT, or to stdout.
//
// Usage:
//   cdrewrite [OPTIONS] TAU LAMBDA RHO SIGMA [OUT]
//
// Example:
//   cdrewrite --direction sim --mode optional tau.fst l.fst r.fst sigma.fst rule.fst

use clap::Parser;

use cdrewrite_cli::{Fst, STDIO, check_stdin_operands, fatal, load_fst, marker_label, save_fst};
use cdrewrite_core::{Direction, Mode, RewriteOptions};
use cdrewrite_fst::SymbolTable;
use cdrewrite_rule::compile_rewrite_tau;

#[derive(Parser)]
#[command(version, about = "Compile a context-dependent rewrite rule", long_about = None)]
struct Cli {
    /// Rewrite relation
    tau: String,
    /// Left context
    lambda: String,
    /// Right context
    rho: String,
    /// Alphabet closure
    sigma: String,
    /// Output file
    #[arg(default_value = STDIO)]
    out: String,
    /// Rewrite direction: ltr, rtl or sim
    #[arg(long, default_value = "ltr")]
    direction: Direction,
    /// Rewrite mode: obligatory or optional
    #[arg(long, default_value = "obligatory")]
    mode: Mode,
    /// Label of the beginning-of-string marker; negative for none
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    initial_boundary_marker: i64,
    /// Label of the end-of-string marker; negative for none
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    final_boundary_marker: i64,
}

fn run(cli: &Cli) -> Result<(), String> {
    check_stdin_operands([
        cli.tau.as_str(),
        cli.lambda.as_str(),
        cli.rho.as_str(),
        cli.sigma.as_str(),
    ])?;

    let mut symbols = SymbolTable::new();
    let tau: Fst = load_fst(&cli.tau, &mut symbols)?;
    let lambda = load_fst(&cli.lambda, &mut symbols)?;
    let rho = load_fst(&cli.rho, &mut symbols)?;
    let sigma = load_fst(&cli.sigma, &mut symbols)?;

    let options = RewriteOptions {
        direction: cli.direction,
        mode: cli.mode,
        initial_boundary_marker: marker_label(cli.initial_boundary_marker)?,
        final_boundary_marker: marker_label(cli.final_boundary_marker)?,
    };
    log::info!("compiling {} rule ({})", options.direction, options.mode);

    let rule = compile_rewrite_tau(&tau, &lambda, &rho, &sigma, options).map_err(|e| e.to_string())?;
    save_fst(&cli.out, &rule, &symbols)
}

fn main() {
    cdrewrite_cli::init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        fatal(&e);
    }
}
