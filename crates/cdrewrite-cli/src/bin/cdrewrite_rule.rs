// cdrewrite-rule: Compile a rule from strings and rewrite words with it.
//
// The rule is PHI -> PSI / LEFT __ RIGHT over the characters of SIGMA.
// `--phi`, `--left` and `--right` may be repeated to give alternatives; a
// missing context is unconstrained. `[BOS]` and `[EOS]` in a context stand
// for the beginning and end of the word. Bracketed names such as `[NOUN]`
// are single symbols.
//
// If WORD arguments are given, rewrites each word. Otherwise reads words from
// stdin (one per line). Output is one line per rewrite:
//   word<TAB>rewrite
//
// Usage:
//   cdrewrite-rule --phi S --psi R --left A --right A --sigma ABRS [WORD...]

use std::io::{self, BufRead, Write};

use clap::Parser;

use cdrewrite_cli::{Fst, fatal, save_fst};
use cdrewrite_core::{Direction, Mode, RewriteOptions};
use cdrewrite_fst::SymbolTable;
use cdrewrite_fst::rational::{ClosureType, closure, union_all};
use cdrewrite_rule::RewriteRule;
use cdrewrite_rule::apply::{rewrites_str, top_rewrites_str};

#[derive(Parser)]
#[command(version, about = "Compile a rewrite rule from strings and apply it", long_about = None)]
struct Cli {
    /// Text to rewrite (repeat for alternatives)
    #[arg(long, required = true)]
    phi: Vec<String>,
    /// Replacement text
    #[arg(long, default_value = "")]
    psi: String,
    /// Left context (repeat for alternatives)
    #[arg(long)]
    left: Vec<String>,
    /// Right context (repeat for alternatives)
    #[arg(long)]
    right: Vec<String>,
    /// Alphabet, one symbol per character or bracketed name
    #[arg(long)]
    sigma: String,
    /// Rewrite direction: ltr, rtl or sim
    #[arg(long, default_value = "ltr")]
    direction: Direction,
    /// Rewrite mode: obligatory or optional
    #[arg(long, default_value = "obligatory")]
    mode: Mode,
    /// Print only the best rewrites
    #[arg(long)]
    top: bool,
    /// Save the compiled rule (`.txt` for AT&T text)
    #[arg(long, value_name = "FILE")]
    save: Option<String>,
    /// Words to rewrite; read from stdin when absent
    words: Vec<String>,
}

/// Union of the alternatives; none means the empty string.
fn alternatives(symbols: &mut SymbolTable, strings: &[String]) -> Result<Fst, String> {
    if strings.is_empty() {
        return Ok(Fst::epsilon());
    }
    let fsts = strings
        .iter()
        .map(|s| symbols.acceptor(s).map_err(|e| e.to_string()))
        .collect::<Result<Vec<Fst>, _>>()?;
    Ok(union_all(&fsts))
}

fn compile(cli: &Cli, symbols: &mut SymbolTable) -> Result<Fst, String> {
    let bos = symbols.add_symbol("BOS");
    let eos = symbols.add_symbol("EOS");

    let alphabet = symbols.compile(&cli.sigma).map_err(|e| e.to_string())?;
    let mut sigma = Fst::from_alphabet(alphabet);
    closure(&mut sigma, ClosureType::Star);

    let rule = RewriteRule::new(
        alternatives(symbols, &cli.phi)?,
        symbols.acceptor(&cli.psi).map_err(|e| e.to_string())?,
        alternatives(symbols, &cli.left)?,
        alternatives(symbols, &cli.right)?,
    )
    .with_options(RewriteOptions::new(cli.direction, cli.mode).with_boundary_markers(bos, eos));
    rule.compile(&sigma).map_err(|e| e.to_string())
}

fn rewrite_word(
    out: &mut impl Write,
    word: &str,
    rule: &Fst,
    symbols: &mut SymbolTable,
    top: bool,
) {
    let result = if top {
        top_rewrites_str(word, rule, symbols)
    } else {
        rewrites_str(word, rule, symbols)
    };
    match result {
        Ok(outputs) => {
            for output in outputs {
                let _ = writeln!(out, "{word}\t{output}");
            }
        }
        Err(e) => eprintln!("{word}: {e}"),
    }
}

fn main() {
    cdrewrite_cli::init_logging();
    let cli = Cli::parse();

    let mut symbols = SymbolTable::new();
    let rule = compile(&cli, &mut symbols).unwrap_or_else(|e| fatal(&e));
    log::info!("compiled rule: {} states", rule.num_states());

    if let Some(path) = &cli.save {
        save_fst(path, &rule, &symbols).unwrap_or_else(|e| fatal(&e));
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    if !cli.words.is_empty() {
        for word in &cli.words {
            rewrite_word(&mut out, word, &rule, &mut symbols, cli.top);
        }
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        rewrite_word(&mut out, word, &rule, &mut symbols, cli.top);
    }
}
