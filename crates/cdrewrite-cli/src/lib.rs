// cdrewrite-cli: shared utilities for CLI tools.

use std::io::{self, Read, Write};
use std::process;

use cdrewrite_fst::format::{read_fst, write_fst};
use cdrewrite_fst::text::{read_text, write_text};
use cdrewrite_fst::{SymbolTable, TropicalWeight, VectorFst};

/// The automaton type every tool reads and writes.
pub type Fst = VectorFst<TropicalWeight>;

/// Path standing for stdin or stdout.
pub const STDIO: &str = "-";

/// Extension selecting the AT&T text format.
const TEXT_EXTENSION: &str = ".txt";

fn is_text(path: &str) -> bool {
    path.ends_with(TEXT_EXTENSION)
}

/// Install the `env_logger` backend. The level comes from `RUST_LOG`
/// and defaults to `warn`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path == STDIO {
        let mut data = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut data)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        return Ok(data);
    }
    std::fs::read(path).map_err(|e| format!("failed to read {path}: {e}"))
}

/// Write to a file, or stdout when `path` is `-`.
pub fn write_output(path: &str, data: &[u8]) -> Result<(), String> {
    if path == STDIO {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        return out
            .write_all(data)
            .and_then(|()| out.flush())
            .map_err(|e| format!("failed to write stdout: {e}"));
    }
    std::fs::write(path, data).map_err(|e| format!("failed to write {path}: {e}"))
}

/// Add the generated symbols of `other` to `symbols`.
///
/// Fails if a name is bound to a different label in the two tables.
pub fn merge_symbols(symbols: &mut SymbolTable, other: &SymbolTable) -> Result<(), String> {
    for (label, name) in other.iter() {
        let ours = symbols.add_symbol(name);
        if ours != label {
            return Err(format!(
                "symbol [{name}] has label {label} but {ours} was expected; \
                 compile the operands with a shared symbol table"
            ));
        }
    }
    Ok(())
}

/// Load an automaton. Paths ending in `.txt` are parsed as AT&T text with
/// labels resolved through `symbols`; anything else is the binary format,
/// whose symbols are merged into `symbols`.
pub fn load_fst(path: &str, symbols: &mut SymbolTable) -> Result<Fst, String> {
    let data = read_input(path)?;
    if is_text(path) {
        let text = String::from_utf8(data).map_err(|e| format!("{path}: {e}"))?;
        return read_text(&text, Some(symbols)).map_err(|e| format!("{path}: {e}"));
    }
    let (fst, file_symbols) = read_fst(&data).map_err(|e| format!("{path}: {e}"))?;
    merge_symbols(symbols, &file_symbols).map_err(|e| format!("{path}: {e}"))?;
    log::debug!("loaded {path}: {} states", fst.num_states());
    Ok(fst)
}

/// Save an automaton in the format selected by `path` (binary for `-`).
pub fn save_fst(path: &str, fst: &Fst, symbols: &SymbolTable) -> Result<(), String> {
    if is_text(path) {
        return write_output(path, write_text(fst, Some(symbols)).as_bytes());
    }
    let data = write_fst(fst, symbols).map_err(|e| format!("{path}: {e}"))?;
    write_output(path, &data)
}

/// Reject more than one operand read from stdin.
pub fn check_stdin_operands<'a>(paths: impl IntoIterator<Item = &'a str>) -> Result<(), String> {
    if paths.into_iter().filter(|p| *p == STDIO).count() > 1 {
        return Err("at most one operand can be read from stdin".to_string());
    }
    Ok(())
}

/// Boundary marker flag value: negative means no marker.
pub fn marker_label(value: i64) -> Result<Option<u32>, String> {
    if value < 0 {
        return Ok(None);
    }
    u32::try_from(value)
        .map(Some)
        .map_err(|_| format!("boundary marker {value} is out of range"))
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}
