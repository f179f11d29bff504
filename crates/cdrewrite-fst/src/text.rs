// AT&T text format.
//
// One transition per line, `src dst ilabel olabel [weight]`, and one final
// state per line, `state [weight]`. The source of the first line is the start
// state. Omitted weights are One.

use std::fmt::Write as _;

use hashbrown::HashMap;

use crate::semiring::Semiring;
use crate::symbols::SymbolTable;
use crate::transition::Transition;
use crate::vector::{StateId, VectorFst};
use crate::{EPSILON, FstError, Label};

/// Printed form of epsilon when labels are written as symbols.
pub const EPSILON_SYMBOL: &str = "<eps>";

fn format_label(label: Label, symbols: Option<&SymbolTable>) -> String {
    match symbols {
        Some(_) if label == EPSILON => EPSILON_SYMBOL.to_string(),
        Some(syms) => syms.label_to_string(label),
        None => label.to_string(),
    }
}

fn write_state<W: Semiring>(
    out: &mut String,
    fst: &VectorFst<W>,
    s: StateId,
    symbols: Option<&SymbolTable>,
) {
    for tr in fst.transitions(s) {
        let _ = write!(
            out,
            "{}\t{}\t{}\t{}",
            s,
            tr.nextstate,
            format_label(tr.ilabel, symbols),
            format_label(tr.olabel, symbols)
        );
        if !tr.weight.is_one() {
            let _ = write!(out, "\t{}", tr.weight.to_f32());
        }
        out.push('\n');
    }
    let fw = fst.final_weight(s);
    if !fw.is_zero() {
        if fw.is_one() {
            let _ = writeln!(out, "{s}");
        } else {
            let _ = writeln!(out, "{s}\t{}", fw.to_f32());
        }
    }
}

/// Print a transducer in AT&T format.
///
/// Labels are printed as numbers, or as symbol strings when `symbols` is given.
/// The start state's lines come first.
pub fn write_text<W: Semiring>(fst: &VectorFst<W>, symbols: Option<&SymbolTable>) -> String {
    let mut out = String::new();
    let Some(start) = fst.start() else {
        return out;
    };
    write_state(&mut out, fst, start, symbols);
    for s in fst.states().filter(|&s| s != start) {
        write_state(&mut out, fst, s, symbols);
    }
    out
}

fn parse_state(token: &str, line: usize) -> Result<u32, FstError> {
    token.parse::<u32>().map_err(|_| FstError::Parse {
        line,
        message: format!("invalid state {token:?}"),
    })
}

fn parse_weight<W: Semiring>(token: Option<&str>, line: usize) -> Result<W, FstError> {
    match token {
        None => Ok(W::one()),
        Some(t) => {
            let value = match t {
                "Infinity" | "inf" => f32::INFINITY,
                _ => t.parse::<f32>().map_err(|_| FstError::Parse {
                    line,
                    message: format!("invalid weight {t:?}"),
                })?,
            };
            Ok(W::from_f32(value))
        }
    }
}

fn parse_label(
    token: &str,
    symbols: &mut Option<&mut SymbolTable>,
    line: usize,
) -> Result<Label, FstError> {
    match symbols {
        None => token.parse::<Label>().map_err(|_| FstError::Parse {
            line,
            message: format!("invalid label {token:?}"),
        }),
        Some(_) if token == EPSILON_SYMBOL => Ok(EPSILON),
        Some(syms) => match syms.compile(token)?.as_slice() {
            [label] => Ok(*label),
            _ => Err(FstError::Parse {
                line,
                message: format!("{token:?} is not a single symbol"),
            }),
        },
    }
}

/// States are numbered in order of first appearance, so sparse or huge ids
/// in the text only cost one state each.
fn ensure_state<W: Semiring>(
    fst: &mut VectorFst<W>,
    ids: &mut HashMap<u32, StateId>,
    id: u32,
) -> StateId {
    *ids.entry(id).or_insert_with(|| fst.add_state())
}

/// Parse a transducer in AT&T format.
///
/// Labels are numbers, or symbol strings compiled through `symbols` when given.
pub fn read_text<W: Semiring>(
    text: &str,
    mut symbols: Option<&mut SymbolTable>,
) -> Result<VectorFst<W>, FstError> {
    let mut fst = VectorFst::new();
    let mut ids: HashMap<u32, StateId> = HashMap::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        match fields.len() {
            0 => continue,
            1 | 2 => {
                let s = ensure_state(&mut fst, &mut ids, parse_state(fields[0], line)?);
                if fst.start().is_none() {
                    fst.set_start(s);
                }
                let weight = parse_weight::<W>(fields.get(1).copied(), line)?;
                fst.set_final(s, weight);
            }
            4 | 5 => {
                let src = ensure_state(&mut fst, &mut ids, parse_state(fields[0], line)?);
                let dst = ensure_state(&mut fst, &mut ids, parse_state(fields[1], line)?);
                if fst.start().is_none() {
                    fst.set_start(src);
                }
                let ilabel = parse_label(fields[2], &mut symbols, line)?;
                let olabel = parse_label(fields[3], &mut symbols, line)?;
                let weight = parse_weight::<W>(fields.get(4).copied(), line)?;
                fst.add_transition(src, Transition::new(ilabel, olabel, weight, dst));
            }
            n => {
                return Err(FstError::Parse {
                    line,
                    message: format!("expected 1, 2, 4 or 5 fields, got {n}"),
                });
            }
        }
    }
    Ok(fst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::TropicalWeight;

    type Fst = VectorFst<TropicalWeight>;

    #[test]
    fn print_linear() {
        let mut fst = Fst::from_label_pairs(&[1, 2], &[3]);
        fst.set_final(StateId(2), TropicalWeight(0.5));
        assert_eq!(write_text(&fst, None), "0\t1\t1\t3\n1\t2\t2\t0\n2\t0.5\n");
    }

    #[test]
    fn print_with_symbols() {
        let mut syms = SymbolTable::new();
        let mut fst: Fst = syms.transducer("a", "[X]").unwrap();
        fst.add_transition(StateId(0), Transition::unweighted(0, 98, StateId(1)));
        assert_eq!(
            write_text(&fst, Some(&syms)),
            "0\t1\ta\t[X]\n0\t1\t<eps>\tb\n1\n"
        );
    }

    #[test]
    fn parse_numeric() {
        let fst: Fst = read_text("0 1 97 98 1.5\n1 2 0 99\n2\n", None).unwrap();
        assert_eq!(fst.num_states(), 3);
        assert_eq!(fst.start(), Some(StateId(0)));
        assert_eq!(fst.transitions(StateId(0))[0].weight, TropicalWeight(1.5));
        assert!(fst.is_final(StateId(2)));
        assert!(!fst.is_final(StateId(1)));
    }

    #[test]
    fn first_line_sets_start() {
        let fst: Fst = read_text("3 0 1 1\n0\n", None).unwrap();
        assert_eq!(fst.start(), Some(StateId(3)));
        assert_eq!(fst.num_states(), 4);
    }

    #[test]
    fn parse_with_symbols() {
        let mut syms = SymbolTable::new();
        let fst: Fst = read_text("0\t1\ta\t[BOS]\n1\t1\t<eps>\tb\n1\n", Some(&mut syms)).unwrap();
        let t = fst.transitions(StateId(0))[0];
        assert_eq!(t.ilabel, 97);
        assert_eq!(Some(t.olabel), syms.find("BOS"));
        assert_eq!(fst.transitions(StateId(1))[0].ilabel, EPSILON);
    }

    #[test]
    fn print_then_parse() {
        let mut fst = Fst::from_label_pairs(&[5, 6], &[7, 0]);
        fst.set_final(StateId(2), TropicalWeight(2.0));
        let text = write_text(&fst, None);
        let back: Fst = read_text(&text, None).unwrap();
        assert_eq!(write_text(&back, None), text);
    }

    #[test]
    fn sparse_state_ids_are_renumbered() {
        let fst: Fst = read_text("4294967295 7 97 97\n7\n", None).unwrap();
        assert_eq!(fst.num_states(), 2);
        assert_eq!(fst.start(), Some(StateId(0)));
        assert_eq!(fst.transitions(StateId(0))[0].nextstate, StateId(1));
        assert!(fst.is_final(StateId(1)));
    }

    #[test]
    fn parse_errors_carry_line() {
        let err = read_text::<TropicalWeight>("0 1 1 1\n0 x 1 1\n", None).unwrap_err();
        assert!(matches!(err, FstError::Parse { line: 2, .. }));
        let err = read_text::<TropicalWeight>("0 1 1\n", None).unwrap_err();
        assert!(matches!(err, FstError::Parse { line: 1, .. }));
        let err = read_text::<TropicalWeight>("0 1 a b\n", None).unwrap_err();
        assert!(matches!(err, FstError::Parse { line: 1, .. }));
    }
}
