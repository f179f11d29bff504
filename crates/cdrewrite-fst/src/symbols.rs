// Symbol table: string compilation and label printing.

use hashbrown::HashMap;

use crate::semiring::Semiring;
use crate::vector::VectorFst;
use crate::{EPSILON, FstError, Label};

/// First label handed out to named multi-character symbols.
///
/// Labels below this value are Unicode scalar values.
pub const GENERATED_BASE: Label = 0xF0000;

/// Mapping between strings and labels.
///
/// A plain character compiles to its Unicode code point. A bracketed name
/// such as `[BOS]` compiles to a generated label at or above
/// [`GENERATED_BASE`], allocated on first use. A bracketed decimal number
/// such as `[257]` compiles to that label verbatim. A backslash makes the
/// next character literal, so `\[` is the `[` character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// Generated symbol names; `names[i]` has label `GENERATED_BASE + i`.
    names: Vec<String>,
    name_to_label: HashMap<String, Label>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of generated symbols.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Label for the named symbol, allocating one if needed.
    pub fn add_symbol(&mut self, name: &str) -> Label {
        if let Some(&label) = self.name_to_label.get(name) {
            return label;
        }
        let label = GENERATED_BASE + self.names.len() as Label;
        self.names.push(name.to_string());
        self.name_to_label.insert(name.to_string(), label);
        label
    }

    /// Label for a named symbol, if it has been allocated.
    pub fn find(&self, name: &str) -> Option<Label> {
        self.name_to_label.get(name).copied()
    }

    /// Name of a generated label.
    pub fn name(&self, label: Label) -> Option<&str> {
        let index = label.checked_sub(GENERATED_BASE)? as usize;
        self.names.get(index).map(String::as_str)
    }

    /// Iterate over `(label, name)` for every generated symbol.
    pub fn iter(&self) -> impl Iterator<Item = (Label, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (GENERATED_BASE + i as Label, n.as_str()))
    }

    /// Compile `text` into labels, allocating unknown bracketed names.
    pub fn compile(&mut self, text: &str) -> Result<Vec<Label>, FstError> {
        let invalid = |reason: &str| FstError::InvalidString {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let mut labels = Vec::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| invalid("dangling escape"))?;
                    labels.push(char_label(escaped).ok_or_else(|| invalid("reserved code point"))?);
                }
                '[' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(c) => name.push(c),
                            None => return Err(invalid("unterminated bracket")),
                        }
                    }
                    if name.is_empty() {
                        return Err(invalid("empty bracket"));
                    }
                    if name.bytes().all(|b| b.is_ascii_digit()) {
                        let label = name
                            .parse::<Label>()
                            .map_err(|_| invalid("label out of range"))?;
                        if label != EPSILON {
                            labels.push(label);
                        }
                    } else {
                        labels.push(self.add_symbol(&name));
                    }
                }
                ']' => return Err(invalid("unbalanced bracket")),
                c => labels.push(char_label(c).ok_or_else(|| invalid("reserved code point"))?),
            }
        }
        Ok(labels)
    }

    /// Compile `text` into a linear unweighted acceptor.
    pub fn acceptor<W: Semiring>(&mut self, text: &str) -> Result<VectorFst<W>, FstError> {
        Ok(VectorFst::from_labels(&self.compile(text)?))
    }

    /// Compile two strings into a linear transducer mapping one to the other.
    pub fn transducer<W: Semiring>(
        &mut self,
        input: &str,
        output: &str,
    ) -> Result<VectorFst<W>, FstError> {
        let input = self.compile(input)?;
        let output = self.compile(output)?;
        Ok(VectorFst::from_label_pairs(&input, &output))
    }

    /// Printable form of a single label. Epsilon prints as the empty string.
    pub fn label_to_string(&self, label: Label) -> String {
        if label == EPSILON {
            return String::new();
        }
        if let Some(name) = self.name(label) {
            return format!("[{name}]");
        }
        match char::from_u32(label) {
            Some(c @ ('[' | ']' | '\\')) => format!("\\{c}"),
            Some(c) if label < GENERATED_BASE && !c.is_control() => c.to_string(),
            _ => format!("[{label}]"),
        }
    }

    /// Printable form of a label string; inverse of [`compile`](Self::compile).
    pub fn labels_to_string(&self, labels: &[Label]) -> String {
        labels.iter().map(|&l| self.label_to_string(l)).collect()
    }

    /// Append the binary form of the table: a `u16` count followed by
    /// NUL-terminated names, the first entry being the empty epsilon name.
    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<(), FstError> {
        let count = u16::try_from(self.names.len() + 1).map_err(|_| {
            FstError::InvalidSymbolTable(format!("too many symbols: {}", self.names.len()))
        })?;
        buf.extend_from_slice(&count.to_le_bytes());
        buf.push(0);
        for name in &self.names {
            if name.as_bytes().contains(&0) {
                return Err(FstError::InvalidSymbolTable(format!(
                    "NUL byte in symbol {name:?}"
                )));
            }
            buf.extend_from_slice(name.as_bytes());
            buf.push(0);
        }
        Ok(())
    }
}

fn char_label(c: char) -> Option<Label> {
    let label = c as Label;
    (label != EPSILON && label < GENERATED_BASE).then_some(label)
}

/// Parse a symbol table written by [`SymbolTable::write_to`] starting at `offset`.
///
/// Returns the table and the byte offset immediately after it. The caller is
/// responsible for aligning this offset to the next section.
pub fn parse_symbol_table(data: &[u8], offset: usize) -> Result<(SymbolTable, usize), FstError> {
    if offset + 2 > data.len() {
        return Err(FstError::TooShort {
            expected: offset + 2,
            actual: data.len(),
        });
    }

    let symbol_count = u16::from_le_bytes([data[offset], data[offset + 1]]);
    let mut pos = offset + 2;
    let mut table = SymbolTable::new();

    for i in 0..symbol_count {
        let str_start = pos;
        while pos < data.len() && data[pos] != 0 {
            pos += 1;
        }
        if pos >= data.len() {
            return Err(FstError::InvalidSymbolTable(
                "unterminated symbol string".to_string(),
            ));
        }
        let symbol_bytes = &data[str_start..pos];
        pos += 1; // skip null terminator

        if i == 0 {
            if !symbol_bytes.is_empty() {
                return Err(FstError::InvalidSymbolTable(
                    "first symbol must be epsilon".to_string(),
                ));
            }
            continue;
        }
        let name = std::str::from_utf8(symbol_bytes).map_err(|_| {
            FstError::InvalidSymbolTable(format!("invalid UTF-8 in symbol {i}"))
        })?;
        if table.find(name).is_some() {
            return Err(FstError::InvalidSymbolTable(format!(
                "duplicate symbol {name:?}"
            )));
        }
        table.add_symbol(name);
    }

    Ok((table, pos))
}
