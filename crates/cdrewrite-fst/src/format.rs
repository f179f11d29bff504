// Binary file format: header, symbol table, state and transition records.

use bytemuck::{Pod, Zeroable};

use crate::semiring::{BooleanWeight, LogWeight, Semiring, TropicalWeight};
use crate::symbols::{SymbolTable, parse_symbol_table};
use crate::transition::{StateRecord, TransitionRecord};
use crate::vector::{StateId, VectorFst};
use crate::FstError;

/// Header magic constants (little-endian).
const COOKIE1: u32 = 0x0001_3A6E;
const COOKIE2: u32 = 0x0005_C0DE;

/// Current format version.
const VERSION: u8 = 1;

/// Size of the binary header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Sections after the symbol table start on this boundary.
const ALIGNMENT: usize = 16;

/// Start-state value meaning "no start state".
const NO_STATE: u32 = u32::MAX;

/// Parsed file header.
///
/// The header occupies the first 16 bytes of a file:
/// - bytes 0..4: cookie1 (magic number)
/// - bytes 4..8: cookie2 (magic number)
/// - byte 8: weight type tag
/// - byte 9: format version
/// - bytes 10..16: reserved (zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FstHeader {
    pub weight_tag: u8,
    pub version: u8,
}

impl FstHeader {
    /// Name of the weight type recorded in the header.
    pub fn weight_name(&self) -> &'static str {
        weight_name(self.weight_tag)
    }
}

fn weight_name(tag: u8) -> &'static str {
    if tag == BooleanWeight::TAG {
        BooleanWeight::NAME
    } else if tag == TropicalWeight::TAG {
        TropicalWeight::NAME
    } else if tag == LogWeight::TAG {
        LogWeight::NAME
    } else {
        "unknown"
    }
}

/// Counts and start state, stored right after the aligned symbol table (16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LayoutRecord {
    num_states: u32,
    num_transitions: u32,
    start: u32,
    _reserved: u32,
}

const _: () = assert!(size_of::<LayoutRecord>() == 16);

fn align(offset: usize) -> usize {
    let partial = offset % ALIGNMENT;
    if partial > 0 {
        offset + (ALIGNMENT - partial)
    } else {
        offset
    }
}

/// Parse and validate the 16-byte header.
pub fn parse_header(data: &[u8]) -> Result<FstHeader, FstError> {
    if data.len() < HEADER_SIZE {
        return Err(FstError::TooShort {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let cookie1 = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let cookie2 = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if cookie1 != COOKIE1 || cookie2 != COOKIE2 {
        return Err(FstError::InvalidMagic);
    }

    Ok(FstHeader {
        weight_tag: data[8],
        version: data[9],
    })
}

/// Copy `count` records of type `T` starting at `offset` into an aligned `Vec`.
fn read_records<T: Pod>(data: &[u8], offset: usize, count: usize) -> Result<Vec<T>, FstError> {
    let size = count * size_of::<T>();
    if offset + size > data.len() {
        return Err(FstError::TooShort {
            expected: offset + size,
            actual: data.len(),
        });
    }
    let mut records = vec![T::zeroed(); count];
    bytemuck::cast_slice_mut::<T, u8>(&mut records).copy_from_slice(&data[offset..offset + size]);
    Ok(records)
}

/// Serialize a transducer and its symbol table.
pub fn write_fst<W: Semiring>(fst: &VectorFst<W>, symbols: &SymbolTable) -> Result<Vec<u8>, FstError> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&COOKIE1.to_le_bytes());
    buf.extend_from_slice(&COOKIE2.to_le_bytes());
    buf.push(W::TAG);
    buf.push(VERSION);
    buf.resize(HEADER_SIZE, 0);

    symbols.write_to(&mut buf)?;
    buf.resize(align(buf.len()), 0);

    let num_transitions = fst.num_transitions_total();
    let layout = LayoutRecord {
        num_states: fst.num_states() as u32,
        num_transitions: num_transitions as u32,
        start: fst.start().map_or(NO_STATE, |s| s.0),
        _reserved: 0,
    };
    buf.extend_from_slice(bytemuck::bytes_of(&layout));

    let mut first = 0u32;
    for s in fst.states() {
        let n = fst.num_transitions(s) as u32;
        let record = StateRecord {
            final_weight: fst.final_weight(s).to_f32(),
            first_transition: first,
            num_transitions: n,
            _reserved: 0,
        };
        buf.extend_from_slice(bytemuck::bytes_of(&record));
        first += n;
    }
    for s in fst.states() {
        for tr in fst.transitions(s) {
            buf.extend_from_slice(bytemuck::bytes_of(&TransitionRecord::from_transition(tr)));
        }
    }
    Ok(buf)
}

/// Deserialize a transducer written by [`write_fst`] with the same weight type.
pub fn read_fst<W: Semiring>(data: &[u8]) -> Result<(VectorFst<W>, SymbolTable), FstError> {
    let header = parse_header(data)?;
    if header.weight_tag != W::TAG {
        return Err(FstError::TypeMismatch {
            expected: W::NAME,
            actual: header.weight_name().to_string(),
        });
    }

    let (symbols, sym_end) = parse_symbol_table(data, HEADER_SIZE)?;
    let layout_offset = align(sym_end);
    let layout: LayoutRecord = read_records::<LayoutRecord>(data, layout_offset, 1)?[0];

    let states_offset = layout_offset + size_of::<LayoutRecord>();
    let num_states = layout.num_states as usize;
    let num_transitions = layout.num_transitions as usize;
    let state_records: Vec<StateRecord> = read_records(data, states_offset, num_states)?;
    let transitions_offset = states_offset + num_states * size_of::<StateRecord>();
    let transition_records: Vec<TransitionRecord> =
        read_records(data, transitions_offset, num_transitions)?;

    let mut fst = VectorFst::new();
    fst.add_states(num_states);
    if layout.start != NO_STATE {
        let start = fst.check_state(layout.start)?;
        fst.set_start(start);
    }
    for (i, record) in state_records.iter().enumerate() {
        let s = StateId::from_index(i);
        fst.set_final(s, W::from_f32(record.final_weight));
        let first = record.first_transition as usize;
        let end = first + record.num_transitions as usize;
        let Some(records) = transition_records.get(first..end) else {
            return Err(FstError::InvalidState {
                state: i as u32,
                num_states,
            });
        };
        for rec in records {
            fst.check_state(rec.nextstate)?;
            fst.add_transition(s, rec.to_transition());
        }
    }
    Ok((fst, symbols))
}
