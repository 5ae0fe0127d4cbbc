//! Coordinate translator — O(1) `(id, start, stop)` → byte range (§4.6).
//!
//! Compound-id tokenizing is hand-rolled byte scanning rather than a `regex`
//! dependency — no `regex` crate is pulled in anywhere else in this tree.

use std::io::{self, Read, Seek, SeekFrom};

use crate::descriptor::RecordDescriptor;

/// `+1` (forward) or `-1` (the caller's requested range ran backwards).
pub type Strand = i8;

/// Parse `<core_id>:<a><sep><b>` where `sep` is `,`, `-`, or `..`, and `a`/
/// `b` may contain `_` thousands separators. Returns `None` if `id` does not
/// match the grammar (in which case the caller treats the whole string as a
/// plain identifier).
pub fn parse_compound_id(id: &str) -> Option<(&str, u64, u64)> {
    let colon = id.find(':')?;
    let (core, range) = (&id[..colon], &id[colon + 1..]);

    let (a, b, sep_len) = if let Some(pos) = range.find("..") {
        (&range[..pos], &range[pos + 2..], 2)
    } else if let Some(pos) = range.find(',') {
        (&range[..pos], &range[pos + 1..], 1)
    } else if let Some(pos) = range.find('-') {
        (&range[..pos], &range[pos + 1..], 1)
    } else {
        return None;
    };
    let _ = sep_len;

    let a: u64 = a.replace('_', "").parse().ok()?;
    let b: u64 = b.replace('_', "").parse().ok()?;
    Some((core, a, b))
}

/// Apply §4.6 steps 3–5: defaults, strand detection, clamping.
/// Returns `(start, stop, strand)` with `start <= stop` in the result, both
/// within `[1, seq_length]`.
pub fn resolve_range(seq_length: u64, start: Option<u64>, stop: Option<u64>) -> (u64, u64, Strand) {
    let mut start = start.unwrap_or(1);
    let mut stop = stop.unwrap_or(seq_length);

    let strand: Strand = if start > stop {
        std::mem::swap(&mut start, &mut stop);
        -1
    } else {
        1
    };

    let start = start.max(1);
    let stop = stop.min(seq_length);
    (start, stop, strand)
}

/// The byte offset of the `n`-th (1-based) content byte of a record with the
/// given descriptor geometry. O(1); no scanning.
pub fn byte_offset(d: &RecordDescriptor, n: u64) -> u64 {
    let payload_per_line = d.payload_per_line() as u64;
    let k = n - 1;
    d.offset + d.line_length as u64 * (k / payload_per_line) + (k % payload_per_line)
}

/// Read the inclusive `[start, stop]` (1-based) content-byte range of a
/// record, skipping terminator bytes as the read crosses line boundaries.
pub fn extract_range<R: Read + Seek>(
    reader: &mut R,
    d: &RecordDescriptor,
    start: u64,
    stop: u64,
) -> io::Result<Vec<u8>> {
    if stop < start {
        return Ok(Vec::new());
    }
    let want = (stop - start + 1) as usize;
    let mut out = Vec::with_capacity(want);

    let payload_per_line = d.payload_per_line() as u64;
    let first_offset = byte_offset(d, start);
    reader.seek(SeekFrom::Start(first_offset))?;

    // Position within the current line's payload, 0-based.
    let mut col = if payload_per_line == 0 { 0 } else { (start - 1) % payload_per_line };
    let mut buf = [0u8; 4096];

    while out.len() < want {
        if payload_per_line == 0 {
            // Degenerate single-unterminated-line geometry: no wrapping at all.
            let remaining = want - out.len();
            let mut chunk = vec![0u8; remaining];
            reader.read_exact(&mut chunk)?;
            out.extend_from_slice(&chunk);
            break;
        }

        let room_in_line = (payload_per_line - col) as usize;
        let to_take = room_in_line.min(want - out.len()).min(buf.len());
        reader.read_exact(&mut buf[..to_take])?;
        out.extend_from_slice(&buf[..to_take]);
        col += to_take as u64;

        if col == payload_per_line && out.len() < want {
            reader.seek(SeekFrom::Current(d.terminator_length as i64))?;
            col = 0;
        }
    }

    Ok(out)
}
