//! Default [`RecordScanner`] for the `>`-sentinel (FASTA) convention.
//!
//! Boundaries are found with `memchr` rather than a line-by-line `split`, to
//! keep the single indexing pass allocation-free until a record is actually
//! emitted.

use memchr::memchr;

use crate::scanner::{RecordBounds, RecordScanner};

/// Scans records whose header lines begin with `>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastaScanner;

impl RecordScanner for FastaScanner {
    fn scan_records(&self, file_bytes: &[u8], emit: &mut dyn FnMut(RecordBounds)) {
        let mut pos = 0usize;
        let len = file_bytes.len();

        while pos < len {
            if file_bytes[pos] != b'>' {
                // Not at a header; advance to the next line start.
                pos = match memchr(b'\n', &file_bytes[pos..]) {
                    Some(nl) => pos + nl + 1,
                    None => len,
                };
                continue;
            }

            let header_offset = pos as u64;
            let header_line_end = match memchr(b'\n', &file_bytes[pos..]) {
                Some(nl) => pos + nl + 1,
                None => len,
            };
            let first_content_offset = header_line_end as u64;

            // Find the next header line (column 0 `>`) or EOF.
            let mut scan = header_line_end;
            let record_byte_end = loop {
                if scan >= len {
                    break len;
                }
                if file_bytes[scan] == b'>' {
                    break scan;
                }
                scan = match memchr(b'\n', &file_bytes[scan..]) {
                    Some(nl) => scan + nl + 1,
                    None => len,
                };
            };

            emit(RecordBounds {
                header_offset,
                first_content_offset,
                record_byte_end: record_byte_end as u64,
            });

            pos = record_byte_end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(data: &[u8]) -> Vec<RecordBounds> {
        let mut out = Vec::new();
        FastaScanner.scan_records(data, &mut |b| out.push(b));
        out
    }

    #[test]
    fn single_record() {
        let data = b">chr1 foo\nAAAACCCC\nGGGGTTTT\nN\n";
        let recs = bounds(data);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].header_offset, 0);
        assert_eq!(recs[0].first_content_offset, 10);
        assert_eq!(recs[0].record_byte_end, data.len() as u64);
    }

    #[test]
    fn two_records() {
        let data = b">a\nAAAA\n>b\nCCCC\n";
        let recs = bounds(data);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].record_byte_end, recs[1].header_offset);
    }

    #[test]
    fn extract_id_stops_at_whitespace() {
        let s = FastaScanner;
        assert_eq!(s.extract_id(b">chr1 foo bar"), b"chr1");
        assert_eq!(s.extract_id(b">chr1"), b"chr1");
    }
}
