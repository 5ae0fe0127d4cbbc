//! Indexer — single sequential pass per file: header detection, geometry
//! discovery, line validation, length computation, descriptor emission.
//!
//! A resilient, single-pass walk that builds up a report of records as it
//! goes, fatal-by-default on a geometry mismatch unless `lenient_geometry`
//! is set.

use std::path::{Path, PathBuf};

use memchr::memchr;
use tracing::{debug, warn};

use crate::descriptor::{CodecVariant, RecordDescriptor};
use crate::error::IndexerError;
use crate::scanner::RecordScanner;

/// Maximum interior line length the 16-bit `line_length` field can express.
pub const MAX_LINE_LENGTH: usize = u16::MAX as usize;

/// One descriptor produced by a single file pass, paired with its record id.
pub struct IndexedRecord {
    pub id: Vec<u8>,
    pub descriptor: RecordDescriptor,
}

pub struct Indexer {
    variant: CodecVariant,
    lenient_geometry: bool,
}

impl Indexer {
    pub fn new(variant: CodecVariant, lenient_geometry: bool) -> Self {
        Self { variant, lenient_geometry }
    }

    pub fn variant(&self) -> CodecVariant {
        self.variant
    }

    /// Index one file's worth of records, assigning each the given
    /// `file_no`. `scanner` supplies record boundaries and identifier/
    /// classification rules.
    pub fn index_file(
        &self,
        path: &Path,
        file_no: u8,
        file_bytes: &[u8],
        scanner: &dyn RecordScanner,
    ) -> Result<Vec<IndexedRecord>, IndexerError> {
        let mut out = Vec::new();
        let mut scan_err: Option<IndexerError> = None;

        scanner.scan_records(file_bytes, &mut |bounds| {
            if scan_err.is_some() {
                return;
            }
            match self.build_descriptor(path, file_no, file_bytes, bounds.first_content_offset, bounds.record_byte_end) {
                Ok(geometry) => {
                    let header_line_end = bounds.first_content_offset as usize;
                    let header_start = bounds.header_offset as usize;
                    let header_line = &file_bytes[header_start..header_line_end];
                    let id = scanner.id_transform(header_line);
                    let record_end = bounds.record_byte_end as usize;
                    let first_content_line_end = memchr(b'\n', &file_bytes[header_line_end..record_end])
                        .map(|nl| header_line_end + nl + 1)
                        .unwrap_or(record_end);
                    let classify_line = &file_bytes[header_line_end..first_content_line_end];
                    let payload_kind = scanner.classify(strip_terminator(classify_line));
                    out.push(IndexedRecord {
                        id,
                        descriptor: RecordDescriptor {
                            offset: bounds.first_content_offset,
                            seq_length: geometry.seq_length,
                            line_length: geometry.line_length,
                            terminator_length: geometry.terminator_length,
                            file_no,
                            payload_kind,
                        },
                    });
                }
                Err(e) => scan_err = Some(e),
            }
        });

        if let Some(e) = scan_err {
            return Err(e);
        }
        Ok(out)
    }

    /// Discover the geometry of one record's content lines, validating every
    /// interior line against the first. Classification happens in the
    /// caller, which has the header line in scope.
    fn build_descriptor(
        &self,
        path: &Path,
        _file_no: u8,
        file_bytes: &[u8],
        first_content_offset: u64,
        record_byte_end: u64,
    ) -> Result<Geometry, IndexerError> {
        let start = first_content_offset as usize;
        let end = record_byte_end as usize;
        let body = &file_bytes[start..end];

        if body.is_empty() {
            return Ok(Geometry { seq_length: 0, line_length: 0, terminator_length: 0 });
        }

        let mut line_no: u64 = 0;
        let mut pos = 0usize;
        let mut expected_line_len: Option<usize> = None;
        let mut expected_term: Option<u8> = None;
        let mut seq_length: u64 = 0;

        while pos < body.len() {
            line_no += 1;
            let nl = memchr(b'\n', &body[pos..]);
            let (line_end_incl, has_term, term_len) = match nl {
                Some(off) => {
                    let abs_nl = pos + off;
                    let term_len = if abs_nl > pos && body[abs_nl - 1] == b'\r' { 2 } else { 1 };
                    (abs_nl + 1, true, term_len)
                }
                None => (body.len(), false, 0usize),
            };
            let raw_line_len = line_end_incl - pos;
            let is_last_line = line_end_incl >= body.len();

            if raw_line_len > MAX_LINE_LENGTH {
                return Err(IndexerError::LineTooLong { path: path.to_path_buf(), line: line_no, len: raw_line_len });
            }

            let content_len = raw_line_len - term_len;
            seq_length += content_len as u64;

            if expected_line_len.is_none() && has_term {
                // First line establishes geometry, but only if it is not the
                // final line — a record with exactly one content line has no
                // interior lines to validate against.
                expected_line_len = Some(raw_line_len);
                expected_term = Some(term_len as u8);
            }

            if !is_last_line {
                if let (Some(exp_len), Some(exp_term)) = (expected_line_len, expected_term) {
                    if raw_line_len != exp_len || term_len as u8 != exp_term {
                        if self.lenient_geometry {
                            warn!(
                                path = %path.display(),
                                line = line_no,
                                expected_len = exp_len,
                                actual_len = raw_line_len,
                                "line geometry violation (lenient mode: indexing with best-effort geometry)"
                            );
                        } else {
                            return Err(IndexerError::LineGeometryViolation {
                                path: path.to_path_buf(),
                                line: line_no,
                                expected_len: exp_len as u32,
                                expected_term: exp_term,
                                actual_len: raw_line_len as u32,
                                actual_term: term_len as u8,
                            });
                        }
                    }
                }
            }

            pos = line_end_incl;
        }

        let (line_length, terminator_length) = match (expected_line_len, expected_term) {
            (Some(l), Some(t)) => (l as u16, t as u16),
            // Single unterminated line: no wrapping, geometry is degenerate
            // but must still describe "one line holds everything".
            _ => (seq_length as u16, 0),
        };

        debug!(path = %path.display(), lines = line_no, seq_length, "indexed record");

        Ok(Geometry { seq_length, line_length, terminator_length })
    }
}

struct Geometry {
    seq_length: u64,
    line_length: u16,
    terminator_length: u16,
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && line[end - 1] == b'\r' {
        end -= 1;
    }
    &line[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fasta::FastaScanner;
    use crate::scanner::RecordBounds;

    fn index(data: &[u8], lenient: bool) -> Result<Vec<IndexedRecord>, IndexerError> {
        let indexer = Indexer::new(CodecVariant::Narrow, lenient);
        indexer.index_file(Path::new("tiny.fa"), 0, data, &FastaScanner)
    }

    #[test]
    fn simple_geometry() {
        let data = b">chr1 foo\nAAAACCCC\nGGGGTTTT\nN\n";
        let recs = index(data, false).unwrap();
        assert_eq!(recs.len(), 1);
        let d = &recs[0].descriptor;
        assert_eq!(recs[0].id, b"chr1");
        assert_eq!(d.seq_length, 17);
        assert_eq!(d.line_length, 9);
        assert_eq!(d.terminator_length, 1);
    }

    #[test]
    fn crlf_geometry() {
        let data = b">chr1 foo\r\nAAAACCCC\r\nGGGGTTTT\r\nN\r\n";
        let recs = index(data, false).unwrap();
        let d = &recs[0].descriptor;
        assert_eq!(d.seq_length, 17);
        assert_eq!(d.line_length, 10);
        assert_eq!(d.terminator_length, 2);
    }

    #[test]
    fn geometry_violation_is_fatal() {
        let data = b">a\nAAAAAAAA\nAAAAAAAA\nAAAAAAA\nAAAAAAAA\n";
        let err = index(data, false).unwrap_err();
        match err {
            IndexerError::LineGeometryViolation { line, .. } => assert_eq!(line, 3),
            other => panic!("expected LineGeometryViolation, got {other:?}"),
        }
    }

    #[test]
    fn geometry_violation_lenient_continues() {
        let data = b">a\nAAAAAAAA\nAAAAAAAA\nAAAAAAA\nAAAAAAAA\n";
        let recs = index(data, true).unwrap();
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn multi_record_registry_order() {
        let data = b">a\nAAAA\n>b\nCCCC\n";
        let recs = index(data, false).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, b"a");
        assert_eq!(recs[1].id, b"b");
    }

    /// Records what it was asked to classify, so tests can assert the slice
    /// handed to `classify` never crosses into the next record.
    struct RecordingScanner {
        seen: std::cell::RefCell<Vec<Vec<u8>>>,
    }

    impl RecordScanner for RecordingScanner {
        fn scan_records(&self, file_bytes: &[u8], emit: &mut dyn FnMut(RecordBounds)) {
            FastaScanner.scan_records(file_bytes, emit);
        }

        fn classify(&self, first_content_line: &[u8]) -> u8 {
            self.seen.borrow_mut().push(first_content_line.to_vec());
            crate::scanner::PAYLOAD_KIND_UNKNOWN
        }
    }

    #[test]
    fn classify_does_not_leak_into_next_record_when_content_is_empty() {
        let data = b">a\n>b\nCCCC\n";
        let scanner = RecordingScanner { seen: std::cell::RefCell::new(Vec::new()) };
        let indexer = Indexer::new(CodecVariant::Narrow, false);
        let recs = indexer.index_file(Path::new("tiny.fa"), 0, data, &scanner).unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].descriptor.seq_length, 0);
        let seen = scanner.seen.borrow();
        assert_eq!(seen[0], b"".to_vec(), "empty-content record must classify against an empty slice, not the next record's header");
        assert_eq!(seen[1], b"CCCC".to_vec());
    }
}
