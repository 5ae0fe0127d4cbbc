//! Injected scanner strategy — the upper layer's capability, per §4.4 and the
//! Design Notes' "ad-hoc polymorphism over payload class" item.
//!
//! Rather than a subclass supplying `_calculate_offsets`, callers construct
//! the [`Indexer`](crate::indexer::Indexer) with a `Box<dyn RecordScanner>`.
//! This crate supplies one concrete implementation, [`crate::fasta::FastaScanner`],
//! for the `>`-sentinel convention; any other header/content grammar plugs in
//! the same way.

/// One record boundary as found by [`RecordScanner::scan_records`].
#[derive(Debug, Clone, Copy)]
pub struct RecordBounds {
    /// Byte offset of the sentinel that opens the header line.
    pub header_offset: u64,
    /// Byte offset of the first content byte (past the header line and its
    /// terminator).
    pub first_content_offset: u64,
    /// Byte offset one past the last byte of the record (exclusive), i.e.
    /// where the next header (or EOF) begins.
    pub record_byte_end: u64,
}

/// Default payload classification when the upper layer supplies none.
pub const PAYLOAD_KIND_UNKNOWN: u8 = 0;

/// The capability an upper layer injects into the indexer: how to find
/// record boundaries, how to turn a header line into an identifier, and how
/// to opaquely classify a record's payload.
pub trait RecordScanner {
    /// Walk `file_bytes` and invoke `emit` once per record found, in file
    /// order.
    fn scan_records(&self, file_bytes: &[u8], emit: &mut dyn FnMut(RecordBounds));

    /// Extract the raw identifier from a header line (sentinel through end
    /// of line, terminator excluded). Default: substring up to the first
    /// whitespace, sentinel stripped.
    fn extract_id(&self, header_line: &[u8]) -> Vec<u8> {
        let body = &header_line[self.sentinel_width()..];
        let end = body
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .unwrap_or(body.len());
        body[..end].to_vec()
    }

    /// Width in bytes of the sentinel marking a header line (1 for `>`).
    fn sentinel_width(&self) -> usize {
        1
    }

    /// Optional upper-layer classification of a record's payload, given its
    /// first content line (terminator stripped). Default: unknown.
    fn classify(&self, _first_content_line: &[u8]) -> u8 {
        PAYLOAD_KIND_UNKNOWN
    }

    /// Optional transform applied to the full header line in place of
    /// [`RecordScanner::extract_id`]'s default whitespace-split rule.
    fn id_transform(&self, header_line: &[u8]) -> Vec<u8> {
        self.extract_id(header_line)
    }
}
