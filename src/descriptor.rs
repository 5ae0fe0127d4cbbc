//! Record descriptor codec — fixed-layout pack/unpack, two width variants.
//!
//! # On-disk layout (big-endian, network byte order)
//!
//! 32-bit variant (14 bytes):
//! ```text
//! Offset  Size  Field
//!    0      4   offset             (BE u32)
//!    4      4   seq_length         (BE u32)
//!    8      2   line_length        (BE u16)
//!   10      2   terminator_length  (BE u16)
//!   12      1   file_no            (u8)
//!   13      1   payload_kind       (u8)
//! ```
//!
//! 64-bit variant (22 bytes) is identical except `offset` and `seq_length`
//! are BE u64.
//!
//! # Endianness
//! Big-endian, unlike the container format this crate was built from: the
//! index must be byte-identical when read back by an independent process on
//! another machine of equal pointer width, so the wire layout uses network
//! byte order rather than a little-endian convention tied to one CPU family.

use byteorder::{BigEndian, ByteOrder};

/// Width variant selected once per index, at build time, from the largest
/// source file's size (see [`crate::indexer::Indexer`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecVariant {
    Narrow,
    Wide,
}

impl CodecVariant {
    pub fn packed_len(self) -> usize {
        match self {
            CodecVariant::Narrow => 14,
            CodecVariant::Wide => 22,
        }
    }

    pub fn as_meta_str(self) -> &'static str {
        match self {
            CodecVariant::Narrow => "32",
            CodecVariant::Wide => "64",
        }
    }

    pub fn from_meta_str(s: &str) -> Option<Self> {
        match s {
            "32" => Some(CodecVariant::Narrow),
            "64" => Some(CodecVariant::Wide),
            _ => None,
        }
    }

    /// Pick the narrow codec unless `max_file_size` overflows a u32.
    pub fn select(max_file_size: u64) -> Self {
        if max_file_size > u32::MAX as u64 {
            CodecVariant::Wide
        } else {
            CodecVariant::Narrow
        }
    }
}

/// The atomic unit of the index: everything needed to locate and extract one
/// record's payload, independent of the file it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub offset: u64,
    pub seq_length: u64,
    pub line_length: u16,
    pub terminator_length: u16,
    pub file_no: u8,
    pub payload_kind: u8,
}

impl RecordDescriptor {
    pub fn payload_per_line(&self) -> u32 {
        self.line_length as u32 - self.terminator_length as u32
    }

    pub fn pack(&self, variant: CodecVariant) -> Vec<u8> {
        let mut buf = vec![0u8; variant.packed_len()];
        match variant {
            CodecVariant::Narrow => {
                BigEndian::write_u32(&mut buf[0..4], self.offset as u32);
                BigEndian::write_u32(&mut buf[4..8], self.seq_length as u32);
                BigEndian::write_u16(&mut buf[8..10], self.line_length);
                BigEndian::write_u16(&mut buf[10..12], self.terminator_length);
                buf[12] = self.file_no;
                buf[13] = self.payload_kind;
            }
            CodecVariant::Wide => {
                BigEndian::write_u64(&mut buf[0..8], self.offset);
                BigEndian::write_u64(&mut buf[8..16], self.seq_length);
                BigEndian::write_u16(&mut buf[16..18], self.line_length);
                BigEndian::write_u16(&mut buf[18..20], self.terminator_length);
                buf[20] = self.file_no;
                buf[21] = self.payload_kind;
            }
        }
        buf
    }

    pub fn unpack(variant: CodecVariant, buf: &[u8]) -> Option<Self> {
        if buf.len() != variant.packed_len() {
            return None;
        }
        Some(match variant {
            CodecVariant::Narrow => RecordDescriptor {
                offset: BigEndian::read_u32(&buf[0..4]) as u64,
                seq_length: BigEndian::read_u32(&buf[4..8]) as u64,
                line_length: BigEndian::read_u16(&buf[8..10]),
                terminator_length: BigEndian::read_u16(&buf[10..12]),
                file_no: buf[12],
                payload_kind: buf[13],
            },
            CodecVariant::Wide => RecordDescriptor {
                offset: BigEndian::read_u64(&buf[0..8]),
                seq_length: BigEndian::read_u64(&buf[8..16]),
                line_length: BigEndian::read_u16(&buf[16..18]),
                terminator_length: BigEndian::read_u16(&buf[18..20]),
                file_no: buf[20],
                payload_kind: buf[21],
            },
        })
    }
}
