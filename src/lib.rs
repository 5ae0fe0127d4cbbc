//! # seqdex — indexed random-access engine for large sequence files
//!
//! Format guarantees (frozen for the life of an index):
//! - Record descriptors are packed big-endian (network byte order); an index
//!   is reopenable by an independent process on another machine of equal
//!   pointer width
//! - The 32-bit vs. 64-bit descriptor codec is chosen once, at first build,
//!   from the largest source file's size, and never changes afterward
//! - `file_no` values are stable across rebuilds of the same file set;
//!   descriptors embed them and assume they never get reassigned
//! - The index is read-only after indexing; mutation of source files between
//!   builds is invisible to the engine until a forced rebuild (§1 Non-goals)
//! - The engine is single-threaded and not thread-safe; callers serialize
//!   access externally

pub mod adapters;
pub mod cache;
pub mod config;
pub mod coordinate;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod fasta;
pub mod freshness;
pub mod indexer;
pub mod registry;
pub mod scanner;
pub mod store;

// Flat re-exports for the most common types.
pub use adapters::{TiedIndex, TiedStream};
pub use config::IndexOptions;
pub use coordinate::Strand;
pub use descriptor::{CodecVariant, RecordDescriptor};
pub use engine::{Input, SeqDex};
pub use error::{IndexerError, Result, SeqDexError, StoreError};
pub use fasta::FastaScanner;
pub use scanner::{RecordBounds, RecordScanner};
