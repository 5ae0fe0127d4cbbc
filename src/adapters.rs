//! Thin map-like and iterator-like adapters over [`SeqDex`] — the "tied /
//! stream adapters" component (§2). These add no semantics of their own;
//! ecosystems without map/iterator syntactic sugar can omit them entirely.
//!
//! Mutation attempts reject rather than silently no-op, the same shape as a
//! mode guard that refuses an operation the current open mode doesn't
//! support.

use crate::engine::SeqDex;
use crate::error::SeqDexError;

/// A read-only, map-like view over a [`SeqDex`]: `get`/`contains_key`/`len`,
/// with any attempted mutation rejected as [`SeqDexError::ReadOnlyViolation`].
pub struct TiedIndex<'a> {
    engine: &'a mut SeqDex,
}

impl<'a> TiedIndex<'a> {
    pub fn new(engine: &'a mut SeqDex) -> Self {
        Self { engine }
    }

    pub fn contains_key(&self, id: &[u8]) -> bool {
        self.engine.contains(id).unwrap_or(false)
    }

    pub fn get(&mut self, id: &str) -> Option<Vec<u8>> {
        self.engine.subseq(id, None, None).ok().map(|(bytes, _)| bytes)
    }

    pub fn len(&self) -> usize {
        self.engine.ids().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The underlying engine is read-only after indexing (§1 Non-goals);
    /// this always fails.
    pub fn insert(&mut self, _id: &str, _value: &[u8]) -> Result<(), SeqDexError> {
        Err(SeqDexError::ReadOnlyViolation)
    }

    pub fn remove(&mut self, _id: &str) -> Result<(), SeqDexError> {
        Err(SeqDexError::ReadOnlyViolation)
    }
}

/// Single-shot iterator-like view over every `(id, payload)` pair.
pub struct TiedStream {
    items: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl TiedStream {
    pub fn new(engine: &mut SeqDex) -> Result<Self, SeqDexError> {
        Ok(Self { items: engine.stream()?.into_iter() })
    }
}

impl Iterator for TiedStream {
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexOptions;
    use crate::engine::Input;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn tied_index_is_read_only() {
        let dir = tempdir().unwrap();
        let fa = dir.path().join("tiny.fa");
        fs::write(&fa, b">chr1\nAAAA\n").unwrap();
        let idx = dir.path().join("tiny.index");
        let opts = IndexOptions::default().with_index_name(idx.to_string_lossy());

        let mut engine = SeqDex::open(Input::File(fa), opts).unwrap();
        let mut tied = TiedIndex::new(&mut engine);
        assert!(tied.contains_key(b"chr1"));
        assert_eq!(tied.get("chr1"), Some(b"AAAA".to_vec()));
        assert!(matches!(tied.insert("chr2", b"CCCC"), Err(SeqDexError::ReadOnlyViolation)));
    }

    #[test]
    fn tied_stream_yields_every_record_once() {
        let dir = tempdir().unwrap();
        let fa = dir.path().join("tiny.fa");
        fs::write(&fa, b">a\nAAAA\n>b\nCCCC\n").unwrap();
        let idx = dir.path().join("tiny.index");
        let opts = IndexOptions::default().with_index_name(idx.to_string_lossy());

        let mut engine = SeqDex::open(Input::File(fa), opts).unwrap();
        let stream = TiedStream::new(&mut engine).unwrap();
        let mut pairs: Vec<_> = stream.collect();
        pairs.sort();
        assert_eq!(pairs, vec![(b"a".to_vec(), b"AAAA".to_vec()), (b"b".to_vec(), b"CCCC".to_vec())]);
    }
}
