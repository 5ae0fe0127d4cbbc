//! File-handle LRU cache — bounds open descriptor count across concurrent
//! random reads (§4.7).
//!
//! No teacher module caches file handles (the container format opens a
//! single archive file for its whole lifetime); enriched from the wider
//! pack's `vectordotdev-vector` manifest, which depends on `lru` for exactly
//! this bounded-LRU shape.
//!
//! Single-threaded by design (§5): concurrent access requires external
//! synchronization, same as the rest of the engine.

use std::cell::RefCell;
use std::fs::File;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use lru::LruCache;

/// Bounded cache of open [`File`] handles keyed by absolute path.
///
/// On a miss once the cache is full, the least-recently-used **third**
/// (`⌈capacity/3⌉` entries) is evicted in one batch — amortizing eviction
/// cost over many misses rather than evicting one entry per insert.
pub struct HandleCache {
    capacity: usize,
    inner: LruCache<PathBuf, Rc<RefCell<File>>>,
}

impl HandleCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap();
        // This wrapper enforces the real capacity via `evict_lru_third`
        // before every insert, so the underlying cache never needs to
        // auto-evict on its own.
        Self { capacity, inner: LruCache::new(cap) }
    }

    /// Return an open handle for `path`, opening and inserting it if absent.
    pub fn acquire(&mut self, path: &Path) -> std::io::Result<Rc<RefCell<File>>> {
        if let Some(handle) = self.inner.get(path) {
            return Ok(Rc::clone(handle));
        }

        if self.inner.len() >= self.capacity {
            self.evict_lru_third();
        }

        let file = File::open(path)?;
        let handle = Rc::new(RefCell::new(file));
        self.inner.put(path.to_path_buf(), Rc::clone(&handle));
        Ok(handle)
    }

    /// Evict `⌈capacity/3⌉` least-recently-used entries in one batch.
    fn evict_lru_third(&mut self) {
        let n = self.capacity.div_ceil(3).max(1);
        for _ in 0..n {
            if self.inner.pop_lru().is_none() {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.contains(path)
    }
}
