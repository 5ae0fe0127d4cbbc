//! Configuration surface — a plain options struct, not a file/env layer.
//!
//! The engine's configuration is programmatic: callers build an
//! [`IndexOptions`] and pass it to [`crate::SeqDex::open`]. There is no TOML
//! or environment-variable indirection — a plain struct with a `Default`
//! impl, configured entirely by the embedding program.

/// Default file-handle cache capacity.
pub const DEFAULT_MAX_OPEN: usize = 32;

#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Glob pattern applied when the input is a directory. Default `*`.
    pub glob: String,
    /// Capacity of the file-handle LRU cache.
    pub max_open: usize,
    /// Force a full rebuild even if the persisted index looks fresh.
    pub reindex: bool,
    /// Override the default index path derivation rules.
    pub index_name: Option<String>,
    /// Delete the persisted index when the engine is dropped.
    pub clean: bool,
    /// Emit `tracing` progress/diagnostic events during indexing and lookup.
    pub debug: bool,
    /// Downgrade line-geometry violations from fatal to a logged warning,
    /// indexing the record with best-effort geometry.
    pub lenient_geometry: bool,
    /// Passed through to the persistent store driver: `sled`'s in-memory
    /// page-cache budget, in bytes. `None` keeps `sled`'s own default.
    pub store_cache_capacity: Option<u64>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            glob: "*".to_owned(),
            max_open: DEFAULT_MAX_OPEN,
            reindex: false,
            index_name: None,
            clean: false,
            debug: false,
            lenient_geometry: false,
            store_cache_capacity: None,
        }
    }
}

impl IndexOptions {
    pub fn with_glob(mut self, pattern: impl Into<String>) -> Self {
        self.glob = pattern.into();
        self
    }

    pub fn with_max_open(mut self, max_open: usize) -> Self {
        self.max_open = max_open;
        self
    }

    pub fn with_reindex(mut self, reindex: bool) -> Self {
        self.reindex = reindex;
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_lenient_geometry(mut self, lenient: bool) -> Self {
        self.lenient_geometry = lenient;
        self
    }

    pub fn with_store_cache_capacity(mut self, bytes: u64) -> Self {
        self.store_cache_capacity = Some(bytes);
        self
    }
}
