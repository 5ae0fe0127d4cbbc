//! Top-level [`SeqDex`] engine — composes freshness → store → registry →
//! coordinate → cache into the query surface (§4.8).

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::HandleCache;
use crate::config::IndexOptions;
use crate::coordinate::{self, Strand};
use crate::descriptor::{CodecVariant, RecordDescriptor};
use crate::error::{SeqDexError, StoreError};
use crate::fasta::FastaScanner;
use crate::freshness;
use crate::indexer::Indexer;
use crate::registry::FileRegistry;
use crate::scanner::RecordScanner;
use crate::store::{meta_file_key, IndexStore, OpenMode, SledStore, META_CODEC, META_SENTINEL, SENTINEL_IN_PROGRESS};

type Result<T> = std::result::Result<T, SeqDexError>;

/// Constructor argument: what set of files to index.
pub enum Input {
    File(PathBuf),
    Dir(PathBuf),
    List(Vec<PathBuf>),
}

fn is_meta_key(key: &[u8]) -> bool {
    key.starts_with(b"__")
}

/// The indexed random-access engine. Not thread-safe (§5); callers must
/// serialize access or wrap it externally.
pub struct SeqDex {
    store: SledStore,
    registry: FileRegistry,
    variant: CodecVariant,
    cache: HandleCache,
    scanner: Box<dyn RecordScanner>,
    options: IndexOptions,
}

impl SeqDex {
    /// Open (building or rebuilding the index as needed) using the default
    /// [`FastaScanner`].
    pub fn open(input: Input, options: IndexOptions) -> Result<Self> {
        Self::open_with_scanner(input, options, Box::new(FastaScanner))
    }

    pub fn open_with_scanner(input: Input, options: IndexOptions, scanner: Box<dyn RecordScanner>) -> Result<Self> {
        let dir_hint = match &input {
            Input::Dir(d) => Some(d.clone()),
            _ => None,
        };
        let is_list = matches!(input, Input::List(_));
        let sources = resolve_sources(input, &options)?;
        let index_path = derive_index_path(&sources, dir_hint.as_deref(), is_list, &options);

        if options.reindex {
            let _ = SledStore::unlink(&index_path);
        }

        let in_progress = {
            // A short-lived read-mode probe to check the sentinel without
            // holding the store open for the rest of this function.
            match SledStore::open_with_cache_capacity(&index_path, OpenMode::Read, options.store_cache_capacity) {
                Ok(s) => {
                    let in_progress = s.get(META_SENTINEL)?.as_deref() == Some(SENTINEL_IN_PROGRESS);
                    s.close()?;
                    in_progress
                }
                Err(_) => false,
            }
        };

        let plan = freshness::evaluate(&index_path, &sources, options.reindex, in_progress);

        if plan.index_absent {
            let _ = SledStore::unlink(&index_path);
        }

        if plan.needs_rebuild() {
            Self::rebuild(&index_path, &sources, &plan.updated, &options, scanner.as_ref())?;
        }

        let store = SledStore::open_with_cache_capacity(&index_path, OpenMode::Read, options.store_cache_capacity)?;
        let (variant, registry) = reconstruct_registry(&store)?;
        let cache = HandleCache::new(options.max_open);

        Ok(Self { store, registry, variant, cache, scanner, options })
    }

    fn rebuild(
        index_path: &Path,
        all_sources: &[PathBuf],
        updated: &[PathBuf],
        options: &IndexOptions,
        scanner: &dyn RecordScanner,
    ) -> Result<()> {
        let store = SledStore::open_with_cache_capacity(index_path, OpenMode::CreateRw, options.store_cache_capacity)?;
        store.put(META_SENTINEL, SENTINEL_IN_PROGRESS)?;

        let (variant, mut registry) = reconstruct_registry(&store).unwrap_or_else(|_| {
            let max_size = all_sources
                .iter()
                .filter_map(|p| std::fs::metadata(p).ok())
                .map(|m| m.len())
                .max()
                .unwrap_or(0);
            (CodecVariant::select(max_size), FileRegistry::new())
        });
        store.put(META_CODEC, variant.as_meta_str().as_bytes())?;

        let indexer = Indexer::new(variant, options.lenient_geometry);

        for path in updated {
            let file_no = registry.register(path);
            store.put(&meta_file_key(file_no), path.to_string_lossy().as_bytes())?;

            let bytes = std::fs::read(path).map_err(|e| {
                SeqDexError::Indexer(crate::error::IndexerError::Io(e))
            })?;

            let records = indexer
                .index_file(path, file_no, &bytes, scanner)
                .map_err(SeqDexError::Indexer)?;

            for rec in records {
                if options.debug && store.get(&rec.id)?.is_some() {
                    warn!(id = %String::from_utf8_lossy(&rec.id), "identifier collision: later record overwrites earlier one");
                }
                store.put(&rec.id, &rec.descriptor.pack(variant))?;
            }
        }

        store.remove(META_SENTINEL)?;
        store.close()?;
        Ok(())
    }

    // ── Query surface (§4.8) ────────────────────────────────────────────────

    pub fn ids(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .store
            .iterate_keys()?
            .into_iter()
            .filter(|k| !is_meta_key(k))
            .collect())
    }

    pub fn contains(&self, id: &[u8]) -> Result<bool> {
        Ok(self.store.get(id)?.is_some())
    }

    pub fn length(&self, id: &[u8]) -> Result<u64> {
        Ok(self.descriptor(id)?.seq_length)
    }

    pub fn path(&self, id: &[u8]) -> Result<PathBuf> {
        let d = self.descriptor(id)?;
        self.registry
            .path(d.file_no)
            .map(Path::to_path_buf)
            .ok_or_else(|| SeqDexError::UnknownId(String::from_utf8_lossy(id).into_owned()))
    }

    /// `subseq` per §4.6: `query` may be a plain id or a compound id
    /// (`id:start,stop`). Explicit `start`/`stop` take precedence over a
    /// compound suffix embedded in `query`.
    pub fn subseq(
        &mut self,
        query: &str,
        start: Option<u64>,
        stop: Option<u64>,
    ) -> Result<(Vec<u8>, Strand)> {
        let (id, start, stop) = if start.is_none() && stop.is_none() {
            match coordinate::parse_compound_id(query) {
                Some((core, a, b)) => (core.to_owned(), Some(a), Some(b)),
                None => (query.to_owned(), None, None),
            }
        } else {
            (query.to_owned(), start, stop)
        };

        let d = self.descriptor(id.as_bytes())?;
        let (start, stop, strand) = coordinate::resolve_range(d.seq_length, start, stop);

        let path = self
            .registry
            .path(d.file_no)
            .ok_or_else(|| SeqDexError::UnknownId(id.clone()))?
            .to_path_buf();

        let handle = self.cache.acquire(&path)?;
        let mut file = handle.borrow_mut();
        let bytes = coordinate::extract_range(&mut *file, &d, start, stop)?;

        debug!(id = %id, start, stop, strand, len = bytes.len(), "subseq");
        Ok((bytes, strand))
    }

    /// Single-shot iteration over every `(id, payload)` pair in the index.
    pub fn stream(&mut self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let ids = self.ids()?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let query = String::from_utf8_lossy(&id).into_owned();
            let (bytes, _strand) = self.subseq(&query, None, None)?;
            out.push((id, bytes));
        }
        Ok(out)
    }

    fn descriptor(&self, id: &[u8]) -> Result<RecordDescriptor> {
        let packed = self
            .store
            .get(id)?
            .ok_or_else(|| SeqDexError::UnknownId(String::from_utf8_lossy(id).into_owned()))?;
        RecordDescriptor::unpack(self.variant, &packed)
            .ok_or_else(|| SeqDexError::UnknownId(String::from_utf8_lossy(id).into_owned()))
    }
}

impl Drop for SeqDex {
    fn drop(&mut self) {
        if self.options.clean {
            let _ = SledStore::unlink(self.store.path());
        }
    }
}

fn reconstruct_registry(store: &SledStore) -> std::result::Result<(CodecVariant, FileRegistry), StoreError> {
    let codec_bytes = store.get(META_CODEC)?;
    let variant = codec_bytes
        .and_then(|b| CodecVariant::from_meta_str(&String::from_utf8_lossy(&b)))
        .ok_or_else(|| StoreError::Unavailable {
            path: store.path().to_path_buf(),
            reason: "missing or invalid __codec__ meta key".to_owned(),
        })?;

    let mut registry = FileRegistry::new();
    for key in store.iterate_keys()? {
        if let Some(rest) = key.strip_prefix(b"__file_".as_slice()) {
            if let Some(rest) = rest.strip_suffix(b"__".as_slice()) {
                if let Ok(n) = String::from_utf8_lossy(rest).parse::<u8>() {
                    if let Some(path_bytes) = store.get(&key)? {
                        let path = PathBuf::from(String::from_utf8_lossy(&path_bytes).into_owned());
                        registry.insert_at(n, path);
                    }
                }
            }
        }
    }
    Ok((variant, registry))
}

fn resolve_sources(input: Input, options: &IndexOptions) -> Result<Vec<PathBuf>> {
    match input {
        Input::File(path) => {
            if !path.is_file() {
                return Err(SeqDexError::PathInvalid(path));
            }
            Ok(vec![absolute(&path)])
        }
        Input::Dir(dir) => {
            if !dir.is_dir() {
                return Err(SeqDexError::PathInvalid(dir));
            }
            let pattern = dir.join(&options.glob);
            let mut matches: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
                .map_err(|e| SeqDexError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .map(|p| absolute(&p))
                .collect();
            matches.sort();
            if matches.is_empty() {
                return Err(SeqDexError::NoMatchingFiles { dir, glob: options.glob.clone() });
            }
            Ok(matches)
        }
        Input::List(paths) => {
            if paths.is_empty() {
                return Err(SeqDexError::PathInvalid(PathBuf::new()));
            }
            for p in &paths {
                if !p.is_file() {
                    return Err(SeqDexError::PathInvalid(p.clone()));
                }
            }
            Ok(paths.iter().map(|p| absolute(p)).collect())
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Default index naming rules (§6): single file → `<path>.index`; directory
/// → `<dir>/directory.index`; arbitrary list → `fileset_<hex_md5>.index` in
/// the current working directory, keyed by the sorted absolute paths.
fn derive_index_path(sources: &[PathBuf], dir_hint: Option<&Path>, is_list: bool, options: &IndexOptions) -> PathBuf {
    if let Some(name) = &options.index_name {
        return PathBuf::from(name);
    }

    if let Some(dir) = dir_hint {
        return dir.join("directory.index");
    }

    if !is_list && sources.len() == 1 {
        let mut p = sources[0].clone().into_os_string();
        p.push(".index");
        return PathBuf::from(p);
    }

    let mut sorted: Vec<&PathBuf> = sources.iter().collect();
    sorted.sort();
    let mut hasher_input = String::new();
    for p in &sorted {
        hasher_input.push_str(&p.to_string_lossy());
        hasher_input.push('\n');
    }
    let digest = md5::compute(hasher_input.as_bytes());
    PathBuf::from(format!("fileset_{}.index", hex::encode(digest.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_fa(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn simple_extraction_scenario() {
        let dir = tempdir().unwrap();
        let fa = write_fa(dir.path(), "tiny.fa", b">chr1 foo\nAAAACCCC\nGGGGTTTT\nN\n");
        let idx = dir.path().join("tiny.index");
        let opts = IndexOptions::default().with_index_name(idx.to_string_lossy());

        let mut eng = SeqDex::open(Input::File(fa), opts).unwrap();
        assert_eq!(eng.length(b"chr1").unwrap(), 17);
        assert_eq!(eng.subseq("chr1", Some(1), Some(8)).unwrap().0, b"AAAACCCC");
        assert_eq!(eng.subseq("chr1", Some(5), Some(12)).unwrap().0, b"CCCCGGGG");
        assert_eq!(eng.subseq("chr1", Some(17), Some(17)).unwrap().0, b"N");
    }

    #[test]
    fn compound_id_scenario() {
        let dir = tempdir().unwrap();
        let fa = write_fa(dir.path(), "tiny.fa", b">chr1 foo\nAAAACCCC\nGGGGTTTT\nN\n");
        let idx = dir.path().join("tiny.index");
        let opts = IndexOptions::default().with_index_name(idx.to_string_lossy());

        let mut eng = SeqDex::open(Input::File(fa), opts).unwrap();
        let (bytes, strand) = eng.subseq("chr1:5,12", None, None).unwrap();
        assert_eq!(bytes, b"CCCCGGGG");
        assert_eq!(strand, 1);

        let (bytes, strand) = eng.subseq("chr1:12..5", None, None).unwrap();
        assert_eq!(bytes, b"CCCCGGGG");
        assert_eq!(strand, -1);
    }

    #[test]
    fn single_path_list_uses_fileset_naming_not_single_file_naming() {
        let sources = vec![PathBuf::from("/abs/a.fa")];
        let opts = IndexOptions::default();

        let file_mode = derive_index_path(&sources, None, false, &opts);
        let list_mode = derive_index_path(&sources, None, true, &opts);

        assert_eq!(file_mode, PathBuf::from("/abs/a.fa.index"));
        assert_ne!(
            list_mode, file_mode,
            "a one-element Input::List must still get the fileset_<hash>.index name, not the single-file rule"
        );
        assert!(list_mode.to_string_lossy().starts_with("fileset_"));
    }

    #[test]
    fn multi_file_last_write_wins() {
        let dir = tempdir().unwrap();
        let a = write_fa(dir.path(), "a.fa", b">chr1\nAAAA\n");
        let b = write_fa(dir.path(), "b.fa", b">chr1\nCCCC\n");
        let idx = dir.path().join("multi.index");
        let opts = IndexOptions::default().with_index_name(idx.to_string_lossy());

        let mut eng = SeqDex::open(Input::List(vec![a, b.clone()]), opts).unwrap();
        assert_eq!(eng.subseq("chr1", None, None).unwrap().0, b"CCCC");
        assert_eq!(eng.path(b"chr1").unwrap(), b.canonicalize().unwrap());
    }

    #[test]
    fn unknown_id_errors() {
        let dir = tempdir().unwrap();
        let fa = write_fa(dir.path(), "tiny.fa", b">chr1\nAAAA\n");
        let idx = dir.path().join("tiny.index");
        let opts = IndexOptions::default().with_index_name(idx.to_string_lossy());

        let mut eng = SeqDex::open(Input::File(fa), opts).unwrap();
        assert!(matches!(eng.subseq("nope", None, None), Err(SeqDexError::UnknownId(_))));
    }

    #[test]
    fn reindex_picks_up_changed_file() {
        let dir = tempdir().unwrap();
        let fa = write_fa(dir.path(), "tiny.fa", b">chr1\nAAAA\n");
        let idx = dir.path().join("tiny.index");
        let opts = IndexOptions::default().with_index_name(idx.to_string_lossy());

        {
            let eng = SeqDex::open(Input::File(fa.clone()), opts.clone()).unwrap();
            assert_eq!(eng.length(b"chr1").unwrap(), 4);
        }

        std::thread::sleep(std::time::Duration::from_millis(20));
        fs::write(&fa, b">chr1\nAAAAAA\n").unwrap();

        let eng = SeqDex::open(Input::File(fa), opts).unwrap();
        assert_eq!(eng.length(b"chr1").unwrap(), 6);
    }
}
