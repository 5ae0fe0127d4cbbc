//! Freshness controller — mtime-based rebuild partitioning (§4.5).
//!
//! Decides, purely from filesystem timestamps, whether the persisted index
//! can be trusted as-is, needs a partial rebuild (only the files that
//! changed), or a full rebuild (index missing, corrupt, or `reindex` forced).

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::debug;

/// Outcome of comparing the index against the source files it covers.
#[derive(Debug)]
pub struct FreshnessPlan {
    /// The index artifact does not exist yet, or was found mid-build and
    /// must be discarded.
    pub index_absent: bool,
    /// Files whose mtime is newer than the index's and must be re-scanned.
    /// Empty and `index_absent == false` means the index can be opened
    /// read-only with no indexing pass at all.
    pub updated: Vec<PathBuf>,
}

impl FreshnessPlan {
    pub fn needs_rebuild(&self) -> bool {
        self.index_absent || !self.updated.is_empty()
    }
}

fn mtime(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from(SystemTime::UNIX_EPOCH)
}

/// Compare `index_path`'s mtime against every file in `sources`.
///
/// `index_in_progress` reflects whether the `__sentinel__` meta-key was
/// still set to `in_progress` on a prior attempt — if so the index is
/// treated as absent (crash recovery, §4.5's "indexing_in_progress"
/// sentinel).
pub fn evaluate(
    index_path: &Path,
    sources: &[PathBuf],
    force_reindex: bool,
    index_in_progress: bool,
) -> FreshnessPlan {
    if force_reindex {
        debug!(path = %index_path.display(), "freshness: forced reindex requested");
        return FreshnessPlan { index_absent: true, updated: sources.to_vec() };
    }

    if index_in_progress {
        debug!(path = %index_path.display(), "freshness: found in-progress sentinel, treating index as absent");
        return FreshnessPlan { index_absent: true, updated: sources.to_vec() };
    }

    let index_mtime = match mtime(index_path) {
        Some(t) => t,
        None => {
            debug!(path = %index_path.display(), "freshness: index absent");
            return FreshnessPlan { index_absent: true, updated: sources.to_vec() };
        }
    };

    let updated: Vec<PathBuf> = sources
        .iter()
        .filter(|src| mtime(src).unwrap_or_else(epoch) > index_mtime)
        .cloned()
        .collect();

    debug!(
        path = %index_path.display(),
        stale_count = updated.len(),
        total = sources.len(),
        "freshness: evaluated"
    );

    FreshnessPlan { index_absent: false, updated }
}
