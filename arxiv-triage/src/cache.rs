use crate::types::ExternalId;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Set of ids already judged relevant, backed by an append-only text file.
///
/// The in-memory set is authoritative for the rest of the run once loaded;
/// the file is only ever appended to.
pub struct DedupCache {
    path: PathBuf,
    ids: HashSet<ExternalId>,
}

impl DedupCache {
    /// Load the cache, degrading to a cold (or partial) cache on I/O trouble.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut ids = HashSet::new();

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(stage = "cache", path = %path.display(), "No cache file yet, starting cold");
                return Self { path, ids };
            }
            Err(e) => {
                warn!(stage = "cache", path = %path.display(), error = %e, "Failed to open cache file, starting cold");
                return Self { path, ids };
            }
        };

        for (line_no, line) in BufReader::new(file).split(b'\n').enumerate() {
            match line {
                Ok(bytes) => {
                    let line = match String::from_utf8(bytes) {
                        Ok(line) => line,
                        Err(e) => {
                            warn!(
                                stage = "cache",
                                path = %path.display(),
                                line = line_no + 1,
                                error = %e,
                                "Skipping malformed cache line"
                            );
                            continue;
                        }
                    };
                    let token = line.trim();
                    if token.is_empty() {
                        continue;
                    }
                    ids.insert(ExternalId::new(token));
                }
                Err(e) => {
                    warn!(
                        stage = "cache",
                        path = %path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Failed reading cache file, keeping {} ids parsed so far",
                        ids.len()
                    );
                    break;
                }
            }
        }

        info!(stage = "cache", path = %path.display(), "Loaded {} cached ids", ids.len());
        Self { path, ids }
    }

    pub fn contains(&self, id: &ExternalId) -> bool {
        self.ids.contains(id)
    }

    /// Add `id` to the set and append it to the backing file.
    ///
    /// Returns `false` when the id was already known, in which case nothing
    /// is written. A failed append is logged; the in-memory insert stands.
    pub fn record(&mut self, id: ExternalId) -> bool {
        if !self.ids.insert(id.clone()) {
            debug!(stage = "cache", id = %id, "Id already cached");
            return false;
        }

        match self.append(&id) {
            Ok(()) => debug!(stage = "cache", id = %id, "Recorded id"),
            Err(e) => warn!(
                stage = "cache",
                id = %id,
                path = %self.path.display(),
                error = %e,
                "Failed to append id to cache file; it will be reclassified next run"
            ),
        }
        true
    }

    fn append(&self, id: &ExternalId) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", id)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_cold_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DedupCache::load(dir.path().join("absent.txt"));
        assert!(cache.is_empty());
    }

    #[test]
    fn load_folds_duplicates_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.txt");
        fs::write(&path, "2401.00001\n\n   \n2401.00001\n 2401.00002 \n").unwrap();

        let cache = DedupCache::load(&path);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&ExternalId::new("2401.00001")));
        assert!(cache.contains(&ExternalId::new("2401.00002")));
    }

    #[test]
    fn malformed_line_does_not_hide_later_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.txt");
        fs::write(&path, b"2401.00001\n\xff\xfe\n2401.00002\r\n").unwrap();

        let cache = DedupCache::load(&path);
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&ExternalId::new("2401.00001")));
        assert!(cache.contains(&ExternalId::new("2401.00002")));
    }

    #[test]
    fn record_writes_through_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("seen.txt");

        let mut cache = DedupCache::load(&path);
        assert!(cache.record(ExternalId::new("2402.11111")));
        assert!(!cache.record(ExternalId::new("2402.11111")));
        assert_eq!(cache.len(), 1);

        assert_eq!(fs::read_to_string(&path).unwrap(), "2402.11111\n");
        let reloaded = DedupCache::load(&path);
        assert!(reloaded.contains(&ExternalId::new("2402.11111")));
    }

    #[test]
    fn record_appends_without_rewriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.txt");
        fs::write(&path, "2401.00001\n2401.00001\n").unwrap();

        let mut cache = DedupCache::load(&path);
        cache.record(ExternalId::new("2401.00003"));

        assert_eq!(fs::read_to_string(&path).unwrap(), "2401.00001\n2401.00001\n2401.00003\n");
    }

    #[test]
    fn append_failure_keeps_in_memory_entry() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let mut cache = DedupCache::load(dir.path());
        assert!(cache.record(ExternalId::new("2403.33333")));
        assert!(cache.contains(&ExternalId::new("2403.33333")));
    }
}
