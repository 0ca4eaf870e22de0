// Cache store for reading and writing the repository list.
// Handles line-delimited JSON, TTL checking on file mtime, and replace-on-commit writes.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::printer::{JsonPrinter, Printer};
use crate::record::RepoRecord;

use super::paths::parent_dir;

/// How long a cache file is trusted after it was last written: 24 hours.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub type Result<T> = std::result::Result<T, CacheError>;

/// Read the cached repository list if the file is fresh.
pub fn load(path: &Path) -> Result<Vec<RepoRecord>> {
    load_at(path, SystemTime::now())
}

/// Read the cached repository list, judging freshness against `now`.
///
/// The file is stat'ed before it is opened, so an expired cache is never read.
/// Parsing is all-or-nothing: the first bad line fails the whole load.
pub fn load_at(path: &Path, now: SystemTime) -> Result<Vec<RepoRecord>> {
    let metadata = fs::metadata(path).map_err(|e| not_found_or_io(path, e))?;

    // An mtime in the future reads as age zero.
    let age = now
        .duration_since(metadata.modified()?)
        .unwrap_or(Duration::ZERO);
    if age >= CACHE_TTL {
        return Err(CacheError::Expired(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| not_found_or_io(path, e))?;
    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let record: RepoRecord = serde_json::from_str(&line).map_err(|source| {
            CacheError::Parse {
                line: index + 1,
                source,
            }
        })?;
        if !record.is_valid() {
            return Err(CacheError::InvalidRecord { line: index + 1 });
        }
        records.push(record);
    }

    debug!(path = %path.display(), count = records.len(), "loaded cache");
    Ok(records)
}

/// Replace the cache file with `records`, one JSON line each, in order.
pub fn store(path: &Path, records: &[RepoRecord]) -> Result<()> {
    let mut pending = PendingCache::create(path)?;

    let written = {
        let mut printer = JsonPrinter::new(&mut pending);
        records.iter().try_for_each(|record| printer.print(record))
    };

    match written {
        Ok(()) => pending.commit(),
        Err(err) => {
            if let Err(cleanup) = pending.discard() {
                warn!(error = %cleanup, "cannot remove temporary cache file");
            }
            Err(CacheError::Io(err))
        }
    }
}

/// Delete the cache file. Returns whether a file was actually removed.
pub fn remove(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn not_found_or_io(path: &Path, err: io::Error) -> CacheError {
    if err.kind() == io::ErrorKind::NotFound {
        CacheError::NotFound(path.to_path_buf())
    } else {
        CacheError::Io(err)
    }
}

/// A cache file being written.
///
/// Lines go to a uniquely named temp file in the cache's directory; `commit`
/// renames it over the real path, so readers only ever see one writer's
/// complete cache and concurrent runs resolve as last commit wins.
pub struct PendingCache {
    writer: BufWriter<NamedTempFile>,
    path: PathBuf,
}

impl PendingCache {
    /// Open a fresh temp file next to `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let temp = NamedTempFile::new_in(parent_dir(path))?;
        Ok(Self {
            writer: BufWriter::new(temp),
            path: path.to_path_buf(),
        })
    }

    /// Flush everything written and move it into place.
    pub fn commit(self) -> Result<()> {
        let temp = self.writer.into_inner().map_err(|e| e.into_error())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), "cache written");
        Ok(())
    }

    /// Throw the temp file away, leaving any existing cache untouched.
    pub fn discard(self) -> Result<()> {
        let (temp, _unflushed) = self.writer.into_parts();
        temp.close()?;
        Ok(())
    }
}

impl Write for PendingCache {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> PathBuf {
        dir.path().join(".ghls_cache")
    }

    fn dir_entries(dir: &TempDir) -> usize {
        fs::read_dir(dir.path()).unwrap().count()
    }

    fn write_lines(path: &Path, lines: &[String]) {
        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_store_and_load_three_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        let records = vec![
            sample_record("alpha", 1),
            sample_record("beta", 22),
            sample_record("gamma", 333),
        ];

        store(&path, &records).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, records);
        assert_eq!(dir_entries(&temp_dir), 1);
    }

    #[test]
    fn test_store_writes_one_line_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);

        store(&path, &[sample_record("a", 1), sample_record("b", 2)]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""fullname":"testuser/a""#));
        assert!(contents.ends_with('\n'));
    }

    #[test]
    fn test_store_truncates_previous_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);

        store(&path, &[sample_record("a", 1), sample_record("b", 2)]).unwrap();
        store(&path, &[sample_record("c", 3)]).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "c");
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load(&cache_in(&temp_dir)).unwrap_err();
        assert!(matches!(err, CacheError::NotFound(_)));
        assert!(err.is_miss());
    }

    #[test]
    fn test_load_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        fs::write(&path, "").unwrap();

        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_expiry_boundary() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        store(&path, &[sample_record("a", 1)]).unwrap();
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();

        let just_fresh = mtime + CACHE_TTL - Duration::from_millis(1);
        assert_eq!(load_at(&path, just_fresh).unwrap().len(), 1);

        let err = load_at(&path, mtime + CACHE_TTL).unwrap_err();
        assert!(matches!(err, CacheError::Expired(_)));

        let err = load_at(&path, mtime + CACHE_TTL * 3).unwrap_err();
        assert!(matches!(err, CacheError::Expired(_)));
    }

    #[test]
    fn test_old_mtime_expires() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        store(&path, &[sample_record("a", 1)]).unwrap();

        let yesterday = SystemTime::now() - Duration::from_secs(25 * 60 * 60);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(yesterday)
            .unwrap();

        assert!(matches!(load(&path), Err(CacheError::Expired(_))));
    }

    #[test]
    fn test_expired_file_is_not_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        fs::write(&path, "not json at all\n").unwrap();
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();

        // Garbage content, but the TTL check wins.
        let err = load_at(&path, mtime + CACHE_TTL).unwrap_err();
        assert!(matches!(err, CacheError::Expired(_)));
    }

    #[test]
    fn test_parse_failure_returns_no_partial_result() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        let mut lines: Vec<String> = (0..5)
            .map(|i| serde_json::to_string(&sample_record(&format!("r{}", i), i)).unwrap())
            .collect();
        lines[2] = r#"{"name": "broken""#.to_string();
        write_lines(&path, &lines);

        match load(&path) {
            Err(CacheError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_full_name_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        let good = sample_record("ok", 1);
        let mut bad = sample_record("bad", 2);
        bad.full_name.clear();
        write_lines(
            &path,
            &[
                serde_json::to_string(&good).unwrap(),
                serde_json::to_string(&bad).unwrap(),
            ],
        );

        let err = load(&path).unwrap_err();
        assert!(matches!(err, CacheError::InvalidRecord { line: 2 }));
        assert!(!err.is_miss());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        store(&path, &[sample_record("a", 1)]).unwrap();

        assert!(remove(&path).unwrap());
        assert!(!path.exists());
        assert!(!remove(&path).unwrap());
    }

    #[test]
    fn test_discard_keeps_existing_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        store(&path, &[sample_record("old", 1)]).unwrap();

        let mut pending = PendingCache::create(&path).unwrap();
        writeln!(pending, "partial").unwrap();
        pending.discard().unwrap();

        assert_eq!(dir_entries(&temp_dir), 1);
        assert_eq!(load(&path).unwrap()[0].name, "old");
    }

    #[test]
    fn test_overlapping_writers_do_not_mix() {
        let temp_dir = TempDir::new().unwrap();
        let path = cache_in(&temp_dir);
        let mut first = PendingCache::create(&path).unwrap();
        let mut second = PendingCache::create(&path).unwrap();

        {
            let mut printer = JsonPrinter::new(&mut first);
            for i in 0..3 {
                printer.print(&sample_record(&format!("a{}", i), i)).unwrap();
            }
        }
        JsonPrinter::new(&mut second)
            .print(&sample_record("b0", 0))
            .unwrap();

        first.commit().unwrap();
        assert_eq!(load(&path).unwrap().len(), 3);

        second.commit().unwrap();
        let names: Vec<String> = load(&path).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b0".to_string()]);
        assert_eq!(dir_entries(&temp_dir), 1);
    }
}
