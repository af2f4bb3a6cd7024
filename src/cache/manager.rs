//! Hour-granular disk cache for raw forecast payloads
//!
//! Entries live at `<cache_dir>/<YYYYMMDD>/<location>-<HH>.json`. One entry is
//! valid for one clock hour; pruning drops the previous hour's entry and the
//! whole previous date directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};

/// Identifies one cached payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Location query string, e.g. "lat=49.2&lon=16.6"
    pub location: String,
    pub date: NaiveDate,
    /// Hour of day (0-23)
    pub hour: u32,
}

impl CacheKey {
    pub fn new(location: impl Into<String>, date: NaiveDate, hour: u32) -> Self {
        Self {
            location: location.into(),
            date,
            hour,
        }
    }

    /// Key of the preceding hour on the same date, if there is one
    pub fn previous_hour(&self) -> Option<CacheKey> {
        let hour = self.hour.checked_sub(1)?;
        Some(CacheKey::new(self.location.clone(), self.date, hour))
    }

    /// File-system safe file name for this entry
    fn file_name(&self) -> String {
        let location: String = self
            .location
            .chars()
            .map(|c| match c {
                '&' => '_',
                c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '=') => c,
                _ => '_',
            })
            .collect();
        format!("{}-{:02}.json", location, self.hour)
    }
}

/// Storage for raw payloads keyed by location, date and hour
pub trait PayloadCache {
    /// Returns the stored payload, or `None` on a miss
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>>;

    fn put(&self, key: &CacheKey, payload: &[u8]) -> io::Result<()>;

    /// Removes entries made stale by `key`: the previous hour of the same
    /// date and everything stored for the previous date
    fn prune(&self, key: &CacheKey) -> io::Result<()>;
}

/// Manages reading and writing cached payloads to disk
#[derive(Debug, Clone)]
pub struct DiskCache {
    /// Directory where date partitions are stored
    cache_dir: PathBuf,
}

impl DiskCache {
    /// Creates a cache rooted at the given directory
    ///
    /// The directory is created lazily on the first write.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory holding all entries for one date
    fn partition_dir(&self, date: NaiveDate) -> PathBuf {
        self.cache_dir.join(date.format("%Y%m%d").to_string())
    }

    /// Returns the path to the cache file for the given key
    fn cache_path(&self, key: &CacheKey) -> PathBuf {
        self.partition_dir(key.date).join(key.file_name())
    }
}

impl PayloadCache for DiskCache {
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        fs::read(self.cache_path(key)).ok()
    }

    fn put(&self, key: &CacheKey, payload: &[u8]) -> io::Result<()> {
        fs::create_dir_all(self.partition_dir(key.date))?;
        fs::write(self.cache_path(key), payload)
    }

    fn prune(&self, key: &CacheKey) -> io::Result<()> {
        if let Some(previous) = key.previous_hour() {
            match fs::remove_file(self.cache_path(&previous)) {
                Ok(()) => tracing::debug!("Removed cache entry for hour {:02}", previous.hour),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        let yesterday = self.partition_dir(key.date - Duration::days(1));
        match fs::remove_dir_all(&yesterday) {
            Ok(()) => {
                tracing::debug!("Removed cache partition {}", yesterday.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
