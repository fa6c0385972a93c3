//! Filesystem fixtures for exercising the sweeper against real directories

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A duration of `n` whole days
pub fn days(n: u64) -> Duration {
    Duration::from_secs(n * 24 * 60 * 60)
}

/// Set a file or directory's modification time
pub fn set_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
    File::open(path)?.set_times(FileTimes::new().set_modified(modified))
}

/// Create `parent/name` holding `payload_bytes` of file data and backdate it by `age`.
///
/// The payload is split between a top-level file and a nested directory so
/// that size accounting has to recurse. The directory's own mtime is set
/// last, after its contents exist.
pub fn create_aged_dir(
    parent: &Path,
    name: &str,
    payload_bytes: usize,
    age: Duration,
) -> io::Result<PathBuf> {
    let dir = parent.join(name);
    let nested = dir.join("segments");
    fs::create_dir_all(&nested)?;

    let top = payload_bytes / 2;
    fs::write(dir.join("index.bin"), vec![0u8; top])?;
    fs::write(nested.join("chunk-000.bin"), vec![0u8; payload_bytes - top])?;

    let modified = SystemTime::now()
        .checked_sub(age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    set_modified(&dir, modified)?;

    Ok(dir)
}
