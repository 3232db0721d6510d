//! Filesystem helpers used by configuration persistence.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;

/// Retry budget of [`wait_for_file_mtime_change`], in 1 ms steps.
const MTIME_WAIT_TRIES: u32 = 1000;

/// Creates the file if missing and bumps its mtime to now.
pub fn touch_file(path: &Path) -> io::Result<()> {
	let file = OpenOptions::new().create(true).append(true).open(path)?;
	file.set_modified(SystemTime::now())
}

/// Blocks until the file's mtime visibly differs from its current value.
///
/// On filesystems with coarse timestamp granularity an in-place rewrite can
/// leave the mtime unchanged, which would defeat mtime-based reload
/// detection. Touching in a short sleep loop forces a visible change. A
/// missing file is a no-op success; a file whose mtime never advances
/// surfaces [`io::ErrorKind::TimedOut`] instead of hanging.
pub fn wait_for_file_mtime_change(path: &Path) -> io::Result<()> {
	let old = match fs::metadata(path) {
		Ok(meta) => meta.modified()?,
		Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
		Err(err) => return Err(err),
	};
	for _ in 0..MTIME_WAIT_TRIES {
		touch_file(path)?;
		if fs::metadata(path)?.modified()? != old {
			return Ok(());
		}
		thread::sleep(Duration::from_millis(1));
	}
	Err(io::Error::new(
		io::ErrorKind::TimedOut,
		format!("mtime of {} did not advance", path.display()),
	))
}

/// Atomically replaces the file at `path` with `contents`.
///
/// The contents are written to a temporary file in the destination
/// directory and renamed over the target, so readers observe either the
/// old or the new contents, never a partial write. Permissions of an
/// existing destination are preserved on unix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
	let dir = match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() => dir,
		_ => Path::new("."),
	};
	let mut tmp = NamedTempFile::new_in(dir)?;
	tmp.write_all(contents)?;
	tmp.flush()?;
	#[cfg(unix)]
	if let Ok(meta) = fs::metadata(path) {
		fs::set_permissions(tmp.path(), meta.permissions())?;
	}
	tmp.persist(path).map_err(|err| err.error)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_touch_creates_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("touched.ini");
		touch_file(&path).unwrap();
		assert!(path.is_file());
	}

	#[test]
	fn test_wait_on_missing_file_is_noop() {
		let dir = tempfile::tempdir().unwrap();
		wait_for_file_mtime_change(&dir.path().join("absent.ini")).unwrap();
	}

	#[test]
	fn test_wait_advances_mtime() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("clock.ini");
		fs::write(&path, "x").unwrap();
		let before = fs::metadata(&path).unwrap().modified().unwrap();
		wait_for_file_mtime_change(&path).unwrap();
		let after = fs::metadata(&path).unwrap().modified().unwrap();
		assert_ne!(before, after);
	}

	#[test]
	fn test_write_atomic_replaces_contents() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.ini");
		fs::write(&path, "old").unwrap();
		write_atomic(&path, b"new").unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "new");
	}

	#[test]
	fn test_write_atomic_creates_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("fresh.ini");
		write_atomic(&path, b"contents").unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap(), "contents");
	}
}
