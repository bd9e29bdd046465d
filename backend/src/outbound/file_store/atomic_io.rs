//! Whole-document rewrites that never leave a half-written file behind.
//!
//! Each write goes to a hidden sibling temp file which is synced and then
//! renamed over the target.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use super::FileStoreError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` inside `dir` with `contents`.
pub(super) fn write_atomic(
    dir: &Dir,
    file_name: &str,
    contents: &str,
) -> Result<(), FileStoreError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{suffix}.{counter}", std::process::id());

    write_temp(dir, &tmp_name, contents).map_err(|err| FileStoreError::write(&tmp_name, err))?;
    if let Err(err) = replace(dir, &tmp_name, file_name) {
        // The temp file is garbage either way.
        drop(dir.remove_file(&tmp_name));
        return Err(FileStoreError::write(file_name, err));
    }
    sync_dir(dir);
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    if written.is_err() {
        drop(file);
        drop(dir.remove_file(tmp_name));
    }
    written
}

#[cfg(windows)]
fn replace(dir: &Dir, tmp_name: &str, file_name: &str) -> io::Result<()> {
    // Windows rename refuses to overwrite.
    match dir.remove_file(file_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, file_name)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, tmp_name: &str, file_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, file_name)
}

fn sync_dir(dir: &Dir) {
    // Best effort; the rename already happened.
    if let Err(err) = dir.open(".").and_then(|handle| handle.sync_all()) {
        debug!(error = %err, "data directory sync failed");
    }
}
