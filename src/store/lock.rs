use std::{
    fs::{self, File, OpenOptions},
    io::{self, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    process,
};

use chrono::Utc;
use fs2::FileExt;
use serde::Serialize;
use thiserror::Error;

const LOCK_FILENAME: &str = ".train.lock";

/// Exclusive claim on an artifact root for the duration of a training run.
/// Released on drop. The lock file itself is left in place.
#[derive(Debug)]
pub struct TrainingLock {
    file: File,
    path: PathBuf,
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("training lock {path} is held by another process")]
    Held { path: PathBuf },
    #[error("failed to take training lock {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Serialize)]
struct LockInfo {
    pid: u32,
    started_at: i64,
}

impl TrainingLock {
    pub fn try_acquire(root: &Path) -> Result<Self, LockError> {
        let path = root.join(LOCK_FILENAME);
        let io_err = |source: io::Error| LockError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(root).map_err(io_err)?;
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(io_err)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                return Err(LockError::Held { path });
            }
            Err(err) => return Err(io_err(err)),
        }

        write_lock_info(&mut file).map_err(io_err)?;
        tracing::debug!(target: "training", path = %path.display(), pid = process::id(), "training lock acquired");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TrainingLock {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            tracing::warn!(
                target: "training",
                path = %self.path.display(),
                error = %err,
                "failed to release training lock"
            );
        }
    }
}

fn write_lock_info(file: &mut File) -> io::Result<()> {
    let info = LockInfo {
        pid: process::id(),
        started_at: Utc::now().timestamp_millis(),
    };
    let payload = serde_json::to_vec(&info).map_err(io::Error::other)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&payload)?;
    file.sync_all()
}
