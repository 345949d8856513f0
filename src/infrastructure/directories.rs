use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::{config::DirectoryConfig, store::ArtifactKind};

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub artifact_dir: PathBuf,
}

pub fn ensure_directories(cfg: &DirectoryConfig) -> Result<ResolvedPaths> {
    let logs_dir = ensure_dir(&cfg.logs_dir)?;
    let artifact_dir = ensure_dir(&cfg.artifact_dir)?;
    for kind in [ArtifactKind::Vectorizer, ArtifactKind::Classifier] {
        if let Some(parent) = artifact_dir.join(kind.relative_path()).parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let probe_file = artifact_dir.join(".write-test");
    fs::write(&probe_file, b"ok")
        .with_context(|| format!("artifact directory {} is not writable", artifact_dir.display()))?;
    fs::remove_file(&probe_file)?;
    Ok(ResolvedPaths {
        logs_dir,
        artifact_dir,
    })
}

fn ensure_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create directory {}", path))?;
    }
    Ok(dir.canonicalize().unwrap_or(dir))
}
