use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ml::{Classifier, ModelPair, PairMismatch, Vectorizer};

const MAGIC: &str = "claimcheck-artifact";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Vectorizer,
    Classifier,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "vectorizer",
            ArtifactKind::Classifier => "classifier",
        }
    }

    /// Location relative to the store root.
    pub fn relative_path(&self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "vectorizer/vectorizer.cbor",
            ArtifactKind::Classifier => "model/model.cbor",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Artifact: Serialize + DeserializeOwned {
    const KIND: ArtifactKind;

    fn is_consistent(&self) -> bool {
        true
    }
}

impl Artifact for Vectorizer {
    const KIND: ArtifactKind = ArtifactKind::Vectorizer;

    fn is_consistent(&self) -> bool {
        self.is_well_formed()
    }
}

impl Artifact for Classifier {
    const KIND: ArtifactKind = ArtifactKind::Classifier;

    fn is_consistent(&self) -> bool {
        self.is_well_formed()
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{kind} artifact not found at {path}")]
    Missing { kind: ArtifactKind, path: PathBuf },
    #[error("{kind} artifact at {path} is corrupt: {reason}")]
    Corrupt {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },
    #[error("i/o error on {kind} artifact {path}: {source}")]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("artifacts are not from the same training run: {0}")]
    Mismatch(#[from] PairMismatch),
}

impl ArtifactError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            ArtifactError::Missing { .. } => "missing",
            ArtifactError::Corrupt { .. } => "corrupt",
            ArtifactError::Io { .. } => "io",
            ArtifactError::Mismatch(_) => "mismatch",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ArtifactError::Missing { .. })
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    magic: &'a str,
    kind: ArtifactKind,
    format_version: u32,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    magic: String,
    kind: ArtifactKind,
    format_version: u32,
    payload: serde_cbor::Value,
}

pub fn encode<T: Artifact>(artifact: &T) -> Result<Vec<u8>, serde_cbor::Error> {
    serde_cbor::to_vec(&EnvelopeRef {
        magic: MAGIC,
        kind: T::KIND,
        format_version: FORMAT_VERSION,
        payload: artifact,
    })
}

/// Decodes an envelope, returning a human-readable reason on any mismatch.
pub fn decode<T: Artifact>(bytes: &[u8]) -> Result<T, String> {
    let envelope: Envelope =
        serde_cbor::from_slice(bytes).map_err(|err| format!("invalid envelope: {err}"))?;
    if envelope.magic != MAGIC {
        return Err(format!("unexpected magic `{}`", envelope.magic));
    }
    if envelope.kind != T::KIND {
        return Err(format!("holds a {} artifact", envelope.kind));
    }
    if envelope.format_version != FORMAT_VERSION {
        return Err(format!(
            "unsupported format version {}",
            envelope.format_version
        ));
    }
    let artifact: T = serde_cbor::value::from_value(envelope.payload)
        .map_err(|err| format!("invalid payload: {err}"))?;
    if !artifact.is_consistent() {
        return Err("payload fails consistency checks".to_string());
    }
    Ok(artifact)
}

/// Persists fitted artifacts as one file per kind under a root directory.
///
/// Writes go to a temp file in the destination directory and are renamed
/// into place, so a concurrent `load` sees either the old or the new file.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.relative_path())
    }

    pub fn exists(&self, kind: ArtifactKind) -> bool {
        self.path(kind).is_file()
    }

    pub fn load<T: Artifact>(&self) -> Result<T, ArtifactError> {
        let kind = T::KIND;
        let path = self.path(kind);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ArtifactError::Missing { kind, path });
            }
            Err(source) => return Err(ArtifactError::Io { kind, path, source }),
        };
        let artifact = decode::<T>(&bytes)
            .map_err(|reason| ArtifactError::Corrupt {
                kind,
                path: path.clone(),
                reason,
            })?;
        tracing::debug!(target: "artifacts", %kind, path = %path.display(), bytes = bytes.len(), "artifact loaded");
        Ok(artifact)
    }

    pub fn save<T: Artifact>(&self, artifact: &T) -> Result<(), ArtifactError> {
        let staged = self.stage(artifact)?;
        self.commit::<T>(staged)
    }

    pub fn load_pair(&self) -> Result<ModelPair, ArtifactError> {
        let vectorizer = self.load::<Vectorizer>()?;
        let classifier = self.load::<Classifier>()?;
        Ok(ModelPair::new(vectorizer, classifier)?)
    }

    /// Stages both files before renaming either. The committed vectorizer is
    /// kept as a backup until the classifier lands, so a failed commit puts
    /// the previous pair back instead of leaving a half-new one on disk.
    pub fn save_pair(&self, pair: &ModelPair) -> Result<(), ArtifactError> {
        let staged_vectorizer = self.stage(pair.vectorizer())?;
        let staged_classifier = self.stage(pair.classifier())?;

        let backup = self.backup(ArtifactKind::Vectorizer)?;
        if let Err(err) = self.commit::<Vectorizer>(staged_vectorizer) {
            self.discard(backup.as_deref());
            return Err(err);
        }
        if let Err(err) = self.commit::<Classifier>(staged_classifier) {
            self.restore(ArtifactKind::Vectorizer, backup.as_deref());
            return Err(err);
        }
        self.discard(backup.as_deref());

        tracing::info!(
            target: "artifacts",
            root = %self.root.display(),
            features = pair.vectorizer().dimension(),
            "artifact pair saved"
        );
        Ok(())
    }

    fn stage<T: Artifact>(&self, artifact: &T) -> Result<NamedTempFile, ArtifactError> {
        let kind = T::KIND;
        let path = self.path(kind);
        let io_err = |source: io::Error| ArtifactError::Io {
            kind,
            path: path.clone(),
            source,
        };

        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(io_err)?;

        let bytes = encode(artifact).map_err(|err| io_err(io::Error::other(err)))?;
        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{kind}."))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?;
        staged.write_all(&bytes).map_err(io_err)?;
        staged.as_file().sync_all().map_err(io_err)?;
        Ok(staged)
    }

    fn backup_path(&self, kind: ArtifactKind) -> PathBuf {
        let path = self.path(kind);
        let dir = path.parent().unwrap_or(&self.root);
        dir.join(format!(".{kind}.prev"))
    }

    /// Links the committed file of `kind` to a side path. `None` when there is
    /// nothing committed yet.
    fn backup(&self, kind: ArtifactKind) -> Result<Option<PathBuf>, ArtifactError> {
        let path = self.path(kind);
        if !path.is_file() {
            return Ok(None);
        }
        let backup = self.backup_path(kind);
        let io_err = |source: io::Error| ArtifactError::Io {
            kind,
            path: backup.clone(),
            source,
        };
        remove_if_present(&backup).map_err(io_err)?;
        if fs::hard_link(&path, &backup).is_err() {
            fs::copy(&path, &backup).map_err(io_err)?;
        }
        Ok(Some(backup))
    }

    fn restore(&self, kind: ArtifactKind, backup: Option<&Path>) {
        let path = self.path(kind);
        let restored = match backup {
            Some(backup) => fs::rename(backup, &path),
            None => remove_if_present(&path),
        };
        match restored {
            Ok(()) => tracing::warn!(target: "artifacts", %kind, path = %path.display(), "pair commit failed; previous artifact restored"),
            Err(err) => tracing::error!(
                target: "artifacts",
                %kind,
                path = %path.display(),
                error = %err,
                "pair commit failed and the previous artifact could not be restored"
            ),
        }
    }

    fn discard(&self, backup: Option<&Path>) {
        if let Some(backup) = backup {
            if let Err(err) = remove_if_present(backup) {
                tracing::warn!(target: "artifacts", path = %backup.display(), error = %err, "stale artifact backup left behind");
            }
        }
    }

    fn commit<T: Artifact>(&self, staged: NamedTempFile) -> Result<(), ArtifactError> {
        let kind = T::KIND;
        let path = self.path(kind);
        staged.persist(&path).map_err(|err| ArtifactError::Io {
            kind,
            path: path.clone(),
            source: err.error,
        })?;
        tracing::debug!(target: "artifacts", %kind, path = %path.display(), "artifact committed");
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
