use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::{
    ml::{check_pair, Classifier, ModelPair, Vectorizer},
    store::{ArtifactError, ArtifactKind, ArtifactStore},
};

#[derive(Debug)]
pub enum Slot<T> {
    Loaded(T),
    Absent(AbsentReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsentReason {
    pub reason: &'static str,
    pub detail: String,
}

impl From<&ArtifactError> for AbsentReason {
    fn from(err: &ArtifactError) -> Self {
        Self {
            reason: err.reason_code(),
            detail: err.to_string(),
        }
    }
}

impl AbsentReason {
    fn not_loaded() -> Self {
        Self {
            reason: "not_loaded",
            detail: "artifact has not been loaded".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ArtifactStatus {
    Loaded,
    Absent(AbsentReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServingStatus {
    pub ready: bool,
    pub vectorizer: ArtifactStatus,
    pub classifier: ArtifactStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("model or vectorizer not found")]
pub struct ServiceUnavailableError {
    pub vectorizer_missing: bool,
    pub classifier_missing: bool,
}

#[derive(Debug, Error)]
#[error("reload failed, previous artifacts kept: {0}")]
pub struct ReloadError(#[from] pub ArtifactError);

/// Immutable view of the artifacts a serving process answers with.
#[derive(Debug)]
pub struct ServingSnapshot {
    vectorizer: Slot<Vectorizer>,
    classifier: Slot<Classifier>,
}

impl ServingSnapshot {
    pub fn empty() -> Self {
        Self {
            vectorizer: Slot::Absent(AbsentReason::not_loaded()),
            classifier: Slot::Absent(AbsentReason::not_loaded()),
        }
    }

    pub fn ready(pair: ModelPair) -> Self {
        let (vectorizer, classifier) = pair.into_parts();
        Self {
            vectorizer: Slot::Loaded(vectorizer),
            classifier: Slot::Loaded(classifier),
        }
    }

    /// Builds a snapshot from two independent load attempts. A classifier
    /// that does not match the loaded vectorizer is kept out of service.
    pub fn from_loads(
        vectorizer: Result<Vectorizer, ArtifactError>,
        classifier: Result<Classifier, ArtifactError>,
    ) -> Self {
        let classifier = match (&vectorizer, classifier) {
            (Ok(v), Ok(c)) => match check_pair(v, &c) {
                Ok(()) => Ok(c),
                Err(mismatch) => Err(ArtifactError::from(mismatch)),
            },
            (_, other) => other,
        };
        Self {
            vectorizer: into_slot(vectorizer),
            classifier: into_slot(classifier),
        }
    }

    pub fn model(&self) -> Result<(&Vectorizer, &Classifier), ServiceUnavailableError> {
        match (&self.vectorizer, &self.classifier) {
            (Slot::Loaded(v), Slot::Loaded(c)) => Ok((v, c)),
            (v, c) => Err(ServiceUnavailableError {
                vectorizer_missing: matches!(v, Slot::Absent(_)),
                classifier_missing: matches!(c, Slot::Absent(_)),
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model().is_ok()
    }

    pub fn status(&self) -> ServingStatus {
        ServingStatus {
            ready: self.is_ready(),
            vectorizer: slot_status(&self.vectorizer),
            classifier: slot_status(&self.classifier),
        }
    }
}

fn into_slot<T>(result: Result<T, ArtifactError>) -> Slot<T> {
    match result {
        Ok(artifact) => Slot::Loaded(artifact),
        Err(err) => Slot::Absent(AbsentReason::from(&err)),
    }
}

fn slot_status<T>(slot: &Slot<T>) -> ArtifactStatus {
    match slot {
        Slot::Loaded(_) => ArtifactStatus::Loaded,
        Slot::Absent(reason) => ArtifactStatus::Absent(reason.clone()),
    }
}

/// Process-wide holder of the active snapshot.
///
/// Readers clone the current `Arc` and work on it without holding the lock;
/// `reload` builds a complete new snapshot first and then swaps the pointer,
/// so a reader sees either the old pair or the new one.
#[derive(Debug)]
pub struct ServingState {
    store: ArtifactStore,
    current: RwLock<Arc<ServingSnapshot>>,
}

impl ServingState {
    /// Startup load. Each artifact is attempted on its own; failures leave
    /// that slot absent instead of failing the process.
    pub fn load(store: ArtifactStore) -> Self {
        let vectorizer = store.load::<Vectorizer>();
        let classifier = store.load::<Classifier>();
        log_startup_load(ArtifactKind::Vectorizer, &store, vectorizer.as_ref().err());
        log_startup_load(ArtifactKind::Classifier, &store, classifier.as_ref().err());

        let snapshot = ServingSnapshot::from_loads(vectorizer, classifier);
        if let Slot::Absent(reason) = &snapshot.classifier {
            if reason.reason == "mismatch" {
                tracing::warn!(target: "serving", detail = %reason.detail, "classifier does not match vectorizer");
            }
        }
        tracing::info!(target: "serving", ready = snapshot.is_ready(), "serving state initialized");

        Self {
            store,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn with_snapshot(store: ArtifactStore, snapshot: ServingSnapshot) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<ServingSnapshot> {
        self.current.read().clone()
    }

    pub fn status(&self) -> ServingStatus {
        self.snapshot().status()
    }

    /// Replaces the active snapshot only when both artifacts load and match.
    pub fn reload(&self) -> Result<Arc<ServingSnapshot>, ReloadError> {
        let pair = match self.store.load_pair() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(target: "serving", error = %err, "reload failed; keeping current artifacts");
                return Err(ReloadError(err));
            }
        };
        let features = pair.vectorizer().dimension();
        let snapshot = Arc::new(ServingSnapshot::ready(pair));
        *self.current.write() = snapshot.clone();
        tracing::info!(target: "serving", features, "serving state reloaded");
        Ok(snapshot)
    }
}

fn log_startup_load(kind: ArtifactKind, store: &ArtifactStore, err: Option<&ArtifactError>) {
    match err {
        None => tracing::info!(target: "serving", %kind, path = %store.path(kind).display(), "artifact loaded"),
        Some(err) if err.is_missing() => {
            tracing::warn!(target: "serving", %kind, path = %store.path(kind).display(), "no artifact found")
        }
        Some(err) => tracing::warn!(target: "serving", %kind, error = %err, "artifact could not be loaded"),
    }
}
