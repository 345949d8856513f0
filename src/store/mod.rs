pub mod artifacts;
pub mod lock;

pub use artifacts::{Artifact, ArtifactError, ArtifactKind, ArtifactStore};
pub use lock::{LockError, TrainingLock};
