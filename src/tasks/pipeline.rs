use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::{ConfigError, TrainingConfig},
    data::{load_dataset, train_test_split, CorpusSchema, DatasetError},
    domain::{ClassCode, Dataset, Label},
    ml::{Classifier, Evaluation, FeatureVector, FitError, FitSummary, ModelPair, Vectorizer},
    serving::ReloadError,
    store::{ArtifactError, ArtifactStore, LockError, TrainingLock},
};

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub dataset_rows: usize,
    pub fake_rows: usize,
    pub real_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub features: usize,
    pub vocabulary_fingerprint: String,
    pub fit: FitSummary,
    pub evaluation: Evaluation,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("invalid training configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("classifier fit failed: {0}")]
    Fit(FitError),
    #[error("failed to persist artifacts: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("a training run is already in progress")]
    AlreadyRunning,
    #[error(transparent)]
    Lock(LockError),
    #[error("artifacts saved but serving state was not refreshed: {0}")]
    Reload(#[from] ReloadError),
}

impl From<LockError> for TrainError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Held { .. } => TrainError::AlreadyRunning,
            other => TrainError::Lock(other),
        }
    }
}

impl From<FitError> for TrainError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::SingleClass { label } => {
                TrainError::Dataset(DatasetError::SingleClass { label })
            }
            other => TrainError::Fit(other),
        }
    }
}

/// Loads the configured corpus, fits a vectorizer and classifier, and
/// commits them as a pair. Nothing is written unless every earlier step
/// succeeds.
pub fn train_and_persist(
    config: &TrainingConfig,
    store: &ArtifactStore,
) -> Result<TrainingReport, TrainError> {
    config.validate()?;
    let _lock = TrainingLock::try_acquire(store.root())?;

    tracing::info!(
        target: "training",
        dataset = %config.dataset_path.display(),
        max_features = config.max_features,
        test_size = config.test_size,
        seed = config.seed,
        "training started"
    );

    let schema = CorpusSchema {
        text_column: &config.text_column,
        label_column: &config.label_column,
    };
    let dataset = load_dataset(&config.dataset_path, schema)?;
    let (pair, report) = fit_pipeline(&dataset, config)?;
    store.save_pair(&pair)?;

    tracing::info!(
        target: "training",
        rows = report.dataset_rows,
        features = report.features,
        iterations = report.fit.iterations,
        converged = report.fit.converged,
        accuracy = ?report.evaluation.accuracy,
        precision = ?report.evaluation.precision,
        recall = ?report.evaluation.recall,
        "training finished"
    );
    Ok(report)
}

pub fn fit_pipeline(
    dataset: &Dataset,
    config: &TrainingConfig,
) -> Result<(ModelPair, TrainingReport), TrainError> {
    if dataset.is_empty() {
        return Err(DatasetError::Empty.into());
    }

    let vectorizer = Vectorizer::fit(dataset.texts(), config.max_features);
    let features = vectorizer.transform(dataset.texts());
    let samples: Vec<(FeatureVector, ClassCode)> =
        features.into_iter().zip(dataset.targets()).collect();

    let split = train_test_split(samples, config.test_size, config.seed);
    if split.train.is_empty() {
        return Err(DatasetError::NoTrainingRows {
            rows: dataset.len(),
            test_rows: split.test.len(),
        }
        .into());
    }
    let (train_x, train_y): (Vec<FeatureVector>, Vec<ClassCode>) = split.train.into_iter().unzip();

    let (classifier, fit) = Classifier::fit(
        &train_x,
        &train_y,
        vectorizer.dimension(),
        vectorizer.fingerprint(),
        &config.classifier,
    )?;

    let mut predictions = Vec::with_capacity(split.test.len());
    for (x, actual) in &split.test {
        let predicted = classifier
            .predict_class(x)
            .map_err(|err| TrainError::Fit(err.into()))?;
        predictions.push((*actual, predicted));
    }
    let evaluation = Evaluation::from_pairs(predictions);

    let report = TrainingReport {
        dataset_rows: dataset.len(),
        fake_rows: dataset.count(Label::Fake),
        real_rows: dataset.count(Label::Real),
        train_rows: train_x.len(),
        test_rows: split.test.len(),
        features: vectorizer.dimension(),
        vocabulary_fingerprint: format!("{:016x}", vectorizer.fingerprint()),
        fit,
        evaluation,
        completed_at: Utc::now(),
    };
    let pair = ModelPair::new(vectorizer, classifier).map_err(ArtifactError::from)?;
    Ok((pair, report))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use super::*;
    use crate::store::ArtifactKind;

    fn write_corpus(dir: &Path, rows: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.join("corpus.csv");
        let mut writer = csv::Writer::from_path(&path).unwrap();
        writer.write_record(["id", "title", "text", "label"]).unwrap();
        for (i, &(title, label)) in rows.iter().enumerate() {
            writer
                .write_record([i.to_string().as_str(), title, "body", label])
                .unwrap();
        }
        writer.flush().unwrap();
        path
    }

    fn rows() -> Vec<(&'static str, &'static str)> {
        let mut rows = Vec::new();
        for _ in 0..5 {
            rows.push(("shocking miracle cure they hide", "FAKE"));
            rows.push(("aliens secretly run the government", "FAKE"));
            rows.push(("senate approves the annual budget", "REAL"));
            rows.push(("central bank keeps interest rates", "REAL"));
        }
        rows
    }

    fn config(dataset: std::path::PathBuf) -> TrainingConfig {
        TrainingConfig {
            dataset_path: dataset,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn trains_and_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let report = train_and_persist(&config(write_corpus(dir.path(), &rows())), &store).unwrap();

        assert_eq!(report.dataset_rows, 20);
        assert_eq!(report.test_rows, 6);
        assert_eq!(report.train_rows, 14);
        assert_eq!(report.fake_rows, 10);
        assert!(report.evaluation.accuracy.is_some());
        assert!(store.exists(ArtifactKind::Vectorizer));
        assert!(store.exists(ArtifactKind::Classifier));
        assert!(store.load_pair().is_ok());
    }

    #[test]
    fn identical_runs_write_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = write_corpus(dir.path(), &rows());
        let a = ArtifactStore::new(dir.path().join("a"));
        let b = ArtifactStore::new(dir.path().join("b"));
        train_and_persist(&config(dataset.clone()), &a).unwrap();
        train_and_persist(&config(dataset), &b).unwrap();

        for kind in [ArtifactKind::Vectorizer, ArtifactKind::Classifier] {
            assert_eq!(fs::read(a.path(kind)).unwrap(), fs::read(b.path(kind)).unwrap());
        }
    }

    #[test]
    fn unknown_label_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let mut rows = rows();
        rows.push(("half true claim", "MOSTLY_TRUE"));

        let err = train_and_persist(&config(write_corpus(dir.path(), &rows)), &store).unwrap_err();
        assert!(matches!(err, TrainError::Dataset(DatasetError::UnknownLabel { .. })));
        assert!(!store.exists(ArtifactKind::Vectorizer));
        assert!(!store.exists(ArtifactKind::Classifier));
    }

    #[test]
    fn failed_run_keeps_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let good = write_corpus(dir.path(), &rows());
        train_and_persist(&config(good), &store).unwrap();
        let before = fs::read(store.path(ArtifactKind::Classifier)).unwrap();

        let bad = dir.path().join("bad.csv");
        fs::write(&bad, "title,text\nheadline,body\n").unwrap();
        let err = train_and_persist(&config(bad), &store).unwrap_err();
        assert!(matches!(err, TrainError::Dataset(DatasetError::MissingColumn { .. })));
        assert_eq!(fs::read(store.path(ArtifactKind::Classifier)).unwrap(), before);
    }

    #[test]
    fn single_class_training_split_is_a_dataset_error() {
        let dataset = Dataset::new(
            (0..10)
                .map(|i| crate::domain::LabeledExample {
                    text: format!("headline number {i}"),
                    label: Label::Real,
                })
                .collect(),
        );
        let err = fit_pipeline(&dataset, &TrainingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TrainError::Dataset(DatasetError::SingleClass { label: Label::Real })
        ));
    }

    #[test]
    fn single_row_dataset_leaves_nothing_to_train_on() {
        let dataset = Dataset::new(vec![crate::domain::LabeledExample {
            text: "lone headline".to_string(),
            label: Label::Fake,
        }]);
        let err = fit_pipeline(&dataset, &TrainingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TrainError::Dataset(DatasetError::NoTrainingRows { rows: 1, test_rows: 1 })
        ));
        assert!(err.to_string().contains("leaving none to train on"));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = fit_pipeline(&Dataset::default(), &TrainingConfig::default()).unwrap_err();
        assert!(matches!(err, TrainError::Dataset(DatasetError::Empty)));
    }

    #[test]
    fn invalid_config_is_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let config = TrainingConfig {
            test_size: 1.5,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            train_and_persist(&config, &store),
            Err(TrainError::Config(_))
        ));
    }

    #[test]
    fn held_lock_means_already_running() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let _held = TrainingLock::try_acquire(store.root()).unwrap();
        let err = train_and_persist(&config(write_corpus(dir.path(), &rows())), &store).unwrap_err();
        assert!(matches!(err, TrainError::AlreadyRunning));
    }
}
