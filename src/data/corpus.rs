use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::domain::{Dataset, Label, LabeledExample, UnknownLabelError};

/// Column names a training file must carry. Every other column is ignored.
#[derive(Debug, Clone, Copy)]
pub struct CorpusSchema<'a> {
    pub text_column: &'a str,
    pub label_column: &'a str,
}

impl Default for CorpusSchema<'static> {
    fn default() -> Self {
        Self {
            text_column: "title",
            label_column: "label",
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed dataset record{}: {source}", line_suffix(.line))]
    Malformed {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },
    #[error("dataset is missing required column `{column}`")]
    MissingColumn { column: String },
    #[error("record at line {line} has no value for column `{column}`")]
    MissingField { line: u64, column: String },
    #[error("record at line {line}: {source}")]
    UnknownLabel {
        line: u64,
        #[source]
        source: UnknownLabelError,
    },
    #[error("dataset contains no rows")]
    Empty,
    #[error("dataset has {rows} rows and all {test_rows} were held out for evaluation, leaving none to train on")]
    NoTrainingRows { rows: usize, test_rows: usize },
    #[error("training rows only contain the {label} class")]
    SingleClass { label: Label },
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|line| format!(" at line {line}"))
        .unwrap_or_default()
}

pub fn load_dataset(path: &Path, schema: CorpusSchema<'_>) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset(file, schema)?;
    tracing::info!(
        target: "training",
        path = %path.display(),
        rows = dataset.len(),
        fake = dataset.count(Label::Fake),
        real = dataset.count(Label::Real),
        "dataset loaded"
    );
    Ok(dataset)
}

pub fn read_dataset<R: Read>(reader: R, schema: CorpusSchema<'_>) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| DatasetError::Malformed { line: Some(1), source })?
        .clone();
    let text_idx = column_index(&headers, schema.text_column)?;
    let label_idx = column_index(&headers, schema.label_column)?;

    let mut examples = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| DatasetError::Malformed {
            line: source.position().map(|pos| pos.line()),
            source,
        })?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();

        let text = record.get(text_idx).ok_or_else(|| DatasetError::MissingField {
            line,
            column: schema.text_column.to_string(),
        })?;
        let raw_label = record.get(label_idx).ok_or_else(|| DatasetError::MissingField {
            line,
            column: schema.label_column.to_string(),
        })?;
        let label = raw_label
            .parse::<Label>()
            .map_err(|source| DatasetError::UnknownLabel { line, source })?;

        examples.push(LabeledExample {
            text: text.to_string(),
            label,
        });
    }

    Ok(Dataset::new(examples))
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| DatasetError::MissingColumn {
            column: column.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<Dataset, DatasetError> {
        read_dataset(input.as_bytes(), CorpusSchema::default())
    }

    #[test]
    fn keeps_only_text_and_label_in_row_order() {
        let dataset = read(
            "id,title,text,label\n\
             1,First headline,body one,REAL\n\
             2,\"Second, with comma\",body two,FAKE\n",
        )
        .unwrap();

        assert_eq!(
            dataset.examples(),
            &[
                LabeledExample {
                    text: "First headline".to_string(),
                    label: Label::Real,
                },
                LabeledExample {
                    text: "Second, with comma".to_string(),
                    label: Label::Fake,
                },
            ]
        );
    }

    #[test]
    fn text_passes_through_unmodified() {
        let dataset = read("title,label\n\"  MiXeD Case!!  \",REAL\n").unwrap();
        assert_eq!(dataset.examples()[0].text, "  MiXeD Case!!  ");
    }

    #[test]
    fn missing_label_column_fails_fast() {
        let err = read("title,text\nheadline,body\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { column } if column == "label"));
    }

    #[test]
    fn missing_text_column_fails_fast() {
        let err = read("headline,label\nsomething,FAKE\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { column } if column == "title"));
    }

    #[test]
    fn unknown_label_reports_its_line() {
        let err = read("title,label\nok,REAL\nbad,MAYBE\n").unwrap_err();
        match err {
            DatasetError::UnknownLabel { line, source } => {
                assert_eq!(line, 3);
                assert_eq!(source, UnknownLabelError("MAYBE".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_row_is_a_missing_field() {
        let err = read("title,label\nonly title\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingField { line: 2, .. }));
    }

    #[test]
    fn custom_schema_selects_other_columns() {
        let schema = CorpusSchema {
            text_column: "claim",
            label_column: "verdict",
        };
        let dataset = read_dataset("claim,verdict\nmoon is cheese,FAKE\n".as_bytes(), schema)
            .unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.examples()[0].label, Label::Fake);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_dataset(Path::new("/nonexistent/corpus.csv"), CorpusSchema::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
