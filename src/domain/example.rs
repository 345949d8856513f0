use super::label::{ClassCode, Label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub text: String,
    pub label: Label,
}

/// Rows of a training corpus in file order. Built once per run, never mutated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    examples: Vec<LabeledExample>,
}

impl Dataset {
    pub fn new(examples: Vec<LabeledExample>) -> Self {
        Self { examples }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.examples.iter().map(|example| example.text.as_str())
    }

    pub fn targets(&self) -> Vec<ClassCode> {
        self.examples.iter().map(|example| example.label.code()).collect()
    }

    pub fn count(&self, label: Label) -> usize {
        self.examples
            .iter()
            .filter(|example| example.label == label)
            .count()
    }
}
