pub mod corpus;
pub mod splitter;

pub use corpus::{load_dataset, read_dataset, CorpusSchema, DatasetError};
pub use splitter::{train_test_split, Split};
