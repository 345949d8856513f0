use std::{
    fs,
    path::{Path, PathBuf},
};

use claimcheck::config::TrainingConfig;

const REAL_TITLES: [&str; 7] = [
    "Senate passes annual defense budget",
    "Central bank keeps interest rates unchanged",
    "Governor signs infrastructure bill into law",
    "Supreme Court hears arguments on voting rights",
    "Unemployment rate falls to lowest level in years",
    "President meets allies at economic summit",
    "Congress debates new healthcare proposal",
];

const FAKE_TITLES: [&str; 3] = [
    "Shocking miracle cure doctors don't want you to know",
    "Aliens secretly control the world government",
    "You won't believe what this celebrity said about vaccines",
];

/// 100 rows, 70 REAL and 30 FAKE, with extra columns the loader must drop.
pub fn write_news_corpus(dir: &Path) -> PathBuf {
    let path = dir.join("fake_or_real_news.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["", "title", "text", "label"]).unwrap();
    for i in 0..100usize {
        let (title, label) = if i % 10 < 7 {
            (REAL_TITLES[i % REAL_TITLES.len()], "REAL")
        } else {
            (FAKE_TITLES[i % FAKE_TITLES.len()], "FAKE")
        };
        writer
            .write_record([i.to_string().as_str(), title, "full article body", label])
            .unwrap();
    }
    writer.flush().unwrap();
    path
}

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn training_config(dataset: PathBuf) -> TrainingConfig {
    TrainingConfig {
        dataset_path: dataset,
        ..TrainingConfig::default()
    }
}
