use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "FAKE")]
    Fake,
    #[serde(rename = "REAL")]
    Real,
}

/// Integer class code used as the classifier target. `0` is FAKE, `1` is REAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassCode(u8);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown label `{0}`, expected FAKE or REAL")]
pub struct UnknownLabelError(pub String);

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fake => "FAKE",
            Label::Real => "REAL",
        }
    }

    pub fn code(self) -> ClassCode {
        match self {
            Label::Fake => ClassCode::FAKE,
            Label::Real => ClassCode::REAL,
        }
    }

    pub fn from_code(code: ClassCode) -> Self {
        if code == ClassCode::REAL {
            Label::Real
        } else {
            Label::Fake
        }
    }
}

impl ClassCode {
    pub const FAKE: ClassCode = ClassCode(0);
    pub const REAL: ClassCode = ClassCode(1);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl FromStr for Label {
    type Err = UnknownLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FAKE" => Ok(Label::Fake),
            "REAL" => Ok(Label::Real),
            other => Err(UnknownLabelError(other.to_string())),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn encode(label: &str) -> Result<ClassCode, UnknownLabelError> {
    label.parse::<Label>().map(Label::code)
}

pub fn decode(code: ClassCode) -> Label {
    Label::from_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_inverts_encode_for_both_labels() {
        for label in ["FAKE", "REAL"] {
            let code = encode(label).unwrap();
            assert_eq!(decode(code).as_str(), label);
        }
    }

    #[test]
    fn codes_are_fixed() {
        assert_eq!(encode("FAKE").unwrap().value(), 0);
        assert_eq!(encode("REAL").unwrap().value(), 1);
    }

    #[test]
    fn unknown_labels_are_rejected() {
        for label in ["fake", "Real", "", "UNKNOWN", " REAL", "0"] {
            let err = encode(label).unwrap_err();
            assert_eq!(err, UnknownLabelError(label.to_string()));
        }
    }

    #[test]
    fn label_serializes_as_symbol() {
        let json = serde_json::to_string(&Label::Fake).unwrap();
        assert_eq!(json, "\"FAKE\"");
    }
}
