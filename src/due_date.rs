use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// When a task has to be finished.
///
/// Variants are declared in sort order: `Asap` sorts before any concrete date, and tasks without a
/// deadline sort last. Concrete dates compare chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DueDate {
    Asap,
    On(NaiveDate),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid due date '{input}' (expected None, ASAP or YYYY-MM-DD)")]
pub struct DueDateParseError {
    input: String,
}

impl DueDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DueDate::On(date) => Some(*date),
            DueDate::Asap | DueDate::None => None,
        }
    }

    pub fn is_dated(&self) -> bool {
        matches!(self, DueDate::On(_))
    }
}

impl From<NaiveDate> for DueDate {
    fn from(date: NaiveDate) -> Self {
        DueDate::On(date)
    }
}

impl FromStr for DueDate {
    type Err = DueDateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "None" | "" => Ok(DueDate::None),
            "ASAP" => Ok(DueDate::Asap),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(DueDate::On)
                .map_err(|_| DueDateParseError {
                    input: s.to_string(),
                }),
        }
    }
}

impl TryFrom<String> for DueDate {
    type Error = DueDateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DueDate> for String {
    fn from(value: DueDate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::None => write!(f, "None"),
            DueDate::Asap => write!(f, "ASAP"),
            DueDate::On(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}
