use std::fmt;

use serde::{Deserialize, Serialize};

use super::engine::Evaluation;

/// Canonical key the grade engine files evaluations under.
///
/// Numeric and textual identifiers collapse to the same string form, so `7`,
/// `7u64` and `"7"` all address one subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn canonical(raw: impl fmt::Display) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self::canonical(value)
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&SubjectId> for SubjectId {
    fn from(value: &SubjectId) -> Self {
        value.clone()
    }
}

impl From<u32> for SubjectId {
    fn from(value: u32) -> Self {
        Self::canonical(value)
    }
}

impl From<u64> for SubjectId {
    fn from(value: u64) -> Self {
        Self::canonical(value)
    }
}

impl From<i64> for SubjectId {
    fn from(value: i64) -> Self {
        Self::canonical(value)
    }
}

impl From<StudentId> for SubjectId {
    fn from(value: StudentId) -> Self {
        Self::canonical(value.0)
    }
}

/// Storage identifier for a persisted student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub u32);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted student along with the grading flags kept next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub code: String,
    pub name: String,
    pub attendance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_override: Option<f64>,
}

/// Registration payload; storage assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub code: String,
    pub name: String,
    #[serde(default = "attended_by_default")]
    pub attendance: bool,
}

fn attended_by_default() -> bool {
    true
}

/// Persisted evaluation row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: u32,
    pub student_id: StudentId,
    pub score: f64,
    pub weight: f64,
}

impl EvaluationRecord {
    pub fn evaluation(&self) -> Evaluation {
        Evaluation::new(self.score, self.weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewEvaluation {
    pub score: f64,
    pub weight: f64,
}
