//! Students, evaluations and the weighted grade calculation engine.

pub mod domain;
pub mod engine;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    EvaluationRecord, NewEvaluation, NewStudent, Student, StudentId, SubjectId,
};
pub use engine::{
    BonusSource, BreakdownDetails, EngineConfig, EngineConfigError, Evaluation, GradeBreakdown,
    GradeEngine, GradeError,
};
pub use import::{EvaluationCsvImporter, EvaluationImportError, ImportedGradebook};
pub use repository::StudentRepository;
pub use router::{grading_router, AttendancePayload, BonusOverridePayload, BonusPolicyPayload};
pub use service::{GradeService, GradeServiceError};
