use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::domain::{EvaluationRecord, NewEvaluation, NewStudent, Student, StudentId};
use super::engine::{EngineConfig, GradeBreakdown, GradeEngine, GradeError};
use super::repository::StudentRepository;
use crate::repository::RepositoryError;

/// Use cases for the students/evaluations variant.
///
/// Every grade request replays the student's stored state into a fresh
/// [`GradeEngine`], so no engine is ever shared between requests.
/// Evaluation writes are serialized so the capacity check and the insert
/// observe the same stored set.
pub struct GradeService<R> {
    repository: Arc<R>,
    engine_config: EngineConfig,
    bonus_policy: AtomicBool,
    evaluation_writes: Mutex<()>,
}

impl<R> GradeService<R>
where
    R: StudentRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine_config: EngineConfig) -> Self {
        Self {
            repository,
            engine_config,
            bonus_policy: AtomicBool::new(false),
            evaluation_writes: Mutex::new(()),
        }
    }

    pub fn with_bonus_policy(self, enabled: bool) -> Self {
        self.set_bonus_policy(enabled);
        self
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    /// Toggle the institution-wide extra points policy.
    pub fn set_bonus_policy(&self, enabled: bool) {
        self.bonus_policy.store(enabled, Ordering::Release);
        info!(enabled, "institution bonus policy updated");
    }

    pub fn bonus_policy(&self) -> bool {
        self.bonus_policy.load(Ordering::Acquire)
    }

    pub fn register_student(&self, student: NewStudent) -> Result<Student, GradeServiceError> {
        if student.code.trim().is_empty() {
            return Err(GradeServiceError::InvalidStudent(
                "student code must not be empty",
            ));
        }
        if student.name.trim().is_empty() {
            return Err(GradeServiceError::InvalidStudent(
                "student name must not be empty",
            ));
        }

        let stored = self.repository.save(student)?;
        info!(student_id = %stored.id, code = %stored.code, "student registered");
        Ok(stored)
    }

    pub fn list_students(&self) -> Result<Vec<Student>, GradeServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn student(&self, id: StudentId) -> Result<Student, GradeServiceError> {
        self.repository
            .find_by_id(id)?
            .ok_or(GradeServiceError::StudentNotFound(id))
    }

    pub fn evaluations(&self, id: StudentId) -> Result<Vec<EvaluationRecord>, GradeServiceError> {
        let student = self.student(id)?;
        Ok(self.repository.find_evaluations_by_student_id(student.id)?)
    }

    /// Persist an evaluation once the engine accepts it for this student.
    pub fn record_evaluation(
        &self,
        id: StudentId,
        evaluation: NewEvaluation,
    ) -> Result<EvaluationRecord, GradeServiceError> {
        let _writes = self.evaluation_writes.lock().map_err(|_| {
            RepositoryError::Unavailable("evaluation write lock poisoned".to_string())
        })?;
        let student = self.student(id)?;
        let stored = self.repository.find_evaluations_by_student_id(student.id)?;

        let mut engine = self.engine_for(&student, &stored)?;
        engine.register_evaluation(student.id, evaluation.score, evaluation.weight)?;

        let record = self.repository.save_evaluation(student.id, evaluation)?;
        debug!(
            student_id = %student.id,
            evaluation_id = record.id,
            count = stored.len() + 1,
            "evaluation recorded"
        );
        Ok(record)
    }

    pub fn set_attendance(
        &self,
        id: StudentId,
        attended: bool,
    ) -> Result<Student, GradeServiceError> {
        let student = self.student(id)?;
        self.repository.set_attendance(student.id, attended)?;
        info!(student_id = %student.id, attended, "attendance recorded");
        self.student(id)
    }

    /// Set or clear the per-student bonus that overrides the institution policy.
    pub fn set_bonus_override(
        &self,
        id: StudentId,
        points: Option<f64>,
    ) -> Result<Student, GradeServiceError> {
        let student = self.student(id)?;
        self.repository.set_bonus_override(student.id, points)?;
        info!(student_id = %student.id, ?points, "bonus override updated");
        self.student(id)
    }

    pub fn final_grade(&self, id: StudentId) -> Result<GradeBreakdown, GradeServiceError> {
        let student = self.student(id)?;
        let evaluations = self.repository.find_evaluations_by_student_id(student.id)?;
        let engine = self.engine_for(&student, &evaluations)?;
        let breakdown = engine.calculate_final(student.id)?;

        debug!(
            student_id = %student.id,
            final_grade = breakdown.final_grade,
            "final grade computed"
        );
        Ok(breakdown)
    }

    fn engine_for(
        &self,
        student: &Student,
        evaluations: &[EvaluationRecord],
    ) -> Result<GradeEngine, GradeError> {
        let mut engine = GradeEngine::new(self.engine_config);
        engine.set_bonus_policy(self.bonus_policy());
        engine.set_attendance(student.id, student.attendance);
        if let Some(points) = student.bonus_override {
            engine.set_subject_bonus_override(student.id, points);
        }

        for record in evaluations {
            engine.register_evaluation(student.id, record.score, record.weight)?;
        }

        Ok(engine)
    }
}

/// Error raised by the grading service.
#[derive(Debug, thiserror::Error)]
pub enum GradeServiceError {
    #[error("{0}")]
    InvalidStudent(&'static str),
    #[error("student {0} does not exist")]
    StudentNotFound(StudentId),
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
