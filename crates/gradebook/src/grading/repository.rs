use super::domain::{EvaluationRecord, NewEvaluation, NewStudent, Student, StudentId};
use crate::repository::RepositoryError;

/// Storage port for students and their evaluations.
///
/// Writers addressing a missing student return `RepositoryError::NotFound`.
pub trait StudentRepository: Send + Sync {
    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, RepositoryError>;
    fn list(&self) -> Result<Vec<Student>, RepositoryError>;
    fn save(&self, student: NewStudent) -> Result<Student, RepositoryError>;
    fn set_attendance(&self, id: StudentId, attended: bool) -> Result<(), RepositoryError>;
    fn set_bonus_override(
        &self,
        id: StudentId,
        points: Option<f64>,
    ) -> Result<(), RepositoryError>;
    fn find_evaluations_by_student_id(
        &self,
        id: StudentId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError>;
    fn save_evaluation(
        &self,
        id: StudentId,
        evaluation: NewEvaluation,
    ) -> Result<EvaluationRecord, RepositoryError>;
}
