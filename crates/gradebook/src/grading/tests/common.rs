use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::grading::domain::{
    EvaluationRecord, NewEvaluation, NewStudent, Student, StudentId,
};
use crate::grading::engine::EngineConfig;
use crate::grading::repository::StudentRepository;
use crate::grading::{grading_router, GradeService};
use crate::repository::RepositoryError;

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig {
        max_evaluations_per_subject: 3,
        attendance_penalty: 2.0,
        default_extra_points: 1.0,
    }
}

pub(super) fn new_student(code: &str, name: &str) -> NewStudent {
    NewStudent {
        code: code.to_string(),
        name: name.to_string(),
        attendance: true,
    }
}

pub(super) fn evaluation(score: f64, weight: f64) -> NewEvaluation {
    NewEvaluation { score, weight }
}

pub(super) fn build_service() -> (GradeService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = GradeService::new(repository.clone(), engine_config());
    (service, repository)
}

/// Service with one registered student holding two evaluations.
pub(super) fn seeded_service() -> (GradeService<MemoryRepository>, StudentId) {
    let (service, _) = build_service();
    let student = service
        .register_student(new_student("A-01", "Ana Torres"))
        .expect("student registers");
    service
        .record_evaluation(student.id, evaluation(12.0, 50.0))
        .expect("first evaluation");
    service
        .record_evaluation(student.id, evaluation(18.0, 50.0))
        .expect("second evaluation");
    (service, student.id)
}

#[derive(Default)]
struct MemoryState {
    students: BTreeMap<StudentId, Student>,
    evaluations: Vec<EvaluationRecord>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub(super) fn evaluation_count(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .evaluations
            .len()
    }
}

impl StudentRepository for MemoryRepository {
    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.students.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Student>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.students.values().cloned().collect())
    }

    fn save(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.students.values().any(|stored| stored.code == student.code) {
            return Err(RepositoryError::Conflict);
        }
        let id = StudentId(guard.students.len() as u32 + 1);
        let stored = Student {
            id,
            code: student.code,
            name: student.name,
            attendance: student.attendance,
            bonus_override: None,
        };
        guard.students.insert(id, stored.clone());
        Ok(stored)
    }

    fn set_attendance(&self, id: StudentId, attended: bool) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let student = guard.students.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        student.attendance = attended;
        Ok(())
    }

    fn set_bonus_override(
        &self,
        id: StudentId,
        points: Option<f64>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let student = guard.students.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        student.bonus_override = points;
        Ok(())
    }

    fn find_evaluations_by_student_id(
        &self,
        id: StudentId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .evaluations
            .iter()
            .filter(|record| record.student_id == id)
            .copied()
            .collect())
    }

    fn save_evaluation(
        &self,
        id: StudentId,
        evaluation: NewEvaluation,
    ) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if !guard.students.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        let record = EvaluationRecord {
            id: guard.evaluations.len() as u32 + 1,
            student_id: id,
            score: evaluation.score,
            weight: evaluation.weight,
        };
        guard.evaluations.push(record);
        Ok(record)
    }
}

/// Memory storage whose evaluation reads take a few milliseconds, widening the
/// gap between a capacity check and the insert that follows it.
#[derive(Default, Clone)]
pub(super) struct SlowReadRepository {
    inner: MemoryRepository,
}

impl SlowReadRepository {
    pub(super) fn evaluation_count(&self) -> usize {
        self.inner.evaluation_count()
    }
}

impl StudentRepository for SlowReadRepository {
    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, RepositoryError> {
        self.inner.find_by_id(id)
    }

    fn list(&self) -> Result<Vec<Student>, RepositoryError> {
        self.inner.list()
    }

    fn save(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        self.inner.save(student)
    }

    fn set_attendance(&self, id: StudentId, attended: bool) -> Result<(), RepositoryError> {
        self.inner.set_attendance(id, attended)
    }

    fn set_bonus_override(
        &self,
        id: StudentId,
        points: Option<f64>,
    ) -> Result<(), RepositoryError> {
        self.inner.set_bonus_override(id, points)
    }

    fn find_evaluations_by_student_id(
        &self,
        id: StudentId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let records = self.inner.find_evaluations_by_student_id(id)?;
        thread::sleep(Duration::from_millis(5));
        Ok(records)
    }

    fn save_evaluation(
        &self,
        id: StudentId,
        evaluation: NewEvaluation,
    ) -> Result<EvaluationRecord, RepositoryError> {
        self.inner.save_evaluation(id, evaluation)
    }
}

pub(super) struct UnavailableRepository;

impl StudentRepository for UnavailableRepository {
    fn find_by_id(&self, _id: StudentId) -> Result<Option<Student>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Student>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _student: NewStudent) -> Result<Student, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_attendance(&self, _id: StudentId, _attended: bool) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_bonus_override(
        &self,
        _id: StudentId,
        _points: Option<f64>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_evaluations_by_student_id(
        &self,
        _id: StudentId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_evaluation(
        &self,
        _id: StudentId,
        _evaluation: NewEvaluation,
    ) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn grading_router_with_service(
    service: GradeService<MemoryRepository>,
) -> axum::Router {
    grading_router(Arc::new(service))
}
