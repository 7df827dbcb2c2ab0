use gradebook::characters::{
    Character, CharacterId, CharacterRepository, Comment, CommentRepository, NewCharacter,
    NewComment,
};
use gradebook::grading::{
    EvaluationRecord, NewEvaluation, NewStudent, Student, StudentId, StudentRepository,
};
use gradebook::products::{NewProduct, Product, ProductId, ProductRepository};
use gradebook::RepositoryError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StudentState {
    students: BTreeMap<StudentId, Student>,
    evaluations: Vec<EvaluationRecord>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryStudentRepository {
    state: Arc<Mutex<StudentState>>,
}

impl StudentRepository for InMemoryStudentRepository {
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
        if guard
            .students
            .values()
            .any(|stored| stored.code == student.code)
        {
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
        let student = guard
            .students
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        student.attendance = attended;
        Ok(())
    }

    fn set_bonus_override(
        &self,
        id: StudentId,
        points: Option<f64>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let student = guard
            .students
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryCharacterRepository {
    records: Arc<Mutex<Vec<Character>>>,
}

impl CharacterRepository for InMemoryCharacterRepository {
    fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|character| character.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Character>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn save(&self, character: NewCharacter) -> Result<Character, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = Character {
            id: CharacterId(guard.len() as u32 + 1),
            name: character.name,
            village: character.village,
            signature_technique: character.signature_technique,
        };
        guard.push(stored.clone());
        Ok(stored)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCommentRepository {
    records: Arc<Mutex<Vec<Comment>>>,
}

impl CommentRepository for InMemoryCommentRepository {
    fn find_by_character_id(&self, id: CharacterId) -> Result<Vec<Comment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|comment| comment.character_id == id)
            .cloned()
            .collect())
    }

    fn save(&self, comment: NewComment) -> Result<Comment, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = Comment {
            id: guard.len() as u32 + 1,
            character_id: comment.character_id,
            author: comment.author,
            text: comment.text,
        };
        guard.push(stored.clone());
        Ok(stored)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProductRepository {
    records: Arc<Mutex<Vec<Product>>>,
}

impl ProductRepository for InMemoryProductRepository {
    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|product| product.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn save(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = Product {
            id: ProductId(guard.len() as u32 + 1),
            name: product.name,
            description: product.description,
            price: product.price,
            merchant_id: product.merchant_id,
        };
        guard.push(stored.clone());
        Ok(stored)
    }
}
