//! SQLite-backed student storage used when `DATABASE_URL` is set.

use gradebook::grading::{
    EvaluationRecord, NewEvaluation, NewStudent, Student, StudentId, StudentRepository,
};
use gradebook::RepositoryError;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    attendance INTEGER NOT NULL DEFAULT 1,
    bonus_override REAL
);

CREATE TABLE IF NOT EXISTS evaluations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    score REAL NOT NULL,
    weight REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_evaluations_student ON evaluations(student_id);
"#;

pub(crate) struct SqliteStudentRepository {
    conn: Mutex<Connection>,
}

impl SqliteStudentRepository {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            RepositoryError::Unavailable(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::with_connection(conn)
    }

    pub(crate) fn in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(unavailable)?;
        conn.execute_batch(SCHEMA_SQL).map_err(unavailable)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection mutex poisoned".to_string()))
    }
}

fn unavailable(error: rusqlite::Error) -> RepositoryError {
    RepositoryError::Unavailable(error.to_string())
}

fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn student_from_row(row: &rusqlite::Row) -> rusqlite::Result<Student> {
    let attendance: i64 = row.get(3)?;
    Ok(Student {
        id: StudentId(row.get(0)?),
        code: row.get(1)?,
        name: row.get(2)?,
        attendance: attendance != 0,
        bonus_override: row.get(4)?,
    })
}

fn evaluation_from_row(row: &rusqlite::Row) -> rusqlite::Result<EvaluationRecord> {
    Ok(EvaluationRecord {
        id: row.get(0)?,
        student_id: StudentId(row.get(1)?),
        score: row.get(2)?,
        weight: row.get(3)?,
    })
}

impl StudentRepository for SqliteStudentRepository {
    fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, RepositoryError> {
        let conn = self.connection()?;
        conn.query_row(
            "SELECT id, code, name, attendance, bonus_override FROM students WHERE id = ?1",
            params![id.0],
            student_from_row,
        )
        .optional()
        .map_err(unavailable)
    }

    fn list(&self) -> Result<Vec<Student>, RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT id, code, name, attendance, bonus_override FROM students ORDER BY id")
            .map_err(unavailable)?;
        let rows = stmt.query_map([], student_from_row).map_err(unavailable)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(unavailable)
    }

    fn save(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO students (code, name, attendance) VALUES (?1, ?2, ?3)",
            params![student.code, student.name, student.attendance],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                RepositoryError::Conflict
            } else {
                unavailable(e)
            }
        })?;

        Ok(Student {
            id: StudentId(conn.last_insert_rowid() as u32),
            code: student.code,
            name: student.name,
            attendance: student.attendance,
            bonus_override: None,
        })
    }

    fn set_attendance(&self, id: StudentId, attended: bool) -> Result<(), RepositoryError> {
        let conn = self.connection()?;
        let changed = conn
            .execute(
                "UPDATE students SET attendance = ?1 WHERE id = ?2",
                params![attended, id.0],
            )
            .map_err(unavailable)?;
        if changed == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn set_bonus_override(
        &self,
        id: StudentId,
        points: Option<f64>,
    ) -> Result<(), RepositoryError> {
        let conn = self.connection()?;
        let changed = conn
            .execute(
                "UPDATE students SET bonus_override = ?1 WHERE id = ?2",
                params![points, id.0],
            )
            .map_err(unavailable)?;
        if changed == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn find_evaluations_by_student_id(
        &self,
        id: StudentId,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, student_id, score, weight FROM evaluations WHERE student_id = ?1 ORDER BY id",
            )
            .map_err(unavailable)?;
        let rows = stmt
            .query_map(params![id.0], evaluation_from_row)
            .map_err(unavailable)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(unavailable)
    }

    fn save_evaluation(
        &self,
        id: StudentId,
        evaluation: NewEvaluation,
    ) -> Result<EvaluationRecord, RepositoryError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO evaluations (student_id, score, weight) VALUES (?1, ?2, ?3)",
            params![id.0, evaluation.score, evaluation.weight],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                RepositoryError::NotFound
            } else {
                unavailable(e)
            }
        })?;

        Ok(EvaluationRecord {
            id: conn.last_insert_rowid() as u32,
            student_id: id,
            score: evaluation.score,
            weight: evaluation.weight,
        })
    }
}
