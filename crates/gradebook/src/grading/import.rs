use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::SubjectId;
use super::engine::{GradeBreakdown, GradeEngine, GradeError};

#[derive(Debug)]
pub enum EvaluationImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Grade { line: u64, source: GradeError },
}

impl std::fmt::Display for EvaluationImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationImportError::Io(err) => write!(f, "failed to read evaluations: {}", err),
            EvaluationImportError::Csv(err) => write!(f, "invalid evaluation CSV data: {}", err),
            EvaluationImportError::Grade { line, source } => {
                write!(f, "evaluation on line {} rejected: {}", line, source)
            }
        }
    }
}

impl std::error::Error for EvaluationImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvaluationImportError::Io(err) => Some(err),
            EvaluationImportError::Csv(err) => Some(err),
            EvaluationImportError::Grade { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for EvaluationImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for EvaluationImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Engine populated from a `student_id,score,weight[,attended]` export.
#[derive(Debug)]
pub struct ImportedGradebook {
    engine: GradeEngine,
    subjects: Vec<SubjectId>,
}

impl ImportedGradebook {
    pub fn engine(&self) -> &GradeEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GradeEngine {
        &mut self.engine
    }

    /// Subjects in the order they first appeared in the export.
    pub fn subjects(&self) -> &[SubjectId] {
        &self.subjects
    }

    pub fn breakdowns(&self) -> Vec<(SubjectId, Result<GradeBreakdown, GradeError>)> {
        self.subjects
            .iter()
            .map(|subject| (subject.clone(), self.engine.calculate_final(subject)))
            .collect()
    }
}

pub struct EvaluationCsvImporter;

impl EvaluationCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        engine: GradeEngine,
    ) -> Result<ImportedGradebook, EvaluationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, engine)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        mut engine: GradeEngine,
    ) -> Result<ImportedGradebook, EvaluationImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut subjects: Vec<SubjectId> = Vec::new();

        for (index, row) in csv_reader.deserialize::<EvaluationRow>().enumerate() {
            let row = row?;
            let subject = SubjectId::from(row.student_id);
            if !subjects.contains(&subject) {
                subjects.push(subject.clone());
            }

            if let Some(attended) = row.attended {
                engine.set_attendance(&subject, attended);
            }
            engine
                .register_evaluation(&subject, row.score, row.weight)
                .map_err(|source| EvaluationImportError::Grade {
                    line: index as u64 + 2,
                    source,
                })?;
        }

        Ok(ImportedGradebook { engine, subjects })
    }
}

#[derive(Debug, Deserialize)]
struct EvaluationRow {
    student_id: String,
    score: f64,
    weight: f64,
    #[serde(default)]
    attended: Option<bool>,
}
