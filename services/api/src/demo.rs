use clap::Args;
use gradebook::characters::{
    CharacterRepository, CharacterService, CommentRepository, CommentService, NewCharacter,
    NewComment,
};
use gradebook::config::ConfigError;
use gradebook::error::AppError;
use gradebook::grading::{
    BonusSource, EngineConfig, EngineConfigError, EvaluationCsvImporter, GradeEngine, GradeService,
    ImportedGradebook, NewEvaluation, NewStudent, StudentRepository,
};
use gradebook::products::{NewProduct, ProductRepository, ProductService};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct GradeArgs {
    /// CSV export with `student_id,score,weight[,attended]` columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Grant the default extra points to every student without an override
    #[arg(long)]
    pub(crate) all_years_teachers: bool,
    /// Points subtracted when a student missed the attendance requirement
    #[arg(long)]
    pub(crate) attendance_penalty: Option<f64>,
    /// Extra points granted by the institution-wide policy
    #[arg(long)]
    pub(crate) extra_points: Option<f64>,
    /// Maximum evaluations accepted per student
    #[arg(long)]
    pub(crate) max_evaluations: Option<usize>,
    /// Student identifiers to mark as absent (repeatable)
    #[arg(long = "absent")]
    pub(crate) absent: Vec<String>,
}

impl GradeArgs {
    fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let defaults = EngineConfig::default();
        let config = EngineConfig {
            max_evaluations_per_subject: self
                .max_evaluations
                .unwrap_or(defaults.max_evaluations_per_subject),
            attendance_penalty: self
                .attendance_penalty
                .unwrap_or(defaults.attendance_penalty),
            default_extra_points: self.extra_points.unwrap_or(defaults.default_extra_points),
        };
        config.validate().map_err(|err| ConfigError::InvalidNumber {
            variable: match err {
                EngineConfigError::ZeroCapacity => "--max-evaluations",
                EngineConfigError::InvalidAttendancePenalty => "--attendance-penalty",
                EngineConfigError::InvalidExtraPoints => "--extra-points",
            },
        })?;
        Ok(config)
    }
}

pub(crate) fn run_grade_report(args: GradeArgs) -> Result<(), AppError> {
    let mut engine = GradeEngine::new(args.engine_config()?);
    engine.set_bonus_policy(args.all_years_teachers);

    let mut imported = EvaluationCsvImporter::from_path(&args.csv, engine)?;
    for student in &args.absent {
        imported.engine_mut().set_attendance(student.as_str(), false);
    }

    for line in grade_report_lines(&imported) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn grade_report_lines(imported: &ImportedGradebook) -> Vec<String> {
    let engine = imported.engine();
    let mut lines = vec![format!(
        "Grade report ({} students, all-years teachers policy {})",
        imported.subjects().len(),
        if engine.bonus_policy() { "on" } else { "off" }
    )];

    for (subject, outcome) in imported.breakdowns() {
        match outcome {
            Ok(breakdown) => {
                let source = match breakdown.details.bonus_source {
                    BonusSource::SubjectOverride => "override",
                    BonusSource::InstitutionPolicy => "policy",
                    BonusSource::None => "none",
                };
                lines.push(format!(
                    "- {subject}: final {:.4} | average {:.4} | penalty {:.4} | extra {:.4} ({source}) | {} evaluations",
                    breakdown.final_grade,
                    breakdown.weighted_average,
                    breakdown.attendance_penalty,
                    breakdown.extra_points,
                    breakdown.details.evaluations.len(),
                ));
            }
            Err(err) => lines.push(format!("- {subject}: {err}")),
        }
    }

    lines
}

/// Populates a fresh deployment with a small class, a few characters and a catalog.
pub(crate) fn seed_demo_data<S, C, M, P>(
    grades: &GradeService<S>,
    characters: &CharacterService<C>,
    comments: &CommentService<M, C>,
    products: &ProductService<P>,
) -> Result<(), AppError>
where
    S: StudentRepository + 'static,
    C: CharacterRepository + 'static,
    M: CommentRepository + 'static,
    P: ProductRepository + 'static,
{
    let class = [
        ("A-01", "Ana Torres", true, &[(12.0, 50.0), (18.0, 50.0)][..]),
        ("B-02", "Bruno Diaz", false, &[(14.0, 100.0)][..]),
        (
            "C-03",
            "Carla Rojas",
            true,
            &[(16.0, 30.0), (11.5, 30.0), (17.0, 40.0)][..],
        ),
    ];
    for (code, name, attendance, evaluations) in class {
        let student = grades.register_student(NewStudent {
            code: code.to_string(),
            name: name.to_string(),
            attendance,
        })?;
        for &(score, weight) in evaluations {
            grades.record_evaluation(student.id, NewEvaluation { score, weight })?;
        }
    }

    let naruto = characters
        .create_character(NewCharacter {
            name: "Naruto".to_string(),
            village: "Konoha".to_string(),
            signature_technique: "Rasengan".to_string(),
        })?;
    characters
        .create_character(NewCharacter {
            name: "Sasuke".to_string(),
            village: "Konoha".to_string(),
            signature_technique: "Chidori".to_string(),
        })?;
    comments
        .add_comment(NewComment {
            character_id: naruto.id,
            author: "Fan1".to_string(),
            text: "Best character in the series".to_string(),
        })?;

    for (name, price) in [("Notebook", 3.5), ("Graphing calculator", 89.9)] {
        products
            .create(NewProduct {
                name: name.to_string(),
                description: String::new(),
                price,
                merchant_id: 1,
            })?;
    }

    info!(students = class.len(), "demo data seeded");
    Ok(())
}
