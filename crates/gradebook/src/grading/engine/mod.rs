mod config;
mod policy;

pub use config::{EngineConfig, EngineConfigError};
pub use policy::BonusSource;

use super::domain::SubjectId;
use policy::{attendance_penalty, extra_points, round_points};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One scored assessment and its relative weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: f64,
    pub weight: f64,
}

impl Evaluation {
    pub fn new(score: f64, weight: f64) -> Self {
        Self { score, weight }
    }
}

/// Reasons a registration or computation is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradeError {
    #[error("maximum number of evaluations ({max}) exceeded for student {subject}")]
    CapacityExceeded { subject: SubjectId, max: usize },
    #[error("no evaluations registered for student {subject}")]
    EmptyEvaluationSet { subject: SubjectId },
    #[error("total weight must be greater than 0 (student {subject} has {total_weight})")]
    NonPositiveTotalWeight {
        subject: SubjectId,
        total_weight: f64,
    },
}

/// Raw inputs behind a breakdown, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownDetails {
    pub evaluations: Vec<Evaluation>,
    pub total_weight: f64,
    pub weighted_sum: f64,
    pub bonus_source: BonusSource,
}

/// Final grade with the intermediate values that produced it.
///
/// The four headline numbers are rounded to four decimals and
/// `final_grade` is derived from the rounded components, so
/// `weighted_average - attendance_penalty + extra_points` matches it at four
/// decimal places. Exact `f64` equality of the recomposed sum is not promised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBreakdown {
    pub weighted_average: f64,
    pub attendance_penalty: f64,
    pub extra_points: f64,
    pub final_grade: f64,
    pub details: BreakdownDetails,
}

/// Per-context grade calculator.
///
/// Holds every subject's evaluations, attendance flags and bonus overrides,
/// plus the institution-wide bonus policy. Computation never mutates state.
#[derive(Debug, Clone, Default)]
pub struct GradeEngine {
    config: EngineConfig,
    evaluations: HashMap<SubjectId, Vec<Evaluation>>,
    attendance: HashMap<SubjectId, bool>,
    bonus_overrides: HashMap<SubjectId, f64>,
    bonus_policy: bool,
}

impl GradeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn register_evaluation(
        &mut self,
        subject: impl Into<SubjectId>,
        score: f64,
        weight: f64,
    ) -> Result<(), GradeError> {
        let subject = subject.into();
        let max = self.config.max_evaluations_per_subject;
        let stored = self.evaluations.get(&subject).map_or(0, Vec::len);
        if stored >= max {
            return Err(GradeError::CapacityExceeded { subject, max });
        }

        self.evaluations
            .entry(subject)
            .or_default()
            .push(Evaluation::new(score, weight));
        Ok(())
    }

    pub fn set_attendance(&mut self, subject: impl Into<SubjectId>, attended: bool) {
        self.attendance.insert(subject.into(), attended);
    }

    pub fn set_bonus_policy(&mut self, enabled: bool) {
        self.bonus_policy = enabled;
    }

    pub fn bonus_policy(&self) -> bool {
        self.bonus_policy
    }

    pub fn set_subject_bonus_override(&mut self, subject: impl Into<SubjectId>, points: f64) {
        self.bonus_overrides.insert(subject.into(), points);
    }

    pub fn evaluations(&self, subject: impl Into<SubjectId>) -> &[Evaluation] {
        self.evaluations
            .get(&subject.into())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn evaluation_count(&self, subject: impl Into<SubjectId>) -> usize {
        self.evaluations(subject).len()
    }

    pub fn calculate_final(
        &self,
        subject: impl Into<SubjectId>,
    ) -> Result<GradeBreakdown, GradeError> {
        let subject = subject.into();
        let evaluations = self
            .evaluations
            .get(&subject)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if evaluations.is_empty() {
            return Err(GradeError::EmptyEvaluationSet { subject });
        }

        let total_weight: f64 = evaluations.iter().map(|evaluation| evaluation.weight).sum();
        if total_weight.is_nan() || total_weight <= 0.0 {
            return Err(GradeError::NonPositiveTotalWeight {
                subject,
                total_weight,
            });
        }

        let weighted_sum: f64 = evaluations
            .iter()
            .map(|evaluation| evaluation.score * evaluation.weight)
            .sum();

        let weighted_average = round_points(weighted_sum / total_weight);
        let attendance_penalty = round_points(attendance_penalty(
            self.attendance.get(&subject).copied(),
            &self.config,
        ));
        let (extra_points, bonus_source) = extra_points(
            self.bonus_overrides.get(&subject).copied(),
            self.bonus_policy,
            &self.config,
        );
        let extra_points = round_points(extra_points);
        let final_grade = round_points(weighted_average - attendance_penalty + extra_points);

        Ok(GradeBreakdown {
            weighted_average,
            attendance_penalty,
            extra_points,
            final_grade,
            details: BreakdownDetails {
                evaluations: evaluations.to_vec(),
                total_weight,
                weighted_sum,
                bonus_source,
            },
        })
    }
}
