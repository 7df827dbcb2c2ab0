use serde::{Deserialize, Serialize};

/// Limits and point values shared by every subject of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_evaluations_per_subject: usize,
    pub attendance_penalty: f64,
    pub default_extra_points: f64,
}

impl EngineConfig {
    /// Reject settings no deployment should run with.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.max_evaluations_per_subject == 0 {
            return Err(EngineConfigError::ZeroCapacity);
        }
        if !self.attendance_penalty.is_finite() || self.attendance_penalty < 0.0 {
            return Err(EngineConfigError::InvalidAttendancePenalty);
        }
        if !self.default_extra_points.is_finite() {
            return Err(EngineConfigError::InvalidExtraPoints);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_evaluations_per_subject: 10,
            attendance_penalty: 1.0,
            default_extra_points: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineConfigError {
    #[error("maximum evaluations per student must be at least 1")]
    ZeroCapacity,
    #[error("attendance penalty must be a finite, non-negative number")]
    InvalidAttendancePenalty,
    #[error("extra points must be a finite number")]
    InvalidExtraPoints,
}
