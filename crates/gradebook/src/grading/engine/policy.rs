use super::config::EngineConfig;
use serde::{Deserialize, Serialize};

const DECIMAL_PLACES: i32 = 4;

/// Where the extra points of a breakdown came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusSource {
    SubjectOverride,
    InstitutionPolicy,
    None,
}

/// Rounds half away from zero at four decimal places.
pub(crate) fn round_points(value: f64) -> f64 {
    let factor = 10f64.powi(DECIMAL_PLACES);
    (value * factor).round() / factor
}

/// Subjects without an attendance record count as having attended.
pub(crate) fn attendance_penalty(attended: Option<bool>, config: &EngineConfig) -> f64 {
    match attended {
        Some(false) => config.attendance_penalty,
        Some(true) | None => 0.0,
    }
}

/// A subject override always wins, even over an enabled institution policy.
pub(crate) fn extra_points(
    subject_override: Option<f64>,
    bonus_policy: bool,
    config: &EngineConfig,
) -> (f64, BonusSource) {
    match subject_override {
        Some(points) => (points, BonusSource::SubjectOverride),
        None if bonus_policy => (config.default_extra_points, BonusSource::InstitutionPolicy),
        None => (0.0, BonusSource::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_points(0.03125), 0.0313);
        assert_eq!(round_points(-0.03125), -0.0313);
        assert_eq!(round_points(14.0), 14.0);
        assert_eq!(round_points(2.0 / 3.0), 0.6667);
    }

    #[test]
    fn missing_attendance_is_not_penalized() {
        let config = EngineConfig::default();
        assert_eq!(attendance_penalty(None, &config), 0.0);
        assert_eq!(attendance_penalty(Some(true), &config), 0.0);
        assert_eq!(attendance_penalty(Some(false), &config), 1.0);
    }

    #[test]
    fn override_takes_precedence_in_both_directions() {
        let config = EngineConfig::default();
        assert_eq!(
            extra_points(Some(0.0), true, &config),
            (0.0, BonusSource::SubjectOverride)
        );
        assert_eq!(
            extra_points(Some(2.0), false, &config),
            (2.0, BonusSource::SubjectOverride)
        );
        assert_eq!(
            extra_points(None, true, &config),
            (0.5, BonusSource::InstitutionPolicy)
        );
        assert_eq!(extra_points(None, false, &config), (0.0, BonusSource::None));
    }
}
