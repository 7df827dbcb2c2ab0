use super::common::*;
use crate::grading::domain::SubjectId;
use crate::grading::engine::{
    BonusSource, EngineConfig, EngineConfigError, Evaluation, GradeEngine, GradeError,
};

#[test]
fn weighted_average_ignores_registration_order() {
    let samples = [(11.0, 20.0), (17.5, 30.0), (9.0, 15.0), (19.0, 35.0)];

    let mut forward = GradeEngine::default();
    let mut reverse = GradeEngine::default();
    for (score, weight) in samples {
        forward.register_evaluation("s1", score, weight).expect("registers");
    }
    for (score, weight) in samples.iter().rev() {
        reverse
            .register_evaluation("s1", *score, *weight)
            .expect("registers");
    }

    let forward = forward.calculate_final("s1").expect("grade computed");
    let reverse = reverse.calculate_final("s1").expect("grade computed");
    assert_eq!(forward.weighted_average, reverse.weighted_average);
    assert_eq!(forward.weighted_average, 15.45);
}

#[test]
fn weights_are_self_normalizing() {
    let mut engine = GradeEngine::default();
    engine.register_evaluation("s1", 10.0, 1.0).expect("registers");
    engine.register_evaluation("s1", 16.0, 2.0).expect("registers");

    let breakdown = engine.calculate_final("s1").expect("grade computed");

    assert_eq!(breakdown.weighted_average, 14.0);
    assert_eq!(breakdown.details.total_weight, 3.0);
    assert_eq!(breakdown.details.weighted_sum, 42.0);
}

#[test]
fn calculate_final_is_idempotent() {
    let mut engine = GradeEngine::new(engine_config());
    engine.register_evaluation("s1", 13.3, 33.0).expect("registers");
    engine.register_evaluation("s1", 7.1, 67.0).expect("registers");
    engine.set_attendance("s1", false);
    engine.set_bonus_policy(true);

    let first = engine.calculate_final("s1").expect("grade computed");
    let second = engine.calculate_final("s1").expect("grade computed");

    assert_eq!(first, second);
    assert_eq!(
        first.final_grade.to_bits(),
        second.final_grade.to_bits(),
        "repeated calls must be bit-identical"
    );
}

#[test]
fn final_grade_matches_rounded_components() {
    let mut engine = GradeEngine::new(EngineConfig {
        max_evaluations_per_subject: 10,
        attendance_penalty: 0.33333,
        default_extra_points: 0.77777,
    });
    engine.register_evaluation("s1", 13.123, 7.0).expect("registers");
    engine.register_evaluation("s1", 8.456, 3.0).expect("registers");
    engine.set_attendance("s1", false);
    engine.set_bonus_policy(true);

    let breakdown = engine.calculate_final("s1").expect("grade computed");
    let recomposed =
        breakdown.weighted_average - breakdown.attendance_penalty + breakdown.extra_points;

    assert!((breakdown.final_grade - recomposed).abs() < 1e-9);
    assert_eq!(breakdown.attendance_penalty, 0.3333);
    assert_eq!(breakdown.extra_points, 0.7778);
}

#[test]
fn recomposed_sum_agrees_at_four_decimals() {
    for (score, penalty, extra) in [(0.1, 0.2, 0.3), (10.0001, 0.3333, 0.6667), (19.99995, 1.1, 2.2)]
    {
        let mut engine = GradeEngine::new(EngineConfig {
            max_evaluations_per_subject: 10,
            attendance_penalty: penalty,
            default_extra_points: extra,
        });
        engine.register_evaluation("s1", score, 1.0).expect("registers");
        engine.set_attendance("s1", false);
        engine.set_bonus_policy(true);

        let breakdown = engine.calculate_final("s1").expect("grade computed");
        let recomposed =
            breakdown.weighted_average - breakdown.attendance_penalty + breakdown.extra_points;
        assert_eq!((recomposed * 1e4).round() / 1e4, breakdown.final_grade);
    }
}

#[test]
fn capacity_rejection_leaves_stored_evaluations_untouched() {
    let mut engine = GradeEngine::new(engine_config());
    for score in [10.0, 12.0, 14.0] {
        engine.register_evaluation("s1", score, 10.0).expect("registers");
    }

    let error = engine
        .register_evaluation("s1", 20.0, 10.0)
        .expect_err("fourth evaluation exceeds capacity");

    assert_eq!(
        error,
        GradeError::CapacityExceeded {
            subject: SubjectId::from("s1"),
            max: 3,
        }
    );
    assert_eq!(engine.evaluation_count("s1"), 3);
    assert!(engine
        .evaluations("s1")
        .iter()
        .all(|evaluation| evaluation.score < 20.0));
    engine
        .register_evaluation("s2", 20.0, 10.0)
        .expect("other subjects keep their own capacity");
}

#[test]
fn zero_capacity_rejects_every_registration() {
    let mut engine = GradeEngine::new(EngineConfig {
        max_evaluations_per_subject: 0,
        ..EngineConfig::default()
    });

    assert!(engine.register_evaluation("s1", 10.0, 100.0).is_err());
    assert_eq!(engine.evaluation_count("s1"), 0);
    assert!(matches!(
        engine.calculate_final("s1"),
        Err(GradeError::EmptyEvaluationSet { .. })
    ));
}

#[test]
fn validation_rejects_unusable_settings() {
    assert_eq!(EngineConfig::default().validate(), Ok(()));

    let zero_capacity = EngineConfig {
        max_evaluations_per_subject: 0,
        ..EngineConfig::default()
    };
    assert_eq!(zero_capacity.validate(), Err(EngineConfigError::ZeroCapacity));

    for penalty in [-1.0, f64::NAN, f64::INFINITY] {
        let config = EngineConfig {
            attendance_penalty: penalty,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(EngineConfigError::InvalidAttendancePenalty)
        );
    }

    for extra in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let config = EngineConfig {
            default_extra_points: extra,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(EngineConfigError::InvalidExtraPoints));
    }

    let negative_extra = EngineConfig {
        default_extra_points: -0.5,
        ..EngineConfig::default()
    };
    assert_eq!(negative_extra.validate(), Ok(()));
}

#[test]
fn zero_or_negative_total_weight_is_rejected() {
    let mut engine = GradeEngine::default();
    engine.register_evaluation("zero", 15.0, 0.0).expect("registers");
    engine.register_evaluation("negative", 15.0, 40.0).expect("registers");
    engine.register_evaluation("negative", 12.0, -60.0).expect("registers");

    match engine.calculate_final("zero") {
        Err(GradeError::NonPositiveTotalWeight { total_weight, .. }) => {
            assert_eq!(total_weight, 0.0)
        }
        other => panic!("expected non-positive weight error, got {other:?}"),
    }
    match engine.calculate_final("negative") {
        Err(GradeError::NonPositiveTotalWeight { total_weight, .. }) => {
            assert_eq!(total_weight, -20.0)
        }
        other => panic!("expected non-positive weight error, got {other:?}"),
    }
}

#[test]
fn mixed_sign_weights_with_positive_total_are_accepted() {
    let mut engine = GradeEngine::default();
    engine.register_evaluation("s1", 10.0, 150.0).expect("registers");
    engine.register_evaluation("s1", 20.0, -50.0).expect("registers");

    let breakdown = engine.calculate_final("s1").expect("grade computed");

    assert_eq!(breakdown.details.total_weight, 100.0);
    assert_eq!(breakdown.weighted_average, 5.0);
}

#[test]
fn numeric_and_string_identifiers_address_the_same_subject() {
    let mut engine = GradeEngine::default();
    engine.register_evaluation(42u32, 12.0, 50.0).expect("registers");
    engine.register_evaluation("42", 18.0, 50.0).expect("registers");
    engine.set_attendance(42i64, false);

    let breakdown = engine.calculate_final(42u64).expect("grade computed");

    assert_eq!(breakdown.details.evaluations.len(), 2);
    assert_eq!(breakdown.attendance_penalty, 1.0);
}

#[test]
fn attendance_and_overrides_are_scoped_per_subject() {
    let mut engine = GradeEngine::new(engine_config());
    engine.register_evaluation("absent", 14.0, 100.0).expect("registers");
    engine.register_evaluation("present", 14.0, 100.0).expect("registers");
    engine.set_attendance("absent", false);
    engine.set_subject_bonus_override("absent", 3.0);

    let absent = engine.calculate_final("absent").expect("grade computed");
    let present = engine.calculate_final("present").expect("grade computed");

    assert_eq!(absent.final_grade, 15.0);
    assert_eq!(absent.details.bonus_source, BonusSource::SubjectOverride);
    assert_eq!(present.final_grade, 14.0);
    assert_eq!(present.details.bonus_source, BonusSource::None);
}

#[test]
fn attendance_can_be_restored_after_being_cleared() {
    let mut engine = GradeEngine::new(engine_config());
    engine.register_evaluation("s1", 14.0, 100.0).expect("registers");
    engine.set_attendance("s1", false);
    engine.set_attendance("s1", true);

    let breakdown = engine.calculate_final("s1").expect("grade computed");
    assert_eq!(breakdown.attendance_penalty, 0.0);
}

#[test]
fn zero_override_suppresses_institution_bonus() {
    let mut engine = GradeEngine::new(engine_config());
    engine.register_evaluation("s1", 14.0, 100.0).expect("registers");
    engine.set_bonus_policy(true);
    engine.set_subject_bonus_override("s1", 0.0);

    let breakdown = engine.calculate_final("s1").expect("grade computed");

    assert_eq!(breakdown.extra_points, 0.0);
    assert_eq!(breakdown.final_grade, 14.0);
}

#[test]
fn details_preserve_registration_order_and_raw_totals() {
    let mut engine = GradeEngine::default();
    engine.register_evaluation("s1", 13.0, 30.0).expect("registers");
    engine.register_evaluation("s1", 17.0, 30.0).expect("registers");
    engine.register_evaluation("s1", 11.0, 30.0).expect("registers");

    let breakdown = engine.calculate_final("s1").expect("grade computed");

    assert_eq!(
        breakdown.details.evaluations,
        vec![
            Evaluation::new(13.0, 30.0),
            Evaluation::new(17.0, 30.0),
            Evaluation::new(11.0, 30.0),
        ]
    );
    assert_eq!(breakdown.details.total_weight, 90.0);
    assert_eq!(breakdown.details.weighted_sum, 1230.0);
    assert_eq!(breakdown.weighted_average, 13.6667);
}

#[test]
fn breakdown_serializes_with_snake_case_fields() {
    let mut engine = GradeEngine::default();
    engine.register_evaluation("s1", 16.0, 100.0).expect("registers");
    engine.set_bonus_policy(true);

    let breakdown = engine.calculate_final("s1").expect("grade computed");
    let json = serde_json::to_value(&breakdown).expect("serializes");

    assert_eq!(json["weighted_average"], 16.0);
    assert_eq!(json["extra_points"], 0.5);
    assert_eq!(json["final_grade"], 16.5);
    assert_eq!(json["details"]["bonus_source"], "institution_policy");
    assert_eq!(json["details"]["evaluations"][0]["weight"], 100.0);
}
