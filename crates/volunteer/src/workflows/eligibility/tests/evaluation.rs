use super::common::*;
use crate::workflows::eligibility::domain::{
    AcademicSubject, RankRequirements, SkillSubject, StandardTable,
};
use crate::workflows::eligibility::evaluation::{
    is_qualified, AlternativeSubjectGroup, Disqualification, QualificationEngine,
    QualificationOutcome, QualificationPolicy,
};
use crate::workflows::eligibility::levels::TierRequirement;
use crate::workflows::eligibility::scanner::scan;

#[test]
fn group_code_must_be_among_eligible_groups() {
    let standards = standards();
    let rank = RankRequirements::default();
    let applicant = with_score(student("S1", "1,2"), AcademicSubject::English, "12");

    let in_group = requiring(department("5", "2", "11"), AcademicSubject::English, "前標");
    assert!(is_qualified(&applicant, &in_group, &standards, &rank));

    let other_group = requiring(department("5", "3", "11"), AcademicSubject::English, "前標");
    assert!(!is_qualified(&applicant, &other_group, &standards, &rank));
}

#[test]
fn malformed_group_code_disqualifies() {
    let standards = standards();
    let rank = RankRequirements::default();
    let policy = QualificationPolicy::default();
    let engine = QualificationEngine::new(&standards, &rank, &policy);

    let outcome = engine.evaluate(&student("S1", "1,2"), &department("5", "n/a", "11"));
    match outcome {
        QualificationOutcome::Disqualified(Disqualification::MalformedGroupCode { raw }) => {
            assert_eq!(raw, "n/a")
        }
        other => panic!("expected malformed group code, got {other:?}"),
    }
}

#[test]
fn rank_ceiling_applies_to_every_department_of_the_school() {
    let standards = standards();
    let rank = rank_requirements(&[("101", 20.0)]);
    let policy = QualificationPolicy::default();
    let engine = QualificationEngine::new(&standards, &rank, &policy);

    let mut weak = with_score(student("S1", "1"), AcademicSubject::English, "15");
    weak.rank_percentile = "25".to_string();
    let mut strong = weak.clone();
    strong.rank_percentile = "15".to_string();

    let departments = vec![department("101", "1", "1"), department("101", "1", "2")];
    for candidate in &departments {
        match engine.evaluate(&weak, candidate) {
            QualificationOutcome::Disqualified(Disqualification::RankAboveCeiling {
                ceiling,
                actual,
            }) => {
                assert_eq!(ceiling, 20.0);
                assert_eq!(actual, 25.0);
            }
            other => panic!("expected rank ceiling failure, got {other:?}"),
        }
        assert!(engine.is_qualified(&strong, candidate));
    }

    let elsewhere = department("102", "1", "3");
    assert!(engine.is_qualified(&weak, &elsewhere));
}

#[test]
fn non_numeric_rank_skips_the_ceiling() {
    let standards = standards();
    let rank = rank_requirements(&[("101", 20.0)]);
    let mut applicant = student("S1", "1");
    applicant.rank_percentile = "N/A".to_string();

    assert!(is_qualified(
        &applicant,
        &department("101", "1", "1"),
        &standards,
        &rank
    ));
}

#[test]
fn either_math_track_satisfies_a_double_requirement() {
    let standards = standards();
    let rank = RankRequirements::default();
    let target = requiring(
        requiring(department("5", "1", "1"), AcademicSubject::MathA, "前標"),
        AcademicSubject::MathB,
        "頂標",
    );

    let track_a = with_score(
        with_score(student("S1", "1"), AcademicSubject::MathA, "12"),
        AcademicSubject::MathB,
        "3",
    );
    assert!(is_qualified(&track_a, &target, &standards, &rank));

    let neither = with_score(
        with_score(student("S2", "1"), AcademicSubject::MathA, "4"),
        AcademicSubject::MathB,
        "5",
    );
    let policy = QualificationPolicy::default();
    let engine = QualificationEngine::new(&standards, &rank, &policy);
    match engine.evaluate(&neither, &target) {
        QualificationOutcome::Disqualified(Disqualification::NoAlternativeSatisfied {
            subjects,
        }) => assert_eq!(subjects, vec![AcademicSubject::MathA, AcademicSubject::MathB]),
        other => panic!("expected alternative failure, got {other:?}"),
    }
}

#[test]
fn a_single_math_requirement_is_checked_on_its_own() {
    let standards = standards();
    let rank = RankRequirements::default();
    let target = requiring(department("5", "1", "1"), AcademicSubject::MathA, "前標");

    let only_b = with_score(student("S1", "1"), AcademicSubject::MathB, "15");
    assert!(!is_qualified(&only_b, &target, &standards, &rank));

    let strong_a = with_score(student("S2", "1"), AcademicSubject::MathA, "13");
    assert!(is_qualified(&strong_a, &target, &standards, &rank));
}

#[test]
fn missing_table_fails_its_track_inside_an_alternative_group() {
    let mut standards = standards();
    standards.academic.remove(&AcademicSubject::MathB);
    let rank = RankRequirements::default();
    let target = requiring(
        requiring(department("5", "1", "1"), AcademicSubject::MathA, "前標"),
        AcademicSubject::MathB,
        "底標",
    );

    let weak_a = with_score(
        with_score(student("S1", "1"), AcademicSubject::MathA, "7"),
        AcademicSubject::MathB,
        "15",
    );
    assert!(!is_qualified(&weak_a, &target, &standards, &rank));
}

#[test]
fn missing_table_skips_a_standalone_requirement() {
    let mut standards = standards();
    standards.academic.remove(&AcademicSubject::Social);
    let rank = RankRequirements::default();
    let target = requiring(department("5", "1", "1"), AcademicSubject::Social, "頂標");

    assert!(is_qualified(&student("S1", "1"), &target, &standards, &rank));
}

#[test]
fn sentinel_requirements_never_block() {
    let standards = standards();
    let rank = RankRequirements::default();
    let mut target = department("5", "1", "1");
    for placeholder in ["", "-", "--", "---"] {
        assert!(TierRequirement::parse(placeholder).is_none());
        target = requiring(target, AcademicSubject::Chinese, placeholder);
    }

    assert!(is_qualified(&student("S1", "1"), &target, &standards, &rank));
}

#[test]
fn listening_uses_the_grade_ordinal() {
    let standards = standards();
    let rank = RankRequirements::default();
    let mut target = department("5", "1", "1");
    target.requirements.listening = Some("B級".to_string());

    let mut grade_a = student("S1", "1");
    grade_a.listening = Some("A".to_string());
    assert!(is_qualified(&grade_a, &target, &standards, &rank));

    let mut grade_c = student("S2", "1");
    grade_c.listening = Some("C級".to_string());
    assert!(!is_qualified(&grade_c, &target, &standards, &rank));

    let silent = student("S3", "1");
    assert!(!is_qualified(&silent, &target, &standards, &rank));
}

#[test]
fn skill_requirements_follow_the_policy_subjects() {
    let standards = standards();
    let rank = RankRequirements::default();
    let skill = SkillSubject::new(2).expect("in range");
    let mut target = department("5", "1", "1");
    target.requirements.skill.insert(
        skill,
        TierRequirement::parse("均標").expect("tier label parses"),
    );

    let mut applicant = student("S1", "1");
    applicant.skill_scores.insert(skill, "8".to_string());

    let default_policy = QualificationPolicy::default();
    let engine = QualificationEngine::new(&standards, &rank, &default_policy);
    match engine.evaluate(&applicant, &target) {
        QualificationOutcome::Disqualified(Disqualification::SkillBelowRequirement {
            subject,
            actual,
            ..
        }) => {
            assert_eq!(subject, skill);
            assert_eq!(actual.as_deref(), Some("後標"));
        }
        other => panic!("expected skill failure, got {other:?}"),
    }

    let narrow_policy = QualificationPolicy {
        alternative_groups: vec![AlternativeSubjectGroup::new([
            AcademicSubject::MathA,
            AcademicSubject::MathB,
        ])],
        skill_subjects: vec![SkillSubject::new(1).expect("in range")],
    };
    let narrow = QualificationEngine::new(&standards, &rank, &narrow_policy);
    assert!(narrow.is_qualified(&applicant, &target));
}

#[test]
fn scan_keeps_catalog_order_and_is_repeatable() {
    let standards = standards();
    let rank = RankRequirements::default();
    let policy = QualificationPolicy::default();
    let engine = QualificationEngine::new(&standards, &rank, &policy);
    let applicant = with_score(student("S1", "1,2"), AcademicSubject::English, "12");
    let catalog = vec![
        department("9", "2", "4"),
        requiring(department("5", "2", "3"), AcademicSubject::English, "頂標"),
        department("5", "3", "2"),
        department("1", "1", "1"),
    ];

    let first = scan(&applicant, &catalog, &engine);
    let second = scan(&applicant, &catalog, &engine);

    let codes: Vec<&str> = first
        .iter()
        .map(|department| department.department_code.as_str())
        .collect();
    assert_eq!(codes, vec!["4", "1"]);
    assert_eq!(first, second);
}

#[test]
fn outcome_summary_names_the_failed_check() {
    let outcome = QualificationOutcome::Disqualified(Disqualification::SubjectBelowRequirement {
        subject: AcademicSubject::English,
        required: "前標".to_string(),
        actual: None,
    });
    let summary = outcome.summary();
    assert!(summary.contains("英文"));
    assert!(summary.contains("no score"));
    assert_eq!(QualificationOutcome::Qualified.summary(), "qualified");
}

#[test]
fn zero_score_fails_a_bottom_requirement_even_with_a_zero_floor() {
    let mut standards = standards();
    standards.academic.insert(
        AcademicSubject::English,
        StandardTable::new(15.0, 12.0, 9.0, 6.0, 0.0),
    );
    let rank = RankRequirements::default();
    let policy = QualificationPolicy::default();
    let engine = QualificationEngine::new(&standards, &rank, &policy);

    let applicant = with_score(student("S1", "2"), AcademicSubject::English, "0");
    let department = requiring(department("5", "2", "11"), AcademicSubject::English, "底標");

    match engine.evaluate(&applicant, &department) {
        QualificationOutcome::Disqualified(Disqualification::SubjectBelowRequirement {
            subject,
            actual,
            ..
        }) => {
            assert_eq!(subject, AcademicSubject::English);
            assert_eq!(actual, None);
        }
        other => panic!("expected subject failure, got {other:?}"),
    }
}
