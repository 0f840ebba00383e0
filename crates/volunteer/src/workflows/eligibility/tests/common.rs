use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::eligibility::domain::{
    AcademicSubject, DepartmentRequirement, RankRequirements, ReferenceData, SkillSubject,
    StandardCatalog, StandardTable, StudentId, StudentRecord,
};
use crate::workflows::eligibility::levels::TierRequirement;
use crate::workflows::eligibility::EligibilityService;

/// Thresholds shared by every subject in these fixtures: 15/12/9/6/3.
pub(super) fn table() -> StandardTable {
    StandardTable::new(15.0, 12.0, 9.0, 6.0, 3.0)
}

pub(super) fn standards() -> StandardCatalog {
    let mut catalog = StandardCatalog::default();
    for subject in AcademicSubject::ordered() {
        catalog.academic.insert(subject, table());
    }
    for subject in SkillSubject::ordered() {
        catalog.skill.insert(subject, table());
    }
    catalog
}

pub(super) fn student(id: &str, groups: &str) -> StudentRecord {
    StudentRecord {
        student_id: StudentId::new(id),
        name: format!("Student {id}"),
        class_label: "301".to_string(),
        seat_number: "7".to_string(),
        eligible_groups: groups.to_string(),
        rank_percentile: "10".to_string(),
        ballot_number: "12".to_string(),
        ..StudentRecord::default()
    }
}

pub(super) fn with_score(
    mut student: StudentRecord,
    subject: AcademicSubject,
    score: &str,
) -> StudentRecord {
    student.academic_scores.insert(subject, score.to_string());
    student
}

pub(super) fn department(school: &str, group_code: &str, code: &str) -> DepartmentRequirement {
    DepartmentRequirement {
        school_code: school.to_string(),
        school_name: format!("University {school}"),
        school_abbreviation: format!("U{school}"),
        group_code: group_code.to_string(),
        group_name: format!("Group {group_code}"),
        department_code: code.to_string(),
        department_name: format!("Department {code}"),
        department_abbreviation: format!("D{code}"),
        ..DepartmentRequirement::default()
    }
}

pub(super) fn requiring(
    mut department: DepartmentRequirement,
    subject: AcademicSubject,
    tier: &str,
) -> DepartmentRequirement {
    if let Some(requirement) = TierRequirement::parse(tier) {
        department
            .requirements
            .academic
            .insert(subject, requirement);
    }
    department
}

pub(super) fn rank_requirements(entries: &[(&str, f64)]) -> RankRequirements {
    let mut requirements = RankRequirements::default();
    for (code, ceiling) in entries {
        requirements.insert(*code, *ceiling);
    }
    requirements
}

pub(super) fn reference() -> ReferenceData {
    let qualified = with_score(student("S001", "1,2"), AcademicSubject::English, "12");
    let no_groups = student("S002", " ");

    ReferenceData {
        students: vec![qualified, no_groups],
        departments: vec![
            requiring(department("5", "2", "11"), AcademicSubject::English, "前標"),
            department("5", "2", "12"),
            department("5", "1", "13"),
            department("9", "3", "14"),
        ],
        standards: standards(),
        rank_requirements: RankRequirements::default(),
        semester_ranks: Default::default(),
    }
}

pub(super) fn service() -> EligibilityService {
    EligibilityService::new(Arc::new(reference()))
}

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
