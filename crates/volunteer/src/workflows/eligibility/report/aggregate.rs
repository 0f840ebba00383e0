use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::super::domain::{
    AcademicSubject, DepartmentRequirement, InternalSubject, Semester, SemesterRankRow,
    SkillSubject, StandardCatalog, StandardTable, StudentRecord,
};
use super::super::levels::{classify, parse_float_prefix};
use super::super::service::EligibilityError;
use super::views::{
    DepartmentEntry, InternalScores, PersonalInfo, QualificationStatistics, SchoolGroupBucket,
    StudentResult,
};

/// Assemble the student-facing record from an already scanned qualified list.
pub fn aggregate(
    student: &StudentRecord,
    qualified: &[&DepartmentRequirement],
    standards: &StandardCatalog,
    rank_row: Option<&SemesterRankRow>,
    catalog_size: usize,
    generated_at: DateTime<Utc>,
) -> Result<StudentResult, EligibilityError> {
    if !student.has_eligible_groups() {
        return Err(EligibilityError::MissingEligibleGroups(
            student.student_id.clone(),
        ));
    }

    Ok(StudentResult {
        student_id: student.student_id.clone(),
        name: student.name.clone(),
        eligible_groups: student.eligible_groups.clone(),
        class_label: student.class_label.clone(),
        seat_number: pad_seat(&student.seat_number),
        rank_percentile: student.rank_percentile.clone(),
        ballot_number: student.ballot_number.clone(),
        personal: personal_info(student, standards, rank_row),
        school_groups: group_departments(qualified),
        statistics: QualificationStatistics {
            qualified_count: qualified.len(),
            catalog_size,
            pass_ratio: pass_ratio(qualified.len(), catalog_size),
        },
        updated_at: generated_at,
    })
}

/// Bucket by (school code, group name), seeded by the first department seen, then sort by
/// school code and group code. The sort is stable, so ties keep scan order.
pub fn group_departments(qualified: &[&DepartmentRequirement]) -> Vec<SchoolGroupBucket> {
    let mut buckets: Vec<SchoolGroupBucket> = Vec::new();
    let mut index: HashMap<(i64, String), usize> = HashMap::new();

    for department in qualified {
        let key = (department.school_code_value(), department.group_name.clone());
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(SchoolGroupBucket {
                school_name: department.school_name.clone(),
                school_code: department.school_code_value(),
                school_abbreviation: department.school_abbreviation.clone(),
                group_name: department.group_name.clone(),
                group_code: department.group_code_value().unwrap_or(0),
                departments: Vec::new(),
            });
            buckets.len() - 1
        });

        buckets[slot].departments.push(DepartmentEntry {
            department_code: department.department_code_value(),
            department_name: department.department_name.clone(),
            department_abbreviation: department.department_abbreviation.clone(),
            keywords: department.keywords.clone(),
            max_preferences: department.max_preferences,
        });
    }

    buckets.sort_by(|a, b| {
        a.school_code
            .cmp(&b.school_code)
            .then(a.group_code.cmp(&b.group_code))
    });
    buckets
}

/// Qualified share formatted with two decimals and a trailing `%`.
pub fn pass_ratio(qualified: usize, total: usize) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", qualified as f64 / total as f64 * 100.0)
}

fn personal_info(
    student: &StudentRecord,
    standards: &StandardCatalog,
    rank_row: Option<&SemesterRankRow>,
) -> PersonalInfo {
    let mut academic_scores = BTreeMap::new();
    let mut academic_levels = BTreeMap::new();
    for subject in AcademicSubject::ordered() {
        let score = student.academic_score(subject);
        academic_scores.insert(subject, score.and_then(parse_float_prefix).unwrap_or(0.0));
        academic_levels.insert(subject, level_label(score, standards.academic(subject)));
    }

    let mut skill_scores = BTreeMap::new();
    let mut skill_levels = BTreeMap::new();
    for subject in SkillSubject::ordered() {
        let Some(score) = student
            .skill_score(subject)
            .filter(|value| !value.trim().is_empty())
        else {
            continue;
        };
        skill_scores.insert(subject, parse_float_prefix(score).unwrap_or(0.0));
        skill_levels.insert(subject, level_label(Some(score), standards.skill(subject)));
    }

    PersonalInfo {
        academic_scores,
        academic_levels,
        listening: student.listening.clone().unwrap_or_default(),
        skill_scores,
        skill_levels,
        internal: internal_scores(rank_row),
    }
}

fn level_label(
    score: Option<&str>,
    table: Option<&StandardTable>,
) -> String {
    classify(score, table)
        .map(|tier| tier.label().to_string())
        .unwrap_or_default()
}

fn internal_scores(rank_row: Option<&SemesterRankRow>) -> InternalScores {
    let subject_ranks = InternalSubject::ordered()
        .into_iter()
        .map(|subject| {
            let value = rank_row
                .and_then(|row| row.subject_ranks.get(&subject))
                .cloned()
                .unwrap_or_default();
            (subject, value)
        })
        .collect();

    let semester_averages = Semester::ordered()
        .into_iter()
        .map(|semester| {
            let value = rank_row
                .and_then(|row| row.semester_averages.get(&semester))
                .cloned()
                .unwrap_or_default();
            (semester, value)
        })
        .collect();

    InternalScores {
        subject_ranks,
        semester_averages,
    }
}

fn pad_seat(seat: &str) -> String {
    let trimmed = seat.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed:0>2}")
    }
}
