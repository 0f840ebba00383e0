use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::domain::{AcademicSubject, InternalSubject, Semester, SkillSubject, StudentId};

/// Per-student output record handed to the export and document steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentResult {
    pub student_id: StudentId,
    pub name: String,
    pub eligible_groups: String,
    pub class_label: String,
    pub seat_number: String,
    pub rank_percentile: String,
    pub ballot_number: String,
    pub personal: PersonalInfo,
    pub school_groups: Vec<SchoolGroupBucket>,
    pub statistics: QualificationStatistics,
    pub updated_at: DateTime<Utc>,
}

impl StudentResult {
    pub fn department_count(&self) -> usize {
        self.school_groups
            .iter()
            .map(|bucket| bucket.departments.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalInfo {
    pub academic_scores: BTreeMap<AcademicSubject, f64>,
    pub academic_levels: BTreeMap<AcademicSubject, String>,
    pub listening: String,
    pub skill_scores: BTreeMap<SkillSubject, f64>,
    pub skill_levels: BTreeMap<SkillSubject, String>,
    pub internal: InternalScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternalScores {
    pub subject_ranks: BTreeMap<InternalSubject, String>,
    pub semester_averages: BTreeMap<Semester, String>,
}

/// Qualified departments of one school within one group category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolGroupBucket {
    pub school_name: String,
    pub school_code: i64,
    pub school_abbreviation: String,
    pub group_name: String,
    pub group_code: i64,
    pub departments: Vec<DepartmentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentEntry {
    pub department_code: i64,
    pub department_name: String,
    pub department_abbreviation: String,
    pub keywords: String,
    /// 可填志願數, when the department sheet states one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_preferences: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationStatistics {
    pub qualified_count: usize,
    pub catalog_size: usize,
    /// Qualified share of the catalog, e.g. `"12.50%"`.
    pub pass_ratio: String,
}
