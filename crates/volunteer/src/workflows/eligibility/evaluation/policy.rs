use serde::Serialize;

use super::super::domain::{AcademicSubject, SkillSubject};

/// First failed check that kept a department out of a student's qualified set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Disqualification {
    GroupNotEligible { group_code: i64 },
    MalformedGroupCode { raw: String },
    RankAboveCeiling { ceiling: f64, actual: f64 },
    NoAlternativeSatisfied { subjects: Vec<AcademicSubject> },
    SubjectBelowRequirement {
        subject: AcademicSubject,
        required: String,
        actual: Option<String>,
    },
    ListeningBelowRequirement {
        required: String,
        actual: Option<String>,
    },
    SkillBelowRequirement {
        subject: SkillSubject,
        required: String,
        actual: Option<String>,
    },
}

impl Disqualification {
    pub fn summary(&self) -> String {
        match self {
            Disqualification::GroupNotEligible { group_code } => {
                format!("group category {group_code} is not among the student's eligible groups")
            }
            Disqualification::MalformedGroupCode { raw } => {
                format!("department group code '{raw}' is not a number")
            }
            Disqualification::RankAboveCeiling { ceiling, actual } => format!(
                "rank percentile {:.2} exceeds the school ceiling {:.2}",
                actual, ceiling
            ),
            Disqualification::NoAlternativeSatisfied { subjects } => {
                let labels: Vec<&str> = subjects.iter().map(|subject| subject.label()).collect();
                format!("none of {} meets its requirement", labels.join("/"))
            }
            Disqualification::SubjectBelowRequirement {
                subject,
                required,
                actual,
            } => format!(
                "{} requires {} (student: {})",
                subject.label(),
                required,
                actual.as_deref().unwrap_or("no score")
            ),
            Disqualification::ListeningBelowRequirement { required, actual } => format!(
                "listening requires {} (student: {})",
                required,
                actual.as_deref().unwrap_or("no grade")
            ),
            Disqualification::SkillBelowRequirement {
                subject,
                required,
                actual,
            } => format!(
                "{} requires {} (student: {})",
                subject.label(),
                required,
                actual.as_deref().unwrap_or("no score")
            ),
        }
    }
}

/// Result of evaluating one student against one department.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum QualificationOutcome {
    Qualified,
    Disqualified(Disqualification),
}

impl QualificationOutcome {
    pub fn is_qualified(&self) -> bool {
        matches!(self, QualificationOutcome::Qualified)
    }

    pub fn summary(&self) -> String {
        match self {
            QualificationOutcome::Qualified => "qualified".to_string(),
            QualificationOutcome::Disqualified(reason) => reason.summary(),
        }
    }
}

impl From<Result<(), Disqualification>> for QualificationOutcome {
    fn from(value: Result<(), Disqualification>) -> Self {
        match value {
            Ok(()) => QualificationOutcome::Qualified,
            Err(reason) => QualificationOutcome::Disqualified(reason),
        }
    }
}
