use serde::Serialize;

use super::super::domain::{AcademicSubject, SkillSubject};

/// Subjects a department may require as alternatives: satisfying any one of them is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternativeSubjectGroup {
    pub subjects: Vec<AcademicSubject>,
}

impl AlternativeSubjectGroup {
    pub fn new(subjects: impl IntoIterator<Item = AcademicSubject>) -> Self {
        Self {
            subjects: subjects.into_iter().collect(),
        }
    }

    pub fn contains(&self, subject: AcademicSubject) -> bool {
        self.subjects.contains(&subject)
    }
}

/// Rule data for the qualification engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualificationPolicy {
    pub alternative_groups: Vec<AlternativeSubjectGroup>,
    pub skill_subjects: Vec<SkillSubject>,
}

impl Default for QualificationPolicy {
    fn default() -> Self {
        Self {
            alternative_groups: vec![AlternativeSubjectGroup::new([
                AcademicSubject::MathA,
                AcademicSubject::MathB,
            ])],
            skill_subjects: SkillSubject::ordered(),
        }
    }
}
