mod config;
mod policy;
mod rules;

pub use config::{AlternativeSubjectGroup, QualificationPolicy};
pub use policy::{Disqualification, QualificationOutcome};

use super::domain::{DepartmentRequirement, RankRequirements, StandardCatalog, StudentRecord};

/// Stateless evaluator that checks one student against one department's requirements.
///
/// Checks run in a fixed order and stop at the first failure: group eligibility, rank
/// ceiling, alternative subject groups, academic subjects, listening, skill subjects.
#[derive(Debug, Clone, Copy)]
pub struct QualificationEngine<'a> {
    standards: &'a StandardCatalog,
    rank_requirements: &'a RankRequirements,
    policy: &'a QualificationPolicy,
}

impl<'a> QualificationEngine<'a> {
    pub fn new(
        standards: &'a StandardCatalog,
        rank_requirements: &'a RankRequirements,
        policy: &'a QualificationPolicy,
    ) -> Self {
        Self {
            standards,
            rank_requirements,
            policy,
        }
    }

    pub fn evaluate(
        &self,
        student: &StudentRecord,
        department: &DepartmentRequirement,
    ) -> QualificationOutcome {
        self.run_checks(student, department).into()
    }

    pub fn is_qualified(&self, student: &StudentRecord, department: &DepartmentRequirement) -> bool {
        self.run_checks(student, department).is_ok()
    }

    fn run_checks(
        &self,
        student: &StudentRecord,
        department: &DepartmentRequirement,
    ) -> Result<(), Disqualification> {
        rules::check_group(student, department)?;
        rules::check_rank_ceiling(student, department, self.rank_requirements)?;
        let resolved =
            rules::check_alternative_groups(student, department, self.standards, self.policy)?;
        rules::check_academic_subjects(student, department, self.standards, &resolved)?;
        rules::check_listening(student, department)?;
        rules::check_skill_subjects(student, department, self.standards, self.policy)?;
        Ok(())
    }
}

/// Convenience wrapper using the default policy (math A/B as alternatives, all skill subjects).
pub fn is_qualified(
    student: &StudentRecord,
    department: &DepartmentRequirement,
    standards: &StandardCatalog,
    rank_requirements: &RankRequirements,
) -> bool {
    let policy = QualificationPolicy::default();
    QualificationEngine::new(standards, rank_requirements, &policy).is_qualified(student, department)
}
