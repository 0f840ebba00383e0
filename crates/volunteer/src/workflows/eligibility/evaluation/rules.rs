use std::collections::BTreeSet;

use tracing::debug;

use super::super::domain::{
    AcademicSubject, DepartmentRequirement, RankRequirements, StandardCatalog, StudentRecord,
};
use super::super::levels::{classify, listening_ordinal, passes, Tier};
use super::config::QualificationPolicy;
use super::policy::Disqualification;

pub(crate) fn check_group(
    student: &StudentRecord,
    department: &DepartmentRequirement,
) -> Result<(), Disqualification> {
    let Some(group_code) = department.group_code_value() else {
        return Err(Disqualification::MalformedGroupCode {
            raw: department.group_code.clone(),
        });
    };

    if student.eligible_group_codes().contains(&group_code) {
        Ok(())
    } else {
        Err(Disqualification::GroupNotEligible { group_code })
    }
}

pub(crate) fn check_rank_ceiling(
    student: &StudentRecord,
    department: &DepartmentRequirement,
    rank_requirements: &RankRequirements,
) -> Result<(), Disqualification> {
    let Some(ceiling) = rank_requirements.ceiling_for(&department.school_code) else {
        return Ok(());
    };

    match student.rank_percentile_value() {
        Some(actual) if actual > ceiling => {
            Err(Disqualification::RankAboveCeiling { ceiling, actual })
        }
        _ => Ok(()),
    }
}

/// Evaluates every alternative group the department names at least two subjects of, and
/// returns the subjects those groups settled so the per-subject pass can skip them.
pub(crate) fn check_alternative_groups(
    student: &StudentRecord,
    department: &DepartmentRequirement,
    standards: &StandardCatalog,
    policy: &QualificationPolicy,
) -> Result<BTreeSet<AcademicSubject>, Disqualification> {
    let mut resolved = BTreeSet::new();

    for group in &policy.alternative_groups {
        let required: Vec<AcademicSubject> = group
            .subjects
            .iter()
            .copied()
            .filter(|subject| department.requirements.academic.contains_key(subject))
            .collect();

        if required.len() < 2 {
            continue;
        }

        // A missing standard table fails that alternative rather than skipping it.
        let any_passed = required.iter().any(|subject| {
            let tier = classify(
                student.academic_score(*subject),
                standards.academic(*subject),
            );
            passes(tier, department.requirements.academic.get(subject))
        });

        if !any_passed {
            return Err(Disqualification::NoAlternativeSatisfied { subjects: required });
        }

        resolved.extend(required);
    }

    Ok(resolved)
}

pub(crate) fn check_academic_subjects(
    student: &StudentRecord,
    department: &DepartmentRequirement,
    standards: &StandardCatalog,
    resolved: &BTreeSet<AcademicSubject>,
) -> Result<(), Disqualification> {
    for subject in AcademicSubject::ordered() {
        if resolved.contains(&subject) {
            continue;
        }
        let Some(required) = department.requirements.academic.get(&subject) else {
            continue;
        };
        let Some(table) = standards.academic(subject) else {
            debug!(
                subject = subject.label(),
                department = %department.department_name,
                "no standard table; requirement not enforced"
            );
            continue;
        };

        let tier = classify(student.academic_score(subject), Some(table));
        if !passes(tier, Some(required)) {
            return Err(Disqualification::SubjectBelowRequirement {
                subject,
                required: required.label().to_string(),
                actual: tier.map(|tier| tier.label().to_string()),
            });
        }
    }

    Ok(())
}

pub(crate) fn check_listening(
    student: &StudentRecord,
    department: &DepartmentRequirement,
) -> Result<(), Disqualification> {
    let Some(required) = department.requirements.listening.as_deref() else {
        return Ok(());
    };

    let actual = student
        .listening
        .as_deref()
        .filter(|value| !value.trim().is_empty());

    match actual {
        Some(grade) if listening_ordinal(grade) >= listening_ordinal(required) => Ok(()),
        _ => Err(Disqualification::ListeningBelowRequirement {
            required: required.to_string(),
            actual: actual.map(str::to_string),
        }),
    }
}

pub(crate) fn check_skill_subjects(
    student: &StudentRecord,
    department: &DepartmentRequirement,
    standards: &StandardCatalog,
    policy: &QualificationPolicy,
) -> Result<(), Disqualification> {
    for subject in &policy.skill_subjects {
        let Some(required) = department.requirements.skill.get(subject) else {
            continue;
        };
        let Some(table) = standards.skill(*subject) else {
            debug!(
                subject = %subject.label(),
                department = %department.department_name,
                "no standard table; requirement not enforced"
            );
            continue;
        };

        let tier: Option<Tier> = classify(student.skill_score(*subject), Some(table));
        if !passes(tier, Some(required)) {
            return Err(Disqualification::SkillBelowRequirement {
                subject: *subject,
                required: required.label().to_string(),
                actual: tier.map(|tier| tier.label().to_string()),
            });
        }
    }

    Ok(())
}
