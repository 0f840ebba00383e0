use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{ReferenceData, StudentId};
use super::evaluation::{QualificationEngine, QualificationOutcome, QualificationPolicy};
use super::report::{aggregate, StudentResult};
use super::scanner::scan;

/// Builds per-student result records from one loaded reference snapshot.
pub struct EligibilityService {
    reference: Arc<ReferenceData>,
    policy: QualificationPolicy,
}

impl EligibilityService {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self::with_policy(reference, QualificationPolicy::default())
    }

    pub fn with_policy(reference: Arc<ReferenceData>, policy: QualificationPolicy) -> Self {
        Self { reference, policy }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn policy(&self) -> &QualificationPolicy {
        &self.policy
    }

    fn engine(&self) -> QualificationEngine<'_> {
        QualificationEngine::new(
            &self.reference.standards,
            &self.reference.rank_requirements,
            &self.policy,
        )
    }

    /// Scan the whole catalog for one student and assemble the result record.
    pub fn build_student_result(
        &self,
        student_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StudentResult, EligibilityError> {
        let student = self
            .reference
            .find_student(student_id)
            .ok_or_else(|| EligibilityError::StudentNotFound(StudentId::new(student_id)))?;

        if !student.has_eligible_groups() {
            return Err(EligibilityError::MissingEligibleGroups(
                student.student_id.clone(),
            ));
        }

        let engine = self.engine();
        let qualified = scan(student, &self.reference.departments, &engine);
        debug!(
            student_id = %student.student_id.as_str(),
            qualified = qualified.len(),
            catalog = self.reference.departments.len(),
            "scanned department catalog"
        );

        aggregate(
            student,
            &qualified,
            &self.reference.standards,
            self.reference.semester_row(&student.student_id),
            self.reference.departments.len(),
            now,
        )
    }

    /// Every department of the catalog with the outcome for this student, in catalog order.
    pub fn explain(&self, student_id: &str) -> Result<Vec<DepartmentEvaluation>, EligibilityError> {
        let student = self
            .reference
            .find_student(student_id)
            .ok_or_else(|| EligibilityError::StudentNotFound(StudentId::new(student_id)))?;

        let engine = self.engine();
        Ok(self
            .reference
            .departments
            .iter()
            .map(|department| DepartmentEvaluation {
                school_code: department.school_code.clone(),
                group_code: department.group_code.clone(),
                department_code: department.department_code.clone(),
                department_name: department.department_name.clone(),
                outcome: engine.evaluate(student, department),
            })
            .collect())
    }

    /// Build results for many students; a failure is recorded and the loop moves on.
    pub fn build_batch(&self, student_ids: &[StudentId], now: DateTime<Utc>) -> BatchReport {
        let mut report = BatchReport::default();

        for student_id in student_ids {
            match self.build_student_result(student_id.as_str(), now) {
                Ok(result) => report.succeeded.push(BatchSuccess {
                    student_id: student_id.clone(),
                    qualified_count: result.department_count(),
                    bucket_count: result.school_groups.len(),
                    result,
                }),
                Err(error) => {
                    warn!(student_id = %student_id.as_str(), %error, "skipping student");
                    report.failed.push(BatchFailure {
                        student_id: student_id.clone(),
                        message: error.to_string(),
                    });
                }
            }
        }

        report
    }
}

/// Per-department outcome, used to explain why a department is missing from a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentEvaluation {
    pub school_code: String,
    pub group_code: String,
    pub department_code: String,
    pub department_name: String,
    pub outcome: QualificationOutcome,
}

/// Outcome of a skip-and-continue batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[derive(Debug, Serialize)]
pub struct BatchSuccess {
    pub student_id: StudentId,
    pub qualified_count: usize,
    pub bucket_count: usize,
    #[serde(skip)]
    pub result: StudentResult,
}

#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub student_id: StudentId,
    pub message: String,
}

/// Fatal, per-student failures while building a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("student {} not found in roster", .0.as_str())]
    StudentNotFound(StudentId),
    #[error("student {} has no eligible group codes", .0.as_str())]
    MissingEligibleGroups(StudentId),
}

impl EligibilityError {
    pub fn student_id(&self) -> &StudentId {
        match self {
            Self::StudentNotFound(id) | Self::MissingEligibleGroups(id) => id,
        }
    }
}
