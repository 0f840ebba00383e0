use super::domain::{DepartmentRequirement, StudentRecord};
use super::evaluation::QualificationEngine;

/// Every department the student qualifies for, in catalog order.
pub fn scan<'d>(
    student: &StudentRecord,
    departments: &'d [DepartmentRequirement],
    engine: &QualificationEngine<'_>,
) -> Vec<&'d DepartmentRequirement> {
    departments
        .iter()
        .filter(|department| engine.is_qualified(student, department))
        .collect()
}
