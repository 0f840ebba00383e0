//! Department eligibility: tier classification, per-department qualification checks, the
//! catalog scan, and the grouped per-student result record.
//!
//! The engine only ever sees typed records. Loading them from the sheet exports is the job of
//! [`crate::workflows::roster`].

pub mod domain;
pub mod evaluation;
pub mod levels;
pub mod report;
pub mod router;
pub mod scanner;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AcademicSubject, DepartmentRequirement, InternalSubject, RankRequirements, ReferenceData,
    Semester, SemesterRankRow, SkillSubject, StandardCatalog, StandardTable, StudentId,
    StudentRecord, SubjectRequirements,
};
pub use evaluation::{
    is_qualified, AlternativeSubjectGroup, Disqualification, QualificationEngine,
    QualificationOutcome, QualificationPolicy,
};
pub use levels::{classify, passes, Tier, TierRequirement};
pub use report::{SchoolGroupBucket, StudentResult};
pub use router::eligibility_router;
pub use scanner::scan;
pub use service::{
    BatchFailure, BatchReport, BatchSuccess, DepartmentEvaluation, EligibilityError,
    EligibilityService,
};
