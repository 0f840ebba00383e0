mod aggregate;
pub mod views;

pub use aggregate::{aggregate, group_departments, pass_ratio};
pub use views::{
    DepartmentEntry, InternalScores, PersonalInfo, QualificationStatistics, SchoolGroupBucket,
    StudentResult,
};
