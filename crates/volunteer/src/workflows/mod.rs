pub mod eligibility;
pub mod preferences;
pub mod roster;
