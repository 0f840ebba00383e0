//! Preference lists: the pre-lottery list of up to 20 departments and the post-lottery list
//! of up to 50, both restricted to the departments the student qualifies for.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    parse_window_time, AddStatus, DepartmentChoice, DetailedPreference, LotteryResult,
    PreferenceError, PreferenceList, PreferenceStage, PreferenceWindow,
};
pub use repository::{PreferenceRepository, RepositoryError, StoredPreferences};
pub use router::{preference_router, SavePreferencesRequest};
pub use service::{PreferenceOverview, PreferenceService, PreferenceServiceError, SetupView};
