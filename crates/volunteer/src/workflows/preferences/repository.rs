use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{PreferenceList, PreferenceStage};
use crate::workflows::eligibility::StudentId;

/// A student's saved list for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPreferences {
    pub student_id: StudentId,
    pub list: PreferenceList,
    /// `None` for lists seeded from the sheet exports.
    pub saved_at: Option<DateTime<Utc>>,
}

impl StoredPreferences {
    pub fn stage(&self) -> PreferenceStage {
        self.list.stage
    }
}

/// Storage abstraction keyed by student and stage.
pub trait PreferenceRepository: Send + Sync {
    /// Insert or replace the list for the record's student and stage.
    fn upsert(&self, record: StoredPreferences) -> Result<StoredPreferences, RepositoryError>;
    fn fetch(
        &self,
        student_id: &StudentId,
        stage: PreferenceStage,
    ) -> Result<Option<StoredPreferences>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
