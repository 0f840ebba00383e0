use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{
    DepartmentChoice, DetailedPreference, PreferenceError, PreferenceList, PreferenceStage,
    PreferenceWindow,
};
use super::repository::{PreferenceRepository, RepositoryError, StoredPreferences};
use crate::workflows::eligibility::{EligibilityError, EligibilityService, StudentId};

/// Stage-gated preference editing on top of the eligibility results.
pub struct PreferenceService<R> {
    repository: Arc<R>,
    eligibility: Arc<EligibilityService>,
    window: PreferenceWindow,
}

impl<R> PreferenceService<R>
where
    R: PreferenceRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        eligibility: Arc<EligibilityService>,
        window: PreferenceWindow,
    ) -> Self {
        Self {
            repository,
            eligibility,
            window,
        }
    }

    pub fn window(&self) -> &PreferenceWindow {
        &self.window
    }

    pub fn setup(&self, now: DateTime<Utc>) -> SetupView {
        SetupView {
            stage: self.window.stage,
            stage_label: self.window.stage.label(),
            limit: self.window.stage.limit(),
            starts_at: self.window.starts_at,
            ends_at: self.window.ends_at,
            is_open: self.accepts_edits_at(now),
        }
    }

    /// The pre-lottery list can only change inside the window; the post-lottery list is
    /// gated by the lottery result instead.
    fn accepts_edits_at(&self, now: DateTime<Utc>) -> bool {
        match self.window.stage {
            PreferenceStage::PreLottery => self.window.is_open(wall_clock(now)),
            PreferenceStage::PostLottery => true,
        }
    }

    /// The stored list for the current stage, or an empty one.
    pub fn load(&self, student_id: &str) -> Result<PreferenceList, PreferenceServiceError> {
        let student_id = StudentId::new(student_id);
        let stored = self.repository.fetch(&student_id, self.window.stage)?;
        Ok(stored
            .map(|record| record.list)
            .unwrap_or_else(|| PreferenceList::new(self.window.stage)))
    }

    pub fn choices(
        &self,
        student_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<DepartmentChoice>, PreferenceServiceError> {
        let result = self.eligibility.build_student_result(student_id, now)?;
        Ok(DepartmentChoice::from_result(&result))
    }

    pub fn overview(
        &self,
        student_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PreferenceOverview, PreferenceServiceError> {
        let choices = self.choices(student_id, now)?;
        let list = self.load(student_id)?;

        Ok(PreferenceOverview {
            student_id: StudentId::new(student_id),
            stage: list.stage,
            limit: list.limit(),
            is_open: self.accepts_edits_at(now),
            ranking_name: list.lottery.as_ref().and_then(|lottery| lottery.ranking_name()),
            entries: list.detailed(&choices),
        })
    }

    /// Validate `codes` against the student's qualified choices and persist them as the
    /// list for the current stage.
    pub fn save(
        &self,
        student_id: &str,
        codes: Vec<String>,
        qualified_choices: &[DepartmentChoice],
        now: DateTime<Utc>,
    ) -> Result<StoredPreferences, PreferenceServiceError> {
        let student_id = StudentId::new(student_id);
        let stage = self.window.stage;

        if !self.accepts_edits_at(now) {
            return Err(PreferenceError::WindowClosed.into());
        }

        let lottery = match stage {
            PreferenceStage::PreLottery => None,
            PreferenceStage::PostLottery => {
                let existing = self.repository.fetch(&student_id, stage)?;
                let lottery = existing.and_then(|record| record.list.lottery);
                Some(lottery.ok_or(PreferenceError::LotteryPending)?)
            }
        };

        let codes: Vec<String> = codes
            .into_iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();
        let list = PreferenceList {
            stage,
            codes,
            lottery,
        };
        list.validate(qualified_choices)?;

        let count = list.len();
        let stored = self.repository.upsert(StoredPreferences {
            student_id: student_id.clone(),
            list,
            saved_at: Some(now),
        })?;
        info!(
            student_id = %student_id.as_str(),
            stage = stage.label(),
            count,
            "saved preference list"
        );

        Ok(stored)
    }

    /// [`save`](Self::save) with the qualified choices computed from the loaded roster.
    pub fn submit(
        &self,
        student_id: &str,
        codes: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<StoredPreferences, PreferenceServiceError> {
        let choices = self.choices(student_id, now)?;
        self.save(student_id, codes, &choices, now)
    }

    /// Load lists imported from the preference sheets without rule checks.
    pub fn seed(&self, records: Vec<StoredPreferences>) -> Result<usize, PreferenceServiceError> {
        let mut seeded = 0;
        for record in records {
            self.repository.upsert(record)?;
            seeded += 1;
        }
        Ok(seeded)
    }
}

fn wall_clock(now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&Local).naive_local()
}

/// Public description of the current editing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupView {
    pub stage: PreferenceStage,
    pub stage_label: &'static str,
    pub limit: usize,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub is_open: bool,
}

/// A student's list for the current stage with every code resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceOverview {
    pub student_id: StudentId,
    pub stage: PreferenceStage,
    pub limit: usize,
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_name: Option<String>,
    pub entries: Vec<DetailedPreference>,
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceServiceError {
    #[error(transparent)]
    Rule(#[from] PreferenceError),
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
