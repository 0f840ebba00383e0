use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;
use volunteer::error::AppError;
use volunteer::workflows::eligibility::{EligibilityService, StudentId};
use volunteer::workflows::preferences::{
    PreferenceRepository, PreferenceService, PreferenceStage, PreferenceWindow, RepositoryError,
    StoredPreferences,
};
use volunteer::workflows::roster::{Roster, RosterImporter};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPreferenceRepository {
    records: Arc<Mutex<HashMap<(StudentId, PreferenceStage), StoredPreferences>>>,
}

impl PreferenceRepository for InMemoryPreferenceRepository {
    fn upsert(&self, record: StoredPreferences) -> Result<StoredPreferences, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert((record.student_id.clone(), record.stage()), record.clone());
        Ok(record)
    }

    fn fetch(
        &self,
        student_id: &StudentId,
        stage: PreferenceStage,
    ) -> Result<Option<StoredPreferences>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&(student_id.clone(), stage)).cloned())
    }
}

pub(crate) type AppPreferenceService = PreferenceService<InMemoryPreferenceRepository>;

pub(crate) struct Services {
    pub(crate) eligibility: Arc<EligibilityService>,
    pub(crate) preferences: Arc<AppPreferenceService>,
}

pub(crate) fn load_roster(data_dir: &Path) -> Result<Roster, AppError> {
    info!(data_dir = %data_dir.display(), "loading roster");
    Ok(RosterImporter::from_dir(data_dir)?)
}

/// Wire both services over one roster and seed the repository with the imported lists.
pub(crate) fn build_services(roster: Roster, window: PreferenceWindow) -> Result<Services, AppError> {
    let Roster {
        reference,
        preferences,
    } = roster;

    let eligibility = Arc::new(EligibilityService::new(Arc::new(reference)));
    let repository = Arc::new(InMemoryPreferenceRepository::default());
    let service = PreferenceService::new(repository, eligibility.clone(), window);
    let seeded = service.seed(preferences)?;
    info!(seeded, stage = window.stage.label(), "preference repository ready");

    Ok(Services {
        eligibility,
        preferences: Arc::new(service),
    })
}
