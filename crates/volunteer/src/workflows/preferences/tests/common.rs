use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::eligibility::{
    DepartmentRequirement, EligibilityService, ReferenceData, StudentId, StudentRecord,
};
use crate::workflows::preferences::domain::{
    parse_window_time, LotteryResult, PreferenceList, PreferenceStage, PreferenceWindow,
};
use crate::workflows::preferences::repository::{
    PreferenceRepository, RepositoryError, StoredPreferences,
};
use crate::workflows::preferences::PreferenceService;

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<HashMap<(StudentId, PreferenceStage), StoredPreferences>>,
}

impl MemoryRepository {
    pub(super) fn stored(
        &self,
        student_id: &str,
        stage: PreferenceStage,
    ) -> Option<StoredPreferences> {
        self.records
            .lock()
            .expect("lock")
            .get(&(StudentId::new(student_id), stage))
            .cloned()
    }
}

impl PreferenceRepository for MemoryRepository {
    fn upsert(&self, record: StoredPreferences) -> Result<StoredPreferences, RepositoryError> {
        let key = (record.student_id.clone(), record.stage());
        self.records
            .lock()
            .expect("lock")
            .insert(key, record.clone());
        Ok(record)
    }

    fn fetch(
        &self,
        student_id: &StudentId,
        stage: PreferenceStage,
    ) -> Result<Option<StoredPreferences>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .get(&(student_id.clone(), stage))
            .cloned())
    }
}

pub(super) struct UnavailableRepository;

impl PreferenceRepository for UnavailableRepository {
    fn upsert(&self, _record: StoredPreferences) -> Result<StoredPreferences, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(
        &self,
        _student_id: &StudentId,
        _stage: PreferenceStage,
    ) -> Result<Option<StoredPreferences>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}

fn department(school: (&str, &str), group: (&str, &str), code: &str) -> DepartmentRequirement {
    DepartmentRequirement {
        school_code: school.0.to_string(),
        school_name: school.1.to_string(),
        group_code: group.0.to_string(),
        group_name: group.1.to_string(),
        department_code: code.to_string(),
        department_name: format!("Department {code}"),
        ..DepartmentRequirement::default()
    }
}

pub(super) fn eligibility() -> Arc<EligibilityService> {
    let student = StudentRecord {
        student_id: StudentId::new("S001"),
        name: "Lin".to_string(),
        eligible_groups: "1,2".to_string(),
        ..StudentRecord::default()
    };

    let reference = ReferenceData {
        students: vec![student],
        departments: vec![
            department(("5", "Alpha"), ("2", "Engineering"), "101"),
            department(("5", "Alpha"), ("2", "Engineering"), "102"),
            department(("6", "Beta"), ("1", "Arts"), "201"),
        ],
        ..ReferenceData::default()
    };
    Arc::new(EligibilityService::new(Arc::new(reference)))
}

pub(super) fn service_with<R>(repository: Arc<R>, window: PreferenceWindow) -> PreferenceService<R>
where
    R: PreferenceRepository + 'static,
{
    PreferenceService::new(repository, eligibility(), window)
}

pub(super) fn open_window(stage: PreferenceStage) -> PreferenceWindow {
    PreferenceWindow::always_open(stage)
}

pub(super) fn closed_window() -> PreferenceWindow {
    PreferenceWindow {
        stage: PreferenceStage::PreLottery,
        starts_at: parse_window_time("2000/01/01 08:00:00"),
        ends_at: parse_window_time("2000/01/02 17:00:00"),
    }
}

pub(super) fn lottery_record(student_id: &str) -> StoredPreferences {
    StoredPreferences {
        student_id: StudentId::new(student_id),
        list: PreferenceList {
            stage: PreferenceStage::PostLottery,
            codes: Vec::new(),
            lottery: Some(LotteryResult {
                outcome: "正取".to_string(),
                school_name: "Alpha".to_string(),
                group_name: "Engineering".to_string(),
            }),
        },
        saved_at: None,
    }
}

pub(super) fn codes(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
