use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::StudentResult;

/// Which preference list is currently being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceStage {
    /// Before the placement lottery (撕榜前).
    PreLottery,
    /// After the lottery, ranking departments inside the drawn school group (撕榜後).
    PostLottery,
}

impl PreferenceStage {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "撕榜前" => return Some(Self::PreLottery),
            "撕榜後" => return Some(Self::PostLottery),
            _ => {}
        }

        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pre_lottery" | "pre" => Some(Self::PreLottery),
            "post_lottery" | "post" => Some(Self::PostLottery),
            _ => None,
        }
    }

    pub const fn limit(self) -> usize {
        match self {
            Self::PreLottery => 20,
            Self::PostLottery => 50,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PreLottery => "撕榜前",
            Self::PostLottery => "撕榜後",
        }
    }
}

/// Editing window for the current stage. Bounds are wall-clock times as entered by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceWindow {
    pub stage: PreferenceStage,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
}

impl PreferenceWindow {
    pub fn always_open(stage: PreferenceStage) -> Self {
        Self {
            stage,
            starts_at: None,
            ends_at: None,
        }
    }

    /// Open when either bound is unset, otherwise when `now` falls inside both bounds.
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        match (self.starts_at, self.ends_at) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => true,
        }
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS` and the slash-separated form used in the setup sheet.
/// A bare date means midnight.
pub fn parse_window_time(value: &str) -> Option<NaiveDateTime> {
    let normalized = value.trim().replace('/', "-");
    if normalized.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Outcome of the placement lottery for one student (撕榜結果).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryResult {
    pub outcome: String,
    pub school_name: String,
    pub group_name: String,
}

impl LotteryResult {
    /// "school group" when both names are known.
    pub fn ranking_name(&self) -> Option<String> {
        if self.school_name.is_empty() || self.group_name.is_empty() {
            None
        } else {
            Some(format!("{} {}", self.school_name, self.group_name))
        }
    }

    /// Whether a choice belongs to the drawn school group. Unknown names restrict nothing.
    pub fn admits(&self, choice: &DepartmentChoice) -> bool {
        if self.ranking_name().is_none() {
            return true;
        }
        choice.school_name == self.school_name && choice.group_name == self.group_name
    }
}

/// One selectable department, flattened out of a student's grouped result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentChoice {
    pub school_code: String,
    pub school_name: String,
    pub group_code: String,
    pub group_name: String,
    pub department_code: String,
    pub department_name: String,
    /// `school-group-department`, the code stored in preference lists.
    pub full_code: String,
    /// `school-group`; pre-lottery lists hold at most one department per value.
    pub school_group_code: String,
    pub search_text: String,
}

impl DepartmentChoice {
    pub fn new(
        school: (&str, &str),
        group: (&str, &str),
        department: (&str, &str),
    ) -> Self {
        let (school_code, school_name) = school;
        let (group_code, group_name) = group;
        let (department_code, department_name) = department;

        Self {
            school_code: school_code.to_string(),
            school_name: school_name.to_string(),
            group_code: group_code.to_string(),
            group_name: group_name.to_string(),
            department_code: department_code.to_string(),
            department_name: department_name.to_string(),
            full_code: format!("{school_code}-{group_code}-{department_code}"),
            school_group_code: format!("{school_code}-{group_code}"),
            search_text: format!("{school_name} {group_name} {department_name}"),
        }
    }

    pub fn from_result(result: &StudentResult) -> Vec<Self> {
        result
            .school_groups
            .iter()
            .flat_map(|bucket| {
                let school_code = bucket.school_code.to_string();
                let group_code = bucket.group_code.to_string();
                bucket.departments.iter().map(move |entry| {
                    Self::new(
                        (school_code.as_str(), bucket.school_name.as_str()),
                        (group_code.as_str(), bucket.group_name.as_str()),
                        (
                            entry.department_code.to_string().as_str(),
                            entry.department_name.as_str(),
                        ),
                    )
                })
            })
            .collect()
    }
}

/// What adding a choice to a list would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum AddStatus {
    Ok,
    Selected,
    Replace { existing_index: usize },
    Full,
}

/// A stored code resolved against the student's current choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedPreference {
    pub rank: usize,
    pub code: String,
    pub choice: Option<DepartmentChoice>,
}

impl DetailedPreference {
    /// The code no longer matches any qualified department.
    pub fn is_missing(&self) -> bool {
        self.choice.is_none()
    }
}

/// Ordered preference codes for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceList {
    pub stage: PreferenceStage,
    pub codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lottery: Option<LotteryResult>,
}

impl PreferenceList {
    pub fn new(stage: PreferenceStage) -> Self {
        Self {
            stage,
            codes: Vec::new(),
            lottery: None,
        }
    }

    pub fn with_codes(stage: PreferenceStage, codes: Vec<String>) -> Self {
        Self {
            stage,
            codes,
            lottery: None,
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.stage.limit()
    }

    pub fn check_add(&self, choice: &DepartmentChoice) -> AddStatus {
        if self.codes.iter().any(|code| code == &choice.full_code) {
            return AddStatus::Selected;
        }

        if self.stage == PreferenceStage::PreLottery {
            if let Some(existing_index) = self
                .codes
                .iter()
                .position(|code| school_group_of(code) == choice.school_group_code)
            {
                return AddStatus::Replace { existing_index };
            }
        }

        if self.codes.len() >= self.limit() {
            return AddStatus::Full;
        }

        AddStatus::Ok
    }

    pub fn add(&mut self, choice: &DepartmentChoice) -> Result<(), PreferenceError> {
        self.ensure_editable(choice)?;

        match self.check_add(choice) {
            AddStatus::Ok => {
                self.codes.push(choice.full_code.clone());
                Ok(())
            }
            AddStatus::Selected => Err(PreferenceError::Duplicate(choice.full_code.clone())),
            AddStatus::Replace { existing_index } => Err(PreferenceError::SchoolGroupConflict {
                existing: self.codes[existing_index].clone(),
                incoming: choice.full_code.clone(),
            }),
            AddStatus::Full => Err(PreferenceError::LimitExceeded {
                limit: self.limit(),
                count: self.codes.len() + 1,
            }),
        }
    }

    /// Swap in a different department at the same position.
    pub fn replace(&mut self, index: usize, choice: &DepartmentChoice) -> Result<(), PreferenceError> {
        self.ensure_index(index)?;
        self.ensure_editable(choice)?;

        if let Some(position) = self.codes.iter().position(|code| code == &choice.full_code) {
            if position != index {
                return Err(PreferenceError::Duplicate(choice.full_code.clone()));
            }
        }

        self.codes[index] = choice.full_code.clone();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<String, PreferenceError> {
        self.ensure_index(index)?;
        Ok(self.codes.remove(index))
    }

    /// Moving the first entry up is a no-op.
    pub fn move_up(&mut self, index: usize) -> Result<(), PreferenceError> {
        self.ensure_index(index)?;
        if index > 0 {
            self.codes.swap(index - 1, index);
        }
        Ok(())
    }

    /// Moving the last entry down is a no-op.
    pub fn move_down(&mut self, index: usize) -> Result<(), PreferenceError> {
        self.ensure_index(index)?;
        if index + 1 < self.codes.len() {
            self.codes.swap(index, index + 1);
        }
        Ok(())
    }

    pub fn detailed(&self, choices: &[DepartmentChoice]) -> Vec<DetailedPreference> {
        self.codes
            .iter()
            .enumerate()
            .map(|(index, code)| DetailedPreference {
                rank: index + 1,
                code: code.clone(),
                choice: choices
                    .iter()
                    .find(|choice| &choice.full_code == code)
                    .cloned(),
            })
            .collect()
    }

    /// Full rule check used before a list is persisted.
    pub fn validate(&self, choices: &[DepartmentChoice]) -> Result<(), PreferenceError> {
        if self.stage == PreferenceStage::PostLottery && self.lottery.is_none() {
            return Err(PreferenceError::LotteryPending);
        }

        if self.codes.len() > self.limit() {
            return Err(PreferenceError::LimitExceeded {
                limit: self.limit(),
                count: self.codes.len(),
            });
        }

        let mut seen_groups: Vec<(&str, &str)> = Vec::with_capacity(self.codes.len());
        for (index, code) in self.codes.iter().enumerate() {
            if self.codes[..index].contains(code) {
                return Err(PreferenceError::Duplicate(code.clone()));
            }

            let choice = choices
                .iter()
                .find(|choice| &choice.full_code == code)
                .ok_or_else(|| PreferenceError::NotQualified(code.clone()))?;

            if let Some(lottery) = &self.lottery {
                if !lottery.admits(choice) {
                    return Err(PreferenceError::OutsideLotteryGroup(code.clone()));
                }
            }

            if self.stage == PreferenceStage::PreLottery {
                if let Some((_, existing)) = seen_groups
                    .iter()
                    .find(|(group, _)| *group == choice.school_group_code)
                {
                    return Err(PreferenceError::SchoolGroupConflict {
                        existing: existing.to_string(),
                        incoming: code.clone(),
                    });
                }
                seen_groups.push((choice.school_group_code.as_str(), code.as_str()));
            }
        }

        Ok(())
    }

    fn ensure_index(&self, index: usize) -> Result<(), PreferenceError> {
        if index < self.codes.len() {
            Ok(())
        } else {
            Err(PreferenceError::IndexOutOfRange {
                index,
                len: self.codes.len(),
            })
        }
    }

    fn ensure_editable(&self, choice: &DepartmentChoice) -> Result<(), PreferenceError> {
        if self.stage != PreferenceStage::PostLottery {
            return Ok(());
        }
        match &self.lottery {
            None => Err(PreferenceError::LotteryPending),
            Some(lottery) if !lottery.admits(choice) => {
                Err(PreferenceError::OutsideLotteryGroup(choice.full_code.clone()))
            }
            Some(_) => Ok(()),
        }
    }
}

fn school_group_of(code: &str) -> &str {
    match code.rfind('-') {
        Some(split) => &code[..split],
        None => code,
    }
}

/// Rule violations when editing or saving a preference list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceError {
    #[error("the preference window is closed")]
    WindowClosed,
    #[error("post-lottery preferences need a lottery result first")]
    LotteryPending,
    #[error("at most {limit} preferences allowed (got {count})")]
    LimitExceeded { limit: usize, count: usize },
    #[error("preference {0} is listed more than once")]
    Duplicate(String),
    #[error("preference {0} is not among the student's qualified departments")]
    NotQualified(String),
    #[error("preference {incoming} shares a school group with {existing}")]
    SchoolGroupConflict { existing: String, incoming: String },
    #[error("preference {0} is outside the drawn school group")]
    OutsideLotteryGroup(String),
    #[error("no preference at position {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
