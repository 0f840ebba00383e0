use std::collections::BTreeMap;

use tracing::debug;

use super::normalizer::{requirement_text, threshold};
use super::parser::{Sheet, SheetRow};
use super::RosterImportError;
use crate::workflows::eligibility::domain::{
    AcademicSubject, DepartmentRequirement, InternalSubject, RankRequirements, Semester,
    SemesterRankRow, SkillSubject, StandardTable, StudentId, StudentRecord, SubjectRequirements,
};
use crate::workflows::eligibility::levels::{parse_float_prefix, Tier, TierRequirement};
use crate::workflows::preferences::{LotteryResult, PreferenceList, PreferenceStage};

pub(crate) const STUDENT_ID: &str = "學號";
const NAME: &str = "姓名";
const CLASS: &str = "班級";
const SEAT: &str = "座號";
const ELIGIBLE_GROUPS: &str = "可選學群";
const RANK_PERCENTILE: &str = "校排百分比";
const BALLOT_NUMBER: &str = "填榜序號";
const LISTENING: &str = "大考英聽";
const SELECTED: &str = "選取";

const SCHOOL_CODE: &str = "學校代碼";
const SCHOOL_NAME: &str = "學校名稱";
const SCHOOL_ABBREVIATION: &str = "學校簡稱";
const GROUP_CODE: &str = "學群類別代碼";
const GROUP_NAME: &str = "學群類別";
const DEPARTMENT_CODE: &str = "學系代碼";
const DEPARTMENT_NAME: &str = "學系名稱";
const DEPARTMENT_ABBREVIATION: &str = "學系簡稱";
const KEYWORDS: &str = "補充搜尋關鍵詞";
const MAX_PREFERENCES: &str = "可填志願數";
const REQUIREMENT_SUFFIX: &str = "檢定";

const FIRST_PREFERENCE: &str = "志願1";
const LOTTERY_OUTCOME: &str = "撕榜結果";
const LOTTERY_SCHOOL: &str = "大學";
const LOTTERY_GROUP: &str = "學群";

/// Data rows of a standards sheet that carry tier thresholds.
const STANDARD_ROWS: usize = 5;

fn require_column(sheet: &Sheet, header: &'static str) -> Result<(), RosterImportError> {
    match sheet.column(header) {
        Some(_) => Ok(()),
        None => Err(RosterImportError::MissingColumn {
            sheet: sheet.name,
            column: header,
        }),
    }
}

pub(crate) fn students(sheet: &Sheet) -> Result<Vec<StudentRecord>, RosterImportError> {
    require_column(sheet, STUDENT_ID)?;

    let mut students = Vec::with_capacity(sheet.len());
    for row in sheet.rows() {
        let student_id = row.get(STUDENT_ID);
        if student_id.is_empty() {
            debug!(sheet = sheet.name, "skipping row without student id");
            continue;
        }

        let academic_scores = AcademicSubject::ordered()
            .into_iter()
            .map(|subject| (subject, row.get(subject.label()).to_string()))
            .filter(|(_, score)| !score.is_empty())
            .collect();
        let skill_scores = SkillSubject::ordered()
            .into_iter()
            .map(|subject| (subject, row.get(&subject.label()).to_string()))
            .filter(|(_, score)| !score.is_empty())
            .collect();

        students.push(StudentRecord {
            student_id: StudentId::new(student_id),
            name: row.get(NAME).to_string(),
            class_label: row.get(CLASS).to_string(),
            seat_number: row.get(SEAT).to_string(),
            eligible_groups: row.get(ELIGIBLE_GROUPS).to_string(),
            rank_percentile: row.get(RANK_PERCENTILE).to_string(),
            ballot_number: row.get(BALLOT_NUMBER).to_string(),
            academic_scores,
            listening: Some(row.get(LISTENING).to_string()).filter(|value| !value.is_empty()),
            skill_scores,
            selected: row.get(SELECTED).eq_ignore_ascii_case("v"),
        });
    }

    Ok(students)
}

/// `<subject>檢定` wins over a bare `<subject>` column when it has text.
fn requirement_cell<'a>(row: &SheetRow<'a>, subject: &str) -> &'a str {
    let suffixed = row.get(&format!("{subject}{REQUIREMENT_SUFFIX}"));
    if suffixed.is_empty() {
        row.get(subject)
    } else {
        suffixed
    }
}

fn requirements(row: &SheetRow<'_>) -> SubjectRequirements {
    let academic = AcademicSubject::ordered()
        .into_iter()
        .filter_map(|subject| {
            TierRequirement::parse(requirement_cell(row, subject.label()))
                .map(|requirement| (subject, requirement))
        })
        .collect();
    let skill = SkillSubject::ordered()
        .into_iter()
        .filter_map(|subject| {
            TierRequirement::parse(requirement_cell(row, &subject.label()))
                .map(|requirement| (subject, requirement))
        })
        .collect();

    SubjectRequirements {
        academic,
        listening: requirement_text(requirement_cell(row, LISTENING)),
        skill,
    }
}

pub(crate) fn departments(sheet: &Sheet) -> Vec<DepartmentRequirement> {
    sheet
        .rows()
        .map(|row| DepartmentRequirement {
            school_code: row.get(SCHOOL_CODE).to_string(),
            school_name: row.get(SCHOOL_NAME).to_string(),
            school_abbreviation: row.get(SCHOOL_ABBREVIATION).to_string(),
            group_code: row.get(GROUP_CODE).to_string(),
            group_name: row.get(GROUP_NAME).to_string(),
            department_code: row.get(DEPARTMENT_CODE).to_string(),
            department_name: row.get(DEPARTMENT_NAME).to_string(),
            department_abbreviation: row.get(DEPARTMENT_ABBREVIATION).to_string(),
            keywords: row.get(KEYWORDS).to_string(),
            max_preferences: row.get(MAX_PREFERENCES).parse::<u32>().ok(),
            requirements: requirements(&row),
        })
        .collect()
}

/// Tier thresholds per subject column. Column 0 names the tier; only the first five data rows
/// count. A tier missing from the sheet can never be reached.
fn standard_columns(sheet: &Sheet) -> Vec<(String, StandardTable)> {
    let mut tables = Vec::new();

    for (column, subject) in sheet.headers().iter().enumerate().skip(1) {
        if subject.is_empty() {
            continue;
        }

        let mut table = StandardTable::unreachable();
        for row in sheet.rows().take(STANDARD_ROWS) {
            let Some(tier) = Tier::from_label(row.at(0)) else {
                continue;
            };
            let value = threshold(row.at(column));
            match tier {
                Tier::Top => table.top = value,
                Tier::Front => table.front = value,
                Tier::Average => table.average = value,
                Tier::Back => table.back = value,
                Tier::Bottom => table.bottom = value,
                Tier::BelowBottom => {}
            }
        }
        tables.push((subject.clone(), table));
    }

    tables
}

pub(crate) fn academic_standards(sheet: &Sheet) -> BTreeMap<AcademicSubject, StandardTable> {
    standard_columns(sheet)
        .into_iter()
        .filter_map(|(header, table)| match AcademicSubject::from_label(&header) {
            Some(subject) => Some((subject, table)),
            None => {
                debug!(sheet = sheet.name, column = %header, "ignoring unknown subject column");
                None
            }
        })
        .collect()
}

pub(crate) fn skill_standards(sheet: &Sheet) -> BTreeMap<SkillSubject, StandardTable> {
    standard_columns(sheet)
        .into_iter()
        .filter_map(|(header, table)| match SkillSubject::from_label(&header) {
            Some(subject) => Some((subject, table)),
            None => {
                debug!(sheet = sheet.name, column = %header, "ignoring unknown skill column");
                None
            }
        })
        .collect()
}

/// School code in column 0 and the percentage ceiling in column 3, by position.
pub(crate) fn rank_requirements(sheet: &Sheet) -> RankRequirements {
    let mut requirements = RankRequirements::default();
    for row in sheet.rows() {
        let code = row.at(0);
        let percentage = parse_float_prefix(row.at(3));
        match percentage {
            Some(ceiling) if !code.is_empty() => requirements.insert(code, ceiling),
            _ => debug!(sheet = sheet.name, code, "dropping rank requirement row"),
        }
    }
    requirements
}

pub(crate) fn semester_ranks(
    sheet: &Sheet,
) -> Result<BTreeMap<StudentId, SemesterRankRow>, RosterImportError> {
    require_column(sheet, STUDENT_ID)?;

    let mut ranks = BTreeMap::new();
    for row in sheet.rows() {
        let student_id = row.get(STUDENT_ID);
        if student_id.is_empty() {
            continue;
        }

        let subject_ranks = InternalSubject::ordered()
            .into_iter()
            .map(|subject| (subject, row.get(subject.label()).to_string()))
            .filter(|(_, value)| !value.is_empty())
            .collect();
        let semester_averages = Semester::ordered()
            .into_iter()
            .map(|semester| (semester, row.get(semester.label()).to_string()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        ranks.insert(
            StudentId::new(student_id),
            SemesterRankRow {
                subject_ranks,
                semester_averages,
            },
        );
    }

    Ok(ranks)
}

/// Rows of a preference sheet. A sheet without the id or first-choice column yields nothing.
pub(crate) fn preference_lists(
    sheet: &Sheet,
    stage: PreferenceStage,
) -> Vec<(StudentId, PreferenceList)> {
    if sheet.column(STUDENT_ID).is_none() || sheet.column(FIRST_PREFERENCE).is_none() {
        debug!(sheet = sheet.name, "preference sheet lacks id or choice columns");
        return Vec::new();
    }
    if stage == PreferenceStage::PostLottery && sheet.column(LOTTERY_OUTCOME).is_none() {
        debug!(sheet = sheet.name, "post-lottery sheet lacks the lottery column");
        return Vec::new();
    }

    sheet
        .rows()
        .filter_map(|row| {
            let student_id = row.get(STUDENT_ID);
            if student_id.is_empty() {
                return None;
            }

            let lottery = match stage {
                PreferenceStage::PreLottery => None,
                PreferenceStage::PostLottery => {
                    let outcome = row.get(LOTTERY_OUTCOME);
                    if outcome.is_empty() {
                        return None;
                    }
                    Some(LotteryResult {
                        outcome: outcome.to_string(),
                        school_name: row.get(LOTTERY_SCHOOL).to_string(),
                        group_name: row.get(LOTTERY_GROUP).to_string(),
                    })
                }
            };

            let list = PreferenceList {
                stage,
                codes: row.run_from(FIRST_PREFERENCE, stage.limit()),
                lottery,
            };
            Some((StudentId::new(student_id), list))
        })
        .collect()
}
