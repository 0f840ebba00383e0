use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use super::levels::{parse_float_prefix, parse_int_prefix, TierRequirement};

/// Identifier wrapper for students (學號).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl StudentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The six general-exam subjects a department can put a tier requirement on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicSubject {
    Chinese,
    English,
    MathA,
    MathB,
    Social,
    Science,
}

impl AcademicSubject {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Chinese,
            Self::English,
            Self::MathA,
            Self::MathB,
            Self::Social,
            Self::Science,
        ]
    }

    /// Column header used by the score and standards sheets.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chinese => "國文",
            Self::English => "英文",
            Self::MathA => "數學A",
            Self::MathB => "數學B",
            Self::Social => "社會",
            Self::Science => "自然",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ordered()
            .into_iter()
            .find(|subject| subject.label() == trimmed)
    }
}

/// One of the numbered skill (術科) subjects, `1..=SkillSubject::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkillSubject(u8);

impl SkillSubject {
    pub const COUNT: u8 = 5;

    pub fn new(index: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&index).then_some(Self(index))
    }

    pub fn ordered() -> Vec<Self> {
        (1..=Self::COUNT).map(Self).collect()
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub fn label(self) -> String {
        format!("術科項目{}", self.0)
    }

    pub fn from_label(value: &str) -> Option<Self> {
        value
            .trim()
            .strip_prefix("術科項目")
            .and_then(|rest| rest.parse::<u8>().ok())
            .and_then(Self::new)
    }
}

impl Serialize for SkillSubject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("skill_{}", self.0))
    }
}

/// Minimum raw scores for the five graded tiers of one subject.
///
/// Thresholds are expected to be non-increasing from `top` to `bottom`; nothing here enforces
/// it. A tier that never appeared in the source sheet holds `f64::INFINITY` so that it can never
/// be reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardTable {
    pub top: f64,
    pub front: f64,
    pub average: f64,
    pub back: f64,
    pub bottom: f64,
}

impl StandardTable {
    pub const fn new(top: f64, front: f64, average: f64, back: f64, bottom: f64) -> Self {
        Self {
            top,
            front,
            average,
            back,
            bottom,
        }
    }

    pub const fn unreachable() -> Self {
        Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::INFINITY,
            f64::INFINITY,
            f64::INFINITY,
        )
    }
}

/// Per-subject standard tables for both subject families.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandardCatalog {
    pub academic: BTreeMap<AcademicSubject, StandardTable>,
    pub skill: BTreeMap<SkillSubject, StandardTable>,
}

impl StandardCatalog {
    pub fn academic(&self, subject: AcademicSubject) -> Option<&StandardTable> {
        self.academic.get(&subject)
    }

    pub fn skill(&self, subject: SkillSubject) -> Option<&StandardTable> {
        self.skill.get(&subject)
    }
}

/// Maximum acceptable rank percentile per school code (smaller is better).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankRequirements(pub BTreeMap<String, f64>);

impl RankRequirements {
    pub fn insert(&mut self, school_code: impl Into<String>, ceiling: f64) {
        self.0.insert(school_code.into().trim().to_string(), ceiling);
    }

    pub fn ceiling_for(&self, school_code: &str) -> Option<f64> {
        self.0.get(school_code.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One roster row. Score cells keep their source text; the engine coerces them on use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentRecord {
    pub student_id: StudentId,
    pub name: String,
    pub class_label: String,
    pub seat_number: String,
    /// Comma separated group-category codes (可選學群), e.g. `"01, 02"`.
    pub eligible_groups: String,
    pub rank_percentile: String,
    pub ballot_number: String,
    pub academic_scores: BTreeMap<AcademicSubject, String>,
    pub listening: Option<String>,
    pub skill_scores: BTreeMap<SkillSubject, String>,
    /// Marked with `V` in the 選取 column for the next batch export.
    pub selected: bool,
}

impl StudentRecord {
    /// Group codes parsed the permissive way the sheet is filled in; junk entries are dropped.
    pub fn eligible_group_codes(&self) -> Vec<i64> {
        self.eligible_groups
            .split(',')
            .filter_map(parse_int_prefix)
            .collect()
    }

    pub fn has_eligible_groups(&self) -> bool {
        !self.eligible_groups.trim().is_empty()
    }

    pub fn rank_percentile_value(&self) -> Option<f64> {
        parse_float_prefix(&self.rank_percentile)
    }

    pub fn academic_score(&self, subject: AcademicSubject) -> Option<&str> {
        self.academic_scores.get(&subject).map(String::as_str)
    }

    pub fn skill_score(&self, subject: SkillSubject) -> Option<&str> {
        self.skill_scores.get(&subject).map(String::as_str)
    }
}

/// Sparse requirement set of one department. Absent keys mean "no requirement".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubjectRequirements {
    pub academic: BTreeMap<AcademicSubject, TierRequirement>,
    pub listening: Option<String>,
    pub skill: BTreeMap<SkillSubject, TierRequirement>,
}

/// One school × group × department row of the requirement catalog (校系分則).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DepartmentRequirement {
    pub school_code: String,
    pub school_name: String,
    pub school_abbreviation: String,
    pub group_code: String,
    pub group_name: String,
    pub department_code: String,
    pub department_name: String,
    pub department_abbreviation: String,
    pub keywords: String,
    pub max_preferences: Option<u32>,
    pub requirements: SubjectRequirements,
}

impl DepartmentRequirement {
    pub fn group_code_value(&self) -> Option<i64> {
        parse_int_prefix(&self.group_code)
    }

    /// School code as used for grouping; unparseable codes sort as 0.
    pub fn school_code_value(&self) -> i64 {
        parse_int_prefix(&self.school_code).unwrap_or(0)
    }

    pub fn department_code_value(&self) -> i64 {
        parse_int_prefix(&self.department_code).unwrap_or(0)
    }
}

/// Subjects with an internal school rank in the semester sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalSubject {
    Chinese,
    English,
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    EarthScience,
    Civics,
    History,
    Geography,
}

impl InternalSubject {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Chinese,
            Self::English,
            Self::Mathematics,
            Self::Physics,
            Self::Chemistry,
            Self::Biology,
            Self::EarthScience,
            Self::Civics,
            Self::History,
            Self::Geography,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Chinese => "國文",
            Self::English => "英文",
            Self::Mathematics => "數學",
            Self::Physics => "物理",
            Self::Chemistry => "化學",
            Self::Biology => "生物",
            Self::EarthScience => "地科",
            Self::Civics => "公民",
            Self::History => "歷史",
            Self::Geography => "地理",
        }
    }
}

/// Semesters with a recorded average, latest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
    Grade12Fall,
    Grade11Spring,
    Grade11Fall,
    Grade10Spring,
    Grade10Fall,
}

impl Semester {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Grade12Fall,
            Self::Grade11Spring,
            Self::Grade11Fall,
            Self::Grade10Spring,
            Self::Grade10Fall,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Grade12Fall => "高三上",
            Self::Grade11Spring => "高二下",
            Self::Grade11Fall => "高二上",
            Self::Grade10Spring => "高一下",
            Self::Grade10Fall => "高一上",
        }
    }
}

/// Internal ranks and semester averages of one student (各科校排學期平均).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SemesterRankRow {
    pub subject_ranks: BTreeMap<InternalSubject, String>,
    pub semester_averages: BTreeMap<Semester, String>,
}

/// Read-only snapshot of every sheet the engine consumes during one run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub students: Vec<StudentRecord>,
    pub departments: Vec<DepartmentRequirement>,
    pub standards: StandardCatalog,
    pub rank_requirements: RankRequirements,
    pub semester_ranks: BTreeMap<StudentId, SemesterRankRow>,
}

impl ReferenceData {
    pub fn find_student(&self, student_id: &str) -> Option<&StudentRecord> {
        let wanted = student_id.trim();
        self.students
            .iter()
            .find(|student| student.student_id.as_str() == wanted)
    }

    pub fn semester_row(&self, student_id: &StudentId) -> Option<&SemesterRankRow> {
        self.semester_ranks.get(student_id)
    }

    pub fn student_ids(&self) -> Vec<StudentId> {
        self.students
            .iter()
            .map(|student| student.student_id.clone())
            .collect()
    }

    /// Ids of the students marked for export, in roster order.
    pub fn selected_student_ids(&self) -> Vec<StudentId> {
        self.students
            .iter()
            .filter(|student| student.selected)
            .map(|student| student.student_id.clone())
            .collect()
    }
}
