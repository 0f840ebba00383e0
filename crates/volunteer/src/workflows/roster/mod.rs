//! Typed loading of the sheet exports (UTF-8 CSV with a header row) into [`ReferenceData`]
//! and the stored preference lists.

mod mapping;
mod normalizer;
mod parser;

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::workflows::eligibility::{ReferenceData, StandardCatalog};
use crate::workflows::preferences::{PreferenceStage, StoredPreferences};

pub const STUDENTS_FILE: &str = "students.csv";
pub const DEPARTMENTS_FILE: &str = "departments.csv";
pub const GSAT_STANDARDS_FILE: &str = "gsat_standards.csv";
pub const SKILL_STANDARDS_FILE: &str = "skill_standards.csv";
pub const RANK_REQUIREMENTS_FILE: &str = "rank_requirements.csv";
pub const SEMESTER_RANKS_FILE: &str = "semester_ranks.csv";
pub const PREFERENCES_FILE: &str = "preferences.csv";
pub const POST_LOTTERY_FILE: &str = "post_lottery.csv";

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid CSV in {sheet}: {source}")]
    Csv {
        sheet: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("required sheet {0} is missing")]
    MissingSheet(PathBuf),
    #[error("sheet {sheet} has no {column} column")]
    MissingColumn {
        sheet: &'static str,
        column: &'static str,
    },
}

/// Readers for every sheet. The four required sheets are plain values; the rest may be absent.
pub struct RosterSources<R> {
    pub students: R,
    pub departments: R,
    pub gsat_standards: R,
    pub skill_standards: R,
    pub rank_requirements: Option<R>,
    pub semester_ranks: Option<R>,
    pub preferences: Option<R>,
    pub post_lottery: Option<R>,
}

impl<R> RosterSources<R> {
    pub fn required(students: R, departments: R, gsat_standards: R, skill_standards: R) -> Self {
        Self {
            students,
            departments,
            gsat_standards,
            skill_standards,
            rank_requirements: None,
            semester_ranks: None,
            preferences: None,
            post_lottery: None,
        }
    }
}

/// Everything one import produces.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub reference: ReferenceData,
    /// Lists found in the preference sheets, ready to seed a repository.
    pub preferences: Vec<StoredPreferences>,
}

pub struct RosterImporter;

impl RosterImporter {
    /// Load the standard file set from `dir`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Roster, RosterImportError> {
        let dir = dir.as_ref();
        let sources = RosterSources {
            students: open_required(dir, STUDENTS_FILE)?,
            departments: open_required(dir, DEPARTMENTS_FILE)?,
            gsat_standards: open_required(dir, GSAT_STANDARDS_FILE)?,
            skill_standards: open_required(dir, SKILL_STANDARDS_FILE)?,
            rank_requirements: open_optional(dir, RANK_REQUIREMENTS_FILE)?,
            semester_ranks: open_optional(dir, SEMESTER_RANKS_FILE)?,
            preferences: open_optional(dir, PREFERENCES_FILE)?,
            post_lottery: open_optional(dir, POST_LOTTERY_FILE)?,
        };
        Self::from_sources(sources)
    }

    pub fn from_sources<R: Read>(sources: RosterSources<R>) -> Result<Roster, RosterImportError> {
        let students = mapping::students(&sheet("students", sources.students)?)?;
        let departments = mapping::departments(&sheet("departments", sources.departments)?);
        let standards = StandardCatalog {
            academic: mapping::academic_standards(&sheet(
                "gsat_standards",
                sources.gsat_standards,
            )?),
            skill: mapping::skill_standards(&sheet("skill_standards", sources.skill_standards)?),
        };

        let rank_requirements = match sources.rank_requirements {
            Some(reader) => mapping::rank_requirements(&sheet("rank_requirements", reader)?),
            None => Default::default(),
        };
        let semester_ranks = match sources.semester_ranks {
            Some(reader) => mapping::semester_ranks(&sheet("semester_ranks", reader)?)?,
            None => Default::default(),
        };

        let mut preferences = Vec::new();
        for (name, reader, stage) in [
            ("preferences", sources.preferences, PreferenceStage::PreLottery),
            ("post_lottery", sources.post_lottery, PreferenceStage::PostLottery),
        ] {
            let Some(reader) = reader else {
                continue;
            };
            preferences.extend(
                mapping::preference_lists(&sheet(name, reader)?, stage)
                    .into_iter()
                    .map(|(student_id, list)| StoredPreferences {
                        student_id,
                        list,
                        saved_at: None,
                    }),
            );
        }

        info!(
            students = students.len(),
            departments = departments.len(),
            academic_tables = standards.academic.len(),
            skill_tables = standards.skill.len(),
            rank_requirements = rank_requirements.len(),
            semester_rows = semester_ranks.len(),
            preference_lists = preferences.len(),
            "loaded roster"
        );

        Ok(Roster {
            reference: ReferenceData {
                students,
                departments,
                standards,
                rank_requirements,
                semester_ranks,
            },
            preferences,
        })
    }
}

fn sheet<R: Read>(name: &'static str, reader: R) -> Result<parser::Sheet, RosterImportError> {
    parser::parse_sheet(name, reader)
        .map_err(|source| RosterImportError::Csv { sheet: name, source })
}

fn open_required(dir: &Path, file: &str) -> Result<File, RosterImportError> {
    open_optional(dir, file)?.ok_or_else(|| RosterImportError::MissingSheet(dir.join(file)))
}

fn open_optional(dir: &Path, file: &str) -> Result<Option<File>, RosterImportError> {
    let path = dir.join(file);
    match File::open(&path) {
        Ok(handle) => Ok(Some(handle)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(RosterImportError::Io { path, source }),
    }
}

#[cfg(test)]
mod tests;
