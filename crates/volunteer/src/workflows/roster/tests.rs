use std::io::Cursor;

use super::*;
use crate::workflows::eligibility::{AcademicSubject, SkillSubject, StudentId, Tier, TierRequirement};

const STUDENTS: &str = "\u{feff}學號,姓名,班級,座號,可選學群,校排百分比,填榜序號,國文,英文,大考英聽,術科項目1
S001,王小明,301,7,\"1,2\",12,3,13,14,A級,88
,空白,301,8,1,50,4,10,10,,
S002,林小華,302,1,,40,5,9,8,,
";

const DEPARTMENTS: &str = "學校代碼,學校名稱,學校簡稱,學群類別代碼,學群類別,學系代碼,學系名稱,學系簡稱,補充搜尋關鍵詞,可填志願數,國文,英文,英文檢定,大考英聽
5,Alpha University,Alpha,2,Engineering,101,Mechanical,ME,robots,3,均標,前標,頂標,B級
5,Alpha University,Alpha,2,Engineering,102,Civil,CE,,,-,--,,
";

const GSAT: &str = "級別,國文,英文,歷史
頂標,13,14,12
前標,12,12,11
均標,10,10,9
後標,8,7,6
";

const SKILLS: &str = "級別,術科項目1,術科項目9
頂標,90,1
前標,80,1
均標,70,1
後標,60,1
底標,50,1
";

fn sources(students: &str) -> RosterSources<Cursor<Vec<u8>>> {
    RosterSources::required(
        Cursor::new(students.as_bytes().to_vec()),
        Cursor::new(DEPARTMENTS.as_bytes().to_vec()),
        Cursor::new(GSAT.as_bytes().to_vec()),
        Cursor::new(SKILLS.as_bytes().to_vec()),
    )
}

fn reader(text: &str) -> Option<Cursor<Vec<u8>>> {
    Some(Cursor::new(text.as_bytes().to_vec()))
}

#[test]
fn imports_students_and_skips_blank_ids() {
    let roster = RosterImporter::from_sources(sources(STUDENTS)).expect("roster imports");
    let students = &roster.reference.students;

    assert_eq!(students.len(), 2);
    let first = &students[0];
    assert_eq!(first.student_id, StudentId::new("S001"));
    assert_eq!(first.eligible_groups, "1,2");
    assert_eq!(first.academic_score(AcademicSubject::English), Some("14"));
    assert_eq!(first.academic_score(AcademicSubject::MathA), None);
    assert_eq!(first.listening.as_deref(), Some("A級"));
    let skill = SkillSubject::new(1).expect("valid skill index");
    assert_eq!(first.skill_score(skill), Some("88"));
    assert!(!students[1].has_eligible_groups());
}

#[test]
fn suffixed_requirement_column_wins_when_present() {
    let roster = RosterImporter::from_sources(sources(STUDENTS)).expect("roster imports");
    let departments = &roster.reference.departments;

    assert_eq!(departments.len(), 2);
    let mechanical = &departments[0].requirements;
    assert_eq!(
        mechanical.academic.get(&AcademicSubject::English),
        Some(&TierRequirement::Level(Tier::Top))
    );
    assert_eq!(
        mechanical.academic.get(&AcademicSubject::Chinese),
        Some(&TierRequirement::Level(Tier::Average))
    );
    assert_eq!(mechanical.listening.as_deref(), Some("B級"));
    assert_eq!(departments[0].max_preferences, Some(3));

    let civil = &departments[1].requirements;
    assert!(civil.academic.is_empty());
    assert_eq!(civil.listening, None);
    assert_eq!(departments[1].max_preferences, None);
}

#[test]
fn standards_ignore_unknown_columns_and_leave_missing_tiers_unreachable() {
    let roster = RosterImporter::from_sources(sources(STUDENTS)).expect("roster imports");
    let standards = &roster.reference.standards;

    assert_eq!(standards.academic.len(), 2);
    let english = standards
        .academic(AcademicSubject::English)
        .expect("english table");
    assert_eq!(english.top, 14.0);
    assert_eq!(english.back, 7.0);
    assert!(english.bottom.is_infinite());

    assert_eq!(standards.skill.len(), 1);
    let skill = SkillSubject::new(1).expect("valid skill index");
    assert_eq!(standards.skill(skill).map(|table| table.bottom), Some(50.0));
}

#[test]
fn optional_sheets_fill_rank_data_and_preferences() {
    let mut sources = sources(STUDENTS);
    sources.rank_requirements = reader("學校代碼,學校名稱,備註,百分比\n5,Alpha,,30\n6,Beta,,不限\n");
    sources.semester_ranks = reader("學號,國文,一上\nS001,3,88.5\n");
    sources.preferences = reader("學號,志願1,志願2,志願3\nS001,5-2-101,,5-2-102\n");
    sources.post_lottery =
        reader("學號,撕榜結果,大學,學群,志願1\nS001,正取,Alpha University,Engineering,5-2-101\nS002,,,,5-2-102\n");

    let roster = RosterImporter::from_sources(sources).expect("roster imports");

    assert_eq!(roster.reference.rank_requirements.ceiling_for("5"), Some(30.0));
    assert_eq!(roster.reference.rank_requirements.ceiling_for("6"), None);
    assert!(roster
        .reference
        .semester_row(&StudentId::new("S001"))
        .is_some());

    assert_eq!(roster.preferences.len(), 2);
    let pre = &roster.preferences[0];
    assert_eq!(pre.stage(), PreferenceStage::PreLottery);
    assert_eq!(pre.list.codes, vec!["5-2-101".to_string(), "5-2-102".to_string()]);
    assert_eq!(pre.saved_at, None);

    let post = &roster.preferences[1];
    assert_eq!(post.stage(), PreferenceStage::PostLottery);
    let lottery = post.list.lottery.as_ref().expect("lottery result");
    assert_eq!(lottery.school_name, "Alpha University");
}

#[test]
fn selection_column_marks_students_for_export() {
    let students = "學號,姓名,可選學群,選取\nS001,甲,1,V\nS002,乙,1,\nS003,丙,1,v\nS004,丁,1,x\n";
    let roster = RosterImporter::from_sources(sources(students)).expect("roster imports");

    assert_eq!(
        roster.reference.selected_student_ids(),
        vec![StudentId::new("S001"), StudentId::new("S003")]
    );
}

#[test]
fn students_sheet_without_id_column_is_rejected() {
    let error = RosterImporter::from_sources(sources("姓名,班級\n王小明,301\n"))
        .expect_err("missing id column");

    match error {
        RosterImportError::MissingColumn { sheet, column } => {
            assert_eq!(sheet, "students");
            assert_eq!(column, "學號");
        }
        other => panic!("expected missing column, got {other:?}"),
    }
}

#[test]
fn missing_required_file_names_the_path() {
    let dir = std::env::temp_dir().join("volunteer-roster-missing");
    let error = RosterImporter::from_dir(&dir).expect_err("empty directory");

    match error {
        RosterImportError::MissingSheet(path) => {
            assert_eq!(path, dir.join(STUDENTS_FILE));
        }
        other => panic!("expected missing sheet, got {other:?}"),
    }
}

#[test]
fn directory_import_skips_absent_optional_files() {
    let dir = std::env::temp_dir().join(format!("volunteer-roster-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    for (file, text) in [
        (STUDENTS_FILE, STUDENTS),
        (DEPARTMENTS_FILE, DEPARTMENTS),
        (GSAT_STANDARDS_FILE, GSAT),
        (SKILL_STANDARDS_FILE, SKILLS),
    ] {
        std::fs::write(dir.join(file), text).expect("write sheet");
    }

    let roster = RosterImporter::from_dir(&dir).expect("roster imports");
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(roster.reference.students.len(), 2);
    assert!(roster.reference.rank_requirements.is_empty());
    assert!(roster.preferences.is_empty());
}
