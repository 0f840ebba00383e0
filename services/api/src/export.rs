use crate::infra::load_roster;
use chrono::Utc;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use volunteer::config::AppConfig;
use volunteer::error::AppError;
use volunteer::telemetry;
use volunteer::workflows::eligibility::{
    BatchReport, EligibilityService, ReferenceData, StudentId,
};

#[derive(Args, Debug)]
pub(crate) struct QualifyArgs {
    /// Student id (學號) to evaluate
    #[arg(long)]
    pub(crate) student_id: String,
    /// Directory holding the sheet exports (defaults to VOLUNTEER_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Print the per-department outcomes instead of the result record
    #[arg(long)]
    pub(crate) explain: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Students to export; every student in the roster when omitted
    #[arg(long = "student-id")]
    pub(crate) student_ids: Vec<String>,
    /// Export only the students marked V in the 選取 column
    #[arg(long, conflicts_with = "student_ids")]
    pub(crate) selected: bool,
    /// Directory holding the sheet exports (defaults to VOLUNTEER_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Destination for student_<id>.json files (defaults to VOLUNTEER_OUTPUT_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
}

pub(crate) fn run_qualify(args: QualifyArgs) -> Result<(), AppError> {
    let QualifyArgs {
        student_id,
        data_dir,
        explain,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let roster = load_roster(&data_dir.unwrap_or(config.data.data_dir))?;
    let service = EligibilityService::new(Arc::new(roster.reference));

    let rendered = if explain {
        serde_json::to_string_pretty(&service.explain(&student_id)?)?
    } else {
        serde_json::to_string_pretty(&service.build_student_result(&student_id, Utc::now())?)?
    };
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        student_ids,
        selected,
        data_dir,
        output_dir,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let roster = load_roster(&data_dir.unwrap_or(config.data.data_dir))?;
    let service = EligibilityService::new(Arc::new(roster.reference));

    let ids = export_ids(service.reference(), student_ids, selected);
    if ids.is_empty() {
        warn!("no students to export");
    }

    let report = service.build_batch(&ids, Utc::now());
    let output_dir = output_dir.unwrap_or(config.data.output_dir);
    let written = write_results(&report, &output_dir)?;

    println!(
        "Exported {} of {} students to {}",
        written.len(),
        report.total(),
        output_dir.display()
    );
    for failure in &report.failed {
        println!("- {}: {}", failure.student_id.as_str(), failure.message);
    }
    Ok(())
}

/// Explicit ids win; otherwise the 選取-marked students or the whole roster.
pub(crate) fn export_ids(
    reference: &ReferenceData,
    student_ids: Vec<String>,
    selected: bool,
) -> Vec<StudentId> {
    if !student_ids.is_empty() {
        student_ids.into_iter().map(StudentId::new).collect()
    } else if selected {
        reference.selected_student_ids()
    } else {
        reference.student_ids()
    }
}

/// Write one `student_<id>.json` per success plus an `export_summary.json` listing both outcomes.
pub(crate) fn write_results(
    report: &BatchReport,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(report.succeeded.len());
    for success in &report.succeeded {
        let path = output_dir.join(format!("student_{}.json", success.student_id.as_str()));
        let body = serde_json::to_vec_pretty(&success.result)?;
        if let Err(error) = fs::write(&path, body) {
            warn!(
                student_id = %success.student_id.as_str(),
                path = %path.display(),
                %error,
                "failed to write result"
            );
            continue;
        }
        info!(
            student_id = %success.student_id.as_str(),
            qualified = success.qualified_count,
            buckets = success.bucket_count,
            "exported student result"
        );
        written.push(path);
    }

    fs::write(
        output_dir.join("export_summary.json"),
        serde_json::to_vec_pretty(report)?,
    )?;
    Ok(written)
}
