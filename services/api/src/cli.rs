use crate::export::{run_export, run_qualify, ExportArgs, QualifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use volunteer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Volunteer Preference Service",
    about = "Screen department eligibility and manage preference lists from the sheet exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print one student's eligibility result as JSON
    Qualify(QualifyArgs),
    /// Write per-student result files for many students
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory holding the sheet exports
    #[arg(long)]
    pub(crate) data_dir: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Qualify(args) => run_qualify(args),
        Command::Export(args) => run_export(args),
    }
}
