//! # fmixc CLI
//!
//! Processes vendor repositories of FMI cross-check data into the published
//! tool, FMU and cross-check tables, and inspects individual repositories.
//!
//! ## Usage
//!
//! ```bash
//! fmixc --config ./config/fmixc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fmixc process <DIRS>...` | Validate repositories and merge them into the database |
//! | `fmixc exports <ROOT>` | List exported FMU directories as JSON |
//! | `fmixc imports <ROOT>` | List cross-check imports, or their grouped results, as JSON |
//! | `fmixc tools <DIR>` | Parse a repository's tool descriptors and print them as JSON |
//!
//! `process` exits with the number of fatal findings (0 = clean).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fmi_xc::config::{self, Config};
use fmi_xc::database::{create_database, DatabaseKind};
use fmi_xc::db_file::to_json_pretty;
use fmi_xc::exports::{get_exports, ExportRecord};
use fmi_xc::imports::{get_imports, ImportRecord, ImportValidator};
use fmi_xc::logging;
use fmi_xc::process::{run_batch, ProcessOptions};
use fmi_xc::reconcile::build_cross_check_table;
use fmi_xc::report::ReportMode;
use fmi_xc::scan::DirectoryCache;
use fmi_xc::tools::load_tools;
use fmi_xc::vendor::load_vendor_data;
use fmi_xc_core::summary::group_results;
use fmi_xc_core::validate::validate_all;

const DEFAULT_CONFIG: &str = "./config/fmixc.toml";

/// fmixc: validate and publish FMI cross-check repositories.
#[derive(Parser)]
#[command(
    name = "fmixc",
    about = "Validate vendor FMI cross-check repositories and publish the merged tables",
    version,
    long_about = "fmixc walks vendor repositories laid out by the FMI cross-check directory \
    convention, validates exported FMUs and import results, and merges each vendor's tools, \
    FMUs and cross-check results into a JSON-file or Git-backed database."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/fmixc.toml`; built-in defaults apply when that
    /// file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process vendor repositories and update the database.
    Process {
        /// Vendor repository directories.
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Database backend.
        #[arg(long, value_enum)]
        db: Option<DatabaseKind>,

        /// Output directory for the file backend, or the Git work directory.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Data repository URL for the git backend.
        #[arg(long)]
        repo: Option<String>,

        /// Branch of the data repository to update.
        #[arg(long)]
        branch: Option<String>,

        /// Skip `CrossCheck_Results`.
        #[arg(long)]
        no_imports: bool,

        /// Show minor findings as well as major ones.
        #[arg(long)]
        pedantic: bool,

        /// Tool ownership has moved between vendors in this run.
        #[arg(long)]
        moved: bool,

        /// Require import tools to be local and export tools to be known.
        #[arg(long)]
        strict_tools: bool,

        /// Write findings to this file instead of stderr.
        #[arg(long)]
        logfile: Option<PathBuf>,

        /// Write per-vendor JSON snapshots of the tables here.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// List exported FMUs under an export root.
    Exports {
        root: PathBuf,

        /// Only list FMUs exported by this tool.
        #[arg(long)]
        tool: Option<String>,
    },

    /// List cross-check imports under a cross-check root.
    Imports {
        root: PathBuf,

        /// Only list imports performed by this tool.
        #[arg(long)]
        tool: Option<String>,

        /// Print results grouped by importer/exporter pair.
        #[arg(long)]
        grouped: bool,
    },

    /// Parse the tool descriptors of a vendor repository.
    Tools { dir: PathBuf },
}

fn load(cli_config: Option<PathBuf>) -> Result<Config> {
    match cli_config {
        Some(path) => config::load_or_default(&path, true),
        None => config::load_or_default(&PathBuf::from(DEFAULT_CONFIG), false),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load(cli.config)?;
    logging::init_logging(&cfg.logging)?;

    match cli.command {
        Commands::Process {
            dirs,
            db,
            output,
            repo,
            branch,
            no_imports,
            pedantic,
            moved,
            strict_tools,
            logfile,
            artifacts,
        } => {
            let kind = match db {
                Some(kind) => kind,
                None => DatabaseKind::parse(&cfg.database.kind)?,
            };
            let output = output.or_else(|| cfg.database.output.clone());
            let repo = repo.unwrap_or_else(|| cfg.database.repo.clone());
            let branch = branch.unwrap_or_else(|| cfg.database.branch.clone());

            let options = ProcessOptions {
                imports: cfg.processing.imports && !no_imports,
                ownership: cfg.processing.ownership_policy(moved)?,
                strict_tools: strict_tools || cfg.processing.strict_tools,
                artifacts,
            };
            let mode = ReportMode::from_logfile(logfile.or_else(|| cfg.logging.logfile.clone()));
            let mut reporter = mode.reporter(pedantic || cfg.processing.pedantic)?;

            tracing::info!(
                started = %chrono::Utc::now().to_rfc3339(),
                db = ?kind,
                dirs = dirs.len(),
                "processing repositories"
            );
            let mut database = create_database(kind, output, &repo, &branch);
            run_batch(database.as_mut(), &dirs, &options, &mut reporter).await?;

            let count = if reporter.fatal_count() > 0 {
                reporter.summarize(&mut std::io::stderr())?
            } else {
                reporter.summarize(&mut std::io::stdout())?
            };
            std::process::exit(count.min(255) as i32);
        }
        Commands::Exports { root, tool } => {
            let mut cache = DirectoryCache::new();
            let by_tool = |r: &ExportRecord| tool.as_deref().map_or(true, |t| r.export_tool == t);
            let exports = get_exports(&mut cache, &root, Some(&by_tool))?;
            println!("{}", to_json_pretty(&exports)?);
        }
        Commands::Imports {
            root,
            tool,
            grouped,
        } => {
            let mut cache = DirectoryCache::new();
            let by_tool = |r: &ImportRecord| tool.as_deref().map_or(true, |t| r.import_tool == t);
            let imports = get_imports(&mut cache, &root, Some(&by_tool))?;
            if grouped {
                let mut reporter = ReportMode::Stderr.reporter(false)?;
                let valid = validate_all(imports, &ImportValidator::new(), &mut reporter);
                let results = build_cross_check_table(&valid, "", &mut reporter)?;
                println!("{}", to_json_pretty(&group_results(&results))?);
            } else {
                println!("{}", to_json_pretty(&imports)?);
            }
        }
        Commands::Tools { dir } => {
            let vendor = load_vendor_data(&dir)?;
            let mut reporter = ReportMode::Stderr.reporter(true)?;
            let tools = load_tools(&dir, &vendor, &mut reporter)?;
            println!("{}", to_json_pretty(&tools)?);
        }
    }

    Ok(())
}
