use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_vdjbase_ingest::app::{App, IngestReport};
use kira_vdjbase_ingest::chain::{self, StripReport};
use kira_vdjbase_ingest::config::{ConfigLoader, ConfigOverrides};
use kira_vdjbase_ingest::error::{ErrorClass, KiraError};
use kira_vdjbase_ingest::output::{JsonOutput, LogSink, OutputMode};

#[derive(Parser)]
#[command(name = "kira-vdjbase")]
#[command(about = "Copy annotated AIRR-seq results from the sequence data store into VDJbase")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Import one project into the destination repository")]
    Import(ImportArgs),
    #[command(about = "Strip _IGH/_IGK/_IGL from repertoire ids in a metadata file")]
    StripChain(StripChainArgs),
}

#[derive(Args)]
struct ImportArgs {
    #[arg(long)]
    project: Option<String>,

    #[arg(long)]
    source: Option<Utf8PathBuf>,

    #[arg(long)]
    dest: Option<Utf8PathBuf>,

    #[arg(long)]
    metadata: Option<Utf8PathBuf>,

    #[arg(long)]
    config: Option<Utf8PathBuf>,

    #[arg(long, help = "Fail when a repertoire is missing from the project metadata")]
    strict: bool,

    #[arg(long)]
    primary_marker: Option<String>,

    #[arg(long = "required-marker")]
    required_markers: Vec<String>,
}

#[derive(Args)]
struct StripChainArgs {
    #[arg(help = "Path to the metadata file")]
    metadata_filename: Utf8PathBuf,

    #[arg(help = "Path to the target repository")]
    target_repo_path: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error.class() {
        ErrorClass::Precondition => 2,
        ErrorClass::Completeness => 3,
        ErrorClass::Copy => 4,
        ErrorClass::Other => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command {
        Commands::Import(args) => run_import(args, output_mode),
        Commands::StripChain(args) => run_strip_chain(args, output_mode),
    }
}

fn run_import(args: ImportArgs, output_mode: OutputMode) -> miette::Result<()> {
    let ImportArgs {
        project,
        source,
        dest,
        metadata,
        config,
        strict,
        primary_marker,
        required_markers,
    } = args;

    let overrides = ConfigOverrides {
        project_name: project,
        source_root: source,
        dest_root: dest,
        project_metadata: metadata,
        primary_file_marker: primary_marker,
        required_file_markers: required_markers,
        strict,
    };
    let resolved = ConfigLoader::resolve(config.as_deref(), overrides)?;
    let app = App::new(resolved);

    match output_mode {
        OutputMode::NonInteractive => {
            let result = app.run(&JsonOutput)?;
            JsonOutput::print_ingest(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let result = app.run(&LogSink)?;
            print_ingest_summary(&result);
        }
    }
    Ok(())
}

fn run_strip_chain(args: StripChainArgs, output_mode: OutputMode) -> miette::Result<()> {
    let result = chain::strip_chain_file(&args.metadata_filename, &args.target_repo_path)?;
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_strip(&result).into_diagnostic()?,
        OutputMode::Interactive => print_strip_summary(&result),
    }
    Ok(())
}

fn print_ingest_summary(result: &IngestReport) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!(
        "{cyan}KIRA-VDJBASE import {} ({}){reset}",
        result.project_name, result.project_number
    );
    println!(
        "{green}Repertoires: {}  annotated: {}  pre_processed: {}{reset}",
        result.repertoires, result.annotated_results, result.pre_processed_results
    );
    println!(
        "{green}Metadata fragments merged: {}  ->  {}{reset}",
        result.merge.applied, result.metadata_path
    );
    println!("{green}Files copied: {}{reset}", result.copied.len());

    if !result.merge.unmatched.is_empty() {
        println!(
            "{yellow}Repertoires missing from project metadata: {}{reset}",
            result.merge.unmatched.join(", ")
        );
    }
    for issue in &result.issues {
        println!(
            "{yellow}  {} was not found in {}{reset}",
            issue.field, issue.result_path
        );
    }
}

fn print_strip_summary(result: &StripReport) {
    println!(
        "Rewrote {} of {} repertoire ids in {} (chain {})",
        result.rewritten, result.repertoires, result.metadata_path, result.chain
    );
}
