use clap::{Args, Parser, Subcommand};
use datalog_bucketer::Result;
use datalog_bucketer::config::{ConfigFile, Mode, SelectSpec};
use datalog_bucketer::model::Aggregation;
use datalog_bucketer::pipeline;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "datalog-bucketer")]
#[command(about = "Plot or tabulate robot telemetry CSV logs by scheduler generation", long_about = None)]
struct Cli {
    /// More output on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config file; command-line flags override its fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scatter plot of the selected log entries (HTML).
    Plot(RunArgs),
    /// Spreadsheet-ready CSV with one row per scheduler generation.
    Spread(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// A CSV file, or a directory of CSV files.
    filename: PathBuf,

    /// Log entry name that marks the start of each generation.
    #[arg(long)]
    marker: Option<String>,

    /// Keep entries whose name matches this regular expression.
    #[arg(long, conflicts_with = "names")]
    pattern: Option<String>,

    /// Keep entries with exactly these names.
    #[arg(long, value_delimiter = ',')]
    names: Option<Vec<String>>,

    /// How to combine several values of one name within a generation.
    #[arg(long, value_enum)]
    aggregate: Option<Aggregation>,

    /// Directory for output files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Explicit output file (single input file only).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Warn about generations longer than this many seconds (0 disables).
    #[arg(long)]
    max_period: Option<f64>,
}

impl RunArgs {
    fn overrides(&self) -> ConfigFile {
        let select = match (&self.pattern, &self.names) {
            (Some(p), _) => Some(SelectSpec::Pattern(p.clone())),
            (None, Some(n)) => Some(SelectSpec::Names(n.clone())),
            (None, None) => None,
        };
        ConfigFile {
            marker_name: self.marker.clone(),
            select,
            aggregation: self.aggregate,
            output_dir: self.output_dir.clone(),
            output: self.output.clone(),
            max_period: self.max_period,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let (mode, args) = match &cli.cmd {
        Commands::Plot(args) => (Mode::Plot, args),
        Commands::Spread(args) => (Mode::Spread, args),
    };

    let base = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let settings = base.merge(args.overrides()).validate_and_build(mode)?;

    let report = pipeline::run(&args.filename, &settings)?;
    if !report.all_ok() {
        anyhow::bail!(
            "{} of {} file(s) failed",
            report.failed.len(),
            report.failed.len() + report.succeeded.len()
        );
    }

    Ok(())
}
