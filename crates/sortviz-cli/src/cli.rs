#![forbid(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use sortviz_algos::AlgorithmRegistry;
use sortviz_runtime::PlaybackConfig;

use crate::commands;
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "sortviz",
    about = "Deterministic step-trace playback for sorting algorithms",
    version
)]
pub struct Cli {
    /// Playback config file (TOML, or JSON with a .json extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long = "log-level", global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List algorithms and dataset presets.
    List(ListArgs),

    /// Play one algorithm to completion and print a summary.
    Run(RunArgs),

    /// Write a run's step log as CSV or JSON.
    Export(ExportArgs),

    /// Measure every algorithm over seeded datasets.
    Benchmark(BenchmarkArgs),

    /// Play two algorithms side by side on the same dataset.
    Compare(CompareArgs),

    /// Replay an exported JSON trace and check the result is sorted.
    Verify(VerifyArgs),
}

/// How a dataset is chosen.
#[derive(Debug, Clone, Default, Args)]
pub struct DatasetArgs {
    /// Preset key (see `sortviz list`).
    #[arg(long, default_value = "random")]
    pub preset: String,

    /// Dataset size; defaults to the config's default_n.
    #[arg(long)]
    pub n: Option<usize>,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Smallest generated value; defaults to the config's min_val.
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<i64>,

    /// Largest generated value; defaults to the config's max_val.
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<i64>,

    /// Explicit comma-separated values; overrides the preset.
    #[arg(long, allow_hyphen_values = true)]
    pub values: Option<String>,
}

/// How playback is paced.
#[derive(Debug, Clone, Default, Args)]
pub struct PlaybackArgs {
    /// Frames per second; defaults to the config's fps_default.
    #[arg(long)]
    pub fps: Option<u32>,

    #[arg(long = "per-tick")]
    pub per_tick: Option<u32>,

    #[arg(long = "per-second")]
    pub per_second: Option<u32>,

    /// Play against the wall clock instead of a simulated one.
    #[arg(long)]
    pub realtime: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[arg(long, default_value = "quick")]
    pub algo: String,

    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub playback: PlaybackArgs,

    /// Print the narration of every step.
    #[arg(long)]
    pub narrate: bool,

    /// Print the final state as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[arg(long, default_value = "quick")]
    pub algo: String,

    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[arg(long)]
    pub fps: Option<u32>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Output path; `-` writes to stdout.
    #[arg(long, default_value = "-")]
    pub out: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Seeded runs per algorithm; run `i` uses `seed + i`.
    #[arg(long, default_value_t = 3)]
    pub runs: u32,

    /// Rate used for the visual duration column.
    #[arg(long)]
    pub fps: Option<u32>,

    /// CSV output path; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    #[arg(long, default_value = "bubble")]
    pub left: String,

    #[arg(long, default_value = "quick")]
    pub right: String,

    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub playback: PlaybackArgs,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// JSON trace written by `sortviz export --format json`.
    pub path: PathBuf,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(&cli.log_level, cli.log_json);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let registry = AlgorithmRegistry::builtin();
    match cli.command {
        Commands::List(args) => commands::list::run(&args, &registry, out),
        Commands::Run(args) => commands::run::run(&args, &registry, &config, out),
        Commands::Export(args) => commands::export::run(&args, &registry, &config, out),
        Commands::Benchmark(args) => commands::benchmark::run(&args, &registry, &config, out),
        Commands::Compare(args) => commands::compare::run(&args, &registry, &config, out),
        Commands::Verify(args) => commands::verify::run(&args, out),
    }
}

/// The config file (if any) with environment overrides, validated.
pub fn load_config(path: Option<&Path>) -> Result<PlaybackConfig> {
    let config = match path {
        Some(path) => PlaybackConfig::load(path)?,
        None => PlaybackConfig::default().with_env_overrides()?.validated()?,
    };
    tracing::debug!(config = %config.to_jsonl(), "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_dataset_flags() {
        let cli = Cli::try_parse_from([
            "sortviz", "run", "--algo", "merge", "--preset", "few_unique", "--n", "12", "--seed",
            "9", "--min", "-5", "--fps", "30",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.algo, "merge");
        assert_eq!(args.dataset.preset, "few_unique");
        assert_eq!(args.dataset.n, Some(12));
        assert_eq!(args.dataset.seed, 9);
        assert_eq!(args.dataset.min, Some(-5));
        assert_eq!(args.playback.fps, Some(30));
        assert!(!args.playback.realtime);
    }

    #[test]
    fn parses_export_format() {
        let cli = Cli::try_parse_from(["sortviz", "export", "--format", "csv", "--out", "t.csv"])
            .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.format, ExportFormat::Csv);
        assert_eq!(args.out, PathBuf::from("t.csv"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sortviz", "list", "--log-json", "--log-level", "debug"])
            .unwrap();
        assert!(cli.log_json);
        assert_eq!(cli.log_level, "debug");
    }
}
