//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use contracts::{FillPolicy, SinkType};

/// fitclip - find the sensor log recorded during a video
#[derive(Parser, Debug)]
#[command(
    name = "fitclip",
    author,
    version,
    about = "Match action-camera videos to activity logs",
    long_about = "Matches a video against a set of sensor logs (FIT, JSON Lines).\n\n\
                  The log whose recording session overlaps the video's capture \n\
                  window the most is selected, and its telemetry for that window \n\
                  can be exported as CSV or JSON."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FITCLIP_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "FITCLIP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Matcher configuration file (TOML or JSON); defaults apply without one
    #[arg(short, long, global = true, env = "FITCLIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "FITCLIP_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the log recorded during a video
    FindLog(FindLogArgs),

    /// Export the telemetry recorded during a video
    Extract(ExtractArgs),

    /// List the recording sessions of a single log
    Sessions(SessionsArgs),

    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Video and candidate logs, shared by `find-log` and `extract`
#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    /// Video file (MP4/MOV)
    #[arg(long)]
    pub video: PathBuf,

    /// Directory or file holding candidate logs (repeatable)
    #[arg(long = "log-dir", required = true, env = "FITCLIP_LOG_DIR")]
    pub log_dirs: Vec<PathBuf>,

    /// Override `ingestion.workers`
    #[arg(long, env = "FITCLIP_WORKERS")]
    pub workers: Option<usize>,

    /// Override `ingestion.max_candidates`
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Prefer logs whose camera events name the video's camera file UUID
    #[arg(long)]
    pub camera_uuid: bool,

    /// Print the run summary to stderr
    #[arg(long)]
    pub stats: bool,
}

/// Arguments for the `find-log` command
#[derive(Parser, Debug)]
pub struct FindLogArgs {
    #[command(flatten)]
    pub target: MatchArgs,

    /// List every overlapping session, best first
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `extract` command
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub target: MatchArgs,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Gap handling (overrides `extraction.fill`)
    #[arg(long, value_enum)]
    pub fill: Option<FillArg>,

    /// Output format (default: from the output extension)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Arguments for the `sessions` command
#[derive(Parser, Debug)]
pub struct SessionsArgs {
    /// Log file
    #[arg(long)]
    pub log: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Configuration file to validate (default: the global `--config`)
    pub path: Option<PathBuf>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FillArg {
    /// Leave cells without a sample empty
    None,
    /// Repeat the last value of the column
    Forward,
}

impl From<FillArg> for FillPolicy {
    fn from(fill: FillArg) -> Self {
        match fill {
            FillArg::None => Self::None,
            FillArg::Forward => Self::Forward,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for SinkType {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "fitclip",
            "extract",
            "--video",
            "clip.mp4",
            "--log-dir",
            "logs",
            "--log-dir",
            "more.fit",
            "-o",
            "out.csv",
            "--fill",
            "forward",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.target.log_dirs.len(), 2);
                assert!(matches!(args.fill, Some(FillArg::Forward)));
                assert!(args.format.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_camera_uuid_is_opt_in() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["fitclip", "find-log", "--video", "clip.mp4", "--log-dir", "logs"];
            argv.extend_from_slice(extra);
            match Cli::try_parse_from(argv).unwrap().command {
                Commands::FindLog(args) => args.target.camera_uuid,
                _ => panic!("expected find-log"),
            }
        };
        assert!(!parse(&[]));
        assert!(parse(&["--camera-uuid"]));
    }

    #[test]
    fn test_find_log_requires_log_dir() {
        let result = Cli::try_parse_from(["fitclip", "find-log", "--video", "clip.mp4"]);
        // FITCLIP_LOG_DIR may be set in the environment running the tests
        if std::env::var_os("FITCLIP_LOG_DIR").is_none() {
            assert!(result.is_err());
        }
    }
}
