use clap::{ArgAction, Parser, ValueEnum};

use crate::errors::InputError;
use crate::model::{DEFAULT_MAX_OPEN_DIRS, FileErrorPolicy, ScanOptions, SizeMetric, default_workers};
use crate::target::{PathPolicy, Target, resolve_target};

#[derive(Debug, Parser)]
#[command(name = "dircount")]
#[command(about = "Count subdirectories, files and bytes under a path using parallel walkers")]
pub struct Cli {
    /// Directory or file to measure (relative unless --allow-absolute)
    pub path: String,

    /// Maximum number of directories listed at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_OPEN_DIRS)]
    pub max_open_dirs: usize,

    /// Walker threads (defaults to four per core, between 4 and 64)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Size metric summed over files
    #[arg(long, value_enum, default_value_t = MetricArg::Apparent)]
    pub metric: MetricArg,

    /// Abort the whole scan when a file's metadata cannot be read
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Accept paths starting with '/'
    #[arg(long, default_value_t = false)]
    pub allow_absolute: bool,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only errors on stderr
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Apparent,
    Allocated,
}

impl MetricArg {
    pub fn into_metric(self) -> SizeMetric {
        match self {
            Self::Apparent => SizeMetric::Apparent,
            Self::Allocated => SizeMetric::Allocated,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
    pub scan_options: ScanOptions,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, InputError> {
        let policy = if cli.allow_absolute {
            PathPolicy::AllowAny
        } else {
            PathPolicy::RejectRootPrefixed
        };
        let target = resolve_target(&cli.path, policy)?;

        Ok(Self {
            target,
            scan_options: ScanOptions {
                root: cli.path.trim().into(),
                max_open_dirs: cli.max_open_dirs,
                workers: cli.workers.unwrap_or_else(default_workers),
                metric: cli.metric.into_metric(),
                file_errors: if cli.strict {
                    FileErrorPolicy::Abort
                } else {
                    FileErrorPolicy::Skip
                },
            },
        })
    }
}
