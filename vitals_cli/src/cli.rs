//! CLI argument definitions.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use vitals_core::FilterPolicy;

#[derive(Parser, Debug)]
#[command(name = "vitals", version, about = "Height and body temperature kiosk sensors")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/vitals.toml")]
    pub config: PathBuf,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log as JSON lines instead of pretty
    #[arg(long = "log-json", action = ArgAction::SetTrue)]
    pub log_json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Outlier policy selectable on the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PolicyArg {
    /// |x - mean| / sd < threshold (population sd)
    ZScore,
    /// Tukey fence [Q1 - k*IQR, Q3 + k*IQR]
    Iqr,
    /// |x - mean| <= k * sample sd
    StdDevBound,
    /// |x - mean| <= k * population sd
    SigmaWindow,
    /// Keep every sample
    None,
}

impl From<PolicyArg> for FilterPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::ZScore => FilterPolicy::ZScore { threshold: 1.0 },
            PolicyArg::Iqr => FilterPolicy::Iqr { k: 1.5 },
            PolicyArg::StdDevBound => FilterPolicy::StdDevBound { k: 1.0 },
            PolicyArg::SigmaWindow => FilterPolicy::SigmaWindow { k: 2.0 },
            PolicyArg::None => FilterPolicy::None,
        }
    }
}

/// Acquisition overrides shared by both measurements.
#[derive(Args, Debug, Clone, Default)]
pub struct AcquisitionArgs {
    /// Attempts per run (overrides config)
    #[arg(long, value_name = "N")]
    pub samples: Option<usize>,
    /// Minimum valid readings for the run to succeed (overrides config)
    #[arg(long = "min-samples", value_name = "N")]
    pub min_samples: Option<usize>,
    /// Pause between attempts in milliseconds (overrides config)
    #[arg(long = "delay-ms", value_name = "MS")]
    pub delay_ms: Option<u64>,
    /// Outlier policy (overrides config)
    #[arg(long, value_enum, value_name = "POLICY")]
    pub policy: Option<PolicyArg>,
    /// Policy parameter: z threshold, or the k multiplier of the other policies
    #[arg(long, value_name = "T")]
    pub threshold: Option<f64>,
    /// Print sampling and filter stats to stderr
    #[arg(long, action = ArgAction::SetTrue)]
    pub stats: bool,
    /// Write every sample with its keep/drop decision as CSV
    #[arg(long = "samples-csv", value_name = "FILE")]
    pub samples_csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure the subject's height with the ultrasonic rangefinder
    Height {
        #[command(flatten)]
        acq: AcquisitionArgs,
        /// Enable real-time mode (SCHED_FIFO, affinity, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux.\n\nAttempts SCHED_FIFO priority, pins the process to CPU 0, and calls mlockall(MCL_CURRENT|MCL_FUTURE). This reduces jitter in the echo timing loop but may require CAP_SYS_NICE/CAP_IPC_LOCK or root. Failures are logged and the measurement continues."
        )]
        rt: bool,
        /// Real-time priority for SCHED_FIFO (1..=max); defaults to max
        #[arg(long = "rt-prio", value_name = "PRIO")]
        rt_prio: Option<i32>,
    },
    /// Measure object temperature with the IR thermometer
    Temperature {
        #[command(flatten)]
        acq: AcquisitionArgs,
    },
    /// Take one reading from each sensor and report ok or the failure
    SelfCheck,
}
