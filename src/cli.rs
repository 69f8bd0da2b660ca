use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DesignConfig, InteractionSelector, SampleSizes};
use crate::grid::SampleSizeRange;

#[derive(Debug, Parser)]
#[command(
    name = "kira-powersim",
    version,
    about = "Monte Carlo sample-size estimation for group x time designs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Simulate the full grid and estimate power per sample size.
    Run(RunArgs),
    /// Write the dataset of a single grid unit as long-format TSV.
    Dataset(DatasetArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    #[arg(long, default_value = "powersim_out")]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,

    #[arg(long, default_value_t = false, help = "Also write per-unit fit results")]
    pub units_tsv: bool,

    #[arg(long, help = "Number of replications per sample size")]
    pub replications: Option<usize>,

    #[arg(long, help = "Significance threshold")]
    pub alpha: Option<f64>,

    #[arg(long)]
    pub target_power: Option<f64>,

    #[arg(long, help = "Smallest sample size per group")]
    pub n_min: Option<usize>,

    #[arg(long, help = "Largest sample size per group")]
    pub n_max: Option<usize>,

    #[arg(long, help = "Sample size increment")]
    pub n_step: Option<usize>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Explicit sample sizes (overrides --n-min/--n-max/--n-step)"
    )]
    pub sample_sizes: Vec<usize>,

    #[arg(long, help = "Number of threads (0 = auto)")]
    pub threads: Option<usize>,

    #[arg(long, help = "Stop dispatching new units after this many seconds")]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value_t = false, help = "Test all interaction terms jointly (F-test)")]
    pub omnibus: bool,
}

#[derive(Debug, Args)]
pub struct DatasetArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    #[arg(long, help = "Subjects per group")]
    pub n: usize,

    #[arg(long, default_value_t = 1)]
    pub replication: usize,

    #[arg(long, help = "Output TSV (stdout when omitted)")]
    pub out: Option<PathBuf>,
}

/// Design parameters shared by every subcommand. Unset values keep the
/// config file (or built-in reference design) value.
#[derive(Debug, Args)]
pub struct DesignArgs {
    #[arg(long, help = "Design config (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(long, value_delimiter = ',', help = "Group labels, reference first")]
    pub groups: Vec<String>,

    #[arg(long, help = "Number of time points")]
    pub times: Option<usize>,

    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        help = "Cell means, group-major"
    )]
    pub means: Vec<f64>,

    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        help = "Cell SDs, group-major"
    )]
    pub sds: Vec<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub support_min: Option<i32>,

    #[arg(long, allow_negative_numbers = true)]
    pub support_max: Option<i32>,

    #[arg(long, help = "Base random seed")]
    pub seed: Option<u64>,
}

impl DesignArgs {
    pub fn apply_to(&self, config: &mut DesignConfig) {
        if !self.groups.is_empty() {
            config.groups = self.groups.clone();
        }
        if let Some(times) = self.times {
            config.times = times;
        }
        if !self.means.is_empty() {
            config.means = self.means.clone();
        }
        if !self.sds.is_empty() {
            config.sds = self.sds.clone();
        }
        if let Some(min) = self.support_min {
            config.support.min = min;
        }
        if let Some(max) = self.support_max {
            config.support.max = max;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

impl RunArgs {
    pub fn apply_to(&self, config: &mut DesignConfig) {
        self.design.apply_to(config);
        if let Some(r) = self.replications {
            config.replications = r;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(target) = self.target_power {
            config.target_power = target;
        }
        if !self.sample_sizes.is_empty() {
            config.sample_sizes = SampleSizes::List(self.sample_sizes.clone());
        } else if self.n_min.is_some() || self.n_max.is_some() || self.n_step.is_some() {
            let base = match &config.sample_sizes {
                SampleSizes::Range(range) => *range,
                SampleSizes::List(_) => SampleSizeRange::default(),
            };
            config.sample_sizes = SampleSizes::Range(SampleSizeRange {
                min: self.n_min.unwrap_or(base.min),
                max: self.n_max.unwrap_or(base.max),
                step: self.n_step.unwrap_or(base.step),
            });
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.timeout_secs.is_some() {
            config.timeout_secs = self.timeout_secs;
        }
        if self.omnibus {
            config.interaction = InteractionSelector::Omnibus;
        }
    }
}
