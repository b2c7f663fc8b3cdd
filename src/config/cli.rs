use crate::config::env::EnvOverrides;
use crate::config::toml_config::TomlConfig;
use crate::domain::model::{Implementation, OperationMix, StressSettings};
use crate::domain::ports::WorkloadProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "unlink-stress")]
#[command(about = "Concurrent stress runner for the unlink lock free stack")]
pub struct StressCli {
    /// Path to a TOML workload file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub threads: Option<usize>,

    /// Operations per thread
    #[arg(long)]
    pub ops: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum)]
    pub implementation: Option<Implementation>,

    /// Print reports as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Log process CPU and memory between phases
    #[arg(long)]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Everything the binary needs after merging file, environment and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    pub settings: StressSettings,
    pub json: bool,
    pub monitor: bool,
}

impl StressCli {
    /// Merges sources in increasing priority: defaults, TOML file,
    /// `UNLINK_*` environment variables, then command line flags.
    pub fn resolve(&self) -> Result<ResolvedRun> {
        self.resolve_with(EnvOverrides::from_env()?)
    }

    pub fn resolve_with(&self, env: EnvOverrides) -> Result<ResolvedRun> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        let mut settings = file.to_settings();
        env.apply(&mut settings);

        settings.threads = self.threads.unwrap_or(settings.threads);
        settings.operations_per_thread = self.ops.unwrap_or(settings.operations_per_thread);
        settings.seed = self.seed.unwrap_or(settings.seed);
        settings.implementation = self.implementation.unwrap_or(settings.implementation);

        settings.validate()?;

        Ok(ResolvedRun {
            settings,
            json: self.json || file.json_report(),
            monitor: self.monitor || file.monitoring_enabled(),
        })
    }
}

/// 合併後的設定，而非單一來源
impl WorkloadProvider for ResolvedRun {
    fn threads(&self) -> usize {
        self.settings.threads
    }

    fn operations_per_thread(&self) -> usize {
        self.settings.operations_per_thread
    }

    fn seed(&self) -> u64 {
        self.settings.seed
    }

    fn mix(&self) -> OperationMix {
        self.settings.mix
    }

    fn implementation(&self) -> Implementation {
        self.settings.implementation
    }
}
