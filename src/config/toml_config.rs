use crate::domain::model::{Implementation, OperationMix, StressSettings};
use crate::domain::ports::WorkloadProvider;
use crate::utils::error::{Result, UnlinkError};
use crate::utils::validation::Validate;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub mix: OperationMix,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub threads: Option<usize>,
    pub operations_per_thread: Option<usize>,
    pub seed: Option<u64>,
    pub implementation: Option<Implementation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub json: Option<bool>,
    pub monitor: Option<bool>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| UnlinkError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${UNLINK_SEED})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn json_report(&self) -> bool {
        self.report.as_ref().and_then(|r| r.json).unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.report.as_ref().and_then(|r| r.monitor).unwrap_or(false)
    }

    pub fn to_settings(&self) -> StressSettings {
        StressSettings {
            threads: self.threads(),
            operations_per_thread: self.operations_per_thread(),
            seed: self.seed(),
            mix: self.mix(),
            implementation: self.implementation(),
        }
    }
}

impl WorkloadProvider for TomlConfig {
    fn threads(&self) -> usize {
        self.workload
            .threads
            .unwrap_or_else(|| StressSettings::default().threads)
    }

    fn operations_per_thread(&self) -> usize {
        self.workload
            .operations_per_thread
            .unwrap_or_else(|| StressSettings::default().operations_per_thread)
    }

    fn seed(&self) -> u64 {
        self.workload
            .seed
            .unwrap_or_else(|| StressSettings::default().seed)
    }

    fn mix(&self) -> OperationMix {
        self.mix
    }

    fn implementation(&self) -> Implementation {
        self.workload.implementation.unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.to_settings().validate()
    }
}
