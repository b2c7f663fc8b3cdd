use crate::domain::model::StressSettings;
use crate::utils::error::{Result, UnlinkError};
use std::env;
use std::str::FromStr;

pub const THREADS_VAR: &str = "UNLINK_THREADS";
pub const OPERATIONS_VAR: &str = "UNLINK_OPS";
pub const SEED_VAR: &str = "UNLINK_SEED";

/// Workload overrides read from the environment. CI uses these to shrink runs
/// under Miri without touching the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub threads: Option<usize>,
    pub operations_per_thread: Option<usize>,
    pub seed: Option<u64>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            threads: parse_var(&lookup, THREADS_VAR)?,
            operations_per_thread: parse_var(&lookup, OPERATIONS_VAR)?,
            seed: parse_var(&lookup, SEED_VAR)?,
        })
    }

    pub fn apply(&self, settings: &mut StressSettings) {
        if let Some(threads) = self.threads {
            settings.threads = threads;
        }
        if let Some(ops) = self.operations_per_thread {
            settings.operations_per_thread = ops;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| UnlinkError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
