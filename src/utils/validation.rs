use crate::domain::model::{OperationMix, StressSettings};
use crate::utils::error::{Result, UnlinkError};

pub const MAX_THREADS: usize = 1024;
pub const MAX_APPEND_BATCH: usize = 4096;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(UnlinkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(UnlinkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(UnlinkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(UnlinkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

impl Validate for OperationMix {
    fn validate(&self) -> Result<()> {
        if self.total_weight() == 0 {
            return Err(UnlinkError::ConfigValidationError {
                field: "mix".to_string(),
                message: "At least one operation weight must be non-zero".to_string(),
            });
        }

        if self.append > 0 {
            validate_range("mix.append_batch", self.append_batch, 1, MAX_APPEND_BATCH)?;
        }

        Ok(())
    }
}

impl Validate for StressSettings {
    fn validate(&self) -> Result<()> {
        validate_range("workload.threads", self.threads, 1, MAX_THREADS)?;
        validate_positive_number("workload.operations_per_thread", self.operations_per_thread, 1)?;
        self.mix.validate()
    }
}
