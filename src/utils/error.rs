use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnlinkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Worker thread {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("Stack invariant violated: {message}")]
    InvariantViolation { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl UnlinkError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UnlinkError::IoError(_) | UnlinkError::SerializationError(_) => ErrorCategory::Io,
            UnlinkError::ConfigValidationError { .. }
            | UnlinkError::InvalidConfigValueError { .. }
            | UnlinkError::MissingConfigError { .. } => ErrorCategory::Configuration,
            UnlinkError::WorkerPanicked { .. } | UnlinkError::InvariantViolation { .. } => {
                ErrorCategory::Runtime
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            UnlinkError::SerializationError(_) => ErrorSeverity::Medium,
            UnlinkError::IoError(_)
            | UnlinkError::ConfigValidationError { .. }
            | UnlinkError::InvalidConfigValueError { .. }
            | UnlinkError::MissingConfigError { .. } => ErrorSeverity::High,
            UnlinkError::WorkerPanicked { .. } | UnlinkError::InvariantViolation { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "Check the command line flags and the TOML file against --help",
            ErrorCategory::Io => "Check that the file exists and is readable, and that its content is valid",
            ErrorCategory::Runtime => "Re-run with the same seed and RUST_LOG=unlink=trace, then under Miri",
        }
    }

    /// 根據錯誤嚴重程度決定退出碼，永遠不為 0
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,   // 序列化錯誤
            ErrorSeverity::High => 1,     // 設定或 IO 錯誤
            ErrorSeverity::Critical => 3, // 執行期不變量被破壞
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            UnlinkError::WorkerPanicked { worker } => {
                format!("A worker thread ({}) crashed during the run", worker)
            }
            UnlinkError::InvariantViolation { message } => {
                format!("The stack lost or duplicated elements: {}", message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UnlinkError>;
