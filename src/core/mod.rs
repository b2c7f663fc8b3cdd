pub mod baseline;
mod node;
pub mod recording;
pub mod stack;
pub mod stress;

pub use crate::domain::model::{Operation, OperationMix, ReplayOutcome, StressReport, StressSettings};
pub use crate::domain::ports::{ConcurrentStack, WorkloadProvider};
pub use crate::utils::error::Result;
