use std::path::Path;

use crate::core::stack::Stack;
use crate::core::stress::{replay_logged, values_conserved};
use crate::domain::model::{Operation, OperationMix, ReplayOutcome};
use crate::utils::error::{Result, UnlinkError};
use crate::utils::validation::Validate;

/// Reads a JSON operation list such as `[{"op":"push","item":1},{"op":"pop"}]`.
pub fn load_operations<P: AsRef<Path>>(path: P) -> Result<Vec<Operation<i64>>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes `ops` in the format [`load_operations`] reads.
pub fn save_operations<P: AsRef<Path>>(path: P, ops: &[Operation<i64>]) -> Result<()> {
    std::fs::write(&path, serde_json::to_string_pretty(ops)?)?;
    tracing::info!("📁 Operations saved to: {}", path.as_ref().display());
    Ok(())
}

/// Draws `count` operations from the default mix.
pub fn generate_operations(count: usize, seed: u64) -> Result<Vec<Operation<i64>>> {
    let mix = OperationMix::default();
    mix.validate()?;

    Ok(mix
        .generate(count, seed)
        .into_iter()
        .map(|op| match op {
            Operation::Push { item } => Operation::Push { item: item as i64 },
            Operation::Append { items } => Operation::Append {
                items: items.into_iter().map(|i| i as i64).collect(),
            },
            Operation::Pop => Operation::Pop,
            Operation::PopPush => Operation::PopPush,
            Operation::Peek => Operation::Peek,
        })
        .collect())
}

/// Totals over every round of [`replay_rounds`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundsSummary {
    pub rounds: usize,
    pub outcome: ReplayOutcome,
    pub remaining: usize,
}

/// Replays `ops` `rounds` times, each on a fresh lock free stack, and checks
/// after every round that the values left in the stack plus the values popped
/// are exactly the values pushed.
pub fn replay_rounds(ops: &[Operation<i64>], threads: usize, rounds: usize) -> Result<RoundsSummary> {
    let mut summary = RoundsSummary::default();

    for round in 0..rounds {
        let stack = Stack::new();
        let log = replay_logged(&stack, ops, threads, |v: &i64| v.wrapping_mul(*v))?;

        // 逐一取出剩餘元素，不只看計數器
        let counted = stack.len();
        let left: Vec<i64> = stack.into_iter().collect();

        if counted != left.len()
            || !log.outcome.is_balanced(0, left.len())
            || !values_conserved(&[], &log, &left)
        {
            return Err(UnlinkError::InvariantViolation {
                message: format!(
                    "round {}: {} pushed, {} popped, {} remaining (len reported {})",
                    round,
                    log.outcome.pushed,
                    log.outcome.popped,
                    left.len(),
                    counted
                ),
            });
        }

        tracing::debug!(round, outcome = ?log.outcome, remaining = left.len(), "Round complete");

        summary.rounds += 1;
        summary.outcome.merge(log.outcome);
        summary.remaining += left.len();
    }

    Ok(summary)
}
