use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single step of a concurrent workload. Fuzz targets derive these from raw
/// bytes; the stress engine draws them from an [`OperationMix`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation<T> {
    Push { item: T },
    Pop,
    /// Pop a value and push back one derived from it.
    PopPush,
    Append { items: Vec<T> },
    Peek,
}

/// Relative weights of each [`Operation`] kind in a generated workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationMix {
    pub push: u32,
    pub pop: u32,
    pub pop_push: u32,
    pub append: u32,
    pub peek: u32,
    /// Upper bound on the number of items in one `Append`.
    pub append_batch: usize,
}

impl Default for OperationMix {
    fn default() -> Self {
        Self {
            push: 4,
            pop: 3,
            pop_push: 1,
            append: 1,
            peek: 1,
            append_batch: 8,
        }
    }
}

impl OperationMix {
    pub fn total_weight(&self) -> u64 {
        [self.push, self.pop, self.pop_push, self.append, self.peek]
            .iter()
            .map(|&w| w as u64)
            .sum()
    }

    /// Draws `count` operations with a deterministic RNG. Pushed items are
    /// unique within one call so conservation can be checked afterwards.
    pub fn generate(&self, count: usize, seed: u64) -> Vec<Operation<u64>> {
        let total = self.total_weight();
        if total == 0 {
            return Vec::new();
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut next_item = 0u64;
        let mut fresh = || {
            next_item += 1;
            next_item
        };

        (0..count)
            .map(|_| {
                let mut pick = rng.random_range(0..total);
                let weights = [self.push, self.pop, self.pop_push, self.append, self.peek];
                let mut kind = 0;
                for (i, &w) in weights.iter().enumerate() {
                    if pick < w as u64 {
                        kind = i;
                        break;
                    }
                    pick -= w as u64;
                }

                match kind {
                    0 => Operation::Push { item: fresh() },
                    1 => Operation::Pop,
                    2 => Operation::PopPush,
                    3 => {
                        let len = rng.random_range(1..=self.append_batch.max(1));
                        Operation::Append {
                            items: (0..len).map(|_| fresh()).collect(),
                        }
                    }
                    _ => Operation::Peek,
                }
            })
            .collect()
    }
}

/// Which stack implementation(s) a stress run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    #[default]
    Lockfree,
    Mutex,
    Both,
}

impl Implementation {
    pub fn targets(self) -> &'static [Implementation] {
        match self {
            Implementation::Lockfree => &[Implementation::Lockfree],
            Implementation::Mutex => &[Implementation::Mutex],
            Implementation::Both => &[Implementation::Lockfree, Implementation::Mutex],
        }
    }
}

/// Fully resolved parameters of one stress run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressSettings {
    pub threads: usize,
    pub operations_per_thread: usize,
    pub seed: u64,
    pub mix: OperationMix,
    pub implementation: Implementation,
}

impl Default for StressSettings {
    fn default() -> Self {
        Self {
            threads: 4,
            operations_per_thread: 10_000,
            seed: 0x5eed,
            mix: OperationMix::default(),
            implementation: Implementation::default(),
        }
    }
}

impl StressSettings {
    pub fn total_operations(&self) -> usize {
        self.threads.saturating_mul(self.operations_per_thread)
    }
}

/// Counters collected while replaying operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub pushed: usize,
    pub popped: usize,
    pub peeked: usize,
    pub empty_pops: usize,
}

impl ReplayOutcome {
    pub fn merge(&mut self, other: ReplayOutcome) {
        self.pushed += other.pushed;
        self.popped += other.popped;
        self.peeked += other.peeked;
        self.empty_pops += other.empty_pops;
    }

    /// Every value that was on the stack or pushed since was either popped once
    /// or is still there.
    pub fn is_balanced(&self, initial: usize, remaining: usize) -> bool {
        self.pushed + initial == self.popped + remaining
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressReport {
    pub implementation: String,
    pub started_at: DateTime<Utc>,
    pub threads: usize,
    pub operations: usize,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
    pub outcome: ReplayOutcome,
    pub remaining: usize,
    pub balanced: bool,
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ops on {} threads in {:.2}ms ({:.0} ops/s), pushed {}, popped {}, remaining {}{}",
            self.implementation,
            self.operations,
            self.threads,
            self.elapsed_ms,
            self.ops_per_sec,
            self.outcome.pushed,
            self.outcome.popped,
            self.remaining,
            if self.balanced { "" } else { " (UNBALANCED)" }
        )
    }
}
