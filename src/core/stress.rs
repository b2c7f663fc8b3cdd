use std::cmp::max;
use std::thread;
use std::time::Instant;

use chrono::Utc;

use crate::core::stack::reclaim_retired;
use crate::domain::model::{Operation, ReplayOutcome, StressReport, StressSettings};
use crate::domain::ports::ConcurrentStack;
use crate::utils::error::{Result, UnlinkError};
use crate::utils::monitor::SystemMonitor;

/// Splits `ops` into contiguous chunks of `max(len / threads, 1)` and applies
/// each chunk on its own scoped thread against the shared `stack`.
///
/// `derive` computes the value pushed back by [`Operation::PopPush`].
pub fn replay<S, V, F>(stack: &S, ops: &[Operation<V>], threads: usize, derive: F) -> Result<ReplayOutcome>
where
    S: ConcurrentStack<V> + ?Sized,
    V: Clone + Send + Sync,
    F: Fn(&V) -> V + Sync,
{
    replay_logged(stack, ops, threads, derive).map(|log| log.outcome)
}

/// What a replay moved through the stack, value by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayLog<V> {
    pub outcome: ReplayOutcome,
    /// Every value handed to the stack, including derived `PopPush` values.
    pub pushed: Vec<V>,
    /// Every value a successful pop returned.
    pub popped: Vec<V>,
}

impl<V> Default for ReplayLog<V> {
    fn default() -> Self {
        Self {
            outcome: ReplayOutcome::default(),
            pushed: Vec::new(),
            popped: Vec::new(),
        }
    }
}

impl<V> ReplayLog<V> {
    fn merge(&mut self, other: ReplayLog<V>) {
        self.outcome.merge(other.outcome);
        self.pushed.extend(other.pushed);
        self.popped.extend(other.popped);
    }
}

/// Same as [`replay`] but also records the values pushed and popped, so the
/// caller can check identity and not just counts.
pub fn replay_logged<S, V, F>(
    stack: &S,
    ops: &[Operation<V>],
    threads: usize,
    derive: F,
) -> Result<ReplayLog<V>>
where
    S: ConcurrentStack<V> + ?Sized,
    V: Clone + Send + Sync,
    F: Fn(&V) -> V + Sync,
{
    if ops.is_empty() {
        return Ok(ReplayLog::default());
    }

    let chunk = max(ops.len() / max(threads, 1), 1);
    let derive = &derive;

    let results: Vec<thread::Result<ReplayLog<V>>> = thread::scope(|s| {
        let handles: Vec<_> = ops
            .chunks(chunk)
            .map(|sub_ops| s.spawn(move || apply(stack, sub_ops, derive)))
            .collect();

        handles.into_iter().map(|h| h.join()).collect()
    });

    let mut log = ReplayLog::default();
    for (worker, result) in results.into_iter().enumerate() {
        let part = result.map_err(|_| UnlinkError::WorkerPanicked { worker })?;
        log.merge(part);
    }

    Ok(log)
}

fn apply<S, V, F>(stack: &S, ops: &[Operation<V>], derive: &F) -> ReplayLog<V>
where
    S: ConcurrentStack<V> + ?Sized,
    V: Clone,
    F: Fn(&V) -> V,
{
    let mut log = ReplayLog::default();

    for op in ops {
        match op {
            Operation::Push { item } => {
                stack.push(item.clone());
                log.pushed.push(item.clone());
                log.outcome.pushed += 1;
            }
            Operation::Pop => match stack.pop_value() {
                Some(value) => {
                    log.popped.push(value);
                    log.outcome.popped += 1;
                }
                None => log.outcome.empty_pops += 1,
            },
            Operation::PopPush => match stack.pop_value() {
                Some(value) => {
                    let derived = derive(&value);
                    log.popped.push(value);
                    log.outcome.popped += 1;
                    stack.push(derived.clone());
                    log.pushed.push(derived);
                    log.outcome.pushed += 1;
                }
                None => log.outcome.empty_pops += 1,
            },
            Operation::Append { items } => {
                log.outcome.pushed += items.len();
                log.pushed.extend(items.iter().cloned());
                stack.append_items(items.clone());
            }
            Operation::Peek => {
                if stack.peek_value().is_some() {
                    log.outcome.peeked += 1;
                }
            }
        }
    }

    log
}

/// Pops until the stack reports empty, returning the values top to bottom.
pub fn drain<S, V>(stack: &S) -> Vec<V>
where
    S: ConcurrentStack<V> + ?Sized,
{
    std::iter::from_fn(|| stack.pop_value()).collect()
}

/// True when the values that went in (`initial` plus everything pushed) are
/// exactly the values that came out (everything popped plus what was left),
/// as multisets.
pub fn values_conserved<V: Ord + Clone>(initial: &[V], log: &ReplayLog<V>, remaining: &[V]) -> bool {
    let mut before: Vec<V> = initial.iter().chain(&log.pushed).cloned().collect();
    let mut after: Vec<V> = log.popped.iter().chain(remaining).cloned().collect();
    before.sort_unstable();
    after.sort_unstable();
    before == after
}

/// Drives a generated workload against one stack and checks conservation.
pub struct StressEngine<S> {
    stack: S,
    settings: StressSettings,
    monitor: SystemMonitor,
}

impl<S: ConcurrentStack<u64>> StressEngine<S> {
    pub fn new(stack: S, settings: StressSettings) -> Self {
        Self::new_with_monitoring(stack, settings, false)
    }

    pub fn new_with_monitoring(stack: S, settings: StressSettings, monitor_enabled: bool) -> Self {
        Self {
            stack,
            settings,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn run(&self) -> Result<StressReport> {
        let name = self.stack.name();
        let total = self.settings.total_operations();

        tracing::info!(
            implementation = name,
            threads = self.settings.threads,
            operations = total,
            seed = self.settings.seed,
            "Starting stress run"
        );

        let ops = self.settings.mix.generate(total, self.settings.seed);
        let initial = self.take_contents();
        self.restore_contents(initial.clone());
        self.monitor.log_phase("generate");

        let started_at = Utc::now();
        let start = Instant::now();
        let log = replay_logged(&self.stack, &ops, self.settings.threads, |v: &u64| {
            v.wrapping_mul(*v)
        })?;
        let elapsed = start.elapsed();
        self.monitor.log_phase("replay");

        let reclaimed = reclaim_retired();
        tracing::debug!(reclaimed, "Reclamation pass after replay");

        // 以實際彈出的值計算剩餘數量，不信任 len 計數器
        let counted = self.stack.len();
        let left = self.take_contents();
        let remaining = left.len();
        let outcome = log.outcome;

        let counter_matches = counted == remaining;
        let counts_balanced = outcome.is_balanced(initial.len(), remaining);
        let identity_kept = values_conserved(&initial, &log, &left);
        let balanced = counter_matches && counts_balanced && identity_kept;

        self.restore_contents(left);

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let ops_per_sec = if elapsed.as_secs_f64() > 0.0 {
            ops.len() as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        let report = StressReport {
            implementation: name.to_string(),
            started_at,
            threads: self.settings.threads,
            operations: ops.len(),
            elapsed_ms,
            ops_per_sec,
            outcome,
            remaining,
            balanced,
        };

        if !balanced {
            tracing::error!(
                pushed = outcome.pushed,
                popped = outcome.popped,
                remaining,
                counted,
                identity_kept,
                "Conservation check failed"
            );
            return Err(UnlinkError::InvariantViolation {
                message: format!(
                    "{} pushed, {} popped, {} remaining (len reported {}), values {}",
                    outcome.pushed,
                    outcome.popped,
                    remaining,
                    counted,
                    if identity_kept { "intact" } else { "lost, duplicated or altered" }
                ),
            });
        }

        tracing::info!("✅ {}", report);
        Ok(report)
    }

    /// Drains the stack, returning its values bottom to top.
    fn take_contents(&self) -> Vec<u64> {
        let mut values = drain(&self.stack);
        values.reverse();
        values
    }

    /// Pushes back values taken by [`Self::take_contents`] in their old order.
    fn restore_contents(&self, values: Vec<u64>) {
        if !values.is_empty() {
            self.stack.append_items(values);
        }
    }
}
