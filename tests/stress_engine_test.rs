use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use unlink::config::TomlConfig;
use unlink::utils::validation::Validate;
use unlink::{replay, MutexStack, Operation, Stack, StressEngine};

#[test]
fn test_engine_from_toml_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"
[workload]
threads = 3
operations_per_thread = 400
seed = 2024
implementation = "both"

[mix]
push = 3
pop = 3
pop_push = 2
append = 1
peek = 1
append_batch = 5
"#,
    )?;

    let config = TomlConfig::from_file(file.path())?;
    config.validate()?;
    let settings = config.to_settings();

    let report = StressEngine::new(Stack::new(), settings).run()?;

    assert!(report.balanced);
    assert_eq!(report.threads, 3);
    assert_eq!(report.operations, 1200);
    assert_eq!(report.outcome.pushed, report.outcome.popped + report.remaining);

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["implementation"], "lockfree");
    assert_eq!(json["balanced"], true);

    Ok(())
}

#[test]
fn test_same_seed_same_outcome_single_thread() -> Result<()> {
    let ops = unlink::OperationMix::default().generate(1_000, 5);

    let lockfree = Stack::new();
    let mutex = MutexStack::new();

    let a = replay(&lockfree, &ops, 1, |v: &u64| v.wrapping_mul(*v))?;
    let b = replay(&mutex, &ops, 1, |v: &u64| v.wrapping_mul(*v))?;

    // With one worker both implementations see the same sequence.
    assert_eq!(a, b);
    assert_eq!(lockfree.len(), mutex.len());
    assert_eq!(lockfree.into_iter().collect::<Vec<_>>(), {
        let mut rest = Vec::new();
        while let Some(v) = mutex.pop() {
            rest.push(v);
        }
        rest
    });

    Ok(())
}

#[test]
fn test_replay_recorded_json() -> Result<()> {
    let recorded = r#"[
        {"op": "push", "item": 4},
        {"op": "append", "items": [1, 2, 3]},
        {"op": "pop_push"},
        {"op": "peek"},
        {"op": "pop"}
    ]"#;
    let ops: Vec<Operation<i64>> = serde_json::from_str(recorded)?;

    let stack = Stack::new();
    let outcome = replay(&stack, &ops, 1, |v: &i64| v * v)?;

    assert_eq!(outcome.pushed, 5);
    assert_eq!(outcome.popped, 2);
    assert_eq!(outcome.peeked, 1);
    assert_eq!(stack.into_iter().collect::<Vec<_>>(), vec![2, 1, 4]);

    // Spread over workers the interleaving varies, but nothing may go missing.
    let stack = Stack::new();
    let outcome = replay(&stack, &ops, 4, |v: &i64| v * v)?;
    assert!(outcome.is_balanced(0, stack.len()));

    Ok(())
}
