use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use unlink::core::recording::{generate_operations, load_operations, replay_rounds, save_operations};
use unlink::{Operation, UnlinkError};

#[test]
fn test_saved_operations_load_back() -> Result<()> {
    let ops = generate_operations(200, 9)?;
    let file = NamedTempFile::new()?;

    save_operations(file.path(), &ops)?;
    let loaded = load_operations(file.path())?;

    assert_eq!(loaded, ops);
    assert_eq!(generate_operations(200, 9)?, ops);

    Ok(())
}

#[test]
fn test_load_handwritten_file_and_replay_rounds() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"[
            {"op": "push", "item": 1},
            {"op": "push", "item": 2},
            {"op": "pop_push"},
            {"op": "append", "items": [7, 8]},
            {"op": "peek"},
            {"op": "pop"},
            {"op": "pop"}
        ]"#,
    )?;

    let ops = load_operations(file.path())?;
    assert_eq!(ops.len(), 7);
    assert_eq!(ops[3], Operation::Append { items: vec![7, 8] });

    let summary = replay_rounds(&ops, 1, 3)?;

    // push 1, push 2, pop 2 / push 4, append 7 8, pop 8, pop 7 => [4, 1] left
    assert_eq!(summary.rounds, 3);
    assert_eq!(summary.outcome.pushed, 3 * 5);
    assert_eq!(summary.outcome.popped, 3 * 3);
    assert_eq!(summary.outcome.peeked, 3);
    assert_eq!(summary.remaining, 3 * 2);

    Ok(())
}

#[test]
fn test_rounds_stay_balanced_across_threads() -> Result<()> {
    let count = if cfg!(miri) { 100 } else { 5_000 };
    let ops = generate_operations(count, 42)?;

    let summary = replay_rounds(&ops, 8, 2)?;

    assert_eq!(summary.rounds, 2);
    assert_eq!(
        summary.outcome.pushed,
        summary.outcome.popped + summary.remaining
    );

    Ok(())
}

#[test]
fn test_zero_rounds_replays_nothing() -> Result<()> {
    let ops = generate_operations(10, 1)?;

    assert_eq!(replay_rounds(&ops, 2, 0)?.rounds, 0);

    Ok(())
}

#[test]
fn test_malformed_file_is_serialization_error() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(br#"[{"op": "shove", "item": 1}]"#)?;

    let err = load_operations(file.path()).unwrap_err();
    assert!(matches!(err, UnlinkError::SerializationError(_)));

    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_operations("/nonexistent/ops.json").unwrap_err();

    assert!(matches!(err, UnlinkError::IoError(_)));
}
