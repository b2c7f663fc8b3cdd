#![no_main]

use libfuzzer_sys::fuzz_target;
use unlink::{replay_logged, values_conserved, Operation, Stack};

fuzz_target!(|ops: Vec<Operation<i32>>| {
    let stack = Stack::new();

    let log = replay_logged(&stack, &ops, 20, |v: &i32| v.wrapping_mul(*v))
        .expect("no worker may panic");

    let counted = stack.len();
    let left: Vec<i32> = stack.into_iter().collect();

    assert_eq!(counted, left.len());
    assert!(log.outcome.is_balanced(0, left.len()));
    assert!(values_conserved(&[], &log, &left));
});
