#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use std::time::Duration;
use unlink::{Operation, Stack};

// Values are shared handles, so a peeked entry that outlives its node would
// show up as a use after free on the inner `Arc`.
fuzz_target!(|ops: Vec<Operation<i32>>| {
    let stack: Stack<Arc<i32>> = Stack::new();
    let len = ops.len();

    std::thread::scope(|s| {
        for sub_ops in ops.chunks(std::cmp::max(len / 20, 1)) {
            let stack = &stack;
            s.spawn(move || {
                for op in sub_ops {
                    match op {
                        Operation::Peek => {
                            if let Some(e) = stack.peek() {
                                std::thread::sleep(Duration::from_nanos(10));
                                stack.push(Arc::new(**e));
                            }
                        }
                        Operation::Pop => {
                            stack.pop();
                        }
                        Operation::PopPush => {
                            if let Some(e) = stack.pop() {
                                stack.push(Arc::new(e.wrapping_mul(**e)));
                            }
                        }
                        Operation::Push { item } => stack.push(Arc::new(*item)),
                        Operation::Append { items } => {
                            stack.append(items.iter().map(|&item| Arc::new(item)).collect());
                        }
                    }
                }
            });
        }
    });
});
