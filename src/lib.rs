//! A lock free stack that supports concurrent `push`, `pop`, `peek` and
//! `append`, reclaiming memory with hazard pointers.
//!
//! ```
//! use unlink::Stack;
//! use std::thread;
//!
//! let stack = Stack::new();
//! thread::scope(|s| {
//!     let stack = &stack;
//!
//!     s.spawn(move || {
//!         for i in 0..100 {
//!             stack.push(i);
//!         }
//!     });
//!
//!     s.spawn(move || {
//!         for _ in 0..100 {
//!             stack.pop();
//!         }
//!     });
//!
//!     s.spawn(move || {
//!         for _ in 0..100 {
//!             let _ = stack.peek();
//!         }
//!     });
//!
//!     s.spawn(move || {
//!         for i in 0..10_usize {
//!             stack.append(vec![i.pow(2), i.pow(3), i.pow(4)].into_iter().collect());
//!         }
//!     });
//! });
//!
//! stack.into_iter().for_each(|v| print!("{}, ", v));
//! ```
//!
//! The `core::stress` module and the `unlink-stress` binary replay generated
//! workloads against the stack and a mutex baseline, checking that no element
//! is lost or duplicated.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{ResolvedRun, StressCli};

pub use crate::core::baseline::MutexStack;
pub use crate::core::stack::{reclaim_retired, Entry, IntoIter, Stack};
pub use crate::core::stress::{drain, replay, replay_logged, values_conserved, ReplayLog, StressEngine};
pub use domain::model::{Implementation, Operation, OperationMix, ReplayOutcome, StressReport, StressSettings};
pub use domain::ports::ConcurrentStack;
pub use utils::error::{Result, UnlinkError};
