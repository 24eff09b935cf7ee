//! unl-eval - The Unlambda evaluator
//!
//! A continuation-passing state machine over heap cells: four registers
//! (`val`, `op`, `task`, `task_val`) plus an explicit continuation spine on
//! the heap. This shape is forced by the language itself - `c` reifies the
//! current continuation as a first-class value, `d` suppresses evaluation
//! of its operand, and `e` aborts - none of which survive a host-stack
//! recursive evaluator.
//!
//! The apply step also performs the partial-application rewrites: shapes
//! like ``` ``s`kf ``` collapse into compact `B`/`C`/`T`/`V` combinators
//! before they can grow into a general substitution, cutting allocation
//! and dispatch on the hot path without changing observable behavior.

pub mod error;
pub mod machine;

pub use error::{EvalError, Result};
pub use machine::Machine;
