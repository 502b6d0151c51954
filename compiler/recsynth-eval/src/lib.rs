//! Evaluation of synthesized record members.
//!
//! The interpreter runs body plans against a bump allocated heap, so that the behaviour of the
//! synthesized members can be observed end to end: construction, equality, hashing, printing,
//! cloning and deconstruction.

pub mod builtins;
pub mod error;
pub mod heap;
pub mod interpreter;
pub mod operations;

pub use error::{EvalError, EvalResult};
pub use heap::{Heap, HeapObject, Value};
pub use interpreter::{Interpreter, Invocation, MAX_CALL_DEPTH};
