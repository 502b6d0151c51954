//! The `recsynthc` pipeline: load a declaration file, synthesize the members of its records and
//! emit them in one of the textual forms.

pub mod operations;
pub mod pipeline;
pub mod query;
