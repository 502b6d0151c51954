//! Macros shared by every crate in the workspace.

mod error;

#[cfg(feature = "assertion-macros")]
mod assertions;
