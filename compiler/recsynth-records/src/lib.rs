//! Record member synthesis.
//!
//! Given a symbol table, this crate decides which members a record type receives implicitly,
//! what their signatures and modifiers are, and what their bodies do. Bodies are produced as
//! [`plan::BodyPlan`]s, a small statement language the evaluator interprets directly.
//!
//! Synthesis of one record happens in two phases. Descriptors for every member are created first
//! and stored in a per-record arena, so that bodies can refer to sibling members by handle. Only
//! then are bodies generated. User-declared members that replace synthesized ones are validated
//! after the bodies.
//!
//! Records of a compilation are synthesized in layers ordered by the depth of their record base
//! chain, see [`driver::synthesize_compilation`].

pub mod arena;
pub mod capture;
pub mod consistency;
pub mod driver;
pub mod env;
pub mod error;
pub mod explicit;
pub mod locator;
pub mod member;
pub mod modifiers;
pub mod plan;
pub mod positional;
pub mod record;
pub mod synth;
pub mod textual_pass;

pub use driver::{synthesize_compilation, SynthesisOptions, SynthesisOutput};
pub use env::{MemberRef, MemberView, PublishedRecords, SymbolEnvironment};
pub use error::{DiagnosticBag, RecordDiagnostic, SynthesisError};
pub use member::{MemberDescriptor, SynthesizedMember, SynthesizedMemberKind};
pub use record::{synthesize_record, RecordSynthesis};
