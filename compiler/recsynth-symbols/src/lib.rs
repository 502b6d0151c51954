//! Symbol table consumed by the record synthesis engine.
//!
//! The table is built once from a declaration file and is immutable afterwards, apart from the
//! single-assignment capture cell every type carries. Types and members are addressed through the
//! [`TypeId`] and [`MemberId`] index handles so a [`Compilation`] can be shared freely between
//! worker threads.

pub mod builder;
pub mod cancel;
pub mod compilation;
pub mod decl;
pub mod error;
pub mod member;
pub mod modifiers;
pub mod ty;
pub mod type_name;
pub mod well_known;

pub use cancel::{CancellationToken, CancelledError};
pub use error::SymbolError;
pub use compilation::{
    CapturedParameters, Compilation, FieldRef, LanguageFeatures, Origin, PrimaryConstructor,
    TypeDeclKind, TypeSymbol,
};
pub use member::{
    Accessibility, Accessor, BodySummary, MemberId, MemberKind, MemberSymbol, ParameterSymbol,
    RefKind,
};
pub use modifiers::DeclarationModifiers;
pub use ty::{Nullability, SpecialType, TypeId, TypeKind, TypeRef};
pub use well_known::{MissingMemberError, WellKnownMember, WellKnownMembers, WellKnownType};
