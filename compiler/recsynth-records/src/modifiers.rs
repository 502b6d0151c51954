//! Declaration modifiers of synthesized members.
//!
//! Modifiers are a pure function of the containing record's shape, the base member the synthesized
//! member relates to, and the member kind. Every resolved set is checked against the legal sets of
//! its kind; a set outside them is an engine bug.

use crate::locator::BaseMemberReference;
use crate::member::{HasStandardModifierShape, SynthesizedMemberKind};
use recsynth_diagnostics::debug_ice;
use recsynth_symbols::{Compilation, DeclarationModifiers, TypeId};

/// What a record derives from, as far as synthesis is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    /// `System.Object`, or `System.ValueType` for record structs.
    Root,
    Derived(TypeId),
}

/// The shape of the containing record the resolver works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    pub ty: TypeId,
    pub is_struct: bool,
    /// Sealed classes and every struct.
    pub is_sealed: bool,
    pub is_abstract: bool,
    pub base: BaseKind,
    /// Every positional member is read through a readonly getter or a field.
    pub positional_getters_readonly: bool,
    /// Every printable property has a readonly getter.
    pub printable_getters_readonly: bool,
}

impl RecordShape {
    pub fn of(compilation: &Compilation, ty: TypeId) -> Self {
        let symbol = compilation.ty(ty);
        let base = match symbol.base {
            Some(base) if !symbol.is_struct() && !compilation.is_object(base) => {
                BaseKind::Derived(base)
            }
            _ => BaseKind::Root,
        };
        Self {
            ty,
            is_struct: symbol.is_struct(),
            is_sealed: symbol.is_sealed || symbol.is_struct(),
            is_abstract: symbol.is_abstract,
            base,
            positional_getters_readonly: false,
            printable_getters_readonly: false,
        }
    }

    pub fn base_type(&self) -> Option<TypeId> {
        match self.base {
            BaseKind::Root => None,
            BaseKind::Derived(base) => Some(base),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.base, BaseKind::Derived(_))
    }
}

pub fn resolve_modifiers(
    shape: &RecordShape,
    base: &BaseMemberReference,
    kind: SynthesizedMemberKind,
) -> DeclarationModifiers {
    use recsynth_symbols::DeclarationModifiers as M;

    let modifiers = match kind {
        SynthesizedMemberKind::PrimaryConstructor if shape.is_abstract => M::PROTECTED,
        SynthesizedMemberKind::PrimaryConstructor => M::PUBLIC,
        SynthesizedMemberKind::PositionalProperty { .. } => match base.found {
            Some(_) => M::PUBLIC | M::OVERRIDE,
            None => M::PUBLIC,
        },
        SynthesizedMemberKind::Deconstruct => {
            let mut modifiers = M::PUBLIC;
            if shape.is_struct && shape.positional_getters_readonly {
                modifiers |= M::READONLY;
            }
            modifiers
        }
        SynthesizedMemberKind::CopyConstructor if shape.is_sealed => M::PRIVATE,
        SynthesizedMemberKind::CopyConstructor => M::PROTECTED,
        SynthesizedMemberKind::Clone => {
            let mut modifiers = M::PUBLIC;
            if base.found.is_some() {
                modifiers |= M::OVERRIDE;
            } else if !shape.is_sealed {
                modifiers |= M::VIRTUAL;
            }
            if shape.is_abstract {
                modifiers.remove(M::VIRTUAL);
                modifiers |= M::ABSTRACT;
            }
            modifiers
        }
        SynthesizedMemberKind::EqualityContract if shape.is_derived() => {
            M::PROTECTED | M::OVERRIDE
        }
        SynthesizedMemberKind::EqualityContract if shape.is_sealed => M::PRIVATE,
        SynthesizedMemberKind::EqualityContract => M::PROTECTED | M::VIRTUAL,
        SynthesizedMemberKind::EqualsTyped => {
            let mut modifiers = M::PUBLIC;
            if shape.is_struct {
                modifiers |= M::READONLY;
            } else if !shape.is_sealed {
                modifiers |= M::VIRTUAL;
            }
            modifiers
        }
        SynthesizedMemberKind::BaseEquals => M::PUBLIC | M::OVERRIDE | M::SEALED,
        SynthesizedMemberKind::EqualsObject | SynthesizedMemberKind::GetHashCode => {
            let mut modifiers = M::PUBLIC | M::OVERRIDE;
            if shape.is_struct {
                modifiers |= M::READONLY;
            }
            modifiers
        }
        // ToString calls PrintMembers and may only be readonly when it is.
        SynthesizedMemberKind::ToString => {
            let mut modifiers = M::PUBLIC | M::OVERRIDE;
            if shape.is_struct && shape.printable_getters_readonly {
                modifiers |= M::READONLY;
            }
            modifiers
        }
        SynthesizedMemberKind::EqualityOperator | SynthesizedMemberKind::InequalityOperator => {
            M::PUBLIC | M::STATIC
        }
        SynthesizedMemberKind::PrintMembers => {
            let private = shape.is_struct || (!shape.is_derived() && shape.is_sealed);
            let mut modifiers = if private { M::PRIVATE } else { M::PROTECTED };
            if shape.is_derived() {
                modifiers |= M::OVERRIDE;
            } else if !shape.is_sealed {
                modifiers |= M::VIRTUAL;
            }
            if shape.is_struct && shape.printable_getters_readonly {
                modifiers |= M::READONLY;
            }
            modifiers
        }
    };

    if !kind.is_legal(modifiers) {
        debug_ice!(format!(
            "modifier set '{}' is outside the legal sets of {:?}",
            modifiers.keywords(),
            kind
        ));
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use crate::env::MemberRef;
    use crate::locator::BaseMemberReference;
    use crate::member::SynthesizedMemberKind;
    use crate::modifiers::{resolve_modifiers, BaseKind, RecordShape};
    use recsynth_symbols::{DeclarationModifiers as M, MemberId, TypeId};

    fn class_shape() -> RecordShape {
        RecordShape {
            ty: TypeId(2),
            is_struct: false,
            is_sealed: false,
            is_abstract: false,
            base: BaseKind::Root,
            positional_getters_readonly: false,
            printable_getters_readonly: false,
        }
    }

    fn struct_shape() -> RecordShape {
        RecordShape {
            is_struct: true,
            is_sealed: true,
            ..class_shape()
        }
    }

    fn derived(shape: RecordShape) -> RecordShape {
        RecordShape {
            base: BaseKind::Derived(TypeId(3)),
            ..shape
        }
    }

    fn found() -> BaseMemberReference {
        BaseMemberReference::found(MemberRef::Declared(MemberId(0)))
    }

    #[test]
    fn test_clone_modifiers() {
        let none = BaseMemberReference::none();
        let kind = SynthesizedMemberKind::Clone;
        assert_eq!(resolve_modifiers(&class_shape(), &none, kind), M::PUBLIC | M::VIRTUAL);
        assert_eq!(resolve_modifiers(&class_shape(), &found(), kind), M::PUBLIC | M::OVERRIDE);
        let sealed = RecordShape {
            is_sealed: true,
            ..class_shape()
        };
        assert_eq!(resolve_modifiers(&sealed, &none, kind), M::PUBLIC);
        let abstract_shape = RecordShape {
            is_abstract: true,
            ..class_shape()
        };
        assert_eq!(resolve_modifiers(&abstract_shape, &none, kind), M::PUBLIC | M::ABSTRACT);
        assert_eq!(
            resolve_modifiers(&abstract_shape, &found(), kind),
            M::PUBLIC | M::OVERRIDE | M::ABSTRACT
        );
    }

    #[test]
    fn test_print_members_modifiers() {
        let none = BaseMemberReference::none();
        let kind = SynthesizedMemberKind::PrintMembers;
        assert_eq!(resolve_modifiers(&class_shape(), &none, kind), M::PROTECTED | M::VIRTUAL);
        let sealed = RecordShape {
            is_sealed: true,
            ..class_shape()
        };
        assert_eq!(resolve_modifiers(&sealed, &none, kind), M::PRIVATE);
        assert_eq!(
            resolve_modifiers(&derived(sealed), &none, kind),
            M::PROTECTED | M::OVERRIDE
        );
        assert_eq!(resolve_modifiers(&struct_shape(), &none, kind), M::PRIVATE);
        let readonly = RecordShape {
            printable_getters_readonly: true,
            ..struct_shape()
        };
        assert_eq!(resolve_modifiers(&readonly, &none, kind), M::PRIVATE | M::READONLY);
    }

    #[test]
    fn test_struct_to_string_follows_print_members() {
        let none = BaseMemberReference::none();
        let kind = SynthesizedMemberKind::ToString;
        assert_eq!(resolve_modifiers(&struct_shape(), &none, kind), M::PUBLIC | M::OVERRIDE);
        let readonly = RecordShape {
            printable_getters_readonly: true,
            ..struct_shape()
        };
        assert_eq!(
            resolve_modifiers(&readonly, &none, kind),
            M::PUBLIC | M::OVERRIDE | M::READONLY
        );
        assert_eq!(resolve_modifiers(&class_shape(), &none, kind), M::PUBLIC | M::OVERRIDE);
    }

    #[test]
    fn test_equality_contract_modifiers() {
        let none = BaseMemberReference::none();
        let kind = SynthesizedMemberKind::EqualityContract;
        assert_eq!(resolve_modifiers(&class_shape(), &none, kind), M::PROTECTED | M::VIRTUAL);
        assert_eq!(
            resolve_modifiers(&derived(class_shape()), &none, kind),
            M::PROTECTED | M::OVERRIDE
        );
        let sealed = RecordShape {
            is_sealed: true,
            ..class_shape()
        };
        assert_eq!(resolve_modifiers(&sealed, &none, kind), M::PRIVATE);
    }

    #[test]
    fn test_equality_members() {
        let none = BaseMemberReference::none();
        assert_eq!(
            resolve_modifiers(&class_shape(), &none, SynthesizedMemberKind::EqualsTyped),
            M::PUBLIC | M::VIRTUAL
        );
        assert_eq!(
            resolve_modifiers(&struct_shape(), &none, SynthesizedMemberKind::EqualsTyped),
            M::PUBLIC | M::READONLY
        );
        assert_eq!(
            resolve_modifiers(&struct_shape(), &none, SynthesizedMemberKind::GetHashCode),
            M::PUBLIC | M::OVERRIDE | M::READONLY
        );
        assert_eq!(
            resolve_modifiers(&derived(class_shape()), &none, SynthesizedMemberKind::BaseEquals),
            M::PUBLIC | M::OVERRIDE | M::SEALED
        );
        assert_eq!(
            resolve_modifiers(&class_shape(), &none, SynthesizedMemberKind::EqualityOperator),
            M::PUBLIC | M::STATIC
        );
    }

    #[test]
    fn test_constructors() {
        let none = BaseMemberReference::none();
        let abstract_shape = RecordShape {
            is_abstract: true,
            ..class_shape()
        };
        assert_eq!(
            resolve_modifiers(&abstract_shape, &none, SynthesizedMemberKind::PrimaryConstructor),
            M::PROTECTED
        );
        let sealed = RecordShape {
            is_sealed: true,
            ..class_shape()
        };
        assert_eq!(
            resolve_modifiers(&sealed, &none, SynthesizedMemberKind::CopyConstructor),
            M::PRIVATE
        );
        assert_eq!(
            resolve_modifiers(&class_shape(), &none, SynthesizedMemberKind::CopyConstructor),
            M::PROTECTED
        );
    }
}
