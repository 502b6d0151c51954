use crate::member::Accessibility;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Declaration modifiers of a member, accessibility included.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DeclarationModifiers: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const INTERNAL = 1 << 3;
        const STATIC = 1 << 4;
        const VIRTUAL = 1 << 5;
        const OVERRIDE = 1 << 6;
        const SEALED = 1 << 7;
        const ABSTRACT = 1 << 8;
        const READONLY = 1 << 9;

        const ACCESSIBILITY_MASK = Self::PUBLIC.bits()
            | Self::PROTECTED.bits()
            | Self::PRIVATE.bits()
            | Self::INTERNAL.bits();
    }
}

impl DeclarationModifiers {
    pub fn from_accessibility(accessibility: Accessibility) -> Self {
        match accessibility {
            Accessibility::Private => Self::PRIVATE,
            Accessibility::ProtectedAndInternal => Self::PRIVATE | Self::PROTECTED,
            Accessibility::Protected => Self::PROTECTED,
            Accessibility::Internal => Self::INTERNAL,
            Accessibility::ProtectedOrInternal => Self::PROTECTED | Self::INTERNAL,
            Accessibility::Public => Self::PUBLIC,
        }
    }

    /// Decode the accessibility bits. Members without any accessibility modifier are private.
    pub fn accessibility(self) -> Accessibility {
        let access = self & Self::ACCESSIBILITY_MASK;
        if access.contains(Self::PUBLIC) {
            Accessibility::Public
        } else if access.contains(Self::PROTECTED | Self::INTERNAL) {
            Accessibility::ProtectedOrInternal
        } else if access.contains(Self::PRIVATE | Self::PROTECTED) {
            Accessibility::ProtectedAndInternal
        } else if access.contains(Self::PROTECTED) {
            Accessibility::Protected
        } else if access.contains(Self::INTERNAL) {
            Accessibility::Internal
        } else {
            Accessibility::Private
        }
    }

    pub fn with_accessibility(self, accessibility: Accessibility) -> Self {
        (self - Self::ACCESSIBILITY_MASK) | Self::from_accessibility(accessibility)
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_virtual(self) -> bool {
        self.contains(Self::VIRTUAL)
    }

    pub fn is_override(self) -> bool {
        self.contains(Self::OVERRIDE)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn is_sealed(self) -> bool {
        self.contains(Self::SEALED)
    }

    /// Whether a derived type may override a member with these modifiers.
    pub fn is_overridable(self) -> bool {
        (self.is_virtual() || self.is_abstract() || self.is_override()) && !self.is_sealed()
    }

    /// Keywords in source order, e.g. `protected virtual`.
    pub fn keywords(self) -> String {
        let mut words = Vec::new();
        let access = match self.accessibility() {
            Accessibility::Private if !self.intersects(Self::ACCESSIBILITY_MASK) => None,
            accessibility => Some(accessibility.keyword()),
        };
        words.extend(access);
        for (flag, word) in [
            (Self::STATIC, "static"),
            (Self::ABSTRACT, "abstract"),
            (Self::VIRTUAL, "virtual"),
            (Self::OVERRIDE, "override"),
            (Self::SEALED, "sealed"),
            (Self::READONLY, "readonly"),
        ] {
            if self.contains(flag) {
                words.push(word);
            }
        }
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use crate::member::Accessibility;
    use crate::modifiers::DeclarationModifiers;

    #[test]
    fn test_accessibility_round_trips_through_bits() {
        for accessibility in [
            Accessibility::Private,
            Accessibility::ProtectedAndInternal,
            Accessibility::Protected,
            Accessibility::Internal,
            Accessibility::ProtectedOrInternal,
            Accessibility::Public,
        ] {
            let modifiers = DeclarationModifiers::from_accessibility(accessibility);
            assert_eq!(modifiers.accessibility(), accessibility);
        }
    }

    #[test]
    fn test_keywords() {
        let modifiers = DeclarationModifiers::PUBLIC
            | DeclarationModifiers::OVERRIDE
            | DeclarationModifiers::SEALED;
        assert_eq!(modifiers.keywords(), "public override sealed");
        let modifiers = DeclarationModifiers::PUBLIC.with_accessibility(Accessibility::Protected)
            | DeclarationModifiers::VIRTUAL;
        assert_eq!(modifiers.keywords(), "protected virtual");
    }

    #[test]
    fn test_sealed_override_is_not_overridable() {
        let modifiers = DeclarationModifiers::OVERRIDE | DeclarationModifiers::SEALED;
        assert!(!modifiers.is_overridable());
        assert!(DeclarationModifiers::ABSTRACT.is_overridable());
    }
}
