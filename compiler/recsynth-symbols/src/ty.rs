use crate::compilation::Compilation;
use crate::well_known::WellKnownType;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Index handle of a type in a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Types the runtime provides and the language names with keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialType {
    Object,
    Void,
    Boolean,
    Char,
    Int32,
    Int64,
    Double,
    String,
}

impl SpecialType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let special = match keyword {
            "object" => Self::Object,
            "void" => Self::Void,
            "bool" => Self::Boolean,
            "char" => Self::Char,
            "int" => Self::Int32,
            "long" => Self::Int64,
            "double" => Self::Double,
            "string" => Self::String,
            _ => return None,
        };
        Some(special)
    }

    pub fn metadata_name(&self) -> &'static str {
        match self {
            Self::Object => "System.Object",
            Self::Void => "void",
            Self::Boolean => "System.Boolean",
            Self::Char => "System.Char",
            Self::Int32 => "System.Int32",
            Self::Int64 => "System.Int64",
            Self::Double => "System.Double",
            Self::String => "System.String",
        }
    }

    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Char | Self::Int32 | Self::Int64 | Self::Double
        )
    }
}

/// Nullable reference type annotation of a type occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Nullability {
    #[default]
    Oblivious,
    NotAnnotated,
    Annotated,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleElement {
    pub name: Option<String>,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Special(SpecialType),
    Named(TypeId),
    WellKnown(WellKnownType),
    Pointer(Box<TypeRef>),
    FunctionPointer {
        parameters: Vec<TypeRef>,
        return_type: Box<TypeRef>,
    },
    Tuple(Vec<TupleElement>),
}

/// A single occurrence of a type in a signature.
///
/// Structural equality through `PartialEq` is exact. Signature matching in the language ignores the
/// nullability annotation, custom modifiers and tuple element names, which is what
/// [`TypeRef::equals_ignoring_options`] implements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub kind: TypeKind,
    pub nullability: Nullability,
    pub custom_modifiers: u32,
}

impl TypeRef {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            nullability: Nullability::Oblivious,
            custom_modifiers: 0,
        }
    }

    pub fn special(special: SpecialType) -> Self {
        Self::new(TypeKind::Special(special))
    }

    pub fn named(id: TypeId) -> Self {
        Self::new(TypeKind::Named(id))
    }

    pub fn well_known(ty: WellKnownType) -> Self {
        Self::new(TypeKind::WellKnown(ty))
    }

    pub fn void() -> Self {
        Self::special(SpecialType::Void)
    }

    pub fn boolean() -> Self {
        Self::special(SpecialType::Boolean)
    }

    pub fn int32() -> Self {
        Self::special(SpecialType::Int32)
    }

    pub fn object() -> Self {
        Self::special(SpecialType::Object)
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    pub fn annotated(self) -> Self {
        self.with_nullability(Nullability::Annotated)
    }

    pub fn with_custom_modifiers(mut self, count: u32) -> Self {
        self.custom_modifiers = count;
        self
    }

    pub fn equals_ignoring_options(&self, other: &TypeRef) -> bool {
        match (&self.kind, &other.kind) {
            (TypeKind::Special(a), TypeKind::Special(b)) => a == b,
            (TypeKind::Named(a), TypeKind::Named(b)) => a == b,
            (TypeKind::WellKnown(a), TypeKind::WellKnown(b)) => a == b,
            (TypeKind::Pointer(a), TypeKind::Pointer(b)) => a.equals_ignoring_options(b),
            (
                TypeKind::FunctionPointer {
                    parameters: lhs_parameters,
                    return_type: lhs_return,
                },
                TypeKind::FunctionPointer {
                    parameters: rhs_parameters,
                    return_type: rhs_return,
                },
            ) => {
                lhs_parameters.len() == rhs_parameters.len()
                    && lhs_parameters
                        .iter()
                        .zip(rhs_parameters)
                        .all(|(l, r)| l.equals_ignoring_options(r))
                    && lhs_return.equals_ignoring_options(rhs_return)
            }
            (TypeKind::Tuple(lhs), TypeKind::Tuple(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs
                        .iter()
                        .zip(rhs)
                        .all(|(l, r)| l.ty.equals_ignoring_options(&r.ty))
            }
            _ => false,
        }
    }

    pub fn is_named(&self, id: TypeId) -> bool {
        matches!(self.kind, TypeKind::Named(n) if n == id)
    }

    pub fn is_special(&self, special: SpecialType) -> bool {
        matches!(self.kind, TypeKind::Special(s) if s == special)
    }

    pub fn is_well_known(&self, ty: WellKnownType) -> bool {
        matches!(self.kind, TypeKind::WellKnown(w) if w == ty)
    }

    /// Pointer and function pointer types cannot take part in generated equality.
    pub fn is_unsafe(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Pointer(_) | TypeKind::FunctionPointer { .. }
        )
    }

    /// Render the type the way symbol test displays do, e.g. `System.String?`.
    pub fn display(&self, compilation: &Compilation) -> String {
        let mut out = String::new();
        self.write_display(compilation, &mut out);
        out
    }

    fn write_display(&self, compilation: &Compilation, out: &mut String) {
        match &self.kind {
            TypeKind::Special(special) => out.push_str(special.metadata_name()),
            TypeKind::Named(id) => out.push_str(&compilation.ty(*id).name),
            TypeKind::WellKnown(ty) => out.push_str(ty.metadata_name()),
            TypeKind::Pointer(inner) => {
                inner.write_display(compilation, out);
                out.push('*');
            }
            TypeKind::FunctionPointer {
                parameters,
                return_type,
            } => {
                out.push_str("delegate*<");
                for parameter in parameters {
                    parameter.write_display(compilation, out);
                    out.push_str(", ");
                }
                return_type.write_display(compilation, out);
                out.push('>');
            }
            TypeKind::Tuple(elements) => {
                out.push('(');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    element.ty.write_display(compilation, out);
                    if let Some(name) = &element.name {
                        let _ = write!(out, " {}", name);
                    }
                }
                out.push(')');
            }
        }
        if self.nullability == Nullability::Annotated {
            out.push('?');
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ty::{Nullability, SpecialType, TupleElement, TypeId, TypeKind, TypeRef};

    #[test]
    fn test_equality_ignores_nullability_and_modifiers() {
        let lhs = TypeRef::named(TypeId(4)).annotated();
        let rhs = TypeRef::named(TypeId(4)).with_custom_modifiers(2);
        assert!(lhs.equals_ignoring_options(&rhs));
        assert_ne!(lhs, rhs);
        assert!(!lhs.equals_ignoring_options(&TypeRef::named(TypeId(5))));
    }

    #[test]
    fn test_equality_ignores_tuple_names() {
        let element = |name: &str| TupleElement {
            name: Some(name.to_owned()),
            ty: TypeRef::int32(),
        };
        let lhs = TypeRef::new(TypeKind::Tuple(vec![element("a"), element("b")]));
        let rhs = TypeRef::new(TypeKind::Tuple(vec![element("x"), element("y")]));
        assert!(lhs.equals_ignoring_options(&rhs));
    }

    #[test]
    fn test_unsafe_types() {
        let pointer = TypeRef::new(TypeKind::Pointer(Box::new(TypeRef::int32())));
        let function = TypeRef::new(TypeKind::FunctionPointer {
            parameters: vec![TypeRef::int32()],
            return_type: Box::new(TypeRef::void()),
        });
        assert!(pointer.is_unsafe());
        assert!(function.is_unsafe());
        assert!(!TypeRef::special(SpecialType::String)
            .with_nullability(Nullability::Annotated)
            .is_unsafe());
    }
}
