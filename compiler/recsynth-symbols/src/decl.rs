//! Declaration file format.
//!
//! A compilation is described by a RON document listing the types of the compilation and, for each
//! of them, the members the binder saw. Type names are written the way they appear in source and
//! are resolved by the [`crate::builder::CompilationBuilder`].
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     types: [
//!         (name: "Point", kind: RecordClass, parameters: [(name: "X", type: "int")]),
//!     ],
//! )
//! ```

use crate::compilation::{LanguageFeatures, Origin, TypeDeclKind};
use crate::error::{InvalidDeclarationError, SymbolError};
use crate::member::{Accessibility, RefKind};
use crate::modifiers::DeclarationModifiers;
use crate::well_known::{WellKnownMember, WellKnownType};
use recsynth_span::Span;
use serde::Deserialize;

fn default_assembly() -> String {
    "main".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompilationDecl {
    #[serde(default = "default_assembly")]
    pub assembly: String,
    #[serde(default)]
    pub features: LanguageFeatures,
    #[serde(default)]
    pub missing: MissingDecl,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl CompilationDecl {
    pub fn from_ron(source: &str) -> Result<Self, SymbolError> {
        ron::from_str(source).map_err(|err| {
            let offset = line_col_to_offset(source, err.position.line, err.position.col);
            SymbolError::from(InvalidDeclarationError {
                message: err.code.to_string(),
                span: Span::pos(offset as u32),
            })
        })
    }
}

fn line_col_to_offset(source: &str, line: usize, col: usize) -> usize {
    let line_start = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum::<usize>();
    (line_start + col.saturating_sub(1)).min(source.len())
}

/// Predefined types and members the compilation does not provide.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissingDecl {
    #[serde(default)]
    pub types: Vec<WellKnownType>,
    #[serde(default)]
    pub members: Vec<WellKnownMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
    #[serde(default)]
    pub origin: Origin,
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(default = "public")]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub sealed: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub base: Option<String>,
    /// Primary constructor parameters; `Some` even when empty for `record R()`.
    #[serde(default)]
    pub parameters: Option<Vec<ParameterDecl>>,
    #[serde(default)]
    pub base_arguments: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

fn public() -> Accessibility {
    Accessibility::Public
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub ref_kind: RefKind,
    #[serde(default)]
    pub custom_modifiers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierDecl {
    Static,
    Virtual,
    Override,
    Sealed,
    Abstract,
    Readonly,
}

impl ModifierDecl {
    pub fn flag(self) -> DeclarationModifiers {
        match self {
            Self::Static => DeclarationModifiers::STATIC,
            Self::Virtual => DeclarationModifiers::VIRTUAL,
            Self::Override => DeclarationModifiers::OVERRIDE,
            Self::Sealed => DeclarationModifiers::SEALED,
            Self::Abstract => DeclarationModifiers::ABSTRACT,
            Self::Readonly => DeclarationModifiers::READONLY,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AccessorDecl {
    #[serde(default)]
    pub accessibility: Option<Accessibility>,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub init: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BodyDecl {
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub locals: Vec<String>,
}

/// Attributes every member declaration shares.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberHeader<'a> {
    pub accessibility: Accessibility,
    pub modifiers: &'a [ModifierDecl],
    pub body: Option<&'a BodyDecl>,
}

impl MemberHeader<'_> {
    pub fn modifiers(&self) -> DeclarationModifiers {
        self.modifiers
            .iter()
            .fold(DeclarationModifiers::from_accessibility(self.accessibility), |acc, m| {
                acc | m.flag()
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub enum MemberDecl {
    Field {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        accessibility: Accessibility,
        #[serde(default)]
        modifiers: Vec<ModifierDecl>,
        #[serde(default)]
        required: bool,
    },
    Property {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        accessibility: Accessibility,
        #[serde(default)]
        modifiers: Vec<ModifierDecl>,
        #[serde(default)]
        get: Option<AccessorDecl>,
        #[serde(default)]
        set: Option<AccessorDecl>,
        #[serde(default)]
        parameters: Vec<ParameterDecl>,
        #[serde(default)]
        auto: bool,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        body: Option<BodyDecl>,
    },
    Method {
        name: String,
        returns: String,
        #[serde(default)]
        accessibility: Accessibility,
        #[serde(default)]
        modifiers: Vec<ModifierDecl>,
        #[serde(default)]
        parameters: Vec<ParameterDecl>,
        #[serde(default)]
        arity: u32,
        #[serde(default)]
        body: Option<BodyDecl>,
    },
    Constructor {
        #[serde(default)]
        accessibility: Accessibility,
        #[serde(default)]
        modifiers: Vec<ModifierDecl>,
        #[serde(default)]
        parameters: Vec<ParameterDecl>,
        #[serde(default)]
        body: Option<BodyDecl>,
    },
    Operator {
        name: String,
        returns: String,
        #[serde(default)]
        accessibility: Accessibility,
        #[serde(default)]
        modifiers: Vec<ModifierDecl>,
        #[serde(default)]
        parameters: Vec<ParameterDecl>,
    },
}

impl MemberDecl {
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. }
            | Self::Property { name, .. }
            | Self::Method { name, .. }
            | Self::Operator { name, .. } => name,
            Self::Constructor { .. } => ".ctor",
        }
    }

    pub fn header(&self) -> MemberHeader<'_> {
        match self {
            Self::Field {
                accessibility,
                modifiers,
                ..
            }
            | Self::Operator {
                accessibility,
                modifiers,
                ..
            } => MemberHeader {
                accessibility: *accessibility,
                modifiers,
                body: None,
            },
            Self::Property {
                accessibility,
                modifiers,
                body,
                ..
            }
            | Self::Method {
                accessibility,
                modifiers,
                body,
                ..
            }
            | Self::Constructor {
                accessibility,
                modifiers,
                body,
                ..
            } => MemberHeader {
                accessibility: *accessibility,
                modifiers,
                body: body.as_ref(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compilation::TypeDeclKind;
    use crate::decl::{CompilationDecl, MemberDecl, ModifierDecl};
    use crate::error::SymbolError;
    use crate::member::Accessibility;
    use recsynth_macros::{assert_err, assert_matches, assert_ok};

    #[test]
    fn test_parse_positional_record() {
        let source = r#"
            #![enable(implicit_some)]
            (
                types: [
                    (
                        name: "Point",
                        kind: RecordClass,
                        parameters: [(name: "X", type: "int"), (name: "Y", type: "int")],
                        members: [
                            Method(
                                name: "Describe",
                                returns: "string",
                                accessibility: Public,
                                modifiers: [virtual],
                            ),
                        ],
                    ),
                ],
            )
        "#;
        let decl = assert_ok!(CompilationDecl::from_ron(source));
        assert_eq!(decl.assembly, "main");
        assert_eq!(decl.types.len(), 1);
        let point = &decl.types[0];
        assert_eq!(point.kind, TypeDeclKind::RecordClass);
        assert_eq!(point.parameters.as_ref().map(Vec::len), Some(2));
        let header = point.members[0].header();
        assert_matches!(&point.members[0], MemberDecl::Method { .. } => ());
        assert_eq!(header.accessibility, Accessibility::Public);
        assert_eq!(header.modifiers, &[ModifierDecl::Virtual]);
    }

    #[test]
    fn test_malformed_declaration_reports_position() {
        let err = assert_err!(CompilationDecl::from_ron("(types: [ (name: ) ])"));
        let err = assert_matches!(err, SymbolError::InvalidDeclaration(err) => err);
        assert!(!err.message.is_empty());
    }
}
