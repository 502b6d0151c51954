//! Resolution of a [`CompilationDecl`] into a [`Compilation`].
//!
//! Besides name resolution, the builder validates the type hierarchy. The synthesis engine relies
//! on every base chain being acyclic and ending in `System.Object`, so cycles and unknown types
//! are rejected here instead of being reported later.

use crate::compilation::{Compilation, Origin, PrimaryConstructor, TypeDeclKind, TypeSymbol};
use crate::decl::{AccessorDecl, CompilationDecl, MemberDecl, ParameterDecl, TypeDecl};
use crate::error::{
    CyclicBaseError, DuplicateTypeError, InvalidBaseError, SymbolError, SymbolResult,
    UnknownParameterError, UnknownTypeError,
};
use crate::member::{
    Accessibility, Accessor, BodySummary, MemberId, MemberKind, MemberSymbol, ParameterSymbol,
};
use crate::modifiers::DeclarationModifiers;
use crate::ty::{Nullability, SpecialType, TupleElement, TypeId, TypeKind, TypeRef};
use crate::type_name::{parse_type_name, TypeName};
use crate::well_known::{WellKnownMembers, WellKnownType};
use recsynth_span::Span;
use rustc_hash::FxHashMap;

const RUNTIME_ASSEMBLY: &str = "System.Runtime";

pub struct CompilationBuilder<'s> {
    decl: CompilationDecl,
    locator: SpanLocator<'s>,
    types: Vec<TypeSymbol>,
    members: Vec<MemberSymbol>,
    names: FxHashMap<String, TypeId>,
}

impl<'s> CompilationBuilder<'s> {
    pub fn new(decl: CompilationDecl) -> Self {
        Self {
            decl,
            locator: SpanLocator { source: None },
            types: Vec::new(),
            members: Vec::new(),
            names: FxHashMap::default(),
        }
    }

    /// Attach the declaration source so diagnostics can point into it.
    pub fn with_source(mut self, source: &'s str) -> Self {
        self.locator = SpanLocator {
            source: Some(source),
        };
        self
    }

    pub fn build(mut self) -> SymbolResult<Compilation> {
        let object = self.declare_object();
        let value_type = self.declare_value_type(object);

        let decls = std::mem::take(&mut self.decl.types);
        let mut declared = Vec::with_capacity(decls.len());
        let mut cursor = 0;
        for decl in &decls {
            let span = self.locator.find(&decl.name, cursor);
            if !span.is_empty() {
                cursor = span.high as usize;
            }
            let id = self.declare_type(decl, span)?;
            declared.push((id, decl));
        }
        for (id, decl) in &declared {
            self.resolve_base(*id, decl, object, value_type)?;
        }
        for (id, _) in &declared {
            self.check_acyclic(*id)?;
        }
        for (id, decl) in &declared {
            self.resolve_members(*id, decl)?;
            tracing::trace!(
                ty = %decl.name,
                members = decl.members.len(),
                "resolved type"
            );
        }

        let well_known = WellKnownMembers::new(
            self.decl.missing.types.iter().copied(),
            self.decl.missing.members.iter().copied(),
        );
        tracing::debug!(
            types = self.types.len(),
            members = self.members.len(),
            "built compilation"
        );
        Ok(Compilation::new(
            self.decl.assembly,
            self.decl.features,
            well_known,
            self.types,
            self.members,
            object,
            value_type,
        ))
    }

    fn next_type_id(&self) -> TypeId {
        TypeId(self.types.len() as u32)
    }

    fn push_member(
        &mut self,
        owner: TypeId,
        name: &str,
        modifiers: DeclarationModifiers,
        kind: MemberKind,
        body: Option<BodySummary>,
        span: Span,
    ) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        self.members.push(MemberSymbol {
            id,
            name: name.to_owned(),
            containing_type: owner,
            modifiers,
            kind,
            body,
            span,
        });
        self.types[owner.index()].members.push(id);
        id
    }

    fn declare_object(&mut self) -> TypeId {
        let id = self.next_type_id();
        self.types.push(TypeSymbol::new(
            id,
            "System.Object".to_owned(),
            TypeDeclKind::Class,
            Origin::Metadata,
            RUNTIME_ASSEMBLY.to_owned(),
            Accessibility::Public,
            None,
            Span::empty(),
        ));
        self.names.insert("System.Object".to_owned(), id);
        self.declare_object_methods(id, DeclarationModifiers::VIRTUAL);
        self.push_member(
            id,
            ".ctor",
            DeclarationModifiers::PUBLIC,
            MemberKind::Constructor { parameters: vec![] },
            None,
            Span::empty(),
        );
        id
    }

    fn declare_value_type(&mut self, object: TypeId) -> TypeId {
        let id = self.next_type_id();
        let mut symbol = TypeSymbol::new(
            id,
            "System.ValueType".to_owned(),
            TypeDeclKind::Class,
            Origin::Metadata,
            RUNTIME_ASSEMBLY.to_owned(),
            Accessibility::Public,
            Some(object),
            Span::empty(),
        );
        symbol.is_abstract = true;
        self.types.push(symbol);
        self.names.insert("System.ValueType".to_owned(), id);
        self.declare_object_methods(id, DeclarationModifiers::OVERRIDE);
        self.push_member(
            id,
            ".ctor",
            DeclarationModifiers::PROTECTED,
            MemberKind::Constructor { parameters: vec![] },
            None,
            Span::empty(),
        );
        id
    }

    /// `Equals(object?)`, `GetHashCode()` and `ToString()` with the given dispatch modifier.
    fn declare_object_methods(&mut self, owner: TypeId, dispatch: DeclarationModifiers) {
        let modifiers = DeclarationModifiers::PUBLIC | dispatch;
        let object = TypeRef::object().annotated();
        let methods = [
            (
                "Equals",
                TypeRef::boolean(),
                vec![ParameterSymbol::new("obj", object)],
            ),
            ("GetHashCode", TypeRef::int32(), vec![]),
            (
                "ToString",
                TypeRef::special(SpecialType::String).annotated(),
                vec![],
            ),
        ];
        for (name, return_type, parameters) in methods {
            self.push_member(
                owner,
                name,
                modifiers,
                MemberKind::Method {
                    return_type,
                    parameters,
                    arity: 0,
                },
                None,
                Span::empty(),
            );
        }
    }

    fn declare_type(&mut self, decl: &TypeDecl, span: Span) -> SymbolResult<TypeId> {
        if let Some(previous) = self.names.get(&decl.name) {
            return Err(DuplicateTypeError {
                name: decl.name.clone(),
                span,
                previous: self.types[previous.index()].span,
            }
            .into());
        }
        let id = self.next_type_id();
        let assembly = decl
            .assembly
            .clone()
            .unwrap_or_else(|| self.decl.assembly.clone());
        let mut symbol = TypeSymbol::new(
            id,
            decl.name.clone(),
            decl.kind,
            decl.origin,
            assembly,
            decl.accessibility,
            None,
            span,
        );
        symbol.is_sealed = decl.sealed;
        symbol.is_abstract = decl.is_abstract;
        symbol.is_readonly = decl.readonly;
        self.types.push(symbol);
        self.names.insert(decl.name.clone(), id);
        Ok(id)
    }

    fn resolve_base(
        &mut self,
        id: TypeId,
        decl: &TypeDecl,
        object: TypeId,
        value_type: TypeId,
    ) -> SymbolResult<()> {
        let span = self.types[id.index()].span;
        let base = match (&decl.base, decl.kind.is_struct()) {
            (None, true) => value_type,
            (None, false) => object,
            (Some(base), true) => {
                return Err(InvalidBaseError {
                    name: decl.name.clone(),
                    base: base.clone(),
                    reason: "structs cannot declare a base type".to_owned(),
                    span,
                }
                .into())
            }
            (Some(base), false) => {
                let base_id = self.names.get(base).copied().ok_or_else(|| UnknownTypeError {
                    name: base.clone(),
                    span,
                })?;
                let base_symbol = &self.types[base_id.index()];
                let reason = if base_symbol.is_struct() {
                    Some("the base type is a struct")
                } else if base_symbol.is_sealed {
                    Some("the base type is sealed")
                } else if base_id == value_type {
                    Some("System.ValueType is reserved for structs")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(InvalidBaseError {
                        name: decl.name.clone(),
                        base: base.clone(),
                        reason: reason.to_owned(),
                        span,
                    }
                    .into());
                }
                base_id
            }
        };
        self.types[id.index()].base = Some(base);
        Ok(())
    }

    fn check_acyclic(&self, id: TypeId) -> SymbolResult<()> {
        let mut current = self.types[id.index()].base;
        let mut steps = 0;
        while let Some(ty) = current {
            if ty == id || steps > self.types.len() {
                let symbol = &self.types[id.index()];
                tracing::debug!(ty = %symbol.name, "rejected cyclic base chain");
                return Err(CyclicBaseError {
                    name: symbol.name.clone(),
                    span: symbol.span,
                }
                .into());
            }
            steps += 1;
            current = self.types[ty.index()].base;
        }
        Ok(())
    }

    fn resolve_members(&mut self, id: TypeId, decl: &TypeDecl) -> SymbolResult<()> {
        let type_span = self.types[id.index()].span;
        let is_struct = decl.kind.is_struct();
        let mut cursor = type_span.low as usize;
        for member in &decl.members {
            let span = match member {
                MemberDecl::Constructor { .. } => self.locator.find_word("Constructor", cursor),
                _ => self.locator.find(member.name(), cursor),
            };
            if !span.is_empty() {
                cursor = span.high as usize;
            }
            let header = member.header();
            let modifiers = header.modifiers();
            let body = header.body.map(|body| BodySummary {
                references: body.references.clone(),
                locals: body.locals.clone(),
            });
            let kind = match member {
                MemberDecl::Field { ty, required, .. } => MemberKind::Field {
                    ty: self.resolve_type(ty, span)?,
                    is_readonly: modifiers.contains(DeclarationModifiers::READONLY),
                    is_required: *required,
                },
                MemberDecl::Property {
                    ty,
                    get,
                    set,
                    parameters,
                    auto,
                    required,
                    ..
                } => {
                    let accessor = |accessor: &AccessorDecl, readonly_by_default: bool| Accessor {
                        accessibility: accessor.accessibility.unwrap_or(modifiers.accessibility()),
                        is_readonly: accessor.readonly || readonly_by_default,
                        is_init_only: accessor.init,
                    };
                    let readonly_struct = is_struct && decl.readonly;
                    MemberKind::Property {
                        ty: self.resolve_type(ty, span)?,
                        getter: get
                            .as_ref()
                            .map(|g| accessor(g, readonly_struct || (is_struct && *auto))),
                        setter: set.as_ref().map(|s| accessor(s, readonly_struct)),
                        parameters: self.resolve_parameters(parameters, span)?,
                        is_auto: *auto,
                        is_required: *required,
                    }
                }
                MemberDecl::Method {
                    returns,
                    parameters,
                    arity,
                    ..
                } => MemberKind::Method {
                    return_type: self.resolve_type(returns, span)?,
                    parameters: self.resolve_parameters(parameters, span)?,
                    arity: *arity,
                },
                MemberDecl::Constructor { parameters, .. } => MemberKind::Constructor {
                    parameters: self.resolve_parameters(parameters, span)?,
                },
                MemberDecl::Operator {
                    returns,
                    parameters,
                    ..
                } => MemberKind::Operator {
                    return_type: self.resolve_type(returns, span)?,
                    parameters: self.resolve_parameters(parameters, span)?,
                },
            };
            self.push_member(id, member.name(), modifiers, kind, body, span);
        }

        if let Some(parameters) = &decl.parameters {
            let parameters = self.resolve_parameters(parameters, type_span)?;
            let base_arguments = decl
                .base_arguments
                .iter()
                .map(|argument| {
                    parameters
                        .iter()
                        .position(|p| &p.name == argument)
                        .map(|ordinal| ordinal as u32)
                        .ok_or_else(|| {
                            SymbolError::from(UnknownParameterError {
                                name: argument.clone(),
                                type_name: decl.name.clone(),
                                span: type_span,
                            })
                        })
                })
                .collect::<SymbolResult<Vec<_>>>()?;
            self.types[id.index()].primary_constructor = Some(PrimaryConstructor {
                parameters,
                base_arguments,
                span: type_span,
            });
        }

        // Source classes without constructors get the implicit parameterless one. A copy
        // constructor does not count.
        let symbol = &self.types[id.index()];
        let declares_constructor = symbol.members.iter().any(|m| {
            let member = &self.members[m.index()];
            match &member.kind {
                MemberKind::Constructor { parameters } => {
                    !member.is_static()
                        && !matches!(parameters.as_slice(), [p] if p.ty.is_named(id))
                }
                _ => false,
            }
        });
        if decl.origin == Origin::Source
            && !is_struct
            && decl.parameters.is_none()
            && !declares_constructor
        {
            let accessibility = if decl.is_abstract {
                Accessibility::Protected
            } else {
                Accessibility::Public
            };
            self.push_member(
                id,
                ".ctor",
                DeclarationModifiers::from_accessibility(accessibility),
                MemberKind::Constructor {
                    parameters: Vec::new(),
                },
                None,
                type_span,
            );
        }

        let symbol = &self.types[id.index()];
        let has_clone_member = symbol
            .members
            .iter()
            .any(|m| self.members[m.index()].name == "<Clone>$");
        let is_source_record = symbol.origin == Origin::Source && symbol.is_record_class();
        self.types[id.index()].has_possible_well_known_clone_method =
            is_source_record || has_clone_member;
        Ok(())
    }

    fn resolve_parameters(
        &self,
        parameters: &[ParameterDecl],
        span: Span,
    ) -> SymbolResult<Vec<ParameterSymbol>> {
        parameters
            .iter()
            .map(|p| {
                Ok(ParameterSymbol {
                    name: p.name.clone(),
                    ty: self
                        .resolve_type(&p.ty, span)?
                        .with_custom_modifiers(p.custom_modifiers),
                    ref_kind: p.ref_kind,
                })
            })
            .collect()
    }

    fn resolve_type(&self, text: &str, span: Span) -> SymbolResult<TypeRef> {
        let name = parse_type_name(text).map_err(|mut err| {
            err.span = span;
            SymbolError::from(err)
        })?;
        self.resolve_type_name(&name, span)
    }

    fn resolve_type_name(&self, name: &TypeName, span: Span) -> SymbolResult<TypeRef> {
        let ty = match name {
            TypeName::Nullable(inner) => {
                return Ok(self.resolve_type_name(inner, span)?.annotated());
            }
            TypeName::Named(name) => {
                if let Some(special) = SpecialType::from_keyword(name) {
                    TypeRef::special(special)
                } else if let Some(well_known) = WellKnownType::from_name(name) {
                    TypeRef::well_known(well_known)
                } else if name == "System.Object" {
                    TypeRef::object()
                } else {
                    let id = self.names.get(name).ok_or_else(|| UnknownTypeError {
                        name: name.clone(),
                        span,
                    })?;
                    TypeRef::named(*id)
                }
            }
            TypeName::Pointer(inner) => {
                TypeRef::new(TypeKind::Pointer(Box::new(self.resolve_type_name(inner, span)?)))
            }
            TypeName::FunctionPointer(parts) => {
                let mut parts = parts
                    .iter()
                    .map(|p| self.resolve_type_name(p, span))
                    .collect::<SymbolResult<Vec<_>>>()?;
                let return_type = parts.pop().unwrap_or_else(TypeRef::void);
                TypeRef::new(TypeKind::FunctionPointer {
                    parameters: parts,
                    return_type: Box::new(return_type),
                })
            }
            TypeName::Tuple(elements) => TypeRef::new(TypeKind::Tuple(
                elements
                    .iter()
                    .map(|(ty, name)| {
                        Ok(TupleElement {
                            name: name.clone(),
                            ty: self.resolve_type_name(ty, span)?,
                        })
                    })
                    .collect::<SymbolResult<Vec<_>>>()?,
            )),
        };
        Ok(ty.with_nullability(Nullability::NotAnnotated))
    }
}

/// Finds the quoted occurrence of a name in the declaration source.
struct SpanLocator<'s> {
    source: Option<&'s str>,
}

impl SpanLocator<'_> {
    fn find(&self, name: &str, from: usize) -> Span {
        self.find_word(&format!("\"{}\"", name), from)
    }

    fn find_word(&self, needle: &str, from: usize) -> Span {
        let Some(source) = self.source else {
            return Span::empty();
        };
        let Some(haystack) = source.get(from..) else {
            return Span::empty();
        };
        match haystack.find(needle) {
            Some(offset) => {
                let low = (from + offset) as u32;
                Span::new(low..low + needle.len() as u32)
            }
            None => Span::empty(),
        }
    }
}
