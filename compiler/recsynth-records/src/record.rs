//! Synthesis of every member of one record type.
//!
//! Runs in two passes over a per-record arena. The first pass creates descriptors in metadata
//! order, resolving modifiers and override targets against the base type. The second pass
//! generates a body for each descriptor. By then every sibling is reachable through the kind
//! index, so no body depends on the order bodies are generated in.

use crate::arena::{MemberHandle, SynthesizedMembers};
use crate::consistency::{check_explicit_members, verify_overrides_object_method};
use crate::env::{MemberRef, SymbolEnvironment};
use crate::error::{
    BadFieldTypeInRecordError, DiagnosticBag, DoesNotOverrideBaseEqualityContractError,
    DoesNotOverrideBaseMethodError, InheritingFromRecordWithSealedToStringError, SynthesisError,
};
use crate::explicit::ExplicitMembers;
use crate::locator::{
    find_base_equals_override_target, find_equality_contract_override_target,
    find_object_method_override_target, find_print_members_override_target,
    find_valid_clone_method, BaseMemberReference, CLONE_METHOD_NAME,
};
use crate::member::{
    LexicalSortKey, MemberDescriptor, ObjectMethod, OverridesObjectMethod, PropertyShape,
    Signature, SynthesizedAttribute, SynthesizedMember, SynthesizedMemberKind,
};
use crate::modifiers::{resolve_modifiers, RecordShape};
use crate::positional::{bind_positional_members, PositionalBinding, PositionalMember};
use crate::synth::{generate_method_body, printable_members, RecordContext};
use recsynth_diagnostics::ice;
use recsynth_span::Span;
use recsynth_symbols::{
    Accessibility, Accessor, CancellationToken, Compilation, FieldRef, MemberKind,
    ParameterSymbol, TypeId, TypeRef, WellKnownMember, WellKnownType,
};
use rustc_hash::FxHashMap;

/// The synthesized members of one record with their bodies and diagnostics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordSynthesis {
    pub ty: TypeId,
    pub positional: Vec<PositionalMember>,
    /// In metadata order. A member's index is its sort key.
    pub members: Vec<SynthesizedMember>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: FxHashMap<SynthesizedMemberKind, u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub diagnostics: DiagnosticBag,
}

impl RecordSynthesis {
    pub fn get(&self, kind: SynthesizedMemberKind) -> Option<&SynthesizedMember> {
        self.index
            .get(&kind)
            .map(|index| &self.members[*index as usize])
    }

    pub fn handle(&self, kind: SynthesizedMemberKind) -> Option<MemberHandle> {
        self.index.get(&kind).map(|index| MemberHandle {
            owner: self.ty,
            index: *index,
        })
    }

    pub fn member(&self, handle: MemberHandle) -> &SynthesizedMember {
        if handle.owner != self.ty {
            ice!("member handle used with the synthesis of another record");
        }
        self.members
            .get(handle.index as usize)
            .unwrap_or_else(|| ice!("member handle out of range"))
    }

    pub fn is_poisoned(&self) -> bool {
        self.members.iter().any(SynthesizedMember::is_poisoned)
    }
}

/// Creates the descriptors of one record in metadata order.
struct DescriptorPass<'a, 'e> {
    env: &'e SymbolEnvironment<'a>,
    shape: &'e RecordShape,
    explicit: &'e ExplicitMembers,
    positional: &'e [PositionalMember],
    members: SynthesizedMembers,
    diagnostics: &'e mut DiagnosticBag,
    cancel: &'e CancellationToken,
}

impl<'a, 'e> DescriptorPass<'a, 'e> {
    fn compilation(&self) -> &'a Compilation {
        self.env.compilation
    }

    fn type_ref(&self) -> TypeRef {
        self.compilation().type_ref(self.shape.ty)
    }

    /// `T?` for record classes, `T` for record structs.
    fn nullable_self(&self) -> TypeRef {
        if self.shape.is_struct {
            self.type_ref()
        } else {
            self.type_ref().annotated()
        }
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.compilation().ty(ty).name.clone()
    }

    fn span(&self) -> Span {
        self.compilation().ty(self.shape.ty).span
    }

    fn attributes(&self, kind: SynthesizedMemberKind) -> Vec<SynthesizedAttribute> {
        let well_known = &self.compilation().well_known;
        let mut attributes = Vec::new();
        if kind != SynthesizedMemberKind::PrimaryConstructor
            && well_known.is_available(WellKnownMember::CompilerGeneratedAttributeCtor)
        {
            attributes.push(SynthesizedAttribute::CompilerGenerated);
        }
        if kind == SynthesizedMemberKind::CopyConstructor
            && self.compilation().has_required_members(self.shape.ty)
            && well_known.is_available(WellKnownMember::SetsRequiredMembersAttributeCtor)
        {
            attributes.push(SynthesizedAttribute::SetsRequiredMembers);
        }
        attributes
    }

    fn push(
        &mut self,
        kind: SynthesizedMemberKind,
        name: impl Into<String>,
        base: BaseMemberReference,
        signature: Signature,
        property: Option<PropertyShape>,
        span: Span,
    ) -> MemberHandle {
        let modifiers = resolve_modifiers(self.shape, &base, kind);
        let descriptor = MemberDescriptor {
            kind,
            name: name.into(),
            containing_type: self.shape.ty,
            modifiers,
            signature,
            property,
            attributes: self.attributes(kind),
            overridden: if modifiers.is_override() {
                base.found
            } else {
                None
            },
            has_body: !modifiers.is_abstract(),
            sort_key: LexicalSortKey(0),
            span,
        };
        tracing::trace!(
            member = %descriptor.name,
            modifiers = %modifiers.keywords(),
            "created descriptor"
        );
        self.members.push(descriptor)
    }

    fn method(return_type: TypeRef, parameters: Vec<ParameterSymbol>) -> Signature {
        Signature {
            return_type,
            parameters,
        }
    }

    fn run(mut self) -> Result<SynthesizedMembers, SynthesisError> {
        let compilation = self.compilation();
        let symbol = compilation.ty(self.shape.ty);

        if let Some(ctor) = &symbol.primary_constructor {
            self.push(
                SynthesizedMemberKind::PrimaryConstructor,
                ".ctor",
                BaseMemberReference::none(),
                Self::method(TypeRef::void(), ctor.parameters.clone()),
                None,
                ctor.span,
            );
            self.positional_properties(ctor.span);
            if !ctor.parameters.is_empty() && self.explicit.deconstruct.is_none() {
                let parameters = ctor
                    .parameters
                    .iter()
                    .map(|p| ParameterSymbol::out(p.name.clone(), p.ty.clone()))
                    .collect();
                self.push(
                    SynthesizedMemberKind::Deconstruct,
                    "Deconstruct",
                    BaseMemberReference::none(),
                    Self::method(TypeRef::void(), parameters),
                    None,
                    ctor.span,
                );
            }
        }

        if !self.shape.is_struct {
            if self.explicit.copy_constructor.is_none() {
                self.push(
                    SynthesizedMemberKind::CopyConstructor,
                    ".ctor",
                    BaseMemberReference::none(),
                    Self::method(
                        TypeRef::void(),
                        vec![ParameterSymbol::new("original", self.type_ref())],
                    ),
                    None,
                    self.span(),
                );
            }
            self.clone_method()?;
            if self.explicit.equality_contract.is_none() {
                self.equality_contract();
            }
        }

        if self.explicit.equals_typed.is_none() {
            self.report_unsafe_fields();
            self.push(
                SynthesizedMemberKind::EqualsTyped,
                "Equals",
                BaseMemberReference::none(),
                Self::method(
                    TypeRef::boolean(),
                    vec![ParameterSymbol::new("other", self.nullable_self())],
                ),
                None,
                self.span(),
            );
        }
        if !self.shape.is_struct && self.shape.is_derived() {
            self.base_equals();
        }
        self.object_override(ObjectMethod::Equals);
        if self.explicit.get_hash_code.is_none() {
            self.object_override(ObjectMethod::GetHashCode);
        }
        for (kind, name) in [
            (SynthesizedMemberKind::InequalityOperator, "op_Inequality"),
            (SynthesizedMemberKind::EqualityOperator, "op_Equality"),
        ] {
            self.push(
                kind,
                name,
                BaseMemberReference::none(),
                Self::method(
                    TypeRef::boolean(),
                    vec![
                        ParameterSymbol::new("left", self.nullable_self()),
                        ParameterSymbol::new("right", self.nullable_self()),
                    ],
                ),
                None,
                self.span(),
            );
        }
        if self.explicit.print_members.is_none() {
            self.print_members();
        }
        if self.explicit.to_string.is_none() {
            self.to_string_method();
        }
        Ok(self.members)
    }

    fn positional_properties(&mut self, span: Span) {
        let is_struct = self.shape.is_struct;
        let init_only = !is_struct || self.compilation().ty(self.shape.ty).is_readonly;
        for member in self.positional {
            let PositionalBinding::Synthesized { overrides } = member.binding else {
                continue;
            };
            let base = overrides.map_or_else(BaseMemberReference::none, BaseMemberReference::found);
            let property = PropertyShape {
                getter: Some(Accessor {
                    accessibility: Accessibility::Public,
                    is_readonly: is_struct,
                    is_init_only: false,
                }),
                setter: Some(Accessor {
                    accessibility: Accessibility::Public,
                    is_readonly: false,
                    is_init_only: init_only,
                }),
                backing_field: member.backing_field,
            };
            self.push(
                SynthesizedMemberKind::PositionalProperty {
                    ordinal: member.ordinal,
                },
                member.name.clone(),
                base,
                Self::method(member.ty.clone(), vec![]),
                Some(property),
                span,
            );
        }
    }

    fn clone_method(&mut self) -> Result<(), SynthesisError> {
        let base = match self.shape.base_type() {
            Some(base) => find_valid_clone_method(self.env, base, self.cancel)?,
            None => BaseMemberReference::none(),
        };
        let return_type = match base.found {
            Some(found) if !self.compilation().features.covariant_returns => self
                .env
                .view(found)
                .ty()
                .cloned()
                .unwrap_or_else(|| self.type_ref()),
            _ => self.type_ref(),
        };
        self.push(
            SynthesizedMemberKind::Clone,
            CLONE_METHOD_NAME,
            base,
            Self::method(return_type, vec![]),
            None,
            self.span(),
        );
        Ok(())
    }

    fn equality_contract(&mut self) {
        let base = find_equality_contract_override_target(self.env, self.shape);
        if let Some(base_ty) = self.shape.base_type() {
            let base_is_record = self.compilation().ty(base_ty).is_record();
            if base_is_record && (base.found.is_none() || !base.satisfies_signature) {
                self.diagnostics.push(DoesNotOverrideBaseEqualityContractError {
                    member: format!("{}.EqualityContract", self.type_name(self.shape.ty)),
                    base: self.type_name(base_ty),
                    span: self.span(),
                });
            }
        }
        let modifiers = resolve_modifiers(self.shape, &base, SynthesizedMemberKind::EqualityContract);
        let property = PropertyShape {
            getter: Some(Accessor {
                accessibility: modifiers.accessibility(),
                is_readonly: false,
                is_init_only: false,
            }),
            setter: None,
            backing_field: None,
        };
        self.push(
            SynthesizedMemberKind::EqualityContract,
            "EqualityContract",
            base,
            Self::method(TypeRef::well_known(WellKnownType::SystemType), vec![]),
            Some(property),
            self.span(),
        );
    }

    /// Fields whose type cannot take part in generated equality, reported once each.
    fn report_unsafe_fields(&mut self) {
        let compilation = self.compilation();
        let positional = self.positional.iter().filter_map(|p| p.backing_field);
        let declared = compilation.members_of(self.shape.ty).filter_map(|m| match &m.kind {
            MemberKind::Field { .. } if !m.is_static() => Some(FieldRef::Declared(m.id)),
            MemberKind::Property { is_auto: true, .. } if !m.is_static() && !m.is_indexer() => {
                Some(FieldRef::AutoPropertyBacking(m.id))
            }
            _ => None,
        });
        for field in positional.chain(declared).collect::<Vec<_>>() {
            let ty = compilation.field_type(field);
            if !ty.is_unsafe() {
                continue;
            }
            let span = match field {
                FieldRef::Declared(id) | FieldRef::AutoPropertyBacking(id) => {
                    compilation.member(id).span
                }
                _ => compilation
                    .ty(self.shape.ty)
                    .primary_constructor
                    .as_ref()
                    .map_or_else(|| self.span(), |ctor| ctor.span),
            };
            self.diagnostics.push(BadFieldTypeInRecordError {
                ty: ty.display(compilation),
                field: compilation.field_name(field),
                span,
            });
        }
    }

    fn base_equals(&mut self) {
        let base = find_base_equals_override_target(self.env, self.shape);
        if let (Some(found), Some(base_ty)) = (base.found, self.shape.base_type()) {
            if self.env.view(found).containing_type() != base_ty {
                self.diagnostics.push(DoesNotOverrideBaseMethodError {
                    member: format!("{}.Equals", self.type_name(self.shape.ty)),
                    base: self.type_name(base_ty),
                    span: self.span(),
                });
            }
        }
        let parameter_type = self
            .shape
            .base_type()
            .map(|b| self.compilation().type_ref(b).annotated())
            .unwrap_or_else(|| TypeRef::object().annotated());
        self.push(
            SynthesizedMemberKind::BaseEquals,
            "Equals",
            base,
            Self::method(
                TypeRef::boolean(),
                vec![ParameterSymbol::new("other", parameter_type)],
            ),
            None,
            self.span(),
        );
    }

    fn object_override(&mut self, method: ObjectMethod) {
        let kind = match method {
            ObjectMethod::Equals => SynthesizedMemberKind::EqualsObject,
            ObjectMethod::GetHashCode => SynthesizedMemberKind::GetHashCode,
            ObjectMethod::ToString => SynthesizedMemberKind::ToString,
        };
        let base = find_object_method_override_target(
            self.env,
            self.shape.ty,
            method.method_name(),
            &method.parameter_types(),
        );
        let parameters = match method {
            ObjectMethod::Equals => vec![ParameterSymbol::new("obj", TypeRef::object().annotated())],
            ObjectMethod::GetHashCode | ObjectMethod::ToString => vec![],
        };
        let return_type = match method {
            ObjectMethod::ToString => TypeRef::special(method.return_type()).annotated(),
            _ => TypeRef::special(method.return_type()),
        };
        let span = self.span();
        let handle = self.push(
            kind,
            method.method_name(),
            base,
            Self::method(return_type, parameters),
            None,
            span,
        );
        let env = self.env.with_local(&self.members);
        verify_overrides_object_method(&env, MemberRef::Synthesized(handle), span, self.diagnostics);
    }

    fn print_members(&mut self) {
        let base = find_print_members_override_target(self.env, self.shape);
        if let Some(base_ty) = self.shape.base_type() {
            let base_is_record = self.compilation().ty(base_ty).is_record();
            if base_is_record && (base.found.is_none() || !base.satisfies_signature) {
                self.diagnostics.push(DoesNotOverrideBaseMethodError {
                    member: format!("{}.PrintMembers", self.type_name(self.shape.ty)),
                    base: self.type_name(base_ty),
                    span: self.span(),
                });
            }
        }
        self.push(
            SynthesizedMemberKind::PrintMembers,
            "PrintMembers",
            base,
            Self::method(
                TypeRef::boolean(),
                vec![ParameterSymbol::new(
                    "builder",
                    TypeRef::well_known(WellKnownType::StringBuilder),
                )],
            ),
            None,
            self.span(),
        );
    }

    /// `ToString` is not synthesized over a sealed base `ToString`.
    fn to_string_method(&mut self) {
        let compilation = self.compilation();
        let target = find_object_method_override_target(self.env, self.shape.ty, "ToString", &[]);
        if let Some(found) = target.found {
            let view = self.env.view(found);
            if view.modifiers().is_sealed() {
                let owner = compilation.ty(view.containing_type());
                let foreign = owner.assembly != compilation.ty(self.shape.ty).assembly;
                if foreign && !compilation.features.sealed_record_to_string {
                    self.diagnostics.push(InheritingFromRecordWithSealedToStringError {
                        base: owner.name.clone(),
                        span: self.span(),
                    });
                }
                tracing::trace!(base = %owner.name, "base ToString is sealed");
                return;
            }
        }
        self.object_override(ObjectMethod::ToString);
    }
}

/// Synthesize the members of the record `ty`.
///
/// `env` must see the published synthesis of every record ancestor. Cancellation is checked
/// before each base-type scan and before each body; a cancelled record returns no partial result.
pub fn synthesize_record(
    env: &SymbolEnvironment,
    ty: TypeId,
    cancel: &CancellationToken,
) -> Result<RecordSynthesis, SynthesisError> {
    let compilation = env.compilation;
    let symbol = compilation.ty(ty);
    let _span = tracing::debug_span!("synthesize_record", ty = %symbol.name).entered();
    cancel.check()?;

    let mut diagnostics = DiagnosticBag::new();
    let explicit = ExplicitMembers::collect(compilation, ty);
    let positional = bind_positional_members(env, ty, &mut diagnostics);
    let mut shape = RecordShape::of(compilation, ty);
    shape.positional_getters_readonly =
        symbol.is_readonly || positional.iter().all(|p| p.is_readonly_getter);
    shape.printable_getters_readonly = symbol.is_readonly
        || printable_members(compilation, ty, &positional)
            .iter()
            .all(|m| m.has_readonly_read());

    let members = DescriptorPass {
        env,
        shape: &shape,
        explicit: &explicit,
        positional: &positional,
        members: SynthesizedMembers::new(ty),
        diagnostics: &mut diagnostics,
        cancel,
    }
    .run()?;

    let mut bodies = Vec::with_capacity(members.len());
    {
        let ctx = RecordContext {
            env: env.with_local(&members),
            shape: &shape,
            positional: &positional,
            members: &members,
            explicit: &explicit,
        };
        for handle in members.handles() {
            cancel.check()?;
            bodies.push(generate_method_body(&ctx, handle, &mut diagnostics));
        }
        check_explicit_members(&ctx, &mut diagnostics);
    }

    let (descriptors, index) = members.into_parts();
    let members = descriptors
        .into_iter()
        .zip(bodies)
        .map(|(descriptor, body)| SynthesizedMember { descriptor, body })
        .collect::<Vec<_>>();
    tracing::debug!(
        members = members.len(),
        diagnostics = diagnostics.len(),
        "synthesized record"
    );
    Ok(RecordSynthesis {
        ty,
        positional,
        members,
        index,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use crate::driver::{synthesize_compilation, SynthesisOptions, SynthesisOutput};
    use crate::error::RecordDiagnostic;
    use crate::member::{SynthesizedAttribute, SynthesizedMemberKind};
    use crate::plan::{BodyPlan, MethodRef, PlanExpr, PlanStmt};
    use crate::synth::HASH_FACTOR;
    use recsynth_macros::{assert_any, assert_matches, assert_none, assert_ok, assert_some};
    use recsynth_symbols::builder::CompilationBuilder;
    use recsynth_symbols::decl::CompilationDecl;
    use recsynth_symbols::{CancellationToken, Compilation, DeclarationModifiers, WellKnownMember};

    fn synthesize(source: &str) -> (Compilation, SynthesisOutput) {
        let decl = assert_ok!(CompilationDecl::from_ron(source));
        let compilation = assert_ok!(CompilationBuilder::new(decl).build());
        let cancel = CancellationToken::new();
        let output = assert_ok!(synthesize_compilation(
            &compilation,
            SynthesisOptions { parallel: false },
            &cancel
        ));
        (compilation, output)
    }

    fn returned(body: &BodyPlan) -> &PlanExpr {
        let stmts = assert_matches!(body, BodyPlan::Block(stmts) => stmts);
        assert_matches!(stmts.last(), Some(PlanStmt::Return(Some(expr))) => expr)
    }

    #[test]
    fn test_record_class_members_in_metadata_order() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "Point", kind: RecordClass, parameters: [
                (name: "X", type: "int"),
                (name: "Y", type: "int"),
            ])])"#,
        );
        let record = &output.records[0];
        let kinds = record.members.iter().map(|m| m.kind()).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                SynthesizedMemberKind::PrimaryConstructor,
                SynthesizedMemberKind::PositionalProperty { ordinal: 0 },
                SynthesizedMemberKind::PositionalProperty { ordinal: 1 },
                SynthesizedMemberKind::Deconstruct,
                SynthesizedMemberKind::CopyConstructor,
                SynthesizedMemberKind::Clone,
                SynthesizedMemberKind::EqualityContract,
                SynthesizedMemberKind::EqualsTyped,
                SynthesizedMemberKind::EqualsObject,
                SynthesizedMemberKind::GetHashCode,
                SynthesizedMemberKind::InequalityOperator,
                SynthesizedMemberKind::EqualityOperator,
                SynthesizedMemberKind::PrintMembers,
                SynthesizedMemberKind::ToString,
            ]
        );
        assert!(record.diagnostics.is_empty());
        assert!(!record.is_poisoned());
    }

    #[test]
    fn test_record_struct_compares_fields_only() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "S", kind: RecordStruct, parameters: [
                (name: "X", type: "int"),
                (name: "Y", type: "string"),
            ])])"#,
        );
        let record = &output.records[0];
        assert_none!(record.get(SynthesizedMemberKind::EqualityContract));
        assert_none!(record.get(SynthesizedMemberKind::Clone));
        let equals = assert_some!(record.get(SynthesizedMemberKind::EqualsTyped));
        let (lhs, rhs) = assert_matches!(returned(&equals.body), PlanExpr::And(lhs, rhs) => (lhs, rhs));
        assert_matches!(**lhs, PlanExpr::Call { .. } => ());
        assert_matches!(**rhs, PlanExpr::Call { .. } => ());
    }

    #[test]
    fn test_hash_code_combines_contract_and_fields() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")])])"#,
        );
        let hash = assert_some!(output.records[0].get(SynthesizedMemberKind::GetHashCode));
        let (scaled, _) =
            assert_matches!(returned(&hash.body), PlanExpr::IntAdd(lhs, rhs) => (lhs, rhs));
        let factor = assert_matches!(&**scaled, PlanExpr::IntMul(_, factor) => factor);
        assert_eq!(**factor, PlanExpr::Int(HASH_FACTOR));
    }

    #[test]
    fn test_missing_string_builder_poisons_to_string() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (
                missing: (members: [StringBuilderAppendString]),
                types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")])],
            )"#,
        );
        let record = &output.records[0];
        let to_string = assert_some!(record.get(SynthesizedMemberKind::ToString));
        assert!(to_string.is_poisoned());
        let equals = assert_some!(record.get(SynthesizedMemberKind::EqualsTyped));
        assert!(!equals.is_poisoned());
        assert!(record
            .diagnostics
            .iter()
            .any(|d| matches!(d, RecordDiagnostic::MissingPredefinedMember(_))));
    }

    const SEALED_TO_STRING: &str = r#"#![enable(implicit_some)]
    (
        features: (sealed_record_to_string: false),
        types: [
            (name: "A", kind: RecordClass, assembly: "lib", members: [
                Method(name: "ToString", returns: "string", accessibility: Public, modifiers: [sealed, override]),
            ]),
            (name: "B", kind: RecordClass, base: "A"),
        ],
    )"#;

    #[test]
    fn test_sealed_base_to_string_is_not_overridden() {
        let (compilation, output) = synthesize(SEALED_TO_STRING);
        let b = assert_some!(compilation.lookup_type("B"));
        let record = assert_some!(output.record(b));
        assert_none!(record.get(SynthesizedMemberKind::ToString));
        assert_some!(record.get(SynthesizedMemberKind::PrintMembers));
        assert!(record
            .diagnostics
            .iter()
            .any(|d| matches!(d, RecordDiagnostic::InheritingFromRecordWithSealedToString(_))));

        let a = assert_some!(compilation.lookup_type("A"));
        let record = assert_some!(output.record(a));
        assert!(record
            .diagnostics
            .iter()
            .any(|d| matches!(d, RecordDiagnostic::SealedToStringNotAvailable(_))));
    }

    #[test]
    fn test_declared_operator_and_clone_are_reported() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")], members: [
                Operator(name: "op_Equality", returns: "bool", accessibility: Public, modifiers: [static],
                    parameters: [(name: "l", type: "R"), (name: "r", type: "R")]),
                Method(name: "Clone", returns: "R", accessibility: Public),
            ])])"#,
        );
        let record = &output.records[0];
        assert_some!(record.get(SynthesizedMemberKind::EqualityOperator));
        let duplicates = record
            .diagnostics
            .iter()
            .filter(|d| matches!(d, RecordDiagnostic::DuplicateRecordMember(_)))
            .count();
        assert_eq!(duplicates, 1);
        assert!(record
            .diagnostics
            .iter()
            .any(|d| matches!(d, RecordDiagnostic::CloneDisallowedInRecord(_))));
    }

    #[test]
    fn test_struct_to_string_is_readonly_only_with_print_members() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "S", kind: RecordStruct, parameters: [(name: "X", type: "int")], members: [
                Property(name: "M", type: "int", accessibility: Public, get: (readonly: false)),
            ])])"#,
        );
        let record = &output.records[0];
        let print = assert_some!(record.get(SynthesizedMemberKind::PrintMembers));
        let to_string = assert_some!(record.get(SynthesizedMemberKind::ToString));
        assert!(!print.descriptor.modifiers.contains(DeclarationModifiers::READONLY));
        assert!(!to_string.descriptor.modifiers.contains(DeclarationModifiers::READONLY));

        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "S", kind: RecordStruct, parameters: [(name: "X", type: "int")])])"#,
        );
        let record = &output.records[0];
        let print = assert_some!(record.get(SynthesizedMemberKind::PrintMembers));
        let to_string = assert_some!(record.get(SynthesizedMemberKind::ToString));
        assert!(print.descriptor.modifiers.contains(DeclarationModifiers::READONLY));
        assert!(to_string.descriptor.modifiers.contains(DeclarationModifiers::READONLY));
    }

    #[test]
    fn test_pointer_field_poisons_equality_hash_and_printing() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")], members: [
                Field(name: "p", type: "int*", accessibility: Public),
            ])])"#,
        );
        let record = &output.records[0];
        assert_any!(record.diagnostics.iter(), RecordDiagnostic::BadFieldTypeInRecord(_));
        for kind in [
            SynthesizedMemberKind::EqualsTyped,
            SynthesizedMemberKind::GetHashCode,
            SynthesizedMemberKind::PrintMembers,
        ] {
            let member = assert_some!(record.get(kind));
            assert!(member.is_poisoned(), "{:?} was not poisoned", kind);
        }
        for kind in [
            SynthesizedMemberKind::PrimaryConstructor,
            SynthesizedMemberKind::EqualsObject,
            SynthesizedMemberKind::ToString,
        ] {
            let member = assert_some!(record.get(kind));
            assert!(!member.is_poisoned(), "{:?} was poisoned", kind);
        }
    }

    #[test]
    fn test_copy_constructor_sets_required_members() {
        let (compilation, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [
                (name: "A", kind: RecordClass, members: [
                    Field(name: "Id", type: "int", accessibility: Public, required: true),
                ]),
                (name: "B", kind: RecordClass, base: "A"),
                (name: "C", kind: RecordClass, parameters: [(name: "X", type: "int")]),
            ])"#,
        );
        for (name, expected) in [("A", true), ("B", true), ("C", false)] {
            let ty = assert_some!(compilation.lookup_type(name));
            let record = assert_some!(output.record(ty));
            let copy = assert_some!(record.get(SynthesizedMemberKind::CopyConstructor));
            let attributes = &copy.descriptor.attributes;
            assert!(attributes.contains(&SynthesizedAttribute::CompilerGenerated));
            assert_eq!(
                attributes.contains(&SynthesizedAttribute::SetsRequiredMembers),
                expected,
                "{name}"
            );
        }
    }

    fn ensures_stack(body: &BodyPlan) -> bool {
        let stmts = assert_matches!(body, BodyPlan::Block(stmts) => stmts);
        matches!(
            stmts.first(),
            Some(PlanStmt::Expr(PlanExpr::Call {
                receiver: None,
                method: MethodRef::WellKnown {
                    member: WellKnownMember::RuntimeHelpersEnsureSufficientExecutionStack,
                    ..
                },
                ..
            }))
        )
    }

    #[test]
    fn test_root_print_members_ensures_execution_stack() {
        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")])])"#,
        );
        let print = assert_some!(output.records[0].get(SynthesizedMemberKind::PrintMembers));
        assert!(ensures_stack(&print.body));

        let (_, output) = synthesize(
            r#"#![enable(implicit_some)]
            (
                missing: (members: [RuntimeHelpersEnsureSufficientExecutionStack]),
                types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")])],
            )"#,
        );
        let print = assert_some!(output.records[0].get(SynthesizedMemberKind::PrintMembers));
        assert!(!print.is_poisoned());
        assert!(!ensures_stack(&print.body));
    }
}
