//! Validation of user-declared members that take the place of synthesized ones.
//!
//! A declared `Equals(T)`, `GetHashCode`, `ToString`, `PrintMembers`, `Deconstruct`,
//! `EqualityContract` or copy constructor suppresses the synthesized member, but must still have
//! the shape the other synthesized members rely on. Declarations of members that are always
//! synthesized are reported as duplicates.

use crate::env::{MemberRef, SymbolEnvironment};
use crate::error::{
    CloneDisallowedInRecordError, CopyConstructorWrongAccessibilityError, DiagnosticBag,
    DoesNotOverrideBaseEqualityContractError, DoesNotOverrideBaseMethodError,
    DoesNotOverrideMethodFromObjectError, DuplicateRecordMemberError,
    EqualityContractRequiresGetterError, NonPrivateApiInRecordError, NonProtectedApiInRecordError,
    NonPublicApiInRecordError, NotOverridableApiInRecordError, RecordEqualsWithoutGetHashCodeWarning,
    SealedToStringNotAvailableError, SignatureMismatchInRecordError, StaticApiInRecordError,
};
use crate::member::SynthesizedMemberKind;
use crate::synth::RecordContext;
use recsynth_span::Span;
use recsynth_symbols::{
    Accessibility, Compilation, MemberId, MemberSymbol, SpecialType, TypeId, TypeRef,
    WellKnownType,
};

/// Report an override of a `System.Object` method whose override chain does not end in
/// `System.Object`.
///
/// Returns whether an error was reported. A member without an override target is left to the
/// override checker and not reported here.
pub fn verify_overrides_object_method(
    env: &SymbolEnvironment,
    member: MemberRef,
    span: Span,
    diagnostics: &mut DiagnosticBag,
) -> bool {
    let view = env.view(member);
    let report = if !view.modifiers().is_override() {
        true
    } else {
        match env.overridden_member(member) {
            Some(overridden) => {
                let root = env.least_overridden(overridden);
                !env.compilation.is_object(env.view(root).containing_type())
            }
            None => false,
        }
    };
    if report {
        diagnostics.push(DoesNotOverrideMethodFromObjectError {
            member: display_name(env.compilation, view.containing_type(), view.name()),
            span,
        });
    }
    report
}

fn display_name(compilation: &Compilation, ty: TypeId, name: &str) -> String {
    format!("{}.{}", compilation.ty(ty).name, name)
}

/// Checks of one declared member.
struct MemberCheck<'c, 'd> {
    compilation: &'c Compilation,
    member: &'c MemberSymbol,
    diagnostics: &'d mut DiagnosticBag,
}

impl MemberCheck<'_, '_> {
    fn name(&self) -> String {
        display_name(self.compilation, self.member.containing_type, &self.member.name)
    }

    fn require_public(&mut self) {
        if self.member.accessibility() != Accessibility::Public {
            let member = self.name();
            self.diagnostics.push(NonPublicApiInRecordError {
                member,
                span: self.member.span,
            });
        }
    }

    /// Private members of sealed root records and record structs, protected ones otherwise.
    fn require_private_or_protected(&mut self, private: bool) {
        let accessibility = self.member.accessibility();
        let member = self.name();
        let span = self.member.span;
        if private && accessibility != Accessibility::Private {
            self.diagnostics
                .push(NonPrivateApiInRecordError { member, span });
        } else if !private && accessibility != Accessibility::Protected {
            self.diagnostics
                .push(NonProtectedApiInRecordError { member, span });
        }
    }

    fn require_type(&mut self, expected: &TypeRef) {
        let matches = self
            .member
            .ty()
            .is_some_and(|ty| ty.equals_ignoring_options(expected));
        if !matches {
            let member = self.name();
            self.diagnostics.push(SignatureMismatchInRecordError {
                member,
                expected: expected.display(self.compilation),
                span: self.member.span,
            });
        }
    }

    /// Static members are reported first; otherwise an unsealed record needs an overridable one.
    fn require_overridable(&mut self, record_is_sealed: bool) {
        let member = self.name();
        let span = self.member.span;
        if self.member.is_static() {
            self.diagnostics.push(StaticApiInRecordError { member, span });
        } else if !record_is_sealed && !self.member.modifiers.is_overridable() {
            self.diagnostics
                .push(NotOverridableApiInRecordError { member, span });
        }
    }
}

fn check<'c, 'd>(
    compilation: &'c Compilation,
    member: MemberId,
    diagnostics: &'d mut DiagnosticBag,
) -> MemberCheck<'c, 'd> {
    MemberCheck {
        compilation,
        member: compilation.member(member),
        diagnostics,
    }
}

/// Report an override of the base record's member that lands on a more distant ancestor.
fn verify_overrides_base(
    ctx: &RecordContext,
    member: MemberId,
    diagnostics: &mut DiagnosticBag,
    equality_contract: bool,
) {
    let Some(base) = ctx.shape.base_type() else {
        return;
    };
    if !ctx.compilation().ty(base).is_record() {
        return;
    }
    let declared = ctx.compilation().member(member);
    let report = if !declared.modifiers.is_override() {
        true
    } else {
        ctx.env
            .overridden_member(MemberRef::Declared(member))
            .is_some_and(|overridden| ctx.env.view(overridden).containing_type() != base)
    };
    if !report {
        return;
    }
    let name = display_name(ctx.compilation(), declared.containing_type, &declared.name);
    let base = ctx.compilation().ty(base).name.clone();
    if equality_contract {
        diagnostics.push(DoesNotOverrideBaseEqualityContractError {
            member: name,
            base,
            span: declared.span,
        });
    } else {
        diagnostics.push(DoesNotOverrideBaseMethodError {
            member: name,
            base,
            span: declared.span,
        });
    }
}

/// Validate every declared member that replaces or collides with a synthesized one.
pub fn check_explicit_members(ctx: &RecordContext, diagnostics: &mut DiagnosticBag) {
    let compilation = ctx.compilation();
    let shape = ctx.shape;
    let explicit = ctx.explicit;
    let root_private = shape.is_struct || (!shape.is_derived() && shape.is_sealed);

    if let Some(ctor) = explicit.copy_constructor {
        let member = compilation.member(ctor);
        let accessibility = member.accessibility();
        if !shape.is_sealed
            && accessibility != Accessibility::Public
            && accessibility != Accessibility::Protected
        {
            diagnostics.push(CopyConstructorWrongAccessibilityError { span: member.span });
        }
    }

    if let Some(contract) = explicit.equality_contract {
        let mut checked = check(compilation, contract, diagnostics);
        checked.require_private_or_protected(root_private);
        checked.require_type(&TypeRef::well_known(WellKnownType::SystemType));
        checked.require_overridable(shape.is_sealed);
        if checked.member.getter().is_none() {
            let member = checked.name();
            let span = checked.member.span;
            checked
                .diagnostics
                .push(EqualityContractRequiresGetterError { member, span });
        }
        verify_overrides_base(ctx, contract, diagnostics, true);
    }

    if let Some(equals) = explicit.equals_typed {
        let mut checked = check(compilation, equals, diagnostics);
        if !shape.is_struct {
            checked.require_overridable(shape.is_sealed);
        }
        checked.require_public();
        checked.require_type(&TypeRef::boolean());
        if explicit.get_hash_code.is_none() {
            let member = checked.name();
            let span = checked.member.span;
            checked
                .diagnostics
                .push(RecordEqualsWithoutGetHashCodeWarning { member, span });
        }
    }

    if let Some(hash) = explicit.get_hash_code {
        let member = compilation.member(hash);
        let reported = verify_overrides_object_method(
            &ctx.env,
            MemberRef::Declared(hash),
            member.span,
            diagnostics,
        );
        let mut checked = check(compilation, hash, diagnostics);
        checked.require_type(&TypeRef::int32());
        if !reported && !shape.is_struct && !shape.is_sealed && member.modifiers.is_sealed() {
            let name = checked.name();
            checked.diagnostics.push(NotOverridableApiInRecordError {
                member: name,
                span: member.span,
            });
        }
    }

    if let Some(print) = explicit.print_members {
        let mut checked = check(compilation, print, diagnostics);
        checked.require_private_or_protected(root_private);
        checked.require_type(&TypeRef::boolean());
        if !shape.is_struct {
            checked.require_overridable(shape.is_sealed);
        }
        verify_overrides_base(ctx, print, diagnostics, false);
    }

    if let Some(to_string) = explicit.to_string {
        let member = compilation.member(to_string);
        verify_overrides_object_method(
            &ctx.env,
            MemberRef::Declared(to_string),
            member.span,
            diagnostics,
        );
        let mut checked = check(compilation, to_string, diagnostics);
        checked.require_public();
        checked.require_type(&TypeRef::special(SpecialType::String));
        if member.modifiers.is_sealed() && !compilation.features.sealed_record_to_string {
            checked
                .diagnostics
                .push(SealedToStringNotAvailableError { span: member.span });
        }
    }

    if let Some(deconstruct) = explicit.deconstruct {
        let mut checked = check(compilation, deconstruct, diagnostics);
        checked.require_public();
        checked.require_type(&TypeRef::void());
        if checked.member.is_static() {
            let member = checked.name();
            let span = checked.member.span;
            checked
                .diagnostics
                .push(StaticApiInRecordError { member, span });
        }
    }

    let record = compilation.ty(ctx.ty()).name.clone();
    for (member, kind) in explicit.duplicates() {
        let declared = compilation.member(member);
        diagnostics.push(DuplicateRecordMemberError {
            member: synthesized_name(kind).to_owned(),
            record: record.clone(),
            span: declared.span,
        });
    }
    for clone in &explicit.clones {
        diagnostics.push(CloneDisallowedInRecordError {
            span: compilation.member(*clone).span,
        });
    }
}

fn synthesized_name(kind: SynthesizedMemberKind) -> &'static str {
    match kind {
        SynthesizedMemberKind::PrimaryConstructor | SynthesizedMemberKind::CopyConstructor => {
            ".ctor"
        }
        SynthesizedMemberKind::EqualsObject
        | SynthesizedMemberKind::BaseEquals
        | SynthesizedMemberKind::EqualsTyped => "Equals",
        SynthesizedMemberKind::EqualityOperator => "op_Equality",
        SynthesizedMemberKind::InequalityOperator => "op_Inequality",
        SynthesizedMemberKind::GetHashCode => "GetHashCode",
        SynthesizedMemberKind::ToString => "ToString",
        SynthesizedMemberKind::PrintMembers => "PrintMembers",
        SynthesizedMemberKind::Deconstruct => "Deconstruct",
        SynthesizedMemberKind::EqualityContract => "EqualityContract",
        SynthesizedMemberKind::Clone => "<Clone>$",
        SynthesizedMemberKind::PositionalProperty { .. } => "property",
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::{synthesize_compilation, SynthesisOptions};
    use crate::error::RecordDiagnostic;
    use crate::member::SynthesizedMemberKind;
    use crate::record::RecordSynthesis;
    use recsynth_macros::{assert_any, assert_no_match, assert_none, assert_ok, assert_some};
    use recsynth_symbols::builder::CompilationBuilder;
    use recsynth_symbols::decl::CompilationDecl;
    use recsynth_symbols::CancellationToken;

    /// Synthesize the compilation and return the record named `name`.
    fn synthesize_record(source: &str, name: &str) -> RecordSynthesis {
        let decl = assert_ok!(CompilationDecl::from_ron(source));
        let compilation = assert_ok!(CompilationBuilder::new(decl).build());
        let output = assert_ok!(synthesize_compilation(
            &compilation,
            SynthesisOptions { parallel: false },
            &CancellationToken::new()
        ));
        let ty = assert_some!(compilation.lookup_type(name));
        assert_some!(output.record(ty)).clone()
    }

    #[test]
    fn test_declared_members_must_override_the_base_record() {
        let record = synthesize_record(
            r#"#![enable(implicit_some)]
            (types: [
                (name: "A", kind: RecordClass, parameters: [(name: "X", type: "int")]),
                (name: "B", kind: RecordClass, base: "A", members: [
                    Property(name: "EqualityContract", type: "System.Type", accessibility: Protected,
                        modifiers: [virtual], get: ()),
                    Method(name: "PrintMembers", returns: "bool", accessibility: Protected, modifiers: [virtual],
                        parameters: [(name: "builder", type: "StringBuilder")]),
                    Method(name: "GetHashCode", returns: "int", accessibility: Public, modifiers: [virtual]),
                ]),
            ])"#,
            "B",
        );
        assert_any!(
            record.diagnostics.iter(),
            RecordDiagnostic::DoesNotOverrideBaseEqualityContract(_)
        );
        assert_any!(record.diagnostics.iter(), RecordDiagnostic::DoesNotOverrideBaseMethod(_));
        assert_any!(
            record.diagnostics.iter(),
            RecordDiagnostic::DoesNotOverrideMethodFromObject(_)
        );
        assert_none!(record.get(SynthesizedMemberKind::EqualityContract));
        assert_none!(record.get(SynthesizedMemberKind::PrintMembers));
        assert_none!(record.get(SynthesizedMemberKind::GetHashCode));
    }

    #[test]
    fn test_overriding_declarations_are_accepted() {
        let record = synthesize_record(
            r#"#![enable(implicit_some)]
            (types: [
                (name: "A", kind: RecordClass, parameters: [(name: "X", type: "int")]),
                (name: "B", kind: RecordClass, base: "A", members: [
                    Property(name: "EqualityContract", type: "System.Type", accessibility: Protected,
                        modifiers: [override], get: ()),
                    Method(name: "PrintMembers", returns: "bool", accessibility: Protected, modifiers: [override],
                        parameters: [(name: "builder", type: "StringBuilder")]),
                    Method(name: "GetHashCode", returns: "int", accessibility: Public, modifiers: [override]),
                ]),
            ])"#,
            "B",
        );
        assert!(record.diagnostics.is_empty(), "{:?}", record.diagnostics);
    }

    #[test]
    fn test_explicit_member_shape_errors() {
        let record = synthesize_record(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")], members: [
                Method(name: "Equals", returns: "bool", accessibility: Internal, modifiers: [virtual],
                    parameters: [(name: "other", type: "R?")]),
                Method(name: "PrintMembers", returns: "bool", accessibility: Public, modifiers: [virtual],
                    parameters: [(name: "builder", type: "StringBuilder")]),
                Method(name: "Deconstruct", returns: "void", accessibility: Public, modifiers: [static],
                    parameters: [(name: "X", type: "int", ref_kind: Out)]),
                Property(name: "EqualityContract", type: "System.Type", accessibility: Protected, get: ()),
            ])])"#,
            "R",
        );
        assert_any!(record.diagnostics.iter(), RecordDiagnostic::NonPublicApiInRecord(_));
        assert_any!(record.diagnostics.iter(), RecordDiagnostic::NonProtectedApiInRecord(_));
        assert_any!(record.diagnostics.iter(), RecordDiagnostic::StaticApiInRecord(_));
        assert_any!(record.diagnostics.iter(), RecordDiagnostic::NotOverridableApiInRecord(_));
    }

    #[test]
    fn test_equals_without_get_hash_code_warns() {
        let record = synthesize_record(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")], members: [
                Method(name: "Equals", returns: "bool", accessibility: Public, modifiers: [virtual],
                    parameters: [(name: "other", type: "R?")]),
            ])])"#,
            "R",
        );
        assert_eq!(record.diagnostics.len(), 1);
        let warning = assert_some!(record.diagnostics.iter().next());
        assert!(matches!(warning, RecordDiagnostic::RecordEqualsWithoutGetHashCode(_)));
        assert!(!warning.is_error());
        assert_some!(record.get(SynthesizedMemberKind::GetHashCode));

        let record = synthesize_record(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")], members: [
                Method(name: "Equals", returns: "bool", accessibility: Public, modifiers: [virtual],
                    parameters: [(name: "other", type: "R?")]),
                Method(name: "GetHashCode", returns: "int", accessibility: Public, modifiers: [override]),
            ])])"#,
            "R",
        );
        assert_no_match!(
            record.diagnostics.iter(),
            RecordDiagnostic::RecordEqualsWithoutGetHashCode(_)
        );
    }

    #[test]
    fn test_copy_constructor_and_equality_contract_requirements() {
        let record = synthesize_record(
            r#"#![enable(implicit_some)]
            (types: [(name: "R", kind: RecordClass, parameters: [(name: "X", type: "int")], members: [
                Constructor(accessibility: Internal, parameters: [(name: "original", type: "R")]),
                Property(name: "EqualityContract", type: "System.Type", accessibility: Protected,
                    modifiers: [virtual], set: ()),
            ])])"#,
            "R",
        );
        assert_any!(
            record.diagnostics.iter(),
            RecordDiagnostic::CopyConstructorWrongAccessibility(_)
        );
        assert_any!(record.diagnostics.iter(), RecordDiagnostic::EqualityContractRequiresGetter(_));
        assert_none!(record.get(SynthesizedMemberKind::CopyConstructor));
    }
}
