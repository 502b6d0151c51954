//! Searches of the base type for members a synthesized member builds on.
//!
//! All searches go through a [`SymbolEnvironment`], so members synthesized for base records in
//! earlier layers are found exactly like members declared in source or metadata.

use crate::env::{MemberRef, SymbolEnvironment};
use crate::member::MemberCategory;
use crate::modifiers::RecordShape;
use recsynth_diagnostics::debug_ice;
use recsynth_symbols::{
    Accessibility, CancellationToken, CancelledError, RefKind, TypeId, TypeRef, WellKnownType,
};

/// Name of the clone method in metadata.
pub const CLONE_METHOD_NAME: &str = "<Clone>$";

/// Outcome of a base-member search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseMemberReference {
    pub found: Option<MemberRef>,
    /// Several candidates qualified and none was better than the others.
    pub is_ambiguous: bool,
    /// The found member has the signature the caller asked for.
    pub satisfies_signature: bool,
}

impl BaseMemberReference {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn found(member: MemberRef) -> Self {
        Self {
            found: Some(member),
            is_ambiguous: false,
            satisfies_signature: true,
        }
    }

    pub fn ambiguous() -> Self {
        Self {
            found: None,
            is_ambiguous: true,
            satisfies_signature: false,
        }
    }
}

fn has_copy_constructor_signature(env: &SymbolEnvironment, ctor: MemberRef, ty: TypeId) -> bool {
    let view = env.view(ctor);
    match view.parameters() {
        [parameter] => {
            parameter.ref_kind == RefKind::None
                && parameter
                    .ty
                    .equals_ignoring_options(&env.compilation.type_ref(ty))
        }
        _ => false,
    }
}

/// Find the copy constructor of `ty` accessible from `within`.
///
/// Among several candidates the one with the fewest custom modifiers wins. Two candidates with
/// the same count make the search ambiguous. An ambiguity only clears if a later candidate has
/// strictly fewer modifiers than the tied pair.
pub fn find_copy_constructor(
    env: &SymbolEnvironment,
    ty: TypeId,
    within: TypeId,
) -> BaseMemberReference {
    let mut best: Option<MemberRef> = None;
    // Stays negative until a second candidate shows up.
    let mut best_modifier_count: i64 = -1;
    for ctor in env.instance_constructors(ty) {
        if !has_copy_constructor_signature(env, ctor, ty) || !env.is_accessible(ctor, within) {
            continue;
        }
        let Some(current) = best else {
            if best_modifier_count < 0 {
                best = Some(ctor);
                continue;
            }
            // Ambiguous so far; only a strictly better candidate resolves it.
            let count = i64::from(env.view(ctor).custom_modifier_count());
            if count < best_modifier_count {
                best = Some(ctor);
                best_modifier_count = count;
            }
            continue;
        };
        if best_modifier_count < 0 {
            best_modifier_count = i64::from(env.view(current).custom_modifier_count());
        }
        let count = i64::from(env.view(ctor).custom_modifier_count());
        if count > best_modifier_count {
            continue;
        }
        if count == best_modifier_count {
            tracing::trace!(
                ty = %env.compilation.ty(ty).name,
                modifiers = count,
                "copy constructor candidates tie"
            );
            best = None;
            continue;
        }
        best = Some(ctor);
        best_modifier_count = count;
    }
    match best {
        Some(ctor) => BaseMemberReference::found(ctor),
        None if best_modifier_count >= 0 => BaseMemberReference::ambiguous(),
        None => BaseMemberReference::none(),
    }
}

/// Find the clone method of a base type that a record's `Clone` may override.
///
/// The precomputed flag of the type is consulted first so types that cannot have a clone method
/// are never enumerated. The search is cancellable before the full member scan.
pub fn find_valid_clone_method(
    env: &SymbolEnvironment,
    ty: TypeId,
    cancel: &CancellationToken,
) -> Result<BaseMemberReference, CancelledError> {
    let compilation = env.compilation;
    if compilation.is_object(ty) || !compilation.ty(ty).has_possible_well_known_clone_method {
        return Ok(BaseMemberReference::none());
    }
    cancel.check()?;

    let mut candidate = None;
    for member in env.members_named(ty, CLONE_METHOD_NAME) {
        let view = env.view(member);
        let qualifies = view.category() == MemberCategory::Method
            && view.accessibility() == Accessibility::Public
            && !view.is_static()
            && view.parameters().is_empty()
            && view.arity() == 0;
        if !qualifies {
            continue;
        }
        if candidate.is_some() {
            tracing::trace!(ty = %compilation.ty(ty).name, "clone method is ambiguous");
            return Ok(BaseMemberReference::ambiguous());
        }
        candidate = Some(member);
    }
    let Some(candidate) = candidate else {
        return Ok(BaseMemberReference::none());
    };

    let view = env.view(candidate);
    let modifiers = view.modifiers();
    let dispatches = compilation.ty(ty).is_sealed
        || modifiers.is_override()
        || modifiers.is_virtual()
        || modifiers.is_abstract();
    let returns_base = view
        .ty()
        .and_then(|returned| compilation.resolve_named(returned))
        .is_some_and(|returned| compilation.is_derived_from_or_equal(ty, returned));
    if !dispatches || !returns_base {
        return Ok(BaseMemberReference {
            found: None,
            is_ambiguous: false,
            satisfies_signature: false,
        });
    }
    Ok(BaseMemberReference::found(candidate))
}

/// Find `Equals(Base)` in the immediate base record, which the `BaseEquals` member overrides.
pub fn find_base_equals_override_target(
    env: &SymbolEnvironment,
    shape: &RecordShape,
) -> BaseMemberReference {
    let Some(base) = shape.base_type() else {
        return BaseMemberReference::none();
    };
    if !env.compilation.ty(base).is_record() {
        return BaseMemberReference::none();
    }
    let parameters = [env.compilation.type_ref(base)];
    let found = env.find_override_target(base, "Equals", MemberCategory::Method, &parameters);
    match found {
        Some(member) => {
            let view = env.view(member);
            if !env.compilation.ty(view.containing_type()).is_record() {
                debug_ice!("BaseEquals override target is declared by a non-record type");
            }
            BaseMemberReference {
                found: Some(member),
                is_ambiguous: false,
                satisfies_signature: view
                    .ty()
                    .is_some_and(|ty| ty.equals_ignoring_options(&TypeRef::boolean())),
            }
        }
        None => BaseMemberReference::none(),
    }
}

/// Find the `EqualityContract` property of the immediate base record.
pub fn find_equality_contract_override_target(
    env: &SymbolEnvironment,
    shape: &RecordShape,
) -> BaseMemberReference {
    let Some(base) = shape.base_type() else {
        return BaseMemberReference::none();
    };
    if !env.compilation.ty(base).is_record() {
        return BaseMemberReference::none();
    }
    let found = env.members_named(base, "EqualityContract").into_iter().find(|m| {
        let view = env.view(*m);
        view.category() == MemberCategory::Property && !view.is_static() && !view.is_indexer()
    });
    match found {
        Some(member) => BaseMemberReference {
            found: Some(member),
            is_ambiguous: false,
            satisfies_signature: env
                .view(member)
                .ty()
                .is_some_and(|ty| ty.is_well_known(WellKnownType::SystemType)),
        },
        None => BaseMemberReference::none(),
    }
}

/// Find `PrintMembers(StringBuilder)` of the immediate base record.
pub fn find_print_members_override_target(
    env: &SymbolEnvironment,
    shape: &RecordShape,
) -> BaseMemberReference {
    let Some(base) = shape.base_type() else {
        return BaseMemberReference::none();
    };
    if !env.compilation.ty(base).is_record() {
        return BaseMemberReference::none();
    }
    let parameters = [TypeRef::well_known(WellKnownType::StringBuilder)];
    let found = env.members_named(base, "PrintMembers").into_iter().find(|m| {
        let view = env.view(*m);
        view.category() == MemberCategory::Method
            && !view.is_static()
            && view.has_parameter_types(&parameters)
    });
    match found {
        Some(member) => BaseMemberReference {
            found: Some(member),
            is_ambiguous: false,
            satisfies_signature: env
                .view(member)
                .ty()
                .is_some_and(|ty| ty.equals_ignoring_options(&TypeRef::boolean())),
        },
        None => BaseMemberReference::none(),
    }
}

/// Find the member of an ancestor that an override of a `System.Object` method binds to.
pub fn find_object_method_override_target(
    env: &SymbolEnvironment,
    ty: TypeId,
    name: &str,
    parameters: &[TypeRef],
) -> BaseMemberReference {
    let Some(base) = env.compilation.base_type(ty) else {
        return BaseMemberReference::none();
    };
    match env.find_override_target(base, name, MemberCategory::Method, parameters) {
        Some(member) => BaseMemberReference::found(member),
        None => BaseMemberReference::none(),
    }
}

#[cfg(test)]
mod tests {
    use crate::env::{MemberRef, PublishedRecords, SymbolEnvironment};
    use crate::locator::{find_copy_constructor, find_valid_clone_method};
    use recsynth_macros::{assert_none, assert_ok, assert_some};
    use recsynth_symbols::builder::CompilationBuilder;
    use recsynth_symbols::decl::CompilationDecl;
    use recsynth_symbols::{CancellationToken, Compilation};

    fn build(source: &str) -> Compilation {
        let decl = assert_ok!(CompilationDecl::from_ron(source));
        assert_ok!(CompilationBuilder::new(decl).build())
    }

    const TIED_COPY_CONSTRUCTORS: &str = r#"#![enable(implicit_some)]
    (types: [
        (name: "B", kind: Class, origin: Metadata, members: [
            Constructor(accessibility: Protected, parameters: [(name: "a", type: "B", custom_modifiers: 1)]),
            Constructor(accessibility: Protected, parameters: [(name: "b", type: "B", custom_modifiers: 1)]),
        ]),
        (name: "D", kind: Class, base: "B"),
    ])"#;

    #[test]
    fn test_tied_copy_constructors_are_not_found() {
        let compilation = build(TIED_COPY_CONSTRUCTORS);
        let published = PublishedRecords::new();
        let env = SymbolEnvironment::new(&compilation, &published);
        let b = assert_some!(compilation.lookup_type("B"));
        let d = assert_some!(compilation.lookup_type("D"));
        let reference = find_copy_constructor(&env, b, d);
        assert_none!(reference.found);
        assert!(reference.is_ambiguous);
    }

    #[test]
    fn test_fewer_custom_modifiers_win() {
        let compilation = build(
            r#"#![enable(implicit_some)]
            (types: [
                (name: "B", kind: Class, origin: Metadata, members: [
                    Constructor(accessibility: Protected, parameters: [(name: "a", type: "B", custom_modifiers: 2)]),
                    Constructor(accessibility: Protected, parameters: [(name: "b", type: "B", custom_modifiers: 2)]),
                    Constructor(accessibility: Protected, parameters: [(name: "c", type: "B")]),
                ]),
                (name: "D", kind: Class, base: "B"),
            ])"#,
        );
        let published = PublishedRecords::new();
        let env = SymbolEnvironment::new(&compilation, &published);
        let b = assert_some!(compilation.lookup_type("B"));
        let d = assert_some!(compilation.lookup_type("D"));
        let found = assert_some!(find_copy_constructor(&env, b, d).found);
        let MemberRef::Declared(id) = found else {
            panic!("expected a declared constructor");
        };
        assert_eq!(compilation.member(id).parameters()[0].name, "c");
    }

    #[test]
    fn test_inaccessible_copy_constructor_is_skipped() {
        let compilation = build(
            r#"#![enable(implicit_some)]
            (types: [
                (name: "B", kind: Class, origin: Metadata, members: [
                    Constructor(accessibility: Private, parameters: [(name: "a", type: "B")]),
                ]),
                (name: "D", kind: Class, base: "B"),
            ])"#,
        );
        let published = PublishedRecords::new();
        let env = SymbolEnvironment::new(&compilation, &published);
        let b = assert_some!(compilation.lookup_type("B"));
        let d = assert_some!(compilation.lookup_type("D"));
        let reference = find_copy_constructor(&env, b, d);
        assert_none!(reference.found);
        assert!(!reference.is_ambiguous);
    }

    #[test]
    fn test_clone_method_search() {
        let compilation = build(
            r#"(types: [
                (name: "B", kind: Class, origin: Metadata, members: [
                    Method(name: "<Clone>$", returns: "B", accessibility: Public, modifiers: [virtual]),
                ]),
                (name: "Plain", kind: Class, origin: Metadata, members: [
                    Method(name: "<Clone>$", returns: "Plain", accessibility: Public),
                ]),
                (name: "Two", kind: Class, origin: Metadata, members: [
                    Method(name: "<Clone>$", returns: "Two", accessibility: Public, modifiers: [virtual]),
                    Method(name: "<Clone>$", returns: "Two", accessibility: Public, modifiers: [abstract]),
                ]),
            ])"#,
        );
        let published = PublishedRecords::new();
        let env = SymbolEnvironment::new(&compilation, &published);
        let cancel = CancellationToken::new();
        let b = assert_some!(compilation.lookup_type("B"));
        assert_some!(assert_ok!(find_valid_clone_method(&env, b, &cancel)).found);
        let plain = assert_some!(compilation.lookup_type("Plain"));
        assert_none!(assert_ok!(find_valid_clone_method(&env, plain, &cancel)).found);
        let two = assert_some!(compilation.lookup_type("Two"));
        assert!(assert_ok!(find_valid_clone_method(&env, two, &cancel)).is_ambiguous);
        let object = compilation.object_type();
        assert_none!(assert_ok!(find_valid_clone_method(&env, object, &cancel)).found);
    }

    #[test]
    fn test_clone_search_observes_cancellation() {
        let compilation = build(
            r#"(types: [
                (name: "B", kind: Class, origin: Metadata, members: [
                    Method(name: "<Clone>$", returns: "B", accessibility: Public, modifiers: [virtual]),
                ]),
                (name: "NoClone", kind: Class, origin: Metadata),
            ])"#,
        );
        let published = PublishedRecords::new();
        let env = SymbolEnvironment::new(&compilation, &published);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let b = assert_some!(compilation.lookup_type("B"));
        assert!(find_valid_clone_method(&env, b, &cancel).is_err());
        // The fast path answers before looking at the token.
        let no_clone = assert_some!(compilation.lookup_type("NoClone"));
        assert_ok!(find_valid_clone_method(&env, no_clone, &cancel));
    }
}
