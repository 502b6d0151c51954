//! User-declared members that match the signature of a synthesized record member.

use crate::member::SynthesizedMemberKind;
use recsynth_symbols::{
    Compilation, MemberId, MemberSymbol, RefKind, TypeId, TypeRef, WellKnownType,
};

/// Declared members of a record, grouped by the synthesized member they stand for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitMembers {
    pub equals_typed: Option<MemberId>,
    pub get_hash_code: Option<MemberId>,
    pub to_string: Option<MemberId>,
    pub print_members: Option<MemberId>,
    pub deconstruct: Option<MemberId>,
    pub equality_contract: Option<MemberId>,
    pub copy_constructor: Option<MemberId>,
    /// A constructor with the parameter list of the primary constructor.
    pub primary_constructor: Option<MemberId>,
    pub equals_object: Option<MemberId>,
    pub base_equals: Option<MemberId>,
    pub equality_operator: Option<MemberId>,
    pub inequality_operator: Option<MemberId>,
    /// Members named `Clone`, which records may not declare.
    pub clones: Vec<MemberId>,
}

fn has_parameters(member: &MemberSymbol, types: &[TypeRef]) -> bool {
    let parameters = member.parameters();
    parameters.len() == types.len()
        && parameters
            .iter()
            .zip(types)
            .all(|(p, ty)| p.ref_kind == RefKind::None && p.ty.equals_ignoring_options(ty))
}

impl ExplicitMembers {
    pub fn collect(compilation: &Compilation, ty: TypeId) -> Self {
        let symbol = compilation.ty(ty);
        let this = compilation.type_ref(ty);
        let base = symbol
            .base
            .filter(|base| !symbol.is_struct() && !compilation.is_object(*base))
            .map(|base| compilation.type_ref(base));
        let primary = symbol
            .primary_constructor
            .as_ref()
            .map(|ctor| ctor.parameters.iter().map(|p| p.ty.clone()).collect::<Vec<_>>());
        let string_builder = TypeRef::well_known(WellKnownType::StringBuilder);
        let operands = [this.clone(), this.clone()];

        let mut explicit = Self::default();
        for member in compilation.members_of(ty) {
            let slot = match member.name.as_str() {
                "Equals" if member.is_method() => {
                    if has_parameters(member, std::slice::from_ref(&this)) {
                        Some(&mut explicit.equals_typed)
                    } else if has_parameters(member, &[TypeRef::object()]) {
                        Some(&mut explicit.equals_object)
                    } else if base
                        .as_ref()
                        .is_some_and(|base| has_parameters(member, std::slice::from_ref(base)))
                    {
                        Some(&mut explicit.base_equals)
                    } else {
                        None
                    }
                }
                "GetHashCode" if member.is_method() && has_parameters(member, &[]) => {
                    Some(&mut explicit.get_hash_code)
                }
                "ToString" if member.is_method() && has_parameters(member, &[]) => {
                    Some(&mut explicit.to_string)
                }
                "PrintMembers"
                    if member.is_method()
                        && has_parameters(member, std::slice::from_ref(&string_builder)) =>
                {
                    Some(&mut explicit.print_members)
                }
                "Deconstruct" if member.is_method() => {
                    let matches = primary.as_ref().is_some_and(|types| {
                        let parameters = member.parameters();
                        parameters.len() == types.len()
                            && parameters.iter().zip(types).all(|(p, ty)| {
                                p.ref_kind == RefKind::Out && p.ty.equals_ignoring_options(ty)
                            })
                    });
                    matches.then_some(&mut explicit.deconstruct)
                }
                "EqualityContract" if member.is_property() && !member.is_indexer() => {
                    Some(&mut explicit.equality_contract)
                }
                "op_Equality" if member.is_operator() && has_parameters(member, &operands) => {
                    Some(&mut explicit.equality_operator)
                }
                "op_Inequality" if member.is_operator() && has_parameters(member, &operands) => {
                    Some(&mut explicit.inequality_operator)
                }
                _ if member.is_constructor() && !member.is_static() => {
                    if has_parameters(member, std::slice::from_ref(&this)) {
                        Some(&mut explicit.copy_constructor)
                    } else if primary
                        .as_ref()
                        .is_some_and(|types| has_parameters(member, types))
                    {
                        Some(&mut explicit.primary_constructor)
                    } else {
                        None
                    }
                }
                "Clone" if symbol.is_record_class() => {
                    explicit.clones.push(member.id);
                    None
                }
                _ => None,
            };
            if let Some(slot) = slot {
                if slot.is_none() {
                    *slot = Some(member.id);
                }
            }
        }
        explicit
    }

    /// The declared member that replaces the synthesized member of this kind.
    ///
    /// Only kinds whose synthesis a declaration suppresses are answered. Declarations of the other
    /// kinds are reported as duplicates and the synthesized member is kept.
    pub fn replacement(&self, kind: SynthesizedMemberKind) -> Option<MemberId> {
        match kind {
            SynthesizedMemberKind::EqualsTyped => self.equals_typed,
            SynthesizedMemberKind::GetHashCode => self.get_hash_code,
            SynthesizedMemberKind::ToString => self.to_string,
            SynthesizedMemberKind::PrintMembers => self.print_members,
            SynthesizedMemberKind::Deconstruct => self.deconstruct,
            SynthesizedMemberKind::EqualityContract => self.equality_contract,
            SynthesizedMemberKind::CopyConstructor => self.copy_constructor,
            _ => None,
        }
    }

    /// Declarations of members that are always synthesized, with the kind they collide with.
    pub fn duplicates(&self) -> Vec<(MemberId, SynthesizedMemberKind)> {
        [
            (self.primary_constructor, SynthesizedMemberKind::PrimaryConstructor),
            (self.equals_object, SynthesizedMemberKind::EqualsObject),
            (self.base_equals, SynthesizedMemberKind::BaseEquals),
            (self.inequality_operator, SynthesizedMemberKind::InequalityOperator),
            (self.equality_operator, SynthesizedMemberKind::EqualityOperator),
        ]
        .into_iter()
        .filter_map(|(member, kind)| member.map(|m| (m, kind)))
        .collect()
    }
}
