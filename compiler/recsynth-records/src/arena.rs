use crate::member::{LexicalSortKey, MemberDescriptor, SynthesizedMemberKind};
use recsynth_diagnostics::ice;
use recsynth_symbols::TypeId;
use rustc_hash::FxHashMap;

/// Handle of a synthesized member: the record it belongs to and its position in metadata order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MemberHandle {
    pub owner: TypeId,
    pub index: u32,
}

/// The ordered synthesized members of one record, indexed by kind.
///
/// Sibling lookups go through the kind index. A kind can only be added once per record.
#[derive(Debug, Clone)]
pub struct SynthesizedMembers {
    owner: TypeId,
    descriptors: Vec<MemberDescriptor>,
    index: FxHashMap<SynthesizedMemberKind, u32>,
}

impl SynthesizedMembers {
    pub fn new(owner: TypeId) -> Self {
        Self {
            owner,
            descriptors: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    /// Append a descriptor, assigning it the next member offset.
    pub fn push(&mut self, mut descriptor: MemberDescriptor) -> MemberHandle {
        let index = self.descriptors.len() as u32;
        if self.index.insert(descriptor.kind, index).is_some() {
            ice!(format!(
                "{:?} synthesized twice for the same record",
                descriptor.kind
            ));
        }
        descriptor.sort_key = LexicalSortKey(index);
        self.descriptors.push(descriptor);
        MemberHandle {
            owner: self.owner,
            index,
        }
    }

    pub fn handle(&self, kind: SynthesizedMemberKind) -> Option<MemberHandle> {
        self.index.get(&kind).map(|index| MemberHandle {
            owner: self.owner,
            index: *index,
        })
    }

    pub fn get(&self, kind: SynthesizedMemberKind) -> Option<&MemberDescriptor> {
        self.index
            .get(&kind)
            .map(|index| &self.descriptors[*index as usize])
    }

    pub fn descriptor(&self, handle: MemberHandle) -> &MemberDescriptor {
        if handle.owner != self.owner {
            ice!("member handle used with the arena of another record");
        }
        self.descriptors
            .get(handle.index as usize)
            .unwrap_or_else(|| ice!("member handle out of range"))
    }

    pub fn descriptors(&self) -> &[MemberDescriptor] {
        &self.descriptors
    }

    pub fn handles(&self) -> impl Iterator<Item = MemberHandle> + '_ {
        (0..self.descriptors.len() as u32).map(|index| MemberHandle {
            owner: self.owner,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn into_parts(self) -> (Vec<MemberDescriptor>, FxHashMap<SynthesizedMemberKind, u32>) {
        (self.descriptors, self.index)
    }
}
