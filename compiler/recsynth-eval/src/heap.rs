use bumpalo::collections::{String as BumpString, Vec as BumpVec};
use bumpalo::Bump;
use recsynth_symbols::{FieldRef, TypeId};
use std::cell::{Cell, RefCell};

/// A runtime value.
///
/// Record struct instances live on the heap like class instances. Plans never copy a struct
/// implicitly, so reference identity is indistinguishable from value identity for them.
#[derive(Debug, Clone, Copy)]
pub enum Value<'h> {
    Null,
    Bool(bool),
    Int(i32),
    Char(char),
    Str(&'h str),
    /// A `System.Type` instance.
    Type(TypeId),
    /// `EqualityComparer<T>.Default`
    Comparer,
    Builder(&'h RefCell<BumpString<'h>>),
    Object(&'h HeapObject<'h>),
}

impl Value<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime kind of a non-object value, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "System.Boolean",
            Value::Int(_) => "System.Int32",
            Value::Char(_) => "System.Char",
            Value::Str(_) => "System.String",
            Value::Type(_) => "System.Type",
            Value::Comparer => "System.Collections.Generic.EqualityComparer`1",
            Value::Builder(_) => "System.Text.StringBuilder",
            Value::Object(_) => "object",
        }
    }
}

/// An instance of a declared type.
#[derive(Debug)]
pub struct HeapObject<'h> {
    /// Allocation order, used for reference identity and the default hash code.
    pub id: u32,
    pub ty: TypeId,
    fields: RefCell<BumpVec<'h, (FieldRef, Value<'h>)>>,
}

impl<'h> HeapObject<'h> {
    /// The stored value, or `None` if the field was never assigned.
    pub fn get(&self, field: FieldRef) -> Option<Value<'h>> {
        self.fields
            .borrow()
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| *value)
    }

    pub fn set(&self, field: FieldRef, value: Value<'h>) {
        let mut fields = self.fields.borrow_mut();
        match fields.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => fields.push((field, value)),
        }
    }

    pub fn is(&self, other: &HeapObject<'h>) -> bool {
        std::ptr::eq(self, other)
    }
}

/// Bump allocated object heap.
///
/// Nothing is ever freed individually; the heap lives as long as the evaluation session.
pub struct Heap<'h> {
    allocator: &'h Bump,
    next_id: Cell<u32>,
}

impl<'h> Heap<'h> {
    pub fn new(bump: &'h Bump) -> Self {
        Self {
            allocator: bump,
            next_id: Cell::new(0),
        }
    }

    pub fn alloc_object(&self, ty: TypeId) -> &'h HeapObject<'h> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.allocator.alloc(HeapObject {
            id,
            ty,
            fields: RefCell::new(BumpVec::new_in(self.allocator)),
        })
    }

    pub fn alloc_str(&self, value: &str) -> &'h str {
        self.allocator.alloc_str(value)
    }

    pub fn alloc_builder(&self) -> &'h RefCell<BumpString<'h>> {
        self.allocator
            .alloc(RefCell::new(BumpString::new_in(self.allocator)))
    }

    /// Number of objects allocated so far.
    pub fn objects(&self) -> u32 {
        self.next_id.get()
    }
}

#[cfg(test)]
mod tests {
    use crate::heap::{Heap, Value};
    use bumpalo::Bump;
    use recsynth_macros::{assert_matches, assert_none, assert_some};
    use recsynth_symbols::{FieldRef, TypeId};

    #[test]
    fn test_fields_are_overwritten_in_place() {
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let object = heap.alloc_object(TypeId(3));
        let field = FieldRef::PositionalBacking {
            owner: TypeId(3),
            ordinal: 0,
        };
        assert_none!(object.get(field));
        object.set(field, Value::Int(1));
        object.set(field, Value::Int(2));
        let value = assert_some!(object.get(field));
        assert_matches!(value, Value::Int(2) => ());
    }

    #[test]
    fn test_objects_have_distinct_identity() {
        let bump = Bump::new();
        let heap = Heap::new(&bump);
        let a = heap.alloc_object(TypeId(0));
        let b = heap.alloc_object(TypeId(0));
        assert!(a.is(a));
        assert!(!a.is(b));
        assert_ne!(a.id, b.id);
        assert_eq!(heap.objects(), 2);
    }
}
