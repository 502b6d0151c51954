//! Body plans.
//!
//! A body plan is the abstract statement sequence a synthesized member lowers to. It is not yet
//! code: calls name their target member, field accesses name a [`FieldRef`], and conversions are
//! explicit. The evaluator in `recsynth-eval` interprets plans directly.

use crate::env::MemberRef;
use recsynth_symbols::{FieldRef, TypeRef, WellKnownMember};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BodyPlan {
    Block(Vec<PlanStmt>),
    /// Always throws. Substituted when the body cannot be built from an inconsistent state.
    Poisoned,
    /// Abstract members have no body.
    Abstract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocalId(pub u32);

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PlanStmt {
    Expr(PlanExpr),
    Let {
        local: LocalId,
        value: PlanExpr,
    },
    Return(Option<PlanExpr>),
    If {
        condition: PlanExpr,
        then: Vec<PlanStmt>,
    },
    AssignField {
        receiver: PlanExpr,
        field: FieldRef,
        value: PlanExpr,
    },
    AssignOut {
        parameter: u32,
        value: PlanExpr,
    },
    BaseConstructorCall {
        constructor: MemberRef,
        arguments: Vec<PlanExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MethodRef {
    Member(MemberRef),
    WellKnown {
        member: WellKnownMember,
        type_argument: Option<TypeRef>,
    },
}

impl MethodRef {
    pub fn well_known(member: WellKnownMember) -> Self {
        Self::WellKnown {
            member,
            type_argument: None,
        }
    }

    pub fn generic(member: WellKnownMember, type_argument: TypeRef) -> Self {
        Self::WellKnown {
            member,
            type_argument: Some(type_argument),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PlanExpr {
    This,
    /// `base` as a receiver. Calls through it are non-virtual.
    Base,
    Parameter(u32),
    Local(LocalId),
    Null,
    Bool(bool),
    Int(i32),
    Str(String),
    Char(char),
    TypeOf(TypeRef),
    Field {
        receiver: Box<PlanExpr>,
        field: FieldRef,
    },
    Property {
        receiver: Box<PlanExpr>,
        property: MemberRef,
    },
    /// A call. Static calls have no receiver.
    Call {
        receiver: Option<Box<PlanExpr>>,
        method: MethodRef,
        arguments: Vec<PlanExpr>,
    },
    New {
        constructor: MethodRef,
        ty: TypeRef,
        arguments: Vec<PlanExpr>,
    },
    /// Reference equality, `(object)lhs == rhs`.
    ObjectEqual(Box<PlanExpr>, Box<PlanExpr>),
    ObjectNotEqual(Box<PlanExpr>, Box<PlanExpr>),
    And(Box<PlanExpr>, Box<PlanExpr>),
    Or(Box<PlanExpr>, Box<PlanExpr>),
    Not(Box<PlanExpr>),
    As {
        operand: Box<PlanExpr>,
        ty: TypeRef,
    },
    Is {
        operand: Box<PlanExpr>,
        ty: TypeRef,
    },
    Convert {
        operand: Box<PlanExpr>,
        ty: TypeRef,
    },
    /// Wrapping 32-bit addition.
    IntAdd(Box<PlanExpr>, Box<PlanExpr>),
    /// Wrapping 32-bit multiplication.
    IntMul(Box<PlanExpr>, Box<PlanExpr>),
}

impl PlanExpr {
    pub fn field(receiver: PlanExpr, field: FieldRef) -> Self {
        Self::Field {
            receiver: Box::new(receiver),
            field,
        }
    }

    pub fn property(receiver: PlanExpr, property: MemberRef) -> Self {
        Self::Property {
            receiver: Box::new(receiver),
            property,
        }
    }

    pub fn call(receiver: PlanExpr, method: MethodRef, arguments: Vec<PlanExpr>) -> Self {
        Self::Call {
            receiver: Some(Box::new(receiver)),
            method,
            arguments,
        }
    }

    pub fn call_static(method: MethodRef, arguments: Vec<PlanExpr>) -> Self {
        Self::Call {
            receiver: None,
            method,
            arguments,
        }
    }

    pub fn convert(operand: PlanExpr, ty: TypeRef) -> Self {
        Self::Convert {
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn object_equal(lhs: PlanExpr, rhs: PlanExpr) -> Self {
        Self::ObjectEqual(Box::new(lhs), Box::new(rhs))
    }

    pub fn object_not_equal(lhs: PlanExpr, rhs: PlanExpr) -> Self {
        Self::ObjectNotEqual(Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: PlanExpr, rhs: PlanExpr) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: PlanExpr, rhs: PlanExpr) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(operand: PlanExpr) -> Self {
        Self::Not(Box::new(operand))
    }

    /// Left-nested conjunction of the operands, or `None` if there are none.
    pub fn conjunction(operands: impl IntoIterator<Item = PlanExpr>) -> Option<PlanExpr> {
        operands.into_iter().reduce(PlanExpr::and)
    }
}

#[cfg(test)]
mod tests {
    use crate::plan::PlanExpr;
    use recsynth_macros::{assert_matches, assert_none, assert_some};

    #[test]
    fn test_conjunction_nests_to_the_left() {
        let expr = assert_some!(PlanExpr::conjunction([
            PlanExpr::Bool(true),
            PlanExpr::Bool(false),
            PlanExpr::Int(1),
        ]));
        let (lhs, rhs) = assert_matches!(expr, PlanExpr::And(lhs, rhs) => (lhs, rhs));
        assert_eq!(*rhs, PlanExpr::Int(1));
        assert_matches!(*lhs, PlanExpr::And(_, _) => ());
        assert_none!(PlanExpr::conjunction(std::iter::empty()));
    }
}
