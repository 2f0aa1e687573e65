use crate::{op::BinOp, typ::Type};

/// Python's implicit numeric tower: `bool <= int <= float <= complex`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NumericClass {
    Bool,
    Int,
    Float,
    Complex,
}

pub struct NumericHierarchy;

impl NumericHierarchy {
    /// Classify a type into the numeric tower if possible.
    pub fn classify(ty: &Type) -> Option<NumericClass> {
        match ty {
            Type::Bool => Some(NumericClass::Bool),
            Type::Int => Some(NumericClass::Int),
            Type::Float => Some(NumericClass::Float),
            Type::Complex => Some(NumericClass::Complex),
            _ => None,
        }
    }

    pub fn widens_to(from: &Type, to: &Type) -> bool {
        match (Self::classify(from), Self::classify(to)) {
            (Some(a), Some(b)) => a <= b,
            _ => false,
        }
    }

    /// Convert a numeric class back to a type.
    pub fn to_type(class: NumericClass) -> Type {
        match class {
            NumericClass::Bool => Type::Bool,
            NumericClass::Int => Type::Int,
            NumericClass::Float => Type::Float,
            NumericClass::Complex => Type::Complex,
        }
    }

    /// Result of an arithmetic operator between two numbers, after promotion.
    /// Bitwise and shift operators are only defined up to `int`.
    pub fn result(op: BinOp, lhs: NumericClass, rhs: NumericClass) -> Option<Type> {
        let wider = lhs.max(rhs);
        match op {
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => match wider {
                NumericClass::Bool => Some(Type::Bool),
                NumericClass::Int => Some(Type::Int),
                _ => None,
            },
            BinOp::LShift | BinOp::RShift => (wider <= NumericClass::Int).then_some(Type::Int),
            BinOp::MatMul => None,
            BinOp::Div => Some(Self::to_type(wider.max(NumericClass::Float))),
            BinOp::FloorDiv | BinOp::Mod if wider == NumericClass::Complex => None,
            _ => Some(Self::to_type(wider.max(NumericClass::Int))),
        }
    }
}
