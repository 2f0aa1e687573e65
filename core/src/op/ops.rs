use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Invert,
}

impl UnaryOp {
    pub(crate) fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Plus => Some(UnaryOp::Pos),
            Token::Tilde => Some(UnaryOp::Invert),
            _ => None,
        }
    }

    /// Dunder method a class may define to support this operator.
    pub fn dunder(&self) -> &'static str {
        match self {
            UnaryOp::Not => "__bool__",
            UnaryOp::Neg => "__neg__",
            UnaryOp::Pos => "__pos__",
            UnaryOp::Invert => "__invert__",
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "not"),
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Pos => write!(f, "+"),
            UnaryOp::Invert => write!(f, "~"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    MatMul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinOp {
    pub(crate) fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Star => BinOp::Mul,
            Token::At => BinOp::MatMul,
            Token::Slash => BinOp::Div,
            Token::DoubleSlash => BinOp::FloorDiv,
            Token::Percent => BinOp::Mod,
            Token::DoubleStar => BinOp::Pow,
            Token::LShift => BinOp::LShift,
            Token::RShift => BinOp::RShift,
            Token::Pipe => BinOp::BitOr,
            Token::Caret => BinOp::BitXor,
            Token::Amp => BinOp::BitAnd,
            _ => return None,
        })
    }

    /// Operator for an augmented assignment token such as `+=`.
    pub(crate) fn from_aug_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::PlusEq => BinOp::Add,
            Token::MinusEq => BinOp::Sub,
            Token::StarEq => BinOp::Mul,
            Token::AtEq => BinOp::MatMul,
            Token::SlashEq => BinOp::Div,
            Token::DoubleSlashEq => BinOp::FloorDiv,
            Token::PercentEq => BinOp::Mod,
            Token::DoubleStarEq => BinOp::Pow,
            Token::LShiftEq => BinOp::LShift,
            Token::RShiftEq => BinOp::RShift,
            Token::PipeEq => BinOp::BitOr,
            Token::CaretEq => BinOp::BitXor,
            Token::AmpEq => BinOp::BitAnd,
            _ => return None,
        })
    }

    pub fn dunder(&self) -> &'static str {
        match self {
            BinOp::Add => "__add__",
            BinOp::Sub => "__sub__",
            BinOp::Mul => "__mul__",
            BinOp::MatMul => "__matmul__",
            BinOp::Div => "__truediv__",
            BinOp::FloorDiv => "__floordiv__",
            BinOp::Mod => "__mod__",
            BinOp::Pow => "__pow__",
            BinOp::LShift => "__lshift__",
            BinOp::RShift => "__rshift__",
            BinOp::BitOr => "__or__",
            BinOp::BitXor => "__xor__",
            BinOp::BitAnd => "__and__",
        }
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::MatMul => "@",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
}

impl Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoolOp::And => write!(f, "and"),
            BoolOp::Or => write!(f, "or"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    pub(crate) fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::EqEq => CmpOp::Eq,
            Token::NotEq => CmpOp::NotEq,
            Token::Lt => CmpOp::Lt,
            Token::Le => CmpOp::LtE,
            Token::Gt => CmpOp::Gt,
            Token::Ge => CmpOp::GtE,
            Token::Is => CmpOp::Is,
            Token::In => CmpOp::In,
            _ => return None,
        })
    }
}

impl Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        };
        write!(f, "{}", s)
    }
}
