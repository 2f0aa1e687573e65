pub mod annotation;
pub mod builtins;
pub mod members;
pub mod modules;
mod numeric;
mod type_checker;
mod type_system;

#[cfg(test)]
mod members_test;

pub use members::{MemberInfo, MemberKind, MemberLookup};
pub use numeric::{NumericClass, NumericHierarchy};
pub use type_checker::*;
pub use type_system::*;
