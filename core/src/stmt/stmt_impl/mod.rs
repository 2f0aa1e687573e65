mod ast;

pub use ast::{ClassDef, ExceptHandler, FunctionDef, Identifier, Program, Stmt, StmtKind, WithItem};
