//! Incremental single-file static analysis for Python source.
//!
//! Text flows through the tokenizer and the recovering parser ([`stmt::parse_source`]),
//! the scope builder ([`resolve::ScopeBuilder`]) and the type checker ([`typ::check`]).
//! [`AnalysisSession`] owns one buffer and its latest [`AnalysisModel`];
//! [`completion::complete`] answers cursor queries against a model.

pub mod analysis;
pub mod ast;
pub mod completion;
pub mod config;
pub mod diagnostic;
pub mod expr;
pub mod op;
pub mod resolve;
pub mod stmt;
pub mod token;
pub mod typ;
pub mod util;

pub use analysis::{AnalysisModel, AnalysisSession, SessionId, SessionRegistry};
pub use completion::{CompletionItem, CompletionKind};
pub use config::AnalyzerConfig;
pub use diagnostic::{Diagnostic, Severity};
