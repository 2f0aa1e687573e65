use crate::{
    config::AnalyzerConfig,
    diagnostic::{self, Diagnostic},
    resolve::{ScopeBuilder, ScopeTree},
    stmt::{Program, parse_source},
    token::{ParseError, Position},
    typ::{self, TypeError},
};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::Instant,
};
use tracing::{debug, error};

/// Everything derived from one version of a buffer. Immutable once built.
#[derive(Debug)]
pub struct AnalysisModel {
    source: String,
    program: Program,
    scopes: ScopeTree,
    diagnostics: Vec<Diagnostic>,
    version: u64,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

impl AnalysisModel {
    /// Parse, resolve and type check `source`. Never fails: a fault in any stage
    /// is logged and the model keeps whatever the earlier stages produced.
    pub fn build(source: impl Into<String>, version: u64, config: &AnalyzerConfig) -> Self {
        let source = source.into();
        let started = Instant::now();

        let (program, parse_errors) = match panic::catch_unwind(AssertUnwindSafe(|| parse_source(&source))) {
            Ok(parsed) => parsed,
            Err(payload) => {
                error!(version, "parser panicked: {}", panic_message(payload.as_ref()));
                (Program::new(Vec::new()), Vec::<ParseError>::new())
            }
        };

        let options = config.checker_options();
        let checked = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut scopes = ScopeBuilder::build(&program);
            let errors = typ::check(&program, &mut scopes, options);
            (scopes, errors)
        }));
        let (scopes, type_errors) = match checked {
            Ok(checked) => checked,
            Err(payload) => {
                error!(version, "semantic analysis panicked: {}", panic_message(payload.as_ref()));
                (ScopeTree::default(), Vec::<TypeError>::new())
            }
        };

        let parse_count = parse_errors.len();
        let type_count = type_errors.len();
        let merged = parse_errors
            .into_iter()
            .map(Diagnostic::from)
            .chain(type_errors.into_iter().map(Diagnostic::from))
            .collect();
        let diagnostics = diagnostic::normalize(merged, config.max_diagnostics);

        debug!(
            version,
            chars = source.chars().count(),
            statements = program.statement_count(),
            scopes = scopes.len(),
            bindings = scopes.binding_count(),
            parse_errors = parse_count,
            type_errors = type_count,
            reported = diagnostics.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "analysis finished"
        );

        Self {
            source,
            program,
            scopes,
            diagnostics,
            version,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Monotonic counter of the update that produced this model (first update is 1).
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Text of the 1-indexed `line` without its line terminator.
    pub fn line(&self, line: u32) -> Option<&str> {
        let idx = (line as usize).checked_sub(1)?;
        self.source
            .split('\n')
            .nth(idx)
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
    }

    /// Validate a 1-indexed cursor position and attach its char offset. A cursor may
    /// sit one column past the last character of its line.
    pub fn position(&self, line: u32, column: u32) -> Option<Position> {
        if column == 0 {
            return None;
        }
        let text = self.line(line)?;
        if column as usize > text.chars().count() + 1 {
            return None;
        }
        let preceding: usize = self
            .source
            .split('\n')
            .take(line as usize - 1)
            .map(|l| l.chars().count() + 1)
            .sum();
        Some(Position::new(line, column, preceding + column as usize - 1))
    }
}
