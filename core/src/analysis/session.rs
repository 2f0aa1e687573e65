use super::AnalysisModel;
use crate::{
    completion::{self, CompletionItem},
    config::AnalyzerConfig,
    diagnostic::Diagnostic,
};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::{error, trace};

/// Owner of one buffer and its latest model.
///
/// The session starts empty; every [`update_source`](Self::update_source) builds a
/// fresh model outside the lock and swaps it in whole, so queries never see a
/// half-built model. Queries clone the current `Arc` and run without holding the lock.
#[derive(Debug)]
pub struct AnalysisSession {
    config: Arc<AnalyzerConfig>,
    model: RwLock<Option<Arc<AnalysisModel>>>,
    updates: AtomicU64,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::with_config(Arc::new(AnalyzerConfig::default()))
    }

    pub fn with_config(config: Arc<AnalyzerConfig>) -> Self {
        Self {
            config,
            model: RwLock::new(None),
            updates: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Replace the buffer with `text` and rebuild the model. Accepts any string.
    pub fn update_source(&self, text: &str) {
        let version = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        let model = Arc::new(AnalysisModel::build(text, version, &self.config));

        let mut slot = self.model.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        // A racing update that started later may already have installed its model.
        if slot.as_ref().is_some_and(|current| current.version() > version) {
            trace!(version, "discarding superseded model");
            return;
        }
        *slot = Some(model);
    }

    /// Current model, `None` before the first update.
    pub fn model(&self) -> Option<Arc<AnalysisModel>> {
        self.model.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn is_ready(&self) -> bool {
        self.model().is_some()
    }

    pub fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.model().map(|m| m.diagnostics().to_vec()).unwrap_or_default()
    }

    /// Completion candidates at the 1-indexed `line`/`column`; empty when the session
    /// has no model yet or the position lies outside the buffer.
    pub fn get_autocomplete_suggestions(&self, line: u32, column: u32) -> Vec<CompletionItem> {
        let Some(model) = self.model() else {
            return Vec::new();
        };
        panic::catch_unwind(AssertUnwindSafe(|| completion::complete(&model, line, column, &self.config)))
            .unwrap_or_else(|_| {
                error!(line, column, version = model.version(), "completion panicked");
                Vec::new()
            })
    }
}
