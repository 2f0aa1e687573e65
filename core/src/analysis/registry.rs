use super::AnalysisSession;
use crate::{completion::CompletionItem, config::AnalyzerConfig, diagnostic::Diagnostic};
use dashmap::DashMap;
use serde::Serialize;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Independent sessions keyed by id, usable from any thread.
///
/// Sessions are handed out as `Arc`s so long analyses never hold a map shard lock.
/// Unknown ids are not errors: queries return nothing and mutations return `false`.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<AnalysisSession>>,
    next_id: AtomicU64,
    config: Arc<AnalyzerConfig>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl SessionRegistry {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            config: Arc::new(config),
        }
    }

    pub fn create(&self) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.sessions
            .insert(id, Arc::new(AnalysisSession::with_config(self.config.clone())));
        debug!(%id, open = self.sessions.len(), "session created");
        id
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<AnalysisSession>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn update(&self, id: SessionId, text: &str) -> bool {
        match self.get(id) {
            Some(session) => {
                session.update_source(text);
                true
            }
            None => false,
        }
    }

    pub fn diagnostics(&self, id: SessionId) -> Vec<Diagnostic> {
        self.get(id).map(|s| s.get_diagnostics()).unwrap_or_default()
    }

    pub fn completions(&self, id: SessionId, line: u32, column: u32) -> Vec<CompletionItem> {
        self.get(id)
            .map(|s| s.get_autocomplete_suggestions(line, column))
            .unwrap_or_default()
    }

    pub fn close(&self, id: SessionId) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            debug!(%id, open = self.sessions.len(), "session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
