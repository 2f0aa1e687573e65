//! Buffer ownership: models, sessions and the multi-session registry.

mod model;
mod registry;
mod session;

#[cfg(test)]
mod session_test;

pub use model::AnalysisModel;
pub use registry::{SessionId, SessionRegistry};
pub use session::AnalysisSession;
