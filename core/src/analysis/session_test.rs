#[cfg(test)]
mod tests {
    use crate::analysis::{AnalysisModel, AnalysisSession, SessionId, SessionRegistry};
    use crate::config::AnalyzerConfig;
    use crate::diagnostic::Severity;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn empty_session_answers_with_nothing() {
        let session = AnalysisSession::new();
        assert!(!session.is_ready());
        assert!(session.get_diagnostics().is_empty());
        assert!(session.get_autocomplete_suggestions(1, 1).is_empty());
    }

    #[test]
    fn valid_code_has_no_diagnostics() {
        let session = AnalysisSession::new();
        session.update_source("def add(a: int, b: int) -> int:\n    return a + b\n\ntotal = add(1, 2)\n");
        assert!(session.is_ready());
        assert_eq!(session.get_diagnostics(), vec![]);
    }

    #[test]
    fn empty_buffer_is_valid_input() {
        let session = AnalysisSession::new();
        session.update_source("");
        assert!(session.is_ready());
        assert!(session.get_diagnostics().is_empty());
        let _ = session.get_autocomplete_suggestions(1, 1);
    }

    #[test]
    fn missing_colon_is_reported_on_the_header_line() {
        let session = AnalysisSession::new();
        session.update_source("def foo()\n    pass");
        let diagnostics = session.get_diagnostics();
        let d = diagnostics
            .iter()
            .find(|d| d.code == "parse-error")
            .expect("parse error reported");
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.start_line, 1);
        assert_eq!(d.start_column, 10);
        assert!(d.message.contains(':'));
    }

    #[test]
    fn bad_assignment_is_reported() {
        let session = AnalysisSession::new();
        session.update_source("a: int = 'hello'");
        let diagnostics = session.get_diagnostics();
        assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
        assert_eq!(diagnostics[0].code, "bad-assignment");
        assert!(diagnostics[0].message.contains("not assignable to 'int'"));
        assert_eq!(diagnostics[0].start_line, 1);
    }

    #[test]
    fn queries_are_idempotent() {
        let session = AnalysisSession::new();
        session.update_source("x: str = 1\ny = undefined_thing\n");
        let first = session.get_diagnostics();
        assert_eq!(first.len(), 2);
        assert_eq!(first, session.get_diagnostics());
        assert_eq!(
            session.get_autocomplete_suggestions(2, 5),
            session.get_autocomplete_suggestions(2, 5)
        );
    }

    #[test]
    fn updates_replace_everything() {
        let session = AnalysisSession::new();
        session.update_source("old_name = 1\nbad: int = 'x'\n");
        assert!(!session.get_diagnostics().is_empty());
        let before = session.model().expect("model");

        session.update_source("new_name = 2\nnew_");
        assert!(session.get_diagnostics().iter().all(|d| d.code != "bad-assignment"));
        let labels: Vec<String> = session
            .get_autocomplete_suggestions(2, 5)
            .into_iter()
            .map(|i| i.label)
            .collect();
        assert!(labels.contains(&"new_name".to_string()));
        assert!(!labels.iter().any(|l| l == "old_name"));

        let after = session.model().expect("model");
        assert_eq!(before.version() + 1, after.version());
        // the old snapshot is untouched
        assert_eq!(before.source(), "old_name = 1\nbad: int = 'x'\n");
    }

    #[test]
    fn diagnostics_are_sorted_and_capped() {
        let config = AnalyzerConfig {
            max_diagnostics: 2,
            ..AnalyzerConfig::default()
        };
        let session = AnalysisSession::with_config(Arc::new(config));
        session.update_source("c = zz\nb = yy\na = xx\n");
        let diagnostics = session.get_diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].start_line, 1);
        assert_eq!(diagnostics[1].start_line, 2);
    }

    #[test]
    fn config_switches_reach_the_checker() {
        let config = AnalyzerConfig {
            report_unknown_names: false,
            ..AnalyzerConfig::default()
        };
        let session = AnalysisSession::with_config(Arc::new(config));
        session.update_source("print(nowhere)\n");
        assert!(session.get_diagnostics().is_empty());
    }

    #[test]
    fn model_positions() {
        let model = AnalysisModel::build("ab\r\ncd\n", 1, &AnalyzerConfig::default());
        assert_eq!(model.line(1), Some("ab"));
        assert_eq!(model.line(3), Some(""));
        assert_eq!(model.line(4), None);
        assert_eq!(model.position(2, 3).map(|p| p.offset), Some(6));
        assert!(model.position(2, 4).is_none());
        assert!(model.position(0, 1).is_none());
        assert!(model.position(1, 0).is_none());

        let broken = AnalysisModel::build("def (", 1, &AnalyzerConfig::default());
        assert!(broken.has_errors());
        assert!(!AnalysisModel::build("pass\n", 1, &AnalyzerConfig::default()).has_errors());
    }

    #[test]
    fn concurrent_queries_see_whole_models() {
        let session = Arc::new(AnalysisSession::new());
        session.update_source("a: int = 'x'\n");
        thread::scope(|s| {
            let writer = session.clone();
            s.spawn(move || {
                for i in 0..20 {
                    if i % 2 == 0 {
                        writer.update_source("b = 1\n");
                    } else {
                        writer.update_source("a: int = 'x'\n");
                    }
                }
            });
            for _ in 0..4 {
                let reader = session.clone();
                s.spawn(move || {
                    for _ in 0..50 {
                        let n = reader.get_diagnostics().len();
                        assert!(n == 0 || n == 1);
                    }
                });
            }
        });
        assert!(session.model().expect("model").version() >= 21);
    }

    #[test]
    fn registry_manages_independent_sessions() {
        let registry = SessionRegistry::default();
        assert!(registry.is_empty());
        let a = registry.create();
        let b = registry.create();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.update(a, "x: int = 'no'\n"));
        assert!(registry.update(b, "y = 1\n"));
        assert_eq!(registry.diagnostics(a).len(), 1);
        assert!(registry.diagnostics(b).is_empty());
        assert!(registry.completions(b, 2, 1).iter().any(|i| i.label == "y"));

        assert!(registry.close(a));
        assert!(!registry.close(a));
        assert!(registry.diagnostics(a).is_empty());
        assert!(!registry.update(a, "z = 1"));
        assert_eq!(registry.len(), 1);

        let ghost = SessionId(999);
        assert!(registry.completions(ghost, 1, 1).is_empty());
        assert!(registry.get(ghost).is_none());
    }

    #[test]
    fn registry_sessions_work_across_threads() {
        let registry = Arc::new(SessionRegistry::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let id = registry.create();
                    registry.update(id, &format!("value_{i} = {i}\nvalue_"));
                    let items = registry.completions(id, 2, 7);
                    assert!(items.iter().any(|item| item.label == format!("value_{i}")));
                    id
                })
            })
            .collect();
        let ids: Vec<SessionId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.len(), 4);
        for id in ids {
            assert!(registry.close(id));
        }
        assert!(registry.is_empty());
    }
}
