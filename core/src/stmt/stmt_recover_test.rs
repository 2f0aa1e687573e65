#[cfg(test)]
mod tests {
    use crate::stmt::{StmtKind, parse_source};

    #[test]
    fn test_missing_colon_reported_at_end_of_header() {
        let (program, errs) = parse_source("def foo()\n    pass");
        assert_eq!(errs.len(), 1, "{:?}", errs);
        assert_eq!(errs[0].message, "Expected ':', found newline");
        assert_eq!(errs[0].span.start.line, 1);
        assert_eq!(errs[0].span.start.column, 10);
        // the function and its body survive
        match &program.statements[0].kind {
            StmtKind::FunctionDef(def) => {
                assert_eq!(def.name, "foo");
                assert_eq!(def.body.len(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_stmt_recovery_collects_multiple_errors() {
        let code = "a = 1\nif a > :\n    pass\nb = \nc = (1 + \nd = 4\n";
        let (program, errs) = parse_source(code);
        assert!(errs.len() >= 2, "expected multiple errors, got {:?}", errs);
        // statements after the broken ones are still parsed
        let last = program.statements.last().map(|s| &s.kind);
        assert!(matches!(last, Some(StmtKind::Assign { .. })));
    }

    #[test]
    fn test_missing_value_becomes_error_expression() {
        let (program, errs) = parse_source("x = \ny = 2\n");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.starts_with("Expected an expression"));
        match &program.statements[0].kind {
            StmtKind::Assign { targets, value } => {
                assert_eq!(targets[0].name(), Some("x"));
                assert!(value.is_error());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_missing_indented_block() {
        let (program, errs) = parse_source("def f():\nx = 1\n");
        assert!(errs.iter().any(|e| e.message.starts_with("Expected an indented block")));
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_unexpected_indent_keeps_statements() {
        let (program, errs) = parse_source("x = 1\n    y = 2\nz = 3\n");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].message, "Unexpected indentation");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn test_broken_header_swallows_its_block() {
        let (program, errs) = parse_source("class :\n    x = 1\ny = 2\n");
        assert_eq!(errs.len(), 1, "{:?}", errs);
        assert!(program.statements[0].is_error());
        assert!(matches!(program.statements[1].kind, StmtKind::Assign { .. }));
    }

    #[test]
    fn test_lex_errors_are_merged_in_order() {
        let (_, errs) = parse_source("x = 'open\ny = $\n");
        assert!(errs.len() >= 2, "{:?}", errs);
        assert!(errs[0].message.contains("Missing closing quote"));
        assert!(errs.windows(2).all(|w| w[0].span.start <= w[1].span.start));
    }

    #[test]
    fn test_arbitrary_garbage_never_panics() {
        for src in [")", "(((", "def", "class", "@", "lambda", "if", "else:", "]]]\n\t\tx", "from . import", "x ="] {
            let _ = parse_source(src);
        }
    }
}
