#[cfg(test)]
mod tests {
    use crate::expr::ExprKind;
    use crate::op::BinOp;
    use crate::stmt::{StmtKind, parse_source};

    fn parse_ok(src: &str) -> crate::stmt::Program {
        let (program, errs) = parse_source(src);
        assert!(errs.is_empty(), "unexpected errors: {:?}", errs);
        program
    }

    #[test]
    fn test_assignments() {
        let program = parse_ok("a = b = 1\nx, *y = items\nc: int = 3\nd += 1\n");
        assert_eq!(program.statements.len(), 4);
        match &program.statements[0].kind {
            StmtKind::Assign { targets, .. } => assert_eq!(targets.len(), 2),
            other => panic!("{:?}", other),
        }
        match &program.statements[1].kind {
            StmtKind::Assign { targets, .. } => assert!(matches!(targets[0].kind, ExprKind::Tuple(_))),
            other => panic!("{:?}", other),
        }
        assert!(matches!(program.statements[2].kind, StmtKind::AnnAssign { .. }));
        assert!(matches!(
            program.statements[3].kind,
            StmtKind::AugAssign { op: BinOp::Add, .. }
        ));
    }

    #[test]
    fn test_if_elif_else() {
        let program = parse_ok("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
        match &program.statements[0].kind {
            StmtKind::If { body, orelse, .. } => {
                assert_eq!(body.len(), 1);
                assert!(matches!(orelse[0].kind, StmtKind::If { .. }));
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_loops_and_try() {
        let src = "\
for i, v in enumerate(xs):
    continue
else:
    pass
while True:
    break
try:
    risky()
except (ValueError, KeyError) as e:
    raise RuntimeError('x') from e
else:
    pass
finally:
    cleanup()
";
        let program = parse_ok(src);
        assert_eq!(program.statements.len(), 3);
        match &program.statements[2].kind {
            StmtKind::Try {
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                assert_eq!(handlers.len(), 1);
                assert_eq!(handlers[0].name.as_ref().map(|n| n.name.as_str()), Some("e"));
                assert_eq!(orelse.len(), 1);
                assert_eq!(finalbody.len(), 1);
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_with_and_inline_suites() {
        let program = parse_ok("with open(p) as f, lock:\n    data = f.read()\nif x: y = 1; z = 2\n");
        match &program.statements[0].kind {
            StmtKind::With { items, .. } => {
                assert_eq!(items.len(), 2);
                assert!(items[0].vars.is_some());
                assert!(items[1].vars.is_none());
            }
            other => panic!("{:?}", other),
        }
        match &program.statements[1].kind {
            StmtKind::If { body, .. } => assert_eq!(body.len(), 2),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_simple_statements() {
        let program = parse_ok("del a, b[0]\nassert x, 'msg'\nglobal g\nreturn\npass; pass\n");
        assert!(matches!(&program.statements[0].kind, StmtKind::Delete(t) if t.len() == 2));
        assert!(matches!(program.statements[1].kind, StmtKind::Assert { msg: Some(_), .. }));
        assert!(matches!(&program.statements[2].kind, StmtKind::Global(n) if n[0].name == "g"));
        assert!(matches!(program.statements[3].kind, StmtKind::Return(None)));
        assert_eq!(program.statements.len(), 6);
    }

    #[test]
    fn test_statement_spans() {
        let program = parse_ok("x = 1\n\ndef f():\n    return x\n");
        let def = &program.statements[1];
        assert_eq!(def.span.start.line, 3);
        assert_eq!(def.span.end.line, 4);
        assert_eq!(program.statement_count(), 3);
    }

    #[test]
    fn test_empty_and_comment_only_sources() {
        assert!(parse_ok("").statements.is_empty());
        assert!(parse_ok("# just a comment\n\n").statements.is_empty());
    }
}
