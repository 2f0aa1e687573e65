#[cfg(test)]
mod tests {
    use crate::expr::ParamKind;
    use crate::stmt::{StmtKind, parse_source};

    #[test]
    fn test_function_signature() {
        let src = "@cache\nasync def f(a, b: int = 1, /, c=2, *args, d, e: str = 'x', **kw) -> bool:\n    return True\n";
        let (program, errs) = parse_source(src);
        assert!(errs.is_empty(), "{:?}", errs);
        let StmtKind::FunctionDef(def) = &program.statements[0].kind else {
            panic!("expected def");
        };
        assert!(def.is_async);
        assert_eq!(def.decorators.len(), 1);
        assert!(def.returns.is_some());
        let kinds: Vec<ParamKind> = def.params.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParamKind::PositionalOnly,
                ParamKind::PositionalOnly,
                ParamKind::Positional,
                ParamKind::VarArgs,
                ParamKind::KeywordOnly,
                ParamKind::KeywordOnly,
                ParamKind::KwArgs,
            ]
        );
        assert!(def.params.params[1].annotation.is_some());
        assert!(def.params.params[1].default.is_some());
        // name span points at the identifier
        assert_eq!(def.name_span.start.line, 2);
        assert_eq!(def.name_span.start.column, 11);
    }

    #[test]
    fn test_bare_star_marks_keyword_only() {
        let (program, errs) = parse_source("def g(a, *, b):\n    pass\n");
        assert!(errs.is_empty());
        let StmtKind::FunctionDef(def) = &program.statements[0].kind else {
            panic!("expected def");
        };
        assert_eq!(def.params.params.len(), 2);
        assert_eq!(def.params.params[1].kind, ParamKind::KeywordOnly);
    }

    #[test]
    fn test_class_with_methods() {
        let src = "class A(Base, metaclass=Meta):\n    x: int = 0\n    def m(self):\n        self.y = 1\n";
        let (program, errs) = parse_source(src);
        assert!(errs.is_empty(), "{:?}", errs);
        let StmtKind::ClassDef(class) = &program.statements[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.name, "A");
        assert_eq!(class.bases.len(), 2);
        assert_eq!(class.body.len(), 2);
    }

    #[test]
    fn test_nested_functions_dedent() {
        let src = "def outer():\n    def inner():\n        return 1\n    return inner\nx = outer()\n";
        let (program, errs) = parse_source(src);
        assert!(errs.is_empty(), "{:?}", errs);
        assert_eq!(program.statements.len(), 2);
    }
}
