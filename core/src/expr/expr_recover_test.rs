#[cfg(test)]
mod tests {
    use crate::{
        ast::Parser,
        expr::ExprKind,
        token::{Token, Tokenizer},
    };

    #[test]
    fn test_missing_closing_bracket_is_soft() {
        let lexed = Tokenizer::tokenize("f(1, 2");
        let mut parser = Parser::new(&lexed.tokens, &lexed.spans);
        let expr = parser.parse_star_expressions().expect("call still parses");
        assert!(matches!(expr.kind, ExprKind::Call { ref args, .. } if args.len() == 2));
        let errors = parser.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Expected ')', found newline");
    }

    #[test]
    fn test_trailing_dot_keeps_attribute_node() {
        let lexed = Tokenizer::tokenize("obj.");
        let mut parser = Parser::new(&lexed.tokens, &lexed.spans);
        let expr = parser.parse_star_expressions().expect("attribute");
        match expr.kind {
            ExprKind::Attribute { ref attr, ref value, .. } => {
                assert!(attr.is_empty());
                assert_eq!(value.name(), Some("obj"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(parser.take_errors().len(), 1);
        assert_eq!(parser.peek(), &Token::Newline);
    }

    #[test]
    fn test_error_position_at_insertion_point() {
        let lexed = Tokenizer::tokenize("x = (1 +\n");
        // the unclosed paren swallows the newline; the error lands after '+'
        let mut parser = Parser::at(&lexed.tokens, &lexed.spans, 2);
        let err = parser.parse_star_expressions().expect_err("missing operand");
        assert_eq!(err.span.start.line, 1);
        assert_eq!(err.span.start.column, 9);
    }
}
