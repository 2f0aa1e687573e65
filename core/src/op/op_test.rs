#[cfg(test)]
mod tests {
    use crate::op::{BinOp, CmpOp, UnaryOp};
    use crate::token::Token;

    #[test]
    fn binop_from_tokens() {
        assert_eq!(BinOp::from_token(&Token::Plus), Some(BinOp::Add));
        assert_eq!(BinOp::from_token(&Token::DoubleSlash), Some(BinOp::FloorDiv));
        assert_eq!(BinOp::from_token(&Token::Assign), None);
        assert_eq!(BinOp::from_aug_token(&Token::PipeEq), Some(BinOp::BitOr));
    }

    #[test]
    fn operator_display_matches_source_syntax() {
        assert_eq!(BinOp::Pow.to_string(), "**");
        assert_eq!(BinOp::MatMul.to_string(), "@");
        assert_eq!(CmpOp::NotIn.to_string(), "not in");
        assert_eq!(UnaryOp::Not.to_string(), "not");
    }

    #[test]
    fn dunder_names() {
        assert_eq!(BinOp::Div.dunder(), "__truediv__");
        assert_eq!(BinOp::FloorDiv.dunder(), "__floordiv__");
    }
}
