use super::StmtParser;
use crate::{
    ast::{PResult, Parser as ExprParser},
    expr::{Expr, ExprKind},
    op::BinOp,
    stmt::{Stmt, StmtKind},
    token::Token,
};

fn parse_rhs(p: &mut ExprParser<'_>) -> PResult<Expr> {
    if p.check(&Token::Yield) {
        p.parse_yield()
    } else {
        p.parse_star_expressions()
    }
}

impl<'a> StmtParser<'a> {
    /// - `expr`
    /// - `a = b = value`
    /// - `target: annotation [= value]`
    /// - `target op= value`
    pub(super) fn parse_expr_or_assign_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start_pos();
        let first = self.expr_or_error(parse_rhs);

        match self.peek() {
            Token::Colon => {
                self.pos += 1;
                let annotation = self.expr_or_error(|p| p.parse_test());
                let value = if self.eat(&Token::Assign) {
                    Some(self.expr_or_error(parse_rhs))
                } else {
                    None
                };
                self.check_target(&first);
                Ok(Stmt::new(
                    StmtKind::AnnAssign {
                        target: first,
                        annotation,
                        value,
                    },
                    self.span_from(start),
                ))
            }
            Token::Assign => {
                let mut targets = vec![first];
                let mut value;
                loop {
                    self.pos += 1; // consume '='
                    value = self.expr_or_error(parse_rhs);
                    if !self.check(&Token::Assign) {
                        break;
                    }
                    targets.push(value);
                }
                for target in &targets {
                    self.check_target(target);
                }
                Ok(Stmt::new(StmtKind::Assign { targets, value }, self.span_from(start)))
            }
            tok => {
                if let Some(op) = BinOp::from_aug_token(tok) {
                    self.pos += 1;
                    let value = self.expr_or_error(parse_rhs);
                    self.check_target(&first);
                    return Ok(Stmt::new(
                        StmtKind::AugAssign {
                            target: first,
                            op,
                            value,
                        },
                        self.span_from(start),
                    ));
                }
                Ok(Stmt::new(StmtKind::Expr(first), self.span_from(start)))
            }
        }
    }

    /// Report targets that cannot be assigned to (`f() = 1`, `1 = x`).
    fn check_target(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } | ExprKind::Error => {}
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for item in items {
                    self.check_target(item);
                }
            }
            ExprKind::Starred(inner) => self.check_target(inner),
            _ => {
                let err = crate::token::ParseError::with_span("Invalid assignment target", target.span);
                self.record(err);
            }
        }
    }
}
