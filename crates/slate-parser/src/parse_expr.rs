//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 6. `||`
//! 5. `&&`
//! 4. `==`, `!=`, `<`, `>`, `<=`, `>=` (no chaining)
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `!`
//! 0. postfix `[index]`, `(args)`, primary

use slate_lexer::token::TokenKind;
use slate_types::ast::*;
use slate_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > Self::MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!(
                    "maximum expression nesting depth is {}",
                    Self::MAX_EXPR_DEPTH
                ),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_or();
        self.expr_depth -= 1;
        result
    }

    // ── Precedence chain ──────────────────────────────────────────────────

    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let right = self.parse_and()?;
            let span = left.span.cover(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op: BinOp::Or,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat(&TokenKind::AndAnd) {
            let right = self.parse_comparison()?;
            let span = left.span.cover(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op: BinOp::And,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    /// Comparison operators do not chain: `a < b < c` is a parse error.
    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_add()?;
        if let Some(op) = self.comparison_op() {
            self.advance();
            let right = self.parse_add()?;
            let span = left.span.cover(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
            if self.comparison_op().is_some() {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "comparison operators cannot be chained",
                );
                return None;
            }
        }
        Some(left)
    }

    fn comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::Ne),
            TokenKind::Less => Some(BinOp::Lt),
            TokenKind::Greater => Some(BinOp::Gt),
            TokenKind::LessEq => Some(BinOp::Le),
            TokenKind::GreaterEq => Some(BinOp::Ge),
            _ => None,
        }
    }

    fn parse_add(&mut self) -> Option<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            let span = left.span.cover(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    fn parse_mul(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.cover(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let op_tok = self.advance();
            let operand = self.parse_unary()?;
            let span = op_tok.span.cover(operand.span);
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    /// Postfix indexing: `expr [ index ]*`.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(&TokenKind::LBracket) {
            let index = self.parse_expression()?;
            let close = self.current_span();
            self.expect(&TokenKind::RBracket, "to close the index")?;
            let span = expr.span.cover(close);
            expr = Expr::new(
                ExprKind::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                },
                span,
            );
        }
        Some(expr)
    }

    // ── Primaries ─────────────────────────────────────────────────────────

    fn parse_primary(&mut self) -> Option<Expr> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::IntLit(n) => Some(Expr::new(ExprKind::IntLit(n), tok.span)),
            TokenKind::FloatLit(n) => Some(Expr::new(ExprKind::FloatLit(n), tok.span)),
            TokenKind::StrLit(s) => Some(Expr::new(ExprKind::StrLit(s), tok.span)),
            TokenKind::True => Some(Expr::new(ExprKind::BoolLit(true), tok.span)),
            TokenKind::False => Some(Expr::new(ExprKind::BoolLit(false), tok.span)),

            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                let close = self.current_span();
                self.expect(&TokenKind::RParen, "to close the parenthesis")?;
                Some(Expr::new(
                    ExprKind::Paren(Box::new(inner)),
                    tok.span.cover(close),
                ))
            }

            TokenKind::LBracket => self.parse_list_literal(tok.span),

            TokenKind::SelfKw => {
                self.expect(&TokenKind::Dot, "after 'self'")?;
                let member = self.expect_ident("after 'self.'")?;
                if self.check(&TokenKind::LParen) {
                    let (args, end) = self.parse_args()?;
                    let span = tok.span.cover(end);
                    Some(Expr::new(ExprKind::SelfCall { name: member, args }, span))
                } else {
                    let span = tok.span.cover(member.span);
                    Some(Expr::new(ExprKind::SelfField(member.name), span))
                }
            }

            TokenKind::Identifier(name) => {
                let ident = Ident::new(name, tok.span);
                if self.check(&TokenKind::LParen) {
                    let (args, end) = self.parse_args()?;
                    let span = tok.span.cover(end);
                    Some(Expr::new(ExprKind::Call { name: ident, args }, span))
                } else {
                    Some(Expr::new(ExprKind::Name(ident.name), tok.span))
                }
            }

            other => {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected an expression, found {}", other.describe()),
                    tok.span,
                );
                None
            }
        }
    }

    /// `[ a, b, c ]` — the opening bracket is already consumed.
    fn parse_list_literal(&mut self, open_span: slate_types::Span) -> Option<Expr> {
        let mut elems = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                elems.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.current_span();
        self.expect(&TokenKind::RBracket, "to close the list literal")?;
        Some(Expr::new(
            ExprKind::ListLit(elems),
            open_span.cover(close),
        ))
    }

    /// `( a, b, c )` argument list; returns the args and the closing span.
    fn parse_args(&mut self) -> Option<(Vec<Expr>, slate_types::Span)> {
        self.expect(&TokenKind::LParen, "to open the argument list")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.current_span();
        self.expect(&TokenKind::RParen, "to close the argument list")?;
        Some((args, close))
    }
}
