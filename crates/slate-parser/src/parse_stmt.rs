//! Statement and block parsing.

use slate_lexer::token::TokenKind;
use slate_types::ast::*;
use slate_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// `Block = "{" Stmt* "}"`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        self.block_depth += 1;
        if self.block_depth > Self::MAX_BLOCK_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("maximum block nesting depth is {}", Self::MAX_BLOCK_DEPTH),
            );
            self.block_depth -= 1;
            return None;
        }
        let result = self.parse_block_inner();
        self.block_depth -= 1;
        result
    }

    fn parse_block_inner(&mut self) -> Option<Block> {
        let open = self.expect(&TokenKind::LBrace, "to open a block")?;
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.errors.at_capacity() {
                return None;
            }
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize_stmt(),
            }
        }

        let close_span = self.current_span();
        self.expect(&TokenKind::RBrace, "to close the block")?;

        Some(Block {
            stmts,
            span: open.span.cover(close_span),
        })
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Raise => self.parse_raise(),
            _ => self.parse_expr_or_assign(),
        }
    }

    /// `"let" name [":" Type] "=" Expr ";"`
    fn parse_let(&mut self) -> Option<Stmt> {
        let let_tok = self.advance();
        let name = self.expect_ident("after 'let'")?;
        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(&TokenKind::Eq, "after the variable name")?;
        let value = self.parse_expression()?;
        let semi = self.current_span();
        self.expect(&TokenKind::Semi, "after the let statement")?;

        Some(Stmt::new(
            StmtKind::Let { name, ty, value },
            let_tok.span.cover(semi),
        ))
    }

    /// `"if" Expr Block ["else" (IfStmt | Block)]`
    fn parse_if(&mut self) -> Option<Stmt> {
        let if_tok = self.advance();
        let cond = self.parse_expression()?;
        let then_block = self.parse_block()?;

        let else_block = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                // `else if`: wrap the nested if in a synthetic block.
                let nested = self.parse_if()?;
                let span = nested.span;
                Some(Block {
                    stmts: vec![nested],
                    span,
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        let end = else_block
            .as_ref()
            .map(|b| b.span)
            .unwrap_or(then_block.span);

        Some(Stmt::new(
            StmtKind::If {
                cond,
                then_block,
                else_block,
            },
            if_tok.span.cover(end),
        ))
    }

    /// `"while" Expr Block`
    fn parse_while(&mut self) -> Option<Stmt> {
        let while_tok = self.advance();
        let cond = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = while_tok.span.cover(body.span);
        Some(Stmt::new(StmtKind::While { cond, body }, span))
    }

    /// `"for" name "in" Expr Block`
    fn parse_for(&mut self) -> Option<Stmt> {
        let for_tok = self.advance();
        let var = self.expect_ident("after 'for'")?;
        self.expect(&TokenKind::In, "after the loop variable")?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = for_tok.span.cover(body.span);
        Some(Stmt::new(
            StmtKind::For {
                var,
                iterable,
                body,
            },
            span,
        ))
    }

    /// `"return" [Expr] ";"`
    fn parse_return(&mut self) -> Option<Stmt> {
        let ret_tok = self.advance();
        let value = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let semi = self.current_span();
        self.expect(&TokenKind::Semi, "after the return statement")?;
        Some(Stmt::new(StmtKind::Return(value), ret_tok.span.cover(semi)))
    }

    /// `"raise" Expr ";"`
    fn parse_raise(&mut self) -> Option<Stmt> {
        let raise_tok = self.advance();
        let message = self.parse_expression()?;
        let semi = self.current_span();
        self.expect(&TokenKind::Semi, "after the raise statement")?;
        Some(Stmt::new(
            StmtKind::Raise(message),
            raise_tok.span.cover(semi),
        ))
    }

    /// Either an assignment (`place = expr;`) or a bare expression statement.
    fn parse_expr_or_assign(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;

        if self.eat(&TokenKind::Eq) {
            let target = self.expr_to_place(expr)?;
            let value = self.parse_expression()?;
            let semi = self.current_span();
            self.expect(&TokenKind::Semi, "after the assignment")?;
            let span = Self::place_span(&target).cover(semi);
            return Some(Stmt::new(StmtKind::Assign { target, value }, span));
        }

        let semi = self.current_span();
        self.expect(&TokenKind::Semi, "after the expression statement")?;
        let span = expr.span.cover(semi);
        Some(Stmt::new(StmtKind::Expr(expr), span))
    }

    /// Reinterpret an already-parsed expression as an assignment target.
    fn expr_to_place(&mut self, expr: Expr) -> Option<Place> {
        match expr.kind {
            ExprKind::Name(name) => Some(Place::Name(Ident::new(name, expr.span))),
            ExprKind::SelfField(name) => Some(Place::Field(Ident::new(name, expr.span))),
            ExprKind::Index { base, index } => Some(Place::Index { base, index }),
            _ => {
                self.error_at(
                    ErrorCode::ASSIGN_TO_NON_PLACE,
                    "left side of '=' must be a variable, field, or list element",
                    expr.span,
                );
                None
            }
        }
    }

    fn place_span(place: &Place) -> slate_types::Span {
        match place {
            Place::Name(id) | Place::Field(id) => id.span,
            Place::Index { base, index } => base.span.cover(index.span),
        }
    }

    /// Skip to just past the next `;` (or stop at a block boundary).
    fn synchronize_stmt(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semi => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::LBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
