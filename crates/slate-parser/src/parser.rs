//! Core parser infrastructure: token cursor, error reporting, declarations.

use slate_lexer::token::{Token, TokenKind};
use slate_types::ast::*;
use slate_types::{CompileErrors, Diagnostic, ErrorCode, SourceFile, Span};

/// The Slate parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery at declaration boundaries.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    pub(crate) errors: CompileErrors,
    /// Current expression nesting depth (capped — see [`Self::MAX_EXPR_DEPTH`]).
    pub(crate) expr_depth: u32,
    /// Current block nesting depth.
    pub(crate) block_depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    /// `None` when the token stream was too broken to produce a tree.
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub(crate) const MAX_EXPR_DEPTH: u32 = 32;
    pub(crate) const MAX_BLOCK_DEPTH: u32 = 16;

    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            expr_depth: 0,
            block_depth: 0,
        }
    }

    // ── Token cursor ──────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, consume it and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the expected token or report E100 and return `None`.
    pub(crate) fn expect(&mut self, kind: &TokenKind, context: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!(
                    "expected {} {}, found {}",
                    kind.describe(),
                    context,
                    self.peek_kind().describe()
                ),
            );
            None
        }
    }

    /// Consume an identifier or report E100.
    pub(crate) fn expect_ident(&mut self, context: &str) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let tok = self.advance();
                Some(Ident::new(name, tok.span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier {}, found {}", context, other.describe()),
                );
                None
            }
        }
    }

    // ── Error reporting ───────────────────────────────────────────────────

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.line).unwrap_or("").to_string();
        self.errors.push_error(Diagnostic::new(
            &self.source_file.name,
            code,
            message,
            span,
            source_line,
        ));
    }

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    // ── Entry point ───────────────────────────────────────────────────────

    /// Parse a complete submission.
    pub fn parse(mut self) -> ParseResult {
        let start_span = self.current_span();
        let mut classes = Vec::new();

        while !self.at_end() && !self.errors.at_capacity() {
            if self.check(&TokenKind::Class) {
                if let Some(class) = self.parse_class() {
                    classes.push(class);
                }
            } else {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!(
                        "expected 'class' at top level, found {}",
                        self.peek_kind().describe()
                    ),
                );
                self.synchronize_to_class();
            }
        }

        if classes.is_empty() {
            self.error_at(
                ErrorCode::NO_CLASS_DECLARED,
                "submission does not declare any class",
                start_span,
            );
            return ParseResult {
                program: None,
                errors: self.errors,
            };
        }

        let span = classes
            .iter()
            .map(|c| c.span)
            .reduce(Span::cover)
            .unwrap_or(start_span);

        ParseResult {
            program: Some(Program { classes, span }),
            errors: self.errors,
        }
    }

    // ── Declarations ──────────────────────────────────────────────────────

    /// `class Name { field* method* }` — fields and methods may interleave.
    fn parse_class(&mut self) -> Option<ClassDecl> {
        let class_tok = self.advance(); // `class`
        let name = self.expect_ident("after 'class'")?;
        self.expect(&TokenKind::LBrace, "to open the class body")?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();

        loop {
            match self.peek_kind() {
                TokenKind::RBrace => {
                    break;
                }
                TokenKind::Eof => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("class '{}' is never closed", name.name),
                    );
                    break;
                }
                TokenKind::Field => {
                    if let Some(field) = self.parse_field() {
                        fields.push(field);
                    } else {
                        self.synchronize_to_member();
                    }
                }
                TokenKind::Fn => {
                    if let Some(method) = self.parse_method() {
                        methods.push(method);
                    } else {
                        self.synchronize_to_member();
                    }
                }
                other => {
                    let msg = format!(
                        "expected 'field' or 'fn' in class body, found {}",
                        other.describe()
                    );
                    self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, msg);
                    self.synchronize_to_member();
                }
            }
            if self.errors.at_capacity() {
                break;
            }
        }

        let close_span = self.current_span();
        self.eat(&TokenKind::RBrace);

        Some(ClassDecl {
            name,
            fields,
            methods,
            span: class_tok.span.cover(close_span),
        })
    }

    /// `field name: type = expr;`
    fn parse_field(&mut self) -> Option<FieldDecl> {
        let field_tok = self.advance(); // `field`
        let name = self.expect_ident("after 'field'")?;
        self.expect(&TokenKind::Colon, "after the field name")?;
        let ty = self.parse_type()?;
        self.expect(&TokenKind::Eq, "before the field default")?;
        let default = self.parse_expression()?;
        let semi_span = self.current_span();
        self.expect(&TokenKind::Semi, "after the field declaration")?;

        Some(FieldDecl {
            name,
            ty,
            default,
            span: field_tok.span.cover(semi_span),
        })
    }

    /// `fn name(params) -> type { body }` — return type optional (void).
    fn parse_method(&mut self) -> Option<MethodDecl> {
        let fn_tok = self.advance(); // `fn`
        let name = self.expect_ident("after 'fn'")?;
        self.expect(&TokenKind::LParen, "to open the parameter list")?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let p_name = self.expect_ident("in parameter list")?;
                self.expect(&TokenKind::Colon, "after the parameter name")?;
                let p_ty = self.parse_type()?;
                let span = p_name.span.cover(p_ty.span);
                params.push(Param {
                    name: p_name,
                    ty: p_ty,
                    span,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "to close the parameter list")?;

        let ret = if self.eat(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        let span = fn_tok.span.cover(body.span);

        Some(MethodDecl {
            name,
            params,
            ret,
            body,
            span,
        })
    }

    // ── Recovery ──────────────────────────────────────────────────────────

    /// Skip forward to the next top-level `class` (or Eof).
    fn synchronize_to_class(&mut self) {
        while !self.at_end() && !self.check(&TokenKind::Class) {
            self.advance();
        }
    }

    /// Skip forward to the next `field`/`fn` member or the closing brace.
    fn synchronize_to_member(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Field | TokenKind::Fn | TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
