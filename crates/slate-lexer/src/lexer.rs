//! Core Slate lexer — converts submission text to a token stream.
//!
//! Features:
//! - All Slate tokens (20 reserved words, operators, punctuation, literals)
//! - `//` line comments and `/* */` block comments stripped
//! - 32-bit integer literals, rejected with E102 when out of range
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use slate_types::{CompileErrors, Diagnostic, ErrorCode, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Slate lexer.
///
/// Converts submission text into a vector of [`Token`]s, collecting up to
/// [`slate_types::MAX_DIAGNOSTICS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error context lines.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Byte offset where the token currently being scanned started.
    token_start: usize,
    /// Collected errors.
    errors: CompileErrors,
}

/// Result of lexing: tokens plus any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            token_start: 0,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire submission into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.at_capacity() {
                break;
            }
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, Span::point(self.line, self.col)));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    /// The lexeme scanned since `token_start`.
    fn lexeme(&self) -> &str {
        std::str::from_utf8(&self.source[self.token_start..self.pos]).unwrap_or("")
    }

    fn report(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.line).unwrap_or("").to_string();
        self.errors.push_error(Diagnostic::new(
            &self.source_file.name,
            code,
            message,
            span,
            source_line,
        ));
    }

    // ─────────────────────────────────────────────────────────────
    // Trivia
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace (including newlines — statements end at `;`) and
    /// both comment forms.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.bump();
                }
                Some(b'/') if self.peek_next() == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_next() == Some(b'*') => {
                    let start_line = self.line;
                    let start_col = self.col;
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(ch) = self.bump() {
                        if ch == b'*' && self.peek() == Some(b'/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        let span = self.span_from(start_line, start_col);
                        self.report(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "unterminated block comment",
                            span,
                        );
                    }
                }
                _ => break,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn next_token(&mut self) -> Token {
        // A loop, not recursion: error recovery skips the offending
        // character and rescans, and a long run of bad bytes must not
        // grow the stack.
        loop {
            self.skip_trivia();

            if self.at_end() {
                return Token::new(TokenKind::Eof, Span::point(self.line, self.col));
            }

            let start_line = self.line;
            let start_col = self.col;
            self.token_start = self.pos;
            let ch = match self.bump() {
                Some(ch) => ch,
                None => return Token::new(TokenKind::Eof, Span::point(self.line, self.col)),
            };

            let simple = |kind, me: &Self| Token::new(kind, me.span_from(start_line, start_col));

            return match ch {
                b'"' => self.scan_string(start_line, start_col),
                b'0'..=b'9' => self.scan_number(start_line, start_col),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_word(start_line, start_col),

                b'+' => simple(TokenKind::Plus, self),
                b'*' => simple(TokenKind::Star, self),
                b'%' => simple(TokenKind::Percent, self),
                b'/' => simple(TokenKind::Slash, self),
                b'(' => simple(TokenKind::LParen, self),
                b')' => simple(TokenKind::RParen, self),
                b'{' => simple(TokenKind::LBrace, self),
                b'}' => simple(TokenKind::RBrace, self),
                b'[' => simple(TokenKind::LBracket, self),
                b']' => simple(TokenKind::RBracket, self),
                b',' => simple(TokenKind::Comma, self),
                b':' => simple(TokenKind::Colon, self),
                b';' => simple(TokenKind::Semi, self),
                b'.' => simple(TokenKind::Dot, self),

                b'-' => {
                    if self.peek() == Some(b'>') {
                        self.bump();
                        simple(TokenKind::Arrow, self)
                    } else {
                        simple(TokenKind::Minus, self)
                    }
                }
                b'=' => {
                    if self.peek() == Some(b'=') {
                        self.bump();
                        simple(TokenKind::EqEq, self)
                    } else {
                        simple(TokenKind::Eq, self)
                    }
                }
                b'!' => {
                    if self.peek() == Some(b'=') {
                        self.bump();
                        simple(TokenKind::BangEq, self)
                    } else {
                        simple(TokenKind::Bang, self)
                    }
                }
                b'<' => {
                    if self.peek() == Some(b'=') {
                        self.bump();
                        simple(TokenKind::LessEq, self)
                    } else {
                        simple(TokenKind::Less, self)
                    }
                }
                b'>' => {
                    if self.peek() == Some(b'=') {
                        self.bump();
                        simple(TokenKind::GreaterEq, self)
                    } else {
                        simple(TokenKind::Greater, self)
                    }
                }
                b'&' => {
                    if self.peek() == Some(b'&') {
                        self.bump();
                        simple(TokenKind::AndAnd, self)
                    } else {
                        let span = self.span_from(start_line, start_col);
                        self.report(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "unexpected character '&'; logical and is '&&'",
                            span,
                        );
                        continue;
                    }
                }
                b'|' => {
                    if self.peek() == Some(b'|') {
                        self.bump();
                        simple(TokenKind::OrOr, self)
                    } else {
                        let span = self.span_from(start_line, start_col);
                        self.report(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "unexpected character '|'; logical or is '||'",
                            span,
                        );
                        continue;
                    }
                }

                other => {
                    let span = self.span_from(start_line, start_col);
                    self.report(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("unexpected character '{}'", other as char),
                        span,
                    );
                    // Skip the character and keep scanning.
                    continue;
                }
            };
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Literals & words
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start_line: u32, start_col: u32) -> Token {
        while let Some(b'0'..=b'9') = self.peek() {
            self.bump();
        }

        let mut is_float = false;
        if self.peek() == Some(b'.') && matches!(self.peek_next(), Some(b'0'..=b'9')) {
            is_float = true;
            self.bump();
            while let Some(b'0'..=b'9') = self.peek() {
                self.bump();
            }
        }

        let span = self.span_from(start_line, start_col);
        let text = self.lexeme();

        if is_float {
            let value: f64 = text.parse().unwrap_or(0.0);
            return Token::new(TokenKind::FloatLit(value), span);
        }

        match text.parse::<i32>() {
            Ok(value) => Token::new(TokenKind::IntLit(value), span),
            Err(_) => {
                self.report(
                    ErrorCode::INT_LITERAL_OUT_OF_RANGE,
                    format!("integer literal '{text}' does not fit in 32 bits"),
                    span,
                );
                // Error recovery: stand in a zero so parsing can continue.
                Token::new(TokenKind::IntLit(0), span)
            }
        }
    }

    fn scan_word(&mut self, start_line: u32, start_col: u32) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.bump();
            } else {
                break;
            }
        }

        let span = self.span_from(start_line, start_col);
        let text = self.lexeme();
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token::new(kind, span)
    }

    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Token {
        // Accumulate raw bytes and decode once at the end, so multi-byte
        // UTF-8 sequences in the source survive intact. Escape expansions
        // only ever insert ASCII.
        let mut buf: Vec<u8> = Vec::new();
        let finish = |bytes: Vec<u8>| String::from_utf8_lossy(&bytes).into_owned();

        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.report(ErrorCode::UNTERMINATED_STRING, "unterminated string literal", span);
                    return Token::new(TokenKind::StrLit(finish(buf)), span);
                }
                Some(b'"') => {
                    self.bump();
                    return Token::new(
                        TokenKind::StrLit(finish(buf)),
                        self.span_from(start_line, start_col),
                    );
                }
                Some(b'\\') => {
                    let esc_line = self.line;
                    let esc_col = self.col;
                    self.bump();
                    match self.bump() {
                        Some(b'"') => buf.push(b'"'),
                        Some(b'\\') => buf.push(b'\\'),
                        Some(b'n') => buf.push(b'\n'),
                        Some(b't') => buf.push(b'\t'),
                        Some(b'r') => buf.push(b'\r'),
                        Some(other) => {
                            let span = self.span_from(esc_line, esc_col);
                            self.report(
                                ErrorCode::INVALID_ESCAPE,
                                format!("invalid escape sequence '\\{}'", other as char),
                                span,
                            );
                            buf.push(other);
                        }
                        None => {
                            let span = self.span_from(esc_line, esc_col);
                            self.report(
                                ErrorCode::UNTERMINATED_STRING,
                                "unexpected end of input in escape sequence",
                                span,
                            );
                        }
                    }
                }
                Some(byte) => {
                    self.bump();
                    buf.push(byte);
                }
            }
        }
    }
}
