//! Token types for the Slate lexer.

use slate_types::Span;
use std::fmt;

/// All reserved identifiers in Slate.
///
/// These cannot be used as user-defined names; the lexer recognises each one
/// and emits a keyword token instead of [`TokenKind::Identifier`].
pub const ALL_KEYWORDS: &[&str] = &[
    // Declarations
    "class", "field", "fn",
    // Statements
    "let", "if", "else", "while", "for", "in", "return", "raise",
    // Expressions
    "self", "true", "false",
    // Type names
    "int", "float", "string", "bool", "list", "void",
];

/// A single token produced by the Slate lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in the Slate language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──
    /// Integer literal: `42`. Slate integers are 32-bit signed.
    IntLit(i32),
    /// Float literal: `3.14`
    FloatLit(f64),
    /// String literal: `"hello"`
    StrLit(String),

    /// User-defined identifier: `Calculator`, `add`
    Identifier(String),

    // ── Keywords ──
    Class,
    Field,
    Fn,
    Let,
    If,
    Else,
    While,
    For,
    In,
    Return,
    Raise,
    SelfKw,
    True,
    False,
    TyInt,
    TyFloat,
    TyString,
    TyBool,
    TyList,
    TyVoid,

    // ── Operators ──
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    AndAnd,
    OrOr,
    Bang,
    Arrow,

    // ── Punctuation ──
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semi,
    Dot,

    /// End of input. The token stream always ends with exactly one.
    Eof,
}

impl TokenKind {
    /// Map a lexeme to its keyword token, if it is one.
    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "class" => Self::Class,
            "field" => Self::Field,
            "fn" => Self::Fn,
            "let" => Self::Let,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "for" => Self::For,
            "in" => Self::In,
            "return" => Self::Return,
            "raise" => Self::Raise,
            "self" => Self::SelfKw,
            "true" => Self::True,
            "false" => Self::False,
            "int" => Self::TyInt,
            "float" => Self::TyFloat,
            "string" => Self::TyString,
            "bool" => Self::TyBool,
            "list" => Self::TyList,
            "void" => Self::TyVoid,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable token description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::IntLit(n) => format!("integer literal '{n}'"),
            Self::FloatLit(n) => format!("float literal '{n}'"),
            Self::StrLit(_) => "string literal".to_string(),
            Self::Identifier(name) => format!("identifier '{name}'"),
            Self::Eof => "end of input".to_string(),
            other => format!("'{}'", other.lexeme()),
        }
    }

    /// The literal spelling of a fixed token; empty for variable tokens.
    fn lexeme(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Field => "field",
            Self::Fn => "fn",
            Self::Let => "let",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::In => "in",
            Self::Return => "return",
            Self::Raise => "raise",
            Self::SelfKw => "self",
            Self::True => "true",
            Self::False => "false",
            Self::TyInt => "int",
            Self::TyFloat => "float",
            Self::TyString => "string",
            Self::TyBool => "bool",
            Self::TyList => "list",
            Self::TyVoid => "void",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Eq => "=",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Bang => "!",
            Self::Arrow => "->",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Semi => ";",
            Self::Dot => ".",
            _ => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
