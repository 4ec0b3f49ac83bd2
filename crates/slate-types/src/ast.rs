//! AST node types for the Slate language.
//!
//! Every node carries a [`Span`] for diagnostics. Recursive expression
//! positions are boxed to keep enum sizes reasonable.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Slate submission: one or more class declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub span: Span,
}

/// `class Name { fields methods }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

impl ClassDecl {
    /// Look up a method by name. Slate rejects duplicate method names at
    /// compile time, so the first match is the only match.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name.name == name)
    }
}

/// `field name: type = expr;`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: TypeAnn,
    pub default: Expr,
    pub span: Span,
}

/// `fn name(params) -> type { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// `None` means the method returns `void`.
    pub ret: Option<TypeAnn>,
    pub body: Block,
    pub span: Span,
}

/// `name: type` inside a parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeAnn,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Types
// ══════════════════════════════════════════════════════════════════════════════

/// A written type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnn {
    pub kind: TypeAnnKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnKind {
    Int,
    Float,
    Str,
    Bool,
    Void,
    List(Box<TypeAnn>),
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// `{ stmt* }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `let name: type = expr;` (annotation optional)
    Let {
        name: Ident,
        ty: Option<TypeAnn>,
        value: Expr,
    },
    /// `place = expr;`
    Assign { target: Place, value: Expr },
    /// `if cond { .. } else { .. }` — else branch optional, may nest another if.
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    /// `while cond { .. }`
    While { cond: Expr, body: Block },
    /// `for name in expr { .. }`
    For {
        var: Ident,
        iterable: Expr,
        body: Block,
    },
    /// `return;` or `return expr;`
    Return(Option<Expr>),
    /// `raise expr;` — expr must be a string.
    Raise(Expr),
    /// Bare expression statement (typically a method call).
    Expr(Expr),
}

/// An assignable location.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    /// A local or parameter, or (if neither exists) a field of the enclosing
    /// class.
    Name(Ident),
    /// `self.field`
    Field(Ident),
    /// `base[index]`
    Index { base: Box<Expr>, index: Box<Expr> },
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLit(i32),
    FloatLit(f64),
    StrLit(String),
    BoolLit(bool),
    /// `[a, b, c]`
    ListLit(Vec<Expr>),
    /// A parameter, local, or field read.
    Name(String),
    /// `self.field`
    SelfField(String),
    /// `name(args)` — a sibling method or the `len` builtin.
    Call { name: Ident, args: Vec<Expr> },
    /// `self.name(args)` — explicit sibling method call.
    SelfCall { name: Ident, args: Vec<Expr> },
    /// `base[index]`
    Index { base: Box<Expr>, index: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary { op: UnOp, operand: Box<Expr> },
    /// `( expr )` — kept so spans stay faithful.
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
