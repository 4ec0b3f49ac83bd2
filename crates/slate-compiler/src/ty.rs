//! The checker's internal type representation.

use slate_types::ast::{TypeAnn, TypeAnnKind};
use std::fmt;

/// A resolved Slate type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    Void,
    List(Box<Type>),
    /// Error-recovery type: produced where checking already failed, and
    /// assignable both ways so one mistake does not cascade.
    Unknown,
}

impl Type {
    pub fn from_ann(ann: &TypeAnn) -> Self {
        match &ann.kind {
            TypeAnnKind::Int => Self::Int,
            TypeAnnKind::Float => Self::Float,
            TypeAnnKind::Str => Self::Str,
            TypeAnnKind::Bool => Self::Bool,
            TypeAnnKind::Void => Self::Void,
            TypeAnnKind::List(elem) => Self::List(Box::new(Self::from_ann(elem))),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether a value of `self` can be used where `target` is expected.
    ///
    /// Exact match, plus the one implicit widening Slate allows: `int`
    /// where `float` is expected. `Unknown` matches anything.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        match (self, target) {
            (Self::Unknown, _) | (_, Self::Unknown) => true,
            (Self::Int, Self::Float) => true,
            (Self::List(a), Self::List(b)) => a.is_assignable_to(b),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "string"),
            Self::Bool => write!(f, "bool"),
            Self::Void => write!(f, "void"),
            Self::List(elem) => write!(f, "list<{elem}>"),
            Self::Unknown => write!(f, "<unknown>"),
        }
    }
}
