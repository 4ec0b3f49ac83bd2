//! Type annotation parsing.

use slate_lexer::token::TokenKind;
use slate_types::ast::{TypeAnn, TypeAnnKind};
use slate_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// `Type = "int" | "float" | "string" | "bool" | "void" | "list" "<" Type ">"`
    pub(crate) fn parse_type(&mut self) -> Option<TypeAnn> {
        let tok = self.advance();
        let kind = match tok.kind {
            TokenKind::TyInt => TypeAnnKind::Int,
            TokenKind::TyFloat => TypeAnnKind::Float,
            TokenKind::TyString => TypeAnnKind::Str,
            TokenKind::TyBool => TypeAnnKind::Bool,
            TokenKind::TyVoid => TypeAnnKind::Void,
            TokenKind::TyList => {
                self.expect(&TokenKind::Less, "after 'list'")?;
                let elem = self.parse_type()?;
                let close = self.current_span();
                self.expect(&TokenKind::Greater, "to close the element type")?;
                return Some(TypeAnn {
                    kind: TypeAnnKind::List(Box::new(elem)),
                    span: tok.span.cover(close),
                });
            }
            other => {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected a type, found {}", other.describe()),
                    tok.span,
                );
                return None;
            }
        };
        Some(TypeAnn {
            kind,
            span: tok.span,
        })
    }
}
