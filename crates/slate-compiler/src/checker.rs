//! Slate type checker — walks a parsed AST and validates names and types.
//!
//! Entry point: [`Checker::check`].
//!
//! Diagnostics emitted:
//! - E200: unknown type
//! - E201: type mismatch
//! - E202: wrong argument count
//! - E203: value is not indexable
//! - E204: method can finish without returning
//! - E205: void value used where a value is required
//! - E300/E301/E302: undefined name / method / field
//! - E303: duplicate definition
//! - E500 (warning): unreachable statement

use std::collections::HashMap;

use slate_types::ast::*;
use slate_types::{CompileErrors, Diagnostic, ErrorCode, SourceFile, Span};

use crate::env::TypeEnv;
use crate::ty::Type;

/// Walks a parsed [`Program`] and validates it.
pub struct Checker<'a> {
    errors: &'a mut CompileErrors,
    source: &'a SourceFile,
    env: TypeEnv,
    /// Fields of the class currently being checked.
    fields: HashMap<String, Type>,
    /// Method signatures of the class currently being checked.
    methods: HashMap<String, (Vec<Type>, Type)>,
    /// `true` while checking a field default, where `self` and sibling
    /// methods are not yet available.
    in_field_default: bool,
}

impl<'a> Checker<'a> {
    pub fn new(errors: &'a mut CompileErrors, source: &'a SourceFile) -> Self {
        Self {
            errors,
            source,
            env: TypeEnv::new(),
            fields: HashMap::new(),
            methods: HashMap::new(),
            in_field_default: false,
        }
    }

    /// Check a complete program.
    pub fn check(&mut self, program: &Program) {
        let mut seen = HashMap::new();
        for class in &program.classes {
            if let Some(first) = seen.insert(class.name.name.clone(), class.name.span) {
                self.error(
                    ErrorCode::DUPLICATE_DEFINITION,
                    format!(
                        "class '{}' is already declared at {}",
                        class.name.name, first
                    ),
                    class.name.span,
                );
                continue;
            }
            self.check_class(class);
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Class level
    // ══════════════════════════════════════════════════════════════════════

    fn check_class(&mut self, class: &ClassDecl) {
        self.fields.clear();
        self.methods.clear();

        // 1. Register fields.
        for field in &class.fields {
            let ty = Type::from_ann(&field.ty);
            if ty == Type::Void {
                self.error(
                    ErrorCode::UNKNOWN_TYPE,
                    format!("field '{}' cannot have type 'void'", field.name.name),
                    field.ty.span,
                );
            }
            if self
                .fields
                .insert(field.name.name.clone(), ty)
                .is_some()
            {
                self.error(
                    ErrorCode::DUPLICATE_DEFINITION,
                    format!("field '{}' is declared twice", field.name.name),
                    field.name.span,
                );
            }
        }

        // 2. Register method signatures. Invocation resolves by name alone,
        //    so duplicate names are rejected outright.
        for method in &class.methods {
            let params = method
                .params
                .iter()
                .map(|p| Type::from_ann(&p.ty))
                .collect::<Vec<_>>();
            let ret = method
                .ret
                .as_ref()
                .map(Type::from_ann)
                .unwrap_or(Type::Void);
            if self
                .methods
                .insert(method.name.name.clone(), (params, ret))
                .is_some()
            {
                self.error(
                    ErrorCode::DUPLICATE_DEFINITION,
                    format!("method '{}' is declared twice", method.name.name),
                    method.name.span,
                );
            }
        }

        // 3. Check field defaults. These run at instantiation, before any
        //    method can execute, so they see neither `self` nor siblings.
        for field in &class.fields {
            self.in_field_default = true;
            let declared = self
                .fields
                .get(&field.name.name)
                .cloned()
                .unwrap_or(Type::Unknown);
            let inferred = self.check_expr(&field.default);
            self.in_field_default = false;
            if !inferred.is_assignable_to(&declared) {
                self.error(
                    ErrorCode::TYPE_MISMATCH,
                    format!(
                        "field '{}' declared as {} but default has type {}",
                        field.name.name, declared, inferred
                    ),
                    field.default.span,
                );
            }
        }

        // 4. Check method bodies.
        for method in &class.methods {
            self.check_method(method);
        }
    }

    fn check_method(&mut self, method: &MethodDecl) {
        let ret = method
            .ret
            .as_ref()
            .map(Type::from_ann)
            .unwrap_or(Type::Void);
        for ann in &method.params {
            if Type::from_ann(&ann.ty) == Type::Void {
                self.error(
                    ErrorCode::UNKNOWN_TYPE,
                    format!("parameter '{}' cannot have type 'void'", ann.name.name),
                    ann.ty.span,
                );
            }
        }

        self.env.push_scope();
        for param in &method.params {
            if !self.env.define(&param.name.name, Type::from_ann(&param.ty)) {
                self.error(
                    ErrorCode::DUPLICATE_DEFINITION,
                    format!("parameter '{}' is declared twice", param.name.name),
                    param.name.span,
                );
            }
        }

        self.check_block(&method.body, &ret);
        self.env.pop_scope();

        // A non-void method must return on every path.
        if ret != Type::Void && !Self::block_always_exits(&method.body) {
            self.error(
                ErrorCode::MISSING_RETURN,
                format!(
                    "method '{}' can finish without returning a value",
                    method.name.name
                ),
                method.name.span,
            );
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn check_block(&mut self, block: &Block, ret: &Type) {
        self.env.push_scope();
        let mut exited = false;
        for stmt in &block.stmts {
            if exited {
                self.warn(
                    ErrorCode::UNREACHABLE_CODE,
                    "statement is never reached",
                    stmt.span,
                );
                // One warning per block is enough.
                exited = false;
            }
            self.check_stmt(stmt, ret);
            if Self::stmt_always_exits(stmt) {
                exited = true;
            }
        }
        self.env.pop_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt, ret: &Type) {
        match &stmt.kind {
            StmtKind::Let { name, ty, value } => {
                let inferred = self.check_expr(value);
                let var_ty = match ty {
                    Some(ann) => {
                        let declared = Type::from_ann(ann);
                        if declared == Type::Void {
                            self.error(
                                ErrorCode::UNKNOWN_TYPE,
                                "a variable cannot have type 'void'",
                                ann.span,
                            );
                        } else if !inferred.is_assignable_to(&declared) {
                            self.error(
                                ErrorCode::TYPE_MISMATCH,
                                format!(
                                    "'{}' declared as {} but initialiser has type {}",
                                    name.name, declared, inferred
                                ),
                                value.span,
                            );
                        }
                        declared
                    }
                    None => {
                        if inferred == Type::Void {
                            self.error(
                                ErrorCode::VOID_VALUE_USED,
                                format!("'{}' would have type void", name.name),
                                value.span,
                            );
                            Type::Unknown
                        } else {
                            inferred
                        }
                    }
                };
                if !self.env.define(&name.name, var_ty) {
                    self.error(
                        ErrorCode::DUPLICATE_DEFINITION,
                        format!("'{}' is already declared in this scope", name.name),
                        name.span,
                    );
                }
            }

            StmtKind::Assign { target, value } => {
                let value_ty = self.check_expr(value);
                let target_ty = self.check_place(target, stmt.span);
                if !value_ty.is_assignable_to(&target_ty) {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        format!("cannot assign {value_ty} to a place of type {target_ty}"),
                        value.span,
                    );
                }
            }

            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.check_condition(cond);
                self.check_block(then_block, ret);
                if let Some(else_block) = else_block {
                    self.check_block(else_block, ret);
                }
            }

            StmtKind::While { cond, body } => {
                self.check_condition(cond);
                self.check_block(body, ret);
            }

            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                let iter_ty = self.check_expr(iterable);
                let elem_ty = match iter_ty {
                    Type::List(elem) => *elem,
                    Type::Unknown => Type::Unknown,
                    other => {
                        self.error(
                            ErrorCode::TYPE_MISMATCH,
                            format!("'for' needs a list to iterate, found {other}"),
                            iterable.span,
                        );
                        Type::Unknown
                    }
                };
                self.env.push_scope();
                self.env.define(&var.name, elem_ty);
                self.check_block(body, ret);
                self.env.pop_scope();
            }

            StmtKind::Return(value) => match (value, ret) {
                (None, Type::Void) => {}
                (None, expected) => {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        format!("method must return a value of type {expected}"),
                        stmt.span,
                    );
                }
                (Some(expr), expected) => {
                    let actual = self.check_expr(expr);
                    if *expected == Type::Void {
                        self.error(
                            ErrorCode::TYPE_MISMATCH,
                            "void method cannot return a value",
                            expr.span,
                        );
                    } else if !actual.is_assignable_to(expected) {
                        self.error(
                            ErrorCode::TYPE_MISMATCH,
                            format!("expected return type {expected}, found {actual}"),
                            expr.span,
                        );
                    }
                }
            },

            StmtKind::Raise(message) => {
                let ty = self.check_expr(message);
                if !ty.is_assignable_to(&Type::Str) {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        format!("'raise' needs a string message, found {ty}"),
                        message.span,
                    );
                }
            }

            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr) {
        let ty = self.check_expr(cond);
        if !ty.is_assignable_to(&Type::Bool) {
            self.error(
                ErrorCode::TYPE_MISMATCH,
                format!("condition must be bool, found {ty}"),
                cond.span,
            );
        }
    }

    fn check_place(&mut self, place: &Place, stmt_span: Span) -> Type {
        match place {
            Place::Name(id) => {
                if let Some(ty) = self.env.lookup(&id.name) {
                    ty.clone()
                } else if let Some(ty) = self.fields.get(&id.name) {
                    ty.clone()
                } else {
                    self.error(
                        ErrorCode::UNDEFINED_NAME,
                        format!("undefined name '{}'", id.name),
                        id.span,
                    );
                    Type::Unknown
                }
            }
            Place::Field(id) => match self.fields.get(&id.name) {
                Some(ty) => ty.clone(),
                None => {
                    self.error(
                        ErrorCode::UNDEFINED_FIELD,
                        format!("class has no field '{}'", id.name),
                        id.span,
                    );
                    Type::Unknown
                }
            },
            Place::Index { base, index } => {
                let base_ty = self.check_expr(base);
                let index_ty = self.check_expr(index);
                if !index_ty.is_assignable_to(&Type::Int) {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        format!("list index must be int, found {index_ty}"),
                        index.span,
                    );
                }
                match base_ty {
                    Type::List(elem) => *elem,
                    Type::Unknown => Type::Unknown,
                    other => {
                        self.error(
                            ErrorCode::NOT_INDEXABLE,
                            format!("cannot assign into a value of type {other}"),
                            stmt_span,
                        );
                        Type::Unknown
                    }
                }
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::FloatLit(_) => Type::Float,
            ExprKind::StrLit(_) => Type::Str,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::Paren(inner) => self.check_expr(inner),

            ExprKind::ListLit(elems) => {
                let mut elem_ty = Type::Unknown;
                for elem in elems {
                    let ty = self.check_expr(elem);
                    if elem_ty.is_unknown() {
                        elem_ty = ty;
                    } else if !ty.is_assignable_to(&elem_ty) {
                        self.error(
                            ErrorCode::TYPE_MISMATCH,
                            format!("list element has type {ty}, expected {elem_ty}"),
                            elem.span,
                        );
                    }
                }
                Type::List(Box::new(elem_ty))
            }

            ExprKind::Name(name) => {
                if let Some(ty) = self.env.lookup(name) {
                    return ty.clone();
                }
                if !self.in_field_default {
                    if let Some(ty) = self.fields.get(name) {
                        return ty.clone();
                    }
                }
                self.error(
                    ErrorCode::UNDEFINED_NAME,
                    format!("undefined name '{name}'"),
                    expr.span,
                );
                Type::Unknown
            }

            ExprKind::SelfField(name) => {
                if self.in_field_default {
                    self.error(
                        ErrorCode::UNDEFINED_FIELD,
                        "field defaults cannot read other fields",
                        expr.span,
                    );
                    return Type::Unknown;
                }
                match self.fields.get(name) {
                    Some(ty) => ty.clone(),
                    None => {
                        self.error(
                            ErrorCode::UNDEFINED_FIELD,
                            format!("class has no field '{name}'"),
                            expr.span,
                        );
                        Type::Unknown
                    }
                }
            }

            ExprKind::Call { name, args } => {
                if name.name == "len" {
                    return self.check_len_builtin(name, args, expr.span);
                }
                self.check_method_call(name, args)
            }

            ExprKind::SelfCall { name, args } => self.check_method_call(name, args),

            ExprKind::Index { base, index } => {
                let base_ty = self.check_expr(base);
                let index_ty = self.check_expr(index);
                if !index_ty.is_assignable_to(&Type::Int) {
                    self.error(
                        ErrorCode::TYPE_MISMATCH,
                        format!("index must be int, found {index_ty}"),
                        index.span,
                    );
                }
                match base_ty {
                    Type::List(elem) => *elem,
                    Type::Unknown => Type::Unknown,
                    other => {
                        self.error(
                            ErrorCode::NOT_INDEXABLE,
                            format!("value of type {other} cannot be indexed"),
                            base.span,
                        );
                        Type::Unknown
                    }
                }
            }

            ExprKind::Binary { left, op, right } => self.check_binary(left, *op, right),

            ExprKind::Unary { op, operand } => {
                let ty = self.check_expr(operand);
                match op {
                    UnOp::Neg if ty.is_numeric() => ty,
                    UnOp::Neg => {
                        self.error(
                            ErrorCode::TYPE_MISMATCH,
                            format!("unary '-' needs a number, found {ty}"),
                            operand.span,
                        );
                        Type::Unknown
                    }
                    UnOp::Not if ty.is_assignable_to(&Type::Bool) => Type::Bool,
                    UnOp::Not => {
                        self.error(
                            ErrorCode::TYPE_MISMATCH,
                            format!("'!' needs a bool, found {ty}"),
                            operand.span,
                        );
                        Type::Unknown
                    }
                }
            }
        }
    }

    fn check_len_builtin(&mut self, name: &Ident, args: &[Expr], span: Span) -> Type {
        if self.methods.contains_key("len") {
            // A user method named `len` shadows the builtin.
            return self.check_method_call(name, args);
        }
        if args.len() != 1 {
            self.error(
                ErrorCode::WRONG_ARG_COUNT,
                format!("'len' takes 1 argument, found {}", args.len()),
                span,
            );
            for arg in args {
                self.check_expr(arg);
            }
            return Type::Int;
        }
        let ty = self.check_expr(&args[0]);
        if !matches!(ty, Type::List(_) | Type::Str | Type::Unknown) {
            self.error(
                ErrorCode::TYPE_MISMATCH,
                format!("'len' needs a list or string, found {ty}"),
                args[0].span,
            );
        }
        Type::Int
    }

    fn check_method_call(&mut self, name: &Ident, args: &[Expr]) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();

        if self.in_field_default {
            self.error(
                ErrorCode::UNDEFINED_METHOD,
                "field defaults cannot call methods",
                name.span,
            );
            return Type::Unknown;
        }

        let (params, ret) = match self.methods.get(&name.name) {
            Some(sig) => sig.clone(),
            None => {
                self.error(
                    ErrorCode::UNDEFINED_METHOD,
                    format!("class has no method '{}'", name.name),
                    name.span,
                );
                return Type::Unknown;
            }
        };

        if params.len() != arg_types.len() {
            self.error(
                ErrorCode::WRONG_ARG_COUNT,
                format!(
                    "'{}' takes {} argument(s), found {}",
                    name.name,
                    params.len(),
                    arg_types.len()
                ),
                name.span,
            );
            return ret;
        }

        for ((param, arg_ty), arg) in params.iter().zip(&arg_types).zip(args) {
            if !arg_ty.is_assignable_to(param) {
                self.error(
                    ErrorCode::TYPE_MISMATCH,
                    format!("argument has type {arg_ty}, expected {param}"),
                    arg.span,
                );
            }
        }
        ret
    }

    fn check_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> Type {
        let lt = self.check_expr(left);
        let rt = self.check_expr(right);
        let span = left.span.cover(right.span);

        let mismatch = |me: &mut Self| {
            me.error(
                ErrorCode::TYPE_MISMATCH,
                format!("'{}' cannot combine {lt} and {rt}", op.symbol()),
                span,
            );
            Type::Unknown
        };

        match op {
            BinOp::Add => {
                if lt.is_assignable_to(&Type::Str) && rt.is_assignable_to(&Type::Str) {
                    Type::Str
                } else {
                    self.numeric_result(&lt, &rt).unwrap_or_else(|| mismatch(self))
                }
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => self
                .numeric_result(&lt, &rt)
                .unwrap_or_else(|| mismatch(self)),

            BinOp::Eq | BinOp::Ne => {
                let comparable = lt.is_assignable_to(&rt)
                    || rt.is_assignable_to(&lt)
                    || (lt.is_numeric() && rt.is_numeric());
                if comparable {
                    Type::Bool
                } else {
                    mismatch(self)
                }
            }

            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                let ordered = (lt.is_numeric() && rt.is_numeric())
                    || (lt.is_assignable_to(&Type::Str) && rt.is_assignable_to(&Type::Str));
                if ordered {
                    Type::Bool
                } else {
                    mismatch(self)
                }
            }

            BinOp::And | BinOp::Or => {
                if lt.is_assignable_to(&Type::Bool) && rt.is_assignable_to(&Type::Bool) {
                    Type::Bool
                } else {
                    mismatch(self)
                }
            }
        }
    }

    /// Numeric promotion: int·int → int, otherwise float when both numeric.
    fn numeric_result(&self, lt: &Type, rt: &Type) -> Option<Type> {
        if !lt.is_numeric() || !rt.is_numeric() {
            return None;
        }
        if lt == &Type::Int && rt == &Type::Int {
            Some(Type::Int)
        } else if lt.is_unknown() || rt.is_unknown() {
            Some(Type::Unknown)
        } else {
            Some(Type::Float)
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Definite-exit analysis
    // ══════════════════════════════════════════════════════════════════════

    fn block_always_exits(block: &Block) -> bool {
        block.stmts.iter().any(Self::stmt_always_exits)
    }

    fn stmt_always_exits(stmt: &Stmt) -> bool {
        match &stmt.kind {
            StmtKind::Return(_) | StmtKind::Raise(_) => true,
            StmtKind::If {
                then_block,
                else_block: Some(else_block),
                ..
            } => Self::block_always_exits(then_block) && Self::block_always_exits(else_block),
            _ => false,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Reporting
    // ══════════════════════════════════════════════════════════════════════

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source.line(span.line).unwrap_or("").to_string();
        self.errors.push_error(Diagnostic::new(
            &self.source.name,
            code,
            message,
            span,
            source_line,
        ));
    }

    fn warn(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source.line(span.line).unwrap_or("").to_string();
        self.errors.push_warning(
            Diagnostic::new(&self.source.name, code, message, span, source_line).warning(),
        );
    }
}
