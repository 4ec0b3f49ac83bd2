//! Core statement and expression evaluator.
//!
//! The evaluator realises the invoker capability surface: instantiate a
//! class by name, resolve a method by name, call it with typed positional
//! arguments. Execution is metered — every step costs gas, the wall-clock
//! deadline is checked periodically, and call depth is capped — so hostile
//! submissions cannot hold the host hostage.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use slate_compiler::{CompiledUnit, Type};
use slate_types::ast::*;

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// Resource ceilings for one request's worth of evaluation.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Total evaluation steps across instantiation and invocation.
    pub gas: u64,
    /// Wall-clock budget; `None` disables the deadline (tests only).
    pub wall_clock: Option<Duration>,
    /// Maximum method-call nesting.
    pub call_depth: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            gas: 1_000_000,
            wall_clock: Some(Duration::from_secs(2)),
            call_depth: 64,
        }
    }
}

/// A live object: one instantiated class with its field values.
#[derive(Debug, Clone)]
pub struct Instance {
    class_name: String,
    fields: BTreeMap<String, Value>,
}

impl Instance {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// How often the (comparatively costly) deadline check runs, in gas ticks.
const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// The tree-walking evaluator for one request.
pub struct Evaluator<'u> {
    unit: &'u CompiledUnit,
    limits: Limits,
    gas: u64,
    deadline: Option<Instant>,
    depth: u32,
}

impl<'u> Evaluator<'u> {
    /// Create an evaluator over a compiled unit. The wall-clock deadline
    /// starts now — construct the evaluator right before invoking.
    pub fn new(unit: &'u CompiledUnit, limits: Limits) -> Self {
        let deadline = limits.wall_clock.map(|budget| Instant::now() + budget);
        Self {
            unit,
            limits,
            gas: 0,
            deadline,
            depth: 0,
        }
    }

    /// Gas consumed so far.
    pub fn gas_used(&self) -> u64 {
        self.gas
    }

    // ══════════════════════════════════════════════════════════════════════
    // Invoker capability surface
    // ══════════════════════════════════════════════════════════════════════

    /// Instantiate a class by name, evaluating its field defaults.
    ///
    /// Returns `Ok(None)` when the unit defines no such class; a trap while
    /// evaluating a field default is a real error.
    pub fn instantiate(&mut self, class_name: &str) -> EvalResult<Option<Instance>> {
        let class = match self.unit.class(class_name) {
            Some(class) => class,
            None => return Ok(None),
        };

        let mut instance = Instance {
            class_name: class.name.name.clone(),
            fields: BTreeMap::new(),
        };
        let mut env = Environment::new();
        for field in &class.fields {
            let value = self.eval_expr(&field.default, &mut instance, &mut env)?;
            let declared = Type::from_ann(&field.ty);
            let value = self.conform(value, &declared, &field.name.name)?;
            instance.fields.insert(field.name.name.clone(), value);
        }
        Ok(Some(instance))
    }

    /// Resolve a method on an instance's class by name. No overloads exist;
    /// `None` means the class has no method with that name.
    pub fn resolve_method(&self, instance: &Instance, name: &str) -> Option<&'u MethodDecl> {
        self.unit.method(&instance.class_name, name)
    }

    /// Invoke a method with positional arguments.
    ///
    /// Arity or argument-shape mismatches are errors here, exactly like a
    /// reflective binding failure would be.
    pub fn call(
        &mut self,
        instance: &mut Instance,
        method: &MethodDecl,
        args: &[Value],
    ) -> EvalResult<Value> {
        if args.len() != method.params.len() {
            return Err(EvalError::ArityMismatch {
                method: method.name.name.clone(),
                expected: method.params.len(),
                received: args.len(),
            });
        }

        self.depth += 1;
        if self.depth > self.limits.call_depth {
            return Err(EvalError::CallDepthExceeded(self.limits.call_depth));
        }

        let mut env = Environment::new();
        for (param, arg) in method.params.iter().zip(args) {
            let expected = Type::from_ann(&param.ty);
            let value = self.conform(arg.clone(), &expected, &param.name.name)?;
            env.define(&param.name.name, value);
        }

        let flow = self.exec_block(&method.body, instance, &mut env)?;
        self.depth -= 1;

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Unit,
        })
    }

    /// Check one argument against a declared type, applying the single
    /// implicit widening Slate has (int → float).
    fn conform(&self, value: Value, expected: &Type, name: &str) -> EvalResult<Value> {
        let ok = match (&value, expected) {
            (Value::Int(_), Type::Int) => true,
            (Value::Int(n), Type::Float) => return Ok(Value::Float(*n as f64)),
            (Value::Float(_), Type::Float) => true,
            (Value::Str(_), Type::Str) => true,
            (Value::Bool(_), Type::Bool) => true,
            (Value::List(items), Type::List(elem)) => {
                let mut converted = Vec::with_capacity(items.len());
                for item in items {
                    converted.push(self.conform(item.clone(), elem, name)?);
                }
                return Ok(Value::List(converted));
            }
            _ => false,
        };
        if ok {
            Ok(value)
        } else {
            Err(EvalError::TypeMismatch(format!(
                "'{name}' expects {expected}, received {}",
                value.type_name()
            )))
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Metering
    // ══════════════════════════════════════════════════════════════════════

    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.limits.gas {
            return Err(EvalError::GasExhausted(self.limits.gas));
        }
        if self.gas % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() > deadline {
                    return Err(EvalError::DeadlineExceeded);
                }
            }
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn exec_block(
        &mut self,
        block: &Block,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<Flow> {
        env.push_scope();
        for stmt in &block.stmts {
            match self.exec_stmt(stmt, instance, env) {
                Ok(Flow::Normal) => {}
                other => {
                    env.pop_scope();
                    return other;
                }
            }
        }
        env.pop_scope();
        Ok(Flow::Normal)
    }

    fn exec_stmt(
        &mut self,
        stmt: &Stmt,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<Flow> {
        self.tick()?;
        match &stmt.kind {
            StmtKind::Let { name, value, .. } => {
                let value = self.eval_expr(value, instance, env)?;
                env.define(&name.name, value);
                Ok(Flow::Normal)
            }

            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(value, instance, env)?;
                self.assign(target, value, instance, env)?;
                Ok(Flow::Normal)
            }

            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.eval_bool(cond, instance, env)? {
                    self.exec_block(then_block, instance, env)
                } else if let Some(else_block) = else_block {
                    self.exec_block(else_block, instance, env)
                } else {
                    Ok(Flow::Normal)
                }
            }

            StmtKind::While { cond, body } => {
                while self.eval_bool(cond, instance, env)? {
                    if let Flow::Return(value) = self.exec_block(body, instance, env)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                let items = match self.eval_expr(iterable, instance, env)? {
                    Value::List(items) => items,
                    other => {
                        return Err(EvalError::TypeMismatch(format!(
                            "'for' needs a list, found {}",
                            other.type_name()
                        )))
                    }
                };
                for item in items {
                    env.push_scope();
                    env.define(&var.name, item);
                    let flow = self.exec_block(body, instance, env);
                    env.pop_scope();
                    if let Flow::Return(value) = flow? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, instance, env)?,
                    None => Value::Unit,
                };
                Ok(Flow::Return(value))
            }

            StmtKind::Raise(message) => {
                let message = self.eval_expr(message, instance, env)?;
                Err(EvalError::Raised(message.to_string()))
            }

            StmtKind::Expr(expr) => {
                self.eval_expr(expr, instance, env)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn assign(
        &mut self,
        target: &Place,
        value: Value,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<()> {
        match target {
            Place::Name(id) => {
                if env.set(&id.name, value.clone()) {
                    return Ok(());
                }
                match instance.fields.get_mut(&id.name) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(EvalError::UndefinedVariable(id.name.clone())),
                }
            }
            Place::Field(id) => match instance.fields.get_mut(&id.name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(EvalError::UndefinedVariable(id.name.clone())),
            },
            Place::Index { base, index } => {
                let index = self.eval_index(index, instance, env)?;
                self.assign_element(base, index, value, instance, env)
            }
        }
    }

    /// Store into `base[index]` where `base` names a local or a field.
    fn assign_element(
        &mut self,
        base: &Expr,
        index: i64,
        value: Value,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<()> {
        let slot = match &base.kind {
            ExprKind::Name(name) => env
                .get_mut(name)
                .or_else(|| instance.fields.get_mut(name))
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone()))?,
            ExprKind::SelfField(name) => instance
                .fields
                .get_mut(name)
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone()))?,
            _ => {
                return Err(EvalError::TypeMismatch(
                    "cannot assign into a temporary value".to_string(),
                ))
            }
        };
        match slot {
            Value::List(items) => {
                let len = items.len();
                let idx = usize::try_from(index).ok().filter(|&i| i < len);
                match idx {
                    Some(i) => {
                        items[i] = value;
                        Ok(())
                    }
                    None => Err(EvalError::IndexOutOfBounds { index, len }),
                }
            }
            other => Err(EvalError::TypeMismatch(format!(
                "value of type {} cannot be indexed",
                other.type_name()
            ))),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn eval_expr(
        &mut self,
        expr: &Expr,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<Value> {
        self.tick()?;
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::Int(*n)),
            ExprKind::FloatLit(n) => Ok(Value::Float(*n)),
            ExprKind::StrLit(s) => Ok(Value::Str(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::Paren(inner) => self.eval_expr(inner, instance, env),

            ExprKind::ListLit(elems) => {
                let mut items = Vec::with_capacity(elems.len());
                for elem in elems {
                    items.push(self.eval_expr(elem, instance, env)?);
                }
                Ok(Value::List(items))
            }

            ExprKind::Name(name) => env
                .get(name)
                .or_else(|| instance.fields.get(name))
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            ExprKind::SelfField(name) => instance
                .fields
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            ExprKind::Call { name, args } => {
                let is_user_method = self
                    .unit
                    .method(&instance.class_name, &name.name)
                    .is_some();
                if name.name == "len" && !is_user_method {
                    return self.eval_len(args, instance, env);
                }
                self.eval_method_call(&name.name, args, instance, env)
            }

            ExprKind::SelfCall { name, args } => {
                self.eval_method_call(&name.name, args, instance, env)
            }

            ExprKind::Index { base, index } => {
                let base = self.eval_expr(base, instance, env)?;
                let index = self.eval_index(index, instance, env)?;
                match base {
                    Value::List(items) => {
                        let len = items.len();
                        usize::try_from(index)
                            .ok()
                            .and_then(|i| items.into_iter().nth(i))
                            .ok_or(EvalError::IndexOutOfBounds { index, len })
                    }
                    other => Err(EvalError::TypeMismatch(format!(
                        "value of type {} cannot be indexed",
                        other.type_name()
                    ))),
                }
            }

            ExprKind::Binary { left, op, right } => {
                self.eval_binary(left, *op, right, instance, env)
            }

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, instance, env)?;
                match (op, value) {
                    (UnOp::Neg, Value::Int(n)) => n
                        .checked_neg()
                        .map(Value::Int)
                        .ok_or_else(|| {
                            EvalError::ArithmeticTrap("integer overflow in negation".to_string())
                        }),
                    (UnOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
                    (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (op, value) => Err(EvalError::TypeMismatch(format!(
                        "unary operator cannot apply to {} ({op:?})",
                        value.type_name()
                    ))),
                }
            }
        }
    }

    fn eval_bool(
        &mut self,
        expr: &Expr,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<bool> {
        match self.eval_expr(expr, instance, env)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::TypeMismatch(format!(
                "condition must be bool, found {}",
                other.type_name()
            ))),
        }
    }

    fn eval_index(
        &mut self,
        expr: &Expr,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<i64> {
        match self.eval_expr(expr, instance, env)? {
            Value::Int(n) => Ok(i64::from(n)),
            other => Err(EvalError::TypeMismatch(format!(
                "index must be int, found {}",
                other.type_name()
            ))),
        }
    }

    fn eval_len(
        &mut self,
        args: &[Expr],
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<Value> {
        if args.len() != 1 {
            return Err(EvalError::ArityMismatch {
                method: "len".to_string(),
                expected: 1,
                received: args.len(),
            });
        }
        match self.eval_expr(&args[0], instance, env)? {
            Value::List(items) => Ok(Value::Int(items.len() as i32)),
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i32)),
            other => Err(EvalError::TypeMismatch(format!(
                "'len' needs a list or string, found {}",
                other.type_name()
            ))),
        }
    }

    fn eval_method_call(
        &mut self,
        name: &str,
        args: &[Expr],
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<Value> {
        let method = match self.unit.method(&instance.class_name, name) {
            Some(method) => method,
            None => {
                return Err(EvalError::TypeMismatch(format!(
                    "class '{}' has no method '{name}'",
                    instance.class_name
                )))
            }
        };
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg, instance, env)?);
        }
        self.call(instance, method, &arg_values)
    }

    // ── Operators ─────────────────────────────────────────────────────────

    fn eval_binary(
        &mut self,
        left: &Expr,
        op: BinOp,
        right: &Expr,
        instance: &mut Instance,
        env: &mut Environment,
    ) -> EvalResult<Value> {
        // && and || short-circuit.
        if matches!(op, BinOp::And | BinOp::Or) {
            let lhs = self.eval_bool(left, instance, env)?;
            return match (op, lhs) {
                (BinOp::And, false) => Ok(Value::Bool(false)),
                (BinOp::Or, true) => Ok(Value::Bool(true)),
                _ => Ok(Value::Bool(self.eval_bool(right, instance, env)?)),
            };
        }

        let lhs = self.eval_expr(left, instance, env)?;
        let rhs = self.eval_expr(right, instance, env)?;

        match op {
            BinOp::Add => match (&lhs, &rhs) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
                _ => self.arith(op, lhs, rhs),
            },
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => self.arith(op, lhs, rhs),
            BinOp::Eq => Ok(Value::Bool(Self::values_equal(&lhs, &rhs))),
            BinOp::Ne => Ok(Value::Bool(!Self::values_equal(&lhs, &rhs))),
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => self.compare(op, lhs, rhs),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn arith(&self, op: BinOp, lhs: Value, rhs: Value) -> EvalResult<Value> {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => {
                let result = match op {
                    BinOp::Add => a.checked_add(b),
                    BinOp::Sub => a.checked_sub(b),
                    BinOp::Mul => a.checked_mul(b),
                    BinOp::Div => {
                        if b == 0 {
                            return Err(EvalError::ArithmeticTrap(
                                "division by zero".to_string(),
                            ));
                        }
                        a.checked_div(b)
                    }
                    BinOp::Rem => {
                        if b == 0 {
                            return Err(EvalError::ArithmeticTrap(
                                "remainder by zero".to_string(),
                            ));
                        }
                        a.checked_rem(b)
                    }
                    _ => unreachable!(),
                };
                result.map(Value::Int).ok_or_else(|| {
                    EvalError::ArithmeticTrap(format!(
                        "integer overflow in '{}'",
                        op.symbol()
                    ))
                })
            }
            (lhs, rhs) => {
                let (a, b) = Self::promote(&lhs, &rhs).ok_or_else(|| {
                    EvalError::TypeMismatch(format!(
                        "'{}' cannot combine {} and {}",
                        op.symbol(),
                        lhs.type_name(),
                        rhs.type_name()
                    ))
                })?;
                let result = match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Rem => a % b,
                    _ => unreachable!(),
                };
                Ok(Value::Float(result))
            }
        }
    }

    fn compare(&self, op: BinOp, lhs: Value, rhs: Value) -> EvalResult<Value> {
        let ordering = match (&lhs, &rhs) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            _ => match Self::promote(&lhs, &rhs) {
                Some((a, b)) => a.partial_cmp(&b),
                None => {
                    return Err(EvalError::TypeMismatch(format!(
                        "'{}' cannot compare {} and {}",
                        op.symbol(),
                        lhs.type_name(),
                        rhs.type_name()
                    )))
                }
            },
        };
        let result = match ordering {
            Some(ordering) => match op {
                BinOp::Lt => ordering.is_lt(),
                BinOp::Gt => ordering.is_gt(),
                BinOp::Le => ordering.is_le(),
                BinOp::Ge => ordering.is_ge(),
                _ => unreachable!(),
            },
            // NaN comparisons are false, like the IEEE semantics submitters expect.
            None => false,
        };
        Ok(Value::Bool(result))
    }

    /// Promote a numeric pair to f64; `None` when either side is not numeric.
    fn promote(lhs: &Value, rhs: &Value) -> Option<(f64, f64)> {
        let as_f64 = |v: &Value| match v {
            Value::Int(n) => Some(f64::from(*n)),
            Value::Float(n) => Some(*n),
            _ => None,
        };
        Some((as_f64(lhs)?, as_f64(rhs)?))
    }

    fn values_equal(lhs: &Value, rhs: &Value) -> bool {
        match Self::promote(lhs, rhs) {
            Some((a, b)) => a == b,
            None => lhs == rhs,
        }
    }
}

/// Statement-level control flow.
enum Flow {
    Normal,
    Return(Value),
}
