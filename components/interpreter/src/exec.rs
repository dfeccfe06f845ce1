//! Tree-walking evaluation of statements and expressions.

use crate::exception::Exception;
use crate::vm::{binding, VM};
use core_types::{ErrorKind, ObjectId, Value};
use memory_manager::Scope;
use parser::ast::{
    AssignmentTarget, BinaryOperator, Expression, ForInLeft, ForInit,
    Literal, LogicalOperator, Statement, UnaryOperator, UpdateOperator, VariableDeclarator,
    VariableKind,
};
use std::rc::Rc;

/// Lexical environment of the code being evaluated.
#[derive(Debug, Clone)]
pub(crate) struct Env {
    pub(crate) scope: ObjectId,
    pub(crate) this: Value,
    pub(crate) source: Rc<str>,
}

impl Env {
    fn with_scope(&self, scope: ObjectId) -> Self {
        Self {
            scope,
            this: self.this.clone(),
            source: self.source.clone(),
        }
    }
}

/// Statement completion. `Normal` carries the completion value when the
/// statement produced one.
#[derive(Debug, Clone)]
pub(crate) enum Completion {
    Normal(Option<Value>),
    Return(Value),
    Break,
    Continue,
}

type ExecResult = Result<Completion, Exception>;

/// Resolved reference for assignments and updates.
enum Reference {
    Binding(String),
    Property(Value, String),
}

fn has_lexical_declarations(body: &[Statement]) -> bool {
    body.iter().any(|s| {
        matches!(
            s,
            Statement::VariableDeclaration {
                kind: VariableKind::Let | VariableKind::Const,
                ..
            } | Statement::FunctionDeclaration { .. }
        )
    })
}

impl VM {
    /// Instantiates the function declarations directly inside `body`.
    ///
    /// At top level they become properties of the global object, elsewhere
    /// bindings of the current scope.
    pub(crate) fn instantiate_functions(
        &self,
        body: &[Statement],
        env: &Env,
        top_level: bool,
    ) -> Result<(), Exception> {
        for statement in body {
            if let Statement::FunctionDeclaration { function, .. } = statement {
                let name = function.name.clone().unwrap_or_default();
                let closure = Value::HeapObject(self.create_closure(function, env));
                if top_level {
                    self.define_own(self.realm().global, &name, closure, true);
                } else {
                    self.declare(env.scope, &name, closure, true);
                }
            }
        }
        Ok(())
    }

    fn declare(&self, scope: ObjectId, name: &str, value: Value, mutable: bool) {
        if let Some(scope) = self.heap_mut().scope_mut(scope) {
            scope.bindings.insert(name.to_string(), binding(value, mutable));
        }
    }

    fn new_scope(&self, parent: ObjectId) -> ObjectId {
        self.heap_mut().allocate_scope(Scope::new(Some(parent), false))
    }

    // ----- statements -----

    pub(crate) fn exec_statement(&self, statement: &Statement, env: &Env) -> ExecResult {
        self.set_position(statement.position());
        match statement {
            Statement::VariableDeclaration {
                kind, declarations, ..
            } => {
                self.exec_declarations(*kind, declarations, env)?;
                Ok(Completion::Normal(None))
            }
            Statement::FunctionDeclaration { .. } | Statement::EmptyStatement { .. } => {
                Ok(Completion::Normal(None))
            }
            Statement::ExpressionStatement { expression, .. } => {
                Ok(Completion::Normal(Some(self.eval_expression(expression, env)?)))
            }
            Statement::ReturnStatement { argument, .. } => {
                let value = match argument {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Statement::IfStatement {
                test,
                consequent,
                alternate,
                ..
            } => {
                if self.eval_expression(test, env)?.is_truthy() {
                    self.exec_statement(consequent, env)
                } else if let Some(alternate) = alternate {
                    self.exec_statement(alternate, env)
                } else {
                    Ok(Completion::Normal(None))
                }
            }
            Statement::WhileStatement { test, body, .. } => {
                let mut last = None;
                loop {
                    self.check_interrupt()?;
                    if !self.eval_expression(test, env)?.is_truthy() {
                        break;
                    }
                    match self.exec_statement(body, env)? {
                        Completion::Break => break,
                        Completion::Return(v) => return Ok(Completion::Return(v)),
                        Completion::Normal(Some(v)) => last = Some(v),
                        Completion::Normal(None) | Completion::Continue => {}
                    }
                }
                Ok(Completion::Normal(last))
            }
            Statement::DoWhileStatement { body, test, .. } => {
                let mut last = None;
                loop {
                    self.check_interrupt()?;
                    match self.exec_statement(body, env)? {
                        Completion::Break => break,
                        Completion::Return(v) => return Ok(Completion::Return(v)),
                        Completion::Normal(Some(v)) => last = Some(v),
                        Completion::Normal(None) | Completion::Continue => {}
                    }
                    if !self.eval_expression(test, env)?.is_truthy() {
                        break;
                    }
                }
                Ok(Completion::Normal(last))
            }
            Statement::ForStatement {
                init,
                test,
                update,
                body,
                ..
            } => self.exec_for(init.as_ref(), test.as_ref(), update.as_ref(), body, env),
            Statement::ForInStatement {
                left, right, body, ..
            } => self.exec_for_in(left, right, body, env),
            Statement::BlockStatement { body, .. } => self.exec_block(body, env),
            Statement::BreakStatement { .. } => Ok(Completion::Break),
            Statement::ContinueStatement { .. } => Ok(Completion::Continue),
            Statement::ThrowStatement { argument, .. } => {
                let value = self.eval_expression(argument, env)?;
                self.set_position(statement.position());
                Err(self.throw_value(value))
            }
            Statement::TryStatement {
                block,
                handler,
                finalizer,
                ..
            } => {
                let mut result = self.exec_block(block, env);
                if let Some(handler) = handler {
                    let thrown = match &result {
                        Err(Exception::Thrown { value, .. }) => Some(value.clone()),
                        _ => None,
                    };
                    if let Some(value) = thrown {
                        let scope = self.new_scope(env.scope);
                        if let Some(param) = &handler.param {
                            self.declare(scope, param, value, true);
                        }
                        result = self.exec_block(&handler.body, &env.with_scope(scope));
                    }
                }
                if let Some(finalizer) = finalizer {
                    if matches!(result, Err(Exception::Terminated { .. })) {
                        return result;
                    }
                    match self.exec_block(finalizer, env)? {
                        Completion::Normal(_) => {}
                        abrupt => return Ok(abrupt),
                    }
                }
                result
            }
        }
    }

    pub(crate) fn exec_block(&self, body: &[Statement], env: &Env) -> ExecResult {
        let inner;
        let env = if has_lexical_declarations(body) {
            inner = env.with_scope(self.new_scope(env.scope));
            self.instantiate_functions(body, &inner, false)?;
            &inner
        } else {
            env
        };
        let mut last = None;
        for statement in body {
            match self.exec_statement(statement, env)? {
                Completion::Normal(Some(v)) => last = Some(v),
                Completion::Normal(None) => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_declarations(
        &self,
        kind: VariableKind,
        declarations: &[VariableDeclarator],
        env: &Env,
    ) -> Result<(), Exception> {
        for declarator in declarations {
            let value = match &declarator.init {
                Some(init) => Some(self.eval_expression(init, env)?),
                None => None,
            };
            match kind {
                VariableKind::Var => {
                    if let Some(value) = value {
                        self.assign_binding(&declarator.name, value, env)?;
                    }
                }
                VariableKind::Let | VariableKind::Const => self.declare(
                    env.scope,
                    &declarator.name,
                    value.unwrap_or(Value::Undefined),
                    kind == VariableKind::Let,
                ),
            }
        }
        Ok(())
    }

    fn exec_for(
        &self,
        init: Option<&ForInit>,
        test: Option<&Expression>,
        update: Option<&Expression>,
        body: &Statement,
        env: &Env,
    ) -> ExecResult {
        let inner;
        let env = match init {
            Some(ForInit::VariableDeclaration { kind, declarations }) => {
                let env = if *kind == VariableKind::Var {
                    env
                } else {
                    inner = env.with_scope(self.new_scope(env.scope));
                    &inner
                };
                self.exec_declarations(*kind, declarations, env)?;
                env
            }
            Some(ForInit::Expression(expr)) => {
                self.eval_expression(expr, env)?;
                env
            }
            None => env,
        };
        let mut last = None;
        loop {
            self.check_interrupt()?;
            if let Some(test) = test {
                if !self.eval_expression(test, env)?.is_truthy() {
                    break;
                }
            }
            match self.exec_statement(body, env)? {
                Completion::Break => break,
                Completion::Return(v) => return Ok(Completion::Return(v)),
                Completion::Normal(Some(v)) => last = Some(v),
                Completion::Normal(None) | Completion::Continue => {}
            }
            if let Some(update) = update {
                self.eval_expression(update, env)?;
            }
        }
        Ok(Completion::Normal(last))
    }

    fn exec_for_in(
        &self,
        left: &ForInLeft,
        right: &Expression,
        body: &Statement,
        env: &Env,
    ) -> ExecResult {
        let target = self.eval_expression(right, env)?;
        let keys = match &target {
            Value::HeapObject(id) => self.enumerable_keys_with_prototypes(*id),
            Value::String(s) => (0..s.encode_utf16().count()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        };
        let inner;
        let env = match left {
            ForInLeft::Declaration(VariableKind::Let | VariableKind::Const, _) => {
                inner = env.with_scope(self.new_scope(env.scope));
                &inner
            }
            _ => env,
        };
        let mut last = None;
        for key in keys {
            self.check_interrupt()?;
            // Keys deleted during iteration are skipped.
            if let Value::HeapObject(id) = &target {
                if !self.has_property(*id, &key) {
                    continue;
                }
            }
            let key = Value::String(key);
            match left {
                ForInLeft::Declaration(VariableKind::Var, name) => {
                    self.assign_binding(name, key, env)?
                }
                ForInLeft::Declaration(kind, name) => {
                    self.declare(env.scope, name, key, *kind == VariableKind::Let)
                }
                ForInLeft::Target(target) => {
                    let reference = self.resolve_target(target, env)?;
                    self.put_reference(&reference, key, env)?;
                }
            }
            match self.exec_statement(body, env)? {
                Completion::Break => break,
                Completion::Return(v) => return Ok(Completion::Return(v)),
                Completion::Normal(Some(v)) => last = Some(v),
                Completion::Normal(None) | Completion::Continue => {}
            }
        }
        Ok(Completion::Normal(last))
    }

    // ----- bindings -----

    fn find_binding_scope(&self, name: &str, env: &Env) -> Option<ObjectId> {
        let heap = self.heap();
        let mut cursor = Some(env.scope);
        while let Some(id) = cursor {
            let scope = heap.scope(id)?;
            if scope.bindings.contains_key(name) {
                return Some(id);
            }
            cursor = scope.parent;
        }
        None
    }

    fn lookup_binding(&self, name: &str, env: &Env) -> Result<Option<Value>, Exception> {
        if let Some(scope) = self.find_binding_scope(name, env) {
            let heap = self.heap();
            return Ok(heap
                .scope(scope)
                .and_then(|s| s.bindings.get(name))
                .map(|b| b.value.clone()));
        }
        let global = self.realm().global;
        if self.has_property(global, name) {
            return self.get_property(&Value::HeapObject(global), name).map(Some);
        }
        Ok(None)
    }

    fn assign_binding(&self, name: &str, value: Value, env: &Env) -> Result<(), Exception> {
        if let Some(scope) = self.find_binding_scope(name, env) {
            let mut heap = self.heap_mut();
            if let Some(binding) = heap.scope_mut(scope).and_then(|s| s.bindings.get_mut(name)) {
                if !binding.mutable {
                    drop(heap);
                    return Err(
                        self.throw_error(ErrorKind::TypeError, "Assignment to constant variable.")
                    );
                }
                binding.value = value;
            }
            return Ok(());
        }
        self.set_property(&Value::HeapObject(self.realm().global), name, value)
    }

    fn resolve_target(&self, target: &AssignmentTarget, env: &Env) -> Result<Reference, Exception> {
        match target {
            AssignmentTarget::Identifier(name) => Ok(Reference::Binding(name.clone())),
            AssignmentTarget::Member(expr) => match expr.as_ref() {
                Expression::MemberExpression {
                    object,
                    property,
                    computed,
                    ..
                } => {
                    let base = self.eval_expression(object, env)?;
                    let key = self.member_key(property, *computed, env)?;
                    Ok(Reference::Property(base, key))
                }
                _ => Err(self.throw_error(
                    ErrorKind::SyntaxError,
                    "Invalid left-hand side in assignment",
                )),
            },
        }
    }

    fn get_reference(&self, reference: &Reference, env: &Env) -> Result<Value, Exception> {
        match reference {
            Reference::Binding(name) => match self.lookup_binding(name, env)? {
                Some(value) => Ok(value),
                None => Err(self.throw_error(
                    ErrorKind::ReferenceError,
                    format!("{} is not defined", name),
                )),
            },
            Reference::Property(base, key) => self.get_property(base, key),
        }
    }

    fn put_reference(&self, reference: &Reference, value: Value, env: &Env) -> Result<(), Exception> {
        match reference {
            Reference::Binding(name) => self.assign_binding(name, value, env),
            Reference::Property(base, key) => self.set_property(base, key, value),
        }
    }

    fn member_key(&self, property: &Expression, computed: bool, env: &Env) -> Result<String, Exception> {
        if !computed {
            if let Expression::Identifier { name, .. } = property {
                return Ok(name.clone());
            }
        }
        let key = self.eval_expression(property, env)?;
        self.to_property_key(&key)
    }

    // ----- expressions -----

    pub(crate) fn eval_expression(&self, expr: &Expression, env: &Env) -> Result<Value, Exception> {
        match expr {
            Expression::Identifier { name, .. } => {
                self.get_reference(&Reference::Binding(name.clone()), env)
            }
            Expression::Literal { value, .. } => Ok(match value {
                Literal::Number(n) => Value::from_f64(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
                Literal::Null => Value::Null,
            }),
            Expression::ThisExpression { .. } => Ok(env.this.clone()),
            Expression::ArrayExpression { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(match element {
                        Some(expr) => self.eval_expression(expr, env)?,
                        None => Value::Undefined,
                    });
                }
                Ok(Value::HeapObject(self.new_array(values)))
            }
            Expression::ObjectExpression { properties, .. } => {
                let object = self.new_object();
                for property in properties {
                    let value = self.eval_expression(&property.value, env)?;
                    self.set_property(&Value::HeapObject(object), &property.key, value)?;
                }
                Ok(Value::HeapObject(object))
            }
            Expression::FunctionExpression { function, .. } => {
                let Some(name) = &function.name else {
                    return Ok(Value::HeapObject(self.create_closure(function, env)));
                };
                // Named function expressions see their own name.
                let scope = self.new_scope(env.scope);
                let closure = self.create_closure(function, &env.with_scope(scope));
                self.declare(scope, name, Value::HeapObject(closure), false);
                Ok(Value::HeapObject(closure))
            }
            Expression::UnaryExpression {
                operator, argument, ..
            } => self.eval_unary(*operator, argument, env),
            Expression::UpdateExpression {
                operator,
                argument,
                prefix,
                ..
            } => {
                let reference = self.resolve_target(argument, env)?;
                let old = self.get_reference(&reference, env)?;
                let old = self.to_number_value(&old)?;
                let new = match operator {
                    UpdateOperator::Increment => old + 1.0,
                    UpdateOperator::Decrement => old - 1.0,
                };
                self.put_reference(&reference, Value::from_f64(new), env)?;
                Ok(Value::from_f64(if *prefix { new } else { old }))
            }
            Expression::BinaryExpression {
                left,
                operator,
                right,
                ..
            } => {
                let lhs = self.eval_expression(left, env)?;
                let rhs = self.eval_expression(right, env)?;
                self.binary_operation(*operator, &lhs, &rhs)
            }
            Expression::LogicalExpression {
                left,
                operator,
                right,
                ..
            } => {
                let lhs = self.eval_expression(left, env)?;
                match (operator, lhs.is_truthy()) {
                    (LogicalOperator::And, false) | (LogicalOperator::Or, true) => Ok(lhs),
                    _ => self.eval_expression(right, env),
                }
            }
            Expression::AssignmentExpression {
                left,
                operator,
                right,
                ..
            } => {
                let reference = self.resolve_target(left, env)?;
                let value = match operator.binary_operator() {
                    None => self.eval_expression(right, env)?,
                    Some(op) => {
                        let current = self.get_reference(&reference, env)?;
                        let rhs = self.eval_expression(right, env)?;
                        self.binary_operation(op, &current, &rhs)?
                    }
                };
                self.put_reference(&reference, value.clone(), env)?;
                Ok(value)
            }
            Expression::ConditionalExpression {
                test,
                consequent,
                alternate,
                ..
            } => {
                if self.eval_expression(test, env)?.is_truthy() {
                    self.eval_expression(consequent, env)
                } else {
                    self.eval_expression(alternate, env)
                }
            }
            Expression::CallExpression {
                callee, arguments, ..
            } => {
                let (function, this) = match callee.as_ref() {
                    Expression::MemberExpression {
                        object,
                        property,
                        computed,
                        ..
                    } => {
                        let base = self.eval_expression(object, env)?;
                        let key = self.member_key(property, *computed, env)?;
                        (self.get_property(&base, &key)?, base)
                    }
                    other => (self.eval_expression(other, env)?, Value::Undefined),
                };
                let args = self.eval_arguments(arguments, env)?;
                if !self.is_callable(&function) {
                    let name = describe_expression(callee);
                    return Err(self.throw_error(
                        ErrorKind::TypeError,
                        format!("{} is not a function", name),
                    ));
                }
                self.call_function(&function, this, &args)
            }
            Expression::MemberExpression {
                object,
                property,
                computed,
                ..
            } => {
                let base = self.eval_expression(object, env)?;
                let key = self.member_key(property, *computed, env)?;
                self.get_property(&base, &key)
            }
            Expression::NewExpression {
                callee, arguments, ..
            } => {
                let constructor = self.eval_expression(callee, env)?;
                let args = self.eval_arguments(arguments, env)?;
                self.construct_value(&constructor, &args, &describe_expression(callee))
            }
            Expression::SequenceExpression { expressions, .. } => {
                let mut last = Value::Undefined;
                for expr in expressions {
                    last = self.eval_expression(expr, env)?;
                }
                Ok(last)
            }
        }
    }

    fn eval_arguments(&self, arguments: &[Expression], env: &Env) -> Result<Vec<Value>, Exception> {
        arguments
            .iter()
            .map(|arg| self.eval_expression(arg, env))
            .collect()
    }

    fn eval_unary(
        &self,
        operator: UnaryOperator,
        argument: &Expression,
        env: &Env,
    ) -> Result<Value, Exception> {
        match operator {
            UnaryOperator::Typeof => {
                if let Expression::Identifier { name, .. } = argument {
                    return Ok(match self.lookup_binding(name, env)? {
                        Some(value) => Value::String(self.type_of(&value)),
                        None => Value::String("undefined".to_string()),
                    });
                }
                let value = self.eval_expression(argument, env)?;
                Ok(Value::String(self.type_of(&value)))
            }
            UnaryOperator::Delete => match argument {
                Expression::MemberExpression {
                    object,
                    property,
                    computed,
                    ..
                } => {
                    let base = self.eval_expression(object, env)?;
                    let key = self.member_key(property, *computed, env)?;
                    match base {
                        Value::HeapObject(id) => Ok(Value::Boolean(self.delete_property(id, &key))),
                        Value::Undefined | Value::Null => Err(self.throw_error(
                            ErrorKind::TypeError,
                            "Cannot convert undefined or null to object",
                        )),
                        _ => Ok(Value::Boolean(true)),
                    }
                }
                Expression::Identifier { .. } => Ok(Value::Boolean(false)),
                other => {
                    self.eval_expression(other, env)?;
                    Ok(Value::Boolean(true))
                }
            },
            UnaryOperator::Void => {
                self.eval_expression(argument, env)?;
                Ok(Value::Undefined)
            }
            UnaryOperator::Not => Ok(Value::Boolean(!self.eval_expression(argument, env)?.is_truthy())),
            UnaryOperator::Minus => {
                let value = self.eval_expression(argument, env)?;
                Ok(Value::from_f64(-self.to_number_value(&value)?))
            }
            UnaryOperator::Plus => {
                let value = self.eval_expression(argument, env)?;
                Ok(Value::from_f64(self.to_number_value(&value)?))
            }
            UnaryOperator::BitwiseNot => {
                let value = self.eval_expression(argument, env)?;
                let n = crate::ops::to_int32(self.to_number_value(&value)?);
                Ok(Value::Smi(!n))
            }
        }
    }

    fn binary_operation(
        &self,
        operator: BinaryOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, Exception> {
        use crate::ops::{to_int32, to_uint32};
        let number = |v: &Value| self.to_number_value(v);
        Ok(match operator {
            BinaryOperator::Add => return self.add_values(lhs, rhs),
            BinaryOperator::Sub => Value::from_f64(number(lhs)? - number(rhs)?),
            BinaryOperator::Mul => Value::from_f64(number(lhs)? * number(rhs)?),
            BinaryOperator::Div => Value::from_f64(number(lhs)? / number(rhs)?),
            BinaryOperator::Mod => Value::from_f64(number(lhs)? % number(rhs)?),
            BinaryOperator::Exp => Value::from_f64(crate::ops::power(number(lhs)?, number(rhs)?)),
            BinaryOperator::Eq => Value::Boolean(self.loose_equals(lhs, rhs)?),
            BinaryOperator::NotEq => Value::Boolean(!self.loose_equals(lhs, rhs)?),
            BinaryOperator::StrictEq => Value::Boolean(lhs == rhs),
            BinaryOperator::StrictNotEq => Value::Boolean(lhs != rhs),
            BinaryOperator::Lt => Value::Boolean(self.compare(lhs, rhs, false)? == Some(true)),
            BinaryOperator::Gt => Value::Boolean(self.compare(rhs, lhs, true)? == Some(true)),
            BinaryOperator::LtEq => Value::Boolean(self.compare(rhs, lhs, true)? == Some(false)),
            BinaryOperator::GtEq => Value::Boolean(self.compare(lhs, rhs, false)? == Some(false)),
            BinaryOperator::BitwiseAnd => Value::Smi(to_int32(number(lhs)?) & to_int32(number(rhs)?)),
            BinaryOperator::BitwiseOr => Value::Smi(to_int32(number(lhs)?) | to_int32(number(rhs)?)),
            BinaryOperator::BitwiseXor => Value::Smi(to_int32(number(lhs)?) ^ to_int32(number(rhs)?)),
            BinaryOperator::LeftShift => {
                let shift = to_uint32(number(rhs)?) & 31;
                Value::Smi(to_int32(number(lhs)?).wrapping_shl(shift))
            }
            BinaryOperator::RightShift => {
                let shift = to_uint32(number(rhs)?) & 31;
                Value::Smi(to_int32(number(lhs)?) >> shift)
            }
            BinaryOperator::UnsignedRightShift => {
                let shift = to_uint32(number(rhs)?) & 31;
                Value::from_f64(f64::from(to_uint32(number(lhs)?) >> shift))
            }
            BinaryOperator::Instanceof => Value::Boolean(self.instance_of(lhs, rhs)?),
            BinaryOperator::In => {
                let Value::HeapObject(id) = rhs else {
                    let key = self.to_display_string(lhs);
                    return Err(self.throw_error(
                        ErrorKind::TypeError,
                        format!(
                            "Cannot use 'in' operator to search for '{}' in {}",
                            key,
                            self.to_display_string(rhs)
                        ),
                    ));
                };
                let key = self.to_property_key(lhs)?;
                Value::Boolean(self.has_property(*id, &key))
            }
        })
    }
}

/// Short source-like rendering of a callee for error messages.
fn describe_expression(expr: &Expression) -> String {
    match expr {
        Expression::Identifier { name, .. } => name.clone(),
        Expression::ThisExpression { .. } => "this".to_string(),
        Expression::MemberExpression {
            object,
            property,
            computed: false,
            ..
        } => match property.as_ref() {
            Expression::Identifier { name, .. } => {
                format!("{}.{}", describe_expression(object), name)
            }
            _ => format!("{}[...]", describe_expression(object)),
        },
        Expression::MemberExpression { object, .. } => format!("{}[...]", describe_expression(object)),
        Expression::CallExpression { callee, .. } => format!("{}(...)", describe_expression(callee)),
        Expression::Literal { value, .. } => match value {
            Literal::Number(n) => core_types::number_to_string(*n),
            Literal::String(s) => format!("\"{}\"", s),
            Literal::Boolean(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        },
        _ => "expression".to_string(),
    }
}
