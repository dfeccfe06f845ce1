//! Recursive descent parser

use crate::ast::*;
use crate::error::*;
use crate::lexer::{Keyword, Lexer, Punctuator, SpannedToken, Token};
use core_types::{number_to_string, JsError, SourcePosition};
use std::rc::Rc;

/// Script parser
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    index: usize,
    /// Track loop depth for break/continue validation
    loop_depth: usize,
    /// Track function depth for return validation
    function_depth: usize,
    /// Track if we're in for loop init (disallows 'in' as relational operator)
    in_for_init: bool,
    /// `var` and function names of each enclosing function scope
    var_scopes: Vec<Vec<String>>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            index: 0,
            loop_depth: 0,
            function_depth: 0,
            in_for_init: false,
            var_scopes: Vec::new(),
        }
    }

    /// Parse the source into a program
    pub fn parse(&mut self) -> Result<Program, JsError> {
        self.tokens = Lexer::new(self.source).tokenize()?;
        self.index = 0;
        self.var_scopes.push(Vec::new());
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        let var_names = self.var_scopes.pop().unwrap_or_default();
        Ok(Program { body, var_names })
    }

    // ----- token helpers -----

    fn current(&self) -> &SpannedToken {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn position(&self) -> SourcePosition {
        self.current().position
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::EOF)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.index += 1;
        }
        token
    }

    fn check_punctuator(&self, punct: Punctuator) -> bool {
        matches!(self.peek(), Token::Punctuator(p) if *p == punct)
    }

    fn eat_punctuator(&mut self, punct: Punctuator) -> bool {
        if self.check_punctuator(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punctuator(&mut self, punct: Punctuator) -> Result<(), JsError> {
        if self.eat_punctuator(punct) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Token::Keyword(k) if *k == keyword)
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), JsError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_identifier(&mut self) -> Result<String, JsError> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> JsError {
        let position = Some(self.position());
        match self.peek() {
            Token::EOF => unexpected_eof(position),
            other => unexpected_token(&other.describe(), position),
        }
    }

    /// Automatic semicolon insertion: a statement may end at `;`, before `}`,
    /// at end of input, or at a line break.
    fn consume_semicolon(&mut self) -> Result<(), JsError> {
        if self.eat_punctuator(Punctuator::Semicolon)
            || self.check_punctuator(Punctuator::RBrace)
            || self.is_at_end()
            || self.current().newline_before
        {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn declare_var(&mut self, name: &str) {
        if let Some(scope) = self.var_scopes.last_mut() {
            if !scope.iter().any(|n| n == name) {
                scope.push(name.to_string());
            }
        }
    }

    // ----- statements -----

    fn parse_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        match self.peek().clone() {
            Token::Punctuator(Punctuator::LBrace) => {
                let body = self.parse_block_body()?;
                Ok(Statement::BlockStatement { body, position })
            }
            Token::Punctuator(Punctuator::Semicolon) => {
                self.advance();
                Ok(Statement::EmptyStatement { position })
            }
            Token::Keyword(Keyword::Var | Keyword::Let | Keyword::Const) => {
                let (kind, declarations) = self.parse_variable_declarations()?;
                self.consume_semicolon()?;
                Ok(Statement::VariableDeclaration {
                    kind,
                    declarations,
                    position,
                })
            }
            Token::Keyword(Keyword::Function) => {
                self.advance();
                let function = self.parse_function(true)?;
                if let Some(name) = &function.name {
                    let name = name.clone();
                    self.declare_var(&name);
                }
                Ok(Statement::FunctionDeclaration { function, position })
            }
            Token::Keyword(Keyword::Return) => self.parse_return_statement(),
            Token::Keyword(Keyword::If) => self.parse_if_statement(),
            Token::Keyword(Keyword::While) => self.parse_while_statement(),
            Token::Keyword(Keyword::Do) => self.parse_do_while_statement(),
            Token::Keyword(Keyword::For) => self.parse_for_statement(),
            Token::Keyword(Keyword::Break) => {
                self.advance();
                if self.loop_depth == 0 {
                    return Err(syntax_error("Illegal break statement", position));
                }
                self.consume_semicolon()?;
                Ok(Statement::BreakStatement { position })
            }
            Token::Keyword(Keyword::Continue) => {
                self.advance();
                if self.loop_depth == 0 {
                    return Err(syntax_error(
                        "Illegal continue statement: no surrounding iteration statement",
                        position,
                    ));
                }
                self.consume_semicolon()?;
                Ok(Statement::ContinueStatement { position })
            }
            Token::Keyword(Keyword::Throw) => self.parse_throw_statement(),
            Token::Keyword(Keyword::Try) => self.parse_try_statement(),
            _ => {
                let expression = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::ExpressionStatement {
                    expression,
                    position,
                })
            }
        }
    }

    fn parse_block_body(&mut self) -> Result<Vec<Statement>, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut body = Vec::new();
        while !self.check_punctuator(Punctuator::RBrace) {
            if self.is_at_end() {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn parse_variable_kind(&mut self) -> Result<VariableKind, JsError> {
        let kind = match self.peek() {
            Token::Keyword(Keyword::Var) => VariableKind::Var,
            Token::Keyword(Keyword::Let) => VariableKind::Let,
            Token::Keyword(Keyword::Const) => VariableKind::Const,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(kind)
    }

    fn parse_variable_declarations(
        &mut self,
    ) -> Result<(VariableKind, Vec<VariableDeclarator>), JsError> {
        let kind = self.parse_variable_kind()?;
        let mut declarations = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            declarations.push(self.parse_declarator_rest(kind, name)?);
            if !self.eat_punctuator(Punctuator::Comma) {
                break;
            }
        }
        Ok((kind, declarations))
    }

    fn parse_declarator_rest(
        &mut self,
        kind: VariableKind,
        name: String,
    ) -> Result<VariableDeclarator, JsError> {
        let position = Some(self.position());
        let init = if self.eat_punctuator(Punctuator::Assign) {
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };
        if kind == VariableKind::Const && init.is_none() && !self.in_for_init {
            return Err(syntax_error("Missing initializer in const declaration", position));
        }
        if kind == VariableKind::Var {
            self.declare_var(&name);
        }
        Ok(VariableDeclarator { name, init })
    }

    fn parse_function(&mut self, require_name: bool) -> Result<Rc<FunctionNode>, JsError> {
        let position = Some(self.position());
        let name = match self.peek() {
            Token::Identifier(_) => Some(self.expect_identifier()?),
            _ if require_name => return Err(self.unexpected()),
            _ => None,
        };
        self.parse_function_rest(name, position)
    }

    fn parse_function_rest(
        &mut self,
        name: Option<String>,
        position: Option<SourcePosition>,
    ) -> Result<Rc<FunctionNode>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let mut params = Vec::new();
        while !self.eat_punctuator(Punctuator::RParen) {
            params.push(self.expect_identifier()?);
            if !self.check_punctuator(Punctuator::RParen) {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }

        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        let saved_for_init = std::mem::replace(&mut self.in_for_init, false);
        self.function_depth += 1;
        self.var_scopes.push(Vec::new());
        let body = self.parse_block_body();
        let var_names = self.var_scopes.pop().unwrap_or_default();
        self.function_depth -= 1;
        self.loop_depth = saved_loop_depth;
        self.in_for_init = saved_for_init;

        Ok(Rc::new(FunctionNode {
            name,
            params,
            body: body?,
            var_names,
            position,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        self.advance();
        if self.function_depth == 0 {
            return Err(syntax_error("Illegal return statement", position));
        }
        let argument = if self.check_punctuator(Punctuator::Semicolon)
            || self.check_punctuator(Punctuator::RBrace)
            || self.is_at_end()
            || self.current().newline_before
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::ReturnStatement { argument, position })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        self.advance();
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::IfStatement {
            test,
            consequent,
            alternate,
            position,
        })
    }

    fn parse_loop_body(&mut self) -> Result<Box<Statement>, JsError> {
        self.loop_depth += 1;
        let body = self.parse_statement();
        self.loop_depth -= 1;
        Ok(Box::new(body?))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        self.advance();
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::WhileStatement {
            test,
            body,
            position,
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        self.advance();
        let body = self.parse_loop_body()?;
        self.expect_keyword(Keyword::While)?;
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        self.eat_punctuator(Punctuator::Semicolon);
        Ok(Statement::DoWhileStatement {
            body,
            test,
            position,
        })
    }

    fn parse_for_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        self.advance();
        self.expect_punctuator(Punctuator::LParen)?;

        let saved_for_init = std::mem::replace(&mut self.in_for_init, true);
        let init = self.parse_for_init();
        self.in_for_init = saved_for_init;

        let init = match init? {
            ForHead::In(left) => {
                let right = self.parse_expression()?;
                self.expect_punctuator(Punctuator::RParen)?;
                let body = self.parse_loop_body()?;
                return Ok(Statement::ForInStatement {
                    left,
                    right,
                    body,
                    position,
                });
            }
            ForHead::Init(init) => init,
        };

        self.expect_punctuator(Punctuator::Semicolon)?;
        let test = if self.check_punctuator(Punctuator::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::Semicolon)?;
        let update = if self.check_punctuator(Punctuator::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::ForStatement {
            init,
            test,
            update,
            body,
            position,
        })
    }

    fn parse_for_init(&mut self) -> Result<ForHead, JsError> {
        if self.check_punctuator(Punctuator::Semicolon) {
            return Ok(ForHead::Init(None));
        }
        if matches!(
            self.peek(),
            Token::Keyword(Keyword::Var | Keyword::Let | Keyword::Const)
        ) {
            let kind = self.parse_variable_kind()?;
            let name = self.expect_identifier()?;
            if self.eat_keyword(Keyword::In) {
                if kind == VariableKind::Var {
                    self.declare_var(&name);
                }
                return Ok(ForHead::In(ForInLeft::Declaration(kind, name)));
            }
            let mut declarations = vec![self.parse_declarator_rest(kind, name)?];
            while self.eat_punctuator(Punctuator::Comma) {
                let name = self.expect_identifier()?;
                declarations.push(self.parse_declarator_rest(kind, name)?);
            }
            return Ok(ForHead::Init(Some(ForInit::VariableDeclaration {
                kind,
                declarations,
            })));
        }
        let expression = self.parse_expression()?;
        if self.check_keyword(Keyword::In) {
            let target =
                self.to_assignment_target(expression, "Invalid left-hand side in for-in loop")?;
            self.advance();
            return Ok(ForHead::In(ForInLeft::Target(target)));
        }
        Ok(ForHead::Init(Some(ForInit::Expression(expression))))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        self.advance();
        if self.current().newline_before {
            return Err(syntax_error("Illegal newline after throw", position));
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::ThrowStatement { argument, position })
    }

    fn parse_try_statement(&mut self) -> Result<Statement, JsError> {
        let position = Some(self.position());
        self.advance();
        let block = self.parse_block_body()?;
        let handler = if self.eat_keyword(Keyword::Catch) {
            let param = if self.eat_punctuator(Punctuator::LParen) {
                let name = self.expect_identifier()?;
                self.expect_punctuator(Punctuator::RParen)?;
                Some(name)
            } else {
                None
            };
            let body = self.parse_block_body()?;
            Some(CatchClause { param, body })
        } else {
            None
        };
        let finalizer = if self.eat_keyword(Keyword::Finally) {
            Some(self.parse_block_body()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(syntax_error("Missing catch or finally after try", position));
        }
        Ok(Statement::TryStatement {
            block,
            handler,
            finalizer,
            position,
        })
    }

    // ----- expressions -----

    fn parse_expression(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        let first = self.parse_assignment_expression()?;
        if !self.check_punctuator(Punctuator::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat_punctuator(Punctuator::Comma) {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::SequenceExpression {
            expressions,
            position,
        })
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        let left = self.parse_conditional_expression()?;
        let operator = match self.peek() {
            Token::Punctuator(Punctuator::Assign) => AssignmentOperator::Assign,
            Token::Punctuator(Punctuator::PlusEq) => AssignmentOperator::AddAssign,
            Token::Punctuator(Punctuator::MinusEq) => AssignmentOperator::SubAssign,
            Token::Punctuator(Punctuator::StarEq) => AssignmentOperator::MulAssign,
            Token::Punctuator(Punctuator::SlashEq) => AssignmentOperator::DivAssign,
            Token::Punctuator(Punctuator::PercentEq) => AssignmentOperator::ModAssign,
            _ => return Ok(left),
        };
        let target = self.to_assignment_target(left, "Invalid left-hand side in assignment")?;
        self.advance();
        let right = Box::new(self.parse_assignment_expression()?);
        Ok(Expression::AssignmentExpression {
            left: target,
            operator,
            right,
            position,
        })
    }

    fn to_assignment_target(
        &self,
        expression: Expression,
        message: &str,
    ) -> Result<AssignmentTarget, JsError> {
        match expression {
            Expression::Identifier { name, .. } => Ok(AssignmentTarget::Identifier(name)),
            member @ Expression::MemberExpression { .. } => {
                Ok(AssignmentTarget::Member(Box::new(member)))
            }
            other => Err(syntax_error(message, other.position())),
        }
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        let test = self.parse_binary_expression(1)?;
        if !self.eat_punctuator(Punctuator::Question) {
            return Ok(test);
        }
        let saved_for_init = std::mem::replace(&mut self.in_for_init, false);
        let consequent = self.parse_assignment_expression();
        self.in_for_init = saved_for_init;
        let consequent = Box::new(consequent?);
        self.expect_punctuator(Punctuator::Colon)?;
        let alternate = Box::new(self.parse_assignment_expression()?);
        Ok(Expression::ConditionalExpression {
            test: Box::new(test),
            consequent,
            alternate,
            position,
        })
    }

    /// Binary operator at the current token with its precedence.
    fn binary_operator(&self) -> Option<(BinaryOp, u8)> {
        let op = match self.peek() {
            Token::Punctuator(p) => match p {
                Punctuator::OrOr => (BinaryOp::Logical(LogicalOperator::Or), 1),
                Punctuator::AndAnd => (BinaryOp::Logical(LogicalOperator::And), 2),
                Punctuator::Or => (BinaryOp::Binary(BinaryOperator::BitwiseOr), 3),
                Punctuator::Xor => (BinaryOp::Binary(BinaryOperator::BitwiseXor), 4),
                Punctuator::And => (BinaryOp::Binary(BinaryOperator::BitwiseAnd), 5),
                Punctuator::EqEq => (BinaryOp::Binary(BinaryOperator::Eq), 6),
                Punctuator::NotEq => (BinaryOp::Binary(BinaryOperator::NotEq), 6),
                Punctuator::EqEqEq => (BinaryOp::Binary(BinaryOperator::StrictEq), 6),
                Punctuator::NotEqEq => (BinaryOp::Binary(BinaryOperator::StrictNotEq), 6),
                Punctuator::Lt => (BinaryOp::Binary(BinaryOperator::Lt), 7),
                Punctuator::LtEq => (BinaryOp::Binary(BinaryOperator::LtEq), 7),
                Punctuator::Gt => (BinaryOp::Binary(BinaryOperator::Gt), 7),
                Punctuator::GtEq => (BinaryOp::Binary(BinaryOperator::GtEq), 7),
                Punctuator::LtLt => (BinaryOp::Binary(BinaryOperator::LeftShift), 8),
                Punctuator::GtGt => (BinaryOp::Binary(BinaryOperator::RightShift), 8),
                Punctuator::GtGtGt => (BinaryOp::Binary(BinaryOperator::UnsignedRightShift), 8),
                Punctuator::Plus => (BinaryOp::Binary(BinaryOperator::Add), 9),
                Punctuator::Minus => (BinaryOp::Binary(BinaryOperator::Sub), 9),
                Punctuator::Star => (BinaryOp::Binary(BinaryOperator::Mul), 10),
                Punctuator::Slash => (BinaryOp::Binary(BinaryOperator::Div), 10),
                Punctuator::Percent => (BinaryOp::Binary(BinaryOperator::Mod), 10),
                Punctuator::StarStar => (BinaryOp::Binary(BinaryOperator::Exp), 11),
                _ => return None,
            },
            Token::Keyword(Keyword::Instanceof) => {
                (BinaryOp::Binary(BinaryOperator::Instanceof), 7)
            }
            Token::Keyword(Keyword::In) if !self.in_for_init => {
                (BinaryOp::Binary(BinaryOperator::In), 7)
            }
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> Result<Expression, JsError> {
        let mut left = self.parse_unary_expression()?;
        while let Some((op, precedence)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            let position = left.position();
            self.advance();
            // `**` is right-associative
            let next = if precedence == 11 {
                precedence
            } else {
                precedence + 1
            };
            let right = Box::new(self.parse_binary_expression(next)?);
            left = match op {
                BinaryOp::Binary(operator) => Expression::BinaryExpression {
                    left: Box::new(left),
                    operator,
                    right,
                    position,
                },
                BinaryOp::Logical(operator) => Expression::LogicalExpression {
                    left: Box::new(left),
                    operator,
                    right,
                    position,
                },
            };
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        let operator = match self.peek() {
            Token::Punctuator(Punctuator::Not) => Some(UnaryOperator::Not),
            Token::Punctuator(Punctuator::Minus) => Some(UnaryOperator::Minus),
            Token::Punctuator(Punctuator::Plus) => Some(UnaryOperator::Plus),
            Token::Punctuator(Punctuator::Tilde) => Some(UnaryOperator::BitwiseNot),
            Token::Keyword(Keyword::Typeof) => Some(UnaryOperator::Typeof),
            Token::Keyword(Keyword::Void) => Some(UnaryOperator::Void),
            Token::Keyword(Keyword::Delete) => Some(UnaryOperator::Delete),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let argument = Box::new(self.parse_unary_expression()?);
            return Ok(Expression::UnaryExpression {
                operator,
                argument,
                position,
            });
        }

        let update = match self.peek() {
            Token::Punctuator(Punctuator::PlusPlus) => Some(UpdateOperator::Increment),
            Token::Punctuator(Punctuator::MinusMinus) => Some(UpdateOperator::Decrement),
            _ => None,
        };
        if let Some(operator) = update {
            self.advance();
            let operand = self.parse_unary_expression()?;
            let argument = self.to_assignment_target(
                operand,
                "Invalid left-hand side expression in prefix operation",
            )?;
            return Ok(Expression::UpdateExpression {
                operator,
                argument,
                prefix: true,
                position,
            });
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        let expression = self.parse_left_hand_side_expression()?;
        if self.current().newline_before {
            return Ok(expression);
        }
        let operator = match self.peek() {
            Token::Punctuator(Punctuator::PlusPlus) => UpdateOperator::Increment,
            Token::Punctuator(Punctuator::MinusMinus) => UpdateOperator::Decrement,
            _ => return Ok(expression),
        };
        let argument = self.to_assignment_target(
            expression,
            "Invalid left-hand side expression in postfix operation",
        )?;
        self.advance();
        Ok(Expression::UpdateExpression {
            operator,
            argument,
            prefix: false,
            position,
        })
    }

    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, JsError> {
        let mut expression = if self.check_keyword(Keyword::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        loop {
            let position = Some(self.position());
            if self.check_punctuator(Punctuator::LParen) {
                let arguments = self.parse_arguments()?;
                expression = Expression::CallExpression {
                    callee: Box::new(expression),
                    arguments,
                    position,
                };
            } else if self.at_member_access() {
                expression = self.parse_member_access(expression)?;
            } else {
                return Ok(expression);
            }
        }
    }

    fn at_member_access(&self) -> bool {
        self.check_punctuator(Punctuator::Dot) || self.check_punctuator(Punctuator::LBracket)
    }

    /// Parses `.name` or `[expr]` after `object`.
    fn parse_member_access(&mut self, object: Expression) -> Result<Expression, JsError> {
        let position = Some(self.position());
        if self.eat_punctuator(Punctuator::Dot) {
            let name_position = Some(self.position());
            let name = match self.peek() {
                Token::Identifier(name) => name.clone(),
                Token::Keyword(keyword) => keyword.as_str().to_string(),
                _ => return Err(self.unexpected()),
            };
            self.advance();
            return Ok(Expression::MemberExpression {
                object: Box::new(object),
                property: Box::new(Expression::Identifier {
                    name,
                    position: name_position,
                }),
                computed: false,
                position,
            });
        }
        self.expect_punctuator(Punctuator::LBracket)?;
        let saved_for_init = std::mem::replace(&mut self.in_for_init, false);
        let property = self.parse_expression();
        self.in_for_init = saved_for_init;
        let property = Box::new(property?);
        self.expect_punctuator(Punctuator::RBracket)?;
        Ok(Expression::MemberExpression {
            object: Box::new(object),
            property,
            computed: true,
            position,
        })
    }

    fn parse_new_expression(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        self.expect_keyword(Keyword::New)?;
        let mut callee = if self.check_keyword(Keyword::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        while self.at_member_access() {
            callee = self.parse_member_access(callee)?;
        }
        let arguments = if self.check_punctuator(Punctuator::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expression::NewExpression {
            callee: Box::new(callee),
            arguments,
            position,
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let saved_for_init = std::mem::replace(&mut self.in_for_init, false);
        let mut arguments = Vec::new();
        let result = loop {
            if self.eat_punctuator(Punctuator::RParen) {
                break Ok(());
            }
            match self.parse_assignment_expression() {
                Ok(argument) => arguments.push(argument),
                Err(e) => break Err(e),
            }
            if !self.check_punctuator(Punctuator::RParen) {
                if let Err(e) = self.expect_punctuator(Punctuator::Comma) {
                    break Err(e);
                }
            }
        };
        self.in_for_init = saved_for_init;
        result.map(|_| arguments)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(Expression::Identifier { name, position })
            }
            Token::Number(n) => {
                self.advance();
                Ok(Expression::Literal {
                    value: Literal::Number(n),
                    position,
                })
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::Literal {
                    value: Literal::String(s),
                    position,
                })
            }
            Token::Keyword(Keyword::True | Keyword::False) => {
                let value = self.check_keyword(Keyword::True);
                self.advance();
                Ok(Expression::Literal {
                    value: Literal::Boolean(value),
                    position,
                })
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expression::Literal {
                    value: Literal::Null,
                    position,
                })
            }
            Token::Keyword(Keyword::This) => {
                self.advance();
                Ok(Expression::ThisExpression { position })
            }
            Token::Keyword(Keyword::Function) => {
                self.advance();
                let function = self.parse_function(false)?;
                Ok(Expression::FunctionExpression { function, position })
            }
            Token::Punctuator(Punctuator::LParen) => {
                self.advance();
                let saved_for_init = std::mem::replace(&mut self.in_for_init, false);
                let expression = self.parse_expression();
                self.in_for_init = saved_for_init;
                let expression = expression?;
                self.expect_punctuator(Punctuator::RParen)?;
                Ok(expression)
            }
            Token::Punctuator(Punctuator::LBracket) => self.parse_array_literal(),
            Token::Punctuator(Punctuator::LBrace) => self.parse_object_literal(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        self.expect_punctuator(Punctuator::LBracket)?;
        let saved_for_init = std::mem::replace(&mut self.in_for_init, false);
        let mut elements = Vec::new();
        let result = loop {
            if self.eat_punctuator(Punctuator::RBracket) {
                break Ok(());
            }
            if self.eat_punctuator(Punctuator::Comma) {
                elements.push(None);
                continue;
            }
            match self.parse_assignment_expression() {
                Ok(element) => elements.push(Some(element)),
                Err(e) => break Err(e),
            }
            if !self.check_punctuator(Punctuator::RBracket) {
                if let Err(e) = self.expect_punctuator(Punctuator::Comma) {
                    break Err(e);
                }
            }
        };
        self.in_for_init = saved_for_init;
        result?;
        Ok(Expression::ArrayExpression { elements, position })
    }

    fn parse_object_literal(&mut self) -> Result<Expression, JsError> {
        let position = Some(self.position());
        self.expect_punctuator(Punctuator::LBrace)?;
        let saved_for_init = std::mem::replace(&mut self.in_for_init, false);
        let mut properties = Vec::new();
        let result = loop {
            if self.eat_punctuator(Punctuator::RBrace) {
                break Ok(());
            }
            match self.parse_object_property() {
                Ok(property) => properties.push(property),
                Err(e) => break Err(e),
            }
            if !self.check_punctuator(Punctuator::RBrace) {
                if let Err(e) = self.expect_punctuator(Punctuator::Comma) {
                    break Err(e);
                }
            }
        };
        self.in_for_init = saved_for_init;
        result?;
        Ok(Expression::ObjectExpression {
            properties,
            position,
        })
    }

    fn parse_object_property(&mut self) -> Result<ObjectProperty, JsError> {
        let position = Some(self.position());
        let (key, shorthand_allowed) = match self.peek() {
            Token::Identifier(name) => (name.clone(), true),
            Token::Keyword(keyword) => (keyword.as_str().to_string(), false),
            Token::String(s) => (s.clone(), false),
            Token::Number(n) => (number_to_string(*n), false),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        if self.eat_punctuator(Punctuator::Colon) {
            let value = self.parse_assignment_expression()?;
            return Ok(ObjectProperty { key, value });
        }
        if self.check_punctuator(Punctuator::LParen) {
            let function = self.parse_function_rest(Some(key.clone()), position)?;
            return Ok(ObjectProperty {
                key,
                value: Expression::FunctionExpression { function, position },
            });
        }
        if shorthand_allowed
            && (self.check_punctuator(Punctuator::Comma) || self.check_punctuator(Punctuator::RBrace))
        {
            let value = Expression::Identifier {
                name: key.clone(),
                position,
            };
            return Ok(ObjectProperty { key, value });
        }
        Err(self.unexpected())
    }
}

enum ForHead {
    Init(Option<ForInit>),
    In(ForInLeft),
}

#[derive(Clone, Copy)]
enum BinaryOp {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

/// Parses `source` into a program.
pub fn parse(source: &str) -> Result<Program, JsError> {
    Parser::new(source).parse()
}
