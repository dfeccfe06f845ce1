//! Abstract Syntax Tree node definitions

use core_types::SourcePosition;
use std::rc::Rc;

/// A parsed script
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Top-level statements
    pub body: Vec<Statement>,
    /// Names declared with `var` or `function` anywhere in the top-level scope
    pub var_names: Vec<String>,
}

/// A function literal shared by declarations and expressions.
///
/// Nodes are reference counted so that function objects created at run time
/// can keep their code without copying the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    /// Function name, if any
    pub name: Option<String>,
    /// Parameter names
    pub params: Vec<String>,
    /// Function body
    pub body: Vec<Statement>,
    /// Names declared with `var` or `function` in the function scope
    pub var_names: Vec<String>,
    /// Source location of the `function` keyword
    pub position: Option<SourcePosition>,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable declaration (var, let, const)
    VariableDeclaration {
        /// Declaration kind
        kind: VariableKind,
        /// List of declarators
        declarations: Vec<VariableDeclarator>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Function declaration
    FunctionDeclaration {
        /// The function
        function: Rc<FunctionNode>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Expression statement
    ExpressionStatement {
        /// The expression
        expression: Expression,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Return statement
    ReturnStatement {
        /// Return value
        argument: Option<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// If statement
    IfStatement {
        /// Condition
        test: Expression,
        /// Consequent
        consequent: Box<Statement>,
        /// Alternate
        alternate: Option<Box<Statement>>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// While loop
    WhileStatement {
        /// Loop condition
        test: Expression,
        /// Loop body
        body: Box<Statement>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Do-while loop
    DoWhileStatement {
        /// Loop body
        body: Box<Statement>,
        /// Loop condition
        test: Expression,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// For loop
    ForStatement {
        /// Initialization
        init: Option<ForInit>,
        /// Condition
        test: Option<Expression>,
        /// Update expression
        update: Option<Expression>,
        /// Loop body
        body: Box<Statement>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// For...in loop
    ForInStatement {
        /// Loop variable
        left: ForInLeft,
        /// Object whose keys are enumerated
        right: Expression,
        /// Loop body
        body: Box<Statement>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Block statement
    BlockStatement {
        /// Block body
        body: Vec<Statement>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Empty statement
    EmptyStatement {
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Break statement
    BreakStatement {
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Continue statement
    ContinueStatement {
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Throw statement
    ThrowStatement {
        /// Exception to throw
        argument: Expression,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Try statement
    TryStatement {
        /// Try block
        block: Vec<Statement>,
        /// Catch clause
        handler: Option<CatchClause>,
        /// Finally block
        finalizer: Option<Vec<Statement>>,
        /// Source location
        position: Option<SourcePosition>,
    },
}

impl Statement {
    /// Source location of the statement.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Statement::VariableDeclaration { position, .. }
            | Statement::FunctionDeclaration { position, .. }
            | Statement::ExpressionStatement { position, .. }
            | Statement::ReturnStatement { position, .. }
            | Statement::IfStatement { position, .. }
            | Statement::WhileStatement { position, .. }
            | Statement::DoWhileStatement { position, .. }
            | Statement::ForStatement { position, .. }
            | Statement::ForInStatement { position, .. }
            | Statement::BlockStatement { position, .. }
            | Statement::EmptyStatement { position }
            | Statement::BreakStatement { position }
            | Statement::ContinueStatement { position }
            | Statement::ThrowStatement { position, .. }
            | Statement::TryStatement { position, .. } => *position,
        }
    }
}

/// Declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// var
    Var,
    /// let
    Let,
    /// const
    Const,
}

/// A single `name = init` declarator
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// Bound name
    pub name: String,
    /// Initializer
    pub init: Option<Expression>,
}

/// Catch clause of a try statement
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// Bound exception name, if any
    pub param: Option<String>,
    /// Handler body
    pub body: Vec<Statement>,
}

/// For loop initialization
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// Variable declaration
    VariableDeclaration {
        /// Declaration kind
        kind: VariableKind,
        /// Declarators
        declarations: Vec<VariableDeclarator>,
    },
    /// Expression
    Expression(Expression),
}

/// Left side of a for...in loop
#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    /// `for (var k in o)`
    Declaration(VariableKind, String),
    /// `for (k in o)` or `for (o.k in p)`
    Target(AssignmentTarget),
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Identifier reference
    Identifier {
        /// Variable name
        name: String,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Literal value
    Literal {
        /// Literal value
        value: Literal,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// `this`
    ThisExpression {
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Array literal; holes are `None`
    ArrayExpression {
        /// Elements
        elements: Vec<Option<Expression>>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Object literal
    ObjectExpression {
        /// Properties in source order
        properties: Vec<ObjectProperty>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Function expression
    FunctionExpression {
        /// The function
        function: Rc<FunctionNode>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Unary operation
    UnaryExpression {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        argument: Box<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Update expression (++, --)
    UpdateExpression {
        /// Operator
        operator: UpdateOperator,
        /// Operand
        argument: AssignmentTarget,
        /// Is prefix operator
        prefix: bool,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Binary operation
    BinaryExpression {
        /// Left operand
        left: Box<Expression>,
        /// Operator
        operator: BinaryOperator,
        /// Right operand
        right: Box<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Logical expression (&&, ||)
    LogicalExpression {
        /// Left operand
        left: Box<Expression>,
        /// Operator
        operator: LogicalOperator,
        /// Right operand
        right: Box<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Assignment expression
    AssignmentExpression {
        /// Left-hand side
        left: AssignmentTarget,
        /// Operator
        operator: AssignmentOperator,
        /// Right-hand side
        right: Box<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Conditional expression (ternary)
    ConditionalExpression {
        /// Condition
        test: Box<Expression>,
        /// Consequent
        consequent: Box<Expression>,
        /// Alternate
        alternate: Box<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Function call
    CallExpression {
        /// Function being called
        callee: Box<Expression>,
        /// Arguments
        arguments: Vec<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Member access (obj.prop or obj[prop])
    MemberExpression {
        /// Object
        object: Box<Expression>,
        /// Property; an identifier when not computed
        property: Box<Expression>,
        /// Is computed (bracket notation)
        computed: bool,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// New expression
    NewExpression {
        /// Constructor
        callee: Box<Expression>,
        /// Arguments
        arguments: Vec<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },

    /// Comma-separated sequence
    SequenceExpression {
        /// Expressions, evaluated left to right
        expressions: Vec<Expression>,
        /// Source location
        position: Option<SourcePosition>,
    },
}

impl Expression {
    /// Source location of the expression.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Expression::Identifier { position, .. }
            | Expression::Literal { position, .. }
            | Expression::ThisExpression { position }
            | Expression::ArrayExpression { position, .. }
            | Expression::ObjectExpression { position, .. }
            | Expression::FunctionExpression { position, .. }
            | Expression::UnaryExpression { position, .. }
            | Expression::UpdateExpression { position, .. }
            | Expression::BinaryExpression { position, .. }
            | Expression::LogicalExpression { position, .. }
            | Expression::AssignmentExpression { position, .. }
            | Expression::ConditionalExpression { position, .. }
            | Expression::CallExpression { position, .. }
            | Expression::MemberExpression { position, .. }
            | Expression::NewExpression { position, .. }
            | Expression::SequenceExpression { position, .. } => *position,
        }
    }
}

/// A `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    /// Property name (identifiers, strings and numbers normalize to strings)
    pub key: String,
    /// Property value
    pub value: Expression,
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Number
    Number(f64),
    /// String
    String(String),
    /// Boolean
    Boolean(bool),
    /// Null
    Null,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
    /// Modulo
    Mod,
    /// Exponentiation
    Exp,
    /// Equality
    Eq,
    /// Inequality
    NotEq,
    /// Strict equality
    StrictEq,
    /// Strict inequality
    StrictNotEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,
    /// Bitwise AND
    BitwiseAnd,
    /// Bitwise OR
    BitwiseOr,
    /// Bitwise XOR
    BitwiseXor,
    /// Left shift
    LeftShift,
    /// Right shift
    RightShift,
    /// Unsigned right shift
    UnsignedRightShift,
    /// Instanceof
    Instanceof,
    /// In
    In,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Negate
    Minus,
    /// Plus (number coercion)
    Plus,
    /// Logical NOT
    Not,
    /// Bitwise NOT
    BitwiseNot,
    /// Typeof
    Typeof,
    /// Void
    Void,
    /// Delete
    Delete,
}

/// Update operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    /// Increment
    Increment,
    /// Decrement
    Decrement,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// Simple assignment (=)
    Assign,
    /// Addition assignment (+=)
    AddAssign,
    /// Subtraction assignment (-=)
    SubAssign,
    /// Multiplication assignment (*=)
    MulAssign,
    /// Division assignment (/=)
    DivAssign,
    /// Modulo assignment (%=)
    ModAssign,
}

impl AssignmentOperator {
    /// The binary operator a compound assignment applies.
    pub fn binary_operator(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubAssign => Some(BinaryOperator::Sub),
            AssignmentOperator::MulAssign => Some(BinaryOperator::Mul),
            AssignmentOperator::DivAssign => Some(BinaryOperator::Div),
            AssignmentOperator::ModAssign => Some(BinaryOperator::Mod),
        }
    }
}

/// Assignment target
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentTarget {
    /// Simple identifier
    Identifier(String),
    /// Member expression
    Member(Box<Expression>),
}
