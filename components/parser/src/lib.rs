//! Script Parser Component
//!
//! Provides the lexer, recursive-descent parser and AST for the script
//! subset the guest engine runs.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes source code, tracking lines for automatic
//!   semicolon insertion
//! - [`Token`] - Token types including identifiers, literals, keywords
//! - [`Parser`] - Recursive descent parser producing a [`Program`]
//! - [`Statement`] / [`Expression`] - AST node types
//!
//! # Example
//!
//! ```
//! use parser::{Parser, Statement};
//!
//! let mut parser = Parser::new("var x = 42;");
//! let program = parser.parse().unwrap();
//! assert_eq!(program.var_names, vec!["x".to_string()]);
//! assert!(matches!(program.body[0], Statement::VariableDeclaration { .. }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Expression, FunctionNode, Program, Statement};
pub use lexer::{Keyword, Lexer, Punctuator, SpannedToken, Token};
pub use parser::{parse, Parser};
