//! Front end of the monkey interpreter: tokens, lexer, parser and the AST
//! they produce.
//!
//! ```
//! use monkey::parse;
//!
//! let program = parse("let x = 1 + 2 * 3;").unwrap();
//! assert_eq!(program.string().unwrap(), "let x = (1 + (2 * 3));");
//! ```

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Expression, Node, NodeKind, Program, Statement};
pub use errors::{AstError, ParseErrors, SyntaxError};
pub use parser::{parse, ParseResult, Parser};
pub use token::{Literal, Token, TokenKind};
