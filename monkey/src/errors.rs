//! Monkey Errors
//!

use std::fmt;

use thiserror::Error;

use crate::ast::NodeKind;
use crate::lexer::Location;

/// Raised by the AST when a node is read before the parser finished it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AstError {
    /// An optional field (operand, literal value) was read while unset.
    #[error("{node} is missing its {field}")]
    MissingField { node: NodeKind, field: &'static str },
    /// A statement was rendered while still missing a required child.
    #[error("incomplete {node}: {field} was never set")]
    IncompleteStatement { node: NodeKind, field: &'static str },
}

impl AstError {
    pub fn missing(node: NodeKind, field: &'static str) -> Self {
        AstError::MissingField { node, field }
    }

    pub fn incomplete(node: NodeKind, field: &'static str) -> Self {
        AstError::IncompleteStatement { node, field }
    }

    pub fn node(&self) -> NodeKind {
        match self {
            AstError::MissingField { node, .. } | AstError::IncompleteStatement { node, .. } => *node,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{line}:{column}: {reason}")]
pub struct SyntaxError {
    /// Line number in the program source.
    pub line: usize,
    /// Column number in the current line.
    pub column: usize,
    pub reason: String,
}

impl SyntaxError {
    pub fn new(location: Location, reason: String) -> Self {
        SyntaxError {
            line: location.line,
            column: location.column,
            reason,
        }
    }
}

/// Every diagnostic collected while turning source text into a program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
pub struct ParseErrors(pub Vec<SyntaxError>);

impl ParseErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, SyntaxError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                fmt.write_str("\n")?;
            }
            write!(fmt, "{}", err)?;
        }
        Ok(())
    }
}

impl From<SyntaxError> for ParseErrors {
    fn from(err: SyntaxError) -> Self {
        ParseErrors(vec![err])
    }
}
