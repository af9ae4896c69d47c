//! Tokens handed from the lexer to the parser.
//!

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Let,
    Return,
    True,
    False,
    Identifier,
    Integer,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,

    Semicolon,
    LParen,
    RParen,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::Let => "'let'",
            TokenKind::Return => "'return'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Bang => "'!'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Eq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Semicolon => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Eof => "end of input",
        };
        fmt.write_str(name)
    }
}

/// Raw payload of a token: either the source text or a numeric value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Literal {
    Text(String),
    Number(i64),
}

impl fmt::Display for Literal {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Text(s) => fmt.write_str(s),
            Literal::Number(n) => write!(fmt, "{}", n),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_owned())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Text(s)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n)
    }
}

impl PartialEq<&str> for Literal {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Literal::Text(s) if s == other)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Literal,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<Literal>) -> Self {
        Token {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenKind::Eof, "")
    }

    /// How the token reads in a diagnostic.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => self.kind.to_string(),
            _ => format!("'{}'", self.literal),
        }
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::eof()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_display() {
        assert_eq!(Literal::from("foo").to_string(), "foo");
        assert_eq!(Literal::from(42i64).to_string(), "42");
        assert_eq!(Literal::from(-7i64).to_string(), "-7");
    }

    #[test]
    fn literal_compares_with_text_only() {
        assert_eq!(Literal::from("return"), "return");
        assert_ne!(Literal::from(5i64), "5");
    }
}
