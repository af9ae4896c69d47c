//! Module for tokenizing monkey programs.
//!

use super::errors::SyntaxError;
use super::token::{Token, TokenKind};

use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::CharIndices;

use tracing::trace;

/// 1-based position of a token in the program source.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

pub type TokenTuple = (Location, Token);

struct Lexer<'a> {
    iter: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(prog: &'a str) -> Lexer<'a> {
        Lexer {
            iter: prog.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Position of the next character to be read.
    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.iter.next()?;
        self.column += 1;
        Some(ch)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        match self.iter.next_if(|&(_, c)| c == expected) {
            Some(_) => {
                self.column += 1;
                true
            }
            None => false,
        }
    }

    fn tokenize(&mut self) -> Result<VecDeque<TokenTuple>, SyntaxError> {
        let mut tokens = VecDeque::new();
        loop {
            let loc = self.location();
            match self.bump() {
                Some(ch) => {
                    let single = |kind| Token::new(kind, ch.to_string());
                    match ch {
                        'a' ..= 'z' | 'A' ..= 'Z' | '_' =>
                            tokens.push_back((loc, self.consume_identifier(ch))),
                        '0' ..= '9' =>
                            tokens.push_back((loc, self.consume_number(ch))),
                        '=' =>
                            tokens.push_back((loc, self.consume_pair(ch, TokenKind::Assign, TokenKind::Eq))),
                        '!' =>
                            tokens.push_back((loc, self.consume_pair(ch, TokenKind::Bang, TokenKind::NotEq))),
                        '+' => tokens.push_back((loc, single(TokenKind::Plus))),
                        '-' => tokens.push_back((loc, single(TokenKind::Minus))),
                        '*' => tokens.push_back((loc, single(TokenKind::Asterisk))),
                        '/' => tokens.push_back((loc, single(TokenKind::Slash))),
                        '<' => tokens.push_back((loc, single(TokenKind::Lt))),
                        '>' => tokens.push_back((loc, single(TokenKind::Gt))),
                        ';' => tokens.push_back((loc, single(TokenKind::Semicolon))),
                        '(' => tokens.push_back((loc, single(TokenKind::LParen))),
                        ')' => tokens.push_back((loc, single(TokenKind::RParen))),
                        '\n' => {
                            self.line += 1;
                            self.column = 1;
                        }
                        ' ' | '\t' | '\r' => {},
                        c => {
                            return Err(SyntaxError::new(loc, format!("unexpected character: {}", c)));
                        },
                    }
                }
                None => {
                    tokens.push_back((loc, Token::eof()));
                    return Ok(tokens)
                }
            }
        }
    }

    fn consume_while<F>(&mut self, mut buffer: String, predicate: F) -> String
        where F: Fn(char) -> bool
    {
        loop {
            match self.iter.peek() {
                None => break,
                Some(&(_, c)) if !predicate(c) => break,
                Some(&(_, c)) => {
                    buffer.push(c);
                    self.bump();
                }
            }
        }
        buffer
    }

    /// Lex `first` alone, or `first` followed by `=` as a two character operator.
    fn consume_pair(&mut self, first: char, single: TokenKind, pair: TokenKind) -> Token {
        if self.bump_if('=') {
            Token::new(pair, format!("{}=", first))
        } else {
            Token::new(single, first.to_string())
        }
    }

    // The digits stay as text; whether they fit an integer is the parser's call.
    fn consume_number(&mut self, first: char) -> Token {
        let digits = self.consume_while(first.to_string(), |c| c.is_ascii_digit());
        Token::new(TokenKind::Integer, digits)
    }

    fn consume_identifier(&mut self, first: char) -> Token {
        let ident = self.consume_while(first.to_string(), |c| c.is_ascii_alphanumeric() || c == '_');
        let kind = match ident.as_ref() {
            "let" => TokenKind::Let,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Identifier,
        };
        Token::new(kind, ident)
    }
}

pub fn tokenize(prog: &str) -> Result<VecDeque<TokenTuple>, SyntaxError> {
    let tokens = Lexer::new(prog).tokenize()?;
    trace!(bytes = prog.len(), tokens = tokens.len(), "tokenized program");
    Ok(tokens)
}
