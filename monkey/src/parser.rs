//! This module contains the implementation for parsing monkey programs into
//! an AST.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::ast::{
    BooleanLiteral, Expression, ExpressionStatement, Identifier, InfixExpression, IntegerLiteral,
    LetStatement, PrefixExpression, Program, ReturnStatement, Statement,
};
use crate::errors::{ParseErrors, SyntaxError};
use crate::lexer::{tokenize, Location, TokenTuple};
use crate::token::{Literal, Token, TokenKind};

pub type ParseResult = Result<Program, ParseErrors>;

// big difference between Fn and fn
type PrefixFunction = fn(&mut Parser) -> Option<Expression>;
type InfixFunction = fn(&mut Parser, Expression) -> Option<Expression>;

/// Deepest expression tree the parser will build.
const MAX_DEPTH: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
}

/// Pratt parser over a lexed token queue.
///
/// Diagnostics are collected rather than returned one at a time; a statement
/// that produced any diagnostic is left out of the program.
#[derive(Default)]
pub struct Parser {
    tokens: VecDeque<TokenTuple>,

    current: TokenTuple,
    peek: TokenTuple,

    errors: Vec<SyntaxError>,
    depth: usize,
}

impl Parser {
    /// Create a new parser for the program text `prog`.
    pub fn new(prog: &str) -> Result<Parser, SyntaxError> {
        Ok(Parser::from_tokens(tokenize(prog)?))
    }

    /// Create a parser over tokens that were already lexed.
    pub fn from_tokens(tokens: VecDeque<TokenTuple>) -> Parser {
        let mut parser = Parser {
            tokens,
            ..Default::default()
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }

    /// Parse every statement up to the end of input.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.current_is(TokenKind::Eof) {
            let before = self.errors.len();
            match self.parse_statement() {
                Some(stmt) if self.errors.len() == before => program.push(stmt),
                _ => {
                    debug!(errors = self.errors.len() - before, "discarding statement");
                    self.synchronize();
                }
            }
            self.next_token();
        }
        program
    }

    fn next_token(&mut self) {
        let next = match self.tokens.pop_front() {
            Some(tuple) => tuple,
            None => (self.peek.0, Token::eof()),
        };
        self.current = std::mem::replace(&mut self.peek, next);
    }

    /// Skip ahead to the end of the broken statement.
    fn synchronize(&mut self) {
        while !self.current_is(TokenKind::Semicolon) && !self.current_is(TokenKind::Eof) {
            self.next_token();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current.1
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.1.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.1.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            let reason = format!("expected {}, found {}", kind, self.peek.1.describe());
            self.error(self.peek.0, reason);
            false
        }
    }

    fn error(&mut self, location: Location, reason: String) {
        let err = SyntaxError::new(location, reason);
        debug!(%err, "syntax error");
        self.errors.push(err);
    }

    fn current_precedence(&self) -> Precedence {
        precedence(self.current.1.kind)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence(self.peek.1.kind)
    }

    /// Parse a single statement.
    /// This will parse top-level statements such as 'let', 'return', etc.
    fn parse_statement(&mut self) -> Option<Statement> {
        trace!(token = ?self.current.1.kind, "statement");
        match self.current.1.kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Semicolon => Some(ExpressionStatement::new(self.current_token().clone()).into()),
            _ => self.parse_expression_statement(),
        }
    }

    /// Parse a single Let statement.
    fn parse_let(&mut self) -> Option<Statement> {
        let token = self.current_token().clone();

        if !self.expect_peek(TokenKind::Identifier) {
            return None;
        }
        let name = self.current_token().clone();
        let name = Identifier::new(name.clone(), name.literal);
        let mut stmt = LetStatement::new(token, name);

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();
        stmt.set_value(self.parse_expression(Precedence::Lowest)?);

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(stmt.into())
    }

    /// Parse a Return statement, with or without a value.
    fn parse_return(&mut self) -> Option<Statement> {
        let mut stmt = ReturnStatement::new(self.current_token().clone());

        if !self.peek_is(TokenKind::Semicolon) && !self.peek_is(TokenKind::Eof) {
            self.next_token();
            stmt.set_return_value(self.parse_expression(Precedence::Lowest)?);
        }

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(stmt.into())
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let mut stmt = ExpressionStatement::new(self.current_token().clone());
        stmt.set_expression(self.parse_expression(Precedence::Lowest)?);

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(stmt.into())
    }

    /// Parse a single expression, taking the current precedence into account.
    fn parse_expression(&mut self, prec: Precedence) -> Option<Expression> {
        let depth = self.depth;
        let exp = self.parse_expression_at(prec);
        self.depth = depth;
        exp
    }

    /// Count one more level of tree depth, failing once past `MAX_DEPTH`.
    fn descend(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            self.error(self.current.0, "expression nested too deeply".to_owned());
            return false;
        }
        self.depth += 1;
        true
    }

    fn parse_expression_at(&mut self, prec: Precedence) -> Option<Expression> {
        trace!(token = ?self.current.1.kind, precedence = ?prec, depth = self.depth, "expression");
        if !self.descend() {
            return None;
        }

        let prefix = match prefix_function(self.current.1.kind) {
            Some(prefix) => prefix,
            None => {
                let reason = format!("unexpected token: {}", self.current.1.describe());
                self.error(self.current.0, reason);
                return None;
            }
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && prec < self.peek_precedence() {
            let infix = match infix_function(self.peek.1.kind) {
                Some(infix) => infix,
                None => return Some(left),
            };
            self.next_token();
            // Each infix wraps the tree built so far one level deeper.
            if !self.descend() {
                return None;
            }
            left = infix(self, left)?;
        }
        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        let token = self.current_token().clone();
        let value = token.literal.clone();
        Some(Identifier::new(token, value).into())
    }

    /// Builds the literal even when the text does not fit an `i64`; the value is
    /// then left unset and a diagnostic recorded.
    fn parse_integer(&mut self) -> Option<Expression> {
        let token = self.current_token().clone();
        let parsed = match &token.literal {
            Literal::Number(n) => Some(*n),
            Literal::Text(text) => text.parse::<i64>().ok(),
        };

        let mut lit = IntegerLiteral::new(token);
        match parsed {
            Some(value) => lit.set_value(value),
            None => {
                let reason = format!("could not parse {} as integer", lit.token.describe());
                self.error(self.current.0, reason);
            }
        }
        Some(lit.into())
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        let token = self.current_token().clone();
        let value = token.kind == TokenKind::True;
        Some(BooleanLiteral::new(token, value).into())
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let token = self.current_token().clone();
        let operator = token.literal.to_string();
        let mut exp = PrefixExpression::new(token, operator);

        self.next_token();
        exp.set_right(self.parse_expression(Precedence::Prefix)?);
        Some(exp.into())
    }

    fn parse_grouped(&mut self) -> Option<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(exp)
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current_token().clone();
        let operator = token.literal.to_string();
        let prec = self.current_precedence();
        let mut exp = InfixExpression::new(token, operator, left);

        self.next_token();
        exp.set_right(self.parse_expression(prec)?);
        Some(exp.into())
    }
}

/// Parse `prog` into a program, failing with every diagnostic found.
pub fn parse(prog: &str) -> ParseResult {
    let mut parser = Parser::new(prog)?;
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(ParseErrors(parser.into_errors()))
    }
}

fn precedence(kind: TokenKind) -> Precedence {
    use Precedence::*;
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Equals,
        TokenKind::Lt | TokenKind::Gt => LessGreater,
        TokenKind::Plus | TokenKind::Minus => Sum,
        TokenKind::Asterisk | TokenKind::Slash => Product,
        _ => Lowest,
    }
}

fn infix_function(kind: TokenKind) -> Option<InfixFunction> {
    match kind {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Asterisk
        | TokenKind::Slash
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::Eq
        | TokenKind::NotEq => Some(Parser::parse_infix),
        _ => None,
    }
}

fn prefix_function(kind: TokenKind) -> Option<PrefixFunction> {
    match kind {
        TokenKind::Identifier => Some(Parser::parse_identifier),
        TokenKind::Integer => Some(Parser::parse_integer),
        TokenKind::True | TokenKind::False => Some(Parser::parse_boolean),
        TokenKind::Bang | TokenKind::Minus => Some(Parser::parse_prefix),
        TokenKind::LParen => Some(Parser::parse_grouped),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, NodeKind};

    fn parse_ok(prog: &str) -> Program {
        match parse(prog) {
            Ok(program) => program,
            Err(errors) => panic!("parsing {:?} failed:\n{}", prog, errors),
        }
    }

    /// This test just validates that we are parsing the right number of statements.
    #[test]
    fn test_statement_count() {
        struct Test {
            prog: &'static str,
            statements: usize,
        }
        let tests: &[Test] = &[
            Test{prog: "", statements: 0},
            Test{prog: "let foo = bar", statements: 1},
            Test{prog: "let x = 5; let y = 10;", statements: 2},
            Test{prog: "return; return 1; 1 + 2", statements: 3},
            Test{prog: ";", statements: 1},
        ];

        for test in tests {
            let ast = parse_ok(test.prog);
            assert_eq!(ast.len(), test.statements, "{}", test.prog);
        }
    }

    #[test]
    fn test_let_statement() {
        struct Test {
            prog: &'static str,
            name: &'static str,
            value: &'static str,
        }
        let tests: &[Test] = &[
            Test{prog: "let foo = 1;",     name: "foo", value: "1"},
            Test{prog: "let foo = bar;",   name: "foo", value: "bar"},
            Test{prog: "let foo = true;",  name: "foo", value: "true"},
            Test{prog: "let foo = false",  name: "foo", value: "false"},
            Test{prog: "let y = -a * b;",  name: "y",   value: "((-a) * b)"},
        ];

        for test in tests {
            let ast = parse_ok(test.prog);
            assert_eq!(ast.len(), 1);
            if let Statement::Let(stmt) = &ast.statements()[0] {
                assert_eq!(*stmt.token_literal(), "let");
                assert_eq!(stmt.name.value, test.name);
                assert_eq!(stmt.value().unwrap().string().unwrap(), test.value);
            } else {
                panic!("expected a let statement in {:?}", test.prog);
            }
        }
    }

    #[test]
    fn test_return_statement() {
        let ast = parse_ok("return 10; return;");
        assert_eq!(ast.len(), 2);
        for stmt in &ast {
            assert_eq!(stmt.kind(), NodeKind::ReturnStatement);
            assert_eq!(*stmt.token_literal(), "return");
        }
        assert_eq!(ast.string().unwrap(), "return 10;return;");
    }

    #[test]
    fn test_leaf_expressions() {
        let ast = parse_ok("foobar; 5; true;");
        let kinds: Vec<NodeKind> = ast
            .iter()
            .map(|stmt| match stmt {
                Statement::Expression(e) => e.expression().unwrap().kind(),
                _ => panic!("expected an expression statement"),
            })
            .collect();
        assert_eq!(kinds, vec![NodeKind::Identifier, NodeKind::IntegerLiteral, NodeKind::BooleanLiteral]);
    }

    #[test]
    fn test_prefix_expressions() {
        struct Test {
            prog: &'static str,
            operator: &'static str,
            right: &'static str,
        }
        let tests: &[Test] = &[
            Test{prog: "!5;", operator: "!", right: "5"},
            Test{prog: "-15;", operator: "-", right: "15"},
            Test{prog: "!true;", operator: "!", right: "true"},
            Test{prog: "-a", operator: "-", right: "a"},
        ];

        for test in tests {
            let ast = parse_ok(test.prog);
            match &ast.statements()[0] {
                Statement::Expression(stmt) => match stmt.expression() {
                    Some(Expression::Prefix(exp)) => {
                        assert_eq!(exp.operator, test.operator);
                        assert_eq!(exp.right().unwrap().string().unwrap(), test.right);
                    }
                    other => panic!("expected a prefix expression, got {:?}", other),
                },
                other => panic!("expected an expression statement, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_infix_expressions() {
        let operators = ["+", "-", "*", "/", "<", ">", "==", "!="];
        for op in operators.iter() {
            let prog = format!("5 {} 6;", op);
            let ast = parse_ok(&prog);
            match &ast.statements()[0] {
                Statement::Expression(stmt) => match stmt.expression() {
                    Some(Expression::Infix(exp)) => {
                        assert_eq!(exp.operator, *op);
                        assert_eq!(exp.left().string().unwrap(), "5");
                        assert_eq!(exp.right().unwrap().string().unwrap(), "6");
                    }
                    other => panic!("expected an infix expression, got {:?}", other),
                },
                other => panic!("expected an expression statement, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_operator_precedence() {
        let tests = [
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a + b * c", "(a + (b * c))"),
            ("a + b / c", "(a + (b / c))"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("3 < 5 == true", "((3 < 5) == true)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
        ];

        for (prog, expected) in tests.iter() {
            assert_eq!(parse_ok(prog).string().unwrap(), *expected);
        }
    }

    #[test]
    fn test_oversized_integer_is_discarded() {
        let mut parser = Parser::new("let x = 99999999999999999999; let y = 2;").unwrap();
        let program = parser.parse_program();

        assert_eq!(program.string().unwrap(), "let y = 2;");
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(parser.errors()[0].reason, "could not parse '99999999999999999999' as integer");
    }

    #[test]
    fn test_parse_errors() {
        struct Test {
            prog: &'static str,
            error: &'static str,
        }
        let tests: &[Test] = &[
            Test{prog: "let = 5;", error: "1:5: expected identifier, found '='"},
            Test{prog: "let x 5;", error: "1:7: expected '=', found '5'"},
            Test{prog: "let x = ;", error: "1:9: unexpected token: ';'"},
            Test{prog: "(1 + 2", error: "1:7: expected ')', found end of input"},
            Test{prog: "1 +", error: "1:4: unexpected token: end of input"},
        ];

        for test in tests {
            let errors = parse(test.prog).unwrap_err();
            assert_eq!(errors.len(), 1, "{}: {}", test.prog, errors);
            assert_eq!(errors.to_string(), test.error);
        }
    }

    #[test]
    fn test_recovers_after_bad_statement() {
        let mut parser = Parser::new("let = 1; let ok = 2; ) ; return ok;").unwrap();
        let program = parser.parse_program();

        assert_eq!(program.string().unwrap(), "let ok = 2;return ok;");
        assert_eq!(parser.errors().len(), 2);
    }

    #[test]
    fn test_nesting_limit() {
        let tests = [
            "-".repeat(10_000) + "1",
            "!".repeat(MAX_DEPTH + 1) + "true",
            "(".repeat(10_000) + "1" + &")".repeat(10_000),
            "a + ".repeat(MAX_DEPTH * 2) + "a",
            "let x = ".to_owned() + &"-".repeat(200_000) + "1;",
        ];

        for prog in tests.iter() {
            let errors = parse(prog).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.iter().next().unwrap().reason, "expression nested too deeply");
        }
    }

    #[test]
    fn test_nesting_below_limit() {
        let prog = "-".repeat(100) + "1";
        let expected = "(-".repeat(100) + "1" + &")".repeat(100);
        assert_eq!(parse_ok(&prog).string().unwrap(), expected);

        let prog = "a + ".repeat(MAX_DEPTH / 2) + "a";
        assert_eq!(parse_ok(&prog).len(), 1);

        let mut parser = Parser::new(&("-".repeat(10_000) + "1; let ok = 1;")).unwrap();
        let program = parser.parse_program();
        assert_eq!(program.string().unwrap(), "let ok = 1;");
        assert_eq!(parser.errors().len(), 1);
    }

    #[test]
    fn test_lexer_errors_surface() {
        let errors = parse("let a = #;").unwrap_err();
        assert_eq!(errors.to_string(), "1:9: unexpected character: #");
    }

    #[test]
    fn test_from_tokens() {
        let loc = Location{line: 1, column: 1};
        let tokens: VecDeque<TokenTuple> = vec![
            (loc, Token::new(TokenKind::Return, "return")),
            (loc, Token::new(TokenKind::Integer, 7i64)),
            (loc, Token::eof()),
        ].into_iter().collect();

        let mut parser = Parser::from_tokens(tokens);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty());
        assert_eq!(program.string().unwrap(), "return 7;");
    }
}
