//! Abstract syntax tree produced by the parser.
//!
//! Every node keeps the token it was built from and can reconstruct itself as
//! text through [`Node::string`]. Expressions render fully parenthesized, so
//! the output exposes exactly the tree shape the parser built.
//!
//! Optional fields are filled in while parsing descends into operands. Reading
//! one before it is set fails with an [`AstError`] naming the node and field.

use std::fmt;

use crate::errors::AstError;
use crate::token::{Literal, Token};

/// Names each kind of node, used to report which node an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Identifier,
    IntegerLiteral,
    BooleanLiteral,
    PrefixExpression,
    InfixExpression,
    LetStatement,
    ReturnStatement,
    ExpressionStatement,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            NodeKind::Identifier => "Identifier",
            NodeKind::IntegerLiteral => "IntegerLiteral",
            NodeKind::BooleanLiteral => "BooleanLiteral",
            NodeKind::PrefixExpression => "PrefixExpression",
            NodeKind::InfixExpression => "InfixExpression",
            NodeKind::LetStatement => "LetStatement",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::ExpressionStatement => "ExpressionStatement",
        };
        fmt.write_str(name)
    }
}

/// Capabilities shared by every node.
pub trait Node {
    fn kind(&self) -> NodeKind;

    /// Literal of the token this node was built from.
    fn token_literal(&self) -> &Literal;

    /// Append the canonical text of this node to `buf`.
    ///
    /// On error `buf` may hold a partial rendering.
    fn write_to(&self, buf: &mut String) -> Result<(), AstError>;

    /// Canonical text of this node.
    fn string(&self) -> Result<String, AstError> {
        let mut buf = String::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

fn push_literal(buf: &mut String, literal: &Literal) {
    match literal {
        Literal::Text(s) => buf.push_str(s),
        Literal::Number(n) => buf.push_str(&n.to_string()),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: Literal,
}

impl Identifier {
    pub fn new(token: Token, value: impl Into<Literal>) -> Self {
        Identifier {
            token,
            value: value.into(),
        }
    }
}

impl Node for Identifier {
    fn kind(&self) -> NodeKind {
        NodeKind::Identifier
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        push_literal(buf, &self.value);
        Ok(())
    }
}

/// An integer literal. The value is unset when the token text did not parse.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
    value: Option<i64>,
}

impl IntegerLiteral {
    pub fn new(token: Token) -> Self {
        IntegerLiteral { token, value: None }
    }

    pub fn with_value(token: Token, value: i64) -> Self {
        IntegerLiteral {
            token,
            value: Some(value),
        }
    }

    pub fn set_value(&mut self, value: i64) {
        self.value = Some(value);
    }

    pub fn value(&self) -> Result<i64, AstError> {
        self.value
            .ok_or_else(|| AstError::missing(NodeKind::IntegerLiteral, "value"))
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

impl Node for IntegerLiteral {
    fn kind(&self) -> NodeKind {
        NodeKind::IntegerLiteral
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        buf.push_str(&self.value()?.to_string());
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

impl BooleanLiteral {
    pub fn new(token: Token, value: bool) -> Self {
        BooleanLiteral { token, value }
    }
}

impl Node for BooleanLiteral {
    fn kind(&self) -> NodeKind {
        NodeKind::BooleanLiteral
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        buf.push_str(if self.value { "true" } else { "false" });
        Ok(())
    }
}

/// `<operator><right>`, e.g. `-5` or `!ok`.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: String,
    right: Option<Box<Expression>>,
}

impl PrefixExpression {
    pub fn new(token: Token, operator: impl Into<String>) -> Self {
        PrefixExpression {
            token,
            operator: operator.into(),
            right: None,
        }
    }

    pub fn with_right(mut self, right: Expression) -> Self {
        self.set_right(right);
        self
    }

    pub fn set_right(&mut self, right: Expression) {
        self.right = Some(Box::new(right));
    }

    pub fn right(&self) -> Result<&Expression, AstError> {
        self.right
            .as_deref()
            .ok_or_else(|| AstError::missing(NodeKind::PrefixExpression, "right"))
    }
}

impl Node for PrefixExpression {
    fn kind(&self) -> NodeKind {
        NodeKind::PrefixExpression
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        let right = self.right()?;
        buf.push('(');
        buf.push_str(&self.operator);
        right.write_to(buf)?;
        buf.push(')');
        Ok(())
    }
}

/// `<left> <operator> <right>`. The left operand is known when the node is created.
#[derive(Clone, Debug, PartialEq)]
pub struct InfixExpression {
    pub token: Token,
    pub operator: String,
    left: Box<Expression>,
    right: Option<Box<Expression>>,
}

impl InfixExpression {
    pub fn new(token: Token, operator: impl Into<String>, left: Expression) -> Self {
        InfixExpression {
            token,
            operator: operator.into(),
            left: Box::new(left),
            right: None,
        }
    }

    pub fn with_right(mut self, right: Expression) -> Self {
        self.set_right(right);
        self
    }

    pub fn set_right(&mut self, right: Expression) {
        self.right = Some(Box::new(right));
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn right(&self) -> Result<&Expression, AstError> {
        self.right
            .as_deref()
            .ok_or_else(|| AstError::missing(NodeKind::InfixExpression, "right"))
    }
}

impl Node for InfixExpression {
    fn kind(&self) -> NodeKind {
        NodeKind::InfixExpression
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        let right = self.right()?;
        buf.push('(');
        self.left.write_to(buf)?;
        buf.push(' ');
        buf.push_str(&self.operator);
        buf.push(' ');
        right.write_to(buf)?;
        buf.push(')');
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(IntegerLiteral),
    Boolean(BooleanLiteral),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
}

impl Expression {
    fn as_node(&self) -> &dyn Node {
        match self {
            Expression::Identifier(n) => n,
            Expression::IntegerLiteral(n) => n,
            Expression::Boolean(n) => n,
            Expression::Prefix(n) => n,
            Expression::Infix(n) => n,
        }
    }
}

impl Node for Expression {
    fn kind(&self) -> NodeKind {
        self.as_node().kind()
    }

    fn token_literal(&self) -> &Literal {
        self.as_node().token_literal()
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        self.as_node().write_to(buf)
    }
}

impl From<Identifier> for Expression {
    fn from(n: Identifier) -> Self {
        Expression::Identifier(n)
    }
}

impl From<IntegerLiteral> for Expression {
    fn from(n: IntegerLiteral) -> Self {
        Expression::IntegerLiteral(n)
    }
}

impl From<BooleanLiteral> for Expression {
    fn from(n: BooleanLiteral) -> Self {
        Expression::Boolean(n)
    }
}

impl From<PrefixExpression> for Expression {
    fn from(n: PrefixExpression) -> Self {
        Expression::Prefix(n)
    }
}

impl From<InfixExpression> for Expression {
    fn from(n: InfixExpression) -> Self {
        Expression::Infix(n)
    }
}

/// `let <name> = <value>;`
#[derive(Clone, Debug, PartialEq)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    value: Option<Expression>,
}

impl LetStatement {
    pub fn new(token: Token, name: Identifier) -> Self {
        LetStatement {
            token,
            name,
            value: None,
        }
    }

    pub fn with_value(mut self, value: Expression) -> Self {
        self.set_value(value);
        self
    }

    pub fn set_value(&mut self, value: Expression) {
        self.value = Some(value);
    }

    pub fn value(&self) -> Result<&Expression, AstError> {
        self.value
            .as_ref()
            .ok_or_else(|| AstError::incomplete(NodeKind::LetStatement, "value"))
    }
}

impl Node for LetStatement {
    fn kind(&self) -> NodeKind {
        NodeKind::LetStatement
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        let value = self.value()?;
        push_literal(buf, self.token_literal());
        buf.push(' ');
        self.name.write_to(buf)?;
        buf.push_str(" = ");
        value.write_to(buf)?;
        buf.push(';');
        Ok(())
    }
}

/// `return [<value>];`
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    return_value: Option<Expression>,
}

impl ReturnStatement {
    pub fn new(token: Token) -> Self {
        ReturnStatement {
            token,
            return_value: None,
        }
    }

    pub fn with_return_value(mut self, value: Expression) -> Self {
        self.set_return_value(value);
        self
    }

    pub fn set_return_value(&mut self, value: Expression) {
        self.return_value = Some(value);
    }

    pub fn return_value(&self) -> Option<&Expression> {
        self.return_value.as_ref()
    }
}

impl Node for ReturnStatement {
    fn kind(&self) -> NodeKind {
        NodeKind::ReturnStatement
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        push_literal(buf, self.token_literal());
        if let Some(value) = &self.return_value {
            buf.push(' ');
            value.write_to(buf)?;
        }
        buf.push(';');
        Ok(())
    }
}

/// A bare expression used as a statement. Without an expression it stands
/// for an empty statement such as a lone `;`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionStatement {
    pub token: Token,
    expression: Option<Expression>,
}

impl ExpressionStatement {
    pub fn new(token: Token) -> Self {
        ExpressionStatement {
            token,
            expression: None,
        }
    }

    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.set_expression(expression);
        self
    }

    pub fn set_expression(&mut self, expression: Expression) {
        self.expression = Some(expression);
    }

    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }
}

impl Node for ExpressionStatement {
    fn kind(&self) -> NodeKind {
        NodeKind::ExpressionStatement
    }

    fn token_literal(&self) -> &Literal {
        &self.token.literal
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        match &self.expression {
            Some(expression) => expression.write_to(buf),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
}

impl Statement {
    fn as_node(&self) -> &dyn Node {
        match self {
            Statement::Let(n) => n,
            Statement::Return(n) => n,
            Statement::Expression(n) => n,
        }
    }
}

impl Node for Statement {
    fn kind(&self) -> NodeKind {
        self.as_node().kind()
    }

    fn token_literal(&self) -> &Literal {
        self.as_node().token_literal()
    }

    fn write_to(&self, buf: &mut String) -> Result<(), AstError> {
        self.as_node().write_to(buf)
    }
}

impl From<LetStatement> for Statement {
    fn from(n: LetStatement) -> Self {
        Statement::Let(n)
    }
}

impl From<ReturnStatement> for Statement {
    fn from(n: ReturnStatement) -> Self {
        Statement::Return(n)
    }
}

impl From<ExpressionStatement> for Statement {
    fn from(n: ExpressionStatement) -> Self {
        Statement::Expression(n)
    }
}

/// Root of the tree: every statement of a program, in source order.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    pub fn push(&mut self, statement: impl Into<Statement>) {
        self.statements.push(statement.into());
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Token literal of the first statement, if there is one.
    pub fn token_literal(&self) -> Option<&Literal> {
        self.statements.first().map(Node::token_literal)
    }

    /// Concatenation of every statement's text, with no separator.
    pub fn string(&self) -> Result<String, AstError> {
        let mut buf = String::new();
        for statement in &self.statements {
            statement.write_to(&mut buf)?;
        }
        Ok(buf)
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
