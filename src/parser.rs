use std::mem;

use tracing::debug;

use crate::ast::{BinaryOp, Expr, LogicalOp, Program, Stmt, UnaryOp};
use crate::error::{LexError, ParseError};
use crate::token::{Keyword, LiteralKind, Misc, Operator, Punctuation, Token, TokenKind};
use crate::value::Value;

type Result<T> = std::result::Result<T, ParseError>;

const EQUALITY: &[(Operator, BinaryOp)] = &[
    (Operator::EqEq, BinaryOp::EqEq),
    (Operator::NotEq, BinaryOp::NotEq),
];
const COMPARISON: &[(Operator, BinaryOp)] = &[
    (Operator::Gt, BinaryOp::Gt),
    (Operator::Gte, BinaryOp::Gte),
    (Operator::Lt, BinaryOp::Lt),
    (Operator::Lte, BinaryOp::Lte),
];
const TERM: &[(Operator, BinaryOp)] = &[(Operator::Add, BinaryOp::Add), (Operator::Sub, BinaryOp::Sub)];
const FACTOR: &[(Operator, BinaryOp)] = &[(Operator::Mul, BinaryOp::Mul), (Operator::Div, BinaryOp::Div)];
const UNARY: &[(Operator, UnaryOp)] = &[
    (Operator::Not, UnaryOp::Not),
    (Operator::Add, UnaryOp::Plus),
    (Operator::Sub, UnaryOp::Minus),
];

// Tokens that start a fresh declaration; synchronization stops in front of them.
const STATEMENT_STARTS: &[Keyword] = &[
    Keyword::Class,
    Keyword::Function,
    Keyword::Const,
    Keyword::Let,
    Keyword::For,
    Keyword::If,
    Keyword::While,
    Keyword::Print,
    Keyword::Return,
];

const fn punct(punct: Punctuation) -> TokenKind {
    TokenKind::Punctuation(punct)
}

const fn keyword(keyword: Keyword) -> TokenKind {
    TokenKind::Keyword(keyword)
}

const fn literal(literal: LiteralKind) -> TokenKind {
    TokenKind::Literal(literal)
}

/// Recursive-descent parser over a stream of tokens.
///
/// Tokens are pulled one at a time and never rewound; only the current token and the one before
/// it are kept. Comments are skipped. A lexical error is recorded and treated as the end of input.
pub struct Parser<I> {
    tokens: I,
    previous: Token,
    current: Token,
    errors: Vec<ParseError>,
}

impl<I> Parser<I>
where
    I: Iterator<Item = std::result::Result<Token, LexError>>,
{
    pub fn new(tokens: I) -> Self {
        let mut parser = Self {
            tokens,
            previous: Token::end_of_file(0),
            current: Token::end_of_file(0),
            errors: Vec::new(),
        };
        if let Some(first) = parser.pull() {
            parser.current = first;
        }
        parser
    }

    /// Parses declarations until the end of input.
    ///
    /// Never fails: a malformed declaration is recorded in [`Program::errors`] and skipped, and
    /// parsing resumes at the next statement boundary.
    pub fn parse(mut self) -> Program {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    debug!(%err, "parse error");
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        Program {
            statements,
            errors: self.errors,
        }
    }

    fn declaration(&mut self) -> Result<Stmt> {
        if self.match_any(&[keyword(Keyword::Const), keyword(Keyword::Let)]) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self
            .consume_expect(TokenKind::Misc(Misc::Identifier), "Expected a variable's name")?
            .text;
        let init = if self.match_kind(TokenKind::Operator(Operator::Eq)) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume_expect(
            punct(Punctuation::Semicolon),
            "Expected a `;` after a variable declaration",
        )?;
        Ok(Stmt::VariableDeclaration { name, init })
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.match_kind(keyword(Keyword::Print)) {
            let value = self.expression()?;
            self.consume_expect(
                punct(Punctuation::Semicolon),
                "Expected a `;` after the print expression",
            )?;
            Ok(Stmt::Print(value))
        } else if self.match_kind(punct(Punctuation::BracketCurlyOpen)) {
            Ok(Stmt::Block(self.block()?))
        } else if self.match_kind(keyword(Keyword::If)) {
            self.if_statement()
        } else if self.match_kind(keyword(Keyword::While)) {
            self.while_statement()
        } else if self.match_kind(keyword(Keyword::For)) {
            self.for_statement()
        } else {
            self.expression_statement()
        }
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.expression()?;
        self.consume_expect(
            punct(Punctuation::Semicolon),
            "Expected a `;` after the expression",
        )?;
        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.check(punct(Punctuation::BracketCurlyClose)) && !self.is_at_end() {
            body.push(self.declaration()?);
        }
        self.consume_expect(
            punct(Punctuation::BracketCurlyClose),
            "Expected `}` after a block",
        )?;
        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume_expect(
            punct(Punctuation::BracketOpen),
            "Expected a `(` before the if condition",
        )?;
        let condition = self.expression()?;
        self.consume_expect(
            punct(Punctuation::BracketClose),
            "Expected a `)` after the if condition",
        )?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(keyword(Keyword::Else)) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume_expect(
            punct(Punctuation::BracketOpen),
            "Expected a `(` after the `while` keyword",
        )?;
        let condition = self.expression()?;
        self.consume_expect(
            punct(Punctuation::BracketClose),
            "Expected a `)` after the `while` condition",
        )?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume_expect(
            punct(Punctuation::BracketOpen),
            "Expected a `(` after the `for` keyword",
        )?;

        // Any statement form parses here; the interpreter rejects non-declarations.
        let init = if self.match_kind(punct(Punctuation::Semicolon)) {
            None
        } else if self.match_any(&[keyword(Keyword::Const), keyword(Keyword::Let)]) {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let condition = if self.check(punct(Punctuation::Semicolon)) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_expect(
            punct(Punctuation::Semicolon),
            "Expected a `;` after the loop condition",
        )?;

        let increment = if self.check(punct(Punctuation::BracketClose)) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_expect(
            punct(Punctuation::BracketClose),
            "Expected a `)` after the loop's clauses",
        )?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For {
            init,
            condition,
            increment,
            body,
        })
    }

    fn expression(&mut self) -> Result<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.or()?;

        if self.match_kind(TokenKind::Operator(Operator::Eq)) {
            let equals = self.previous.clone();
            let value = Box::new(self.assignment()?);
            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign { name, value }),
                _ => Err(ParseError::InvalidAssignmentTarget { equals }),
            };
        }
        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr> {
        self.logical(Operator::Or, LogicalOp::Or, Self::and)
    }

    fn and(&mut self) -> Result<Expr> {
        self.logical(Operator::And, LogicalOp::And, Self::equality)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary(EQUALITY, Self::comparison)
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.binary(COMPARISON, Self::term)
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary(TERM, Self::factor)
    }

    fn factor(&mut self) -> Result<Expr> {
        self.binary(FACTOR, Self::unary)
    }

    fn logical(
        &mut self,
        operator: Operator,
        op: LogicalOp,
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr = operand(self)?;
        while self.match_kind(TokenKind::Operator(operator)) {
            let right = operand(self)?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    // One left-associative precedence level.
    fn binary(
        &mut self,
        operators: &[(Operator, BinaryOp)],
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr = operand(self)?;
        while let Some(op) = self.match_operator(operators) {
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Some(op) = self.match_operator(UNARY) {
            let operand = Box::new(self.unary()?);
            return Ok(Expr::Unary { op, operand });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        while self.match_kind(punct(Punctuation::BracketOpen)) {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut args = Vec::new();
        if !self.check(punct(Punctuation::BracketClose)) {
            loop {
                args.push(self.expression()?);
                if !self.match_kind(punct(Punctuation::Comma)) {
                    break;
                }
            }
        }
        self.consume_expect(
            punct(Punctuation::BracketClose),
            "Expected a `)` after the argument list",
        )?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.match_kind(literal(LiteralKind::Boolean)) {
            return Ok(Expr::Literal(Value::Boolean(self.previous.text == "true")));
        }
        if self.match_kind(literal(LiteralKind::Number)) {
            let Token { text, position, .. } = &self.previous;
            return text
                .parse::<f64>()
                .map(|n| Expr::Literal(Value::Number(n)))
                .map_err(|_| ParseError::InvalidLiteral {
                    text: text.clone(),
                    position: *position,
                });
        }
        if self.match_any(&[
            literal(LiteralKind::StringSingle),
            literal(LiteralKind::StringDouble),
            literal(LiteralKind::StringTemplate),
        ]) {
            return Ok(Expr::Literal(Value::String(self.previous.text.clone())));
        }
        if self.match_kind(literal(LiteralKind::Null)) {
            return Ok(Expr::Literal(Value::Null));
        }
        if self.match_kind(punct(Punctuation::BracketOpen)) {
            let inner = self.expression()?;
            self.consume_expect(
                punct(Punctuation::BracketClose),
                "Expected a `)` after the expression",
            )?;
            return Ok(Expr::Grouping(Box::new(inner)));
        }
        if self.match_kind(TokenKind::Misc(Misc::Identifier)) {
            return Ok(Expr::Variable(self.previous.text.clone()));
        }
        Err(ParseError::ExpectedExpression {
            found: self.current.clone(),
        })
    }

    // Discards tokens until just past a `;` or just before a token that starts a declaration.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous.kind == punct(Punctuation::Semicolon) {
                break;
            }
            if matches!(self.current.kind, TokenKind::Keyword(k) if STATEMENT_STARTS.contains(&k)) {
                break;
            }
            self.advance();
        }
        debug!(token = %self.current, "synchronized");
    }

    fn is_at_end(&self) -> bool {
        self.current.is_end_of_file()
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.current.kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|&kind| self.match_kind(kind))
    }

    fn match_operator<T: Copy>(&mut self, operators: &[(Operator, T)]) -> Option<T> {
        let TokenKind::Operator(current) = self.current.kind else {
            return None;
        };
        let &(_, mapped) = operators.iter().find(|(op, _)| *op == current)?;
        self.advance();
        Some(mapped)
    }

    fn consume_expect(&mut self, expected: TokenKind, message: &'static str) -> Result<Token> {
        if self.check(expected) {
            self.advance();
            return Ok(self.previous.clone());
        }
        Err(ParseError::Expected {
            message,
            found: self.current.clone(),
        })
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        let next = self
            .pull()
            .unwrap_or_else(|| Token::end_of_file(self.current.position + self.current.text.len()));
        self.previous = mem::replace(&mut self.current, next);
    }

    // The next significant token, or `None` once the stream is exhausted.
    fn pull(&mut self) -> Option<Token> {
        loop {
            match self.tokens.next()? {
                Ok(token) if token.kind == TokenKind::Misc(Misc::Comment) => continue,
                Ok(token) => return Some(token),
                Err(err) => {
                    let position = err.position();
                    debug!(%err, "lexical error");
                    self.errors.push(err.into());
                    return Some(Token::end_of_file(position));
                }
            }
        }
    }
}

/// Parses a token stream, typically [`crate::lexer::scan`]'s output.
pub fn parse<T>(tokens: T) -> Program
where
    T: IntoIterator<Item = std::result::Result<Token, LexError>>,
{
    Parser::new(tokens.into_iter()).parse()
}
