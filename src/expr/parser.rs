//! Recursive-descent parser producing the expression AST.
//!
//! Precedence, loosest first: `||`, `&&`, comparisons, unary `!`,
//! filter pipes, then property/index access on a primary term.

use serde_json::Value;

use super::ParseError;
use super::lexer::{Spanned, Token, tokenize};

/// Comparison and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// One step of a property path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `.name`
    Field(String),
    /// `[expr]`
    Index(Box<Expr>),
}

/// One `| name(args...)` application.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Variable(String),
    Access {
        target: Box<Expr>,
        segments: Vec<Segment>,
    },
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Pipe {
        input: Box<Expr>,
        filters: Vec<FilterCall>,
    },
}

pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
    };
    let expr = parser.parse_or()?;
    if let Some(extra) = parser.peek_spanned() {
        return Err(ParseError::Unexpected {
            found: extra.token.to_string(),
            position: extra.position,
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek_spanned(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_spanned().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(spanned) if &spanned.token == token => Ok(()),
            Some(spanned) => Err(ParseError::Unexpected {
                found: spanned.token.to_string(),
                position: spanned.position,
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected: token.to_string(),
            }),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.parse_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_comparison()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.parse_comparison()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_unary()?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinaryOp::Eq,
            Some(Token::NotEq) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_unary()?;
        Ok(binary(op, lhs, rhs))
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Bang) {
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_pipe()
    }

    fn parse_pipe(&mut self) -> Result<Expr, ParseError> {
        let input = self.parse_postfix()?;
        let mut filters = Vec::new();
        while self.eat(&Token::Pipe) {
            let name = match self.advance() {
                Some(Spanned {
                    token: Token::Ident(name),
                    ..
                }) => name,
                Some(other) => {
                    return Err(ParseError::Unexpected {
                        found: other.token.to_string(),
                        position: other.position,
                    });
                }
                None => {
                    return Err(ParseError::UnexpectedEnd {
                        expected: "filter name".into(),
                    });
                }
            };
            let mut args = Vec::new();
            if self.eat(&Token::LParen) && !self.eat(&Token::RParen) {
                loop {
                    args.push(self.parse_or()?);
                    if self.eat(&Token::Comma) {
                        continue;
                    }
                    self.expect(&Token::RParen)?;
                    break;
                }
            }
            filters.push(FilterCall {
                name,
                args,
            });
        }

        if filters.is_empty() {
            Ok(input)
        } else {
            Ok(Expr::Pipe {
                input: Box::new(input),
                filters,
            })
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_primary()?;
        let mut segments = Vec::new();
        loop {
            if self.eat(&Token::Dot) {
                match self.advance() {
                    Some(Spanned {
                        token: Token::Ident(name),
                        ..
                    }) => segments.push(Segment::Field(name)),
                    Some(Spanned {
                        token: Token::Int(n),
                        ..
                    }) if n >= 0 => {
                        segments.push(Segment::Index(Box::new(Expr::Literal(Value::from(n)))))
                    }
                    Some(other) => {
                        return Err(ParseError::Unexpected {
                            found: other.token.to_string(),
                            position: other.position,
                        });
                    }
                    None => {
                        return Err(ParseError::UnexpectedEnd {
                            expected: "property name".into(),
                        });
                    }
                }
            } else if self.eat(&Token::LBracket) {
                let index = self.parse_or()?;
                self.expect(&Token::RBracket)?;
                segments.push(Segment::Index(Box::new(index)));
            } else {
                break;
            }
        }

        if segments.is_empty() {
            Ok(target)
        } else {
            Ok(Expr::Access {
                target: Box::new(target),
                segments,
            })
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(spanned) = self.advance() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "a value".into(),
            });
        };
        match spanned.token {
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Int(n) => Ok(Expr::Literal(Value::from(n))),
            Token::Float(f) => Ok(Expr::Literal(crate::value::number(f))),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" => Expr::Literal(Value::Null),
                _ => Expr::Variable(name),
            }),
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => Err(ParseError::Unexpected {
                found: other.to_string(),
                position: spanned.position,
            }),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
