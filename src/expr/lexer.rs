//! Tokenizer for the expression language.

use std::fmt;

use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Dot,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Pipe,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "'{name}'"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::Int(n) => write!(f, "number {n}"),
            Token::Float(n) => write!(f, "number {n}"),
            Token::Dot => f.write_str("'.'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::Pipe => f.write_str("'|'"),
            Token::Bang => f.write_str("'!'"),
            Token::EqEq => f.write_str("'=='"),
            Token::NotEq => f.write_str("'!='"),
            Token::Lt => f.write_str("'<'"),
            Token::Le => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::Ge => f.write_str("'>='"),
            Token::AndAnd => f.write_str("'&&'"),
            Token::OrOr => f.write_str("'||'"),
        }
    }
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '.' => single(&mut chars, Token::Dot),
            '[' => single(&mut chars, Token::LBracket),
            ']' => single(&mut chars, Token::RBracket),
            '(' => single(&mut chars, Token::LParen),
            ')' => single(&mut chars, Token::RParen),
            ',' => single(&mut chars, Token::Comma),
            '|' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '|').is_some() {
                    Token::OrOr
                } else {
                    Token::Pipe
                }
            }
            '&' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '&').is_some() {
                    Token::AndAnd
                } else {
                    return Err(ParseError::Unexpected {
                        found: "'&'".into(),
                        position: pos,
                    });
                }
            }
            '!' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_some() {
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            '=' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_some() {
                    Token::EqEq
                } else {
                    return Err(ParseError::Unexpected {
                        found: "'='".into(),
                        position: pos,
                    });
                }
            }
            '<' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_some() {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_some() {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '"' | '\'' => lex_string(&mut chars, pos, c)?,
            '-' | '0'..='9' => lex_number(source, &mut chars, pos)?,
            c if is_ident_start(c) => {
                let mut end = pos;
                while let Some((i, c)) = chars.next_if(|&(_, c)| is_ident_continue(c)) {
                    end = i + c.len_utf8();
                }
                Token::Ident(source[pos..end].to_string())
            }
            other => {
                return Err(ParseError::Unexpected {
                    found: format!("'{other}'"),
                    position: pos,
                });
            }
        };

        tokens.push(Spanned {
            token,
            position: pos,
        });
    }

    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn single(chars: &mut Chars<'_>, token: Token) -> Token {
    chars.next();
    token
}

fn lex_string(chars: &mut Chars<'_>, start: usize, quote: char) -> Result<Token, ParseError> {
    chars.next();
    let mut value = String::new();
    loop {
        match chars.next() {
            Some((_, c)) if c == quote => return Ok(Token::Str(value)),
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, c)) => value.push(c),
                None => break,
            },
            Some((_, c)) => value.push(c),
            None => break,
        }
    }
    Err(ParseError::UnterminatedString {
        position: start,
    })
}

fn lex_number(source: &str, chars: &mut Chars<'_>, start: usize) -> Result<Token, ParseError> {
    let mut end = start;
    if let Some((i, '-')) = chars.peek().copied() {
        chars.next();
        end = i + 1;
        if !chars.peek().is_some_and(|&(_, c)| c.is_ascii_digit()) {
            return Err(ParseError::Unexpected {
                found: "'-'".into(),
                position: start,
            });
        }
    }

    let mut seen_dot = false;
    while let Some(&(i, c)) = chars.peek() {
        if c.is_ascii_digit() {
            end = i + 1;
            chars.next();
        } else if c == '.' && !seen_dot && source[i + 1..].starts_with(|d: char| d.is_ascii_digit())
        {
            seen_dot = true;
            end = i + 1;
            chars.next();
        } else {
            break;
        }
    }

    let text = &source[start..end];
    let invalid = || ParseError::InvalidNumber {
        text: text.to_string(),
        position: start,
    };
    if seen_dot {
        text.parse::<f64>().map(Token::Float).map_err(|_| invalid())
    } else {
        text.parse::<i64>().map(Token::Int).map_err(|_| invalid())
    }
}
