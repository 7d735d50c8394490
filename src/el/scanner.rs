// SPDX-License-Identifier: MIT

//! Expression scanner
//!
//! Splits a source string into tokens. Outside of `${...}` / `#{...}` the
//! scanner is in text mode and produces `TEXT` tokens; inside a block it
//! produces operators, literals and identifiers until the closing `}`.

use crate::error::ScanError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    StartEvalDynamic,
    StartEvalDeferred,
    EndEval,
    Text,
    Eof,
    Integer,
    Float,
    String,
    True,
    False,
    Null,
    Identifier,
    Empty,
    Instanceof,
    Mul,
    Div,
    Mod,
    Plus,
    Minus,
    Question,
    Colon,
    LBrack,
    RBrack,
    LParen,
    RParen,
    Comma,
    Dot,
    And,
    Or,
    Not,
    Le,
    Lt,
    Eq,
    Ne,
    Ge,
    Gt,
    Arrow,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Symbol::StartEvalDynamic => "'${'",
            Symbol::StartEvalDeferred => "'#{'",
            Symbol::EndEval => "'}'",
            Symbol::Text => "<TEXT>",
            Symbol::Eof => "<EOF>",
            Symbol::Integer => "<INTEGER>",
            Symbol::Float => "<FLOAT>",
            Symbol::String => "<STRING>",
            Symbol::True => "'true'",
            Symbol::False => "'false'",
            Symbol::Null => "'null'",
            Symbol::Identifier => "<IDENTIFIER>",
            Symbol::Empty => "'empty'",
            Symbol::Instanceof => "'instanceof'",
            Symbol::Mul => "'*'",
            Symbol::Div => "'/'",
            Symbol::Mod => "'%'",
            Symbol::Plus => "'+'",
            Symbol::Minus => "'-'",
            Symbol::Question => "'?'",
            Symbol::Colon => "':'",
            Symbol::LBrack => "'['",
            Symbol::RBrack => "']'",
            Symbol::LParen => "'('",
            Symbol::RParen => "')'",
            Symbol::Comma => "','",
            Symbol::Dot => "'.'",
            Symbol::And => "'&&'",
            Symbol::Or => "'||'",
            Symbol::Not => "'!'",
            Symbol::Le => "'<='",
            Symbol::Lt => "'<'",
            Symbol::Eq => "'=='",
            Symbol::Ne => "'!='",
            Symbol::Ge => "'>='",
            Symbol::Gt => "'>'",
            Symbol::Arrow => "'->'",
        };
        write!(f, "{}", s)
    }
}

/// Reserved words. Operator aliases share the symbol of their symbolic form.
static KEYWORDS: Lazy<HashMap<&'static str, Symbol>> = Lazy::new(|| {
    HashMap::from([
        ("null", Symbol::Null),
        ("true", Symbol::True),
        ("false", Symbol::False),
        ("empty", Symbol::Empty),
        ("div", Symbol::Div),
        ("mod", Symbol::Mod),
        ("not", Symbol::Not),
        ("and", Symbol::And),
        ("or", Symbol::Or),
        ("le", Symbol::Le),
        ("lt", Symbol::Lt),
        ("eq", Symbol::Eq),
        ("ne", Symbol::Ne),
        ("ge", Symbol::Ge),
        ("gt", Symbol::Gt),
        ("instanceof", Symbol::Instanceof),
    ])
});

/// A scanned token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub symbol: Symbol,
    /// Token text. For strings this is the unescaped content, for text
    /// tokens the raw source spelling.
    pub image: String,
    /// Character offset of the first character of the token
    pub position: usize,
}

impl Token {
    fn new(symbol: Symbol, image: impl Into<String>, position: usize) -> Self {
        Self {
            symbol,
            image: image.into(),
            position,
        }
    }

    /// Quoted image for diagnostics
    pub fn describe(&self) -> String {
        match self.symbol {
            Symbol::Eof => Symbol::Eof.to_string(),
            _ => format!("'{}'", self.image),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Hand-written scanner over a character buffer
pub struct Scanner {
    input: Vec<char>,
    position: usize,
    in_eval: bool,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            in_eval: false,
        }
    }

    /// Current character offset
    pub fn position(&self) -> usize {
        self.position
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn slice(&self, from: usize, to: usize) -> String {
        self.input[from..to].iter().collect()
    }

    /// Scan the next token. Returns `EOF` forever once the input is consumed.
    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        if self.in_eval {
            while self.peek(0).is_some_and(char::is_whitespace) {
                self.position += 1;
            }
        }
        let token = match self.peek(0) {
            None => Token::new(Symbol::Eof, "", self.position),
            Some(_) if self.in_eval => self.next_eval()?,
            Some(c) => match (c, self.peek(1)) {
                ('$', Some('{')) => self.start_eval(Symbol::StartEvalDynamic, "${"),
                ('#', Some('{')) => self.start_eval(Symbol::StartEvalDeferred, "#{"),
                _ => self.next_text(),
            },
        };
        log::trace!("scanned {:?} '{}' at {}", token.symbol, token.image, token.position);
        Ok(token)
    }

    fn start_eval(&mut self, symbol: Symbol, image: &str) -> Token {
        let token = Token::new(symbol, image, self.position);
        self.position += 2;
        self.in_eval = true;
        token
    }

    fn fixed(&mut self, symbol: Symbol, len: usize) -> Token {
        let start = self.position;
        self.position += len;
        Token::new(symbol, self.slice(start, self.position), start)
    }

    /// Text up to the next unescaped `${` or `#{`
    fn next_text(&mut self) -> Token {
        let start = self.position;
        let mut i = start;
        let mut escaped = false;
        while let Some(&c) = self.input.get(i) {
            match c {
                '\\' => escaped = !escaped,
                '$' | '#' if self.input.get(i + 1) == Some(&'{') => {
                    if !escaped {
                        break;
                    }
                    escaped = false;
                }
                _ => escaped = false,
            }
            i += 1;
        }
        self.position = i;
        Token::new(Symbol::Text, self.slice(start, i), start)
    }

    fn next_eval(&mut self) -> Result<Token, ScanError> {
        let start = self.position;
        let c1 = self.input[start];
        let c2 = self.peek(1);
        let token = match c1 {
            '}' => {
                self.in_eval = false;
                self.fixed(Symbol::EndEval, 1)
            }
            '*' => self.fixed(Symbol::Mul, 1),
            '/' => self.fixed(Symbol::Div, 1),
            '%' => self.fixed(Symbol::Mod, 1),
            '+' => self.fixed(Symbol::Plus, 1),
            '-' if c2 == Some('>') => self.fixed(Symbol::Arrow, 2),
            '-' => self.fixed(Symbol::Minus, 1),
            '?' => self.fixed(Symbol::Question, 1),
            ':' => self.fixed(Symbol::Colon, 1),
            '[' => self.fixed(Symbol::LBrack, 1),
            ']' => self.fixed(Symbol::RBrack, 1),
            '(' => self.fixed(Symbol::LParen, 1),
            ')' => self.fixed(Symbol::RParen, 1),
            ',' => self.fixed(Symbol::Comma, 1),
            '.' if !c2.is_some_and(|c| c.is_ascii_digit()) => self.fixed(Symbol::Dot, 1),
            '&' if c2 == Some('&') => self.fixed(Symbol::And, 2),
            '|' if c2 == Some('|') => self.fixed(Symbol::Or, 2),
            '=' if c2 == Some('=') => self.fixed(Symbol::Eq, 2),
            '!' if c2 == Some('=') => self.fixed(Symbol::Ne, 2),
            '!' => self.fixed(Symbol::Not, 1),
            '<' if c2 == Some('=') => self.fixed(Symbol::Le, 2),
            '<' => self.fixed(Symbol::Lt, 1),
            '>' if c2 == Some('=') => self.fixed(Symbol::Ge, 2),
            '>' => self.fixed(Symbol::Gt, 1),
            '&' | '|' | '=' => {
                return Err(ScanError::new(
                    start,
                    format!("incomplete operator, expected '{}{}'", c1, c1),
                    c1.to_string(),
                ))
            }
            '"' | '\'' => self.next_string()?,
            c if c.is_ascii_digit() || c == '.' => self.next_number(),
            c if is_identifier_start(c) => self.next_identifier(),
            c => {
                return Err(ScanError::new(
                    start,
                    "invalid character",
                    c.to_string(),
                ))
            }
        };
        Ok(token)
    }

    fn next_identifier(&mut self) -> Token {
        let start = self.position;
        let mut i = start + 1;
        while self.input.get(i).is_some_and(|&c| is_identifier_part(c)) {
            i += 1;
        }
        self.position = i;
        let name = self.slice(start, i);
        let symbol = KEYWORDS
            .get(name.as_str())
            .copied()
            .unwrap_or(Symbol::Identifier);
        Token::new(symbol, name, start)
    }

    /// Length of an exponent suffix (`e`, optional sign, digits) at `i`, if any
    fn exponent_len(&self, i: usize) -> Option<usize> {
        let mut j = i;
        match self.input.get(j) {
            Some('e') | Some('E') => j += 1,
            _ => return None,
        }
        if matches!(self.input.get(j), Some('+') | Some('-')) {
            j += 1;
        }
        if !self.input.get(j).is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        while self.input.get(j).is_some_and(|c| c.is_ascii_digit()) {
            j += 1;
        }
        Some(j - i)
    }

    fn next_number(&mut self) -> Token {
        let start = self.position;
        let mut i = start;
        let digit_at = |i: usize| self.input.get(i).is_some_and(|c| c.is_ascii_digit());
        while digit_at(i) {
            i += 1;
        }
        let mut symbol = Symbol::Integer;
        if self.input.get(i) == Some(&'.') {
            // `1.a` is a property access on an integer, `1.e5` is a float
            let property = self
                .input
                .get(i + 1)
                .is_some_and(|&c| is_identifier_start(c))
                && self.exponent_len(i + 1).is_none();
            if !property {
                i += 1;
                while digit_at(i) {
                    i += 1;
                }
                symbol = Symbol::Float;
            }
        }
        if let Some(len) = self.exponent_len(i) {
            i += len;
            symbol = Symbol::Float;
        }
        self.position = i;
        Token::new(symbol, self.slice(start, i), start)
    }

    fn next_string(&mut self) -> Result<Token, ScanError> {
        let start = self.position;
        let quote = self.input[start];
        let mut value = String::new();
        let mut i = start + 1;
        while let Some(&c) = self.input.get(i) {
            i += 1;
            match c {
                '\\' => match self.input.get(i) {
                    Some(&e) if e == '\\' || e == '\'' || e == '"' => {
                        value.push(e);
                        i += 1;
                    }
                    Some(&e) => {
                        return Err(ScanError::new(
                            start,
                            "invalid escape sequence",
                            format!("\\{}", e),
                        ))
                    }
                    None => break,
                },
                c if c == quote => {
                    self.position = i;
                    return Ok(Token::new(Symbol::String, value, start));
                }
                c => value.push(c),
            }
        }
        Err(ScanError::new(
            start,
            "unterminated string",
            self.slice(start, self.input.len()),
        ))
    }
}
