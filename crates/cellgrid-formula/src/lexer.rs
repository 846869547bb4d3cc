//! Lexer for cell text
//!
//! Text that does not begin with `=` is a literal and becomes exactly one token.
//! Text that begins with `=` is an expression and is scanned into a token stream.
//! Offsets are byte offsets into the original text, including the leading `=`.

use crate::error::{FormulaError, FormulaResult};
use cellgrid_core::{parse_address, Position};
use std::fmt;

/// Operators recognized inside expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl Operator {
    /// Source text of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Caret => "^",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    String(String),
    Integer(i64),
    Float(f64),

    // References
    Address(Position),
    Range(Position, Position),

    /// Function name (uppercased), only produced directly before `(`
    Identifier(String),

    Operator(Operator),

    // Punctuation
    LeftParen,
    RightParen,
    Comma,
}

impl TokenKind {
    /// True for string and numeric literals
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::String(_) | TokenKind::Integer(_) | TokenKind::Float(_)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::String(s) => write!(f, "\"{}\"", s),
            TokenKind::Integer(n) => write!(f, "{}", n),
            TokenKind::Float(n) => write!(f, "{}", n),
            TokenKind::Address(pos) => write!(f, "{}", pos),
            TokenKind::Range(start, end) => write!(f, "{}:{}", start, end),
            TokenKind::Identifier(name) => write!(f, "{}", name),
            TokenKind::Operator(op) => write!(f, "{}", op.as_str()),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
        }
    }
}

/// A classified run of characters
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character in the cell text
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Whether the text is an expression rather than a literal
pub fn is_expression(text: &str) -> bool {
    text.starts_with('=')
}

/// Turn cell text into tokens
///
/// # Example
/// ```rust
/// use cellgrid_formula::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("42").unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Integer(42));
///
/// let tokens = tokenize("=SUM(A1:A3)").unwrap();
/// assert_eq!(tokens.len(), 4);
/// ```
pub fn tokenize(text: &str) -> FormulaResult<Vec<Token>> {
    match text.strip_prefix('=') {
        Some(body) => Lexer::new(body, 1).run(),
        None => Ok(vec![Token::new(classify_literal(text), 0)]),
    }
}

/// Classify text that is not an expression
fn classify_literal(text: &str) -> TokenKind {
    let trimmed = text.trim();

    if is_integer_text(trimmed) {
        // Digit runs too long for i64 are still numbers, unless they overflow f64
        return match trimmed.parse::<i64>() {
            Ok(n) => TokenKind::Integer(n),
            Err(_) => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => TokenKind::Float(n),
                _ => TokenKind::String(text.to_string()),
            },
        };
    }

    if is_decimal_text(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return TokenKind::Float(n);
            }
        }
    }

    TokenKind::String(text.to_string())
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(&['+', '-'][..]).unwrap_or(s)
}

fn is_integer_text(s: &str) -> bool {
    let digits = strip_sign(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_text(s: &str) -> bool {
    let body = strip_sign(s);
    match body.split_once('.') {
        Some((int, frac)) => {
            !(int.is_empty() && frac.is_empty())
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Scanner over the body of an expression (the text after `=`)
struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Offset of `input` within the original cell text
    base: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, base: usize) -> Self {
        Self {
            input,
            pos: 0,
            base,
        }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.scan_token()?);
        }

        Ok(tokens)
    }

    // === Token scanning ===

    fn scan_token(&mut self) -> FormulaResult<Token> {
        let start = self.offset();
        let Some(c) = self.peek_char() else {
            return Err(self.error_at(start, "unexpected end of input"));
        };

        let single = match c {
            '+' => Some(TokenKind::Operator(Operator::Plus)),
            '-' => Some(TokenKind::Operator(Operator::Minus)),
            '*' => Some(TokenKind::Operator(Operator::Star)),
            '/' => Some(TokenKind::Operator(Operator::Slash)),
            '^' => Some(TokenKind::Operator(Operator::Caret)),
            '=' => Some(TokenKind::Operator(Operator::Equal)),
            '(' => Some(TokenKind::LeftParen),
            ')' => Some(TokenKind::RightParen),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return Ok(Token::new(kind, start));
        }

        // Two-character operators
        if c == '<' {
            self.advance();
            let op = match self.peek_char() {
                Some('=') => {
                    self.advance();
                    Operator::LessEqual
                }
                Some('>') => {
                    self.advance();
                    Operator::NotEqual
                }
                _ => Operator::LessThan,
            };
            return Ok(Token::new(TokenKind::Operator(op), start));
        }

        if c == '>' {
            self.advance();
            let op = if self.peek_char() == Some('=') {
                self.advance();
                Operator::GreaterEqual
            } else {
                Operator::GreaterThan
            };
            return Ok(Token::new(TokenKind::Operator(op), start));
        }

        if c == '"' {
            return self.scan_string();
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() {
            return self.scan_word();
        }

        Err(self.error_at(start, format!("unexpected character '{}'", c)))
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        let start = self.offset();
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    // Escaped quote ("")
                    if self.peek_char_at(1) == Some('"') {
                        s.push('"');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        return Ok(Token::new(TokenKind::String(s), start));
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => return Err(self.error_at(start, "unterminated string literal")),
            }
        }
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        self.skip_digits();
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            is_float = true;
            self.advance();
            self.skip_digits();
        }

        if self.peek_char() == Some('.') {
            return Err(self.error_at(self.offset(), "unexpected second decimal point"));
        }

        let text = &self.input[start..self.pos];
        let offset = self.base + start;

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Token::new(TokenKind::Integer(n), offset));
            }
        }

        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::new(TokenKind::Float(n), offset)),
            Ok(_) => Err(FormulaError::Numeric(format!(
                "number at offset {} is too large",
                offset
            ))),
            Err(_) => Err(self.error_at(offset, format!("invalid number '{}'", text))),
        }
    }

    fn scan_word(&mut self) -> FormulaResult<Token> {
        let offset = self.offset();
        let word = self.take_word();

        // A word directly followed by '(' is a function name (LOG10( is a call, not a reference)
        if self.peek_char() == Some('(') {
            return Ok(Token::new(TokenKind::Identifier(word.to_uppercase()), offset));
        }

        if !Self::looks_like_address(word) {
            return Err(self.error_at(offset, format!("unexpected name '{}'", word)));
        }

        let first = self.address_at(word, offset)?;

        if self.peek_char() != Some(':') {
            return Ok(Token::new(TokenKind::Address(first), offset));
        }

        // Range: ADDRESS ':' ADDRESS
        let colon = self.offset();
        self.advance();
        if !self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(self.error_at(colon, "expected an address after ':'"));
        }
        let end_offset = self.offset();
        let end_word = self.take_word();
        if !Self::looks_like_address(end_word) {
            return Err(self.error_at(end_offset, format!("'{}' is not an address", end_word)));
        }
        let second = self.address_at(end_word, end_offset)?;

        Ok(Token::new(TokenKind::Range(first, second), offset))
    }

    fn take_word(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        &self.input[start..self.pos]
    }

    fn address_at(&self, word: &str, offset: usize) -> FormulaResult<Position> {
        parse_address(word).map_err(|e| self.error_at(offset, e.to_string()))
    }

    /// Letters followed by digits and nothing else
    fn looks_like_address(word: &str) -> bool {
        let letters = word.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
        let digits = &word[letters..];
        letters > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    // === Helper methods ===

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> FormulaError {
        FormulaError::Lex {
            offset,
            message: message.into(),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}
