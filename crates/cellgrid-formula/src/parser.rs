//! Formula parser
//!
//! A recursive descent parser over the lexer's token stream, with proper
//! operator precedence. Also decides the [`CellType`] of a cell's text.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{is_expression, tokenize, Operator, Token, TokenKind};
use cellgrid_core::{CellRange, CellType};

/// A successfully parsed cell text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    /// Expression tree (a literal cell parses to a single literal node)
    pub expr: FormulaExpr,
    /// Syntactic shape of the text
    pub cell_type: CellType,
}

/// Lex, parse and classify arbitrary cell text
///
/// Literal text (no leading `=`) never fails; expressions fail with
/// [`FormulaError::Lex`] or [`FormulaError::Parse`].
///
/// # Example
/// ```rust
/// use cellgrid_core::CellType;
/// use cellgrid_formula::parse_cell_text;
///
/// assert_eq!(parse_cell_text("42").unwrap().cell_type, CellType::Number);
/// assert_eq!(parse_cell_text("=A1+A2").unwrap().cell_type, CellType::Operator);
/// assert_eq!(parse_cell_text("=SUM(A1:A3)").unwrap().cell_type, CellType::Function);
/// ```
pub fn parse_cell_text(text: &str) -> FormulaResult<ParsedFormula> {
    let tokens = tokenize(text)?;
    let expr = if is_expression(text) {
        parse_tokens(&tokens)?
    } else {
        // A literal always lexes to exactly one token
        match tokens.first() {
            Some(token) => literal_expr(&token.kind)?,
            None => FormulaExpr::String(String::new()),
        }
    };
    let cell_type = classify(&tokens, &expr);

    Ok(ParsedFormula { expr, cell_type })
}

/// Parse a formula string (must start with `=`) into an AST
///
/// # Example
/// ```rust
/// use cellgrid_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    if !is_expression(formula) {
        return Err(FormulaError::Parse("Formula must start with '='".into()));
    }
    parse_tokens(&tokenize(formula)?)
}

/// Parse an expression token stream
pub fn parse_tokens(tokens: &[Token]) -> FormulaResult<FormulaExpr> {
    if tokens.is_empty() {
        return Err(FormulaError::Parse("Empty formula".into()));
    }

    let mut parser = FormulaParser::new(tokens);
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if let Some(token) = parser.current() {
        return Err(FormulaError::Parse(format!(
            "Unexpected '{}' at offset {} after expression",
            token.kind, token.offset
        )));
    }

    Ok(expr)
}

/// Decide the cell type of successfully parsed text
pub fn classify(tokens: &[Token], expr: &FormulaExpr) -> CellType {
    if let [token] = tokens {
        match token.kind {
            TokenKind::String(_) => return CellType::String,
            TokenKind::Integer(_) => return CellType::Number,
            TokenKind::Float(_) => return CellType::Float,
            _ => {}
        }
    }

    match expr {
        FormulaExpr::CellRef(_) => CellType::CellReference,
        FormulaExpr::Function { .. } => CellType::Function,
        _ => CellType::Operator,
    }
}

fn literal_expr(kind: &TokenKind) -> FormulaResult<FormulaExpr> {
    match kind {
        TokenKind::Integer(n) => Ok(FormulaExpr::Number(*n as f64)),
        TokenKind::Float(n) => Ok(FormulaExpr::Number(*n)),
        TokenKind::String(s) => Ok(FormulaExpr::String(s.clone())),
        other => Err(FormulaError::Parse(format!(
            "Expected a literal, got '{}'",
            other
        ))),
    }
}

/// Deepest expression nesting a formula may have
///
/// Parentheses, unary signs, function calls and each operator in a chain all
/// count one level.
pub const MAX_NESTING: usize = 1024;

/// Parser state over a token slice
struct FormulaParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> FormulaParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn descend(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "Formula nests deeper than {} levels",
                MAX_NESTING
            )));
        }
        Ok(())
    }

    // === Token access ===

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<&'t TokenKind> {
        self.current().map(|t| &t.kind)
    }

    fn peek_kind(&self, n: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn current_operator(&self) -> Option<Operator> {
        match self.current_kind() {
            Some(TokenKind::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    fn consume(&mut self) -> Option<&'t Token> {
        let token = self.current();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &TokenKind) -> FormulaResult<()> {
        match self.current() {
            Some(token) if &token.kind == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(FormulaError::Parse(format!(
                "Expected '{}', got '{}' at offset {}",
                expected, token.kind, token.offset
            ))),
            None => Err(FormulaError::Parse(format!(
                "Expected '{}', got end of formula",
                expected
            ))),
        }
    }

    fn unexpected(&self) -> FormulaError {
        match self.current() {
            Some(token) => FormulaError::Parse(format!(
                "Unexpected '{}' at offset {}",
                token.kind, token.offset
            )),
            None => FormulaError::Parse("Unexpected end of formula".into()),
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Comparison: =, <>, <, <=, >, >=
    // 2. Addition/Subtraction: +, -
    // 3. Multiplication/Division: *, /
    // 4. Unary: -, +
    // 5. Exponentiation: ^ (right operand parsed as unary)
    // 6. Primary: literals, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_additive()?;
        let base = self.depth;

        loop {
            let op = match self.current_operator() {
                Some(Operator::Equal) => BinaryOperator::Equal,
                Some(Operator::NotEqual) => BinaryOperator::NotEqual,
                Some(Operator::LessThan) => BinaryOperator::LessThan,
                Some(Operator::LessEqual) => BinaryOperator::LessEqual,
                Some(Operator::GreaterThan) => BinaryOperator::GreaterThan,
                Some(Operator::GreaterEqual) => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume();
            // Each operator deepens the left-leaning tree
            self.descend()?;
            let right = self.parse_additive()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;
        let base = self.depth;

        loop {
            let op = match self.current_operator() {
                Some(Operator::Plus) => BinaryOperator::Add,
                Some(Operator::Minus) => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            // Each operator deepens the left-leaning tree
            self.descend()?;
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_unary()?;
        let base = self.depth;

        loop {
            let op = match self.current_operator() {
                Some(Operator::Star) => BinaryOperator::Multiply,
                Some(Operator::Slash) => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            // Each operator deepens the left-leaning tree
            self.descend()?;
            let right = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        let op = match self.current_operator() {
            Some(Operator::Minus) => UnaryOperator::Negate,
            Some(Operator::Plus) => UnaryOperator::Plus,
            _ => return self.parse_power(),
        };

        self.consume();
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_primary()?;

        if self.current_operator() == Some(Operator::Caret) {
            self.consume();
            // Right associative: 2^3^2 = 2^(3^2), and 2^-1 is allowed
            self.descend()?;
            let right = self.parse_unary()?;
            self.depth -= 1;
            return Ok(FormulaExpr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        let Some(token) = self.current() else {
            return Err(self.unexpected());
        };

        match &token.kind {
            TokenKind::Integer(_) | TokenKind::Float(_) | TokenKind::String(_) => {
                self.consume();
                literal_expr(&token.kind)
            }

            TokenKind::LeftParen => {
                self.consume();
                self.descend()?;
                let expr = self.parse_expression()?;
                self.depth -= 1;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }

            TokenKind::Address(pos) => {
                self.consume();
                Ok(FormulaExpr::CellRef(*pos))
            }

            TokenKind::Range(start, end) => Err(FormulaError::Parse(format!(
                "Range {}:{} at offset {} is only allowed as a function argument",
                start, end, token.offset
            ))),

            TokenKind::Identifier(name) => {
                self.consume();
                self.descend()?;
                let call = self.parse_function_call(name.clone())?;
                self.depth -= 1;
                Ok(call)
            }

            _ => Err(self.unexpected()),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.expect(&TokenKind::LeftParen)?;

        let mut args = Vec::new();

        // Parse arguments
        if self.current_kind() != Some(&TokenKind::RightParen) {
            args.push(self.parse_argument()?);

            while self.current_kind() == Some(&TokenKind::Comma) {
                self.consume();
                args.push(self.parse_argument()?);
            }
        }

        self.expect(&TokenKind::RightParen)?;

        Ok(FormulaExpr::Function { name, args })
    }

    fn parse_argument(&mut self) -> FormulaResult<FormulaExpr> {
        // A range must be the whole argument
        if let Some(TokenKind::Range(start, end)) = self.current_kind() {
            if matches!(
                self.peek_kind(1),
                Some(TokenKind::Comma) | Some(TokenKind::RightParen)
            ) {
                self.consume();
                return Ok(FormulaExpr::RangeRef(CellRange::new(*start, *end)));
            }
        }

        self.parse_expression()
    }
}
