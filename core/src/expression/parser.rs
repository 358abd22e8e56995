//! Expression parser for curve equations.
//!
//! Supports:
//! - Numbers (integers, floats, scientific notation)
//! - Free variables (`x`, and `y` inside implicit equations)
//! - Arithmetic operators (+, -, *, /) and power (`^` or `**`)
//! - Implicit multiplication (`2x`, `3(x + 1)`, `x(x - 1)`)
//! - Parentheses for grouping
//! - Single-argument functions (sin, cos, sqrt, abs, ...)
//! - Built-in constants (pi, e)

use thiserror::Error;

/// Parse error with location info
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at position {position}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Free variable reference (`x`, `y`, or anything the compiler rejects later)
    Var(String),
    /// Built-in constant (pi, e)
    Constant(String),
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation (negation)
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Function call
    FnCall {
        name: String,
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Visit every variable name referenced by this expression.
    pub fn for_each_var<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Var(name) => f(name),
            Expr::BinaryOp { left, right, .. } => {
                left.for_each_var(f);
                right.for_each_var(f);
            }
            Expr::UnaryOp { operand, .. } => operand.for_each_var(f),
            Expr::FnCall { arg, .. } => arg.for_each_var(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Neg,
}

/// Names that parse as a function call when followed by `(`.
pub const FUNCTIONS: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "sqrt", "cbrt", "abs",
    "ln", "log", "log10", "log2", "exp", "floor", "ceil", "round", "sign",
];

pub fn is_function(name: &str) -> bool {
    FUNCTIONS.contains(&name)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Eof,
}

impl Token {
    /// Tokens that may start an operand directly after another operand,
    /// which makes the pair an implicit product.
    fn starts_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Identifier(_) | Token::LParen)
    }
}

/// Tokenizer
struct Lexer {
    chars: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();

        let pos = self.position;

        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        match c {
            '+' => {
                self.advance();
                Ok(Token::Plus)
            }
            '-' => {
                self.advance();
                Ok(Token::Minus)
            }
            '*' => {
                self.advance();
                if self.peek() == Some('*') {
                    self.advance();
                    Ok(Token::Caret)
                } else {
                    Ok(Token::Star)
                }
            }
            '/' => {
                self.advance();
                Ok(Token::Slash)
            }
            '^' => {
                self.advance();
                Ok(Token::Caret)
            }
            '(' => {
                self.advance();
                Ok(Token::LParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RParen)
            }
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(Token::Identifier(self.read_identifier())),
            _ => Err(SyntaxError {
                message: format!("Unexpected character: '{}'", c),
                position: pos,
            }),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn read_number(&mut self) -> Result<Token, SyntaxError> {
        let pos = self.position;
        let mut num_str = String::new();
        let mut has_dot = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num_str.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // Scientific notation only when digits follow, so `2e` and `2exp(x)`
        // stay implicit products with the constant / function.
        if matches!(self.peek(), Some('e') | Some('E')) {
            let digits_at = match self.peek_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digits_at), Some(d) if d.is_ascii_digit()) {
                for _ in 0..digits_at {
                    if let Some(c) = self.advance() {
                        num_str.push(c);
                    }
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        num_str.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        num_str.parse::<f64>().map(Token::Number).map_err(|_| SyntaxError {
            message: format!("Invalid number: '{}'", num_str),
            position: pos,
        })
    }

    fn read_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }
}

/// Parser for expressions
struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    fn new(input: &str) -> Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            position: self.lexer.position,
        }
    }

    fn parse(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_additive()?;
        if self.current != Token::Eof {
            return Err(self.error(format!(
                "Unexpected token after expression: {:?}",
                self.current
            )));
        }
        Ok(expr)
    }

    // Additive: term (('+' | '-') term)*
    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    // Multiplicative: unary (('*' | '/') unary | power)*
    // A missing operator between two operands is an implicit product.
    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let (op, right) = match &self.current {
                Token::Star => {
                    self.advance()?;
                    (BinaryOperator::Mul, self.parse_unary()?)
                }
                Token::Slash => {
                    self.advance()?;
                    (BinaryOperator::Div, self.parse_unary()?)
                }
                t if t.starts_operand() => (BinaryOperator::Mul, self.parse_power()?),
                _ => break,
            };
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    // Unary: ('-' | '+') unary | power
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        match self.current {
            Token::Minus => {
                self.advance()?;
                let operand = self.parse_unary()?;
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Neg,
                    operand: Box::new(operand),
                })
            }
            Token::Plus => {
                self.advance()?;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    // Power: primary ('^' unary)?  (right associative, -x^2 == -(x^2))
    fn parse_power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.parse_primary()?;

        if self.current == Token::Caret {
            self.advance()?;
            let exp = self.parse_unary()?;
            Ok(Expr::BinaryOp {
                op: BinaryOperator::Pow,
                left: Box::new(base),
                right: Box::new(exp),
            })
        } else {
            Ok(base)
        }
    }

    // Primary: number | variable | constant | function_call | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match &self.current {
            Token::Number(n) => {
                let val = *n;
                self.advance()?;
                Ok(Expr::Number(val))
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;

                match name.as_str() {
                    "pi" => Ok(Expr::Constant("pi".to_string())),
                    "e" => Ok(Expr::Constant("e".to_string())),
                    _ if is_function(&name) && self.current == Token::LParen => {
                        self.advance()?; // consume '('
                        let arg = self.parse_additive()?;
                        self.expect_rparen("Expected ')' after function argument")?;
                        Ok(Expr::FnCall {
                            name,
                            arg: Box::new(arg),
                        })
                    }
                    _ => Ok(Expr::Var(name)),
                }
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_additive()?;
                self.expect_rparen("Expected ')'")?;
                Ok(expr)
            }
            Token::Eof => Err(self.error("Unexpected end of expression")),
            _ => Err(self.error(format!("Unexpected token: {:?}", self.current))),
        }
    }

    fn expect_rparen(&mut self, message: &str) -> Result<(), SyntaxError> {
        if self.current != Token::RParen {
            return Err(self.error(message));
        }
        self.advance()
    }
}

/// Parse an expression string into an AST
pub fn parse_expression(input: &str) -> Result<Expr, SyntaxError> {
    if input.trim().is_empty() {
        return Err(SyntaxError {
            message: "Empty expression".to_string(),
            position: 0,
        });
    }
    let mut parser = Parser::new(input)?;
    parser.parse()
}
