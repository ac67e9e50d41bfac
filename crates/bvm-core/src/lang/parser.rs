//! # Parser
//!
//! Recursive descent over the token stream. Operator precedence, loosest
//! first: `||`, `&&`, `== !=`, `< > <= >=`, `+ -`, `* / %`, unary `! -`.

use super::lexer::{Token, TokenKind};
use crate::domain::value_objects::Word;
use crate::errors::CompileError;

// =============================================================================
// SYNTAX TREE
// =============================================================================

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    fn from_punct(p: &str) -> Option<Self> {
        Some(match p {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Lte,
            ">=" => Self::Gte,
            "==" => Self::Eq,
            "!=" => Self::Neq,
            "&&" => Self::And,
            "||" => Self::Or,
            _ => return None,
        })
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!`, 1 for zero and 0 otherwise.
    Not,
    /// `-`, wrapping negation.
    Neg,
}

/// Expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer constant.
    Int(Word),
    /// Variable read.
    Var {
        /// Line of the reference.
        line: usize,
        /// Variable name.
        name: String,
    },
    /// Unary operation.
    Unary(UnaryOp, Box<Expr>),
    /// Binary operation.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Statement node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `int name [= init];`
    Declare {
        /// Line of the declaration.
        line: usize,
        /// Variable name.
        name: String,
        /// Initial value; without one the slot keeps whatever storage holds.
        init: Option<Expr>,
    },
    /// `name = value;` and the desugared compound forms.
    Assign {
        /// Line of the assignment.
        line: usize,
        /// Target variable.
        name: String,
        /// Value to store.
        value: Expr,
    },
    /// `if (cond) then [else otherwise]`
    If {
        /// Condition, true when non-zero.
        cond: Expr,
        /// Taken branch.
        then: Box<Stmt>,
        /// Fallback branch.
        otherwise: Option<Box<Stmt>>,
    },
    /// `while (cond) body`
    While {
        /// Condition, re-evaluated before every pass.
        cond: Expr,
        /// Loop body.
        body: Box<Stmt>,
    },
    /// `return;`
    Return,
    /// `{ ... }`
    Block(Vec<Stmt>),
}

/// A whole compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Top-level statements in source order.
    pub body: Vec<Stmt>,
}

const TYPE_KEYWORDS: [&str; 3] = ["int", "long", "boolean"];
const MODIFIERS: [&str; 5] = ["public", "private", "protected", "static", "final"];

// =============================================================================
// PARSER
// =============================================================================

/// Parse a token stream into a [`Program`].
///
/// Accepts either a bare statement list or one
/// `class Name { void main(...) { ... } }` wrapper around it.
///
/// # Errors
///
/// Returns [`CompileError::UnexpectedToken`] or
/// [`CompileError::UnexpectedEof`] on malformed input.
pub fn parse(tokens: &[Token]) -> Result<Program, CompileError> {
    let mut parser = Parser { tokens, pos: 0 };
    let body = parser.program()?;
    Ok(Program { body })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self, expected: &str) -> Result<Token, CompileError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| CompileError::UnexpectedEof {
                expected: expected.to_string(),
            })?;
        self.pos += 1;
        Ok(token)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(p)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_ident(word)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), CompileError> {
        let expected = format!("`{p}`");
        let token = self.next(&expected)?;
        if token.is_punct(p) {
            Ok(())
        } else {
            Err(unexpected(&token, expected))
        }
    }

    fn expect_name(&mut self) -> Result<(usize, String), CompileError> {
        let token = self.next("identifier")?;
        match token.kind {
            TokenKind::Ident(name) => Ok((token.line, name)),
            TokenKind::Int(_) | TokenKind::Punct(_) => {
                Err(unexpected(&token, "identifier".to_string()))
            }
        }
    }

    fn skip_modifiers(&mut self) {
        while MODIFIERS.iter().any(|m| self.eat_ident(m)) {}
    }

    fn expect_end(&self) -> Result<(), CompileError> {
        match self.peek() {
            Some(token) => Err(unexpected(token, "end of input".to_string())),
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Program structure
    // -------------------------------------------------------------------------

    fn program(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let start = self.pos;
        self.skip_modifiers();
        if !self.eat_ident("class") {
            self.pos = start;
            let mut body = Vec::new();
            while self.peek().is_some() {
                body.push(self.statement()?);
            }
            return Ok(body);
        }

        self.expect_name()?;
        self.expect_punct("{")?;
        self.skip_modifiers();
        // Return type, then the method name.
        self.expect_name()?;
        self.expect_name()?;
        self.parameters()?;
        let body = self.block_body()?;
        self.expect_punct("}")?;
        self.expect_end()?;
        Ok(body)
    }

    /// `( ... )` with the contents ignored, e.g. `(String[] args)`.
    fn parameters(&mut self) -> Result<(), CompileError> {
        self.expect_punct("(")?;
        while !self.eat_punct(")") {
            self.next("`)`")?;
        }
        Ok(())
    }

    fn block_body(&mut self) -> Result<Vec<Stmt>, CompileError> {
        self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.eat_punct("}") {
            if self.peek().is_none() {
                return Err(CompileError::UnexpectedEof {
                    expected: "`}`".to_string(),
                });
            }
            body.push(self.statement()?);
        }
        Ok(body)
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| CompileError::UnexpectedEof {
                expected: "statement".to_string(),
            })?;

        if token.is_punct("{") {
            return Ok(Stmt::Block(self.block_body()?));
        }
        if token.is_punct(";") {
            self.pos += 1;
            return Ok(Stmt::Block(Vec::new()));
        }
        if self.eat_ident("if") {
            let cond = self.condition()?;
            let then = Box::new(self.statement()?);
            let otherwise = if self.eat_ident("else") {
                Some(Box::new(self.statement()?))
            } else {
                None
            };
            return Ok(Stmt::If {
                cond,
                then,
                otherwise,
            });
        }
        if self.eat_ident("while") {
            let cond = self.condition()?;
            let body = Box::new(self.statement()?);
            return Ok(Stmt::While { cond, body });
        }
        if self.eat_ident("return") {
            self.expect_punct(";")?;
            return Ok(Stmt::Return);
        }
        if TYPE_KEYWORDS.iter().any(|k| token.is_ident(k)) {
            self.pos += 1;
            let (line, name) = self.expect_name()?;
            let init = if self.eat_punct("=") {
                Some(self.expression()?)
            } else {
                None
            };
            self.expect_punct(";")?;
            return Ok(Stmt::Declare { line, name, init });
        }
        if matches!(token.kind, TokenKind::Ident(_)) {
            let stmt = self.assignment()?;
            self.expect_punct(";")?;
            return Ok(stmt);
        }

        Err(unexpected(&token, "statement".to_string()))
    }

    fn condition(&mut self) -> Result<Expr, CompileError> {
        self.expect_punct("(")?;
        let cond = self.expression()?;
        self.expect_punct(")")?;
        Ok(cond)
    }

    fn assignment(&mut self) -> Result<Stmt, CompileError> {
        let (line, name) = self.expect_name()?;
        let current = || Expr::Var {
            line,
            name: name.clone(),
        };

        let token = self.next("assignment operator")?;
        let compound = match token.kind {
            TokenKind::Punct(p @ ("+=" | "-=" | "*=" | "/=" | "%=")) => {
                BinaryOp::from_punct(&p[..1])
            }
            _ => None,
        };
        let value = match (&token.kind, compound) {
            (TokenKind::Punct("="), _) => self.expression()?,
            (TokenKind::Punct("++"), _) => binary(BinaryOp::Add, current(), Expr::Int(1)),
            (TokenKind::Punct("--"), _) => binary(BinaryOp::Sub, current(), Expr::Int(1)),
            (_, Some(op)) => binary(op, current(), self.expression()?),
            _ => return Err(unexpected(&token, "assignment operator".to_string())),
        };
        Ok(Stmt::Assign { line, name, value })
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.binary_level(0)
    }

    fn binary_level(&mut self, level: usize) -> Result<Expr, CompileError> {
        const LEVELS: [&[&str]; 6] = [
            &["||"],
            &["&&"],
            &["==", "!="],
            &["<", ">", "<=", ">="],
            &["+", "-"],
            &["*", "/", "%"],
        ];

        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };
        let mut lhs = self.binary_level(level + 1)?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Punct(p)) if ops.contains(p) => BinaryOp::from_punct(p),
                _ => None,
            };
            let Some(op) = op else {
                return Ok(lhs);
            };
            self.pos += 1;
            let rhs = self.binary_level(level + 1)?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        if self.eat_punct("!") {
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?)));
        }
        if self.eat_punct("-") {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        if self.peek().is_some_and(|t| t.is_punct("(")) {
            return self.condition();
        }
        let token = self.next("expression")?;
        match &token.kind {
            TokenKind::Int(value) => Ok(Expr::Int(*value)),
            TokenKind::Ident(word) if word == "true" => Ok(Expr::Int(1)),
            TokenKind::Ident(word) if word == "false" => Ok(Expr::Int(0)),
            TokenKind::Ident(name) => Ok(Expr::Var {
                line: token.line,
                name: name.clone(),
            }),
            TokenKind::Punct(_) => Err(unexpected(&token, "expression".to_string())),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
}

fn unexpected(token: &Token, expected: String) -> CompileError {
    CompileError::UnexpectedToken {
        line: token.line,
        expected,
        found: token.kind.to_string(),
    }
}
