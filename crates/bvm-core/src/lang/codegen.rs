//! # Code Generation
//!
//! Lowers the statement tree to bytecode. Every variable lives in its own
//! storage slot; expressions are evaluated on the stack, left operand first,
//! so the VM's `b op a` order computes `left op right`.
//!
//! ## Control Flow
//!
//! ```text
//! if:    <cond> ISZERO PUSH1 else JUMPI <then> PUSH1 end JUMP
//!        else: JUMPDEST <otherwise> end: JUMPDEST
//! while: top: JUMPDEST <cond> ISZERO PUSH1 end JUMPI <body> PUSH1 top JUMP
//!        end: JUMPDEST
//! ```

use super::parser::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use super::CompiledContract;
use crate::domain::value_objects::Word;
use crate::errors::CompileError;
use crate::vm::opcodes::Opcode;
use std::collections::BTreeMap;

/// Generate bytecode for `program`. The output always ends in STOP.
///
/// # Errors
///
/// Returns [`CompileError::UndefinedVariable`] and
/// [`CompileError::DuplicateVariable`] for scoping mistakes, and
/// [`CompileError::ProgramTooLarge`] when a jump target lies past offset 255.
pub fn generate(program: &Program) -> Result<CompiledContract, CompileError> {
    let mut generator = Generator::default();
    for stmt in &program.body {
        generator.statement(stmt)?;
    }
    generator.op(Opcode::Stop);
    generator.finish()
}

#[derive(Default)]
struct Generator {
    code: Vec<u8>,
    slots: BTreeMap<String, Word>,
    /// Offset of each label's JUMPDEST once placed.
    labels: Vec<Option<usize>>,
    /// PUSH1 operand offsets waiting for a label.
    fixups: Vec<(usize, usize)>,
}

impl Generator {
    // -------------------------------------------------------------------------
    // Emission
    // -------------------------------------------------------------------------

    fn op(&mut self, opcode: Opcode) {
        self.code.push(opcode.byte());
    }

    fn push_byte(&mut self, byte: u8) {
        self.op(Opcode::Push1);
        self.code.push(byte);
    }

    /// Push any constant using only one-byte immediates.
    fn push_const(&mut self, value: Word) {
        if let Ok(byte) = u8::try_from(value) {
            self.push_byte(byte);
        } else if value < 0 {
            self.push_byte(0);
            self.push_wide(value.unsigned_abs());
            self.op(Opcode::Sub);
        } else {
            self.push_wide(value.unsigned_abs());
        }
    }

    /// `value = (value >> 8) * 256 + (value & 0xff)`, built with wrapping
    /// MUL and ADD so the full 64-bit pattern survives.
    fn push_wide(&mut self, value: u64) {
        let low = value.to_le_bytes()[0];
        let high = value >> 8;
        if high == 0 {
            self.push_byte(low);
            return;
        }
        self.push_wide(high);
        self.push_byte(16);
        self.push_byte(16);
        self.op(Opcode::Mul);
        self.op(Opcode::Mul);
        if low != 0 {
            self.push_byte(low);
            self.op(Opcode::Add);
        }
    }

    fn new_label(&mut self) -> usize {
        self.labels.push(None);
        self.labels.len() - 1
    }

    fn place(&mut self, label: usize) {
        self.labels[label] = Some(self.code.len());
        self.op(Opcode::JumpDest);
    }

    fn push_label(&mut self, label: usize) {
        self.op(Opcode::Push1);
        self.fixups.push((self.code.len(), label));
        self.code.push(0);
    }

    fn finish(mut self) -> Result<CompiledContract, CompileError> {
        let end = self.code.len();
        for &(at, label) in &self.fixups {
            // An unplaced label points past the code.
            let offset = self.labels[label].unwrap_or(end);
            self.code[at] =
                u8::try_from(offset).map_err(|_| CompileError::ProgramTooLarge { offset })?;
        }
        Ok(CompiledContract {
            code: self.code,
            slots: self.slots,
        })
    }

    // -------------------------------------------------------------------------
    // Variables
    // -------------------------------------------------------------------------

    fn declare(&mut self, line: usize, name: &str) -> Result<Word, CompileError> {
        if self.slots.contains_key(name) {
            return Err(CompileError::DuplicateVariable {
                line,
                name: name.to_string(),
            });
        }
        let slot = Word::try_from(self.slots.len()).unwrap_or(Word::MAX);
        self.slots.insert(name.to_string(), slot);
        Ok(slot)
    }

    fn lookup(&self, line: usize, name: &str) -> Result<Word, CompileError> {
        self.slots
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::UndefinedVariable {
                line,
                name: name.to_string(),
            })
    }

    /// Pops the value on top of the stack into `slot`.
    fn store(&mut self, slot: Word) {
        self.push_const(slot);
        self.op(Opcode::SStore);
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn statement(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Declare { line, name, init } => {
                // The initializer cannot see the variable it declares.
                if let Some(init) = init {
                    self.expression(init)?;
                }
                let slot = self.declare(*line, name)?;
                if init.is_some() {
                    self.store(slot);
                }
            }
            Stmt::Assign { line, name, value } => {
                let slot = self.lookup(*line, name)?;
                self.expression(value)?;
                self.store(slot);
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                let skip = self.new_label();
                self.expression(cond)?;
                self.op(Opcode::IsZero);
                self.push_label(skip);
                self.op(Opcode::JumpI);
                self.statement(then)?;
                if let Some(otherwise) = otherwise {
                    let end = self.new_label();
                    self.push_label(end);
                    self.op(Opcode::Jump);
                    self.place(skip);
                    self.statement(otherwise)?;
                    self.place(end);
                } else {
                    self.place(skip);
                }
            }
            Stmt::While { cond, body } => {
                let top = self.new_label();
                let end = self.new_label();
                self.place(top);
                self.expression(cond)?;
                self.op(Opcode::IsZero);
                self.push_label(end);
                self.op(Opcode::JumpI);
                self.statement(body)?;
                self.push_label(top);
                self.op(Opcode::Jump);
                self.place(end);
            }
            Stmt::Return => self.op(Opcode::Stop),
            Stmt::Block(body) => {
                for stmt in body {
                    self.statement(stmt)?;
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn expression(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Int(value) => self.push_const(*value),
            Expr::Var { line, name } => {
                let slot = self.lookup(*line, name)?;
                self.push_const(slot);
                self.op(Opcode::SLoad);
            }
            Expr::Unary(UnaryOp::Not, inner) => {
                self.expression(inner)?;
                self.op(Opcode::IsZero);
            }
            Expr::Unary(UnaryOp::Neg, inner) => {
                self.push_byte(0);
                self.expression(inner)?;
                self.op(Opcode::Sub);
            }
            Expr::Binary(op, lhs, rhs) => self.binary(*op, lhs, rhs)?,
        }
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<(), CompileError> {
        // Logic works on truth values: !(!a + !b) for AND, !(!a * !b) for OR.
        let logical = matches!(op, BinaryOp::And | BinaryOp::Or);
        self.expression(lhs)?;
        if logical {
            self.op(Opcode::IsZero);
        }
        self.expression(rhs)?;
        if logical {
            self.op(Opcode::IsZero);
        }

        match op {
            BinaryOp::Add => self.op(Opcode::Add),
            BinaryOp::Sub => self.op(Opcode::Sub),
            BinaryOp::Mul => self.op(Opcode::Mul),
            BinaryOp::Div => self.op(Opcode::Div),
            BinaryOp::Mod => self.op(Opcode::Mod),
            BinaryOp::Lt => self.op(Opcode::Lt),
            BinaryOp::Gt => self.op(Opcode::Gt),
            BinaryOp::Lte => self.op(Opcode::Lte),
            BinaryOp::Gte => self.op(Opcode::Gte),
            BinaryOp::Eq => self.op(Opcode::Eq),
            BinaryOp::Neq => {
                self.op(Opcode::Eq);
                self.op(Opcode::IsZero);
            }
            BinaryOp::And => {
                self.op(Opcode::Add);
                self.op(Opcode::IsZero);
            }
            BinaryOp::Or => {
                self.op(Opcode::Mul);
                self.op(Opcode::IsZero);
            }
        }
        Ok(())
    }
}
