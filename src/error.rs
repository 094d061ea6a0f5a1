use crate::opcode::{Byte, OpCode};
use crate::value::ValueKind;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Where in the source a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    End,
    Newline,
    Lexeme(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::End => f.write_str(" at end"),
            Location::Newline => f.write_str(" at newline"),
            Location::Lexeme(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// A single syntax error reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct Diagnostic {
    pub line: usize,
    pub location: Location,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.diagnostics))]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("Too many constants in one chunk.")]
    TooManyConstants,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("[line {line}] Operand of {op} must be a number, got {operand}.")]
    UnaryOperand {
        op: OpCode,
        operand: ValueKind,
        line: usize,
    },
    #[error("[line {line}] Invalid operands for {op}: {lhs} and {rhs}.")]
    BinaryOperands {
        op: OpCode,
        lhs: ValueKind,
        rhs: ValueKind,
        line: usize,
    },
    #[error("Stack underflow at offset {at}.")]
    StackUnderflow { at: usize },
    #[error("Unknown opcode {byte:#04x} at offset {at}.")]
    UnknownOpcode { byte: Byte, at: usize },
    #[error("Truncated operand at offset {at}.")]
    TruncatedOperand { at: usize },
    #[error("Constant #{index} does not exist.")]
    MissingConstant { index: u16 },
}

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl InterpretError {
    /// sysexits style process exit code
    pub fn exit_code(&self) -> u8 {
        match self {
            InterpretError::Compile(_) => 65,
            InterpretError::Runtime(_) => 70,
            InterpretError::Io(_) => 74,
        }
    }
}
