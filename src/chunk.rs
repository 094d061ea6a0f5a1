use crate::error::ChunkError;
use crate::opcode::{Byte, OpCode};
use crate::value::Value;
use codes::Codes;
use constants::Constants;
use lines::Lines;

mod codes;
mod constants;
mod disassemble;
mod lines;

/// A compiled program: instruction bytes plus the constant pool they index into.
///
/// Written by the compiler, then handed over to the vm which only reads it.
#[derive(Debug)]
pub struct Chunk {
    code: Codes,
    constants: Constants,
    // Tracks the src line the corresponding byte refers to for error reporting
    lines: Lines,
    last_instruction: Option<usize>,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    pub fn new() -> Self {
        Chunk {
            code: Codes::new(),
            constants: Constants::new(),
            lines: Lines::new(),
            last_instruction: None,
        }
    }

    /// Appends a raw byte, returns its position in the code.
    pub fn push_code(&mut self, byte: Byte, line: usize) -> usize {
        let at = self.code.add(byte);
        self.lines.push(line);
        at
    }

    /// Appends a value to the constant pool, returns the index to look it up again.
    pub fn push_constant(&mut self, value: Value) -> Result<u16, ChunkError> {
        self.constants.add(value)
    }

    pub fn write_code(&mut self, op_code: OpCode, line: usize) -> usize {
        let at = self.push_code(op_code.into(), line);
        self.last_instruction = Some(at);
        at
    }

    pub fn write_short(&mut self, short: u16, line: usize) {
        for byte in short.to_be_bytes() {
            self.push_code(byte, line);
        }
    }

    /// Adds the value to the pool and emits the instruction loading it.
    pub fn write_constant(&mut self, value: Value, line: usize) -> Result<u16, ChunkError> {
        let index = self.push_constant(value)?;
        self.write_code(OpCode::Constant, line);
        self.write_short(index, line);
        Ok(index)
    }

    pub fn read_byte(&self, at: usize) -> Option<Byte> {
        self.code.get(at)
    }

    pub fn read_short(&self, at: usize) -> Option<u16> {
        let high = self.code.get(at)?;
        let low = self.code.get(at + 1)?;
        Some(u16::from_be_bytes([high, low]))
    }

    pub fn read_constant(&self, index: u16) -> Option<&Value> {
        self.constants.get(index)
    }

    pub fn line_at(&self, at: usize) -> Option<usize> {
        self.lines.at(at)
    }

    /// The opcode of the most recently written instruction.
    pub fn last_code(&self) -> Option<OpCode> {
        let at = self.last_instruction?;
        OpCode::try_from(self.code.get(at)?).ok()
    }

    /// Rewrites the most recently written instruction with another single byte opcode.
    pub(crate) fn patch_last(&mut self, op_code: OpCode) {
        if let Some(at) = self.last_instruction {
            self.code.patch(at, op_code.into());
        }
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.len() == 0
    }

    pub fn constants_len(&self) -> usize {
        self.constants.len()
    }
}
