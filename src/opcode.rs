use std::fmt::{Display, Formatter};

pub type Byte = u8;

/// OpCodes used by our vm.
///
/// `Constant` is followed by a big-endian u16 index into the constant pool,
/// every other instruction is a single byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Constant,
    Nil,
    True,
    False,
    Pop,
    Return,
    Negate,
    Not,
    Add,
    Subtract,
    Multiply,
    Divide,
    Exponentiate,
    Reminder,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl OpCode {
    /// Number of operand bytes following the opcode.
    pub fn operand_width(self) -> usize {
        match self {
            OpCode::Constant => 2,
            _ => 0,
        }
    }

    pub fn name(self) -> &'static str {
        use OpCode::*;

        match self {
            Constant => "Constant",
            Nil => "Nil",
            True => "True",
            False => "False",
            Pop => "Pop",
            Return => "Return",
            Negate => "Negate",
            Not => "Not",
            Add => "Add",
            Subtract => "Subtract",
            Multiply => "Multiply",
            Divide => "Divide",
            Exponentiate => "Exponentiate",
            Reminder => "Reminder",
            Equal => "Equal",
            NotEqual => "NotEqual",
            Greater => "Greater",
            GreaterEqual => "GreaterEqual",
            Less => "Less",
            LessEqual => "LessEqual",
        }
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<OpCode> for Byte {
    fn from(value: OpCode) -> Self {
        value as Byte
    }
}

impl TryFrom<Byte> for OpCode {
    type Error = Byte;

    fn try_from(value: Byte) -> Result<Self, Self::Error> {
        use OpCode::*;

        match value {
            0 => Ok(Constant),
            1 => Ok(Nil),
            2 => Ok(True),
            3 => Ok(False),
            4 => Ok(Pop),
            5 => Ok(Return),
            6 => Ok(Negate),
            7 => Ok(Not),
            8 => Ok(Add),
            9 => Ok(Subtract),
            10 => Ok(Multiply),
            11 => Ok(Divide),
            12 => Ok(Exponentiate),
            13 => Ok(Reminder),
            14 => Ok(Equal),
            15 => Ok(NotEqual),
            16 => Ok(Greater),
            17 => Ok(GreaterEqual),
            18 => Ok(Less),
            19 => Ok(LessEqual),
            other => Err(other),
        }
    }
}
