use crate::chunk::Chunk;
use crate::opcode::OpCode;
use std::io;
use std::io::Write;

impl Chunk {
    pub fn disassemble(&self, name: &str) -> io::Result<()> {
        let mut buffer = io::stdout().lock();
        self.disassemble_into(&mut buffer, name)
    }

    pub fn disassemble_into_string(&self, name: &str) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.disassemble_into(&mut buffer, name);

        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn disassemble_into<W: Write>(&self, buffer: &mut W, name: &str) -> io::Result<()> {
        writeln!(buffer)?;
        writeln!(buffer, "== {} ==", name)?;

        let mut at = 0;
        while at < self.len() {
            let (line, next) = self.disassemble_instruction(at);
            writeln!(buffer, "{}", line)?;
            at = next;
        }

        Ok(())
    }

    /// Returns the listing of the instruction at `at` and the location of the next one
    pub fn disassemble_instruction(&self, at: usize) -> (String, usize) {
        let line = self.line_at(at).unwrap_or_default();

        let Some(byte) = self.read_byte(at) else {
            return (format!("{:8} {:8} | <end>", at, line), at + 1);
        };

        match OpCode::try_from(byte) {
            Ok(OpCode::Constant) => {
                let next = at + 1 + OpCode::Constant.operand_width();
                let operand = match self.read_short(at + 1) {
                    Some(index) => match self.read_constant(index) {
                        Some(value) => format!("#{} {}", index, value.repr()),
                        None => format!("#{} <missing>", index),
                    },
                    None => "<truncated>".to_string(),
                };

                (format!("{:8} {:8} | Constant {}", at, line, operand), next)
            }
            Ok(code) => Self::simple_instruction(code.name(), at, line),
            Err(byte) => (
                format!("{:8} {:8} | Unknown {:#04x}", at, line, byte),
                at + 1,
            ),
        }
    }

    fn simple_instruction(name: &str, at: usize, line: usize) -> (String, usize) {
        (format!("{:8} {:8} | {}", at, line, name), at + 1)
    }
}
