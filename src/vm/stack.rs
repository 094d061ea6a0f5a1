use crate::value::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub struct Stack(Vec<Value>);

impl Stack {
    pub fn new() -> Self {
        Stack(Vec::with_capacity(u8::MAX as usize))
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value)
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.0.pop()
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for value in &self.0 {
            write!(f, "[ {} ]", value.repr())?;
        }
        Ok(())
    }
}
