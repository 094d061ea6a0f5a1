use crate::error::ChunkError;
use crate::value::Value;

/// Constants contain all the literal values referenced by the code.

#[derive(Debug)]
pub(crate) struct Constants(Vec<Value>);

impl Constants {
    pub fn new() -> Self {
        Constants(Vec::new())
    }

    /// Returns the index to lookup the constant again, indices are encoded as u16 operands
    pub fn add(&mut self, value: Value) -> Result<u16, ChunkError> {
        let index = u16::try_from(self.0.len()).map_err(|_| ChunkError::TooManyConstants)?;
        self.0.push(value);
        Ok(index)
    }

    pub fn get(&self, index: u16) -> Option<&Value> {
        self.0.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
