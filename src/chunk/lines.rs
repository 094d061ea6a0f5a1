/// Lines keep track of the line number corresponding to each code byte

#[derive(Debug)]
pub struct Lines(Vec<usize>);

impl Lines {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, line: usize) {
        self.0.push(line)
    }

    pub fn at(&self, index: usize) -> Option<usize> {
        self.0.get(index).copied()
    }
}
