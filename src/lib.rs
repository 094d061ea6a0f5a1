pub mod chunk;
pub mod compiler;
pub mod config;
pub mod error;
pub mod opcode;
pub mod reader;
pub mod repl;
pub mod tokenizer;
pub mod value;
pub mod vm;
