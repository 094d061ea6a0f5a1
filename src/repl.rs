use crate::config::Config;
use crate::error::InterpretError;
use crate::vm::run_source;
use log::debug;
use std::io::{stderr, stdin, stdout, BufRead, Write};

pub fn repl(config: &Config) -> Result<(), InterpretError> {
    run_repl(stdin().lock(), stdout().lock(), stderr().lock(), config)
}

/// Compiles and runs every input line on its own, printing its value.
///
/// Syntax and runtime errors are written to `errors` and the loop carries on,
/// it only stops at end of input or when the streams themselves fail.
pub fn run_repl<R, W, E>(
    mut input: R,
    mut output: W,
    mut errors: E,
    config: &Config,
) -> Result<(), InterpretError>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut line = String::new();

    writeln!(output, "> Blue repl:")?;
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }

        if line.trim().is_empty() {
            continue;
        }

        debug!("repl input {:?}", line);
        match run_source(&line, config) {
            Ok(value) => writeln!(output, "{}", value)?,
            Err(InterpretError::Io(err)) => return Err(err.into()),
            Err(err) => writeln!(errors, "{}", err)?,
        }
    }
}
