use crate::config::Config;
use crate::error::InterpretError;
use crate::value::Value;
use crate::vm::run_source;
use log::info;
use std::fs;
use std::path::Path;

pub fn run_file(path: &Path, config: &Config) -> Result<Value, InterpretError> {
    info!("reading file from path {}", path.display());

    let buffer = fs::read_to_string(path)?;

    run_source(&buffer, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn runs_a_script_file() {
        let path = env::temp_dir().join(format!("blue-reader-{}.blue", std::process::id()));
        fs::write(&path, "// sum\n1 + 2\n3 * 4\n").unwrap();

        let result = run_file(&path, &Config::default());
        fs::remove_file(&path).unwrap();

        assert_eq!(result.unwrap(), Value::Number(12.0));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = env::temp_dir().join("blue-reader-does-not-exist.blue");

        let err = run_file(&path, &Config::default()).unwrap_err();

        assert!(matches!(err, InterpretError::Io(_)));
        assert_eq!(err.exit_code(), 74);
    }
}
