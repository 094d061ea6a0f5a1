use blue::config::{Binding, Config, Recovery};
use blue::reader::run_file;
use blue::repl::repl;
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "blue", version, about = "Compile and run blue scripts", long_about = None)]
struct Opt {
    /// Script to run, starts a repl when omitted
    path: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Print the compiled bytecode before running it
    #[arg(long)]
    disassemble: bool,

    /// What to do after the first syntax error
    #[arg(long, value_enum, default_value_t = RecoveryArg::Statement)]
    recovery: RecoveryArg,

    /// How operators of neighbouring levels group
    #[arg(long, value_enum, default_value_t = BindingArg::Strict)]
    binding: BindingArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RecoveryArg {
    /// Only report the first syntax error
    Sticky,
    /// Report the first syntax error of every statement
    Statement,
}

impl From<RecoveryArg> for Recovery {
    fn from(value: RecoveryArg) -> Self {
        match value {
            RecoveryArg::Sticky => Recovery::Sticky,
            RecoveryArg::Statement => Recovery::Statement,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BindingArg {
    /// `1 + 2 * 3` is `(1 + 2) * 3`
    Strict,
    /// `1 + 2 * 3` is `1 + (2 * 3)`
    Inclusive,
}

impl From<BindingArg> for Binding {
    fn from(value: BindingArg) -> Self {
        match value {
            BindingArg::Strict => Binding::Strict,
            BindingArg::Inclusive => Binding::Inclusive,
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let opt = Opt::parse();
    init_logger(opt.verbose);

    let config = Config {
        recovery: opt.recovery.into(),
        binding: opt.binding.into(),
        disassemble: opt.disassemble,
    };

    let result = match opt.path {
        Some(path) => run_file(&path, &config).map(|value| println!("{}", value)),
        None => repl(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
