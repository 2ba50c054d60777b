//! IDL to JSON CLI
//!
//! Entry point for the `idl-to-json` command-line tool.

use clap::Parser;
use idl_diff::{convert_path, ConverterConfig, DialectChoice};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "idl-to-json")]
#[command(about = "Merge Web IDL interfaces and dump them as JSON", version)]
struct Cli {
    /// IDL file or directory to convert
    path: PathBuf,

    /// Path to converter config file (TOML)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// IDL dialect: auto, blink or webkit (overrides the config file)
    #[arg(long, short = 'd')]
    dialect: Option<DialectChoice>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match cli.config {
        Some(ref path) => match ConverterConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => ConverterConfig::default(),
    };
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }

    let conversion = match convert_path(&cli.path, &config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for warning in &conversion.warnings {
        eprintln!("warning: {}", warning);
    }

    match conversion.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
