//! vtk2raw: write the point data of a VTK dataset as one raw matrix

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use vtk_raw::{convert, ConvertOptions, Encoding};

#[derive(Parser)]
#[command(name = "vtk2raw")]
#[command(about = "Write every point data array of a .vtk/.vti/.vtp/.vtu file as a raw row-major matrix")]
#[command(version)]
struct Cli {
    /// Input dataset (.vtk, .vti, .vtp or .vtu)
    input: PathBuf,

    /// Output file for the raw matrix
    output: PathBuf,

    /// 0 writes tab separated ascii, 1 writes native-endian float64 values
    #[arg(default_value = "0", value_parser = parse_binary_flag)]
    binary: Encoding,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn parse_binary_flag(flag: &str) -> Result<Encoding, String> {
    Encoding::from_flag(flag).ok_or_else(|| format!("expected 0 (ascii) or 1 (binary), got `{flag}`"))
}

fn run(cli: Cli) -> Result<()> {
    let options = ConvertOptions::new(cli.input, cli.output, cli.binary);

    convert(&options).with_context(|| {
        format!(
            "could not convert {} to {}",
            options.input.display(),
            options.output.display()
        )
    })?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
