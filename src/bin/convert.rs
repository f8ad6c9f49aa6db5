use anyhow::Context;
use log::{error, LevelFilter};
use marc2xml::{CliCommand, ConvertConfig, MarcError, HELP_TEXT};
use std::env;
use std::io::Write;
use std::process::ExitCode;

fn init_logger(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // RUST_LOG is read first; the command line decides the crate's own level
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_module("marc2xml", level);
    builder.filter_module("convert", level);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}",
            buf.timestamp_seconds(),
            record.level(),
            record.args()
        )
    });
    // A logger may already be installed when embedded
    let _ = builder.try_init();
}

fn try_main(config: &ConvertConfig) -> anyhow::Result<()> {
    let summary = marc2xml::run(config).with_context(|| {
        format!(
            "Converting {} to {}",
            config.input.display(),
            config.output.display()
        )
    })?;
    println!("{} records written to {}", summary.records, config.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let config = match ConvertConfig::from_args(&args) {
        Ok(CliCommand::Run(config)) => config,
        Ok(CliCommand::Help) => {
            println!("{HELP_TEXT}");
            return ExitCode::SUCCESS;
        },
        Err(MarcError::Usage(msg)) => {
            eprintln!("Error: {msg}");
            eprintln!("{HELP_TEXT}");
            return ExitCode::from(2);
        },
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        },
    };

    init_logger(config.debug);

    match try_main(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        },
    }
}
