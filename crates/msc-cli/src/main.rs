//! `msc`: assemble a text program and run its `@main` function.

mod cli;
mod error;

use std::io::Read as _;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use cli::Cli;
use error::{CliError, CliResult};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("msc: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = fmt::layer()
        .with_ansi(!no_color)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

fn read_source(cli: &Cli) -> CliResult<String> {
    match &cli.file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::ReadSource {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::ReadSource {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buf)
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let source = read_source(cli)?;

    let gc_config = msc_gc::GcConfig {
        verbose: cli.verbose,
        ..msc_gc::GcConfig::default()
    };
    let mut runtime = msc_vm::Runtime::new(gc_config);
    let program = msc_asm::Assembler::assemble(&source, &mut runtime)?;

    for (index, proto) in program.functions.iter().enumerate() {
        if cli.dump_bytecode {
            print!("{}", proto.disassemble(&runtime));
        }
        runtime.install(index as u8, proto.clone());
    }

    if cli.dump_bytecode {
        return Ok(());
    }

    let Some(main_index) = program.main_index else {
        return Err(CliError::Assembly(msc_asm::AsmError::NoMainFunction));
    };
    let main = runtime.function(main_index as u8).expect("main_index was just installed");

    let mut vm = msc_vm::Vm::default();
    let result = vm.exec(&mut runtime, main, cli.max_cycles)?;
    println!("{}", msc_value::to_string(result, &runtime));
    Ok(())
}
