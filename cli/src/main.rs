use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use ls8::Cpu;

#[derive(Parser, Debug)]
#[command(version, about = "LS-8 virtual machine", long_about = None)]
struct Args {
    /// Program file to load and execute
    #[arg(value_name = "PROGRAM", value_hint = clap::ValueHint::FilePath)]
    program: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    // Wrong argument count exits through clap with its usage error code (2),
    // leaving 1 to distinguish load and runtime failures.
    let args = Args::parse();

    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load_from_file(&args.program) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    debug!("{cpu}");

    match cpu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
