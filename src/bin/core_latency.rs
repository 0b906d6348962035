use std::process::ExitCode;

use cross_core_bench::{driver, logging, Config, ProbeKind};

fn main() -> ExitCode {
    logging::init();

    match driver::run(ProbeKind::Latency, &Config::default()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}
