use std::path::Path;
use std::process::ExitCode;

use cross_core_bench::logging;
use cross_core_bench::topology::{self, SYSFS_CPU_ROOT, TOPOLOGY_FILE};

fn run() -> cross_core_bench::Result<()> {
    let cpus = topology::read_topology(Path::new(SYSFS_CPU_ROOT))?;
    if cpus.is_empty() {
        println!("No CPU topology information found.");
        return Ok(());
    }

    print!("{}", topology::render_table(&cpus));
    topology::write_csv(Path::new(TOPOLOGY_FILE), &cpus)?;
    println!("\nCPU topology saved to '{TOPOLOGY_FILE}'.");
    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}
