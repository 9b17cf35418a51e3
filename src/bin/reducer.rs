use std::io::{self, BufWriter, Write};
use std::process;

use log::debug;

use log_reduce::reducer::{self, ReduceError};

// Reduce side of the streaming job: sorted `key<TAB>count` lines on stdin,
// one `key<TAB>total` line per key on stdout. A malformed pair line is fatal;
// the exit status and stderr tell the orchestration layer where it broke.
fn main() {
    pretty_env_logger::init();

    if let Err(err) = run() {
        eprintln!("reducer: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), ReduceError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    let summary = reducer::run(stdin.lock(), &mut output)?;
    output.flush()?;

    debug!(
        "reducer: {} groups from {} pairs",
        summary.groups, summary.pairs
    );
    Ok(())
}
