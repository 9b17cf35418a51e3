use std::io::{self, BufWriter, Write};

use log::debug;

use log_reduce::mapper;

// Map side of the streaming job: JSON records on stdin, `type<TAB>1` lines on
// stdout. No flags, no arguments; the shuffle harness owns the plumbing.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    let summary = mapper::run(stdin.lock(), &mut output)?;
    output.flush()?;

    debug!(
        "mapper: {} pairs emitted, {} lines dropped",
        summary.emitted, summary.skipped
    );
    Ok(())
}
