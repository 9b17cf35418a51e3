use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use atomicwrites::{AllowOverwrite, AtomicFile};
use log::info;
use structopt::StructOpt;

use log_reduce::{mapper, reducer};

#[derive(StructOpt, Debug)]
#[structopt(name = env!("CARGO_PKG_NAME"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"), author = env!("CARGO_PKG_AUTHORS"))]
struct Opt {
    /// Files of raw JSON record lines to process
    #[structopt(name = "FILE", parse(from_os_str))]
    files: Vec<PathBuf>,

    /// Write the totals here instead of stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

// The whole pipeline in one process, standing in for a streaming-job harness:
// map every file in argument order, sort the pair lines, reduce. The sort is
// the only place this binary buffers the full intermediate set.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let opt = Opt::from_args();

    let mut intermediate = Vec::new();
    for fname in &opt.files {
        let file = BufReader::new(File::open(fname)?);
        let summary = mapper::run(file, &mut intermediate)?;
        info!(
            "mapped {:?}: {} pairs, {} lines dropped",
            fname, summary.emitted, summary.skipped
        );
    }

    // Whole-line byte-order sort, same as `sort` between the two stages.
    let text = String::from_utf8(intermediate)?;
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort_unstable();
    let sorted = lines.join("\n");

    let mut totals = Vec::new();
    let summary = reducer::run(sorted.as_bytes(), &mut totals)?;
    info!("reduced {} pairs into {} groups", summary.pairs, summary.groups);

    match &opt.output {
        Some(path) => {
            let af = AtomicFile::new(path, AllowOverwrite);
            af.write(|f| f.write_all(&totals))?;
            info!("wrote {:?}", path);
        }
        None => io::stdout().write_all(&totals)?,
    }
    Ok(())
}
