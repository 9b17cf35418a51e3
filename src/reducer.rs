//! Reduce stage: fold a key-sorted pair stream into one total per key.
//!
//! The whole design hangs on the sort stage between mapper and reducer: with
//! equal keys adjacent, summation needs only the currently open group, so the
//! pass runs in constant space no matter how large the input is.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::{MalformedPairLine, Pair};

/// A failed reduce pass. Where the extractor shrugs off bad lines, a bad pair
/// line stops the reducer at the line it broke on.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Malformed { line: u64, source: MalformedPairLine },
}

/// Tallies of one reduce pass, for diagnostics only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReduceSummary {
    pub pairs: u64,
    pub groups: u64,
}

/// Sum `key<TAB>count` lines from `input` into one `key<TAB>total` line per
/// run of equal keys on `output`.
///
/// The input is assumed grouped by key (every pair sharing a key adjacent),
/// as the sort stage between mapper and reducer guarantees. That precondition
/// is not checked here: on ungrouped input the totals silently split across
/// several output lines. Debug builds do assert that keys arrive in ascending
/// byte order (what `LC_ALL=C sort` produces) and panic on the first key that
/// goes backwards.
///
/// Only the open group is held in memory. A line that is not a well-formed
/// pair fails the pass immediately with [`ReduceError::Malformed`]; groups
/// already written stay written, the open group is lost.
pub fn run<R: BufRead, W: Write>(input: R, mut output: W) -> Result<ReduceSummary, ReduceError> {
    let mut summary = ReduceSummary::default();
    let mut current: Option<Pair> = None;

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let pair: Pair = line.parse().map_err(|source| ReduceError::Malformed {
            line: number as u64 + 1,
            source,
        })?;
        summary.pairs += 1;

        current = Some(match current {
            // First pair of the stream opens the first group.
            None => pair,
            // Same key: the run continues.
            Some(mut open) if open.key == pair.key => {
                open.count += pair.count;
                open
            }
            // Different key: under the sort contract the previous run is done.
            Some(done) => {
                debug_assert!(
                    pair.key > done.key,
                    "pair stream not sorted by key: {:?} arrived after {:?}",
                    pair.key,
                    done.key
                );
                writeln!(output, "{}", done)?;
                summary.groups += 1;
                pair
            }
        });
    }

    // Flush the last group; without this the final key vanishes.
    if let Some(done) = current {
        writeln!(output, "{}", done)?;
        summary.groups += 1;
    }
    Ok(summary)
}
