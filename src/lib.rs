//! Streaming map/reduce over JSON log records, in the style of Hadoop
//! Streaming: the mapper turns each record line into a `key<TAB>1` pair, an
//! external sort groups the pairs by key, and the reducer folds each run of
//! equal keys into a single `key<TAB>total` line.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod mapper;
pub mod reducer;

/// One `key<TAB>count` line of the intermediate stream. The mapper emits
/// these, the sort stage orders them, the reducer consumes and re-emits them
/// as per-key totals. Both directions of the text format live here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub count: i64,
}

/// A line that cannot be read as a pair. Always fatal for the reducer, in
/// contrast to the mapper's skip-and-continue policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPairLine {
    #[error("expected two tab-separated fields, got {0:?}")]
    Fields(String),
    #[error("count is not an integer: {0:?}")]
    Count(String),
}

impl FromStr for Pair {
    type Err = MalformedPairLine;

    fn from_str(line: &str) -> Result<Self, MalformedPairLine> {
        let line = line.trim();
        let (key, count) = line
            .split_once('\t')
            .ok_or_else(|| MalformedPairLine::Fields(line.to_owned()))?;
        if count.contains('\t') {
            return Err(MalformedPairLine::Fields(line.to_owned()));
        }
        let count = count
            .trim()
            .parse()
            .map_err(|_| MalformedPairLine::Count(count.to_owned()))?;
        Ok(Pair {
            key: key.to_owned(),
            count,
        })
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.key, self.count)
    }
}
