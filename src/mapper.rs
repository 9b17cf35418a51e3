//! Map stage: one `type<TAB>1` pair per raw JSON record line.
//!
//! Input is whatever an upstream collector dumped: JSON objects one per line,
//! interleaved with blank lines and the occasional corrupted write. Dropping
//! the bad lines instead of failing is the contract here; a dirty gigabyte
//! of logs must still produce totals for its clean records.

use std::io::{self, BufRead, Write};

use log::trace;
use serde_json::Value;
use thiserror::Error;

use crate::Pair;

/// Key substituted when a record carries no usable `type` field. Every such
/// record lands in this one bucket.
pub const DEFAULT_KEY: &str = "unknown";

/// Why a raw line was dropped instead of producing a pair. Never fatal and
/// never surfaced past the map loop, unlike the reducer's strict policy.
#[derive(Debug, Error)]
pub enum UnparsableRecord {
    #[error("empty line")]
    Empty,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not a JSON object")]
    NotAnObject,
}

/// Tallies of one map pass, for diagnostics only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapSummary {
    pub emitted: u64,
    pub skipped: u64,
}

/// Extract the grouping key from one raw record line.
///
/// The line must hold a JSON object; its `type` field is the key. A missing
/// `type`, a JSON `null`, or any non-string value falls back to
/// [`DEFAULT_KEY`].
pub fn record_key(line: &str) -> Result<String, UnparsableRecord> {
    let line = line.trim();
    if line.is_empty() {
        return Err(UnparsableRecord::Empty);
    }
    let record: Value = serde_json::from_str(line)?;
    let fields = record.as_object().ok_or(UnparsableRecord::NotAnObject)?;
    let key = fields
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_KEY);
    Ok(key.to_owned())
}

/// Map every record on `input` to a `key<TAB>1` line on `output`, in input
/// order. Unparsable lines are counted and dropped; only stream I/O can fail.
pub fn run<R: BufRead, W: Write>(input: R, mut output: W) -> io::Result<MapSummary> {
    let mut summary = MapSummary::default();
    for line in input.lines() {
        let line = line?;
        match record_key(&line) {
            Ok(key) => {
                writeln!(output, "{}", Pair { key, count: 1 })?;
                summary.emitted += 1;
            }
            Err(reason) => {
                trace!("dropped line: {}", reason);
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_the_type_field() {
        assert_eq!(record_key(r#"{"type":"click"}"#).unwrap(), "click");
        assert_eq!(
            record_key(r#"  {"type":"view","path":"/a"}  "#).unwrap(),
            "view"
        );
    }

    #[test]
    fn missing_or_non_string_type_falls_back() {
        assert_eq!(record_key("{}").unwrap(), DEFAULT_KEY);
        assert_eq!(record_key(r#"{"path":"/a"}"#).unwrap(), DEFAULT_KEY);
        assert_eq!(record_key(r#"{"type":null}"#).unwrap(), DEFAULT_KEY);
        assert_eq!(record_key(r#"{"type":123}"#).unwrap(), DEFAULT_KEY);
        assert_eq!(record_key(r#"{"type":["a"]}"#).unwrap(), DEFAULT_KEY);
    }

    #[test]
    fn empty_lines_are_not_records() {
        assert!(matches!(record_key(""), Err(UnparsableRecord::Empty)));
        assert!(matches!(record_key("   \t "), Err(UnparsableRecord::Empty)));
    }

    #[test]
    fn non_object_json_is_not_a_record() {
        for line in &[r#"[{"type":"click"}]"#, r#""click""#, "42", "null"] {
            assert!(
                matches!(record_key(line), Err(UnparsableRecord::NotAnObject)),
                "line {:?} should not be a record",
                line
            );
        }
    }

    #[test]
    fn broken_json_is_not_a_record() {
        assert!(matches!(
            record_key("garbage{{{"),
            Err(UnparsableRecord::Json(_))
        ));
    }

    #[test]
    fn maps_records_in_input_order() {
        let input = concat!(
            "{\"type\":\"click\"}\n",
            "{\"type\":\"click\"}\n",
            "garbage{{{\n",
            "{\"type\":\"view\"}\n",
            "{}\n",
        );
        let mut out = Vec::new();
        let summary = run(input.as_bytes(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "click\t1\nclick\t1\nview\t1\nunknown\t1\n"
        );
        assert_eq!(
            summary,
            MapSummary {
                emitted: 4,
                skipped: 1
            }
        );
    }

    #[test]
    fn noise_contributes_nothing() {
        let clean = "{\"type\":\"a\"}\n{\"type\":\"b\"}\n";
        let noisy = "\n{\"type\":\"a\"}\nnot json at all\n[1,2,3]\n{\"type\":\"b\"}\n   \n";

        let mut clean_out = Vec::new();
        let mut noisy_out = Vec::new();
        run(clean.as_bytes(), &mut clean_out).unwrap();
        let summary = run(noisy.as_bytes(), &mut noisy_out).unwrap();

        assert_eq!(clean_out, noisy_out);
        assert_eq!(summary.emitted, 2);
        assert_eq!(summary.skipped, 4);
    }

    #[test]
    fn mapping_twice_doubles_the_output() {
        let once = "{\"type\":\"click\"}\n{}\n";
        let twice = format!("{}{}", once, once);

        let mut out_once = Vec::new();
        let mut out_twice = Vec::new();
        run(once.as_bytes(), &mut out_once).unwrap();
        run(twice.as_bytes(), &mut out_twice).unwrap();

        assert_eq!(out_twice, [&out_once[..], &out_once[..]].concat());
    }
}
