//! Curly-brace balance counting.
//!
//! A quick sanity check after hand-resolving conflicts in brace-delimited
//! source: every `{` adds one, every `}` subtracts one, and anything after
//! the line-comment prefix is ignored. String literals and block comments
//! are not understood, so the result is a heuristic.

use std::path::Path;

use tracing::info;

use crate::errors::FileError;
use crate::text_file;

/// Line-comment prefix used when none is configured.
pub const DEFAULT_COMMENT_PREFIX: &str = "//";

/// Result of a brace count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BraceBalance {
    /// Opening minus closing braces over the whole text.
    pub balance: i64,
    /// Lowest running balance reached (0 if it never went negative).
    pub lowest: i64,
    /// 1-based line where `lowest` was first reached, if below zero.
    pub lowest_line: Option<usize>,
    /// Lines scanned.
    pub lines: usize,
}

impl BraceBalance {
    pub fn is_balanced(&self) -> bool {
        self.balance == 0 && self.lowest >= 0
    }

    /// The one-line console report.
    pub fn summary(&self) -> String {
        format!("Final File Balance: {}", self.balance)
    }
}

/// Stateless brace counting.
pub struct BraceCounter;

impl BraceCounter {
    /// Count braces in `text`, ignoring everything after `comment_prefix`
    /// on each line. An empty prefix disables comment stripping.
    pub fn count_str(text: &str, comment_prefix: &str) -> BraceBalance {
        let mut result = BraceBalance::default();

        for (idx, line) in text.lines().enumerate() {
            let code = match comment_prefix {
                "" => line,
                prefix => line.split(prefix).next().unwrap_or(line),
            };

            for c in code.chars() {
                match c {
                    '{' => result.balance += 1,
                    '}' => {
                        result.balance -= 1;
                        if result.balance < result.lowest {
                            result.lowest = result.balance;
                            result.lowest_line = Some(idx + 1);
                        }
                    }
                    _ => {}
                }
            }
            result.lines += 1;
        }

        result
    }

    /// Count braces in the file at `path`. The file is never modified.
    pub fn count_file(path: &Path, comment_prefix: &str) -> Result<BraceBalance, FileError> {
        let text = text_file::read_utf8(path)?;
        let result = Self::count_str(&text, comment_prefix);

        info!(
            path = %path.display(),
            lines = result.lines,
            lowest = result.lowest,
            "{}",
            result.summary()
        );
        Ok(result)
    }
}
