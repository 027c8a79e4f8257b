//! Conflict marker resolution.
//!
//! The [`MarkerResolver`] walks a text once, line by line, and keeps the
//! stashed side (between `=======` and `>>>>>>>`) of every conflict region.
//! The upstream side (between `<<<<<<<` and `=======`) and the markers
//! themselves are dropped.
//!
//! # State machine
//!
//! | State        | Start              | Separator         | End              | Content |
//! |--------------|--------------------|-------------------|------------------|---------|
//! | `Normal`     | -> `InUpstream`, +1 | keep              | keep             | keep    |
//! | `InUpstream` | -> `InUpstream`, +1 | -> `InStashed`    | keep             | drop    |
//! | `InStashed`  | -> `InUpstream`, +1 | keep              | -> `Normal`      | keep    |
//!
//! Out-of-place separator and end markers are kept as content. A start
//! marker inside an open region starts a new region without closing the
//! old one; the upstream lines that follow are dropped and the count goes
//! up again. This is a known limitation: nested or interleaved markers are
//! not validated.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use super::marker::LineKind;
use crate::errors::FileError;
use crate::text_file;

/// Where the resolver is relative to a conflict region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverState {
    #[default]
    Normal,
    InUpstream,
    InStashed,
}

impl ResolverState {
    /// Feed one classified line through the state machine.
    fn advance(self, kind: LineKind) -> Step {
        use LineKind::*;
        use ResolverState::*;

        match (self, kind) {
            (_, Start) => Step::new(InUpstream, false).opening(),
            (InUpstream, Separator) => Step::new(InStashed, false),
            (InStashed, End) => Step::new(Normal, false),
            (InUpstream, Content) => Step::new(InUpstream, false),
            (state, _) => Step::new(state, true),
        }
    }

    /// Short label for logs and tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::InUpstream => "in-upstream",
            Self::InStashed => "in-stashed",
        }
    }
}

impl fmt::Display for ResolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a single transition.
#[derive(Debug, Clone, Copy)]
struct Step {
    next: ResolverState,
    keep: bool,
    opens_conflict: bool,
}

impl Step {
    fn new(next: ResolverState, keep: bool) -> Self {
        Self {
            next,
            keep,
            opens_conflict: false,
        }
    }

    fn opening(mut self) -> Self {
        self.opens_conflict = true;
        self
    }
}

/// Counters gathered during one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveReport {
    /// Number of start markers seen.
    pub conflicts: usize,
    /// Lines copied to the output.
    pub lines_kept: usize,
    /// Lines discarded, markers included.
    pub lines_dropped: usize,
    /// State after the last line. Anything but `Normal` means the input
    /// ended inside a conflict region.
    pub final_state: ResolverState,
}

impl ResolveReport {
    /// `true` if every opened conflict region was closed.
    pub fn is_terminated(&self) -> bool {
        self.final_state == ResolverState::Normal
    }

    /// The one-line console report.
    pub fn summary(&self) -> String {
        format!("Resolved {} conflicts.", self.conflicts)
    }
}

/// Resolved text together with its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub content: String,
    pub report: ResolveReport,
}

/// Stateless conflict marker resolution.
pub struct MarkerResolver;

impl MarkerResolver {
    /// Resolve every conflict region in `text`.
    ///
    /// Line terminators are carried through untouched, so input without
    /// markers comes back byte-identical. Never fails.
    pub fn resolve_str(text: &str) -> Resolved {
        let mut content = String::with_capacity(text.len());
        let mut report = ResolveReport::default();
        let mut state = ResolverState::Normal;

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let step = state.advance(LineKind::classify(line));

            if step.opens_conflict {
                if state != ResolverState::Normal {
                    debug!(
                        line = idx + 1,
                        state = %state,
                        "start marker inside an open conflict region"
                    );
                }
                report.conflicts += 1;
            }

            if step.keep {
                content.push_str(line);
                report.lines_kept += 1;
            } else {
                report.lines_dropped += 1;
            }

            state = step.next;
        }

        report.final_state = state;
        Resolved { content, report }
    }

    /// Resolve the file at `path` in place and return the report.
    ///
    /// The file is read whole, resolved in memory and atomically replaced,
    /// even when it contained no markers. Read, decode and write failures
    /// abort with the original file untouched.
    pub fn resolve_file(path: &Path) -> Result<ResolveReport, FileError> {
        let resolved = Self::scan(path)?;
        text_file::replace_atomically(path, &resolved.content)?;

        info!(
            path = %path.display(),
            kept = resolved.report.lines_kept,
            dropped = resolved.report.lines_dropped,
            "{}",
            resolved.report.summary()
        );
        Ok(resolved.report)
    }

    /// Run the resolution pass over `path` without writing anything back.
    pub fn scan_file(path: &Path) -> Result<ResolveReport, FileError> {
        Self::scan(path).map(|resolved| resolved.report)
    }

    fn scan(path: &Path) -> Result<Resolved, FileError> {
        let text = text_file::read_utf8(path)?;
        let resolved = Self::resolve_str(&text);

        if !resolved.report.is_terminated() {
            warn!(
                path = %path.display(),
                state = %resolved.report.final_state,
                "input ended inside a conflict region"
            );
        }
        Ok(resolved)
    }
}
