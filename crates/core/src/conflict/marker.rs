//! Conflict marker recognition.

/// Opens a conflict region; the upstream side follows.
pub const START_MARKER: &str = "<<<<<<<";

/// Separates the upstream side from the stashed side.
pub const SEPARATOR_MARKER: &str = "=======";

/// Closes a conflict region.
pub const END_MARKER: &str = ">>>>>>>";

/// What a single line looks like to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Start,
    Separator,
    End,
    Content,
}

impl LineKind {
    /// Classify a line by its prefix.
    ///
    /// Matching is anchored at the first byte: indented markers and markers
    /// that appear mid-line are ordinary content.
    pub fn classify(line: &str) -> Self {
        if line.starts_with(START_MARKER) {
            Self::Start
        } else if line.starts_with(SEPARATOR_MARKER) {
            Self::Separator
        } else if line.starts_with(END_MARKER) {
            Self::End
        } else {
            Self::Content
        }
    }
}
