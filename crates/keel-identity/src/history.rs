// history.rs
//
// Position tracker: maps raw line-counter values to the (file, line) pair a
// diagnostic should show, across nested file inclusion and line directives.
//
// The history is append-only. Each entry stores the mapping that is in force
// from its raw line until the next entry, so resolution is a binary search for
// the most recent entry at or before the raw counter.

use std::fmt;

use crate::Pos;

/// One recorded event in the line history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// A file starts at raw line `at`, whose first line is numbered `line`.
    Push { file: usize, at: Pos, line: u32 },
    /// The innermost file ends; raw line `at` belongs to the includer again.
    Pop { at: Pos },
    /// A line directive: raw line `at` is user line `line`, optionally in a
    /// renamed file.
    Line {
        at: Pos,
        line: u32,
        file: Option<usize>,
    },
}

impl HistoryEntry {
    fn at(&self) -> Pos {
        match self {
            HistoryEntry::Push { at, .. }
            | HistoryEntry::Pop { at }
            | HistoryEntry::Line { at, .. } => *at,
        }
    }
}

/// The mapping in force after an entry: raw `raw` is `line` of `file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    file: usize,
    raw: u32,
    line: u32,
}

impl Anchor {
    fn line_at(self, raw: u32) -> u32 {
        self.line + raw.saturating_sub(self.raw)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    anchor: Anchor,
    /// Line of the includer that follows the inclusion point.
    resume_line: u32,
}

/// A resolved, user-visible source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl fmt::Display for Position<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Append-only history of file pushes, pops and line directives.
#[derive(Debug, Clone, Default)]
pub struct LineHistory {
    files: Vec<Box<str>>,
    entries: Vec<(HistoryEntry, Option<Anchor>)>,
    stack: Vec<Frame>,
}

impl LineHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `file` begins at raw line `at`, its first line numbered
    /// `starting_line`. Nested pushes model file inclusion.
    pub fn record_file_push(&mut self, file: &str, at: Pos, starting_line: u32) {
        let file = self.file_index(file);
        let resume_line = self
            .stack
            .last()
            .map(|frame| frame.anchor.line_at(at.raw()))
            .unwrap_or(0);
        let anchor = Anchor {
            file,
            raw: at.raw(),
            line: starting_line,
        };
        self.stack.push(Frame {
            anchor,
            resume_line,
        });
        tracing::trace!(file = %self.files[file], raw = at.raw(), starting_line, "history push");
        self.append(
            HistoryEntry::Push {
                file,
                at,
                line: starting_line,
            },
            Some(anchor),
        );
    }

    /// Record the end of the innermost file at raw line `at`.
    pub fn record_file_pop(&mut self, at: Pos) {
        let Some(child) = self.stack.pop() else {
            tracing::warn!(raw = at.raw(), "history pop without matching push");
            return;
        };
        let anchor = self.stack.last_mut().map(|parent| {
            parent.anchor = Anchor {
                file: parent.anchor.file,
                raw: at.raw(),
                line: child.resume_line,
            };
            parent.anchor
        });
        tracing::trace!(raw = at.raw(), "history pop");
        self.append(HistoryEntry::Pop { at }, anchor);
    }

    /// Record a line directive: raw line `at` is line `user_line` of the
    /// current file, or of `file` when the directive renames it.
    pub fn record_line_adjustment(&mut self, at: Pos, user_line: u32, file: Option<&str>) {
        let file = file.map(|name| self.file_index(name));
        let Some(frame) = self.stack.last_mut() else {
            tracing::warn!(raw = at.raw(), "line directive outside of any file");
            return;
        };
        frame.anchor = Anchor {
            file: file.unwrap_or(frame.anchor.file),
            raw: at.raw(),
            line: user_line,
        };
        let anchor = frame.anchor;
        self.append(
            HistoryEntry::Line {
                at,
                line: user_line,
                file,
            },
            Some(anchor),
        );
    }

    /// Translate a raw line counter into the user-visible position.
    ///
    /// Returns `None` for counters before the first pushed file or after the
    /// outermost file was popped.
    pub fn resolve(&self, raw: Pos) -> Option<Position<'_>> {
        let after = self
            .entries
            .partition_point(|(entry, _)| entry.at() <= raw);
        let (_, anchor) = self.entries.get(after.checked_sub(1)?)?;
        let anchor = (*anchor)?;
        Some(Position {
            file: &self.files[anchor.file],
            line: anchor.line_at(raw.raw()),
        })
    }

    /// Recorded entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().map(|(entry, _)| entry)
    }

    /// Name of a file recorded in a [`HistoryEntry`].
    pub fn file_name(&self, file: usize) -> &str {
        &self.files[file]
    }

    /// Current inclusion depth (0 when no file is open).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn append(&mut self, entry: HistoryEntry, anchor: Option<Anchor>) {
        debug_assert!(
            self.entries
                .last()
                .is_none_or(|(last, _)| last.at() <= entry.at()),
            "line history must be recorded in raw-line order"
        );
        self.entries.push((entry, anchor));
    }

    fn file_index(&mut self, name: &str) -> usize {
        if let Some(index) = self.files.iter().position(|f| &**f == name) {
            return index;
        }
        self.files.push(name.into());
        self.files.len() - 1
    }
}
