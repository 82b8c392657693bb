// pos.rs
//
// Raw line counter carried by nodes and diagnostics.

/// Raw value of the scanner's line counter.
///
/// The counter increases monotonically across every file the scanner reads,
/// including nested inclusions, so a `Pos` alone does not name a file. Use
/// [`LineHistory::resolve`](crate::LineHistory::resolve) to recover the
/// `(file, line)` pair the user should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos(u32);

impl Pos {
    /// Position attached to synthesized nodes that have no source line.
    pub const NONE: Pos = Pos(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Pos {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
