use std::fmt;

use serde::Serialize;

///Edit distances are small non-negative integers
pub type DistanceType = u32;

///Index of a node in the arena of a [`crate::BkTree`]
pub type NodeId = usize;

///Decides which queries survive when two queries yield an identical match set
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum DedupStrategy {
    /// Only the first query producing a given match set is retained, later
    /// queries with a byte-identical (sorted) match set are dropped even if the query strings differ.
    MatchSet,

    /// Key the dedup step by the query string and the match set together,
    /// so distinct queries sharing the same targets are all retained.
    QueryAndMatchSet,
}

impl Default for DedupStrategy {
    fn default() -> Self {
        DedupStrategy::MatchSet
    }
}

#[derive(Clone,Debug)]
pub struct MatchParameters {
    /// Maximum edit distance (damerau-levenshtein) at which two literals are considered an approximate match.
    /// Exact matches (distance 0) are never reported, so a radius of 0 yields nothing.
    pub radius: DistanceType,

    /// Use only a single thread for the query phase instead of leveraging multiple cores
    pub single_thread: bool,

    pub dedup: DedupStrategy,
}

impl Default for MatchParameters {
    fn default() -> Self {
        Self {
            radius: 2,
            single_thread: false,
            dedup: DedupStrategy::default(),
        }
    }
}

impl MatchParameters {
    pub fn with_radius(mut self, radius: DistanceType) -> Self {
        self.radius = radius;
        self
    }
    pub fn with_single_thread(mut self) -> Self {
        self.single_thread = true;
        self
    }
    pub fn with_dedup(mut self, dedup: DedupStrategy) -> Self {
        self.dedup = dedup;
        self
    }
}

///Where a literal was found in the source code
#[derive(Clone,Debug,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize)]
pub struct SourcePosition {
    pub file: String,
    ///1-based line number, 0 if unknown
    pub line: u32,
    ///1-based column number, 0 if unknown
    pub column: u32,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn unknown() -> Self {
        Self::new("-", 0, 0)
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.column == 0 && self.file == "-"
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file)
        } else if self.column == 0 {
            write!(f, "{}:{}", self.file, self.line)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}
