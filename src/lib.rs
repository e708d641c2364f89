//! Finds near-duplicate string literals (likely typos such as `"Hello"` vs `"Hella"`) in a body
//! of source code.
//!
//! Literals extracted from the source are indexed in a metric tree (BK-tree) over the
//! Damerau-Levenshtein distance, every distinct literal is then queried against that index at a
//! given radius, and the raw matches are deduplicated and grouped so that each relationship is
//! reported once.
//!
//! ```
//! use nearlit::*;
//!
//! let tree = build_index(vec![("Hello", "main.go:3"), ("Hella", "util.go:7")]);
//! let result = collect_matches(&tree, &["Hello", "Hella"], &MatchParameters::default().with_radius(1));
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.get("Hello").unwrap()[0].label, "Hello <-> hella");
//! ```

pub mod types;
pub mod distance;
pub mod bktree;
pub mod collect;
pub mod candidates;

pub use crate::types::*;
pub use crate::distance::*;
pub use crate::bktree::*;
pub use crate::collect::*;
pub use crate::candidates::*;
