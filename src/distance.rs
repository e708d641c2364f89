use crate::types::*;

///Normalise a literal to the canonical case-insensitive form in which it is indexed and queried
pub fn normalize(word: &str) -> String {
    word.to_lowercase()
}

/// A dissimilarity measure between two (normalised) strings.
///
/// The index relies on the measure behaving like a metric: zero only for
/// identical inputs, symmetric, and (approximately) obeying the triangle inequality.
/// Any `Fn(&str, &str) -> DistanceType` can be used as a metric too.
pub trait Metric {
    fn distance(&self, a: &str, b: &str) -> DistanceType;
}

impl<F> Metric for F where F: Fn(&str, &str) -> DistanceType {
    fn distance(&self, a: &str, b: &str) -> DistanceType {
        self(a, b)
    }
}

///Damerau-Levenshtein distance: insertions, deletions, substitutions and transpositions of
///adjacent characters all have cost 1, and substrings may be edited more than once.
///This is a true metric.
#[derive(Debug,Clone,Copy,Default)]
pub struct DamerauLevenshtein;

impl Metric for DamerauLevenshtein {
    fn distance(&self, a: &str, b: &str) -> DistanceType {
        if a == b {
            return 0;
        }
        saturate(strsim::damerau_levenshtein(a, b))
    }
}

///Restricted Damerau-Levenshtein (optimal string alignment). Cheaper than
///[`DamerauLevenshtein`] but violates the triangle inequality in rare cases
///(e.g. `ca` -> `abc`), in which case searches may miss a match.
#[derive(Debug,Clone,Copy,Default)]
pub struct OptimalStringAlignment;

impl Metric for OptimalStringAlignment {
    fn distance(&self, a: &str, b: &str) -> DistanceType {
        if a == b {
            return 0;
        }
        saturate(strsim::osa_distance(a, b))
    }
}

///Plain levenshtein distance (no transpositions)
#[derive(Debug,Clone,Copy,Default)]
pub struct Levenshtein;

impl Metric for Levenshtein {
    fn distance(&self, a: &str, b: &str) -> DistanceType {
        if a == b {
            return 0;
        }
        saturate(strsim::levenshtein(a, b))
    }
}

fn saturate(distance: usize) -> DistanceType {
    DistanceType::try_from(distance).unwrap_or(DistanceType::MAX)
}
