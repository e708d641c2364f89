use std::collections::HashSet;
use std::fmt::Debug;

use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::bktree::*;
use crate::distance::*;
use crate::types::*;

///Fingerprint of a sorted match set
pub type MatchDigest = [u8; 32];

///A query with the nodes it matched, sorted by normalised word
#[derive(Debug)]
pub struct MatchSet<'a, P> {
    pub query: String,
    pub hits: Vec<&'a IndexedWord<P>>,
}

impl<'a, P: Debug> MatchSet<'a, P> {
    /// Search the index and sort the hits by normalised word
    pub fn new<M: Metric>(tree: &'a BkTree<P, M>, query: &str, radius: DistanceType) -> Self {
        let mut hits = tree.search(query, radius);
        //stable: ties keep traversal order
        hits.sort_by(|a, b| a.word.cmp(&b.word));
        Self {
            query: query.to_string(),
            hits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// SHA-256 over the full content of the sorted hits (word and position).
    /// Every field is length-prefixed so distinct hit lists can't produce the same byte stream.
    pub fn digest(&self) -> MatchDigest {
        let mut hasher = Sha256::new();
        for hit in self.hits.iter() {
            let position = format!("{:?}", hit.position);
            hasher.update((hit.word.len() as u64).to_le_bytes());
            hasher.update(hit.word.as_bytes());
            hasher.update((position.len() as u64).to_le_bytes());
            hasher.update(position.as_bytes());
        }
        hasher.finalize().into()
    }

    /// Symmetric key identifying reciprocal pairs: the lowercased query and the concatenation of
    /// the sorted matched words, as an ordered pair. "hello" matching ["hella"] has the same key as
    /// "Hella" matching ["hello"].
    pub fn grouping_key(&self) -> (String, String) {
        let query = normalize(&self.query);
        let mut words: Vec<&str> = self.hits.iter().map(|hit| hit.word.as_str()).collect();
        words.sort_unstable();
        let words = normalize(&words.concat());
        if query <= words {
            (query, words)
        } else {
            (words, query)
        }
    }
}

///A matched node with the label describing the relationship, e.g. `Hello <-> hella`
#[derive(Debug,Clone)]
pub struct Association<'a, P> {
    pub node: &'a IndexedWord<P>,
    pub label: String,
}

impl<'a, P> Association<'a, P> {
    pub fn word(&self) -> &'a str {
        self.node.word.as_str()
    }

    pub fn position(&self) -> &'a P {
        &self.node.position
    }
}

#[derive(Debug,Clone)]
pub struct GroupedEntry<'a, P> {
    pub query: String,
    pub associations: Vec<Association<'a, P>>,
}

/// The final, deduplicated and grouped result of a collection run.
/// Entries are ordered by the first-seen order of their queries.
#[derive(Debug,Clone)]
pub struct GroupedResult<'a, P> {
    entries: Vec<GroupedEntry<'a, P>>,
}

impl<'a, P> GroupedResult<'a, P> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupedEntry<'a, P>> {
        self.entries.iter()
    }

    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.query.as_str())
    }

    pub fn get(&self, query: &str) -> Option<&[Association<'a, P>]> {
        self.entries
            .iter()
            .find(|entry| entry.query == query)
            .map(|entry| entry.associations.as_slice())
    }

    pub fn contains(&self, query: &str) -> bool {
        self.get(query).is_some()
    }

    /// Flatten into `(query, [(position, matched word, label)])` for presentation
    pub fn rows(&self) -> Vec<(&str, Vec<(&'a P, &'a str, &str)>)> {
        self.entries
            .iter()
            .map(|entry| {
                (
                    entry.query.as_str(),
                    entry
                        .associations
                        .iter()
                        .map(|assoc| (assoc.position(), assoc.word(), assoc.label.as_str()))
                        .collect(),
                )
            })
            .collect()
    }
}

impl<'a, P: Serialize> GroupedResult<'a, P> {
    pub fn to_report(&self) -> Vec<ReportEntry<'_, P>> {
        self.entries
            .iter()
            .map(|entry| ReportEntry {
                query: entry.query.as_str(),
                matches: entry
                    .associations
                    .iter()
                    .map(|assoc| ReportMatch {
                        word: assoc.word(),
                        position: assoc.position(),
                        label: assoc.label.as_str(),
                    })
                    .collect(),
            })
            .collect()
    }
}

///Serialisable view of one grouped entry
#[derive(Debug,Serialize)]
pub struct ReportEntry<'r, P: Serialize> {
    pub query: &'r str,
    pub matches: Vec<ReportMatch<'r, P>>,
}

#[derive(Debug,Serialize)]
pub struct ReportMatch<'r, P: Serialize> {
    pub word: &'r str,
    pub position: &'r P,
    pub label: &'r str,
}

/// Query the fully built index with every distinct candidate, drop empty and duplicate match sets,
/// and collapse reciprocal pairs.
///
/// Repeated queries are only processed once, empty queries are ignored. The query phase runs in
/// parallel unless `params.single_thread` is set; resolution of duplicates always follows the order
/// of `queries`, so the output is the same either way.
pub fn collect_matches<'a, P, M, S>(tree: &'a BkTree<P, M>, queries: &[S], params: &MatchParameters) -> GroupedResult<'a, P>
where
    P: Debug + Sync,
    M: Metric + Sync,
    S: AsRef<str> + Sync,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let distinct: Vec<&str> = queries
        .iter()
        .map(|query| query.as_ref())
        .filter(|query| !query.is_empty() && seen.insert(*query))
        .collect();

    let matchsets: Vec<MatchSet<'a, P>> = if params.single_thread {
        distinct.iter().map(|query| MatchSet::new(tree, query, params.radius)).collect()
    } else {
        distinct.par_iter().map(|query| MatchSet::new(tree, query, params.radius)).collect()
    };
    debug!("searched {} distinct queries at radius {}", matchsets.len(), params.radius);

    let retained = dedup_matchsets(matchsets, params.dedup);
    group_reciprocals(retained)
}

/// Drop queries without hits, then keep only the first query for each match set digest
pub fn dedup_matchsets<'a, P: Debug>(matchsets: Vec<MatchSet<'a, P>>, strategy: DedupStrategy) -> Vec<MatchSet<'a, P>> {
    let total = matchsets.len();
    let mut encountered: HashSet<(Option<String>, MatchDigest)> = HashSet::new();
    let mut retained = Vec::new();
    for matchset in matchsets {
        if matchset.is_empty() {
            trace!("no matches for {:?}", matchset.query);
            continue;
        }
        let key = match strategy {
            DedupStrategy::MatchSet => (None, matchset.digest()),
            DedupStrategy::QueryAndMatchSet => (Some(matchset.query.clone()), matchset.digest()),
        };
        if encountered.insert(key) {
            retained.push(matchset);
        } else {
            trace!("dropping {:?}, an earlier query produced the same matches", matchset.query);
        }
    }
    debug!("retained {} out of {} match sets after dedup", retained.len(), total);
    retained
}

/// Collapse reciprocal pairs (first-seen wins) and attach association labels
pub fn group_reciprocals<'a, P: Debug>(matchsets: Vec<MatchSet<'a, P>>) -> GroupedResult<'a, P> {
    let mut encountered: HashSet<(String, String)> = HashSet::new();
    let mut entries = Vec::new();
    for matchset in matchsets {
        if !encountered.insert(matchset.grouping_key()) {
            trace!("dropping {:?}, reciprocal of an earlier query", matchset.query);
            continue;
        }
        let associations = matchset
            .hits
            .iter()
            .map(|node| Association {
                node: *node,
                label: format!("{} <-> {}", matchset.query, node.word),
            })
            .collect();
        entries.push(GroupedEntry {
            query: matchset.query,
            associations,
        });
    }
    debug!("grouped into {} entries", entries.len());
    GroupedResult { entries }
}
