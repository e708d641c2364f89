use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::distance::*;
use crate::types::*;

///A literal stored in the index
#[derive(Debug,Clone)]
pub struct IndexedWord<P> {
    /// The normalised (lowercased) literal
    pub word: String,

    /// Provenance of the first occurrence of the literal, carried through unmodified
    pub position: P,

    /// Children keyed by their distance to this node (never 0), values index into the arena
    children: BTreeMap<DistanceType, NodeId>,
}

impl<P> IndexedWord<P> {
    fn new(word: String, position: P) -> Self {
        Self {
            word,
            position,
            children: BTreeMap::new(),
        }
    }

    pub fn child(&self, distance: DistanceType) -> Option<NodeId> {
        self.children.get(&distance).copied()
    }

    pub fn children(&self) -> impl Iterator<Item = (DistanceType, NodeId)> + '_ {
        self.children.iter().map(|(distance, id)| (*distance, *id))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

///What happened to a word passed to [`BkTree::insert`]
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Insertion {
    /// The word was stored as a new node
    Added(NodeId),
    /// The normalised word was already present in this node, nothing changed
    Duplicate(NodeId),
}

/// Metric tree (BK-tree) over normalised literals.
///
/// Nodes live in a flat arena, the root is the first node. Every child is keyed by its exact
/// distance to its parent, which lets a range search skip entire subtrees by the triangle
/// inequality. The shape depends on insertion order (the first word becomes the root).
#[derive(Debug,Clone)]
pub struct BkTree<P, M = DamerauLevenshtein> {
    nodes: Vec<IndexedWord<P>>,
    metric: M,
}

impl<P> BkTree<P, DamerauLevenshtein> {
    pub fn new() -> Self {
        Self::with_metric(DamerauLevenshtein)
    }
}

impl<P> Default for BkTree<P, DamerauLevenshtein> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, M: Metric> BkTree<P, M> {
    pub fn with_metric(metric: M) -> Self {
        Self {
            nodes: Vec::new(),
            metric,
        }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    ///Number of distinct normalised words stored
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&IndexedWord<P>> {
        self.nodes.first()
    }

    pub fn get(&self, id: NodeId) -> Option<&IndexedWord<P>> {
        self.nodes.get(id)
    }

    ///Iterate over all stored words in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &IndexedWord<P>> {
        self.nodes.iter()
    }

    /// Add a word to the index. Words that normalise to something already stored are ignored
    /// (the position of the first occurrence is kept).
    pub fn insert(&mut self, word: &str, position: P) -> Insertion {
        let word = normalize(word);
        if self.nodes.is_empty() {
            self.nodes.push(IndexedWord::new(word, position));
            return Insertion::Added(0);
        }

        let mut current: NodeId = 0;
        loop {
            let node = &self.nodes[current];
            let distance = self.metric.distance(&node.word, &word);
            if distance == 0 {
                trace!("ignoring duplicate {:?}", word);
                return Insertion::Duplicate(current);
            }
            match node.child(distance) {
                Some(child) => current = child,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(IndexedWord::new(word, position));
                    self.nodes[current].children.insert(distance, id);
                    return Insertion::Added(id);
                }
            }
        }
    }

    /// Find all stored words within `radius` of the query, excluding the query itself.
    /// Results come in traversal order (depth-first, pre-order), not sorted.
    pub fn search(&self, query: &str, radius: DistanceType) -> Vec<&IndexedWord<P>> {
        let query = normalize(query);
        let mut matches = Vec::new();
        if self.nodes.is_empty() {
            return matches;
        }

        //explicit stack rather than recursion, degenerate trees may be as deep as they are long
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            let distance = self.metric.distance(&node.word, &query);
            if distance != 0 && distance <= radius {
                matches.push(node);
            }

            let lower = distance.saturating_sub(radius);
            let upper = distance.saturating_add(radius);
            //push in reverse so lower distances are visited first
            for (_, child) in node.children.range(lower..=upper).rev() {
                stack.push(*child);
            }
        }
        matches
    }
}

/// Build an index by consuming a stream of literals with their positions, in order.
pub fn build_index<P, S, I>(candidates: I) -> BkTree<P>
where
    S: AsRef<str>,
    I: IntoIterator<Item = (S, P)>,
{
    build_index_with_metric(candidates, DamerauLevenshtein)
}

/// Like [`build_index`], with a custom distance metric
pub fn build_index_with_metric<P, M, S, I>(candidates: I, metric: M) -> BkTree<P, M>
where
    M: Metric,
    S: AsRef<str>,
    I: IntoIterator<Item = (S, P)>,
{
    let mut tree = BkTree::with_metric(metric);
    let mut duplicates = 0;
    for (word, position) in candidates {
        if let Insertion::Duplicate(_) = tree.insert(word.as_ref(), position) {
            duplicates += 1;
        }
    }
    debug!("built index of {} words ({} duplicates ignored)", tree.len(), duplicates);
    tree
}
