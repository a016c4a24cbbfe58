//! Ordered index of property nodes with overlap queries.
//!
//! Text pieces, CHPX, PAPX and SEPX runs are all kept as half-open
//! `[start, end)` intervals keyed by their start. Nodes are held sorted by
//! start; a prefix maximum of the end positions bounds how far left an
//! overlapping node can begin.

use serde::Serialize;

/// A half-open interval with a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyNode<T> {
    pub start: u32,
    pub end: u32,
    pub payload: T,
}

impl<T> PropertyNode<T> {
    pub fn new(start: u32, end: u32, payload: T) -> Self {
        Self { start, end, payload }
    }

    /// Whether the node overlaps `[start, end)`.
    #[inline]
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start < end && self.end > start
    }
}

impl<T: Clone> PropertyNode<T> {
    /// A copy clamped to `[start, end)`.
    pub fn clip(&self, start: u32, end: u32) -> PropertyNode<T> {
        PropertyNode {
            start: self.start.max(start),
            end: self.end.min(end),
            payload: self.payload.clone(),
        }
    }
}

/// Sorted interval index.
///
/// # Examples
///
/// ```
/// use wordbin::ole::doc::parts::range_index::{PropertyNode, RangeIndex};
///
/// let mut index = RangeIndex::new();
/// index.insert(PropertyNode::new(0, 10, 'a'));
/// index.insert(PropertyNode::new(10, 20, 'b'));
/// index.insert(PropertyNode::new(20, 30, 'c'));
///
/// let hits: Vec<char> = index.find(5, 21).iter().map(|n| n.payload).collect();
/// assert_eq!(hits, vec!['a', 'b', 'c']);
/// ```
#[derive(Debug, Clone)]
pub struct RangeIndex<T> {
    nodes: Vec<PropertyNode<T>>,
    /// `max_end[i]` is the largest end among `nodes[..=i]`
    max_end: Vec<u32>,
}

impl<T> Default for RangeIndex<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            max_end: Vec::new(),
        }
    }
}

impl<T> RangeIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Empty or reversed intervals and nodes whose start is
    /// already present are rejected; the first insert for a start wins.
    pub fn insert(&mut self, node: PropertyNode<T>) -> bool {
        if node.start >= node.end {
            log::debug!("rejected empty range [{}, {})", node.start, node.end);
            return false;
        }
        let index = match self.nodes.binary_search_by_key(&node.start, |n| n.start) {
            Ok(_) => {
                log::debug!("duplicate range start {}", node.start);
                return false;
            },
            Err(index) => index,
        };
        self.nodes.insert(index, node);
        self.rebuild_from(index);
        true
    }

    fn rebuild_from(&mut self, index: usize) {
        self.max_end.truncate(index);
        let mut running = self.max_end.last().copied().unwrap_or(0);
        for node in &self.nodes[index..] {
            running = running.max(node.end);
            self.max_end.push(running);
        }
    }

    /// All nodes overlapping `[start, end)`, in ascending start order.
    pub fn find(&self, start: u32, end: u32) -> Vec<&PropertyNode<T>> {
        // Nodes starting at or after `end` cannot overlap.
        let upper = self.nodes.partition_point(|n| n.start < end);
        // Before `lower` every end is <= start.
        let lower = self.max_end[..upper].partition_point(|&max| max <= start);
        self.nodes[lower..upper]
            .iter()
            .filter(|n| n.end > start)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyNode<T>> {
        self.nodes.iter()
    }
}

impl<T: Clone> RangeIndex<T> {
    /// Overlapping nodes clamped to `[start, end)`.
    pub fn find_clipped(&self, start: u32, end: u32) -> Vec<PropertyNode<T>> {
        self.find(start, end)
            .into_iter()
            .map(|node| node.clip(start, end))
            .collect()
    }
}

impl<T> FromIterator<PropertyNode<T>> for RangeIndex<T> {
    fn from_iter<I: IntoIterator<Item = PropertyNode<T>>>(iter: I) -> Self {
        let mut index = RangeIndex::new();
        for node in iter {
            index.insert(node);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_duplicates_and_empty() {
        let mut index = RangeIndex::new();
        assert!(index.insert(PropertyNode::new(0, 10, 1)));
        assert!(!index.insert(PropertyNode::new(0, 5, 2)));
        assert!(!index.insert(PropertyNode::new(7, 7, 3)));
        assert!(!index.insert(PropertyNode::new(9, 3, 4)));
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(0, 10)[0].payload, 1);
    }

    #[test]
    fn test_long_node_straddles_query() {
        let index: RangeIndex<u8> = [
            PropertyNode::new(0, 100, 0),
            PropertyNode::new(10, 20, 1),
            PropertyNode::new(30, 40, 2),
        ]
        .into_iter()
        .collect();
        let hits: Vec<u8> = index.find(50, 60).iter().map(|n| n.payload).collect();
        assert_eq!(hits, vec![0]);
        let hits: Vec<u8> = index.find(15, 35).iter().map(|n| n.payload).collect();
        assert_eq!(hits, vec![0, 1, 2]);
        // Touching intervals do not overlap.
        assert!(index.find(100, 200).is_empty());
    }

    #[test]
    fn test_clip() {
        let node = PropertyNode::new(10, 50, ());
        let clipped = node.clip(20, 30);
        assert_eq!((clipped.start, clipped.end), (20, 30));
        let index: RangeIndex<()> = std::iter::once(node).collect();
        let clipped = index.find_clipped(0, 15);
        assert_eq!((clipped[0].start, clipped[0].end), (10, 15));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// `find` returns exactly the overlapping nodes, in start order.
        #[test]
        fn prop_find_matches_scan(
            intervals in prop::collection::vec((0u32..200, 1u32..60), 0..40),
            query in (0u32..260, 0u32..80),
        ) {
            let mut index = RangeIndex::new();
            let mut accepted: Vec<(u32, u32)> = Vec::new();
            for (start, len) in intervals {
                let end = start + len;
                if index.insert(PropertyNode::new(start, end, ())) {
                    accepted.push((start, end));
                }
            }
            accepted.sort();

            let (start, len) = query;
            let end = start + len;
            let expected: Vec<(u32, u32)> = accepted
                .iter()
                .copied()
                .filter(|&(s, e)| s < end && e > start)
                .collect();
            let found: Vec<(u32, u32)> =
                index.find(start, end).iter().map(|n| (n.start, n.end)).collect();
            prop_assert_eq!(found, expected);
        }
    }
}
