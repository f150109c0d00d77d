use crate::core::{FrequencyTable, Sample};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Node of a strict binary prefix tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixNode {
    Leaf {
        symbol: Sample,
        frequency: usize,
    },
    Internal {
        frequency: usize,
        left: Box<PrefixNode>,
        right: Box<PrefixNode>,
    },
}

impl PrefixNode {
    pub fn frequency(&self) -> usize {
        match self {
            PrefixNode::Leaf { frequency, .. } | PrefixNode::Internal { frequency, .. } => {
                *frequency
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PrefixNode::Leaf { .. })
    }

    /// Number of leaves under this node
    pub fn leaf_count(&self) -> usize {
        match self {
            PrefixNode::Leaf { .. } => 1,
            PrefixNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Left is the lower-priority node popped first
    fn merge(left: PrefixNode, right: PrefixNode) -> PrefixNode {
        PrefixNode::Internal {
            frequency: left.frequency() + right.frequency(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Heap entry ordered by (frequency, insertion sequence), smallest first
struct Pending {
    frequency: usize,
    seq: u64,
    node: PrefixNode,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap
        other
            .frequency
            .cmp(&self.frequency)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Build the prefix tree for `table`, or `None` when it is empty
///
/// Leaves enter the queue in ascending symbol order and merged nodes after
/// them, so equal frequencies always resolve by insertion sequence.
pub fn build_tree(table: &FrequencyTable) -> Option<PrefixNode> {
    let mut heap = BinaryHeap::with_capacity(table.len());
    let mut seq = 0u64;

    for (symbol, frequency) in table.iter() {
        heap.push(Pending {
            frequency,
            seq,
            node: PrefixNode::Leaf { symbol, frequency },
        });
        seq += 1;
    }

    while heap.len() > 1 {
        let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
            break;
        };
        let node = PrefixNode::merge(left.node, right.node);
        heap.push(Pending {
            frequency: node.frequency(),
            seq,
            node,
        });
        seq += 1;
    }

    heap.pop().map(|p| p.node)
}
