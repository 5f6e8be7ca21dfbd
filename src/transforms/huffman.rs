//! Huffman code construction over run-length symbols
//!
//! The alphabet is small (at most `max_length + 1` symbols), so the tree is
//! built with a binary heap and thrown away once codewords are assigned.
//! Construction is fully deterministic: equal weights are ordered by
//! insertion sequence, leaves first in ascending symbol order, then merged
//! nodes in the order they were created.

use crate::codebook::{Codebook, Codeword};
use crate::error::{CodecError, Result};
use crate::transforms::rle::RunLength;
use log::debug;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// Non-negative weight (count or probability) per run-length symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    weights: BTreeMap<RunLength, f64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count symbol occurrences.
    pub fn from_runs(runs: &[RunLength]) -> Self {
        let mut weights = BTreeMap::new();
        for &run in runs {
            *weights.entry(run).or_insert(0.0) += 1.0;
        }
        Self { weights }
    }

    pub fn from_weights<I>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (RunLength, f64)>,
    {
        let mut table = Self::new();
        for (symbol, weight) in weights {
            table.insert(symbol, weight)?;
        }
        Ok(table)
    }

    /// Set the weight of `symbol`, replacing any previous value.
    pub fn insert(&mut self, symbol: RunLength, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(CodecError::InvalidWeight { symbol, weight });
        }
        self.weights.insert(symbol, weight);
        Ok(())
    }

    /// Give every symbol in `0..=max_length` a leaf, with zero weight where absent,
    /// so a codebook built from this table can encode any stream with that cap.
    pub fn with_support(mut self, max_length: u32) -> Self {
        for symbol in 0..=max_length {
            self.weights.entry(symbol).or_insert(0.0);
        }
        self
    }

    pub fn get(&self, symbol: RunLength) -> Option<f64> {
        self.weights.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RunLength, f64)> + '_ {
        self.weights.iter().map(|(&s, &w)| (s, w))
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Shannon entropy in bits per symbol, the lower bound on expected codeword length.
    pub fn entropy(&self) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        self.weights
            .values()
            .filter(|&&w| w > 0.0)
            .map(|&w| {
                let p = w / total;
                -p * p.log2()
            })
            .sum()
    }
}

#[derive(Debug)]
enum HuffNode {
    Leaf(RunLength),
    Internal { zero: Box<HuffNode>, one: Box<HuffNode> },
}

impl HuffNode {
    fn assign_codewords(&self, prefix: &mut Vec<bool>, out: &mut BTreeMap<RunLength, Codeword>) {
        match self {
            HuffNode::Leaf(symbol) => {
                out.insert(*symbol, Codeword::new(prefix.clone()));
            }
            HuffNode::Internal { zero, one } => {
                prefix.push(false);
                zero.assign_codewords(prefix, out);
                prefix.pop();
                prefix.push(true);
                one.assign_codewords(prefix, out);
                prefix.pop();
            }
        }
    }
}

/// Heap entry. `BinaryHeap` is a max-heap, so the ordering is reversed to pop the
/// lightest subtree first, and the earliest inserted one among equal weights.
#[derive(Debug)]
struct QueueEntry {
    weight: f64,
    seq: usize,
    node: HuffNode,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// Build a Huffman codebook for `table`.
///
/// The first subtree popped in each merge becomes the `0` branch, the second the
/// `1` branch. A table with a single symbol gets the one-bit codeword `0`, so every
/// encoded run costs at least one bit and the decoder can count runs.
pub fn build(table: &FrequencyTable) -> Result<Codebook> {
    if table.is_empty() {
        return Err(CodecError::EmptyTable);
    }

    let mut heap: BinaryHeap<QueueEntry> = table
        .iter()
        .enumerate()
        .map(|(seq, (symbol, weight))| QueueEntry { weight, seq, node: HuffNode::Leaf(symbol) })
        .collect();
    let mut next_seq = heap.len();

    while heap.len() > 1 {
        let (Some(e1), Some(e2)) = (heap.pop(), heap.pop()) else {
            break;
        };
        heap.push(QueueEntry {
            weight: e1.weight + e2.weight,
            seq: next_seq,
            node: HuffNode::Internal { zero: Box::new(e1.node), one: Box::new(e2.node) },
        });
        next_seq += 1;
    }

    let root = heap.pop().ok_or(CodecError::EmptyTable)?;
    let mut entries = BTreeMap::new();
    match root.node {
        HuffNode::Leaf(symbol) => {
            entries.insert(symbol, Codeword::new(vec![false]));
        }
        node => node.assign_codewords(&mut Vec::new(), &mut entries),
    }

    let codebook = Codebook::from_tree_entries(entries);
    debug!(
        "built codebook: {} symbols, longest codeword {} bits, expected {:.4} bits/symbol",
        codebook.len(),
        codebook.max_codeword_len(),
        codebook.expected_length(table)
    );
    Ok(codebook)
}
