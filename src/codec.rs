//! Run-length + Huffman codec
//!
//! `encode` turns a bit sequence into a concatenation of codewords, one per
//! run-length symbol. `decode` reverses it given the same codebook, the same
//! cap and the original bit count (the payload does not record where the
//! trailing zero run ends).

use crate::codebook::Codebook;
use crate::error::{CodecError, Result};
use crate::transforms::huffman::{self, FrequencyTable};
use crate::transforms::rle::{self, RunLength};
use log::debug;

/// Output of [`encode`]: the payload plus what is needed to decode it.
#[derive(Debug, Clone)]
pub struct EncodedStream {
    pub payload: Vec<bool>,
    pub codebook: Codebook,
    pub table: FrequencyTable,
    pub run_count: usize,
    pub file_size: usize,
}

/// Encode `bits`. Without a codebook one is built from the stream's own run counts.
pub fn encode(bits: &[bool], max_length: u32, codebook: Option<&Codebook>) -> Result<EncodedStream> {
    let runs = rle::extract_runs(bits, max_length)?;
    let table = FrequencyTable::from_runs(&runs);

    let codebook = match codebook {
        Some(book) => book.clone(),
        None => huffman::build(&table)?,
    };

    let payload = encode_runs(&runs, &codebook)?;
    debug!(
        "encoded {} bits as {} runs into {} payload bits",
        bits.len(),
        runs.len(),
        payload.len()
    );

    Ok(EncodedStream {
        payload,
        codebook,
        table,
        run_count: runs.len(),
        file_size: bits.len(),
    })
}

pub fn encode_runs(runs: &[RunLength], codebook: &Codebook) -> Result<Vec<bool>> {
    let mut payload = Vec::new();
    for &run in runs {
        let code = codebook.get(run).ok_or(CodecError::UnknownSymbol(run))?;
        payload.extend_from_slice(code.bits());
    }
    Ok(payload)
}

pub fn decode(payload: &[bool], codebook: &Codebook, max_length: u32, file_size: usize) -> Result<Vec<bool>> {
    let runs = decode_runs(payload, codebook)?;
    debug!("decoded {} payload bits into {} runs", payload.len(), runs.len());
    rle::reconstruct(&runs, max_length, file_size)
}

pub fn decode_runs(payload: &[bool], codebook: &Codebook) -> Result<Vec<RunLength>> {
    DecodeTree::new(codebook).decode(payload)
}

#[derive(Debug, Clone, Copy, Default)]
struct TrieNode {
    children: [Option<usize>; 2],
    symbol: Option<RunLength>,
}

/// Inverse of a codebook: a binary trie whose leaves hold the symbols.
#[derive(Debug, Clone)]
struct DecodeTree {
    nodes: Vec<TrieNode>,
}

impl DecodeTree {
    fn new(codebook: &Codebook) -> Self {
        let mut nodes = vec![TrieNode::default()];
        for (symbol, code) in codebook.iter() {
            let mut at = 0;
            for &bit in code.bits() {
                at = match nodes[at].children[bit as usize] {
                    Some(next) => next,
                    None => {
                        nodes.push(TrieNode::default());
                        let next = nodes.len() - 1;
                        nodes[at].children[bit as usize] = Some(next);
                        next
                    }
                };
            }
            nodes[at].symbol = Some(symbol);
        }
        Self { nodes }
    }

    fn decode(&self, payload: &[bool]) -> Result<Vec<RunLength>> {
        let mut runs = Vec::new();
        let mut at = 0;
        let mut codeword_start = 0;

        for (i, &bit) in payload.iter().enumerate() {
            at = match self.nodes[at].children[bit as usize] {
                Some(next) => next,
                None => {
                    return Err(CodecError::IncompleteCodeword {
                        offset: codeword_start,
                        trailing_bits: payload.len() - codeword_start,
                    })
                }
            };
            if let Some(symbol) = self.nodes[at].symbol {
                runs.push(symbol);
                at = 0;
                codeword_start = i + 1;
            }
        }

        if at != 0 {
            return Err(CodecError::IncompleteCodeword {
                offset: codeword_start,
                trailing_bits: payload.len() - codeword_start,
            });
        }
        Ok(runs)
    }
}

/// A codebook frozen together with its cap.
///
/// Immutable after construction, so one `Codec` can serve any number of
/// threads encoding or decoding independent streams.
#[derive(Debug, Clone)]
pub struct Codec {
    codebook: Codebook,
    max_length: u32,
    tree: DecodeTree,
}

impl Codec {
    pub fn new(codebook: Codebook, max_length: u32) -> Result<Self> {
        if max_length < 2 {
            return Err(CodecError::InvalidMaxLength(max_length));
        }
        let tree = DecodeTree::new(&codebook);
        Ok(Self { codebook, max_length, tree })
    }

    /// Build the codebook from a training stream.
    pub fn train(bits: &[bool], max_length: u32) -> Result<Self> {
        let runs = rle::extract_runs(bits, max_length)?;
        Self::new(huffman::build(&FrequencyTable::from_runs(&runs))?, max_length)
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    pub fn encode(&self, bits: &[bool]) -> Result<Vec<bool>> {
        let runs = rle::extract_runs(bits, self.max_length)?;
        encode_runs(&runs, &self.codebook)
    }

    pub fn decode(&self, payload: &[bool], file_size: usize) -> Result<Vec<bool>> {
        let runs = self.tree.decode(payload)?;
        rle::reconstruct(&runs, self.max_length, file_size)
    }
}
