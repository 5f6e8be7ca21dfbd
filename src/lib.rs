//! # sparsehuff
//!
//! Lossless compression for sparse binary streams: long runs of zeros with the
//! occasional one, as produced by a noisy channel with a small bit-flip
//! probability.
//!
//! Compression happens in two stages:
//!
//! - **Run-length extraction**: every run of zeros ended by a one becomes a
//!   symbol `r` (the number of zeros). Runs are capped at a maximum length;
//!   the symbol equal to the cap stands for a full run of zeros with no one.
//! - **Huffman coding**: run-length symbols are replaced by prefix-free
//!   codewords built from either the measured symbol counts or the geometric
//!   model of a memoryless channel.
//!
//! ## Quick Start
//!
//! ```rust
//! use sparsehuff::{codec, bits::parse_bit_string};
//!
//! let input = parse_bit_string("0001001").unwrap();
//! let encoded = codec::encode(&input, 69, None).unwrap();
//! assert_eq!(encoded.payload.len(), 2);
//!
//! let decoded = codec::decode(&encoded.payload, &encoded.codebook, 69, input.len()).unwrap();
//! assert_eq!(decoded, input);
//! ```
//!
//! ### Reusing a codebook
//!
//! ```rust
//! use sparsehuff::{Codec, transforms::{geometric_table, build_codebook}};
//!
//! let table = geometric_table(69, 0.01).unwrap();
//! let codec = Codec::new(build_codebook(&table).unwrap(), 69).unwrap();
//!
//! let mut input = vec![false; 500];
//! input[120] = true;
//! input[371] = true;
//! let payload = codec.encode(&input).unwrap();
//! assert_eq!(codec.decode(&payload, input.len()).unwrap(), input);
//! ```
//!
//! ### Container round trip
//!
//! ```rust
//! use sparsehuff::{compress_bits, decompress_bits, CodecConfig};
//!
//! let mut input = vec![false; 1000];
//! input[10] = true;
//! let compressed = compress_bits(&input, &CodecConfig::default()).unwrap();
//! assert_eq!(decompress_bits(&compressed).unwrap(), input);
//! ```

pub mod bits;
pub mod cli;
pub mod codebook;
pub mod codec;
pub mod config;
pub mod container;
pub mod error;
pub mod pipeline;
pub mod transforms;

// Re-export commonly used types for convenience
pub use codebook::{Codebook, Codeword};
pub use codec::{Codec, EncodedStream};
pub use config::{ChecksumType, CodebookSource, CodecConfig};
pub use error::{CodecError, Result};
pub use pipeline::{CompressionStats, FileInfo};
pub use transforms::{FrequencyTable, RunLength};

use std::io::Cursor;

/// Compress a bit sequence in memory into the container format.
///
/// The codebook is built according to `config.source` and embedded in the output.
pub fn compress_bits(bits: &[bool], config: &CodecConfig) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    pipeline::compress_bits(bits, &mut output, config, None)?;
    Ok(output)
}

/// Decompress a container that carries its own codebook.
pub fn decompress_bits(compressed: &[u8]) -> Result<Vec<bool>> {
    pipeline::decompress_bits(&mut Cursor::new(compressed), None)
}

/// Read the container header without decoding the payload.
pub fn get_file_info(compressed: &[u8]) -> Result<FileInfo> {
    pipeline::info(&mut Cursor::new(compressed))
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get library version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: VERSION,
        authors: AUTHORS,
        description: DESCRIPTION,
    }
}

#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub version: &'static str,
    pub authors: &'static str,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress_bits() {
        let mut original = vec![false; 300];
        for i in [3, 40, 41, 200, 299] {
            original[i] = true;
        }
        let config = CodecConfig::default();

        let compressed = compress_bits(&original, &config).unwrap();
        assert!(!compressed.is_empty());

        let decompressed = decompress_bits(&compressed).unwrap();
        assert_eq!(original, decompressed);
    }

    #[test]
    fn test_empty_data() {
        let config = CodecConfig::default();
        let compressed = compress_bits(&[], &config).unwrap();
        assert!(decompress_bits(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_geometric_source() {
        let mut original = vec![false; 5000];
        original[4321] = true;
        let config = CodecConfig::default().with_source(CodebookSource::Geometric);
        let compressed = compress_bits(&original, &config).unwrap();
        assert_eq!(decompress_bits(&compressed).unwrap(), original);
    }

    #[test]
    fn test_file_info() {
        let config = CodecConfig::default().with_max_run_length(12);
        let compressed = compress_bits(&[false, true, false], &config).unwrap();
        let info = get_file_info(&compressed).unwrap();
        assert_eq!(info.original_bits, 3);
        assert_eq!(info.max_length, 12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CodecConfig::default().with_max_run_length(1);
        assert!(matches!(compress_bits(&[true], &config), Err(CodecError::InvalidMaxLength(1))));
    }

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }
}
