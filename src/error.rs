use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Cannot build a Huffman code from an empty frequency table")]
	EmptyTable,

	#[error("Run length {0} has no codeword in the codebook")]
	UnknownSymbol(u32),

	#[error("Incomplete codeword: {trailing_bits} undecodable bit(s) starting at payload bit {offset}")]
	IncompleteCodeword { offset: usize, trailing_bits: usize },

	#[error("Run-length expansion needs {expanded} bits but the declared size is {file_size}")]
	LengthMismatch { expanded: usize, file_size: usize },

	#[error("Ran out of input bits at position {position}")]
	OutOfData { position: usize },

	#[error("Maximum run length must be at least 2, got {0}")]
	InvalidMaxLength(u32),

	#[error("Run length {symbol} exceeds the maximum run length {max_length}")]
	SymbolOutOfRange { symbol: u32, max_length: u32 },

	#[error("Invalid weight {weight} for run length {symbol}")]
	InvalidWeight { symbol: u32, weight: f64 },

	#[error("Data integrity check failed: checksum mismatch")]
	ChecksumMismatch,

	#[error("Invalid format: {0}")]
	InvalidFormat(String),

	#[error("Configuration error: {0}")]
	ConfigError(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
