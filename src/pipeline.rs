use crate::bits::{read_bit_lines, write_bit_lines};
use crate::codebook::Codebook;
use crate::codec;
use crate::config::{CodebookSource, CodecConfig};
use crate::container::{
	calculate_checksum, read_container, read_header, write_container, CompressedStream, ContainerFlags, MAX_FILE_SIZE,
};
use crate::error::CodecError;
use crate::transforms::{geometric_table, huffman, FrequencyTable};
use log::{info, warn};
use serde::Serialize;
use std::io::{BufReader, Read, Write};

#[derive(Debug, Clone, Serialize)]
pub struct CompressionStats {
	pub original_bits: u64,
	pub runs: u64,
	pub payload_bits: u64,
	pub compressed_size: u64,
	/// Source bits per payload bit.
	pub ratio: f64,
	/// Empirical entropy of the run lengths, bits per run.
	pub entropy: f64,
	/// Achieved codeword length, bits per run.
	pub mean_codeword_length: f64,
	pub embedded_codebook: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
	pub original_bits: u64,
	pub max_length: u32,
	pub checksum: String,
	pub embedded_codebook: bool,
}

/// Codebook for compressing `bits` when the caller did not supply one.
pub fn codebook_for(bits: &[bool], config: &CodecConfig) -> Result<Codebook, CodecError> {
	let table = match config.source {
		CodebookSource::Empirical => {
			let runs = crate::transforms::extract_runs(bits, config.max_run_length)?;
			FrequencyTable::from_runs(&runs).with_support(config.max_run_length)
		}
		CodebookSource::Geometric => geometric_table(config.max_run_length, config.prob_one)?,
	};
	huffman::build(&table)
}

/// Compress a one-bit-per-line text stream into a container.
pub fn compress<R: Read, W: Write>(
	reader: &mut R,
	writer: &mut W,
	config: &CodecConfig,
	codebook: Option<&Codebook>,
) -> Result<CompressionStats, CodecError> {
	let bits = read_bit_lines(BufReader::new(reader))?;
	compress_bits(&bits, writer, config, codebook)
}

pub fn compress_bits<W: Write>(
	bits: &[bool],
	writer: &mut W,
	config: &CodecConfig,
	codebook: Option<&Codebook>,
) -> Result<CompressionStats, CodecError> {
	config.validate()?;
	if bits.len() as u64 > MAX_FILE_SIZE {
		return Err(CodecError::ConfigError(format!(
			"input of {} bits exceeds the {} bit container limit",
			bits.len(),
			MAX_FILE_SIZE
		)));
	}

	let built;
	let (codebook, embed) = match codebook {
		Some(book) => (book, config.embed_codebook),
		None => {
			built = codebook_for(bits, config)?;
			(&built, true)
		}
	};

	let encoded = codec::encode(bits, config.max_run_length, Some(codebook))?;
	let checksum = calculate_checksum(bits, config.checksum);
	let stream = CompressedStream::new(
		&encoded.payload,
		bits.len(),
		config.max_run_length,
		embed.then(|| encoded.codebook.clone()),
		config.checksum,
		checksum,
	);
	let compressed_size = write_container(writer, &stream)?;

	let payload_bits = encoded.payload.len() as u64;
	let ratio = if payload_bits > 0 { bits.len() as f64 / payload_bits as f64 } else { 0.0 };
	info!(
		"compressed {} bits into {} payload bits ({} container bytes)",
		bits.len(),
		payload_bits,
		compressed_size
	);

	Ok(CompressionStats {
		original_bits: bits.len() as u64,
		runs: encoded.run_count as u64,
		payload_bits,
		compressed_size,
		ratio,
		entropy: encoded.table.entropy(),
		mean_codeword_length: encoded.codebook.expected_length(&encoded.table),
		embedded_codebook: embed,
	})
}

/// Decompress a container back into one-bit-per-line text.
///
/// The embedded codebook wins over `codebook` when both exist.
pub fn decompress<R: Read, W: Write>(
	reader: &mut R,
	writer: &mut W,
	codebook: Option<&Codebook>,
) -> Result<(), CodecError> {
	let bits = decompress_bits(reader, codebook)?;
	write_bit_lines(writer, &bits)
}

pub fn decompress_bits<R: Read>(reader: &mut R, codebook: Option<&Codebook>) -> Result<Vec<bool>, CodecError> {
	let stream = read_container(reader)?;
	let codebook = match (&stream.codebook, codebook) {
		(Some(embedded), supplied) => {
			if supplied.is_some() { warn!("ignoring supplied codebook, the stream carries its own"); }
			embedded
		}
		(None, Some(supplied)) => supplied,
		(None, None) => {
			return Err(CodecError::ConfigError(
				"stream has no embedded codebook and none was supplied".to_string(),
			))
		}
	};

	let payload = stream.payload_bits()?;
	let bits = codec::decode(&payload, codebook, stream.header.max_length, stream.header.file_size as usize)?;
	stream.verify(&bits)?;
	info!("decompressed {} payload bits into {} bits", payload.len(), bits.len());
	Ok(bits)
}

pub fn info<R: Read>(reader: &mut R) -> Result<FileInfo, CodecError> {
	let header = read_header(reader)?;
	Ok(FileInfo {
		original_bits: header.file_size,
		max_length: header.max_length,
		checksum: format!("{:?}", header.checksum_type),
		embedded_codebook: header.flags.contains(ContainerFlags::EMBEDDED_CODEBOOK),
	})
}
