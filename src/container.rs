use crate::bits::{pack_bits, unpack_bits};
use crate::codebook::Codebook;
use crate::config::{ChecksumType, MAX_RUN_LENGTH_LIMIT};
use crate::error::CodecError;
use byteorder::{ReadBytesExt, WriteBytesExt, LittleEndian};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};

const MAGIC_NUMBER: &[u8; 4] = b"SHZ1";
const VERSION: u8 = 1;

/// Largest original stream, in bits, a container may describe.
pub const MAX_FILE_SIZE: u64 = u32::MAX as u64;

bitflags::bitflags! {
	#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
	pub struct ContainerFlags: u8 {
		const EMBEDDED_CODEBOOK = 0b00000001;
	}
}

/// Checksum of the original bit sequence, packed MSB first.
pub fn calculate_checksum(bits: &[bool], checksum: ChecksumType) -> u64 {
	let packed = pack_bits(bits);
	match checksum {
		ChecksumType::Crc32 => crc32fast::hash(&packed) as u64,
		ChecksumType::Sha256 => {
			let digest = Sha256::digest(&packed);
			let mut head = [0u8; 8];
			head.copy_from_slice(&digest[..8]);
			u64::from_le_bytes(head)
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerHeader {
	pub flags: ContainerFlags,
	pub checksum_type: ChecksumType,
	pub file_size: u64,
	pub max_length: u32,
}

/// A compressed stream as stored on disk.
#[derive(Debug, Clone)]
pub struct CompressedStream {
	pub header: ContainerHeader,
	pub codebook: Option<Codebook>,
	pub payload_bits: u64,
	pub payload: Vec<u8>,
	pub original_checksum: u64,
}

impl CompressedStream {
	pub fn new(
		payload: &[bool],
		file_size: usize,
		max_length: u32,
		codebook: Option<Codebook>,
		checksum_type: ChecksumType,
		original_checksum: u64,
	) -> Self {
		let mut flags = ContainerFlags::empty();
		if codebook.is_some() { flags |= ContainerFlags::EMBEDDED_CODEBOOK; }
		Self {
			header: ContainerHeader { flags, checksum_type, file_size: file_size as u64, max_length },
			codebook,
			payload_bits: payload.len() as u64,
			payload: pack_bits(payload),
			original_checksum,
		}
	}

	pub fn payload_bits(&self) -> Result<Vec<bool>, CodecError> {
		unpack_bits(&self.payload, self.payload_bits as usize)
	}

	pub fn verify(&self, bits: &[bool]) -> Result<(), CodecError> {
		if bits.len() as u64 != self.header.file_size {
			return Err(CodecError::LengthMismatch { expanded: bits.len(), file_size: self.header.file_size as usize });
		}
		if calculate_checksum(bits, self.header.checksum_type) != self.original_checksum { return Err(CodecError::ChecksumMismatch); }
		Ok(())
	}
}

pub fn write_container<W: Write>(writer: &mut W, stream: &CompressedStream) -> Result<u64, CodecError> {
	let mut total_bytes_written = 0;

	writer.write_all(MAGIC_NUMBER)?;
	writer.write_u8(VERSION)?;
	writer.write_u8(stream.header.flags.bits())?;
	writer.write_u8(stream.header.checksum_type.id())?;
	writer.write_u64::<LittleEndian>(stream.header.file_size)?;
	writer.write_u32::<LittleEndian>(stream.header.max_length)?;
	total_bytes_written += 4 + 1 + 1 + 1 + 8 + 4;

	if let Some(codebook) = &stream.codebook {
		let mut block = Vec::new();
		codebook.write_to(&mut block, stream.header.max_length)?;
		writer.write_u32::<LittleEndian>(block.len() as u32)?;
		writer.write_all(&block)?;
		total_bytes_written += 4 + block.len() as u64;
	}

	writer.write_u64::<LittleEndian>(stream.payload_bits)?;
	writer.write_u32::<LittleEndian>(stream.payload.len() as u32)?;
	writer.write_all(&stream.payload)?;
	writer.write_u64::<LittleEndian>(stream.original_checksum)?;
	total_bytes_written += 8 + 4 + stream.payload.len() as u64 + 8;

	Ok(total_bytes_written)
}

pub fn read_header<R: Read>(reader: &mut R) -> Result<ContainerHeader, CodecError> {
	let mut magic = [0u8; 4];
	reader.read_exact(&mut magic)?;
	if magic != *MAGIC_NUMBER { return Err(CodecError::InvalidFormat("Invalid magic number".to_string())); }

	let version = reader.read_u8()?;
	if version != VERSION { return Err(CodecError::InvalidFormat(format!("Unsupported version: {}", version))); }

	let flags_byte = reader.read_u8()?;
	let flags = ContainerFlags::from_bits(flags_byte)
		.ok_or_else(|| CodecError::InvalidFormat(format!("Unknown flags: {:#04x}", flags_byte)))?;
	let checksum_id = reader.read_u8()?;
	let checksum_type = ChecksumType::from_id(checksum_id)
		.ok_or_else(|| CodecError::InvalidFormat("Unknown checksum type".to_string()))?;
	let file_size = reader.read_u64::<LittleEndian>()?;
	let max_length = reader.read_u32::<LittleEndian>()?;
	if file_size > MAX_FILE_SIZE {
		return Err(CodecError::InvalidFormat(format!("Implausible original size: {} bits", file_size)));
	}
	if !(2..=MAX_RUN_LENGTH_LIMIT).contains(&max_length) {
		return Err(CodecError::InvalidFormat(format!("Invalid max run length: {}", max_length)));
	}

	Ok(ContainerHeader { flags, checksum_type, file_size, max_length })
}

pub fn read_container<R: Read>(reader: &mut R) -> Result<CompressedStream, CodecError> {
	let header = read_header(reader)?;

	let codebook = if header.flags.contains(ContainerFlags::EMBEDDED_CODEBOOK) {
		let block_len = reader.read_u32::<LittleEndian>()?;
		let mut block = vec![0; block_len as usize];
		reader.read_exact(&mut block)?;
		let (codebook, book_max_length) = Codebook::read_from(&mut Cursor::new(block))?;
		if book_max_length != header.max_length {
			return Err(CodecError::InvalidFormat(format!(
				"Embedded codebook built for max run length {}, stream uses {}",
				book_max_length, header.max_length
			)));
		}
		Some(codebook)
	} else {
		None
	};

	let payload_bits = reader.read_u64::<LittleEndian>()?;
	let payload_len = reader.read_u32::<LittleEndian>()?;
	if payload_bits > payload_len as u64 * 8 {
		return Err(CodecError::InvalidFormat(format!(
			"Payload claims {} bits but holds only {} bytes",
			payload_bits, payload_len
		)));
	}
	let mut payload = vec![0; payload_len as usize];
	reader.read_exact(&mut payload)?;
	let original_checksum = reader.read_u64::<LittleEndian>()?;

	Ok(CompressedStream { header, codebook, payload_bits, payload, original_checksum })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bits::parse_bit_string;
	use crate::codec;

	fn sample(checksum: ChecksumType, embed: bool) -> (Vec<bool>, CompressedStream) {
		let bits = parse_bit_string("000100000010000000001").unwrap();
		let encoded = codec::encode(&bits, 8, None).unwrap();
		let checksum_value = calculate_checksum(&bits, checksum);
		let book = if embed { Some(encoded.codebook) } else { None };
		let stream = CompressedStream::new(&encoded.payload, bits.len(), 8, book, checksum, checksum_value);
		(bits, stream)
	}

	#[test]
	fn test_write_read_container() {
		let (bits, stream) = sample(ChecksumType::Crc32, true);
		let mut bytes = Vec::new();
		let written = write_container(&mut bytes, &stream).unwrap();
		assert_eq!(written, bytes.len() as u64);

		let restored = read_container(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(restored.header, stream.header);
		assert_eq!(restored.codebook, stream.codebook);
		assert_eq!(restored.payload_bits().unwrap(), stream.payload_bits().unwrap());

		let book = restored.codebook.as_ref().unwrap();
		let decoded = codec::decode(&restored.payload_bits().unwrap(), book, 8, bits.len()).unwrap();
		restored.verify(&decoded).unwrap();
	}

	#[test]
	fn test_without_codebook() {
		let (_, stream) = sample(ChecksumType::Sha256, false);
		let mut bytes = Vec::new();
		write_container(&mut bytes, &stream).unwrap();
		let restored = read_container(&mut Cursor::new(bytes)).unwrap();
		assert!(restored.codebook.is_none());
		assert!(!restored.header.flags.contains(ContainerFlags::EMBEDDED_CODEBOOK));
		assert_eq!(restored.header.checksum_type, ChecksumType::Sha256);
	}

	#[test]
	fn test_checksum_mismatch() {
		let (mut bits, stream) = sample(ChecksumType::Crc32, false);
		bits[0] = !bits[0];
		assert!(matches!(stream.verify(&bits), Err(CodecError::ChecksumMismatch)));
	}

	#[test]
	fn test_bad_magic() {
		let (_, stream) = sample(ChecksumType::Crc32, false);
		let mut bytes = Vec::new();
		write_container(&mut bytes, &stream).unwrap();
		bytes[0] = b'Z';
		assert!(matches!(read_container(&mut Cursor::new(bytes)), Err(CodecError::InvalidFormat(_))));
	}

	#[test]
	fn test_implausible_header_fields() {
		let (_, stream) = sample(ChecksumType::Crc32, false);
		let mut bytes = Vec::new();
		write_container(&mut bytes, &stream).unwrap();

		let mut huge_size = bytes.clone();
		huge_size[7..15].copy_from_slice(&(MAX_FILE_SIZE + 1).to_le_bytes());
		assert!(matches!(read_header(&mut Cursor::new(huge_size)), Err(CodecError::InvalidFormat(_))));

		let mut huge_cap = bytes;
		huge_cap[15..19].copy_from_slice(&u32::MAX.to_le_bytes());
		assert!(matches!(read_container(&mut Cursor::new(huge_cap)), Err(CodecError::InvalidFormat(_))));
	}

	#[test]
	fn test_checksums_differ_by_type() {
		let bits = parse_bit_string("0010").unwrap();
		assert_ne!(
			calculate_checksum(&bits, ChecksumType::Crc32),
			calculate_checksum(&bits, ChecksumType::Sha256)
		);
	}
}
