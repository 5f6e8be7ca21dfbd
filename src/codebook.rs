//! Codewords, codebooks and their on-disk form
//!
//! A [`Codebook`] maps every run-length symbol it knows to a prefix-free
//! [`Codeword`]. The only ways to obtain one are [`crate::transforms::huffman::build`]
//! and [`Codebook::read_from`], which validates what it reads, so every
//! `Codebook` value is prefix-free and has no empty codewords.
//!
//! File layout (little endian):
//!
//! ```text
//! "SHCB" | version u8 | max_length u32 | count u32 | count x (symbol u32 | bit_len u16 | packed bits)
//! ```

use crate::bits::{format_bits, pack_bits, parse_bit_string, unpack_bits};
use crate::error::{CodecError, Result};
use crate::transforms::huffman::FrequencyTable;
use crate::transforms::rle::RunLength;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

const MAGIC_NUMBER: &[u8; 4] = b"SHCB";
const VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Codeword {
    bits: Vec<bool>,
}

impl Codeword {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_bits(&self.bits))
    }
}

impl FromStr for Codeword {
    type Err = CodecError;
    fn from_str(s: &str) -> Result<Self> {
        parse_bit_string(s).map(Codeword::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    entries: BTreeMap<RunLength, Codeword>,
}

impl Codebook {
    /// Validate and wrap a symbol to codeword mapping.
    pub fn from_entries(entries: BTreeMap<RunLength, Codeword>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CodecError::InvalidFormat("codebook has no entries".to_string()));
        }
        if let Some((symbol, _)) = entries.iter().find(|(_, code)| code.is_empty()) {
            return Err(CodecError::InvalidFormat(format!(
                "run length {} has an empty codeword",
                symbol
            )));
        }

        // Sorted lexicographically, a prefix always sits directly before some word it prefixes.
        let mut codes: Vec<&Codeword> = entries.values().collect();
        codes.sort_by(|a, b| a.bits.cmp(&b.bits));
        if let Some(pair) = codes.windows(2).find(|w| w[0].is_prefix_of(w[1])) {
            return Err(CodecError::InvalidFormat(format!(
                "codeword {} is a prefix of {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self { entries })
    }

    /// Wrap entries produced by Huffman construction, which are prefix-free by construction.
    pub(crate) fn from_tree_entries(entries: BTreeMap<RunLength, Codeword>) -> Self {
        debug_assert!(Self::from_entries(entries.clone()).is_ok());
        Self { entries }
    }

    pub fn get(&self, symbol: RunLength) -> Option<&Codeword> {
        self.entries.get(&symbol)
    }

    pub fn contains(&self, symbol: RunLength) -> bool {
        self.entries.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (RunLength, &Codeword)> {
        self.entries.iter().map(|(&s, c)| (s, c))
    }

    pub fn max_symbol(&self) -> Option<RunLength> {
        self.entries.keys().next_back().copied()
    }

    pub fn max_codeword_len(&self) -> usize {
        self.entries.values().map(Codeword::len).max().unwrap_or(0)
    }

    /// Average codeword length in bits under the weights of `table`.
    /// Symbols missing from the codebook are ignored.
    pub fn expected_length(&self, table: &FrequencyTable) -> f64 {
        let total = table.total();
        if total <= 0.0 {
            return 0.0;
        }
        table
            .iter()
            .filter_map(|(symbol, weight)| self.get(symbol).map(|code| weight * code.len() as f64))
            .sum::<f64>()
            / total
    }

    pub fn write_to<W: Write>(&self, writer: &mut W, max_length: u32) -> Result<()> {
        writer.write_all(MAGIC_NUMBER)?;
        writer.write_u8(VERSION)?;
        writer.write_u32::<LittleEndian>(max_length)?;
        writer.write_u32::<LittleEndian>(self.entries.len() as u32)?;
        for (&symbol, code) in &self.entries {
            writer.write_u32::<LittleEndian>(symbol)?;
            writer.write_u16::<LittleEndian>(code.len() as u16)?;
            writer.write_all(&pack_bits(code.bits()))?;
        }
        Ok(())
    }

    /// Read a codebook and the maximum run length it was built for.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<(Self, u32)> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != *MAGIC_NUMBER {
            return Err(CodecError::InvalidFormat("Invalid codebook magic number".to_string()));
        }

        let version = reader.read_u8()?;
        if version != VERSION {
            return Err(CodecError::InvalidFormat(format!("Unsupported codebook version: {}", version)));
        }

        let max_length = reader.read_u32::<LittleEndian>()?;
        let count = reader.read_u32::<LittleEndian>()?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let symbol = reader.read_u32::<LittleEndian>()?;
            let bit_len = reader.read_u16::<LittleEndian>()? as usize;
            let mut packed = vec![0u8; (bit_len + 7) / 8];
            reader.read_exact(&mut packed)?;
            let code = Codeword::new(unpack_bits(&packed, bit_len)?);
            if entries.insert(symbol, code).is_some() {
                return Err(CodecError::InvalidFormat(format!("duplicate run length {} in codebook", symbol)));
            }
        }

        Ok((Self::from_entries(entries)?, max_length))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, max_length: u32) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, max_length)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Self, u32)> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn codebook(pairs: &[(RunLength, &str)]) -> Result<Codebook> {
        let entries = pairs
            .iter()
            .map(|&(s, c)| (s, c.parse::<Codeword>().unwrap()))
            .collect();
        Codebook::from_entries(entries)
    }

    #[test]
    fn test_prefix_free_accepted() {
        let book = codebook(&[(1, "0"), (2, "10"), (3, "11")]).unwrap();
        assert_eq!(book.len(), 3);
        assert_eq!(book.get(2).unwrap().to_string(), "10");
        assert_eq!(book.max_symbol(), Some(3));
        assert_eq!(book.max_codeword_len(), 2);
    }

    #[test]
    fn test_prefix_violation_rejected() {
        assert!(matches!(
            codebook(&[(1, "0"), (2, "01"), (3, "1")]),
            Err(CodecError::InvalidFormat(_))
        ));
        // Non-adjacent in symbol order, adjacent once sorted by bits.
        assert!(codebook(&[(1, "10"), (2, "0"), (3, "101")]).is_err());
        assert!(codebook(&[(1, "0"), (2, "0")]).is_err());
    }

    #[test]
    fn test_empty_codeword_rejected() {
        assert!(codebook(&[(4, "")]).is_err());
        assert!(codebook(&[]).is_err());
    }

    #[test]
    fn test_expected_length() {
        let book = codebook(&[(1, "0"), (2, "10"), (3, "11")]).unwrap();
        let table = FrequencyTable::from_runs(&[1, 1, 2, 3]);
        assert!((book.expected_length(&table) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_write_read() {
        let book = codebook(&[(0, "0"), (7, "10"), (69, "110"), (300, "1110000001"), (5, "1111")]).unwrap();
        let mut bytes = Vec::new();
        book.write_to(&mut bytes, 300).unwrap();

        let (restored, max_length) = Codebook::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(max_length, 300);
        assert_eq!(restored, book);
    }

    #[test]
    fn test_read_rejects_bad_magic() {
        let mut bytes = Vec::new();
        codebook(&[(0, "0")]).unwrap().write_to(&mut bytes, 5).unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            Codebook::read_from(&mut Cursor::new(bytes)),
            Err(CodecError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_read_rejects_truncation() {
        let mut bytes = Vec::new();
        codebook(&[(0, "0"), (1, "1")]).unwrap().write_to(&mut bytes, 5).unwrap();
        bytes.pop();
        assert!(matches!(Codebook::read_from(&mut Cursor::new(bytes)), Err(CodecError::Io(_))));
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.shcb");
        let book = codebook(&[(2, "0"), (3, "1")]).unwrap();
        book.save(&path, 69).unwrap();
        assert_eq!(Codebook::load(&path).unwrap(), (book, 69));
    }
}
