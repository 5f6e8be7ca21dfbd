//! Bit sequence framing
//!
//! The codec works on `&[bool]` (`true` is a one bit). These helpers turn the
//! two external representations into that form and back: text with one `0`
//! or `1` per line, and MSB-first packed bytes with an explicit bit count.

use crate::error::{CodecError, Result};
use std::io::{BufRead, Write};

/// Read a "one bit per line" text stream. Blank lines are skipped.
pub fn read_bit_lines<R: BufRead>(reader: R) -> Result<Vec<bool>> {
    let mut bits = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match line.trim() {
            "" => continue,
            "0" => bits.push(false),
            "1" => bits.push(true),
            other => {
                return Err(CodecError::InvalidFormat(format!(
                    "line {}: expected '0' or '1', found {:?}",
                    index + 1,
                    other
                )))
            }
        }
    }
    Ok(bits)
}

pub fn write_bit_lines<W: Write>(writer: &mut W, bits: &[bool]) -> Result<()> {
    for &bit in bits {
        writer.write_all(if bit { b"1\n" } else { b"0\n" })?;
    }
    Ok(())
}

/// Parse a compact bit string such as `"0010"`.
pub fn parse_bit_string(s: &str) -> Result<Vec<bool>> {
    s.chars()
        .enumerate()
        .map(|(i, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(CodecError::InvalidFormat(format!(
                "character {}: expected '0' or '1', found {:?}",
                i, c
            ))),
        })
        .collect()
}

pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Pack bits MSB first. The final byte is zero-padded.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; (bits.len() + 7) / 8];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (7 - i % 8);
        }
    }
    bytes
}

/// Unpack the first `bit_count` bits of an MSB-first buffer.
pub fn unpack_bits(bytes: &[u8], bit_count: usize) -> Result<Vec<bool>> {
    if bit_count > bytes.len() * 8 {
        return Err(CodecError::OutOfData { position: bytes.len() * 8 });
    }
    Ok((0..bit_count)
        .map(|i| bytes[i / 8] & (1 << (7 - i % 8)) != 0)
        .collect())
}
