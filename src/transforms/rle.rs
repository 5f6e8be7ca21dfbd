//! Zero-run extraction for sparse bit streams
//! Each symbol r < max_length stands for r zeros and a terminating one.
//! The saturated symbol r == max_length stands for max_length zeros and no terminator.
//! A trailing partial run is never emitted: the decoder restores it by padding to the known size.

use crate::error::{CodecError, Result};

/// A run-length symbol, 0..=max_length.
pub type RunLength = u32;

pub fn extract_runs(bits: &[bool], max_length: u32) -> Result<Vec<RunLength>> {
    if max_length < 2 {
        return Err(CodecError::InvalidMaxLength(max_length));
    }

    // Below this count a zero just extends the run; at it, the next bit decides the symbol.
    let lookahead_at = max_length - 2;
    let mut runs = Vec::new();
    let mut counter: u32 = 0;
    let mut i = 0;

    while i < bits.len() {
        if bits[i] {
            runs.push(counter);
            counter = 0;
        } else if counter < lookahead_at {
            counter += 1;
        } else {
            i += 1;
            match bits.get(i) {
                Some(false) => runs.push(counter + 2),
                Some(true) => runs.push(counter + 1),
                // The pending zeros end the stream, so they form the trailing run.
                None if max_length > 2 => break,
                None => return Err(CodecError::OutOfData { position: i }),
            }
            counter = 0;
        }
        i += 1;
    }

    Ok(runs)
}

pub fn reconstruct(runs: &[RunLength], max_length: u32, file_size: usize) -> Result<Vec<bool>> {
    let mut bits = Vec::new();

    for &run in runs {
        if run > max_length {
            return Err(CodecError::SymbolOutOfRange { symbol: run, max_length });
        }
        let expansion = if run < max_length { run as usize + 1 } else { run as usize };
        let expanded = bits.len() + expansion;
        if expanded > file_size {
            return Err(CodecError::LengthMismatch { expanded, file_size });
        }
        bits.resize(bits.len() + run as usize, false);
        if run < max_length {
            bits.push(true);
        }
    }

    // file_size comes from untrusted headers, so a failed allocation is a size error.
    bits.try_reserve_exact(file_size - bits.len())
        .map_err(|_| CodecError::LengthMismatch { expanded: bits.len(), file_size })?;
    bits.resize(file_size, false);
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{format_bits, parse_bit_string};

    fn bits(s: &str) -> Vec<bool> {
        parse_bit_string(s).unwrap()
    }

    #[test]
    fn test_rle_empty() {
        assert!(extract_runs(&[], 5).unwrap().is_empty());
        assert!(reconstruct(&[], 5, 0).unwrap().is_empty());
    }

    #[test]
    fn test_trailing_run_dropped() {
        assert_eq!(extract_runs(&bits("0001000"), 69).unwrap(), vec![3]);
        assert_eq!(extract_runs(&bits("000100001"), 69).unwrap(), vec![3, 4]);
        assert_eq!(extract_runs(&bits("0001001"), 69).unwrap(), vec![3, 2]);
    }

    #[test]
    fn test_cap_lookahead_one() {
        // Counter reaches 3 == max_length - 2, the next zero triggers the lookahead.
        assert_eq!(extract_runs(&bits("00001"), 5).unwrap(), vec![4]);
        assert_eq!(format_bits(&reconstruct(&[4], 5, 5).unwrap()), "00001");
    }

    #[test]
    fn test_cap_lookahead_zero() {
        assert_eq!(extract_runs(&bits("00000"), 5).unwrap(), vec![5]);
        assert_eq!(extract_runs(&bits("000001"), 5).unwrap(), vec![5, 0]);
        assert_eq!(format_bits(&reconstruct(&[5, 0], 5, 6).unwrap()), "000001");
    }

    #[test]
    fn test_long_run_splits_into_saturated_symbols() {
        let mut input = vec![false; 12];
        input.push(true);
        let runs = extract_runs(&input, 5).unwrap();
        assert_eq!(runs, vec![5, 5, 2]);
        assert_eq!(reconstruct(&runs, 5, input.len()).unwrap(), input);
    }

    #[test]
    fn test_lookahead_at_end_is_trailing_run() {
        assert_eq!(extract_runs(&bits("10000"), 5).unwrap(), vec![0]);
        assert_eq!(format_bits(&reconstruct(&[0], 5, 5).unwrap()), "10000");
    }

    #[test]
    fn test_cap_of_two_reads_past_end() {
        assert_eq!(extract_runs(&bits("0100"), 2).unwrap(), vec![1, 2]);
        assert!(matches!(
            extract_runs(&bits("0110"), 2),
            Err(CodecError::OutOfData { position: 4 })
        ));
    }

    #[test]
    fn test_cap_below_two_rejected() {
        assert!(matches!(extract_runs(&bits("01"), 1), Err(CodecError::InvalidMaxLength(1))));
        assert!(matches!(extract_runs(&bits("01"), 0), Err(CodecError::InvalidMaxLength(0))));
    }

    #[test]
    fn test_reconstruct_pads_with_zeros() {
        assert_eq!(format_bits(&reconstruct(&[3, 4], 69, 12).unwrap()), "000100001000");
    }

    #[test]
    fn test_reconstruct_length_mismatch() {
        assert!(matches!(
            reconstruct(&[3, 4], 69, 8),
            Err(CodecError::LengthMismatch { expanded: 9, file_size: 8 })
        ));
    }

    #[test]
    fn test_reconstruct_unallocatable_size() {
        assert!(matches!(
            reconstruct(&[3], 69, usize::MAX),
            Err(CodecError::LengthMismatch { expanded: 4, file_size: usize::MAX })
        ));
    }

    #[test]
    fn test_reconstruct_symbol_out_of_range() {
        assert!(matches!(
            reconstruct(&[6], 5, 10),
            Err(CodecError::SymbolOutOfRange { symbol: 6, max_length: 5 })
        ));
    }

    #[test]
    fn test_round_trip_exhaustive_short_inputs() {
        for max_length in 3..=6u32 {
            for len in 0..=10usize {
                for pattern in 0u32..(1 << len) {
                    let input: Vec<bool> = (0..len).map(|i| pattern & (1 << i) != 0).collect();
                    let runs = extract_runs(&input, max_length).unwrap();
                    assert!(runs.iter().all(|&r| r <= max_length));
                    let output = reconstruct(&runs, max_length, input.len()).unwrap();
                    assert_eq!(output, input, "max_length={max_length} input={}", format_bits(&input));
                }
            }
        }
    }
}
