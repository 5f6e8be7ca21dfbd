//! Analytic run-length model for a memoryless channel
//! With ones occurring independently with probability p, a run of k zeros followed by a one
//! has probability (1-p)^k * p, and a saturated run of max_length zeros (1-p)^max_length.
//! The weights over 0..=max_length sum to one.

use crate::config::MAX_RUN_LENGTH_LIMIT;
use crate::error::{CodecError, Result};
use crate::transforms::huffman::FrequencyTable;

pub fn run_probability(k: u32, max_length: u32, prob_one: f64) -> f64 {
    let stay = (1.0 - prob_one).powi(k as i32);
    if k < max_length {
        stay * prob_one
    } else {
        stay
    }
}

pub fn geometric_table(max_length: u32, prob_one: f64) -> Result<FrequencyTable> {
    if max_length < 2 {
        return Err(CodecError::InvalidMaxLength(max_length));
    }
    if max_length > MAX_RUN_LENGTH_LIMIT {
        return Err(CodecError::ConfigError(format!(
            "max_length must not exceed {}, got {}",
            MAX_RUN_LENGTH_LIMIT, max_length
        )));
    }
    if !(prob_one > 0.0 && prob_one < 1.0) {
        return Err(CodecError::ConfigError(format!(
            "prob_one must lie strictly between 0 and 1, got {}",
            prob_one
        )));
    }

    FrequencyTable::from_weights((0..=max_length).map(|k| (k, run_probability(k, max_length, prob_one))))
}
