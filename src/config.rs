use crate::error::CodecError;
use std::str::FromStr;

/// Cap used by the original noisy-channel experiments.
pub const DEFAULT_MAX_RUN_LENGTH: u32 = 69;

/// Bit-flip probability of the modelled channel.
pub const DEFAULT_PROB_ONE: f64 = 0.01;

/// Largest accepted run-length cap. Codebooks hold one codeword per symbol up to the cap.
pub const MAX_RUN_LENGTH_LIMIT: u32 = u16::MAX as u32;

/// Where symbol weights come from when a codebook has to be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodebookSource {
    /// Count the run lengths of the corpus being compressed.
    Empirical,
    /// Use the geometric run-length model for `prob_one`.
    Geometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    Crc32,
    Sha256,
}

impl ChecksumType {
    pub fn id(self) -> u8 {
        match self {
            ChecksumType::Crc32 => 0,
            ChecksumType::Sha256 => 1,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(ChecksumType::Crc32),
            1 => Some(ChecksumType::Sha256),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CodecConfig {
    pub max_run_length: u32,
    pub prob_one: f64,
    pub checksum: ChecksumType,
    pub source: CodebookSource,
    /// Store the codebook inside the container even when it was supplied by the caller.
    pub embed_codebook: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_run_length: DEFAULT_MAX_RUN_LENGTH,
            prob_one: DEFAULT_PROB_ONE,
            checksum: ChecksumType::Crc32,
            source: CodebookSource::Empirical,
            embed_codebook: false,
        }
    }
}

impl CodecConfig {
    pub fn with_max_run_length(mut self, max_run_length: u32) -> Self {
        self.max_run_length = max_run_length;
        self
    }

    pub fn with_prob_one(mut self, prob_one: f64) -> Self {
        self.prob_one = prob_one;
        self
    }

    pub fn with_checksum(mut self, checksum: ChecksumType) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_source(mut self, source: CodebookSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_embedded_codebook(mut self, embed: bool) -> Self {
        self.embed_codebook = embed;
        self
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        if self.max_run_length < 2 {
            return Err(CodecError::InvalidMaxLength(self.max_run_length));
        }
        if self.max_run_length > MAX_RUN_LENGTH_LIMIT {
            return Err(CodecError::ConfigError(format!(
                "max_run_length must not exceed {}, got {}",
                MAX_RUN_LENGTH_LIMIT, self.max_run_length
            )));
        }
        if !(self.prob_one > 0.0 && self.prob_one < 1.0) {
            return Err(CodecError::ConfigError(format!(
                "prob_one must lie strictly between 0 and 1, got {}",
                self.prob_one
            )));
        }
        Ok(())
    }
}

impl FromStr for CodebookSource {
    type Err = CodecError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empirical" => Ok(CodebookSource::Empirical),
            "geometric" => Ok(CodebookSource::Geometric),
            _ => Err(CodecError::ConfigError(format!("Invalid codebook source: {}", s))),
        }
    }
}

impl FromStr for ChecksumType {
    type Err = CodecError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crc32" => Ok(ChecksumType::Crc32),
            "sha256" => Ok(ChecksumType::Sha256),
            _ => Err(CodecError::ConfigError(format!("Invalid checksum type: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CodecConfig::default();
        assert_eq!(config.max_run_length, 69);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_small_cap() {
        let config = CodecConfig::default().with_max_run_length(1);
        assert!(matches!(config.validate(), Err(CodecError::InvalidMaxLength(1))));
    }

    #[test]
    fn test_rejects_huge_cap() {
        assert!(CodecConfig::default().with_max_run_length(MAX_RUN_LENGTH_LIMIT).validate().is_ok());
        let config = CodecConfig::default().with_max_run_length(4_000_000_000);
        assert!(matches!(config.validate(), Err(CodecError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let config = CodecConfig::default().with_prob_one(1.0);
        assert!(matches!(config.validate(), Err(CodecError::ConfigError(_))));
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Geometric".parse::<CodebookSource>().unwrap(), CodebookSource::Geometric);
        assert_eq!("sha256".parse::<ChecksumType>().unwrap(), ChecksumType::Sha256);
        assert!("zip".parse::<ChecksumType>().is_err());
        assert_eq!(ChecksumType::from_id(ChecksumType::Sha256.id()), Some(ChecksumType::Sha256));
    }
}
