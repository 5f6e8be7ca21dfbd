use crate::bits::read_bit_lines;
use crate::codebook::Codebook;
use crate::config::{ChecksumType, CodebookSource, CodecConfig, DEFAULT_MAX_RUN_LENGTH, DEFAULT_PROB_ONE};
use crate::error::CodecError;
use crate::pipeline;
use clap::{Parser, Subcommand};
use log::warn;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = "Run-length + Huffman compression for sparse binary streams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compresses a one-bit-per-line text file
    Compress {
        /// Input file to compress
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file name
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Length of the maximum run in the run-length stage
        #[arg(short, long, default_value_t = DEFAULT_MAX_RUN_LENGTH)]
        max_run_length: u32,

        /// Codebook to use instead of one built from the input
        #[arg(short, long, value_name = "FILE")]
        codebook: Option<PathBuf>,

        /// Store the codebook in the output even when --codebook is given
        #[arg(long)]
        embed_codebook: bool,

        /// Checksum over the original bits [crc32, sha256]
        #[arg(long, default_value = "crc32")]
        checksum: ChecksumType,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decompresses a file back into one-bit-per-line text
    Decompress {
        /// Input file to decompress
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file name
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Codebook for streams compressed without an embedded one
        #[arg(short, long, value_name = "FILE")]
        codebook: Option<PathBuf>,
    },
    /// Generates a codebook file
    Codebook {
        /// Output codebook file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Symbol weights [empirical, geometric]
        #[arg(short, long, default_value = "geometric")]
        source: CodebookSource,

        /// Training file (one bit per line), required for empirical codebooks
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Length of the maximum run in the run-length stage
        #[arg(short, long, default_value_t = DEFAULT_MAX_RUN_LENGTH)]
        max_run_length: u32,

        /// Probability of a one bit, for geometric codebooks
        #[arg(short, long, default_value_t = DEFAULT_PROB_ONE)]
        prob_one: f64,
    },
    /// Shows the header of a compressed file
    Info {
        /// Compressed file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

fn load_codebook(path: &Path, max_run_length: Option<u32>) -> Result<Codebook, CodecError> {
    let (codebook, book_max_length) = Codebook::load(path)?;
    if let Some(max_run_length) = max_run_length {
        if book_max_length != max_run_length {
            return Err(CodecError::ConfigError(format!(
                "codebook {} was built for max run length {}, not {}",
                path.display(),
                book_max_length,
                max_run_length
            )));
        }
    }
    if codebook.max_symbol() != Some(book_max_length) {
        warn!("codebook {} has no codeword for saturated runs", path.display());
    }
    Ok(codebook)
}

pub fn run() -> Result<(), CodecError> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Compress { input, output, max_run_length, codebook, embed_codebook, checksum, json } => {
            let config = CodecConfig::default()
                .with_max_run_length(*max_run_length)
                .with_checksum(*checksum)
                .with_embedded_codebook(*embed_codebook);
            config.validate()?;
            let codebook = match codebook {
                Some(path) => Some(load_codebook(path, Some(*max_run_length))?),
                None => None,
            };

            let mut in_file = BufReader::new(File::open(input)?);
            let mut out_file = BufWriter::new(File::create(output)?);

            let start = Instant::now();
            let stats = pipeline::compress(&mut in_file, &mut out_file, &config, codebook.as_ref())?;
            out_file.flush()?;
            let duration = start.elapsed();

            if *json {
                let text = serde_json::to_string_pretty(&stats)
                    .map_err(|e| CodecError::InvalidFormat(e.to_string()))?;
                println!("{}", text);
            } else {
                println!("Compressing {} to {}...", input.display(), output.display());
                println!("Compression successful!");
                println!("  Original Size:    {} bits", stats.original_bits);
                println!("  Runs:             {}", stats.runs);
                println!("  Payload Size:     {} bits", stats.payload_bits);
                println!("  Container Size:   {} bytes", stats.compressed_size);
                println!("  Ratio:            {:.2}x", stats.ratio);
                println!("  Entropy:          {:.4} bits/run", stats.entropy);
                println!("  Codeword Length:  {:.4} bits/run", stats.mean_codeword_length);
                println!("  Elapsed Time:     {:.2?}", duration);
            }
        }
        Commands::Decompress { input, output, codebook } => {
            println!("Decompressing {} to {}...", input.display(), output.display());
            let codebook = match codebook {
                Some(path) => Some(load_codebook(path, None)?),
                None => None,
            };

            let mut in_file = BufReader::new(File::open(input)?);
            let mut out_file = BufWriter::new(File::create(output)?);

            let start = Instant::now();
            pipeline::decompress(&mut in_file, &mut out_file, codebook.as_ref())?;
            out_file.flush()?;
            let duration = start.elapsed();

            println!("Decompression successful!");
            println!("  Elapsed Time: {:.2?}", duration);
        }
        Commands::Codebook { output, source, input, max_run_length, prob_one } => {
            let config = CodecConfig::default()
                .with_max_run_length(*max_run_length)
                .with_prob_one(*prob_one)
                .with_source(*source);
            config.validate()?;

            let bits = match (source, input) {
                (CodebookSource::Empirical, Some(path)) => read_bit_lines(BufReader::new(File::open(path)?))?,
                (CodebookSource::Empirical, None) => {
                    return Err(CodecError::ConfigError("empirical codebooks need --input".to_string()))
                }
                (CodebookSource::Geometric, _) => Vec::new(),
            };

            let codebook = pipeline::codebook_for(&bits, &config)?;
            codebook.save(output, *max_run_length)?;
            println!("Wrote {:?} codebook with {} codewords to {}", source, codebook.len(), output.display());
        }
        Commands::Info { input } => {
            let mut in_file = BufReader::new(File::open(input)?);
            let info = pipeline::info(&mut in_file)?;
            println!("File: {}", input.display());
            println!("  Original Size:     {} bits", info.original_bits);
            println!("  Max Run Length:    {}", info.max_length);
            println!("  Checksum:          {}", info.checksum);
            println!("  Embedded Codebook: {}", info.embedded_codebook);
        }
    }

    Ok(())
}
