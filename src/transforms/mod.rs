pub mod geometric;
pub mod huffman;
pub mod rle;

pub use geometric::geometric_table;
pub use huffman::{build as build_codebook, FrequencyTable};
pub use rle::{extract_runs, reconstruct, RunLength};
