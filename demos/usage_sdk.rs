use sparsehuff::config::{CodebookSource, CodecConfig};
use sparsehuff::pipeline;

fn main() {
	// A quiet channel: one flipped bit roughly every hundred.
	let bits: Vec<bool> = (0..10_000u32).map(|i| i.wrapping_mul(2_654_435_761) % 100 == 0).collect();

	for source in [CodebookSource::Empirical, CodebookSource::Geometric] {
		let cfg = CodecConfig::default().with_source(source);
		let mut compressed = Vec::new();
		let stats = pipeline::compress_bits(&bits, &mut compressed, &cfg, None).unwrap();
		println!(
			"{:?}: {} bits -> {} payload bits ({:.2}x, {:.3} bits/run vs entropy {:.3})",
			source, stats.original_bits, stats.payload_bits, stats.ratio, stats.mean_codeword_length, stats.entropy
		);

		let restored = pipeline::decompress_bits(&mut std::io::Cursor::new(compressed), None).unwrap();
		assert_eq!(restored, bits);
	}
}
