//! Benchmarks for oxidat-codec
//!
//! This benchmark suite evaluates:
//! - Raw-token encoding throughput
//! - Segment decoding throughput across typical resource sizes

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxidat_codec::{SegmentDecoder, compress};
use oxidat_core::Diagnostics;
use std::hint::black_box;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Random data - no patterns
    pub fn random(size: usize) -> Vec<u8> {
        // Simple PRNG for reproducible random data
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            // Linear congruential generator
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Tile-like data - short runs of a few palette indices
    pub fn tiles(size: usize) -> Vec<u8> {
        (0..size).map(|i| ((i / 7) % 5) as u8).collect()
    }
}

// Level files, terrain graphics and the largest sprite banks.
const SIZES: [(&str, usize); 3] = [("2KB", 2048), ("14KB", 14 * 1024), ("60KB", 60 * 1024)];

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for (name, size) in SIZES {
        let data = test_data::random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("random", name), &data, |b, data| {
            b.iter(|| black_box(compress(black_box(data)).unwrap()));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let decoder = SegmentDecoder::default();

    for (name, size) in SIZES {
        for (pattern, data) in [
            ("random", test_data::random(size)),
            ("tiles", test_data::tiles(size)),
        ] {
            let encoded = compress(&data).unwrap();
            let params = encoded.params();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(pattern, name),
                &encoded.payload,
                |b, payload| {
                    b.iter(|| {
                        let decoded = decoder
                            .decode_slice(black_box(payload), &params, Diagnostics::null())
                            .unwrap();
                        black_box(decoded.data);
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
