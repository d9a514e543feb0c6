// SPDX-License-Identifier: MPL-2.0
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use facemotion::portrait::encoder::{strip_data_url, to_base64};
use facemotion::portrait::{SelectedImage, SourceManager, SubmissionRequest};
use std::hint::black_box;

/// Face images are usually a few hundred KiB; webcam stills are smaller.
const SIZES: &[usize] = &[64 * 1024, 512 * 1024, 2 * 1024 * 1024];

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn payload_encoding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_encoding");

    for &size in SIZES {
        let bytes = payload(size);
        group.bench_with_input(BenchmarkId::new("to_base64", size), &bytes, |b, bytes| {
            b.iter(|| black_box(to_base64(black_box(bytes))));
        });

        let data_url = format!("data:image/png;base64,{}", to_base64(&bytes));
        group.bench_with_input(
            BenchmarkId::new("strip_data_url", size),
            &data_url,
            |b, data_url| {
                b.iter(|| black_box(strip_data_url(black_box(data_url))));
            },
        );

        let face_image = to_base64(&bytes);
        group.bench_with_input(
            BenchmarkId::new("request_json", size),
            &face_image,
            |b, face_image| {
                b.iter(|| {
                    let request = SubmissionRequest::new(face_image.clone());
                    black_box(serde_json::to_vec(&request).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn snapshot_preview_benchmark(c: &mut Criterion) {
    let bytes = payload(256 * 1024);
    let mut sources = SourceManager::default();
    sources.set_from_capture(format!("data:image/png;base64,{}", to_base64(&bytes)));
    let selected: SelectedImage = sources.selected().cloned().unwrap();

    c.bench_function("snapshot_preview_bytes", |b| {
        b.iter(|| black_box(selected.preview_bytes()));
    });
}

criterion_group!(benches, payload_encoding_benchmark, snapshot_preview_benchmark);
criterion_main!(benches);
