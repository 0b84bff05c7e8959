use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lazybody::{ContentEncoding, MaterializeConfig};
use lazybody_tests::{encoded, response, response_with};

fn log_lines(size_kb: usize) -> Vec<u8> {
    let line = b"2026-10-14T00:00:00Z GET /api/v1/items?page=3 200 1.2ms\n";
    line.iter().copied().cycle().take(size_kb * 1024).collect()
}

fn bench_materialize_small(c: &mut Criterion) {
    let body = encoded(ContentEncoding::Gzip, br#"{"id":7,"name":"widget"}"#);

    c.bench_function("materialize_small_gzip", |b| {
        b.iter(|| response(Some("gzip"), body.as_slice()).into_bytes().unwrap());
    });
}

fn bench_materialize_encodings(c: &mut Criterion) {
    let plain = log_lines(64);
    let mut group = c.benchmark_group("materialize_encoding");
    group.throughput(Throughput::Bytes(plain.len() as u64));

    for encoding in [
        ContentEncoding::Identity,
        ContentEncoding::Gzip,
        ContentEncoding::Deflate,
    ] {
        let body = encoded(encoding, &plain);
        group.bench_with_input(
            BenchmarkId::from_parameter(encoding),
            &body,
            |b, body| {
                b.iter(|| {
                    response(Some(encoding.as_str()), body.as_slice())
                        .into_bytes()
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_materialize_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize_gzip_throughput");

    for size_kb in [1, 64, 1024] {
        let plain = log_lines(size_kb);
        let body = encoded(ContentEncoding::Gzip, &plain);

        group.throughput(Throughput::Bytes(plain.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("decode", format!("{size_kb}kb")),
            &body,
            |b, body| {
                b.iter(|| {
                    let config = MaterializeConfig::default();
                    response_with(200, Some("gzip"), body.as_slice(), config)
                        .into_bytes()
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_cached_access(c: &mut Criterion) {
    let body = encoded(ContentEncoding::Deflate, &log_lines(64));
    let mut resp = response(Some("deflate"), body.as_slice());
    resp.content().unwrap();

    c.bench_function("cached_text_access", |b| {
        b.iter(|| resp.text().unwrap().len());
    });
}

criterion_group!(
    benches,
    bench_materialize_small,
    bench_materialize_encodings,
    bench_materialize_throughput,
    bench_cached_access
);
criterion_main!(benches);
