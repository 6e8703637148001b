use criterion::{criterion_group, criterion_main, Criterion};
use libpostal_parser::{init, parse_address, parse_address_bytes, ParseOptions};
use std::hint::black_box;

fn bench_address_parsing(c: &mut Criterion) {
    c.bench_function("reject_invalid_utf8", |b| {
        let options = ParseOptions::default();
        b.iter(|| parse_address_bytes(black_box(b"123 Main St \xff\xfe"), &options))
    });

    if let Err(e) = init() {
        eprintln!("Skipping native benchmarks: {e}");
        return;
    }

    c.bench_function("parse_simple_address", |b| {
        b.iter(|| parse_address(black_box("123 Main St, New York, NY 10001")))
    });

    c.bench_function("parse_complex_address", |b| {
        b.iter(|| {
            parse_address(black_box(
                "Apt 5B, 123 Main Street, Suite 100, New York, NY 10001-1234",
            ))
        })
    });
}

criterion_group!(benches, bench_address_parsing);
criterion_main!(benches);
