//! Benchmarks for zeek-ingest
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Cursor;

fn sample_log(rows: usize) -> Vec<u8> {
    let mut out = String::from(
        "#separator \\x09\n#path\tconn\n\
         #fields\tts\tuid\tid.orig_h\tid.orig_p\tid.resp_h\tid.resp_p\tproto\tservice\n\
         #types\ttime\tstring\taddr\tport\taddr\tport\tenum\tstring\n",
    );
    for i in 0..rows {
        out.push_str(&format!(
            "1735689600.{}\tC{:08x}\t10.0.{}.{}\t{}\t1.1.1.1\t53\tudp\tdns\n",
            i,
            i,
            (i / 256) % 256,
            i % 256,
            40000 + (i % 20000)
        ));
    }
    out.push_str("#close\t2025-01-01-01-00-00\n");
    out.into_bytes()
}

fn benchmark_normalize_row(c: &mut Criterion) {
    use zeek_ingest::parser::normalize_row;

    let short = "1735689600.1\tCabc\t10.0.0.1";
    let long = "1735689600.1\tCabc\t10.0.0.1\t51000\t1.1.1.1\t53\tudp\tdns\textra\tfields";

    c.bench_function("normalize_row_pad", |b| {
        b.iter(|| black_box(normalize_row(black_box(short), 8)))
    });
    c.bench_function("normalize_row_truncate", |b| {
        b.iter(|| black_box(normalize_row(black_box(long), 8)))
    });
}

fn benchmark_parse_log(c: &mut Criterion) {
    use zeek_ingest::parser::LogFile;

    let data = sample_log(10_000);

    c.bench_function("parse_10k_rows", |b| {
        b.iter(|| {
            let log = LogFile::from_reader("conn.log", Cursor::new(data.as_slice())).unwrap();
            let rows = log.into_rows().filter_map(|r| r.ok()).count();
            black_box(rows);
        })
    });
}

fn benchmark_fingerprint(c: &mut Criterion) {
    use zeek_ingest::content::checksum::hash_reader;

    let data = sample_log(10_000);

    c.bench_function("fingerprint_10k_rows", |b| {
        b.iter(|| black_box(hash_reader(data.as_slice()).unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_normalize_row,
    benchmark_parse_log,
    benchmark_fingerprint
);
criterion_main!(benches);
