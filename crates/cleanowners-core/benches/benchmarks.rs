//! Benchmarks for cleanowners-core
//!
//! Run with: cargo bench -p cleanowners-core

use cleanowners_core::parse::{ParserConfig, parse_handles_with_config};
use cleanowners_core::rewrite::remove_handles;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Builds a CODEOWNERS file with `rules` rule lines and a comment every tenth line.
fn synthetic_codeowners(rules: usize) -> String {
    let mut out = String::new();
    for i in 0..rules {
        if i % 10 == 0 {
            out.push_str(&format!("# section {}\n", i / 10));
        }
        out.push_str(&format!(
            "/src/module_{}/ @user{} @user{} @org/team{}\n",
            i,
            i % 97,
            (i + 1) % 97,
            i % 13
        ));
    }
    out
}

const SIZES: [(&str, usize); 3] = [("small", 50), ("medium", 1_000), ("large", 20_000)];

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for (name, rules) in SIZES {
        let content = synthetic_codeowners(rules);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_handles", name),
            &content,
            |b, input| {
                b.iter(|| {
                    parse_handles_with_config(
                        std::hint::black_box(input),
                        ParserConfig::new().with_include_teams(true),
                    )
                })
            },
        );
    }
    group.finish();
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    let stale: Vec<String> = (0..10).map(|i| format!("user{}", i * 7)).collect();

    for (name, rules) in SIZES {
        let content = synthetic_codeowners(rules);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("remove_handles", name),
            &content,
            |b, input| b.iter(|| remove_handles(std::hint::black_box(input.as_bytes()), &stale)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_parsing, bench_rewrite);
criterion_main!(benches);
