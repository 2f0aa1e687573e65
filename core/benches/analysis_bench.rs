use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pyrite_core::{AnalysisSession, stmt::parse_source};
use std::hint::black_box;

// A module with `n` small classes and functions calling into each other
fn synthetic_source(n: usize) -> String {
    let mut src = String::from("import os\nfrom typing import Optional\n\n");
    for i in 0..n {
        src.push_str(&format!(
            "class Node{i}:\n    def __init__(self, value: int):\n        self.value = value\n        self.label = 'node{i}'\n\n    def scaled(self, factor: float) -> float:\n        return self.value * factor\n\n"
        ));
        src.push_str(&format!(
            "def build_{i}(count: int) -> list[int]:\n    items = [Node{i}(k) for k in range(count)]\n    return [int(n.scaled(2.0)) for n in items if n.value % 2 == 0]\n\n"
        ));
    }
    src.push_str("result_total = build_0(10)\nres");
    src
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for n in [10usize, 100] {
        let src = synthetic_source(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &src, |b, src| {
            b.iter(|| black_box(parse_source(src)))
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_source");
    for n in [10usize, 100] {
        let src = synthetic_source(n);
        let session = AnalysisSession::new();
        group.bench_with_input(BenchmarkId::from_parameter(n), &src, |b, src| {
            b.iter(|| {
                session.update_source(src);
                black_box(session.get_diagnostics().len())
            })
        });
    }
    group.finish();
}

fn bench_completion(c: &mut Criterion) {
    let src = synthetic_source(100);
    let last_line = src.lines().count() as u32;
    let session = AnalysisSession::new();
    session.update_source(&src);

    c.bench_function("complete_expression", |b| {
        b.iter(|| black_box(session.get_autocomplete_suggestions(last_line, 4)))
    });
    c.bench_function("complete_out_of_range", |b| {
        b.iter(|| black_box(session.get_autocomplete_suggestions(last_line + 10, 1)))
    });
}

criterion_group!(benches, bench_parse, bench_update, bench_completion);
criterion_main!(benches);
