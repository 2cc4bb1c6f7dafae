//! Benchmarks for chunk splitting.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use draftpad::splitter::{DEFAULT_MAX_TOKENS, split_markdown};

fn bench_split_post(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/post.md");
    c.bench_function("split_post", |b| {
        b.iter(|| split_markdown(black_box(md), "Shipping", DEFAULT_MAX_TOKENS))
    });
}

fn bench_split_post_small_budget(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/post.md");
    c.bench_function("split_post_small_budget", |b| {
        b.iter(|| split_markdown(black_box(md), "Shipping", black_box(32)))
    });
}

criterion_group!(benches, bench_split_post, bench_split_post_small_budget);
criterion_main!(benches);
