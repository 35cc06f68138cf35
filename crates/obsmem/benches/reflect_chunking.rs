use criterion::{criterion_group, criterion_main, Criterion};
use obsmem_core::SplitDocument;
use obsmem_pipeline::chunk_sections;
use std::hint::black_box;

fn observations(days: usize) -> String {
    let mut text = String::from("# Observations\n\n");
    for day in 0..days {
        text.push_str(&format!("## 2025-{:02}-{:02}\n", day / 28 + 1, day % 28 + 1));
        for hour in 0..12 {
            text.push_str(&format!(
                "- 🟡 {:02}:00 Worked on the Atlas migration, step {} of the rollout\n",
                hour + 8,
                hour
            ));
        }
        text.push('\n');
    }
    text
}

fn bench_split_336_days(c: &mut Criterion) {
    let text = observations(336);
    c.bench_function("split_336_days", |b| {
        b.iter(|| SplitDocument::parse(black_box(&text)).sections.len());
    });
}

fn bench_chunk_336_days(c: &mut Criterion) {
    let text = observations(336);
    let doc = SplitDocument::parse(&text);
    c.bench_function("chunk_336_days", |b| {
        b.iter(|| chunk_sections(black_box(&doc), 63_000).len());
    });
}

criterion_group!(benches, bench_split_336_days, bench_chunk_336_days);
criterion_main!(benches);
