//! Benchmarks for translating records into transport events.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use flume_appender::{AppenderConfig, FlumeLevel, FlumeLogRecord, build_event, transport};

fn stack_frames(depth: usize) -> Vec<String> {
    (0..depth)
        .map(|i| format!("\tat com.example.Service.method{i}(Service.java:{})", i * 10))
        .collect()
}

fn bench_translate(c: &mut Criterion) {
    let config = AppenderConfig::new("collector", 41414).with_tags("error", "text", "1");
    let plain = FlumeLogRecord::new("com.example.Service", FlumeLevel::Info, "request handled");
    let with_error = FlumeLogRecord::new("com.example.Service", FlumeLevel::Error, "boom")
        .with_throwable(stack_frames(40));

    c.bench_function("build_event_plain", |b| {
        b.iter(|| build_event(black_box(&plain), black_box(&config)))
    });
    c.bench_function("build_event_with_error", |b| {
        b.iter(|| build_event(black_box(&with_error), black_box(&config)))
    });

    let event = build_event(&with_error, &config);
    c.bench_function("encode_event_with_error", |b| {
        b.iter(|| transport::encode_event(black_box(&event)))
    });
}

criterion_group!(benches, bench_translate);
criterion_main!(benches);
