// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for realtime frame parsing in the printwatch-tracker
// crate.  A busy IoT channel interleaves confirmations with status chatter,
// so the mixed-frame case is the one that matters.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use printwatch_tracker::confirmation::parse_frame;

/// Build a batch frame of `n` events, every fourth one a confirmation.
fn build_frame(n: usize) -> String {
    let events: Vec<String> = (0..n)
        .map(|i| {
            if i % 4 == 0 {
                format!(
                    r#"{{"type":"print_confirmation","payload":{{"device_identifier":"printer_{i}","print_id":"job-{i}"}}}}"#
                )
            } else {
                format!(r#"{{"type":"iot_status","payload":{{"box":"box-{i}","online":true}}}}"#)
            }
        })
        .collect();
    format!("[{}]", events.join(","))
}

fn bench_parse_single(c: &mut Criterion) {
    let frame = build_frame(1);
    c.bench_function("parse_frame_single_confirmation", |b| {
        b.iter(|| {
            let events = parse_frame(black_box(&frame)).expect("parse");
            black_box(events[0].as_confirmation())
        })
    });
}

fn bench_parse_mixed_batch(c: &mut Criterion) {
    let frame = build_frame(64);
    c.bench_function("parse_frame_mixed_batch_64", |b| {
        b.iter(|| {
            let events = parse_frame(black_box(&frame)).expect("parse");
            let confirmations = events.iter().filter_map(|e| e.as_confirmation()).count();
            black_box(confirmations)
        })
    });
}

criterion_group!(benches, bench_parse_single, bench_parse_mixed_batch);
criterion_main!(benches);
