//! Criterion benchmarks for the voice graph
//!
//! Run with: cargo bench -p voxshift-engine
#![allow(missing_docs)]

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use voxshift_engine::{
    EffectSettings, MonitorMode, OfflineHost, RENDER_QUANTUM, VoiceSession,
};

const SAMPLE_RATE: f32 = 48000.0;

fn voice_signal(frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 180.0 * t).sin() * 0.3
                + (2.0 * std::f32::consts::PI * 2400.0 * t).sin() * 0.05
        })
        .collect()
}

fn bench_voice_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("voice_graph");

    for (name, settings) in [
        ("natural", EffectSettings::default()),
        (
            "robot",
            EffectSettings {
                robot_freq: 50.0,
                distortion: 0.6,
                filter_freq: 900.0,
                ..EffectSettings::default()
            },
        ),
        ("bypass", EffectSettings::default().with_bypass(true)),
    ] {
        let host = Arc::new(OfflineHost::new(SAMPLE_RATE));
        let mut session =
            VoiceSession::with_monitor_mode(Arc::clone(&host), MonitorMode::Manual).with_seed(11);
        if session.initialize(None).is_err() {
            continue;
        }
        session.update_settings(&settings);

        let input = voice_signal(RENDER_QUANTUM * 8);
        group.throughput(Throughput::Elements(input.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let out = host.render(black_box(&input));
                black_box(out[0])
            })
        });
        session.stop();
    }

    group.finish();
}

fn bench_gate_cycle(c: &mut Criterion) {
    let host = Arc::new(OfflineHost::new(SAMPLE_RATE));
    let mut session = VoiceSession::with_monitor_mode(Arc::clone(&host), MonitorMode::Manual);
    if session.initialize(None).is_err() {
        return;
    }
    host.render(&voice_signal(2048));

    c.bench_function("gate_cycle", |b| b.iter(|| black_box(session.step_gate())));
}

criterion_group!(benches, bench_voice_graph, bench_gate_cycle);
criterion_main!(benches);
