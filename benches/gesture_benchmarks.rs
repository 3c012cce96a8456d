//! Benchmarks for frame history and gesture classification

use costume_overlay::constants::{DEFAULT_BUCKET_MS, DEFAULT_LOOKBACK_MS, DEFAULT_RETENTION_MARGIN_MS};
use costume_overlay::gesture::GestureClassifier;
use costume_overlay::history::FrameHistory;
use costume_overlay::keypoint::{BodyPart, Keypoint, KeypointFrame};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Upper body with the wrists swinging between hip and head height
fn swinging_frames(count: usize) -> Vec<KeypointFrame> {
    (0..count)
        .map(|i| {
            let t = i as f64 * 0.05;
            let left_y = 240.0 + 160.0 * t.sin();
            let right_y = 240.0 + 160.0 * (t * 1.3).cos();
            KeypointFrame::from_parts(
                0.9,
                [
                    (BodyPart::LeftEar, Keypoint::new(285.0, 110.0, 0.9)),
                    (BodyPart::RightEar, Keypoint::new(355.0, 110.0, 0.9)),
                    (BodyPart::LeftShoulder, Keypoint::new(260.0, 200.0, 0.9)),
                    (BodyPart::RightShoulder, Keypoint::new(380.0, 200.0, 0.9)),
                    (BodyPart::LeftElbow, Keypoint::new(250.0, 290.0, 0.9)),
                    (BodyPart::RightElbow, Keypoint::new(390.0, 290.0, 0.9)),
                    (BodyPart::LeftWrist, Keypoint::new(245.0, left_y, 0.9)),
                    (BodyPart::RightWrist, Keypoint::new(395.0, right_y, 0.9)),
                ],
            )
        })
        .collect()
}

fn new_history() -> FrameHistory {
    FrameHistory::new(DEFAULT_BUCKET_MS, DEFAULT_LOOKBACK_MS + DEFAULT_RETENTION_MARGIN_MS)
        .unwrap_or_else(|e| panic!("bad history settings: {e}"))
}

fn benchmark_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");
    let frames = swinging_frames(1000);
    let lookback = DEFAULT_LOOKBACK_MS / DEFAULT_BUCKET_MS;

    for tick_ms in [10u64, 33, 100] {
        group.bench_with_input(BenchmarkId::new("record_lookback_expire", tick_ms), &tick_ms, |b, &tick_ms| {
            b.iter(|| {
                let mut history = new_history();
                for (i, frame) in frames.iter().enumerate() {
                    let now = i as u64 * tick_ms;
                    history.record(now, frame.clone());
                    black_box(history.lookback(now, lookback));
                    history.expire(now);
                }
                history.len()
            });
        });
    }

    group.finish();
}

fn benchmark_classifier(c: &mut Criterion) {
    let frames = swinging_frames(1000);
    let lag = 20;

    c.bench_function("classify_1000_pairs", |b| {
        b.iter(|| {
            let mut classifier = GestureClassifier::default();
            let mut fired = 0usize;
            for (i, current) in frames.iter().enumerate().skip(lag) {
                let delayed = &frames[i - lag];
                if classifier
                    .classify(black_box(current), Some(delayed), i as u64 * 33)
                    .is_some()
                {
                    fired += 1;
                }
            }
            fired
        });
    });
}

criterion_group!(benches, benchmark_history, benchmark_classifier);
criterion_main!(benches);
