//! Criterion micro-benchmarks for recording, seeking and the
//! highlights fixup pass.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use touchline_core::{GameTime, MatchStats};
use touchline_replay::{FileKind, FrameData, ReplayLog};

/// Record `frames` ticks with a realistic record mix: ~24 sprites per
/// frame, stats every 25th frame, the odd sound cue.
fn record_session(frames: u32, seed: u64) -> ReplayLog {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut log = ReplayLog::new();
    log.start_recording(false);

    let mut rec = log.recorder();
    for i in 0..frames {
        rec.record_frame(&FrameData {
            camera_x: rng.random_range(0.0..1200.0),
            camera_y: rng.random_range(0.0..800.0),
            team1_goals: 0,
            team2_goals: 0,
            time: GameTime::from_minutes(i * 90 / frames.max(1)),
        });
        for _ in 0..24 {
            rec.record_sprite(
                rng.random_range(0..1500),
                rng.random_range(-512.0..512.0),
                rng.random_range(-512.0..512.0),
            );
        }
        if i % 25 == 0 {
            rec.record_stats(&MatchStats::default());
        }
        if rng.random_bool(0.1) {
            rec.record_sfx(rng.random_range(0..64), 128);
        }
        if (i + 1) % 1000 == 0 {
            rec.save_scene();
        }
    }
    log
}

fn bench_record(c: &mut Criterion) {
    c.bench_function("record_1000_frames", |b| {
        b.iter(|| black_box(record_session(1_000, 7)));
    });
}

fn bench_seek(c: &mut Criterion) {
    let log = record_session(5_000, 7);

    c.bench_function("seek_forward_100", |b| {
        b.iter(|| {
            let mut player = log.play_all();
            player.skip_frames(black_box(100));
            black_box(player.fetch_frame())
        });
    });

    c.bench_function("scrub_back_and_forth", |b| {
        b.iter(|| {
            let mut player = log.play_all();
            for _ in 0..20 {
                player.skip_frames(50);
                black_box(player.fetch_frame());
                while player.fetch_object().is_some() {}
                player.skip_frames(-25);
                black_box(player.fetch_frame());
                while player.fetch_object().is_some() {}
            }
        });
    });
}

fn bench_save(c: &mut Criterion) {
    let log = record_session(5_000, 7);
    let info = touchline_core::MatchInfo::default();

    c.bench_function("save_highlights_5000_frames", |b| {
        b.iter(|| {
            let mut bytes = Vec::new();
            log.save(&mut bytes, &info, FileKind::Highlights)
                .expect("save");
            black_box(bytes)
        });
    });
}

criterion_group!(benches, bench_record, bench_seek, bench_save);
criterion_main!(benches);
