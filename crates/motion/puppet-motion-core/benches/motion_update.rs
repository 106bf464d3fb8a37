use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use puppet_motion_core::{
    ids::ParamId, model::ParameterTable, Motion, MotionClip, MotionConfig, MotionManager,
    MotionQueueManager, Priority, RawClip,
};

fn clip(name: &str) -> Arc<MotionClip> {
    let raw: RawClip = puppet_motion_fixtures::clips::load(name).expect("load fixture");
    Arc::new(MotionClip::from_raw(raw).expect("valid clip"))
}

fn face() -> ParameterTable {
    ParameterTable::new()
        .with("ParamEyeLOpen", 1.0, 0.0, 1.0)
        .with("ParamEyeROpen", 1.0, 0.0, 1.0)
        .with("ParamMouthOpenY", 0.0, 0.0, 1.0)
        .with("ParamAngleY", 0.0, -30.0, 30.0)
        .with("ParamBreath", 0.0, -1.0, 1.0)
        .with("PartArmA", 1.0, 0.0, 1.0)
}

fn bench_idle_loop(c: &mut Criterion) {
    let mut model = face();
    let mut queue = MotionQueueManager::default();
    queue.start_motion(Motion::clip(clip("idle-loop"), MotionConfig::default()));
    queue.update(&mut model, 0.0);

    c.bench_function("idle_loop_tick", |b| {
        b.iter(|| {
            let out = queue.update(&mut model, black_box(1.0 / 60.0));
            black_box(out.events.len());
        })
    });
}

fn bench_cross_fade(c: &mut Criterion) {
    let blink = clip("blink-talk");
    let idle = clip("idle-loop");
    let cfg = MotionConfig::default().with_effect_ids(
        vec![ParamId::new("ParamEyeLOpen"), ParamId::new("ParamEyeROpen")],
        vec![ParamId::new("ParamMouthOpenY")],
    );

    c.bench_function("cross_fade_restart_every_30_ticks", |b| {
        let mut model = face();
        let mut mgr = MotionManager::default();
        let mut tick = 0u32;
        b.iter(|| {
            if tick % 30 == 0 {
                let next = if tick % 60 == 0 { &blink } else { &idle };
                mgr.start_motion_priority(Motion::clip(next.clone(), cfg.clone()), Priority::FORCE);
            }
            tick = tick.wrapping_add(1);
            let out = mgr.update(&mut model, black_box(1.0 / 60.0));
            black_box(out.events.len());
        })
    });
}

criterion_group!(benches, bench_idle_loop, bench_cross_fade);
criterion_main!(benches);
