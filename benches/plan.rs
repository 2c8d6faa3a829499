use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glaze::compositor::plan;
use glaze::effect::Effect;
use glaze::state::CompositorState;

pub fn pass_plan(c: &mut Criterion) {
    let mut all_enabled = CompositorState::default();
    for effect in Effect::CANONICAL_ORDER {
        all_enabled.toggle(effect);
    }

    c.bench_function("plan all effects", |b| {
        b.iter(|| {
            plan(black_box(&all_enabled));
        })
    });

    let mut bloom_only = CompositorState::default();
    bloom_only.toggle(Effect::Bloom);

    c.bench_function("plan bloom only", |b| {
        b.iter(|| {
            plan(black_box(&bloom_only));
        })
    });

    let disabled = CompositorState::default();

    c.bench_function("plan empty", |b| {
        b.iter(|| {
            plan(black_box(&disabled));
        })
    });

    c.bench_function("plan every subset", |b| {
        b.iter(|| {
            for mask in 0u32..128 {
                let mut state = CompositorState::default();
                for (bit, effect) in Effect::CANONICAL_ORDER.into_iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        state.toggle(effect);
                    }
                }
                plan(black_box(&state));
            }
        })
    });
}

criterion_group!(benches, pass_plan);
criterion_main!(benches);
