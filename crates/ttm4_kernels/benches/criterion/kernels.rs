use criterion::{criterion_group, criterion_main, Criterion};
use ttm4_kernels::screening;

fn bench_screening(c: &mut Criterion) {
    c.bench_function("permanent_damped", |b| {
        b.iter(|| screening::permanent_damped(4.0, 0.4, 1.0, 1.0, 0.4f64.powf(0.25), 1.225, |u| (-u).exp()))
    });

    c.bench_function("grad_damped", |b| {
        b.iter(|| screening::grad_damped(4.0, 0.055, 1.0))
    });
}

criterion_group!(benches, bench_screening);
criterion_main!(benches);
